use serde::{Deserialize, Serialize};
use strum::Display;

/// Wire kind of a protobuf field, as spelled by the JSON encoding of
/// `google.protobuf.FieldDescriptorProto.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
  #[serde(alias = "TYPE_DOUBLE")]
  Double,
  #[serde(alias = "TYPE_FLOAT")]
  Float,
  #[serde(alias = "TYPE_INT64")]
  Int64,
  #[serde(alias = "TYPE_UINT64")]
  Uint64,
  #[serde(alias = "TYPE_INT32")]
  Int32,
  #[serde(alias = "TYPE_FIXED64")]
  Fixed64,
  #[serde(alias = "TYPE_FIXED32")]
  Fixed32,
  #[serde(alias = "TYPE_BOOL")]
  Bool,
  #[serde(alias = "TYPE_STRING")]
  String,
  #[serde(alias = "TYPE_GROUP")]
  Group,
  #[serde(alias = "TYPE_MESSAGE")]
  Message,
  #[serde(alias = "TYPE_BYTES")]
  Bytes,
  #[serde(alias = "TYPE_UINT32")]
  Uint32,
  #[serde(alias = "TYPE_ENUM")]
  Enum,
  #[serde(alias = "TYPE_SFIXED32")]
  Sfixed32,
  #[serde(alias = "TYPE_SFIXED64")]
  Sfixed64,
  #[serde(alias = "TYPE_SINT32")]
  Sint32,
  #[serde(alias = "TYPE_SINT64")]
  Sint64,
}

impl FieldKind {
  pub const fn is_named(self) -> bool {
    matches!(self, Self::Message | Self::Enum | Self::Group)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum Cardinality {
  #[default]
  #[serde(rename = "LABEL_OPTIONAL")]
  Optional,
  #[serde(rename = "LABEL_REQUIRED")]
  Required,
  #[serde(rename = "LABEL_REPEATED")]
  Repeated,
}
