use std::{collections::BTreeMap, str::FromStr};

use serde::Deserialize;
use serde_json::Value;
use strum::{Display, EnumString};

/// Option maps as emitted by protojson. Extensions appear under bracketed
/// keys such as `[google.api.http]`.
pub type RawOptions = BTreeMap<String, Value>;

const HTTP_EXTENSION: &str = "[google.api.http]";
const FIELD_BEHAVIOR_EXTENSION: &str = "[google.api.field_behavior]";
const FIELD_VISIBILITY_EXTENSION: &str = "[google.api.field_visibility]";
const FIELD_INFO_EXTENSION: &str = "[google.api.field_info]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldBehavior {
  Optional,
  Required,
  OutputOnly,
  InputOnly,
  Immutable,
  UnorderedList,
  NonEmptyDefault,
  Identifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum FieldFormat {
  #[strum(serialize = "UUID4")]
  Uuid4,
  #[strum(serialize = "IPV4")]
  Ipv4,
  #[strum(serialize = "IPV6")]
  Ipv6,
  #[strum(serialize = "IPV4_OR_IPV6")]
  Ipv4OrIpv6,
}

impl FieldFormat {
  pub const fn openapi_format(self) -> &'static str {
    match self {
      Self::Uuid4 => "uuid",
      Self::Ipv4 => "ipv4",
      Self::Ipv6 => "ipv6",
      Self::Ipv4OrIpv6 => "ip",
    }
  }
}

/// Annotations of a single field that influence schema generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOptions {
  pub behaviors: Vec<FieldBehavior>,
  pub restrictions: Vec<String>,
  pub format: Option<FieldFormat>,
  pub deprecated: bool,
}

impl FieldOptions {
  pub fn from_raw(raw: &RawOptions) -> Self {
    let behaviors = raw
      .get(FIELD_BEHAVIOR_EXTENSION)
      .and_then(Value::as_array)
      .map(|values| {
        values
          .iter()
          .filter_map(Value::as_str)
          .filter_map(|name| FieldBehavior::from_str(name).ok())
          .collect()
      })
      .unwrap_or_default();

    let restrictions = raw
      .get(FIELD_VISIBILITY_EXTENSION)
      .and_then(|rule| rule.get("restriction"))
      .and_then(Value::as_str)
      .map(|restriction| {
        restriction
          .split(',')
          .map(str::trim)
          .filter(|part| !part.is_empty())
          .map(ToString::to_string)
          .collect()
      })
      .unwrap_or_default();

    let format = raw
      .get(FIELD_INFO_EXTENSION)
      .and_then(|info| info.get("format"))
      .and_then(Value::as_str)
      .and_then(|format| FieldFormat::from_str(format).ok());

    Self {
      behaviors,
      restrictions,
      format,
      deprecated: is_deprecated(raw),
    }
  }

  pub fn is_required(&self) -> bool {
    self.behaviors.contains(&FieldBehavior::Required)
  }

  /// Internal fields stay hidden unless they are also marked for preview.
  pub fn is_hidden(&self) -> bool {
    self.has_restriction("INTERNAL") && !self.has_restriction("PREVIEW")
  }

  fn has_restriction(&self, restriction: &str) -> bool {
    self.restrictions.iter().any(|r| r == restriction)
  }
}

pub fn is_deprecated(raw: &RawOptions) -> bool {
  raw.get("deprecated").and_then(Value::as_bool).unwrap_or(false)
}

pub fn is_map_entry(raw: &RawOptions) -> bool {
  raw.get("mapEntry").and_then(Value::as_bool).unwrap_or(false)
}

/// `google.api.HttpRule` in its JSON encoding. Both the protojson camelCase
/// keys and the original snake_case names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHttpRule {
  pub get: Option<String>,
  pub put: Option<String>,
  pub post: Option<String>,
  pub delete: Option<String>,
  pub patch: Option<String>,
  pub custom: Option<RawCustomPattern>,
  #[serde(default)]
  pub body: String,
  #[serde(default, alias = "response_body")]
  pub response_body: String,
  #[serde(default, alias = "additional_bindings")]
  pub additional_bindings: Vec<RawHttpRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawCustomPattern {
  #[serde(default)]
  pub kind: String,
  #[serde(default)]
  pub path: String,
}

pub fn http_rule(raw: &RawOptions) -> Result<Option<RawHttpRule>, serde_json::Error> {
  raw
    .get(HTTP_EXTENSION)
    .map(|value| serde_json::from_value(value.clone()))
    .transpose()
}
