//! Serde model of the protobuf JSON encoding of descriptor sets.
//!
//! Only the parts of `descriptor.proto` and `plugin.proto` the generator reads
//! are modelled. Unknown keys are ignored.

use serde::Deserialize;

use super::{
  kinds::{Cardinality, FieldKind},
  options::RawOptions,
};

/// Either a `FileDescriptorSet` or a `CodeGeneratorRequest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDescriptorInput {
  #[serde(default)]
  pub file: Vec<RawFile>,
  #[serde(default)]
  pub file_to_generate: Vec<String>,
  #[serde(default)]
  pub proto_file: Vec<RawFile>,
  pub parameter: Option<String>,
}

impl RawDescriptorInput {
  /// Splits the envelope into the file list and the names of files to generate.
  /// A bare descriptor set generates every file it carries.
  pub fn into_files(self) -> (Vec<RawFile>, Vec<String>) {
    if self.proto_file.is_empty() {
      let generate = self.file.iter().map(|file| file.name.clone()).collect();
      (self.file, generate)
    } else {
      (self.proto_file, self.file_to_generate)
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFile {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub package: String,
  #[serde(default)]
  pub dependency: Vec<String>,
  #[serde(default)]
  pub message_type: Vec<RawMessage>,
  #[serde(default)]
  pub enum_type: Vec<RawEnum>,
  #[serde(default)]
  pub service: Vec<RawService>,
  pub source_code_info: Option<RawSourceCodeInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
  pub name: String,
  #[serde(default)]
  pub field: Vec<RawField>,
  #[serde(default)]
  pub nested_type: Vec<RawMessage>,
  #[serde(default)]
  pub enum_type: Vec<RawEnum>,
  #[serde(default)]
  pub oneof_decl: Vec<RawOneof>,
  #[serde(default)]
  pub options: RawOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
  pub name: String,
  #[serde(default)]
  pub number: i32,
  pub label: Option<Cardinality>,
  #[serde(rename = "type")]
  pub kind: Option<FieldKind>,
  pub type_name: Option<String>,
  pub json_name: Option<String>,
  pub oneof_index: Option<usize>,
  #[serde(default)]
  pub proto3_optional: bool,
  #[serde(default)]
  pub options: RawOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOneof {
  pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnum {
  pub name: String,
  #[serde(default)]
  pub value: Vec<RawEnumValue>,
  #[serde(default)]
  pub options: RawOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnumValue {
  pub name: String,
  #[serde(default)]
  pub number: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawService {
  pub name: String,
  #[serde(default)]
  pub method: Vec<RawMethod>,
  #[serde(default)]
  pub options: RawOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMethod {
  pub name: String,
  pub input_type: String,
  pub output_type: String,
  #[serde(default)]
  pub client_streaming: bool,
  #[serde(default)]
  pub server_streaming: bool,
  #[serde(default)]
  pub options: RawOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSourceCodeInfo {
  #[serde(default)]
  pub location: Vec<RawLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
  #[serde(default)]
  pub path: Vec<i32>,
  pub leading_comments: Option<String>,
  pub trailing_comments: Option<String>,
}
