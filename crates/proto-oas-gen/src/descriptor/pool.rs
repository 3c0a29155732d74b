use std::collections::{BTreeSet, HashMap};

use anyhow::Context;
use indexmap::IndexMap;

use super::{
  kinds::{Cardinality, FieldKind},
  options::{self, FieldOptions, RawHttpRule},
  raw::{RawDescriptorInput, RawEnum, RawFile, RawMessage, RawService},
};

const WELL_KNOWN_PACKAGE: &str = "google.protobuf";

// Field numbers inside descriptor.proto used by SourceCodeInfo paths.
const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const FILE_SERVICE: i32 = 6;
const MESSAGE_FIELD: i32 = 2;
const MESSAGE_NESTED_TYPE: i32 = 3;
const MESSAGE_ENUM_TYPE: i32 = 4;
const SERVICE_METHOD: i32 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
  pub leading: Option<String>,
  pub trailing: Option<String>,
}

impl Comments {
  pub fn leading(&self) -> Option<String> {
    self.leading.as_deref().and_then(clean_comment)
  }

  pub fn trailing(&self) -> Option<String> {
    self.trailing.as_deref().and_then(clean_comment)
  }
}

/// Trims surrounding whitespace and leading `//` markers. Blank comments yield `None`.
pub fn clean_comment(raw: &str) -> Option<String> {
  let cleaned = raw.trim().trim_start_matches(['/', ' ']).trim_end();
  (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oneof {
  pub name: String,
  pub synthetic: bool,
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
  pub name: String,
  pub full_name: String,
  pub json_name: String,
  pub number: i32,
  pub kind: FieldKind,
  pub cardinality: Cardinality,
  pub type_name: Option<String>,
  pub map_entry: bool,
  pub oneof: Option<Oneof>,
  pub options: FieldOptions,
  pub comments: Comments,
}

impl FieldDescriptor {
  pub const fn is_map(&self) -> bool {
    self.map_entry
  }

  pub fn is_list(&self) -> bool {
    self.cardinality == Cardinality::Repeated && !self.map_entry
  }

  /// Members of a declared `oneof`. Proto3 `optional` fields live in a
  /// synthetic oneof and are not counted.
  pub fn in_declared_oneof(&self) -> bool {
    self.oneof.as_ref().is_some_and(|oneof| !oneof.synthetic)
  }

  pub fn type_name(&self) -> &str {
    self.type_name.as_deref().unwrap_or_default()
  }
}

#[derive(Debug, Clone)]
pub struct MessageDescriptor {
  pub full_name: String,
  pub package: String,
  pub schema_name: String,
  pub fields: Vec<FieldDescriptor>,
  pub nested_messages: Vec<String>,
  pub nested_enums: Vec<String>,
  pub map_entry: bool,
  pub deprecated: bool,
  pub comments: Comments,
}

impl MessageDescriptor {
  pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
    self.fields.iter().find(|field| field.name == name)
  }

  pub fn field_by_json_name(&self, json_name: &str) -> Option<&FieldDescriptor> {
    self.fields.iter().find(|field| field.json_name == json_name)
  }

  pub fn map_key(&self) -> Option<&FieldDescriptor> {
    self.fields.iter().find(|field| field.number == 1)
  }

  pub fn map_value(&self) -> Option<&FieldDescriptor> {
    self.fields.iter().find(|field| field.number == 2)
  }

  pub fn is_well_known(&self) -> bool {
    self.package == WELL_KNOWN_PACKAGE
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
  pub name: String,
  pub number: i32,
}

#[derive(Debug, Clone)]
pub struct EnumDescriptor {
  pub full_name: String,
  pub package: String,
  pub schema_name: String,
  pub values: Vec<EnumValue>,
  pub generate: bool,
  pub comments: Comments,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
  pub name: String,
  pub full_name: String,
  pub input_type: String,
  pub output_type: String,
  pub client_streaming: bool,
  pub server_streaming: bool,
  pub deprecated: bool,
  pub http: Option<RawHttpRule>,
  pub comments: Comments,
}

#[derive(Debug, Clone)]
pub struct ServiceDescriptor {
  pub name: String,
  pub full_name: String,
  pub methods: Vec<MethodDescriptor>,
  pub comments: Comments,
}

#[derive(Debug, Clone)]
pub struct FileDescriptor {
  pub name: String,
  pub package: String,
  pub generate: bool,
  /// Messages declared in this file, nested ones included, in declaration order.
  pub messages: Vec<String>,
  pub enums: Vec<String>,
  pub services: Vec<ServiceDescriptor>,
}

/// Read-only, fully resolved view over a descriptor set.
///
/// Messages and enums are keyed by their fully-qualified name without the
/// leading dot (`library.v1.Book`).
#[derive(Debug, Clone, Default)]
pub struct DescriptorPool {
  files: Vec<FileDescriptor>,
  messages: IndexMap<String, MessageDescriptor>,
  enums: IndexMap<String, EnumDescriptor>,
}

impl DescriptorPool {
  pub fn from_json(bytes: &[u8]) -> anyhow::Result<Self> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let raw: RawDescriptorInput = serde_path_to_error::deserialize(&mut de).map_err(|err| {
      let path = err.path().to_string();
      anyhow::anyhow!("invalid descriptor set at {path}: {}", err.into_inner())
    })?;
    Self::from_raw(raw)
  }

  pub fn from_raw(raw: RawDescriptorInput) -> anyhow::Result<Self> {
    let (files, generate) = raw.into_files();
    let generate = generate.into_iter().collect::<BTreeSet<_>>();

    let mut pool = Self::default();
    for file in &files {
      let is_generated = generate.contains(&file.name);
      let indexed = FileIndexer::new(&mut pool, file, is_generated)
        .index()
        .with_context(|| format!("index {}", file.name))?;
      pool.files.push(indexed);
    }
    pool.link_map_entries();
    Ok(pool)
  }

  pub fn files(&self) -> &[FileDescriptor] {
    &self.files
  }

  pub fn generated_files(&self) -> impl Iterator<Item = &FileDescriptor> {
    self.files.iter().filter(|file| file.generate)
  }

  /// Services declared in files selected for generation.
  pub fn services(&self) -> impl Iterator<Item = &ServiceDescriptor> {
    self.generated_files().flat_map(|file| file.services.iter())
  }

  pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
    self.messages.get(name.trim_start_matches('.'))
  }

  pub fn enumeration(&self, name: &str) -> Option<&EnumDescriptor> {
    self.enums.get(name.trim_start_matches('.'))
  }

  pub fn messages(&self) -> impl Iterator<Item = &MessageDescriptor> {
    self.messages.values()
  }

  pub fn enums(&self) -> impl Iterator<Item = &EnumDescriptor> {
    self.enums.values()
  }

  fn link_map_entries(&mut self) {
    let entries = self
      .messages
      .values()
      .filter(|message| message.map_entry)
      .map(|message| message.full_name.clone())
      .collect::<BTreeSet<_>>();

    for message in self.messages.values_mut() {
      for field in &mut message.fields {
        field.map_entry = field.kind == FieldKind::Message
          && field.cardinality == Cardinality::Repeated
          && entries.contains(field.type_name());
      }
    }
  }
}

/// Walks one file, registering its types in the pool and attaching source comments.
struct FileIndexer<'a> {
  pool: &'a mut DescriptorPool,
  file: &'a RawFile,
  generate: bool,
  comments: HashMap<Vec<i32>, Comments>,
}

impl<'a> FileIndexer<'a> {
  fn new(pool: &'a mut DescriptorPool, file: &'a RawFile, generate: bool) -> Self {
    let comments = file
      .source_code_info
      .iter()
      .flat_map(|info| info.location.iter())
      .map(|location| {
        (
          location.path.clone(),
          Comments {
            leading: location.leading_comments.clone(),
            trailing: location.trailing_comments.clone(),
          },
        )
      })
      .collect();

    Self {
      pool,
      file,
      generate,
      comments,
    }
  }

  fn index(mut self) -> anyhow::Result<FileDescriptor> {
    let file = self.file;
    let mut messages = vec![];
    let mut enums = vec![];

    for (i, message) in file.message_type.iter().enumerate() {
      let path = vec![FILE_MESSAGE_TYPE, index_path(i)];
      self.index_message(message, &file.package, path, &mut messages, &mut enums)?;
    }

    for (i, raw) in file.enum_type.iter().enumerate() {
      let path = vec![FILE_ENUM_TYPE, index_path(i)];
      enums.push(self.index_enum(raw, &file.package, &path));
    }

    let services = file
      .service
      .iter()
      .enumerate()
      .map(|(i, service)| self.index_service(service, i))
      .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(FileDescriptor {
      name: file.name.clone(),
      package: file.package.clone(),
      generate: self.generate,
      messages,
      enums,
      services,
    })
  }

  fn comments_at(&self, path: &[i32]) -> Comments {
    self.comments.get(path).cloned().unwrap_or_default()
  }

  fn index_message(
    &mut self,
    raw: &RawMessage,
    scope: &str,
    path: Vec<i32>,
    messages: &mut Vec<String>,
    enums: &mut Vec<String>,
  ) -> anyhow::Result<()> {
    let full_name = qualify(scope, &raw.name);
    let package = self.file.package.clone();

    let fields = raw
      .field
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let kind = field
          .kind
          .with_context(|| format!("field {full_name}.{} has no type", field.name))?;
        let mut field_path = path.clone();
        field_path.extend([MESSAGE_FIELD, index_path(i)]);

        Ok(FieldDescriptor {
          name: field.name.clone(),
          full_name: format!("{full_name}.{}", field.name),
          json_name: field.json_name.clone().unwrap_or_else(|| json_name(&field.name)),
          number: field.number,
          kind,
          cardinality: field.label.unwrap_or_default(),
          type_name: field
            .type_name
            .as_deref()
            .map(|name| name.trim_start_matches('.').to_string()),
          map_entry: false,
          oneof: field.oneof_index.and_then(|index| raw.oneof_decl.get(index)).map(|oneof| Oneof {
            name: oneof.name.clone(),
            synthetic: field.proto3_optional,
          }),
          options: FieldOptions::from_raw(&field.options),
          comments: self.comments_at(&field_path),
        })
      })
      .collect::<anyhow::Result<Vec<_>>>()?;

    messages.push(full_name.clone());

    let mut nested_messages = vec![];
    for (i, nested) in raw.nested_type.iter().enumerate() {
      let mut nested_path = path.clone();
      nested_path.extend([MESSAGE_NESTED_TYPE, index_path(i)]);
      nested_messages.push(qualify(&full_name, &nested.name));
      self.index_message(nested, &full_name, nested_path, messages, enums)?;
    }

    let mut nested_enums = vec![];
    for (i, nested) in raw.enum_type.iter().enumerate() {
      let mut nested_path = path.clone();
      nested_path.extend([MESSAGE_ENUM_TYPE, index_path(i)]);
      let name = self.index_enum(nested, &full_name, &nested_path);
      nested_enums.push(name.clone());
      enums.push(name);
    }

    let descriptor = MessageDescriptor {
      schema_name: strip_package(&full_name, &package),
      full_name: full_name.clone(),
      package,
      fields,
      nested_messages,
      nested_enums,
      map_entry: options::is_map_entry(&raw.options),
      deprecated: options::is_deprecated(&raw.options),
      comments: self.comments_at(&path),
    };
    self.pool.messages.insert(full_name, descriptor);
    Ok(())
  }

  fn index_enum(&mut self, raw: &RawEnum, scope: &str, path: &[i32]) -> String {
    let full_name = qualify(scope, &raw.name);
    let descriptor = EnumDescriptor {
      schema_name: strip_package(&full_name, &self.file.package),
      full_name: full_name.clone(),
      package: self.file.package.clone(),
      values: raw
        .value
        .iter()
        .map(|value| EnumValue {
          name: value.name.clone(),
          number: value.number,
        })
        .collect(),
      generate: self.generate,
      comments: self.comments_at(path),
    };
    self.pool.enums.insert(full_name.clone(), descriptor);
    full_name
  }

  fn index_service(&self, raw: &RawService, index: usize) -> anyhow::Result<ServiceDescriptor> {
    let full_name = qualify(&self.file.package, &raw.name);
    let service_path = [FILE_SERVICE, index_path(index)];

    let methods = raw
      .method
      .iter()
      .enumerate()
      .map(|(i, method)| {
        let method_full_name = format!("{full_name}.{}", method.name);
        let http = options::http_rule(&method.options)
          .with_context(|| format!("invalid google.api.http option on {method_full_name}"))?;
        let path = [FILE_SERVICE, index_path(index), SERVICE_METHOD, index_path(i)];

        Ok(MethodDescriptor {
          name: method.name.clone(),
          full_name: method_full_name,
          input_type: method.input_type.trim_start_matches('.').to_string(),
          output_type: method.output_type.trim_start_matches('.').to_string(),
          client_streaming: method.client_streaming,
          server_streaming: method.server_streaming,
          deprecated: options::is_deprecated(&method.options),
          http,
          comments: self.comments_at(&path),
        })
      })
      .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(ServiceDescriptor {
      name: raw.name.clone(),
      full_name,
      methods,
      comments: self.comments_at(&service_path),
    })
  }
}

fn index_path(index: usize) -> i32 {
  i32::try_from(index).unwrap_or(i32::MAX)
}

fn qualify(scope: &str, name: &str) -> String {
  if scope.is_empty() {
    name.to_string()
  } else {
    format!("{scope}.{name}")
  }
}

/// Drops the package prefix and its trailing dot: `pkg.v1.Outer.Inner` becomes `Outer.Inner`.
pub fn strip_package(full_name: &str, package: &str) -> String {
  if package.is_empty() {
    return full_name.to_string();
  }
  full_name
    .strip_prefix(package)
    .and_then(|rest| rest.strip_prefix('.'))
    .unwrap_or(full_name)
    .to_string()
}

/// Default JSON name protoc assigns to a field: underscores are dropped and
/// the following character is upper-cased.
pub fn json_name(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut upper_next = false;
  for ch in name.chars() {
    if ch == '_' {
      upper_next = true;
    } else if upper_next {
      out.push(ch.to_ascii_uppercase());
      upper_next = false;
    } else {
      out.push(ch);
    }
  }
  out
}
