use std::collections::{BTreeMap, BTreeSet};

use oas3::spec::{ObjectOrReference, ObjectSchema};

pub(crate) const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// The descriptor a component schema was synthesized from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum SchemaOrigin {
  Message(String),
  Enum(String),
}

impl SchemaOrigin {
  pub fn full_name(&self) -> &str {
    match self {
      Self::Message(name) | Self::Enum(name) => name,
    }
  }
}

/// Name-keyed, write-once table of component schemas.
///
/// Descriptors are claimed before their schema is built, so a message that
/// refers back to itself resolves to a `$ref` instead of recursing.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
  names: BTreeMap<String, String>,
  owners: BTreeMap<String, SchemaOrigin>,
  schemas: BTreeMap<String, ObjectSchema>,
  pending: BTreeSet<String>,
  requests: BTreeSet<String>,
}

impl SchemaRegistry {
  pub fn ref_path(name: &str) -> String {
    format!("{SCHEMA_REF_PREFIX}{name}")
  }

  pub fn parse_ref(ref_path: &str) -> Option<&str> {
    ref_path.strip_prefix(SCHEMA_REF_PREFIX)
  }

  pub fn reference(name: &str, description: Option<String>) -> ObjectOrReference<ObjectSchema> {
    ObjectOrReference::Ref {
      ref_path: Self::ref_path(name),
      summary: None,
      description,
    }
  }

  /// Component name for `origin`. The package-stripped `preferred` name is used
  /// unless another descriptor already holds it, in which case the fully
  /// qualified name is used instead.
  pub fn component_name(&mut self, origin: &SchemaOrigin, preferred: &str) -> String {
    if let Some(name) = self.names.get(origin.full_name()) {
      return name.clone();
    }

    let name = match self.owners.get(preferred) {
      Some(owner) if owner != origin => origin.full_name().to_string(),
      _ => preferred.to_string(),
    };
    self.names.insert(origin.full_name().to_string(), name.clone());
    self.owners.insert(name.clone(), origin.clone());
    name
  }

  /// Registered or currently being built.
  pub fn is_claimed(&self, full_name: &str) -> bool {
    self.pending.contains(full_name) || self.is_registered(full_name)
  }

  pub fn is_registered(&self, full_name: &str) -> bool {
    self
      .names
      .get(full_name)
      .is_some_and(|name| self.schemas.contains_key(name))
  }

  /// Marks `full_name` as in progress. Returns `false` when it was already claimed.
  pub fn claim(&mut self, full_name: &str) -> bool {
    if self.is_claimed(full_name) {
      return false;
    }
    self.pending.insert(full_name.to_string())
  }

  pub fn insert(&mut self, name: String, schema: ObjectSchema) {
    if let Some(owner) = self.owners.get(&name) {
      self.pending.remove(owner.full_name());
    }
    self.schemas.entry(name).or_insert(schema);
  }

  pub fn mark_request(&mut self, full_name: &str) {
    self.requests.insert(full_name.to_string());
  }

  pub fn is_request(&self, full_name: &str) -> bool {
    self.requests.contains(full_name)
  }

  /// Registered schemas with their origins, sorted by component name.
  pub fn entries(&self) -> impl Iterator<Item = (&str, &ObjectSchema, &SchemaOrigin)> {
    self
      .schemas
      .iter()
      .filter_map(|(name, schema)| self.owners.get(name).map(|origin| (name.as_str(), schema, origin)))
  }

  pub fn to_components(&self) -> BTreeMap<String, ObjectOrReference<ObjectSchema>> {
    self
      .schemas
      .iter()
      .map(|(name, schema)| (name.clone(), ObjectOrReference::Object(schema.clone())))
      .collect()
  }
}
