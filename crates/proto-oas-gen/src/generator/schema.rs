use oas3::spec::{ObjectOrReference, ObjectSchema, Schema, SchemaType, SchemaTypeSet};
use serde_json::Value;

use crate::{
  descriptor::{DescriptorPool, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor},
  generator::{
    errors::{GenerateError, GenerateResult},
    schema_registry::{SchemaOrigin, SchemaRegistry},
  },
};

const DYNAMIC_VALUES_UNSUPPORTED: &str = "dynamic values are unsupported yet";

/// Maps descriptors to schema nodes, registering every named type it meets.
pub struct TypeSynthesizer<'a> {
  pool: &'a DescriptorPool,
  registry: SchemaRegistry,
}

impl<'a> TypeSynthesizer<'a> {
  pub fn new(pool: &'a DescriptorPool) -> Self {
    Self {
      pool,
      registry: SchemaRegistry::default(),
    }
  }

  pub fn registry(&self) -> &SchemaRegistry {
    &self.registry
  }

  pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
    &mut self.registry
  }

  pub fn into_registry(self) -> SchemaRegistry {
    self.registry
  }

  pub fn message(&self, name: &str) -> GenerateResult<&'a MessageDescriptor> {
    self.pool.message(name).ok_or_else(|| GenerateError::unknown_type(name))
  }

  pub fn enumeration(&self, name: &str) -> GenerateResult<&'a EnumDescriptor> {
    self.pool.enumeration(name).ok_or_else(|| GenerateError::unknown_type(name))
  }

  /// `$ref` to the message's component schema, synthesizing it on first use.
  pub fn message_ref(&mut self, full_name: &str) -> GenerateResult<ObjectOrReference<ObjectSchema>> {
    let name = self.ensure_message(full_name)?;
    Ok(SchemaRegistry::reference(&name, None))
  }

  /// Registers the message schema if it is not already known and returns its component name.
  pub fn ensure_message(&mut self, full_name: &str) -> GenerateResult<String> {
    let message = self.message(full_name)?;
    let origin = SchemaOrigin::Message(message.full_name.clone());
    let name = self.registry.component_name(&origin, &message.schema_name);

    if self.registry.claim(&message.full_name) {
      let fields = message.fields.iter().collect::<Vec<_>>();
      let mut schema = self.object_schema(&fields)?;
      schema.description = message.comments.leading();
      schema.deprecated = message.deprecated.then_some(true);
      self.registry.insert(name.clone(), schema);
    }

    Ok(name)
  }

  pub fn ensure_enum(&mut self, full_name: &str) -> GenerateResult<String> {
    let descriptor = self.enumeration(full_name)?;
    let origin = SchemaOrigin::Enum(descriptor.full_name.clone());
    let name = self.registry.component_name(&origin, &descriptor.schema_name);

    if self.registry.claim(&descriptor.full_name) {
      self.registry.insert(name.clone(), enum_schema(descriptor));
    }

    Ok(name)
  }

  /// Object schema over exactly `fields`, keyed by JSON name.
  pub fn object_schema(&mut self, fields: &[&FieldDescriptor]) -> GenerateResult<ObjectSchema> {
    let mut schema = typed(SchemaType::Object, None);
    for field in fields {
      let property = self.field_schema(field, field.comments.trailing())?;
      if field.options.is_required() {
        schema.required.push(field.json_name.clone());
      }
      schema.properties.insert(field.json_name.clone(), property);
    }
    Ok(schema)
  }

  /// Schema of a single field, with repeated cardinality wrapped in an array.
  pub fn field_schema(
    &mut self,
    field: &FieldDescriptor,
    description: Option<String>,
  ) -> GenerateResult<ObjectOrReference<ObjectSchema>> {
    let element = self.element_schema(field)?;
    let deprecated = field.options.deprecated.then_some(true);

    if field.is_list() {
      return Ok(ObjectOrReference::Object(ObjectSchema {
        items: Some(Box::new(Schema::Object(Box::new(element)))),
        description,
        deprecated,
        ..typed(SchemaType::Array, None)
      }));
    }

    Ok(annotate(element, description, deprecated))
  }

  fn element_schema(&mut self, field: &FieldDescriptor) -> GenerateResult<ObjectOrReference<ObjectSchema>> {
    if field.kind.is_named()
      && let Some(schema) = well_known_schema(field.type_name())?
    {
      return Ok(ObjectOrReference::Object(schema));
    }

    match field.kind {
      FieldKind::Enum => {
        let name = self.ensure_enum(field.type_name())?;
        Ok(SchemaRegistry::reference(&name, None))
      }
      FieldKind::Message if field.is_map() => self.map_schema(field).map(ObjectOrReference::Object),
      FieldKind::Message => self.message_ref(field.type_name()),
      FieldKind::Group => Err(GenerateError::unsupported(&field.full_name, "unsupported kind: group")),
      kind => scalar_schema(kind)
        .map(ObjectOrReference::Object)
        .ok_or_else(|| GenerateError::unsupported(&field.full_name, format!("unsupported kind: {kind}"))),
    }
  }

  fn map_schema(&mut self, field: &FieldDescriptor) -> GenerateResult<ObjectSchema> {
    let entry = self.message(field.type_name())?;
    let (Some(key), Some(value)) = (entry.map_key(), entry.map_value()) else {
      return Err(GenerateError::unsupported(&entry.full_name, "malformed map entry"));
    };

    if key.kind != FieldKind::String {
      return Err(GenerateError::unsupported(
        &field.full_name,
        format!("unsupported map key kind: {}", key.kind),
      ));
    }

    let value_schema = self.field_schema(value, None)?;
    Ok(ObjectSchema {
      additional_properties: Some(Schema::Object(Box::new(value_schema))),
      ..typed(SchemaType::Object, None)
    })
  }
}

/// Schema of a well-known type with a fixed JSON mapping, `None` for ordinary
/// types, or an error for well-known types that cannot be described.
pub fn well_known_schema(type_name: &str) -> GenerateResult<Option<ObjectSchema>> {
  let schema = match type_name.trim_start_matches('.') {
    "google.protobuf.BoolValue" => nullable(SchemaType::Boolean, None),
    "google.protobuf.Int32Value" => nullable(SchemaType::Integer, Some("int32")),
    "google.protobuf.UInt32Value" => nullable(SchemaType::Integer, Some("uint32")),
    "google.protobuf.Int64Value" => nullable(SchemaType::Integer, Some("int64")),
    "google.protobuf.UInt64Value" => nullable(SchemaType::Integer, Some("uint64")),
    "google.protobuf.FloatValue" => nullable(SchemaType::Number, Some("float")),
    "google.protobuf.DoubleValue" => nullable(SchemaType::Number, Some("double")),
    "google.protobuf.StringValue" => nullable(SchemaType::String, None),
    "google.protobuf.BytesValue" => nullable(SchemaType::String, Some("base64")),
    "google.protobuf.Duration" => typed(SchemaType::String, Some("duration")),
    "google.protobuf.Timestamp" => typed(SchemaType::String, Some("date-time")),
    "google.protobuf.Any"
    | "google.protobuf.Value"
    | "google.protobuf.NullValue"
    | "google.protobuf.ListValue"
    | "google.protobuf.Struct" => return Err(GenerateError::unsupported(type_name, DYNAMIC_VALUES_UNSUPPORTED)),
    "google.api.HttpBody" => return Err(GenerateError::unsupported(type_name, "HttpBody is unsupported yet")),
    _ => return Ok(None),
  };
  Ok(Some(schema))
}

/// Scalar table for non-named kinds. Byte payloads travel as base64 text.
pub fn scalar_schema(kind: FieldKind) -> Option<ObjectSchema> {
  let schema = match kind {
    FieldKind::Bool => typed(SchemaType::Boolean, None),
    FieldKind::Int32 | FieldKind::Sint32 | FieldKind::Sfixed32 => typed(SchemaType::Integer, Some("int32")),
    FieldKind::Uint32 | FieldKind::Fixed32 => typed(SchemaType::Integer, Some("uint32")),
    FieldKind::Int64 | FieldKind::Sint64 | FieldKind::Sfixed64 => typed(SchemaType::Integer, Some("int64")),
    FieldKind::Uint64 | FieldKind::Fixed64 => typed(SchemaType::Integer, Some("uint64")),
    FieldKind::Float => typed(SchemaType::Number, Some("float")),
    FieldKind::Double => typed(SchemaType::Number, Some("double")),
    FieldKind::String => typed(SchemaType::String, None),
    FieldKind::Bytes => typed(SchemaType::String, Some("base64")),
    FieldKind::Enum | FieldKind::Message | FieldKind::Group => return None,
  };
  Some(schema)
}

pub fn enum_schema(descriptor: &EnumDescriptor) -> ObjectSchema {
  ObjectSchema {
    enum_values: descriptor
      .values
      .iter()
      .map(|value| Value::String(value.name.clone()))
      .collect(),
    description: descriptor.comments.leading(),
    ..typed(SchemaType::String, None)
  }
}

fn typed(schema_type: SchemaType, format: Option<&str>) -> ObjectSchema {
  ObjectSchema {
    schema_type: Some(SchemaTypeSet::Single(schema_type)),
    format: format.map(ToString::to_string),
    ..Default::default()
  }
}

fn nullable(schema_type: SchemaType, format: Option<&str>) -> ObjectSchema {
  ObjectSchema {
    schema_type: Some(SchemaTypeSet::Multiple(vec![schema_type, SchemaType::Null])),
    format: format.map(ToString::to_string),
    ..Default::default()
  }
}

fn annotate(
  schema: ObjectOrReference<ObjectSchema>,
  description: Option<String>,
  deprecated: Option<bool>,
) -> ObjectOrReference<ObjectSchema> {
  match schema {
    ObjectOrReference::Object(mut object) => {
      if description.is_some() {
        object.description = description;
      }
      if deprecated.is_some() {
        object.deprecated = deprecated;
      }
      ObjectOrReference::Object(object)
    }
    // `deprecated` is not allowed beside `$ref`; it goes on an `allOf` wrapper.
    ObjectOrReference::Ref { ref_path, summary, .. } if deprecated.is_some() => {
      ObjectOrReference::Object(ObjectSchema {
        all_of: vec![ObjectOrReference::Ref {
          ref_path,
          summary,
          description: None,
        }],
        description,
        deprecated,
        ..Default::default()
      })
    }
    ObjectOrReference::Ref { ref_path, summary, .. } => ObjectOrReference::Ref {
      ref_path,
      summary,
      description,
    },
  }
}
