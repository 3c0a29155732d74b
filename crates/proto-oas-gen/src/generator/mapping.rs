//! Reverse mapping from the synthesized document back to RPC types.
//!
//! Glue code routing HTTP requests to RPC implementations needs to know, for
//! each operation, which input fields the path and query parameters fill,
//! what the request body carries and which part of the output message is
//! returned. Component schemas are mapped back to their messages and enums.

use std::collections::BTreeMap;

use itertools::Itertools;
use oas3::spec::{MediaType, ObjectOrReference, Operation, ParameterIn};
use serde::Serialize;

use crate::{
  descriptor::{DescriptorPool, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor},
  generator::{
    document::{AssembledDocument, OperationOrigin},
    errors::{GenerateError, GenerateResult},
    http_rule::HttpMethod,
    naming::{field_ident, split_dotted},
    operation::{BODY_WILDCARD, JSON_CONTENT_TYPE, SUCCESS_STATUS},
    schema_registry::{SchemaOrigin, SchemaRegistry},
  },
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mapping {
  pub services: Vec<ServiceMapping>,
  pub messages: Vec<MessageMapping>,
  pub enums: Vec<EnumMapping>,
}

impl Mapping {
  pub fn methods(&self) -> impl Iterator<Item = &MethodMapping> {
    self.services.iter().flat_map(|service| service.methods.iter())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceMapping {
  pub proto_name: String,
  pub methods: Vec<MethodMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodMapping {
  pub proto_name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub operation_id: Option<String>,
  pub http_method: HttpMethod,
  pub path: String,
  pub input: InputMapping,
  pub output: OutputMapping,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputMapping {
  pub proto_type: String,
  pub path: Vec<FieldMapping>,
  pub query: Vec<FieldMapping>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<BodyMapping>,
}

/// `schema` names the component the body refers to; inline bodies have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyMapping {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub schema: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<FieldMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputMapping {
  pub proto_type: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub schema: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<FieldMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
  /// Property or parameter name on the OpenAPI side.
  pub schema_name: String,
  /// Dotted protobuf field names from the containing message down to the field.
  pub proto_path: String,
  /// Identifier of the leaf field in generated Rust code.
  pub proto_ident: String,
  pub kind: FieldKind,
}

impl FieldMapping {
  fn new(schema_name: impl Into<String>, path: &[&FieldDescriptor]) -> Option<Self> {
    let leaf = path.last()?;
    Some(Self {
      schema_name: schema_name.into(),
      proto_path: path.iter().map(|field| field.name.as_str()).join("."),
      proto_ident: field_ident(&leaf.name),
      kind: leaf.kind,
    })
  }

  fn of_field(field: &FieldDescriptor) -> Self {
    Self {
      schema_name: field.json_name.clone(),
      proto_path: field.name.clone(),
      proto_ident: field_ident(&field.name),
      kind: field.kind,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageMapping {
  pub proto_type: String,
  pub schema_name: String,
  pub fields: Vec<FieldMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumMapping {
  pub proto_type: String,
  pub schema_name: String,
  pub name_to_value: BTreeMap<String, i32>,
  pub value_to_name: BTreeMap<i32, String>,
}

/// Rebuilds the correspondence between `document` and the descriptors it was
/// synthesized from.
pub fn build_mapping(pool: &DescriptorPool, document: &AssembledDocument<'_>) -> GenerateResult<Mapping> {
  let mut services = BTreeMap::<String, Vec<MethodMapping>>::new();

  for (path, item) in document.spec.paths.iter().flatten() {
    let mut methods = item
      .methods()
      .into_iter()
      .filter_map(|(method, operation)| HttpMethod::from_http(&method).map(|method| (method, operation)))
      .collect::<Vec<_>>();
    methods.sort_by_key(|(method, _)| *method);

    for (http_method, operation) in methods {
      let origin = document
        .index
        .get(&(path.clone(), http_method))
        .ok_or_else(|| GenerateError::UnmappedOperation {
          method: http_method.to_string(),
          path: path.clone(),
        })?;

      let mapping = method_mapping(pool, path, http_method, operation, origin)?;
      services
        .entry(origin.service.full_name.clone())
        .or_default()
        .push(mapping);
    }
  }

  let services = services
    .into_iter()
    .map(|(proto_name, methods)| ServiceMapping { proto_name, methods })
    .collect();

  let mut messages = vec![];
  let mut enums = vec![];
  for (schema_name, _, origin) in document.registry.entries() {
    match origin {
      SchemaOrigin::Message(full_name) => {
        let message = message(pool, full_name)?;
        messages.push(message_mapping(message, schema_name));
      }
      SchemaOrigin::Enum(full_name) => {
        let descriptor = pool
          .enumeration(full_name)
          .ok_or_else(|| GenerateError::unknown_type(full_name))?;
        enums.push(enum_mapping(descriptor, schema_name));
      }
    }
  }
  messages.sort_by(|a, b| a.proto_type.cmp(&b.proto_type));
  enums.sort_by(|a, b| a.proto_type.cmp(&b.proto_type));

  Ok(Mapping {
    services,
    messages,
    enums,
  })
}

fn method_mapping(
  pool: &DescriptorPool,
  path: &str,
  http_method: HttpMethod,
  operation: &Operation,
  origin: &OperationOrigin<'_>,
) -> GenerateResult<MethodMapping> {
  let method = origin.method;
  let input = message(pool, &method.input_type)?;
  let output = message(pool, &method.output_type)?;

  let mut path_params = vec![];
  let mut query_params = vec![];
  for parameter in &operation.parameters {
    let ObjectOrReference::Object(parameter) = parameter else {
      continue;
    };
    match parameter.location {
      ParameterIn::Path => {
        let field = input
          .field_by_json_name(&parameter.name)
          .ok_or_else(|| unknown_field(&parameter.name, input))?;
        path_params.push(FieldMapping::of_field(field));
      }
      ParameterIn::Query => {
        let fields = resolve_dotted(pool, input, &parameter.name)?;
        if let Some(mapping) = FieldMapping::new(parameter.name.clone(), &fields) {
          query_params.push(mapping);
        }
      }
      _ => {}
    }
  }

  let body = match operation.request_body.as_ref() {
    Some(ObjectOrReference::Object(body)) => {
      let schema = schema_ref(&body.content).map(ToString::to_string);
      let field = match origin.rule.body.as_str() {
        "" | BODY_WILDCARD => None,
        selector => {
          let field = input.field(selector).ok_or_else(|| unknown_field(selector, input))?;
          Some(FieldMapping::of_field(field))
        }
      };
      Some(BodyMapping { schema, field })
    }
    _ => None,
  };

  let response_schema = operation
    .responses
    .as_ref()
    .and_then(|responses| responses.get(SUCCESS_STATUS))
    .and_then(|response| match response {
      ObjectOrReference::Object(response) => schema_ref(&response.content),
      ObjectOrReference::Ref { .. } => None,
    })
    .map(ToString::to_string);

  let output_field = match origin.rule.response_body.as_str() {
    "" | BODY_WILDCARD => None,
    selector => {
      let field = output.field(selector).ok_or_else(|| unknown_field(selector, output))?;
      Some(FieldMapping::of_field(field))
    }
  };

  Ok(MethodMapping {
    proto_name: method.full_name.clone(),
    operation_id: operation.operation_id.clone(),
    http_method,
    path: path.to_string(),
    input: InputMapping {
      proto_type: input.full_name.clone(),
      path: path_params,
      query: query_params,
      body,
    },
    output: OutputMapping {
      proto_type: output.full_name.clone(),
      schema: response_schema,
      field: output_field,
    },
  })
}

/// Aliased numbers keep their first declared name, as generated `_name` tables do.
fn enum_mapping(descriptor: &EnumDescriptor, schema_name: &str) -> EnumMapping {
  let mut value_to_name = BTreeMap::new();
  for value in &descriptor.values {
    value_to_name.entry(value.number).or_insert_with(|| value.name.clone());
  }

  EnumMapping {
    proto_type: descriptor.full_name.clone(),
    schema_name: schema_name.to_string(),
    name_to_value: descriptor
      .values
      .iter()
      .map(|value| (value.name.clone(), value.number))
      .collect(),
    value_to_name,
  }
}

fn message_mapping(message: &MessageDescriptor, schema_name: &str) -> MessageMapping {
  MessageMapping {
    proto_type: message.full_name.clone(),
    schema_name: schema_name.to_string(),
    fields: message
      .fields
      .iter()
      .filter(|field| !field.in_declared_oneof())
      .map(FieldMapping::of_field)
      .collect(),
  }
}

/// Walks a dotted query parameter name down through nested messages by JSON name.
fn resolve_dotted<'p>(
  pool: &'p DescriptorPool,
  root: &'p MessageDescriptor,
  name: &str,
) -> GenerateResult<Vec<&'p FieldDescriptor>> {
  let mut fields = vec![];
  let mut current = root;
  let segments = split_dotted(name);

  for (i, segment) in segments.iter().enumerate() {
    let field = current
      .field_by_json_name(segment)
      .ok_or_else(|| unknown_field(segment, current))?;
    fields.push(field);

    if i + 1 < segments.len() {
      current = message(pool, field.type_name())?;
    }
  }
  Ok(fields)
}

/// Component name of the JSON media type's schema when it is a `$ref`.
fn schema_ref(content: &BTreeMap<String, MediaType>) -> Option<&str> {
  match content.get(JSON_CONTENT_TYPE)?.schema.as_ref()? {
    ObjectOrReference::Ref { ref_path, .. } => SchemaRegistry::parse_ref(ref_path),
    ObjectOrReference::Object(_) => None,
  }
}

fn message<'p>(pool: &'p DescriptorPool, name: &str) -> GenerateResult<&'p MessageDescriptor> {
  pool.message(name).ok_or_else(|| GenerateError::unknown_type(name))
}

fn unknown_field(field: &str, message: &MessageDescriptor) -> GenerateError {
  GenerateError::UnknownField {
    field: field.to_string(),
    message: message.full_name.clone(),
  }
}
