use std::collections::BTreeMap;

use oas3::{
  Spec,
  spec::{MediaType, ObjectOrReference, ObjectSchema, Operation, Parameter},
};
use serde_json::{Value, json};

use crate::{
  descriptor::DescriptorPool,
  generator::{
    config::GeneratorConfig,
    http_rule::HttpMethod,
    orchestrator::{GeneratedOutput, Orchestrator},
  },
};

pub(crate) const LIBRARY_FIXTURE: &str = include_str!("../../fixtures/library.json");

pub(crate) fn library_pool() -> DescriptorPool {
  DescriptorPool::from_json(LIBRARY_FIXTURE.as_bytes()).unwrap()
}

pub(crate) fn generate_library(config: GeneratorConfig) -> GeneratedOutput {
  Orchestrator::new(library_pool(), config).generate().unwrap()
}

/// Builds a pool from a single `test.v1` file holding `messages`, `enums` and
/// one `TestService` with `methods`.
pub(crate) fn create_test_pool(messages: Value, enums: Value, methods: Value) -> DescriptorPool {
  let descriptor_set = json!({
    "file": [{
      "name": "test/v1/test.proto",
      "package": "test.v1",
      "messageType": messages,
      "enumType": enums,
      "service": [{ "name": "TestService", "method": methods }]
    }]
  });
  DescriptorPool::from_json(descriptor_set.to_string().as_bytes()).unwrap()
}

pub(crate) fn scalar_field(name: &str, number: i32, kind: &str) -> Value {
  json!({
    "name": name,
    "number": number,
    "label": "LABEL_OPTIONAL",
    "type": kind,
    "jsonName": crate::descriptor::pool::json_name(name)
  })
}

pub(crate) fn typed_field(name: &str, number: i32, kind: &str, type_name: &str) -> Value {
  let mut field = scalar_field(name, number, kind);
  field["typeName"] = json!(format!(".test.v1.{type_name}"));
  field
}

pub(crate) fn repeated(mut field: Value) -> Value {
  field["label"] = json!("LABEL_REPEATED");
  field
}

pub(crate) fn with_options(mut field: Value, options: Value) -> Value {
  field["options"] = options;
  field
}

pub(crate) fn message(name: &str, fields: Value) -> Value {
  json!({ "name": name, "field": fields })
}

/// A method of `TestService` bound by `rule`, the JSON form of `google.api.HttpRule`.
pub(crate) fn http_method(name: &str, input: &str, output: &str, rule: Value) -> Value {
  json!({
    "name": name,
    "inputType": format!(".test.v1.{input}"),
    "outputType": format!(".test.v1.{output}"),
    "options": { "[google.api.http]": rule }
  })
}

pub(crate) fn operation<'s>(spec: &'s Spec, path: &str, method: HttpMethod) -> &'s Operation {
  let item = spec
    .paths
    .as_ref()
    .and_then(|paths| paths.get(path))
    .unwrap_or_else(|| panic!("missing path {path}"));
  let operation = match method {
    HttpMethod::Get => &item.get,
    HttpMethod::Put => &item.put,
    HttpMethod::Post => &item.post,
    HttpMethod::Delete => &item.delete,
    HttpMethod::Patch => &item.patch,
  };
  operation
    .as_ref()
    .unwrap_or_else(|| panic!("missing {method} {path}"))
}

pub(crate) fn parameters(operation: &Operation) -> Vec<&Parameter> {
  operation
    .parameters
    .iter()
    .map(|parameter| match parameter {
      ObjectOrReference::Object(parameter) => parameter,
      ObjectOrReference::Ref { ref_path, .. } => panic!("unexpected parameter reference {ref_path}"),
    })
    .collect()
}

pub(crate) fn json_schema(content: &BTreeMap<String, MediaType>) -> &ObjectOrReference<ObjectSchema> {
  content
    .get("application/json")
    .and_then(|media| media.schema.as_ref())
    .expect("application/json schema")
}

pub(crate) fn ref_path(schema: &ObjectOrReference<ObjectSchema>) -> Option<&str> {
  match schema {
    ObjectOrReference::Ref { ref_path, .. } => Some(ref_path),
    ObjectOrReference::Object(_) => None,
  }
}

pub(crate) fn object(schema: &ObjectOrReference<ObjectSchema>) -> &ObjectSchema {
  match schema {
    ObjectOrReference::Object(object) => object,
    ObjectOrReference::Ref { ref_path, .. } => panic!("expected inline schema, found {ref_path}"),
  }
}

pub(crate) fn response_schema(operation: &Operation) -> &ObjectOrReference<ObjectSchema> {
  let response = operation
    .responses
    .as_ref()
    .and_then(|responses| responses.get("200"))
    .expect("200 response");
  match response {
    ObjectOrReference::Object(response) => json_schema(&response.content),
    ObjectOrReference::Ref { ref_path, .. } => panic!("unexpected response reference {ref_path}"),
  }
}

pub(crate) fn request_schema(operation: &Operation) -> &ObjectOrReference<ObjectSchema> {
  match operation.request_body.as_ref().expect("request body") {
    ObjectOrReference::Object(body) => json_schema(&body.content),
    ObjectOrReference::Ref { ref_path, .. } => panic!("unexpected request body reference {ref_path}"),
  }
}

pub(crate) fn component<'s>(spec: &'s Spec, name: &str) -> &'s ObjectSchema {
  spec
    .components
    .as_ref()
    .and_then(|components| components.schemas.get(name))
    .map(object)
    .unwrap_or_else(|| panic!("missing component {name}"))
}

pub(crate) fn component_names(spec: &Spec) -> Vec<&str> {
  spec
    .components
    .as_ref()
    .map(|components| components.schemas.keys().map(String::as_str).collect())
    .unwrap_or_default()
}
