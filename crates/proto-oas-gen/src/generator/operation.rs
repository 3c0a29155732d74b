use std::collections::BTreeMap;

use indexmap::IndexMap;
use oas3::spec::{
  MediaType, ObjectOrReference, ObjectSchema, Operation, Parameter, ParameterIn, ParameterStyle, RequestBody, Response,
  Schema,
};

use crate::{
  descriptor::{FieldDescriptor, FieldKind, MessageDescriptor, MethodDescriptor},
  generator::{
    errors::{GenerateError, GenerateResult},
    http_rule::{HttpMethod, TranscodingRule},
    naming::lower_first,
    path_template::PathTemplate,
    schema::{TypeSynthesizer, well_known_schema},
  },
};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";
pub(crate) const SUCCESS_STATUS: &str = "200";
pub(crate) const BODY_WILDCARD: &str = "*";

/// Where a synthesized parameter lives. Ordered the way parameters are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Location {
  Path,
  Query,
}

impl Location {
  fn as_parameter_in(self) -> ParameterIn {
    match self {
      Self::Path => ParameterIn::Path,
      Self::Query => ParameterIn::Query,
    }
  }
}

#[derive(Debug, Clone)]
pub struct SynthesizedOperation {
  /// The template with every parameter renamed to its field's JSON name.
  pub path: String,
  pub method: HttpMethod,
  pub operation: Operation,
}

/// Builds the operation for one binding of `method`.
pub fn synthesize(
  types: &mut TypeSynthesizer<'_>,
  method: &MethodDescriptor,
  rule: &TranscodingRule,
) -> GenerateResult<SynthesizedOperation> {
  let input = types.message(&method.input_type)?;
  types.registry_mut().mark_request(&input.full_name);

  let template = PathTemplate::parse(&rule.path_template)?;
  let mut remaining = input
    .fields
    .iter()
    .map(|field| (field.name.as_str(), field))
    .collect::<IndexMap<_, _>>();

  let mut path_fields = vec![];
  let path = template.render_with(|name| {
    let field = remaining
      .shift_remove(name)
      .ok_or_else(|| unknown_field(name, input))?;
    path_fields.push(field);
    Ok::<_, GenerateError>(field.json_name.clone())
  })?;

  let mut parameters = vec![];
  for field in path_fields {
    parameters.push(parameter(types, Location::Path, field.json_name.clone(), field)?);
  }

  let mut request_body = None;
  match rule.body.as_str() {
    BODY_WILDCARD => {
      if !template.has_params() {
        let schema = types.message_ref(&input.full_name)?;
        request_body = Some(json_body(schema, true));
      } else if !remaining.is_empty() {
        let mut fields = remaining.values().copied().collect::<Vec<_>>();
        fields.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        let schema = types.object_schema(&fields)?;
        request_body = Some(json_body(ObjectOrReference::Object(schema), true));
      }
    }
    "" => parameters.extend(query_parameters(types, remaining.values().copied())?),
    selector => {
      let field = remaining
        .shift_remove(selector)
        .ok_or_else(|| unknown_field(selector, input))?;
      let schema = types.field_schema(field, field.comments.trailing())?;
      request_body = Some(json_body(schema, field.options.is_required()));
      parameters.extend(query_parameters(types, remaining.values().copied())?);
    }
  }

  parameters.sort_by(|(a_location, a), (b_location, b)| a_location.cmp(b_location).then_with(|| a.name.cmp(&b.name)));

  let response = response(types, method, &rule.response_body)?;

  let operation = Operation {
    operation_id: (!rule.additional).then(|| lower_first(&method.name)),
    description: method.comments.leading(),
    deprecated: method.deprecated.then_some(true),
    parameters: parameters
      .into_iter()
      .map(|(_, parameter)| ObjectOrReference::Object(parameter))
      .collect(),
    request_body: request_body.map(ObjectOrReference::Object),
    responses: Some(BTreeMap::from([(
      SUCCESS_STATUS.to_string(),
      ObjectOrReference::Object(response),
    )])),
    ..Default::default()
  };

  Ok(SynthesizedOperation {
    path,
    method: rule.method,
    operation,
  })
}

fn response(types: &mut TypeSynthesizer<'_>, method: &MethodDescriptor, selector: &str) -> GenerateResult<Response> {
  let output = types.message(&method.output_type)?;

  let schema = match selector {
    "" | BODY_WILDCARD => types.message_ref(&output.full_name)?,
    selector => {
      let field = output.field(selector).ok_or_else(|| unknown_field(selector, output))?;
      types.field_schema(field, field.comments.leading())?
    }
  };

  Ok(Response {
    description: Some(format!("{} response", method.full_name)),
    content: json_content(schema),
    ..Default::default()
  })
}

fn query_parameters<'a>(
  types: &mut TypeSynthesizer<'a>,
  fields: impl IntoIterator<Item = &'a FieldDescriptor>,
) -> GenerateResult<Vec<(Location, Parameter)>> {
  let mut flattened = vec![];
  let mut visited = vec![];
  flatten_fields(types, "", fields, &mut visited, &mut flattened)?;

  flattened
    .into_iter()
    .map(|(name, field)| parameter(types, Location::Query, name, field))
    .collect()
}

/// Flattens message-typed fields into dotted query parameters
/// (`sub.subfield`). Well-known types stay leaves. `visited` holds the
/// messages on the current descent path.
fn flatten_fields<'a>(
  types: &mut TypeSynthesizer<'a>,
  prefix: &str,
  fields: impl IntoIterator<Item = &'a FieldDescriptor>,
  visited: &mut Vec<String>,
  out: &mut Vec<(String, &'a FieldDescriptor)>,
) -> GenerateResult<()> {
  for field in fields {
    if field.options.is_hidden() {
      continue;
    }

    let name = format!("{prefix}{}", field.json_name);

    match field.kind {
      FieldKind::Message if field.is_map() => {
        return Err(GenerateError::unsupported(
          &field.full_name,
          "map parameters are not supported",
        ));
      }
      FieldKind::Message if well_known_schema(field.type_name())?.is_none() => {
        let message: &'a MessageDescriptor = types.message(field.type_name())?;
        if visited.contains(&message.full_name) {
          return Err(GenerateError::RecursiveParameter { path: name });
        }

        visited.push(message.full_name.clone());
        flatten_fields(types, &format!("{name}."), &message.fields, visited, out)?;
        visited.pop();
        continue;
      }
      FieldKind::Enum => {
        types.ensure_enum(field.type_name())?;
      }
      FieldKind::Group => {
        return Err(GenerateError::unsupported(&field.full_name, "unsupported kind: group"));
      }
      _ => {}
    }

    out.push((name, field));
  }
  Ok(())
}

fn parameter(
  types: &mut TypeSynthesizer<'_>,
  location: Location,
  name: String,
  field: &FieldDescriptor,
) -> GenerateResult<(Location, Parameter)> {
  let mut schema = types.field_schema(field, field.comments.trailing())?;
  if let Some(format) = field.options.format {
    apply_format(&mut schema, format.openapi_format());
  }

  let required = location == Location::Path || field.options.is_required();
  let exploded = location == Location::Query && field.is_list();

  let parameter = Parameter {
    name,
    location: location.as_parameter_in(),
    description: None,
    required: required.then_some(true),
    deprecated: None,
    allow_empty_value: None,
    allow_reserved: None,
    explode: exploded.then_some(true),
    style: exploded.then_some(ParameterStyle::Form),
    schema: Some(schema),
    content: None,
    example: None,
    examples: BTreeMap::default(),
    extensions: BTreeMap::default(),
  };
  Ok((location, parameter))
}

/// Sets `format` on the schema, or on its items for arrays.
fn apply_format(schema: &mut ObjectOrReference<ObjectSchema>, format: &str) {
  let ObjectOrReference::Object(object) = schema else {
    return;
  };

  if let Some(items) = object.items.as_deref_mut()
    && let Schema::Object(item) = items
    && let ObjectOrReference::Object(item) = item.as_mut()
  {
    item.format = Some(format.to_string());
    return;
  }
  object.format = Some(format.to_string());
}

fn json_content(schema: ObjectOrReference<ObjectSchema>) -> BTreeMap<String, MediaType> {
  BTreeMap::from([(
    JSON_CONTENT_TYPE.to_string(),
    MediaType {
      schema: Some(schema),
      ..Default::default()
    },
  )])
}

fn json_body(schema: ObjectOrReference<ObjectSchema>, required: bool) -> RequestBody {
  RequestBody {
    content: json_content(schema),
    required: Some(required),
    ..Default::default()
  }
}

fn unknown_field(field: &str, message: &MessageDescriptor) -> GenerateError {
  GenerateError::UnknownField {
    field: field.to_string(),
    message: message.full_name.clone(),
  }
}
