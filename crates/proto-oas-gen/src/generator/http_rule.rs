use serde::Serialize;
use strum::Display;

use crate::{
  descriptor::{MethodDescriptor, RawHttpRule},
  generator::metrics::GenerationWarning,
};

/// HTTP methods a transcoding rule can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
  Get,
  Put,
  Post,
  Delete,
  Patch,
}

impl HttpMethod {
  pub fn from_http(method: &http::Method) -> Option<Self> {
    match method.as_str() {
      "GET" => Some(Self::Get),
      "PUT" => Some(Self::Put),
      "POST" => Some(Self::Post),
      "DELETE" => Some(Self::Delete),
      "PATCH" => Some(Self::Patch),
      _ => None,
    }
  }
}

/// The `pattern` oneof of `google.api.HttpRule`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulePattern {
  Get(String),
  Put(String),
  Post(String),
  Delete(String),
  Patch(String),
  Custom { kind: String, path: String },
}

impl RulePattern {
  pub fn from_raw(raw: &RawHttpRule) -> Option<Self> {
    let RawHttpRule {
      get,
      put,
      post,
      delete,
      patch,
      custom,
      ..
    } = raw;

    get
      .clone()
      .map(Self::Get)
      .or_else(|| put.clone().map(Self::Put))
      .or_else(|| post.clone().map(Self::Post))
      .or_else(|| delete.clone().map(Self::Delete))
      .or_else(|| patch.clone().map(Self::Patch))
      .or_else(|| {
        custom.as_ref().map(|custom| Self::Custom {
          kind: custom.kind.clone(),
          path: custom.path.clone(),
        })
      })
  }

  /// Splits the pattern into a bindable method and path. Custom verbs have no
  /// OpenAPI path item slot and are reported back as the drop reason.
  pub fn into_binding(self) -> Result<(HttpMethod, String), String> {
    match self {
      Self::Get(path) => Ok((HttpMethod::Get, path)),
      Self::Put(path) => Ok((HttpMethod::Put, path)),
      Self::Post(path) => Ok((HttpMethod::Post, path)),
      Self::Delete(path) => Ok((HttpMethod::Delete, path)),
      Self::Patch(path) => Ok((HttpMethod::Patch, path)),
      Self::Custom { kind, path } => Err(format!("custom pattern {kind} {path} is unsupported")),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodingRule {
  pub method: HttpMethod,
  pub path_template: String,
  pub body: String,
  pub response_body: String,
  pub additional: bool,
}

/// Collects the primary rule of `method` followed by its additional bindings,
/// depth first. Bindings without a usable pattern are dropped with a warning.
pub fn collect_rules(method: &MethodDescriptor, warnings: &mut Vec<GenerationWarning>) -> Vec<TranscodingRule> {
  let mut rules = vec![];
  if let Some(raw) = &method.http {
    collect_into(method, raw, false, &mut rules, warnings);
  }
  rules
}

fn collect_into(
  method: &MethodDescriptor,
  raw: &RawHttpRule,
  additional: bool,
  rules: &mut Vec<TranscodingRule>,
  warnings: &mut Vec<GenerationWarning>,
) {
  let binding = RulePattern::from_raw(raw)
    .ok_or_else(|| "no HTTP pattern set".to_string())
    .and_then(RulePattern::into_binding);

  match binding {
    Ok((http_method, path_template)) => rules.push(TranscodingRule {
      method: http_method,
      path_template,
      body: raw.body.clone(),
      response_body: raw.response_body.clone(),
      additional,
    }),
    Err(reason) => warnings.push(GenerationWarning::RuleDropped {
      method: method.full_name.clone(),
      reason,
    }),
  }

  for binding in &raw.additional_bindings {
    collect_into(method, binding, true, rules, warnings);
  }
}
