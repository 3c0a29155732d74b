use crate::generator::{http_rule::HttpMethod, path_template::PathParseError};

/// Structural failures that abort document generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
  #[error("parse path template: {0}")]
  Grammar(#[from] PathParseError),

  #[error("unknown field {field:?} in {message}")]
  UnknownField { field: String, message: String },

  #[error("unsupported type {type_name}: {reason}")]
  UnsupportedType { type_name: String, reason: String },

  #[error("query parameter cannot be recursive: field {path}")]
  RecursiveParameter { path: String },

  #[error("conflict on endpoint {method} {path}")]
  Conflict { method: HttpMethod, path: String },

  #[error("no methods with HTTP rules found in the files to generate")]
  NoRules,

  #[error("unknown type {type_name}")]
  UnknownType { type_name: String },

  #[error("can't find RPC method for {method} {path}")]
  UnmappedOperation { method: String, path: String },

  #[error("make method {method} => {http_method} {path} mapping")]
  Rule {
    method: String,
    http_method: HttpMethod,
    path: String,
    #[source]
    source: Box<GenerateError>,
  },
}

impl GenerateError {
  pub(crate) fn unsupported(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::UnsupportedType {
      type_name: type_name.into(),
      reason: reason.into(),
    }
  }

  pub(crate) fn unknown_type(type_name: impl Into<String>) -> Self {
    Self::UnknownType {
      type_name: type_name.into(),
    }
  }

  /// The innermost error once rule context is peeled away.
  pub fn root(&self) -> &Self {
    match self {
      Self::Rule { source, .. } => source.root(),
      other => other,
    }
  }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
