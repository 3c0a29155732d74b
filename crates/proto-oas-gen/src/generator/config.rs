use clap::ValueEnum;

pub const DEFAULT_OPENAPI_VERSION: &str = "3.1.0";
pub const DEFAULT_TITLE: &str = "API";
pub const DEFAULT_VERSION: &str = "0.0.1";
pub const DEFAULT_INDENT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Yaml,
  Json,
}

impl OutputFormat {
  pub const fn extension(self) -> &'static str {
    match self {
      Self::Yaml => "yaml",
      Self::Json => "json",
    }
  }
}

/// Document-level attributes. None of them influence transcoding; they are
/// copied into the `info` block or only shape serialization.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct GeneratorConfig {
  #[builder(default = DEFAULT_OPENAPI_VERSION.to_string())]
  pub openapi: String,
  #[builder(default = DEFAULT_TITLE.to_string())]
  pub title: String,
  pub description: Option<String>,
  #[builder(default = DEFAULT_VERSION.to_string())]
  pub version: String,
  #[builder(default = DEFAULT_INDENT)]
  pub indent: usize,
  /// Emit every message and enum of the generated files, not only the reachable ones.
  #[builder(default)]
  pub all_schemas: bool,
  #[builder(default)]
  pub format: OutputFormat,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}
