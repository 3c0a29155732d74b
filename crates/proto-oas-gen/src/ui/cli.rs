use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};
use crate::generator::config::{DEFAULT_INDENT, DEFAULT_OPENAPI_VERSION, DEFAULT_TITLE, DEFAULT_VERSION, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "proto-oas-gen")]
#[command(author, version, about = "Protobuf HTTP transcoding rules to OpenAPI generator")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information derived from a descriptor set
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate an OpenAPI document from a descriptor set
  Generate(GenerateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
  /// Path to the protojson descriptor set (FileDescriptorSet or CodeGeneratorRequest), `-` for stdin
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Directory the OpenAPI document (and mapping) are written to
  #[arg(short, long, value_name = "DIR", default_value = ".")]
  pub output: PathBuf,

  /// Output file name without extension
  #[arg(long, value_name = "NAME", default_value = "openapi")]
  pub file_name: String,

  /// Serialization format of the document
  #[arg(short, long, value_enum, default_value = "yaml")]
  pub format: OutputFormat,

  /// Value of the document's `openapi` field
  #[arg(long, value_name = "VERSION", default_value = DEFAULT_OPENAPI_VERSION)]
  pub openapi: String,

  /// Value of `info.title`
  #[arg(long, default_value = DEFAULT_TITLE)]
  pub title: String,

  /// Value of `info.description`
  #[arg(long)]
  pub description: Option<String>,

  /// Value of `info.version`
  #[arg(long = "spec-version", value_name = "VERSION", default_value = DEFAULT_VERSION)]
  pub spec_version: String,

  /// Indentation width of the serialized document
  #[arg(long, default_value_t = DEFAULT_INDENT)]
  pub indent: usize,

  /// Also write the RPC mapping table as mapping.json
  #[arg(long, default_value_t = false)]
  pub mapping: bool,

  /// Emit every message and enum declared in the generated files, not only
  /// the ones reachable from service methods
  #[arg(long, default_value_t = false)]
  pub all_schemas: bool,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every HTTP operation the descriptor set's rules produce
  Operations {
    /// Path to the protojson descriptor set, `-` for stdin
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
