//! Orchestration for the descriptor set to OpenAPI pipeline.
//!
//! `Orchestrator` owns the resolved descriptor pool and the document-level
//! configuration, runs the transcoding engine once and serializes the result.
//!
//! The `generate` command drives it: build an `Orchestrator` from a loaded
//! pool, call [`Orchestrator::generate`], then [`Orchestrator::render`] the
//! spec and, with `--mapping`, [`Orchestrator::render_mapping`] the table.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::{
  descriptor::DescriptorPool,
  generator::{
    config::{GeneratorConfig, OutputFormat},
    document::DocumentBuilder,
    errors::GenerateResult,
    mapping::{Mapping, build_mapping},
    metrics::GenerationStats,
  },
};

const YAML_EMITTER_INDENT: usize = 2;

/// Everything one generation run produces.
#[derive(Debug)]
pub struct GeneratedOutput {
  pub spec: oas3::Spec,
  pub mapping: Mapping,
  pub stats: GenerationStats,
}

pub struct Orchestrator {
  pool: DescriptorPool,
  config: GeneratorConfig,
}

impl Orchestrator {
  pub fn new(pool: DescriptorPool, config: GeneratorConfig) -> Self {
    Self { pool, config }
  }

  pub fn pool(&self) -> &DescriptorPool {
    &self.pool
  }

  /// Runs the transcoding engine over every service of the generated files.
  ///
  /// Generation is all-or-nothing: the first structural error aborts the run.
  /// Non-fatal findings are returned as warnings in the statistics.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  /// - a path template does not parse
  /// - a rule names a field the input or output message lacks
  /// - a field has a type that cannot be described
  /// - two bindings resolve to the same path and method
  /// - no method carries an HTTP rule
  pub fn generate(&self) -> GenerateResult<GeneratedOutput> {
    let document = DocumentBuilder::new(&self.pool, &self.config).build()?;
    let mapping = build_mapping(&self.pool, &document)?;

    Ok(GeneratedOutput {
      spec: document.spec,
      mapping,
      stats: document.stats,
    })
  }

  /// Serializes the document in the configured format and indentation.
  pub fn render(&self, spec: &oas3::Spec) -> anyhow::Result<String> {
    match self.config.format {
      OutputFormat::Yaml => {
        let yaml = oas3::to_yaml(spec)?;
        Ok(reindent(&yaml, self.config.indent))
      }
      OutputFormat::Json => to_pretty_json(spec, self.config.indent),
    }
  }

  pub fn render_mapping(&self, mapping: &Mapping) -> anyhow::Result<String> {
    to_pretty_json(mapping, self.config.indent)
  }
}

fn to_pretty_json<T: Serialize>(value: &T, indent: usize) -> anyhow::Result<String> {
  let indent = " ".repeat(indent);
  let mut buffer = vec![];
  let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
  value.serialize(&mut serializer)?;
  buffer.push(b'\n');
  Ok(String::from_utf8(buffer)?)
}

/// A block scalar being copied through; its lines keep their offset from the
/// line that opened it.
struct BlockScalar {
  old: usize,
  new: usize,
}

/// Rescales the emitter's two-space block indentation to `indent` spaces.
///
/// Columns are remapped through a stack of open nodes rather than scaled, so
/// the keys of a `- ` sequence entry stay aligned with the key after the dash.
fn reindent(yaml: &str, indent: usize) -> String {
  if indent == YAML_EMITTER_INDENT {
    return yaml.to_string();
  }

  let mut out = String::with_capacity(yaml.len());
  let mut columns: Vec<(usize, usize)> = vec![(0, 0)];
  let mut block: Option<BlockScalar> = None;

  for line in yaml.lines() {
    let leading = line.len() - line.trim_start_matches(' ').len();

    if let Some(scalar) = &block {
      if line.trim().is_empty() || leading > scalar.old {
        if leading > scalar.old {
          out.push_str(&" ".repeat(scalar.new + leading - scalar.old));
          out.push_str(&line[leading..]);
        }
        out.push('\n');
        continue;
      }
      block = None;
    }

    if line.trim().is_empty() {
      out.push('\n');
      continue;
    }

    while columns.last().is_some_and(|&(old, _)| old > leading) {
      columns.pop();
    }
    let new = match columns.last() {
      Some(&(old, new)) if old == leading => new,
      Some(&(_, new)) => {
        columns.push((leading, new + indent));
        new + indent
      }
      None => {
        columns.push((leading, leading));
        leading
      }
    };

    let mut rest = &line[leading..];
    let (mut old_column, mut new_column) = (leading, new);
    while let Some(entry) = rest.strip_prefix("- ") {
      old_column += 2;
      new_column += 2;
      columns.push((old_column, new_column));
      rest = entry;
    }

    if opens_block_scalar(rest) {
      block = Some(BlockScalar { old: leading, new });
    }

    out.push_str(&" ".repeat(new));
    out.push_str(&line[leading..]);
    out.push('\n');
  }
  out
}

/// `|`, `>-`, `key: |2+` and the like.
fn opens_block_scalar(node: &str) -> bool {
  let value = node.rsplit_once(": ").map_or(node, |(_, value)| value);
  let mut chars = value.chars();
  matches!(chars.next(), Some('|' | '>')) && chars.all(|c| c.is_ascii_digit() || c == '-' || c == '+')
}
