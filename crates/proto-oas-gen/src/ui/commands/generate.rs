use std::path::{Path, PathBuf};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  descriptor::DescriptorPool,
  generator::{
    config::GeneratorConfig,
    metrics::GenerationStats,
    orchestrator::{GeneratedOutput, Orchestrator},
  },
  ui::{Colors, GenerateCommand},
  utils::{loader::DescriptorLoader, sink::OutputSink},
};

const MAPPING_FILE_NAME: &str = "mapping.json";
const MAX_INDENT: usize = 8;

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub file_name: String,
  pub generator: GeneratorConfig,
  pub mapping: bool,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      file_name,
      format,
      openapi,
      title,
      description,
      spec_version,
      indent,
      mapping,
      all_schemas,
      verbose,
      quiet,
    } = command;

    if indent == 0 || indent > MAX_INDENT {
      anyhow::bail!("Indent must be between 1 and {MAX_INDENT}, got {indent}");
    }
    if file_name.is_empty() || file_name.contains(['/', '\\']) {
      anyhow::bail!("Invalid output file name '{file_name}': expected a bare name without directories");
    }

    let generator = GeneratorConfig::builder()
      .openapi(openapi)
      .title(title)
      .maybe_description(description)
      .version(spec_version)
      .indent(indent)
      .all_schemas(all_schemas)
      .format(format)
      .build();

    Ok(Self {
      input,
      output,
      file_name,
      generator,
      mapping,
      verbose,
      quiet,
    })
  }

  pub fn document_file_name(&self) -> String {
    format!("{}.{}", self.file_name, self.generator.format.extension())
  }

  async fn load_pool(&self) -> anyhow::Result<DescriptorPool> {
    DescriptorLoader::open(&self.input).await?.parse()
  }

  /// Writes the document and, when requested, the mapping table concurrently.
  async fn write_outputs(&self, document: String, mapping: Option<String>) -> anyhow::Result<Vec<PathBuf>> {
    let sink = OutputSink::create(&self.output).await?;
    let document_name = self.document_file_name();

    let (document_path, mapping_path) = tokio::try_join!(sink.write(&document_name, document), async {
      match mapping {
        Some(mapping) => sink.write(MAPPING_FILE_NAME, mapping).await.map(Some),
        None => Ok(None),
      }
    })?;

    Ok(std::iter::once(document_path).chain(mapping_path).collect())
  }
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading descriptor set from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_pool(&self, pool: &DescriptorPool) {
    if !self.config.verbose {
      return;
    }
    let generated = pool.generated_files().count();
    self.stat("Files:", format!("{} ({generated} generated)", pool.files().len()));
    self.stat("Services:", pool.services().count().to_string());
    self.stat("Messages:", pool.messages().count().to_string());
    self.stat("Enums:", pool.enums().count().to_string());
  }

  fn log_generating(&self) {
    self.info(&"Generating OpenAPI document...".with(self.colors.primary()).to_string());
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Types generated:", stats.schemas_generated.to_string());
    self.stat("", format!("{} messages", stats.messages_generated));
    self.stat("", format!("{} enums", stats.enums_generated));
    self.stat("Operations:", stats.operations_converted.to_string());
    if stats.additional_bindings > 0 {
      self.stat("", format!("{} additional bindings", stats.additional_bindings));
    }
    if self.config.verbose && stats.methods_skipped > 0 {
      self.stat("Methods skipped:", stats.methods_skipped.to_string());
    }
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_cycles(stats);
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected.to_string());

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.info())
        );
      }
    }
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !warning.is_skipped_item() && !self.config.verbose {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }

      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.warning()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_written(&self, path: &Path) {
    self.info(
      &format!("Wrote: {}", path.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_success(&self) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated OpenAPI document".with(self.colors.success())
      );
    }
  }
}

pub async fn generate_document(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let orchestrator = Orchestrator::new(config.load_pool().await?, config.generator.clone());
  logger.log_pool(orchestrator.pool());

  logger.log_generating();
  let GeneratedOutput { spec, mapping, stats } = orchestrator.generate()?;
  logger.print_statistics(&stats);

  let document = orchestrator.render(&spec)?;
  let mapping = config
    .mapping
    .then(|| orchestrator.render_mapping(&mapping))
    .transpose()?;

  for path in config.write_outputs(document, mapping).await? {
    logger.log_written(&path);
  }

  logger.log_success();
  Ok(())
}
