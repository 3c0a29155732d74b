use strum::Display;

#[derive(Debug, Clone, Default)]
pub struct GenerationStats {
  pub schemas_generated: usize,
  pub messages_generated: usize,
  pub enums_generated: usize,
  pub operations_converted: usize,
  pub additional_bindings: usize,
  pub methods_skipped: usize,
  pub cycles_detected: usize,
  pub cycle_details: Vec<Vec<String>>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_message(&mut self) {
    self.messages_generated += 1;
    self.schemas_generated += 1;
  }

  pub fn record_enum(&mut self) {
    self.enums_generated += 1;
    self.schemas_generated += 1;
  }

  pub fn record_operation(&mut self, additional: bool) {
    self.operations_converted += 1;
    if additional {
      self.additional_bindings += 1;
    }
  }

  pub fn record_skipped_method(&mut self, method: &str) {
    self.methods_skipped += 1;
    self.record_warning(GenerationWarning::MethodSkipped {
      method: method.to_string(),
    });
  }

  pub fn record_cycle(&mut self, cycle: Vec<String>) {
    self.cycles_detected += 1;
    self.cycle_details.push(cycle);
  }

  pub fn record_cycles(&mut self, cycles: Vec<Vec<String>>) {
    for cycle in cycles {
      self.record_cycle(cycle);
    }
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "HTTP rule of '{method}' dropped: {reason}")]
  RuleDropped { method: String, reason: String },
  #[strum(to_string = "Method '{method}' has no HTTP rule")]
  MethodSkipped { method: String },
  #[strum(to_string = "Method '{method}' is streaming; HTTP bindings describe a single message")]
  StreamingMethod { method: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::RuleDropped { .. })
  }
}
