use std::collections::BTreeMap;

use oas3::{
  Spec,
  spec::{Components, Info, Operation, PathItem},
};

use crate::{
  descriptor::{DescriptorPool, MessageDescriptor, MethodDescriptor, ServiceDescriptor},
  generator::{
    config::GeneratorConfig,
    errors::{GenerateError, GenerateResult},
    http_rule::{HttpMethod, TranscodingRule, collect_rules},
    message_graph::MessageGraph,
    metrics::{GenerationStats, GenerationWarning},
    operation::{self, SynthesizedOperation},
    schema::TypeSynthesizer,
    schema_registry::{SchemaOrigin, SchemaRegistry},
  },
};

/// The RPC binding an operation in the document was synthesized from.
#[derive(Debug, Clone)]
pub struct OperationOrigin<'a> {
  pub service: &'a ServiceDescriptor,
  pub method: &'a MethodDescriptor,
  pub rule: TranscodingRule,
}

/// Operations keyed by resolved path and HTTP method.
pub type OperationIndex<'a> = BTreeMap<(String, HttpMethod), OperationOrigin<'a>>;

#[derive(Debug)]
pub struct AssembledDocument<'a> {
  pub spec: Spec,
  pub registry: SchemaRegistry,
  pub index: OperationIndex<'a>,
  pub stats: GenerationStats,
}

/// Single-owner accumulator for one generation run.
pub struct DocumentBuilder<'a> {
  pool: &'a DescriptorPool,
  config: &'a GeneratorConfig,
  types: TypeSynthesizer<'a>,
  paths: BTreeMap<String, PathItem>,
  index: OperationIndex<'a>,
  stats: GenerationStats,
}

impl<'a> DocumentBuilder<'a> {
  pub fn new(pool: &'a DescriptorPool, config: &'a GeneratorConfig) -> Self {
    Self {
      pool,
      config,
      types: TypeSynthesizer::new(pool),
      paths: BTreeMap::new(),
      index: BTreeMap::new(),
      stats: GenerationStats::default(),
    }
  }

  pub fn build(mut self) -> GenerateResult<AssembledDocument<'a>> {
    let pool = self.pool;
    let graph = MessageGraph::build(pool);
    self.stats.record_cycles(graph.cycles());

    for service in pool.services() {
      for method in &service.methods {
        self.add_method(service, method)?;
      }
    }

    if self.paths.is_empty() {
      return Err(GenerateError::NoRules);
    }

    self.sweep(&graph)?;
    if self.config.all_schemas {
      self.register_declared()?;
    }

    let registry = self.types.into_registry();
    for (_, _, origin) in registry.entries() {
      match origin {
        SchemaOrigin::Message(_) => self.stats.record_message(),
        SchemaOrigin::Enum(_) => self.stats.record_enum(),
      }
    }

    let spec = Spec {
      openapi: self.config.openapi.clone(),
      info: Info {
        title: self.config.title.clone(),
        summary: None,
        description: self.config.description.clone(),
        terms_of_service: None,
        version: self.config.version.clone(),
        contact: None,
        license: None,
        extensions: BTreeMap::default(),
      },
      servers: vec![],
      paths: Some(self.paths),
      webhooks: BTreeMap::default(),
      components: Some(Components {
        schemas: registry.to_components(),
        ..Default::default()
      }),
      security: vec![],
      tags: vec![],
      external_docs: None,
      extensions: BTreeMap::default(),
    };

    Ok(AssembledDocument {
      spec,
      registry,
      index: self.index,
      stats: self.stats,
    })
  }

  fn add_method(&mut self, service: &'a ServiceDescriptor, method: &'a MethodDescriptor) -> GenerateResult<()> {
    if method.http.is_none() {
      self.stats.record_skipped_method(&method.full_name);
      return Ok(());
    }

    let mut warnings = vec![];
    let rules = collect_rules(method, &mut warnings);
    self.stats.record_warnings(warnings);
    if rules.is_empty() {
      return Ok(());
    }

    if method.client_streaming || method.server_streaming {
      self.stats.record_warning(GenerationWarning::StreamingMethod {
        method: method.full_name.clone(),
      });
    }

    for rule in rules {
      let synthesized =
        operation::synthesize(&mut self.types, method, &rule).map_err(|source| GenerateError::Rule {
          method: method.full_name.clone(),
          http_method: rule.method,
          path: rule.path_template.clone(),
          source: Box::new(source),
        })?;

      self.stats.record_operation(rule.additional);
      self.place(synthesized, OperationOrigin { service, method, rule })?;
    }
    Ok(())
  }

  fn place(&mut self, synthesized: SynthesizedOperation, origin: OperationOrigin<'a>) -> GenerateResult<()> {
    let SynthesizedOperation {
      path,
      method,
      operation,
    } = synthesized;

    let item = self.paths.entry(path.clone()).or_default();
    let slot = operation_slot(item, method);
    if slot.is_some() {
      return Err(GenerateError::Conflict { method, path });
    }
    *slot = Some(operation);

    self.index.insert((path, method), origin);
    Ok(())
  }

  /// Registers the messages reachable from service inputs and outputs, along
  /// with the types nested in them and the top-level enums of generated files.
  /// Request-only messages stay inline unless something referenced them.
  fn sweep(&mut self, graph: &MessageGraph<'a>) -> GenerateResult<()> {
    let pool = self.pool;
    for descriptor in pool.enums().filter(|descriptor| descriptor.generate) {
      if !descriptor.schema_name.contains('.') {
        self.types.ensure_enum(&descriptor.full_name)?;
      }
    }

    let roots = pool
      .services()
      .flat_map(|service| service.methods.iter())
      .flat_map(|method| [method.input_type.as_str(), method.output_type.as_str()]);

    for name in graph.reachable(roots) {
      if let Some(message) = pool.message(name) {
        let registry = self.types.registry();
        if message.map_entry
          || message.is_well_known()
          || registry.is_registered(name)
          || registry.is_request(name)
        {
          continue;
        }
        self.types.ensure_message(name)?;
        self.register_nested(message)?;
      } else if let Some(descriptor) = pool.enumeration(name)
        && descriptor.package != "google.protobuf"
      {
        self.types.ensure_enum(name)?;
      }
    }
    Ok(())
  }

  fn register_nested(&mut self, message: &'a MessageDescriptor) -> GenerateResult<()> {
    let pool = self.pool;
    for name in &message.nested_enums {
      self.types.ensure_enum(name)?;
    }
    for name in &message.nested_messages {
      let Some(nested) = pool.message(name) else {
        continue;
      };
      if nested.map_entry || self.types.registry().is_request(name) {
        continue;
      }
      self.types.ensure_message(name)?;
      self.register_nested(nested)?;
    }
    Ok(())
  }

  /// Registers every message and enum declared in the generated files.
  fn register_declared(&mut self) -> GenerateResult<()> {
    let pool = self.pool;
    for file in pool.generated_files() {
      for name in &file.enums {
        self.types.ensure_enum(name)?;
      }
      for name in &file.messages {
        let Some(message) = pool.message(name) else {
          continue;
        };
        if message.map_entry || self.types.registry().is_request(name) {
          continue;
        }
        self.types.ensure_message(name)?;
      }
    }
    Ok(())
  }
}

fn operation_slot(item: &mut PathItem, method: HttpMethod) -> &mut Option<Operation> {
  match method {
    HttpMethod::Get => &mut item.get,
    HttpMethod::Put => &mut item.put,
    HttpMethod::Post => &mut item.post,
    HttpMethod::Delete => &mut item.delete,
    HttpMethod::Patch => &mut item.patch,
  }
}
