pub(crate) mod config;
pub(crate) mod document;
pub(crate) mod errors;
pub(crate) mod http_rule;
pub(crate) mod mapping;
pub(crate) mod message_graph;
pub(crate) mod metrics;
pub(crate) mod naming;
pub(crate) mod operation;
pub mod orchestrator;
pub(crate) mod path_template;
pub(crate) mod schema;
pub(crate) mod schema_registry;
