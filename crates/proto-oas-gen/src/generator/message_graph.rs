use std::collections::BTreeSet;

use petgraph::{algo::kosaraju_scc, graphmap::DiGraphMap, visit::Dfs};

use crate::descriptor::{DescriptorPool, FieldKind};

/// Type dependency graph over every message and enum in the pool. An edge
/// `A -> B` means a field of message `A` has type `B`; map fields point at
/// their entry message, which in turn points at the value type.
#[derive(Debug)]
pub struct MessageGraph<'a> {
  graph: DiGraphMap<&'a str, ()>,
}

impl<'a> MessageGraph<'a> {
  pub fn build(pool: &'a DescriptorPool) -> Self {
    let mut graph = DiGraphMap::new();

    for descriptor in pool.enums() {
      graph.add_node(descriptor.full_name.as_str());
    }

    for message in pool.messages() {
      graph.add_node(message.full_name.as_str());
      for field in &message.fields {
        if matches!(field.kind, FieldKind::Message | FieldKind::Enum | FieldKind::Group)
          && let Some(target) = field.type_name.as_deref()
        {
          graph.add_edge(message.full_name.as_str(), target, ());
        }
      }
    }

    Self { graph }
  }

  /// Every type reachable from `roots`, the roots included.
  pub fn reachable(&self, roots: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
    let mut reached = BTreeSet::new();
    for root in roots {
      if !self.graph.contains_node(root) || reached.contains(root) {
        continue;
      }
      let mut dfs = Dfs::new(&self.graph, root);
      while let Some(node) = dfs.next(&self.graph) {
        reached.insert(node);
      }
    }
    reached
  }

  /// Strongly connected groups of messages that refer back to themselves,
  /// each sorted by name.
  pub fn cycles(&self) -> Vec<Vec<String>> {
    let mut cycles = kosaraju_scc(&self.graph)
      .into_iter()
      .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
      .map(|scc| {
        let mut names = scc.into_iter().map(String::from).collect::<Vec<_>>();
        names.sort();
        names
      })
      .collect::<Vec<_>>();
    cycles.sort();
    cycles
  }
}
