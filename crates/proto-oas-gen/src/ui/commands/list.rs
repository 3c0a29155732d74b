use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{
    config::GeneratorConfig,
    http_rule::HttpMethod,
    mapping::Mapping,
    orchestrator::Orchestrator,
  },
  ui::{Colors, colors::comfy, term_width},
  utils::loader::DescriptorLoader,
};

const MISSING_OPERATION_ID: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
struct OperationRow {
  operation_id: String,
  method: HttpMethod,
  path: String,
  rpc: String,
}

fn operation_rows(mapping: &Mapping) -> Vec<OperationRow> {
  let mut rows = mapping
    .methods()
    .map(|method| OperationRow {
      operation_id: method
        .operation_id
        .clone()
        .unwrap_or_else(|| MISSING_OPERATION_ID.to_string()),
      method: method.http_method,
      path: method.path.clone(),
      rpc: method.proto_name.clone(),
    })
    .collect::<Vec<_>>();
  rows.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
  rows
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let pool = DescriptorLoader::open(input).await?.parse()?;
  let output = Orchestrator::new(pool, GeneratorConfig::default()).generate()?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut header = Row::new();
  for title in ["OPERATION ID", "METHOD", "PATH", "RPC METHOD"] {
    header.add_cell(Cell::new(title).fg(comfy(colors.label())));
  }
  table.set_header(header);

  for row in operation_rows(&output.mapping) {
    let mut cells = Row::new();
    cells.add_cell(
      Cell::new(row.operation_id)
        .fg(comfy(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    cells.add_cell(
      Cell::new(row.method)
        .fg(comfy(colors.http_method(row.method)))
        .set_alignment(CellAlignment::Right),
    );
    cells.add_cell(Cell::new(row.path).fg(comfy(colors.primary())));
    cells.add_cell(Cell::new(row.rpc).fg(comfy(colors.info())));
    table.add_row(cells);
  }

  println!("{table}");

  Ok(())
}
