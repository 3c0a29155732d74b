use std::{collections::HashSet, sync::LazyLock};

use inflections::Inflect;

static FORBIDDEN_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "try", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "gen",
  ]
  .into_iter()
  .collect()
});

// Keywords that cannot be raw identifiers.
static UNRAWABLE_IDENTIFIERS: LazyLock<HashSet<&str>> =
  LazyLock::new(|| ["crate", "self", "Self", "super"].into_iter().collect());

/// Lowercases only the first character: `GetBook` becomes `getBook`.
pub fn lower_first(name: &str) -> String {
  let mut chars = name.chars();
  match chars.next() {
    Some(first) if !first.is_lowercase() => first.to_lowercase().chain(chars).collect(),
    _ => name.to_string(),
  }
}

/// Identifier of a protobuf field in generated Rust code.
///
/// Field names are snake_cased; keywords become raw identifiers, and the
/// handful that cannot be raw get a trailing underscore.
pub fn field_ident(name: &str) -> String {
  let ident = name.to_snake_case();
  if UNRAWABLE_IDENTIFIERS.contains(ident.as_str()) {
    return format!("{ident}_");
  }
  if FORBIDDEN_IDENTIFIERS.contains(ident.as_str()) {
    return format!("r#{ident}");
  }
  ident
}

/// `sub.subfield` style path of a query parameter, split back into segments.
pub fn split_dotted(name: &str) -> Vec<&str> {
  name.split('.').filter(|segment| !segment.is_empty()).collect()
}
