use std::{collections::BTreeSet, fmt};

use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PathParseError {
  #[strum(to_string = "at {offset}: path template must start with '/'")]
  MissingLeadingSlash { offset: usize },
  #[strum(to_string = "at {offset}: wildcard patterns are unsupported")]
  Wildcard { offset: usize },
  #[strum(to_string = "at {offset}: subsegments are unsupported")]
  Subsegment { offset: usize },
  #[strum(to_string = "at {offset}: missing '}}'")]
  MissingClosingBrace { offset: usize },
  #[strum(to_string = "at {offset}: empty parameter name")]
  EmptyParameter { offset: usize },
  #[strum(to_string = "at {offset}: parameter \"{name}\" mapped second time")]
  DuplicateParameter { name: String, offset: usize },
}

impl std::error::Error for PathParseError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
  Literal(String),
  Param(String),
}

/// A parsed `google.api.http` path template. The leading `/` is implicit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTemplate {
  segments: Vec<PathSegment>,
}

impl PathTemplate {
  /// Tokenizes `template` into literal and parameter segments.
  ///
  /// Scanning alternates between a literal mode, which runs up to the next `*`
  /// or `{`, and a parameter mode, which runs up to the next `=`, `}` or `/`.
  /// Wildcards, `{name=pattern}` captures and repeated parameter names are
  /// rejected, with the error pointing at the offending byte.
  pub fn parse(template: &str) -> Result<Self, PathParseError> {
    if !template.starts_with('/') {
      return Err(PathParseError::MissingLeadingSlash { offset: 0 });
    }

    let bytes = template.as_bytes();
    let mut segments = vec![];
    let mut names = BTreeSet::new();
    let mut pos = 1;

    loop {
      let rest = &template[pos..];
      let Some(end) = rest.find(['*', '{']) else {
        if !rest.is_empty() {
          segments.push(PathSegment::Literal(rest.to_string()));
        }
        break;
      };

      if end > 0 {
        segments.push(PathSegment::Literal(rest[..end].to_string()));
      }
      pos += end;

      if bytes[pos] == b'*' {
        return Err(PathParseError::Wildcard { offset: pos });
      }

      // Consume '{'
      pos += 1;

      let Some(end) = template[pos..].find(['=', '}', '/']) else {
        return Err(PathParseError::MissingClosingBrace { offset: template.len() });
      };
      let close = pos + end;

      match bytes[close] {
        b'=' => return Err(PathParseError::Subsegment { offset: close }),
        b'/' => return Err(PathParseError::MissingClosingBrace { offset: close }),
        _ => {}
      }

      let name = &template[pos..close];
      if name.is_empty() {
        return Err(PathParseError::EmptyParameter { offset: pos });
      }
      if !names.insert(name) {
        return Err(PathParseError::DuplicateParameter {
          name: name.to_string(),
          offset: pos,
        });
      }
      segments.push(PathSegment::Param(name.to_string()));

      // Consume '}'
      pos = close + 1;
    }

    Ok(Self { segments })
  }

  pub fn segments(&self) -> &[PathSegment] {
    &self.segments
  }

  pub fn params(&self) -> impl Iterator<Item = &str> {
    self.segments().iter().filter_map(|segment| match segment {
      PathSegment::Param(name) => Some(name.as_str()),
      PathSegment::Literal(_) => None,
    })
  }

  pub fn has_params(&self) -> bool {
    self.params().next().is_some()
  }

  /// Renders the template with every parameter renamed by `rename`.
  pub fn render_with<E>(&self, mut rename: impl FnMut(&str) -> Result<String, E>) -> Result<String, E> {
    let mut path = String::from("/");
    for segment in &self.segments {
      match segment {
        PathSegment::Literal(literal) => path.push_str(literal),
        PathSegment::Param(name) => {
          path.push('{');
          path.push_str(&rename(name)?);
          path.push('}');
        }
      }
    }
    Ok(path)
  }
}

impl fmt::Display for PathTemplate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("/")?;
    for segment in &self.segments {
      match segment {
        PathSegment::Literal(literal) => f.write_str(literal)?,
        PathSegment::Param(name) => write!(f, "{{{name}}}")?,
      }
    }
    Ok(())
  }
}
