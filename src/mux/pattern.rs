//! Pattern compilation and path matching.
//!
//! A route pattern is compiled once into a [`Pattern`]:
//!
//! - `Exact("/favicon.ico")` matches only that literal path.
//! - `Prefix("/images/")` matches every path starting with the pattern.
//! - `Template` holds slash-delimited [`Segment`]s where any segment
//!   containing `:` captures the matching path segment, optionally behind
//!   a literal prefix (`user-:id`). A trailing `/` makes the template a
//!   prefix form that also matches deeper paths.
//!
//! Patterns and paths are compared as raw strings; no percent-decoding
//! happens here.

use super::params::Params;
use crate::error::RouteError;

pub const CAPTURE_MARKER: char = ':';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// `name` keeps the marker (`:id`); `prefix` is the literal text
    /// before the marker within the same segment.
    Capture { name: String, prefix: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    Prefix(String),
    Template {
        segments: Vec<Segment>,
        prefix_form: bool,
    },
}

impl Pattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        if pattern.is_empty() {
            return Err(RouteError::EmptyPattern);
        }

        let prefix_form = pattern.ends_with('/');

        if !pattern.contains(CAPTURE_MARKER) {
            return Ok(if prefix_form {
                Self::Prefix(pattern.to_string())
            } else {
                Self::Exact(pattern.to_string())
            });
        }

        // A trailing slash leaves an empty final item that only marks the prefix form.
        let body = if prefix_form {
            &pattern[..pattern.len() - 1]
        } else {
            pattern
        };

        let segments = body.split('/').map(Segment::parse).collect();
        Ok(Self::Template {
            segments,
            prefix_form,
        })
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(literal) => path == literal,
            Self::Prefix(literal) => path.starts_with(literal.as_str()),
            Self::Template {
                segments,
                prefix_form,
            } => {
                let path_segments: Vec<&str> = path.split('/').collect();

                let arity_ok = if *prefix_form {
                    path_segments.len() >= segments.len()
                } else {
                    path_segments.len() == segments.len()
                };
                if !arity_ok {
                    return false;
                }

                segments
                    .iter()
                    .zip(&path_segments)
                    .all(|(segment, value)| segment.accepts(value))
            }
        }
    }

    /// Binds every capture segment to its path segment.
    ///
    /// Returns `None` for patterns without captures. Only meaningful for a
    /// `path` that [`matches`](Self::matches); segments missing from the
    /// path are skipped.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Params> {
        let Self::Template { segments, .. } = self else {
            return None;
        };

        let mut params = Params::new();
        for (segment, value) in segments.iter().zip(path.split('/')) {
            if let Segment::Capture { name, prefix } = segment {
                let captured = value.get(prefix.len()..).unwrap_or_default();
                params.add(name.clone(), captured.to_string());
            }
        }
        Some(params)
    }
}

impl Segment {
    fn parse(item: &str) -> Self {
        match item.find(CAPTURE_MARKER) {
            None => Self::Literal(item.to_string()),
            Some(index) => Self::Capture {
                name: item[index..].to_string(),
                prefix: item[..index].to_string(),
            },
        }
    }

    fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Literal(text) => text == value,
            Self::Capture { prefix, .. } => value.starts_with(prefix.as_str()),
        }
    }
}

/// Does `path` match the raw `pattern`? An empty pattern matches nothing.
#[must_use]
pub fn path_match(pattern: &str, path: &str) -> bool {
    Pattern::parse(pattern).is_ok_and(|p| p.matches(path))
}

/// Captured values of `pattern` against an already-matching `path`.
#[must_use]
pub fn parse_splats(pattern: &str, path: &str) -> Option<Params> {
    Pattern::parse(pattern).ok()?.captures(path)
}
