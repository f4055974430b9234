//! Unified error types for patmux.
//!
//! [`RouteError`] covers route-table misconfiguration detected at
//! registration time. [`PatmuxError`] is the binary's error enum and
//! [`ValidationError`] describes one config validation failure. All use
//! `thiserror` for `Display` and `Error` derives.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid pattern: pattern cannot be empty")]
    EmptyPattern,

    #[error("multiple registrations for {pattern}")]
    Duplicate { pattern: String },
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub pattern: String,
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "  route {}: {} - {}",
            self.pattern, self.field, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PatmuxError {
    #[error("No config source found.\n\n  {hint}")]
    NoConfigSource { hint: String },

    #[error("Config file not found: {}", path.display())]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config parse error in {path}:\n  {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Unsupported config format: '{0}'")]
    UnsupportedFormat(String),

    #[error("Route table error: {0}")]
    Route(#[from] RouteError),

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_the_pattern() {
        let e = RouteError::Duplicate {
            pattern: "/tree/".into(),
        };
        assert_eq!(e.to_string(), "multiple registrations for /tree/");
    }

    #[test]
    fn validation_report_lists_every_error() {
        let e = PatmuxError::ConfigValidation {
            errors: vec![
                ValidationError {
                    pattern: "a".into(),
                    field: "pattern".into(),
                    message: "bad".into(),
                    suggestion: Some("did you mean '/a'?".into()),
                },
                ValidationError {
                    pattern: "/b".into(),
                    field: "respond.status".into(),
                    message: "worse".into(),
                    suggestion: None,
                },
            ],
        };
        let text = e.to_string();
        assert!(text.contains("route a: pattern - bad (did you mean '/a'?)"));
        assert!(text.contains("route /b: respond.status - worse"));
    }
}
