//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`Config`] for structural
//! errors such as empty route tables, malformed or duplicate patterns,
//! reserved paths, bad status codes and empty redirect targets. Returns
//! a list of [`ValidationError`] values with per-field suggestions.

use axum::http::{HeaderValue, StatusCode};

use super::model::{Config, Respond};
use crate::error::ValidationError;
use crate::mux::pattern::CAPTURE_MARKER;

/// Served by the process itself, never by the route table.
pub const RESERVED_PATTERNS: &[&str] = &["/health"];

/// Validate a single route pattern. Returns `Ok(())` or a human-readable error.
pub fn validate_pattern(pattern: &str) -> Result<(), String> {
    if pattern.is_empty() {
        return Err("pattern cannot be empty".into());
    }
    if !pattern.contains('/') {
        return Err(format!(
            "pattern must be a path or host-qualified path (did you mean '/{pattern}'?)"
        ));
    }
    if RESERVED_PATTERNS.contains(&pattern) {
        return Err(format!("'{pattern}' is reserved for the health endpoint"));
    }
    Ok(())
}

/// Validate an HTTP status code. Returns `Ok(())` or a human-readable error.
pub fn validate_status(status: u16) -> Result<(), String> {
    StatusCode::from_u16(status)
        .map(|_| ())
        .map_err(|_| format!("{status} is not a valid HTTP status code"))
}

/// Validate a value that is sent as a response header.
pub fn validate_header_value(value: &str) -> Result<(), String> {
    HeaderValue::from_str(value)
        .map(|_| ())
        .map_err(|_| "contains characters not allowed in an HTTP header".into())
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.routes.is_empty() {
        errors.push(ValidationError {
            pattern: "(root)".into(),
            field: "routes".into(),
            message: "at least one route must be defined".into(),
            suggestion: None,
        });
        return Err(errors);
    }

    let mut seen_patterns = std::collections::HashSet::new();

    for (i, route) in config.routes.iter().enumerate() {
        let route_id = if route.pattern.is_empty() {
            format!("routes[{i}]")
        } else {
            route.pattern.clone()
        };

        if let Err(msg) = validate_pattern(&route.pattern) {
            errors.push(ValidationError {
                pattern: route_id.clone(),
                field: "pattern".into(),
                message: msg,
                suggestion: if !route.pattern.is_empty() && !route.pattern.contains('/') {
                    Some(format!("did you mean '/{}'?", route.pattern))
                } else {
                    None
                },
            });
        }

        if !route.pattern.is_empty() && !seen_patterns.insert(&route.pattern) {
            errors.push(ValidationError {
                pattern: route_id.clone(),
                field: "pattern".into(),
                message: "duplicate route pattern".into(),
                suggestion: None,
            });
        }

        match &route.respond {
            Respond::Text {
                status,
                content_type,
                ..
            } => {
                if let Err(msg) = validate_status(*status) {
                    errors.push(ValidationError {
                        pattern: route_id.clone(),
                        field: "respond.status".into(),
                        message: msg,
                        suggestion: None,
                    });
                }
                if let Some(Err(msg)) = content_type.as_deref().map(validate_header_value) {
                    errors.push(ValidationError {
                        pattern: route_id.clone(),
                        field: "respond.content_type".into(),
                        message: msg,
                        suggestion: None,
                    });
                }
            }
            Respond::Redirect { location, .. } => {
                if location.trim().is_empty() {
                    errors.push(ValidationError {
                        pattern: route_id.clone(),
                        field: "respond.location".into(),
                        message: "redirect location cannot be empty".into(),
                        suggestion: None,
                    });
                } else if let Err(msg) = validate_header_value(location) {
                    errors.push(ValidationError {
                        pattern: route_id.clone(),
                        field: "respond.location".into(),
                        message: msg,
                        suggestion: Some("percent-encode control characters and non-ASCII text".into()),
                    });
                }
            }
            Respond::Echo => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &Config) -> String {
    let (text, echo, redirect) = config.count_by_kind();
    let mut lines = vec![format!(
        "  {} routes ({text} text, {echo} echo, {redirect} redirect)\n",
        config.routes.len()
    )];

    for route in &config.routes {
        let shape = if route.pattern.contains(CAPTURE_MARKER) {
            "template"
        } else if route.pattern.ends_with('/') {
            "prefix"
        } else {
            "exact"
        };
        let target = match &route.respond {
            Respond::Redirect { location, .. } => format!(" -> {location}"),
            _ => String::new(),
        };
        lines.push(format!(
            "  {}  [{shape}] {}{target}",
            route.pattern,
            route.respond.kind()
        ));
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}
