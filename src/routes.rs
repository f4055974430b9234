//! Mounts a configured route table onto a [`ServeMux`].
//!
//! Each [`Route`](crate::config::model::Route) becomes one explicit
//! registration whose handler is built from its [`Respond`] section.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::model::{Config, Respond};
use crate::error::{PatmuxError, ValidationError};
use crate::mux::{Handler, Params, Redirect, ServeMux};

const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub fn mount(mux: &ServeMux, config: &Config) -> Result<(), PatmuxError> {
    for route in &config.routes {
        let handler = build_handler(&route.pattern, &route.respond)?;
        mux.try_register_arc(&route.pattern, handler)?;
    }
    tracing::debug!(routes = config.routes.len(), entries = mux.len(), "route table mounted");
    Ok(())
}

fn build_handler(pattern: &str, respond: &Respond) -> Result<Arc<dyn Handler>, PatmuxError> {
    let handler: Arc<dyn Handler> = match respond {
        Respond::Text {
            status,
            body,
            content_type,
        } => {
            let status = StatusCode::from_u16(*status)
                .map_err(|e| invalid(pattern, "respond.status", e.to_string()))?;
            let content_type = match content_type {
                Some(value) => header_value(pattern, "respond.content_type", value)?,
                None => HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            };
            Arc::new(Text {
                status,
                body: body.clone(),
                content_type,
            })
        }
        Respond::Echo => Arc::new(Echo {
            pattern: pattern.to_string(),
        }),
        Respond::Redirect {
            location,
            permanent,
        } => {
            let location = header_value(pattern, "respond.location", location)?;
            if *permanent {
                Arc::new(Redirect::permanent(location))
            } else {
                Arc::new(Redirect::temporary(location))
            }
        }
    };
    Ok(handler)
}

fn header_value(pattern: &str, field: &str, value: &str) -> Result<HeaderValue, PatmuxError> {
    HeaderValue::from_str(value).map_err(|e| invalid(pattern, field, e.to_string()))
}

fn invalid(pattern: &str, field: &str, message: String) -> PatmuxError {
    PatmuxError::ConfigValidation {
        errors: vec![ValidationError {
            pattern: pattern.to_string(),
            field: field.to_string(),
            message,
            suggestion: None,
        }],
    }
}

struct Text {
    status: StatusCode,
    body: String,
    content_type: HeaderValue,
}

#[async_trait]
impl Handler for Text {
    async fn call(&self, req: Request) -> Response {
        let body = match req.extensions().get::<Params>() {
            Some(params) => render(&self.body, params),
            None => self.body.clone(),
        };
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type.clone())],
            body,
        )
            .into_response()
    }
}

/// Replaces each `{name}` placeholder with the first value bound to `name`.
///
/// The template is scanned once; substituted values are copied verbatim and
/// never scanned for further placeholders.
#[must_use]
pub fn render(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            break;
        };
        let name = &tail[1..close];
        match params.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    if let Some(open) = rest.find('{') {
        out.push_str(&rest[open..]);
    } else {
        out.push_str(rest);
    }
    out
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EchoResponse {
    pub pattern: String,
    pub host: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub params: Params,
}

struct Echo {
    pattern: String,
}

#[async_trait]
impl Handler for Echo {
    async fn call(&self, req: Request) -> Response {
        let host = req
            .headers()
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Json(EchoResponse {
            pattern: self.pattern.clone(),
            host,
            path: req.uri().path().to_string(),
            query: req.uri().query().map(String::from),
            params: req.extensions().get::<Params>().cloned().unwrap_or_default(),
        })
        .into_response()
    }
}
