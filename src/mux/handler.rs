//! The [`Handler`] capability and the built-in handlers the mux issues
//! on its own: permanent redirects and the default not-found response.

use std::future::Future;

use async_trait::async_trait;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

// async_trait keeps Handler object-safe; the registry stores Arc<dyn Handler>.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, req: Request) -> Response;
}

/// Adapts a bare async function into a [`Handler`].
pub struct HandlerFn<F>(pub F);

#[async_trait]
impl<F, Fut, R> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    async fn call(&self, req: Request) -> Response {
        (self.0)(req).await.into_response()
    }
}

/// Redirects every request to a fixed location.
///
/// The location is a [`HeaderValue`], so a target that cannot be sent as a
/// `Location` header is rejected when the handler is built.
#[derive(Debug, Clone)]
pub struct Redirect {
    location: HeaderValue,
    status: StatusCode,
}

impl Redirect {
    /// `301 Moved Permanently`.
    #[must_use]
    pub const fn permanent(location: HeaderValue) -> Self {
        Self {
            location,
            status: StatusCode::MOVED_PERMANENTLY,
        }
    }

    /// `302 Found`.
    #[must_use]
    pub const fn temporary(location: HeaderValue) -> Self {
        Self {
            location,
            status: StatusCode::FOUND,
        }
    }
}

#[async_trait]
impl Handler for Redirect {
    async fn call(&self, _req: Request) -> Response {
        redirect_response(self.status, self.location.clone())
    }
}

/// Implicit handler registered at `/tree` when `/tree/` is registered.
pub(crate) struct AppendSlash;

#[async_trait]
impl Handler for AppendSlash {
    async fn call(&self, req: Request) -> Response {
        let uri = req.uri();
        let location = match uri.query() {
            Some(query) => format!("{}/?{query}", uri.path()),
            None => format!("{}/", uri.path()),
        };
        redirect_to(StatusCode::MOVED_PERMANENTLY, &location)
    }
}

pub struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn call(&self, _req: Request) -> Response {
        (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
    }
}

pub(crate) fn redirect_response(status: StatusCode, location: HeaderValue) -> Response {
    (status, [(header::LOCATION, location)]).into_response()
}

/// Redirect to a location assembled from the request URI.
pub(crate) fn redirect_to(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => redirect_response(status, value),
        Err(error) => {
            tracing::warn!(location = %location, error = %error, "unusable redirect location");
            StatusCode::BAD_REQUEST.into_response()
        }
    }
}
