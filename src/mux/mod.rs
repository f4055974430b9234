//! HTTP request multiplexer with pat-style routes.
//!
//! [`ServeMux`] matches the host and path of each request against its
//! registered patterns and calls the handler of the longest matching
//! pattern. Patterns name fixed paths (`/favicon.ico`), rooted subtrees
//! (`/images/`), or templates with captures (`/users/:id`), and may begin
//! with a host name (`example.com/admin/`) to restrict them to that host.
//! Host-qualified matches take precedence over host-agnostic ones.
//!
//! Request paths are canonicalized first: a request containing `.`, `..`
//! or doubled slashes is redirected to the clean path. Captured values are
//! prepended to the query string and attached to the request as a
//! [`Params`] extension.
//!
//! ```no_run
//! use patmux::mux::ServeMux;
//!
//! let mux = ServeMux::new();
//! mux.register_fn("/users/:id", |req: axum::extract::Request| async move {
//!     let params = req.extensions().get::<patmux::mux::Params>().cloned();
//!     format!("{params:?}")
//! });
//! ```

pub mod clean;
pub mod handler;
pub mod params;
pub mod pattern;

use std::cmp::Reverse;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::uri::PathAndQuery;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use parking_lot::RwLock;

pub use clean::clean_path;
pub use handler::{Handler, HandlerFn, NotFound, Redirect};
pub use params::Params;
pub use pattern::{parse_splats, path_match, Pattern, Segment};

use crate::error::RouteError;
use handler::{redirect_to, AppendSlash};

struct MuxEntry {
    explicit: bool,
    pattern: Pattern,
    handler: Arc<dyn Handler>,
    seq: u64,
}

#[derive(Default)]
struct RouteTable {
    entries: HashMap<String, MuxEntry>,
    next_seq: u64,
}

impl RouteTable {
    fn is_explicit(&self, pattern: &str) -> bool {
        self.entries.get(pattern).is_some_and(|e| e.explicit)
    }

    fn insert(&mut self, key: &str, pattern: Pattern, handler: Arc<dyn Handler>, explicit: bool) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key.to_string(),
            MuxEntry {
                explicit,
                pattern,
                handler,
                seq,
            },
        );
    }

    /// Longest matching pattern; equal lengths go to the earliest registration.
    fn best_match(&self, path: &str) -> Option<Resolved> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.pattern.matches(path))
            .min_by_key(|(key, entry)| (Reverse(key.len()), entry.seq))
            .map(|(key, entry)| Resolved {
                pattern: key.clone(),
                handler: Arc::clone(&entry.handler),
                params: entry.pattern.captures(path),
            })
    }
}

/// Outcome of a successful lookup.
pub struct Resolved {
    pub pattern: String,
    pub handler: Arc<dyn Handler>,
    pub params: Option<Params>,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("pattern", &self.pattern)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub pattern: String,
    pub explicit: bool,
}

#[derive(Debug, Default)]
struct Stats {
    dispatched: AtomicU64,
    redirected: AtomicU64,
    not_found: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub dispatched: u64,
    pub redirected: u64,
    pub not_found: u64,
}

struct Inner {
    table: RwLock<RouteTable>,
    not_found: Arc<dyn Handler>,
    stats: Stats,
}

/// Cloning is cheap: clones share one route table.
#[derive(Clone)]
pub struct ServeMux {
    inner: Arc<Inner>,
}

impl Default for ServeMux {
    fn default() -> Self {
        Self::new()
    }
}

impl ServeMux {
    #[must_use]
    pub fn new() -> Self {
        Self::with_not_found(NotFound)
    }

    /// A mux that answers unmatched requests with `handler`.
    #[must_use]
    pub fn with_not_found<H: Handler>(handler: H) -> Self {
        Self {
            inner: Arc::new(Inner {
                table: RwLock::new(RouteTable::default()),
                not_found: Arc::new(handler),
                stats: Stats::default(),
            }),
        }
    }

    /// Registers `handler` for `pattern`.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty or already explicitly registered. A
    /// route table with either mistake is a programming error.
    pub fn register<H: Handler>(&self, pattern: &str, handler: H) {
        if let Err(e) = self.try_register(pattern, handler) {
            panic!("{e}");
        }
    }

    /// Registers an async function for `pattern`. Panics like [`register`](Self::register).
    pub fn register_fn<F, Fut, R>(&self, pattern: &str, f: F)
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        self.register(pattern, HandlerFn(f));
    }

    /// Fallible form of [`register`](Self::register).
    ///
    /// Registering `/tree/` also registers an implicit permanent redirect
    /// from `/tree` to `/tree/` unless `/tree` is already explicit. A later
    /// explicit registration of `/tree` replaces the redirect.
    pub fn try_register<H: Handler>(&self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.try_register_arc(pattern, Arc::new(handler))
    }

    /// Like [`try_register`](Self::try_register) for a handler that is
    /// already shared, as when handlers are built from a config file.
    pub fn try_register_arc(
        &self,
        pattern: &str,
        handler: Arc<dyn Handler>,
    ) -> Result<(), RouteError> {
        let compiled = Pattern::parse(pattern)?;

        let mut table = self.inner.table.write();
        if table.is_explicit(pattern) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
            });
        }
        table.insert(pattern, compiled, handler, true);

        if let Some(stripped) = pattern.strip_suffix('/') {
            if !stripped.is_empty() && !table.is_explicit(stripped) {
                let implicit = Pattern::parse(stripped)?;
                table.insert(stripped, implicit, Arc::new(AppendSlash), false);
                tracing::debug!(pattern = %stripped, redirect_to = %pattern, "implicit redirect registered");
            }
        }
        drop(table);

        tracing::info!(pattern = %pattern, "route registered");
        Ok(())
    }

    /// Finds the handler for a request on `host` with `path`.
    ///
    /// Patterns are first matched against `host + path`, then against
    /// `path` alone. The longest matching pattern wins.
    #[must_use]
    pub fn resolve(&self, host: &str, path: &str) -> Option<Resolved> {
        let host_path = format!("{host}{path}");
        let table = self.inner.table.read();
        table
            .best_match(&host_path)
            .or_else(|| table.best_match(path))
    }

    /// Handles one request: canonicalize, resolve, invoke.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let stats = &self.inner.stats;
        stats.dispatched.fetch_add(1, Ordering::Relaxed);

        // CONNECT carries an opaque target, not a path.
        if req.method() != Method::CONNECT {
            let path = req.uri().path();
            let cleaned = clean_path(path);
            if cleaned != path {
                let location = match req.uri().query() {
                    Some(query) => format!("{cleaned}?{query}"),
                    None => cleaned,
                };
                tracing::debug!(path = %path, location = %location, "redirecting to canonical path");
                stats.redirected.fetch_add(1, Ordering::Relaxed);
                return redirect_to(StatusCode::MOVED_PERMANENTLY, &location);
            }
        }

        let host = request_host(&req);
        let Some(route) = self.resolve(&host, req.uri().path()) else {
            tracing::debug!(host = %host, path = %req.uri().path(), "no route matched");
            stats.not_found.fetch_add(1, Ordering::Relaxed);
            return self.inner.not_found.call(req).await;
        };

        tracing::debug!(pattern = %route.pattern, path = %req.uri().path(), "route matched");
        if let Some(params) = route.params {
            attach_params(&mut req, params);
        }
        route.handler.call(req).await
    }

    /// Registered patterns sorted by pattern text.
    #[must_use]
    pub fn patterns(&self) -> Vec<RouteInfo> {
        let table = self.inner.table.read();
        let mut routes: Vec<RouteInfo> = table
            .entries
            .iter()
            .map(|(pattern, entry)| RouteInfo {
                pattern: pattern.clone(),
                explicit: entry.explicit,
            })
            .collect();
        drop(table);
        routes.sort_by(|a, b| a.pattern.cmp(&b.pattern));
        routes
    }

    /// Number of entries, implicit redirects included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.table.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        let stats = &self.inner.stats;
        StatsSnapshot {
            dispatched: stats.dispatched.load(Ordering::Relaxed),
            redirected: stats.redirected.load(Ordering::Relaxed),
            not_found: stats.not_found.load(Ordering::Relaxed),
        }
    }
}

impl tower::Service<Request> for ServeMux {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let mux = self.clone();
        Box::pin(async move { Ok(mux.dispatch(req).await) })
    }
}

fn request_host(req: &Request) -> String {
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or_default()
        .to_string()
}

/// Prepends the captures to the query string and stores them as an extension.
fn attach_params(req: &mut Request, params: Params) {
    let query = params.merge_query(req.uri().query());
    let rewritten = format!("{}?{query}", req.uri().path())
        .parse::<PathAndQuery>()
        .map_err(|e| e.to_string())
        .and_then(|pq| {
            let mut parts = req.uri().clone().into_parts();
            parts.path_and_query = Some(pq);
            Uri::from_parts(parts).map_err(|e| e.to_string())
        });

    match rewritten {
        Ok(uri) => *req.uri_mut() = uri,
        Err(error) => tracing::warn!(error = %error, "failed to rewrite query with captures"),
    }
    req.extensions_mut().insert(params);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag(&'static str);

    #[async_trait::async_trait]
    impl Handler for Tag {
        async fn call(&self, _req: Request) -> Response {
            self.0.into_response()
        }
    }

    fn ok(tag: &'static str) -> Tag {
        Tag(tag)
    }

    fn resolved_pattern(mux: &ServeMux, host: &str, path: &str) -> Option<String> {
        mux.resolve(host, path).map(|r| r.pattern)
    }

    #[test]
    #[should_panic(expected = "multiple registrations for /a")]
    fn duplicate_explicit_registration_panics() {
        let mux = ServeMux::new();
        mux.register("/a", ok("a"));
        mux.register("/a", ok("b"));
    }

    #[test]
    #[should_panic(expected = "pattern cannot be empty")]
    fn empty_pattern_panics() {
        ServeMux::new().register("", ok("a"));
    }

    #[test]
    fn try_register_reports_duplicates() {
        let mux = ServeMux::new();
        mux.try_register("/a/", ok("a")).unwrap();
        assert_eq!(
            mux.try_register("/a/", ok("b")),
            Err(RouteError::Duplicate {
                pattern: "/a/".into()
            })
        );
    }

    #[test]
    fn trailing_slash_adds_implicit_redirect() {
        let mux = ServeMux::new();
        mux.register("/tree/", ok("tree"));
        assert_eq!(
            mux.patterns(),
            vec![
                RouteInfo {
                    pattern: "/tree".into(),
                    explicit: false
                },
                RouteInfo {
                    pattern: "/tree/".into(),
                    explicit: true
                },
            ]
        );
        assert_eq!(resolved_pattern(&mux, "", "/tree").as_deref(), Some("/tree"));
    }

    #[test]
    fn explicit_registration_replaces_implicit() {
        let mux = ServeMux::new();
        mux.register("/tree/", ok("tree"));
        mux.register("/tree", ok("leaf"));
        assert!(mux.patterns().iter().all(|r| r.explicit));
        assert_eq!(mux.len(), 2);
    }

    #[test]
    fn explicit_entry_is_not_replaced_by_implicit() {
        let mux = ServeMux::new();
        mux.register("/tree", ok("leaf"));
        mux.register("/tree/", ok("tree"));
        assert!(mux.patterns().iter().all(|r| r.explicit));
    }

    #[test]
    fn root_pattern_adds_no_implicit_entry() {
        let mux = ServeMux::new();
        mux.register("/", ok("root"));
        assert_eq!(mux.len(), 1);
    }

    #[test]
    fn longest_pattern_wins() {
        let mux = ServeMux::new();
        mux.register("/images/", ok("images"));
        mux.register("/images/thumbnails/", ok("thumbs"));
        assert_eq!(
            resolved_pattern(&mux, "", "/images/thumbnails/x").as_deref(),
            Some("/images/thumbnails/")
        );
        assert_eq!(
            resolved_pattern(&mux, "", "/images/full/x").as_deref(),
            Some("/images/")
        );
    }

    #[test]
    fn equal_length_goes_to_first_registration() {
        let mux = ServeMux::new();
        mux.register("/:b", ok("b"));
        mux.register("/:a", ok("a"));
        assert_eq!(resolved_pattern(&mux, "", "/x").as_deref(), Some("/:b"));
    }

    #[test]
    fn host_pattern_takes_precedence() {
        let mux = ServeMux::new();
        mux.register("/codesearch", ok("generic"));
        mux.register("codesearch.example.com/", ok("host"));
        assert_eq!(
            resolved_pattern(&mux, "codesearch.example.com", "/codesearch").as_deref(),
            Some("codesearch.example.com/")
        );
        assert_eq!(
            resolved_pattern(&mux, "www.example.com", "/codesearch").as_deref(),
            Some("/codesearch")
        );
        assert!(resolved_pattern(&mux, "www.example.com", "/other").is_none());
    }

    #[test]
    fn resolve_extracts_captures() {
        let mux = ServeMux::new();
        mux.register("/hello/:a", ok("hello"));
        let route = mux.resolve("", "/hello/world").unwrap();
        assert_eq!(route.pattern, "/hello/:a");
        assert_eq!(route.params.unwrap().get(":a"), Some("world"));
    }

    #[test]
    fn host_template_captures_from_matched_string() {
        let mux = ServeMux::new();
        mux.register("api.example.com/v/:version", ok("api"));
        let route = mux.resolve("api.example.com", "/v/2").unwrap();
        assert_eq!(route.params.unwrap().get(":version"), Some("2"));
    }

    #[test]
    fn flat_match_has_no_params() {
        let mux = ServeMux::new();
        mux.register("/static/", ok("static"));
        assert!(mux.resolve("", "/static/app.js").unwrap().params.is_none());
    }

    #[test]
    fn miss_returns_none() {
        let mux = ServeMux::new();
        mux.register("/a", ok("a"));
        assert!(mux.resolve("", "/b").is_none());
        assert!(ServeMux::new().is_empty());
    }

    #[test]
    fn implicit_redirect_is_visible_with_its_subtree() {
        use std::sync::atomic::AtomicBool;

        const TREES: usize = 200;
        let mux = ServeMux::new();
        let done = AtomicBool::new(false);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while !done.load(Ordering::Acquire) {
                        for i in 0..TREES {
                            let tree = format!("/t{i}/");
                            if mux.resolve("", &tree).is_none() {
                                continue;
                            }
                            let bare = format!("/t{i}");
                            assert_eq!(
                                resolved_pattern(&mux, "", &bare).as_deref(),
                                Some(bare.as_str()),
                                "{tree} visible before {bare}"
                            );
                        }
                    }
                });
            }

            for i in 0..TREES {
                mux.register(&format!("/t{i}/"), ok("tree"));
                if i % 2 == 1 {
                    mux.register(&format!("/t{i}"), ok("leaf"));
                }
            }
            done.store(true, Ordering::Release);
        });

        assert_eq!(mux.len(), TREES * 2);
        assert!(mux.patterns().iter().filter(|r| !r.explicit).count() == TREES / 2);
    }

    #[test]
    fn clones_share_the_table() {
        let mux = ServeMux::new();
        let other = mux.clone();
        other.register("/shared", ok("shared"));
        assert!(mux.resolve("", "/shared").is_some());
    }
}
