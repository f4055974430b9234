//! Integration tests for request dispatch through the mux.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{self, header, HeaderValue, Method, StatusCode};
use axum::response::Response;
use patmux::mux::{Params, Redirect, ServeMux};
use tower::ServiceExt;

fn get(uri: &str) -> Request {
    http::Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_on_host(host: &str, uri: &str) -> Request {
    http::Request::builder()
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap()
}

async fn send(mux: &ServeMux, req: Request) -> Response {
    mux.clone().oneshot(req).await.unwrap()
}

async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn tagged(mux: &ServeMux, pattern: &str, tag: &'static str) {
    mux.register_fn(pattern, move |_req: Request| async move { tag });
}

#[tokio::test]
async fn longest_pattern_handles_request() {
    let mux = ServeMux::new();
    tagged(&mux, "/images/", "images");
    tagged(&mux, "/images/thumbnails/", "thumbnails");

    let resp = send(&mux, get("/images/thumbnails/x.png")).await;
    assert_eq!(body_text(resp).await, "thumbnails");

    let resp = send(&mux, get("/images/full/x.png")).await;
    assert_eq!(body_text(resp).await, "images");
}

#[tokio::test]
async fn subtree_root_without_slash_redirects() {
    let mux = ServeMux::new();
    tagged(&mux, "/tree/", "tree");

    let resp = send(&mux, get("/tree")).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()[header::LOCATION], "/tree/");
}

#[tokio::test]
async fn explicit_registration_overrides_implicit_redirect() {
    let mux = ServeMux::new();
    tagged(&mux, "/tree/", "tree");
    tagged(&mux, "/tree", "leaf");

    let resp = send(&mux, get("/tree")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "leaf");
}

#[tokio::test]
async fn dot_segments_redirect_without_calling_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mux = ServeMux::new();
    let counter = Arc::clone(&calls);
    mux.register_fn("/", move |_req: Request| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { "root" }
    });

    let resp = send(&mux, get("/a/b/../c?x=1")).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()[header::LOCATION], "/a/c?x=1");

    let resp = send(&mux, get("//a//b")).await;
    assert_eq!(resp.headers()[header::LOCATION], "/a/b");
    assert_eq!(mux.stats().redirected, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn connect_bypasses_canonicalization() {
    let mux = ServeMux::new();
    tagged(&mux, "/", "root");

    let req = http::Request::builder()
        .method(Method::CONNECT)
        .uri("/a/../b")
        .body(Body::empty())
        .unwrap();
    let resp = send(&mux, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "root");
}

#[tokio::test]
async fn unmatched_request_is_404() {
    let mux = ServeMux::new();
    tagged(&mux, "/only", "only");

    let resp = send(&mux, get("/other")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(mux.stats().not_found, 1);
    assert_eq!(mux.stats().dispatched, 1);
}

#[tokio::test]
async fn custom_not_found_handler() {
    let mux = ServeMux::with_not_found(Redirect::temporary(HeaderValue::from_static("/")));
    let resp = send(&mux, get("/missing")).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn captures_are_prepended_to_query() {
    let mux = ServeMux::new();
    mux.register_fn("/hello/:name", |req: Request| async move {
        req.uri().query().unwrap_or_default().to_string()
    });

    let resp = send(&mux, get("/hello/world?lang=en")).await;
    assert_eq!(body_text(resp).await, "%3Aname=world&lang=en");

    let resp = send(&mux, get("/hello/world")).await;
    assert_eq!(body_text(resp).await, "%3Aname=world");
}

#[tokio::test]
async fn captures_are_attached_as_extension() {
    let mux = ServeMux::new();
    mux.register_fn("/users/user-:id/", |req: Request| async move {
        let params = req.extensions().get::<Params>().cloned().unwrap_or_default();
        params.get(":id").unwrap_or("none").to_string()
    });

    let resp = send(&mux, get("/users/user-42/files")).await;
    assert_eq!(body_text(resp).await, "42");
}

#[tokio::test]
async fn host_specific_pattern_wins_for_its_host() {
    let mux = ServeMux::new();
    tagged(&mux, "/codesearch", "generic");
    tagged(&mux, "codesearch.example.com/", "host");

    let resp = send(&mux, get_on_host("codesearch.example.com", "/codesearch")).await;
    assert_eq!(body_text(resp).await, "host");

    let resp = send(&mux, get_on_host("www.example.com", "/codesearch")).await;
    assert_eq!(body_text(resp).await, "generic");

    let resp = send(&mux, get_on_host("www.example.com", "/elsewhere")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn host_subtree_redirect_drops_host_prefix() {
    let mux = ServeMux::new();
    tagged(&mux, "docs.example.com/guide/", "guide");

    let resp = send(&mux, get_on_host("docs.example.com", "/guide")).await;
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()[header::LOCATION], "/guide/");
}

#[test]
#[should_panic(expected = "multiple registrations")]
fn duplicate_registration_is_fatal() {
    let mux = ServeMux::new();
    tagged(&mux, "/dup", "a");
    tagged(&mux, "/dup", "b");
}
