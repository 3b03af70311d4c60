//! Router-level tests.
//!
//! Drives the axum router directly with `oneshot`, no socket involved.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use kvgate_server::handlers::GatewayState;
use kvgate_server::http::router;
use kvgate_store::{KeyValue, MemoryStore};
use std::sync::Arc;
use tower::ServiceExt;

fn app_with(store: Arc<MemoryStore>) -> Router {
    router(GatewayState::new(store), true)
}

async fn send(app: &Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_set_then_get() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/set",
        r#"{"key":"onlySet","value":"TheValueSet"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, body) = send(&app, Method::GET, "/get?key=onlySet", "").await;
    assert_eq!(status, StatusCode::OK);
    let kv: KeyValue = serde_json::from_str(&body).unwrap();
    assert_eq!(kv, KeyValue::new("onlySet", "TheValueSet"));
}

#[tokio::test]
async fn test_get_json_content_type() {
    let store = Arc::new(MemoryStore::with_entries([("k", "v")]));
    let app = app_with(store);

    let request = Request::get("/get?key=k").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
}

#[tokio::test]
async fn test_get_unset_key_is_not_found() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::GET, "/get?key=doesnotexist", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Key not found");
}

#[tokio::test]
async fn test_get_requires_key() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, _) = send(&app, Method::GET, "/get", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/get?key=", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_repeated_key_uses_first_value() {
    let store = Arc::new(MemoryStore::with_entries([("a", "first"), ("b", "second")]));
    let app = app_with(store.clone());

    let (status, body) = send(&app, Method::GET, "/get?key=a&key=b", "").await;
    assert_eq!(status, StatusCode::OK);
    let kv: KeyValue = serde_json::from_str(&body).unwrap();
    assert_eq!(kv, KeyValue::new("a", "first"));

    // Other parameters are ignored; an empty first key still counts as missing.
    let (status, _) = send(&app, Method::GET, "/get?trace=1&key=b", "").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/get?key=&key=b", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::DELETE, "/delete?key=b&key=a", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Key 'b' deleted");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_set_rejects_bad_bodies() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    let bodies = [
        r#"{"key":"k"}"#,
        r#"{"value":"v"}"#,
        r#"{"key":"k","value":"v","extra":1}"#,
        r#"{"key":"","value":"v"}"#,
        r#"{"key":"k","value":"v"} trailing"#,
        r#"{"key":"k","value":5}"#,
        "not json",
        "",
    ];

    for body in bodies {
        let (status, _) = send(&app, Method::POST, "/set", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
    }

    assert!(store.is_empty(), "rejected bodies must not reach the store");
}

#[tokio::test]
async fn test_set_overwrites() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());

    send(&app, Method::POST, "/set", r#"{"key":"k","value":"one"}"#).await;
    send(&app, Method::POST, "/set", r#"{"key":"k","value":"two"}"#).await;

    let (_, body) = send(&app, Method::GET, "/get?key=k", "").await;
    let kv: KeyValue = serde_json::from_str(&body).unwrap();
    assert_eq!(kv.value, "two");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_get_all() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::GET, "/getAll", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");

    for i in 0..5 {
        let body = format!(r#"{{"key":"key{}","value":"value{}"}}"#, i, i);
        let (status, _) = send(&app, Method::POST, "/set", &body).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app, Method::GET, "/getAll", "").await;
    assert_eq!(status, StatusCode::OK);
    let all: Vec<KeyValue> = serde_json::from_str(&body).unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0], KeyValue::new("key0", "value0"));
    assert_eq!(all[4], KeyValue::new("key4", "value4"));
}

#[tokio::test]
async fn test_delete() {
    let store = Arc::new(MemoryStore::with_entries([("onlyDel", "TheValueSet")]));
    let app = app_with(store.clone());

    let (status, body) = send(&app, Method::DELETE, "/delete?key=onlyDel", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Key 'onlyDel' deleted");

    let (status, _) = send(&app, Method::GET, "/get?key=onlyDel", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // No existence precondition
    let (status, _) = send(&app, Method::DELETE, "/delete?key=onlyDel", "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_requires_key() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::DELETE, "/delete?key=", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Key is required");
}

#[tokio::test]
async fn test_wrong_method() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let cases = [
        (Method::GET, "/set", "POST"),
        (Method::PUT, "/set", "POST"),
        (Method::POST, "/get?key=k", "GET"),
        (Method::DELETE, "/getAll", "GET"),
        (Method::GET, "/delete?key=k", "DELETE"),
        (Method::POST, "/health", "GET"),
    ];

    for (method, uri, allowed) in cases {
        let request = Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{} {}",
            method,
            uri
        );
        assert_eq!(response.headers()[header::ALLOW], allowed);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes, format!("Only {} is allowed", allowed).as_bytes());
    }
}

#[tokio::test]
async fn test_unknown_path() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let (status, _) = send(&app, Method::GET, "/watch", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failures_are_internal_errors() {
    let store = Arc::new(MemoryStore::with_entries([("k", "v")]));
    let app = app_with(store.clone());
    store.set_unavailable(true);

    let cases = [
        (Method::POST, "/set", r#"{"key":"k","value":"v"}"#, "Failed to set key-value pair"),
        (Method::GET, "/get?key=k", "", "Failed to get value for key"),
        (Method::GET, "/getAll", "", "Failed to get all key-value pairs"),
        (Method::DELETE, "/delete?key=k", "", "Failed to delete key"),
    ];

    for (method, uri, body, message) in cases {
        let (status, text) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(text, message);
    }

    store.set_unavailable(false);
    let (status, _) = send(&app, Method::GET, "/get?key=k", "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_skips_store() {
    let store = Arc::new(MemoryStore::new());
    let app = app_with(store.clone());
    store.set_unavailable(true);

    let (status, body) = send(&app, Method::GET, "/health", "").await;
    assert_eq!(status, StatusCode::OK);

    let health: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["backend"], "memory");
}

#[tokio::test]
async fn test_bare_options() {
    let app = app_with(Arc::new(MemoryStore::new()));

    for uri in ["/set", "/get", "/getAll", "/delete"] {
        let (status, body) = send(&app, Method::OPTIONS, uri, "").await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(body.is_empty());
    }
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/delete?key=k")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("DELETE"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_cors_on_simple_request() {
    let app = app_with(Arc::new(MemoryStore::new()));

    let request = Request::get("/getAll")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://example.com"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let app = router(GatewayState::new(Arc::new(MemoryStore::new())), false);

    let request = Request::get("/getAll")
        .header(header::ORIGIN, "http://example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
