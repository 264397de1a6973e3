//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a record store and default config
//! into an [`AppContext`]. The [`TestHarness::with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use vidstore_core::config::Config;
use vidstore_db::{JsonFileStore, RecordStore, SqliteStore};
use vidstore_server::context::AppContext;
use vidstore_server::router::build_router;

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    /// Keeps on-disk stores alive for the lifetime of the harness.
    pub dir: Option<TempDir>,
}

/// Default config with no static directory, so the built-in player is used.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server.static_dir = None;
    config
}

impl TestHarness {
    /// Harness over an in-memory SQLite store.
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Harness over an in-memory SQLite store with a custom config.
    pub fn with_config(config: Config) -> Self {
        let store = SqliteStore::open_in_memory("videos").expect("failed to open in-memory store");
        Self::with_store(config, Arc::new(store))
    }

    /// Harness over a JSON document in a temporary directory.
    pub fn with_json_file() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store =
            JsonFileStore::open(dir.path().join("videos_db.json")).expect("failed to open json store");
        let mut harness = Self::with_store(test_config(), Arc::new(store));
        harness.dir = Some(dir);
        harness
    }

    /// Harness over any store.
    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Self {
        Self {
            ctx: AppContext::new(config, store),
            dir: None,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.ctx.clone())
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = harness.spawn_server().await;
        (harness, addr)
    }

    /// Serve this harness's router on a random port.
    pub async fn spawn_server(&self) -> SocketAddr {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }

    /// Send one request through the router in-process.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_to_string(response.into_body()).await)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// POST a raw JSON body.
    pub async fn post_json(&self, uri: &str, body: &str) -> (StatusCode, String) {
        self.send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Create a record through the API and return its id.
    pub async fn create_video(&self, body: serde_json::Value) -> String {
        let (status, text) = self.post_json("/api/videos", &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {text}");
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        json["id"].as_str().unwrap().to_string()
    }
}

/// Helper to get response body as string.
pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// A sample `servers` array with one server, two qualities and a subtitle.
pub fn sample_servers() -> serde_json::Value {
    serde_json::json!([
        {
            "name": "Server1",
            "qualities": [
                {"res": "720p", "url": "https://example.com/a-720.mp4"},
                {"res": "1080p", "url": "https://example.com/a-1080.mp4"}
            ],
            "subtitles": [
                {"lang": "en", "label": "English", "url": "https://example.com/a.en.vtt"}
            ]
        }
    ])
}
