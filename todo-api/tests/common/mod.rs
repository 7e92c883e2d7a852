/// Common test utilities for integration tests
///
/// Builds the full router over a fresh in-process store, so tests run
/// without a database. Password hashing uses cheap Argon2 parameters.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use todo_api::app::{build_router, AppState};
use todo_api::config::Config;
use todo_shared::auth::jwt::TokenService;
use todo_shared::store::memory::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
    pub tokens: TokenService,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), store.clone(), config.clone())
            .expect("test password parameters are valid");
        let tokens = state.tokens.clone();

        TestContext {
            store,
            app: build_router(state),
            config,
            tokens,
        }
    }

    /// Sends a request and returns status and parsed JSON body
    ///
    /// Empty bodies come back as `Value::Null`.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    /// POSTs a JSON body, optionally with an `x-auth-token` header
    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("x-auth-token", token);
        }

        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Signs up a user and returns the issued token
    pub async fn signup(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/signup",
                &serde_json::json!({ "email": email, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {}", body);

        body["token"].as_str().unwrap().to_string()
    }
}

/// Memory-backed configuration with fast password hashing
pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("STORE_BACKEND", "memory"),
        ("JWT_SECRET", TEST_SECRET),
        ("PASSWORD_MEMORY_KIB", "1024"),
        ("PASSWORD_ITERATIONS", "1"),
        ("PASSWORD_PARALLELISM", "1"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}
