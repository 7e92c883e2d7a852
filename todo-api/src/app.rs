/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use todo_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::in_memory(config)?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use todo_shared::{
    auth::{
        jwt::TokenService,
        middleware::{jwt_auth_middleware, AUTH_TOKEN_HEADER},
        password::{PasswordError, PasswordHasher},
    },
    store::{memory::MemoryStore, TodoStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// User persistence
    pub users: Arc<dyn UserStore>,

    /// To-do persistence
    pub todos: Arc<dyn TodoStore>,

    /// Token issuance and verification
    pub tokens: TokenService,

    /// Password hashing
    pub hasher: PasswordHasher,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over the given stores
    ///
    /// # Errors
    ///
    /// Returns an error if the configured password parameters are invalid
    pub fn new(
        users: Arc<dyn UserStore>,
        todos: Arc<dyn TodoStore>,
        config: Config,
    ) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(config.password)?;
        let tokens = TokenService::new(&config.jwt.secret, config.jwt.issuer.clone());

        Ok(Self {
            users,
            todos,
            tokens,
            hasher,
            config: Arc::new(config),
        })
    }

    /// Creates application state backed by a fresh in-process store
    pub fn in_memory(config: Config) -> Result<Self, PasswordError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, config)
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health     # Health check (public)
/// ├── POST /signup     # Create account (public)
/// ├── POST /login      # Get a token (public)
/// └── POST /addTodo    # Create a to-do (x-auth-token required)
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Token authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/addTodo", post(routes::todos::add_todo))
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(AUTH_TOKEN_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::collections::HashMap;
    use tower::Service as _;

    fn config(cors: &str) -> Config {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("STORE_BACKEND", "memory"),
            ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
            ("CORS_ORIGINS", cors),
            ("PASSWORD_MEMORY_KIB", "1024"),
            ("PASSWORD_ITERATIONS", "1"),
            ("PASSWORD_PARALLELISM", "1"),
        ]);
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
    }

    #[test]
    fn test_invalid_password_parameters_rejected() {
        let mut config = config("*");
        config.password.memory_kib = 0;
        assert!(AppState::in_memory(config).is_err());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let mut app = build_router(AppState::in_memory(config("*")).unwrap());
        let response = app
            .call(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_token_header() {
        let mut app = build_router(AppState::in_memory(config("https://app.example")).unwrap());
        let response = app
            .call(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/addTodo")
                    .header(header::ORIGIN, "https://app.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, AUTH_TOKEN_HEADER)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example"
        );
    }
}
