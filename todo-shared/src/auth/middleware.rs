/// Authentication middleware for Axum
///
/// Every protected request is evaluated on its own:
///
/// ```text
/// NoToken ──────────────────────────────────────> 401 Unauthorized
/// TokenPresent ── verify ──┬─ ok ──> Authenticated (AuthContext inserted, continue)
///                          └─ err ─> Rejected      (401 Unauthorized)
/// ```
///
/// The token is read from the `x-auth-token` header; `Authorization: Bearer`
/// is accepted as a fallback. Rejections always answer
/// `{"message":"Unauthorized"}` and the reason is only logged.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::post, Extension, Router};
/// use todo_shared::auth::jwt::TokenService;
/// use todo_shared::auth::middleware::{jwt_auth_middleware, AuthContext};
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!", "todo-api");
/// let app: Router = Router::new()
///     .route("/protected", post(handler))
///     .layer(middleware::from_fn_with_state(tokens, jwt_auth_middleware));
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{JwtError, TokenService};

/// Header carrying the bearer token
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Authentication context added to request extensions
///
/// Handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token in the request
    #[error("Missing credentials")]
    MissingCredentials,

    /// Token failed verification
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        debug!(reason = %self, "Rejected unauthenticated request");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthorized" })),
        )
            .into_response()
    }
}

/// Pulls the bearer token out of the request headers
///
/// Empty header values count as missing.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(AUTH_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// JWT authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if the token is missing, malformed, signed with
/// another key or expired
pub async fn jwt_auth_middleware(
    State(tokens): State<TokenService>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(req.headers()).ok_or(AuthError::MissingCredentials)?;

    let claims = tokens.verify(token)?;

    req.extensions_mut().insert(AuthContext {
        user_id: claims.user_id(),
    });

    Ok(next.run(req).await)
}
