/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. The taxonomy is small and
/// each variant has a fixed status and body:
///
/// | Variant          | Status | Body                                            |
/// |------------------|--------|-------------------------------------------------|
/// | `Validation`     | 400    | `{"errors":[{"field":..,"message":..}]}`        |
/// | `DuplicateEmail` | 400    | `{"message":"Email already registered"}`        |
/// | `UserNotFound`   | 400    | `{"message":"User not found"}`                  |
/// | `InvalidPassword`| 400    | `{"message":"Invalid password"}`                |
/// | `Internal`       | 500    | `{"message":"Internal server error"}`           |
///
/// Internal details are logged server-side and never sent to clients.
/// Missing or invalid tokens never reach a handler: the 401 is answered by
/// [`todo_shared::auth::middleware::AuthError`].
///
/// # Example
///
/// ```
/// use todo_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::Value;
///
/// async fn handler() -> ApiResult<Json<Value>> {
///     Err(ApiError::UserNotFound)
/// }
/// ```

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use todo_shared::{
    auth::{jwt::JwtError, password::PasswordError},
    store::StoreError,
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request failed validation (400)
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<ValidationErrorDetail>),

    /// Email already registered (400)
    #[error("Email already registered")]
    DuplicateEmail,

    /// No user with the given email (400)
    #[error("User not found")]
    UserNotFound,

    /// Password does not match (400)
    #[error("Invalid password")]
    InvalidPassword,

    /// Anything unexpected, including persistence failures (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::UserNotFound
            | ApiError::InvalidPassword => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds a `Validation` error, sorting fields so responses are deterministic
    pub fn validation(mut details: Vec<ValidationErrorDetail>) -> Self {
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::Validation(details)
    }
}

/// Flattens `validator` output into one detail per failed rule
pub fn validation_details(errors: &validator::ValidationErrors) -> Vec<ValidationErrorDetail> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                json!({ "message": "Internal server error" })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Handlers only issue tokens; a failure there is a server fault.
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Internal(format!("Token operation failed: {}", err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(vec![ValidationErrorDetail {
            field: "body".to_string(),
            message: rejection.body_text(),
        }])
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ApiError::DuplicateEmail.to_string(), "Email already registered");
        assert_eq!(ApiError::UserNotFound.to_string(), "User not found");

        let err = ApiError::Validation(vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[tokio::test]
    async fn test_response_bodies() {
        let (status, body) = body_json(ApiError::InvalidPassword).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Invalid password" }));

        let (status, body) = body_json(ApiError::Internal("db exploded".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_validation_body() {
        let err = ApiError::Validation(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }]);

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "email");
        assert_eq!(body["errors"][0]["message"], "Invalid email format");
    }

    #[test]
    fn test_validation_sorts_fields() {
        let detail = |field: &str| ValidationErrorDetail {
            field: field.to_string(),
            message: "bad".to_string(),
        };

        match ApiError::validation(vec![detail("password"), detail("email")]) {
            ApiError::Validation(details) => {
                assert_eq!(details[0].field, "email");
                assert_eq!(details[1].field, "password");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            ApiError::from(StoreError::DuplicateEmail),
            ApiError::DuplicateEmail
        ));
        assert!(matches!(
            ApiError::from(StoreError::MissingField("task")),
            ApiError::Internal(_)
        ));
    }
}
