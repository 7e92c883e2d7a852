/// To-do endpoints
///
/// # Endpoints
///
/// - `POST /addTodo` - Create a to-do item owned by the caller

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use todo_shared::{
    auth::middleware::AuthContext,
    models::todo::{CreateTodo, Todo},
};
use uuid::Uuid;

/// Add-todo request
///
/// Fields are taken as raw JSON. Strings pass through, numbers and booleans
/// are written as text, and anything else counts as absent. The store rejects
/// absent or empty values.
#[derive(Debug, Default, Deserialize)]
pub struct AddTodoRequest {
    #[serde(default)]
    pub task: Option<Value>,

    #[serde(default, rename = "taskDescription")]
    pub task_description: Option<Value>,
}

impl AddTodoRequest {
    /// Resolves the request body
    ///
    /// Only a syntax error in a JSON body is a client error. A body without
    /// a JSON content type, or one that is not an object, yields no fields.
    pub fn from_body(body: Result<Json<Self>, JsonRejection>) -> ApiResult<Self> {
        match body {
            Ok(Json(req)) => Ok(req),
            Err(rejection @ JsonRejection::JsonSyntaxError(_)) => Err(ApiError::from(rejection)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Unusable to-do body, no fields read");
                Ok(Self::default())
            }
        }
    }

    /// Builds store input owned by `user_id`
    pub fn into_create(self, user_id: Uuid) -> CreateTodo {
        CreateTodo {
            task: field_text(self.task),
            task_description: field_text(self.task_description),
            user_id: Some(user_id),
        }
    }
}

fn field_text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Create a to-do item for the authenticated user
///
/// # Endpoint
///
/// ```text
/// POST /addTodo
/// x-auth-token: eyJ...
/// Content-Type: application/json
///
/// {
///   "task": "Buy milk",
///   "taskDescription": "2%"
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "id": "uuid",
///   "task": "Buy milk",
///   "taskDescription": "2%",
///   "userId": "uuid",
///   "createdAt": "2025-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Body is syntactically invalid JSON
/// - `401 Unauthorized`: Missing or invalid token (from middleware)
/// - `500 Internal Server Error`: Missing field, unknown owner or persistence failure
pub async fn add_todo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<AddTodoRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Todo>)> {
    let req = AddTodoRequest::from_body(body)?;

    if state.users.find_user_by_id(auth.user_id).await?.is_none() {
        return Err(ApiError::Internal(format!(
            "Token names unknown user {}",
            auth.user_id
        )));
    }

    let todo = state.todos.create_todo(req.into_create(auth.user_id)).await?;

    tracing::info!(todo_id = %todo.id, user_id = %auth.user_id, "To-do created");

    Ok((StatusCode::CREATED, Json(todo)))
}
