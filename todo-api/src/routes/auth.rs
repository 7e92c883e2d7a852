/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /signup` - Create an account and get a token
/// - `POST /login` - Exchange credentials for a token
///
/// Every issued token is also recorded on the user as a SHA-256 digest.

use crate::{
    app::AppState,
    error::{validation_details, ApiError, ApiJson, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use todo_shared::{
    auth::jwt::token_digest,
    models::user::{CreateUser, User},
};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Message for any email the format rules reject
const INVALID_EMAIL: &str = "Invalid email format";

/// Response for both signup and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token, valid for 24h
    pub token: String,

    /// Email of the authenticated user
    pub email: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// {
///   "email": "a@x.com",
///   "password": "password123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "email": "a@x.com"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or email already registered
/// - `500 Internal Server Error`: Server error
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<Json<AuthResponse>> {
    check_credentials(&req, &req.email)?;

    if state.users.find_user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = state.hasher.hash_blocking(req.password).await?;

    let user = state
        .users
        .create_user(CreateUser {
            email: req.email,
            password_hash,
        })
        .await?;

    let token = issue_and_record(&state, &user).await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(Json(AuthResponse {
        token,
        email: user.email,
    }))
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "email": "a@x.com",
///   "password": "password123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, unknown email or wrong password
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    check_credentials(&req, &req.email)?;

    let user = state
        .users
        .find_user_by_email(&req.email)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    let valid = state
        .hasher
        .verify_blocking(req.password, user.password_hash.clone())
        .await?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::InvalidPassword);
    }

    let token = issue_and_record(&state, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        token,
        email: user.email,
    }))
}

/// Runs the derived rules, then requires a top-level domain on the email
///
/// `validator` accepts single-label domains such as `a@x`; addresses here
/// must end in a real TLD.
fn check_credentials<R: Validate>(req: &R, email: &str) -> ApiResult<()> {
    let mut details = match req.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => validation_details(&errors),
    };

    if !details.iter().any(|d| d.field == "email") && !has_top_level_domain(email) {
        details.push(ValidationErrorDetail {
            field: "email".to_string(),
            message: INVALID_EMAIL.to_string(),
        });
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(details))
    }
}

/// True when the domain part ends in a label of two or more letters, or a
/// punycode (`xn--`) label
fn has_top_level_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((_, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    let tld = tld.to_lowercase();
    if tld.starts_with("xn--") {
        return tld.len() > 4 && tld.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    }
    tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic)
}

/// Issues a token for `user` and appends its digest to the user's token list
async fn issue_and_record(state: &AppState, user: &User) -> ApiResult<String> {
    let token = state.tokens.issue(user.id)?;

    if !state.users.append_token(user.id, &token_digest(&token)).await? {
        return Err(ApiError::Internal(format!(
            "User {} vanished while recording token",
            user.id
        )));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let ok: SignupRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"password123"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let bad: SignupRequest =
            serde_json::from_str(r#"{"email":"not-an-email","password":"short"}"#).unwrap();
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_top_level_domain_required() {
        assert!(has_top_level_domain("a@x.com"));
        assert!(has_top_level_domain("first.last@mail.example.co.uk"));
        assert!(has_top_level_domain("a@example.xn--p1ai"));

        assert!(!has_top_level_domain("a@x"));
        assert!(!has_top_level_domain("a@x.c"));
        assert!(!has_top_level_domain("a@x.123"));
        assert!(!has_top_level_domain("no-at-sign.com"));
    }

    #[test]
    fn test_check_credentials_rejects_single_label_domain() {
        let req: SignupRequest =
            serde_json::from_str(r#"{"email":"a@x","password":"password123"}"#).unwrap();

        match check_credentials(&req, &req.email) {
            Err(ApiError::Validation(details)) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "email");
                assert_eq!(details[0].message, INVALID_EMAIL);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_check_credentials_reports_email_once() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"nope","password":"short"}"#).unwrap();

        match check_credentials(&req, &req.email) {
            Err(ApiError::Validation(details)) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        let req: LoginRequest = serde_json::from_str("{}").unwrap();
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
