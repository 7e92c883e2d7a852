/// Bearer token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying the owning user's id under a
/// `user` claim, mirroring the payload shape clients already decode:
///
/// ```json
/// { "user": { "id": "<uuid>" }, "iss": "todo-api", "iat": 0, "nbf": 0, "exp": 86400 }
/// ```
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: fixed at one day from issuance
/// - **Validation**: signature, structure, issuer, expiration and not-before
/// - **Secret Management**: the secret is handed to [`TokenService::new`] at
///   startup and never read from a global
///
/// Verification is stateless. The token list kept on each user is an audit
/// trail of issued tokens (see [`token_digest`]) and is not consulted here.
///
/// # Example
///
/// ```
/// use todo_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TokenService::new("your-secret-key-at-least-32-bytes", "todo-api");
/// let user_id = Uuid::new_v4();
///
/// let token = service.issue(user_id)?;
/// let claims = service.verify(&token)?;
/// assert_eq!(claims.user_id(), user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Lifetime of every issued token, in seconds (one day)
pub const TOKEN_TTL_SECONDS: i64 = 24 * 60 * 60;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Bad signature, malformed structure or wrong issuer
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// User reference embedded in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUser {
    /// User ID
    pub id: Uuid,
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `iss`: Issuer
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `user`: `{ "id": <uuid> }` of the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user
    pub user: TokenUser,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims expiring one day from now
    pub fn new(user_id: Uuid, issuer: impl Into<String>) -> Self {
        Self::with_expiration(user_id, issuer, Duration::seconds(TOKEN_TTL_SECONDS))
    }

    /// Creates claims with a custom expiration
    ///
    /// A negative duration produces already-expired claims, which is only
    /// useful in tests.
    pub fn with_expiration(user_id: Uuid, issuer: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            user: TokenUser { id: user_id },
            iss: issuer.into(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Gets the user id carried by the token
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Issues and verifies bearer tokens with a process-wide secret
///
/// Read-only after construction.
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service signing with `secret`
    ///
    /// # Arguments
    ///
    /// * `secret` - HMAC secret (should be at least 32 bytes)
    /// * `issuer` - Value written to and required in the `iss` claim
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            issuer,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a one-day token for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if encoding fails
    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, self.issuer.clone()))
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and extracts its claims
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` once `exp` has elapsed
    /// - `JwtError::InvalidToken` for a bad signature, malformed structure,
    ///   wrong issuer or a token used before `nbf`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }
}

/// SHA-256 hex digest of a token, the form in which issued tokens are recorded
///
/// # Example
///
/// ```
/// use todo_shared::auth::jwt::token_digest;
///
/// let digest = token_digest("eyJ...");
/// assert_eq!(digest.len(), 64);
/// ```
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn service() -> TokenService {
        TokenService::new(SECRET, "todo-api")
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "todo-api");

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.iss, "todo-api");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECONDS);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_claims_payload_shape() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "todo-api");

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["user"]["id"], user_id.to_string());
    }

    #[test]
    fn test_issue_and_verify() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id).expect("Should issue token");
        let claims = service.verify(&token).expect("Should verify token");

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.iss, "todo-api");
        let left = claims.time_until_expiration().unwrap();
        assert!(left.num_seconds() > TOKEN_TTL_SECONDS - 60);
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let token = service().issue(Uuid::new_v4()).unwrap();

        let other = TokenService::new("another-secret-key-at-least-32-bytes", "todo-api");
        let result = other.verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_wrong_issuer() {
        let token = TokenService::new(SECRET, "someone-else")
            .issue(Uuid::new_v4())
            .unwrap();

        assert!(matches!(service().verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_expired_token() {
        let service = service();

        // Expired an hour ago, well past the default leeway
        let claims = Claims::with_expiration(Uuid::new_v4(), "todo-api", Duration::seconds(-3600));
        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = service.sign(&claims).unwrap();
        assert!(matches!(service.verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_verify_garbled_token() {
        let service = service();

        assert!(matches!(service.verify("not-a-token"), Err(JwtError::InvalidToken(_))));
        assert!(matches!(service.verify(""), Err(JwtError::InvalidToken(_))));

        let mut token = service.issue(Uuid::new_v4()).unwrap();
        token.push('x');
        assert!(matches!(service.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_token_digest() {
        let a = token_digest("token-a");
        let b = token_digest("token-b");

        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(a, token_digest("token-a"));
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
