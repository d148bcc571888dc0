//! Session login and token checks for the ingest API.
//!
//! A single API user logs in with email and password. The password is checked
//! against a bcrypt hash from the credential map, and the caller gets an HS256
//! token both in the body and as the session cookie. The same token is later
//! forwarded to Sirius as the bearer token.

pub mod middleware;
pub mod secrets;

pub use middleware::{require_session, session_token, BearerToken};
pub use secrets::{EnvSecretSource, SecretSource, StaticSecretSource};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use scanning_protocol::defaults::SESSION_COOKIE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// How long a fetched signing secret is reused.
const SECRET_TTL: Duration = Duration::from_secs(10 * 60);

/// Prefix SSM puts on SecureString values read through the KMS alias.
const SSM_KMS_PREFIX: &str = "kms:alias/aws/ssm:";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(String),

    #[error("email and password are required")]
    MissingCredentials,

    #[error("unknown user")]
    UnknownUser,

    #[error("invalid password")]
    InvalidPassword,

    #[error("failed to check password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password check did not complete: {0}")]
    HashTask(String),

    #[error("secret {name} is unavailable: {message}")]
    Secret { name: String, message: String },

    #[error("credential map is invalid: {0}")]
    Credentials(String),

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub user: LoginUser,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub authentication_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "session-data")]
    pub session_data: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub api_username: String,
    pub expiration: Duration,
    /// Adds `Secure` to the session cookie.
    pub secure_cookie: bool,
}

struct CachedSecret {
    value: String,
    fetched: Instant,
}

pub struct Authenticator {
    secrets: Arc<dyn SecretSource>,
    settings: AuthSettings,
    signing_secret: RwLock<Option<CachedSecret>>,
}

impl Authenticator {
    pub fn new(secrets: Arc<dyn SecretSource>, settings: AuthSettings) -> Self {
        Self {
            secrets,
            settings,
            signing_secret: RwLock::new(None),
        }
    }

    /// Check a `{"user": {"email", "password"}}` body and issue a token.
    pub async fn login(&self, body: &[u8]) -> Result<Session, AuthError> {
        let request: LoginRequest =
            serde_json::from_slice(body).map_err(|e| AuthError::InvalidPayload(e.to_string()))?;
        let LoginUser { email, password } = request.user;
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if email != self.settings.api_username {
            return Err(AuthError::UnknownUser);
        }

        let mut credentials = self.credentials().await?;
        let hash = credentials.remove(&email).ok_or(AuthError::UnknownUser)?;
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::HashTask(e.to_string()))??;
        if !matched {
            return Err(AuthError::InvalidPassword);
        }

        let (token, expires_at) = self.issue_token(Utc::now()).await?;
        debug!(email, %expires_at, "Issued session token");
        Ok(Session {
            email,
            token,
            expires_at,
        })
    }

    pub async fn issue_token(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let iat = now.timestamp();
        let exp = iat.saturating_add(self.settings.expiration.as_secs() as i64);
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::InvalidToken(format!("expiry {} is out of range", exp)))?;

        let claims = Claims {
            session_data: self.settings.api_username.clone(),
            iat,
            exp,
        };
        let secret = self.signing_secret().await?;
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(AuthError::Sign)?;
        Ok((token, expires_at))
    }

    /// Signature, `exp` and a non-empty `session-data` claim.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let secret = self.signing_secret().await?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if data.claims.session_data.is_empty() {
            return Err(AuthError::InvalidToken("missing session-data claim".to_string()));
        }
        Ok(data.claims)
    }

    pub fn session_cookie(&self, session: &Session) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Expires={}; HttpOnly; SameSite=Strict",
            SESSION_COOKIE_NAME,
            session.token,
            session.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
        );
        if self.settings.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    async fn signing_secret(&self) -> Result<String, AuthError> {
        if let Some(cached) = self.signing_secret.read().await.as_ref() {
            if cached.fetched.elapsed() < SECRET_TTL {
                return Ok(cached.value.clone());
            }
        }
        let value = self.secrets.jwt_secret().await?;
        *self.signing_secret.write().await = Some(CachedSecret {
            value: value.clone(),
            fetched: Instant::now(),
        });
        Ok(value)
    }

    async fn credentials(&self) -> Result<HashMap<String, String>, AuthError> {
        parse_credentials(&self.secrets.credentials().await?)
    }
}

/// JSON object of email to bcrypt hash, optionally behind the SSM KMS prefix.
pub fn parse_credentials(raw: &str) -> Result<HashMap<String, String>, AuthError> {
    let raw = raw.trim();
    let raw = raw.strip_prefix(SSM_KMS_PREFIX).unwrap_or(raw);
    let credentials: HashMap<String, String> =
        serde_json::from_str(raw).map_err(|e| AuthError::Credentials(e.to_string()))?;
    if credentials.is_empty() {
        return Err(AuthError::Credentials("no credentials found".to_string()));
    }
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EMAIL: &str = "api@example.test";

    fn authenticator(secure_cookie: bool) -> Authenticator {
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        let secrets = StaticSecretSource {
            jwt_secret: "test-secret".to_string(),
            credentials: format!(
                "{}{}",
                SSM_KMS_PREFIX,
                serde_json::json!({ EMAIL: hash })
            ),
        };
        Authenticator::new(
            Arc::new(secrets),
            AuthSettings {
                api_username: EMAIL.to_string(),
                expiration: Duration::from_secs(3600),
                secure_cookie,
            },
        )
    }

    fn login_body(email: &str, password: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({"user": {"email": email, "password": password}}))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let auth = authenticator(false);
        let session = auth.login(&login_body(EMAIL, "correct horse")).await.unwrap();
        assert_eq!(session.email, EMAIL);
        let claims = auth.verify(&session.token).await.unwrap();
        assert_eq!(claims.session_data, EMAIL);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let auth = authenticator(false);
        assert!(matches!(
            auth.login(&login_body(EMAIL, "wrong")).await,
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            auth.login(&login_body("someone@example.test", "correct horse")).await,
            Err(AuthError::UnknownUser)
        ));
        assert!(matches!(
            auth.login(&login_body("", "correct horse")).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            auth.login(b"not json").await,
            Err(AuthError::InvalidPayload(_))
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_password_check_yields_to_other_tasks() {
        let auth = authenticator(false);
        let order = std::sync::Mutex::new(Vec::new());
        tokio::join!(
            async {
                auth.login(&login_body(EMAIL, "correct horse")).await.unwrap();
                order.lock().unwrap().push("login");
            },
            async {
                order.lock().unwrap().push("other");
            },
        );
        assert_eq!(*order.lock().unwrap(), vec!["other", "login"]);
    }

    #[tokio::test]
    async fn test_expired_and_foreign_tokens_are_refused() {
        let auth = authenticator(false);
        let issued = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let (expired, _) = auth.issue_token(issued).await.unwrap();
        assert!(matches!(auth.verify(&expired).await, Err(AuthError::InvalidToken(_))));

        let foreign = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                session_data: EMAIL.to_string(),
                iat: Utc::now().timestamp(),
                exp: Utc::now().timestamp() + 60,
            },
            &EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();
        assert!(matches!(auth.verify(&foreign).await, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let session = Session {
            email: EMAIL.to_string(),
            token: "abc".to_string(),
            expires_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        };
        assert_eq!(
            authenticator(false).session_cookie(&session),
            "membrane=abc; Path=/; Expires=Sat, 01 Jun 2024 10:00:00 GMT; HttpOnly; SameSite=Strict"
        );
        assert!(authenticator(true).session_cookie(&session).ends_with("; Secure"));
    }

    #[test]
    fn test_parse_credentials() {
        let parsed = parse_credentials(r#"{"a@b.test": "$2b$04$hash"}"#).unwrap();
        assert_eq!(parsed["a@b.test"], "$2b$04$hash");
        assert!(matches!(parse_credentials("{}"), Err(AuthError::Credentials(_))));
        assert!(matches!(parse_credentials("nope"), Err(AuthError::Credentials(_))));
    }
}
