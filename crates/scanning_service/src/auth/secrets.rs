//! Where the signing secret and the credential map come from.

use super::AuthError;
use async_trait::async_trait;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const API_CREDENTIALS_ENV: &str = "API_CREDENTIALS";

#[async_trait]
pub trait SecretSource: Send + Sync {
    /// HS256 signing secret for session tokens.
    async fn jwt_secret(&self) -> Result<String, AuthError>;

    /// Raw credential document: a JSON object of email to bcrypt hash.
    async fn credentials(&self) -> Result<String, AuthError>;
}

/// Reads `JWT_SECRET` and `API_CREDENTIALS` on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretSource;

fn env_secret(name: &str) -> Result<String, AuthError> {
    std::env::var(name).map_err(|e| AuthError::Secret {
        name: name.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    async fn jwt_secret(&self) -> Result<String, AuthError> {
        env_secret(JWT_SECRET_ENV)
    }

    async fn credentials(&self) -> Result<String, AuthError> {
        env_secret(API_CREDENTIALS_ENV)
    }
}

/// Fixed values, for tests and one-off local runs.
#[derive(Debug, Clone)]
pub struct StaticSecretSource {
    pub jwt_secret: String,
    pub credentials: String,
}

#[async_trait]
impl SecretSource for StaticSecretSource {
    async fn jwt_secret(&self) -> Result<String, AuthError> {
        Ok(self.jwt_secret.clone())
    }

    async fn credentials(&self) -> Result<String, AuthError> {
        Ok(self.credentials.clone())
    }
}

#[cfg(feature = "aws")]
pub use aws::AwsSecretSource;

#[cfg(feature = "aws")]
mod aws {
    use super::{AuthError, SecretSource};
    use async_trait::async_trait;
    use aws_config::SdkConfig;
    use aws_sdk_ssm::error::DisplayErrorContext;

    /// Signing secret from Secrets Manager, credentials from SSM Parameter Store.
    pub struct AwsSecretSource {
        secrets: aws_sdk_secretsmanager::Client,
        ssm: aws_sdk_ssm::Client,
        jwt_secret_name: String,
        credentials_name: String,
    }

    impl AwsSecretSource {
        pub fn new(config: &SdkConfig, jwt_secret_name: String, credentials_name: String) -> Self {
            Self {
                secrets: aws_sdk_secretsmanager::Client::new(config),
                ssm: aws_sdk_ssm::Client::new(config),
                jwt_secret_name,
                credentials_name,
            }
        }
    }

    #[async_trait]
    impl SecretSource for AwsSecretSource {
        async fn jwt_secret(&self) -> Result<String, AuthError> {
            let output = self
                .secrets
                .get_secret_value()
                .secret_id(&self.jwt_secret_name)
                .send()
                .await
                .map_err(|e| AuthError::Secret {
                    name: self.jwt_secret_name.clone(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;
            output
                .secret_string()
                .map(str::to_string)
                .ok_or_else(|| AuthError::Secret {
                    name: self.jwt_secret_name.clone(),
                    message: "secret has no string value".to_string(),
                })
        }

        async fn credentials(&self) -> Result<String, AuthError> {
            let output = self
                .ssm
                .get_parameter()
                .name(&self.credentials_name)
                .with_decryption(true)
                .send()
                .await
                .map_err(|e| AuthError::Secret {
                    name: self.credentials_name.clone(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;
            output
                .parameter()
                .and_then(|p| p.value())
                .map(str::to_string)
                .ok_or_else(|| AuthError::Secret {
                    name: self.credentials_name.clone(),
                    message: "parameter has no value".to_string(),
                })
        }
    }
}
