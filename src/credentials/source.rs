//! Secret backends.
//!
//! # Security
//! - Secret values are returned to the caller only; they are never logged
//! - Both backends are read-only

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client as SecretsClient;

use crate::credentials::types::{CredentialError, CredentialResult};

/// A keyed, read-only store of secret documents.
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Fetch the raw secret document for `secret_id`.
    async fn fetch(&self, secret_id: &str) -> CredentialResult<String>;
}

/// AWS Secrets Manager backend scoped to one region.
#[derive(Debug, Clone)]
pub struct SecretsManagerSource {
    client: SecretsClient,
    region: String,
}

impl SecretsManagerSource {
    /// Create a source using the default AWS credential chain for `region`.
    pub async fn new(region: &str) -> Self {
        let sdk_config = aws_config::from_env()
            .region(aws_sdk_secretsmanager::config::Region::new(region.to_string()))
            .load()
            .await;
        Self::from_client(SecretsClient::new(&sdk_config), region)
    }

    pub fn from_client(client: SecretsClient, region: &str) -> Self {
        Self {
            client,
            region: region.to_string(),
        }
    }
}

#[async_trait]
impl SecretSource for SecretsManagerSource {
    async fn fetch(&self, secret_id: &str) -> CredentialResult<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                CredentialError::Unavailable(format!(
                    "GetSecretValue for '{}' in {} failed: {}",
                    secret_id,
                    self.region,
                    aws_sdk_secretsmanager::error::DisplayErrorContext(&e)
                ))
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| {
                CredentialError::Malformed(format!("secret '{}' has no SecretString", secret_id))
            })
    }
}

/// Reads the secret document from an environment variable.
///
/// The secret identifier is ignored; the variable name is fixed at construction.
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    var: String,
}

impl EnvSecretSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

#[async_trait]
impl SecretSource for EnvSecretSource {
    async fn fetch(&self, secret_id: &str) -> CredentialResult<String> {
        std::env::var(&self.var).map_err(|_| {
            CredentialError::Unavailable(format!(
                "environment variable {} not set (secret '{}')",
                self.var, secret_id
            ))
        })
    }
}
