//! Memoizing credential resolver.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::credentials::source::SecretSource;
use crate::credentials::types::{CredentialBundle, CredentialResult};

/// Resolves a named credential bundle once and keeps it for its lifetime.
///
/// A changed secret needs a new resolver; there is no refresh. A failed
/// resolution leaves the cache empty so the next call reads the backend again.
pub struct CredentialResolver {
    source: Arc<dyn SecretSource>,
    secret_id: String,
    cached: OnceCell<CredentialBundle>,
}

impl CredentialResolver {
    pub fn new(source: Arc<dyn SecretSource>, secret_id: impl Into<String>) -> Self {
        Self {
            source,
            secret_id: secret_id.into(),
            cached: OnceCell::new(),
        }
    }

    /// Resolve the bundle, contacting the backend only until the first success.
    pub async fn resolve(&self) -> CredentialResult<&CredentialBundle> {
        self.cached
            .get_or_try_init(|| async {
                let raw = self.source.fetch(&self.secret_id).await.inspect_err(|e| {
                    tracing::error!(
                        secret = %self.secret_id,
                        error = %e,
                        "Error retrieving credentials"
                    );
                })?;
                let bundle = CredentialBundle::from_secret_json(&raw).inspect_err(|e| {
                    tracing::error!(secret = %self.secret_id, error = %e, "Secret rejected");
                })?;
                tracing::info!(
                    secret = %self.secret_id,
                    host = %bundle.host(),
                    "Credentials resolved"
                );
                Ok(bundle)
            })
            .await
    }

    /// Whether a bundle has been cached.
    pub fn is_resolved(&self) -> bool {
        self.cached.initialized()
    }

    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("secret_id", &self.secret_id)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
