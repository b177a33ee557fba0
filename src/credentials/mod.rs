//! Credential resolution subsystem.
//!
//! # Data Flow
//! ```text
//! secret identifier + region
//!     → source.rs (Secrets Manager or environment)
//!     → types.rs (JSON → CredentialBundle, field checks)
//!     → resolver.rs (memoized for the resolver's lifetime)
//! ```
//!
//! # Security Constraints
//! - Passwords never reach logs or disk
//! - A rejected secret is never cached

pub mod resolver;
pub mod source;
pub mod types;

pub use resolver::CredentialResolver;
pub use source::{EnvSecretSource, SecretSource, SecretsManagerSource};
pub use types::{CredentialBundle, CredentialError, CredentialResult};
