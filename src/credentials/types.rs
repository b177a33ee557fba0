//! Credential bundle and error definitions.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while resolving credentials.
///
/// Both variants mean the credential is unavailable; `Malformed` narrows it
/// to a secret that was fetched but could not be used.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Secret backend unreachable or the secret does not exist.
    #[error("credential unavailable: {0}")]
    Unavailable(String),

    /// Secret fetched but missing or carrying an invalid field.
    #[error("credential malformed: {0}")]
    Malformed(String),
}

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Fields needed to open a connection to the transactional store.
///
/// The password is never printed; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    host: String,
    port: u16,
    dbname: String,
    username: String,
    password: String,
}

impl CredentialBundle {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        dbname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            dbname: dbname.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse the JSON secret document.
    ///
    /// `port` may be a number or a numeric string. Unknown fields are ignored.
    pub fn from_secret_json(raw: &str) -> CredentialResult<Self> {
        let doc: RawBundle = serde_json::from_str(raw).map_err(|e| {
            CredentialError::Malformed(format!("secret is not a JSON object: {}", e))
        })?;

        Ok(Self {
            host: required_string(doc.host, "host")?,
            port: required_port(doc.port)?,
            dbname: required_string(doc.dbname, "dbname")?,
            username: required_string(doc.username, "username")?,
            password: required_string(doc.password, "password")?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn dbname(&self) -> &str {
        &self.dbname
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct RawBundle {
    host: Option<Value>,
    port: Option<Value>,
    dbname: Option<Value>,
    username: Option<Value>,
    password: Option<Value>,
}

fn required_string(value: Option<Value>, field: &str) -> CredentialResult<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(Value::String(_)) => Err(malformed(format!("field '{}' is empty", field))),
        Some(_) => Err(malformed(format!("field '{}' must be a string", field))),
        None => Err(malformed(format!("missing field '{}'", field))),
    }
}

fn malformed(message: String) -> CredentialError {
    CredentialError::Malformed(message)
}

fn required_port(value: Option<Value>) -> CredentialResult<u16> {
    let invalid = || CredentialError::Malformed("field 'port' is not a valid port".to_string());
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<u16>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
        None => Err(CredentialError::Malformed("missing field 'port'".to_string())),
    }
}
