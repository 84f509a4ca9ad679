use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::ConfigError;

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Which of the two credential sets the process runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirebaseEnvironment {
    Production,
    Development,
}

impl FromStr for FirebaseEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(FirebaseEnvironment::Production),
            "development" | "dev" => Ok(FirebaseEnvironment::Development),
            _ => Err(ConfigError::UnknownEnvironment {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for FirebaseEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirebaseEnvironment::Production => write!(f, "production"),
            FirebaseEnvironment::Development => write!(f, "development"),
        }
    }
}

/// A Google service account key as downloaded from the Firebase console.
///
/// The raw JSON is kept next to the parsed fields so the storage client
/// can be handed the exact document it expects.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub account_type: String,
    pub project_id: String,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    pub token_uri: Option<String>,
    #[serde(skip)]
    raw_json: String,
}

impl ServiceAccountKey {
    /// Decodes a base64 encoded key read from the variable `var_name`.
    pub fn from_base64(var_name: &str, encoded: &str) -> Result<Self, ConfigError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|source| ConfigError::InvalidBase64 {
                name: var_name.to_owned(),
                source,
            })?;

        let json = String::from_utf8(bytes).map_err(|_| ConfigError::InvalidUtf8 {
            name: var_name.to_owned(),
        })?;

        let mut key: ServiceAccountKey =
            serde_json::from_str(&json).map_err(|source| ConfigError::InvalidJson {
                name: var_name.to_owned(),
                source,
            })?;

        key.validate(var_name)?;
        key.raw_json = json;
        Ok(key)
    }

    fn validate(&self, var_name: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidCredential {
            name: var_name.to_owned(),
            message: message.to_owned(),
        };

        if self.account_type != SERVICE_ACCOUNT_TYPE {
            return Err(invalid(&format!(
                "expected type '{}', found '{}'",
                SERVICE_ACCOUNT_TYPE, self.account_type
            )));
        }
        if self.project_id.trim().is_empty() {
            return Err(invalid("project_id is empty"));
        }
        if self.client_email.trim().is_empty() {
            return Err(invalid("client_email is empty"));
        }
        if self.private_key.trim().is_empty() {
            return Err(invalid("private_key is empty"));
        }
        Ok(())
    }

    pub fn raw_json(&self) -> &str {
        &self.raw_json
    }

    /// The bucket Firebase creates for every project.
    pub fn default_bucket_name(&self) -> String {
        format!("{}.appspot.com", self.project_id)
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Both credentials, decoded at startup.
#[derive(Clone, Debug)]
pub struct CredentialSet {
    pub production: ServiceAccountKey,
    pub development: ServiceAccountKey,
}

impl CredentialSet {
    pub fn select(&self, environment: FirebaseEnvironment) -> &ServiceAccountKey {
        match environment {
            FirebaseEnvironment::Production => &self.production,
            FirebaseEnvironment::Development => &self.development,
        }
    }
}
