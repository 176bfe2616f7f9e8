use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use jobsync_logging::{jobsync_debug, jobsync_info};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Fields a service-account key file must carry.
pub const REQUIRED_KEY_FIELDS: &[&str] = &[
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
];

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("credentials file {path} could not be read: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("credentials file is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("credentials file is missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("private key is not a valid RSA PEM: {0}")]
    InvalidKey(String),
    #[error("could not sign token request: {0}")]
    Signing(String),
    #[error("token request failed: {0}")]
    Transport(String),
    #[error("token request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A Google service-account key, as downloaded from the cloud console.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("key_type", &self.key_type)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let content = fs::read_to_string(path).map_err(|source| AuthError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, AuthError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        let missing: Vec<&'static str> = REQUIRED_KEY_FIELDS
            .iter()
            .copied()
            .filter(|field| value.get(*field).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(AuthError::MissingFields(missing));
        }
        serde_json::from_value(value).map_err(|err| AuthError::InvalidJson(err.to_string()))
    }

    fn signed_assertion(&self, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SCOPES.join(" "),
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.private_key_id.clone());
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|err| AuthError::InvalidKey(err.to_string()))?;
        jsonwebtoken::encode(&header, &claims, &key).map_err(|err| AuthError::Signing(err.to_string()))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Duration,
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Exchange a signed service-account assertion for a bearer token.
pub async fn request_access_token(
    client: &reqwest::Client,
    key: &ServiceAccountKey,
) -> Result<AccessToken, AuthError> {
    let assertion = key.signed_assertion(chrono::Utc::now().timestamp())?;
    jobsync_debug!("Requesting access token for {}", key.client_email);

    let response = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|err| AuthError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| AuthError::Transport(err.to_string()))?;
    if !status.is_success() {
        let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(parsed) => match parsed.error_description {
                Some(description) => format!("{}: {description}", parsed.error),
                None => parsed.error,
            },
            Err(_) => body,
        };
        return Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: TokenResponse =
        serde_json::from_str(&body).map_err(|err| AuthError::Transport(err.to_string()))?;
    jobsync_info!("Authorized as {}", key.client_email);
    Ok(AccessToken {
        token: parsed.access_token,
        expires_in: Duration::from_secs(parsed.expires_in),
    })
}
