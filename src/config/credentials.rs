use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the spreadsheet credential comes from.
///
/// ```toml
/// [source.credentials]
/// type = "bearer_token"
/// env = "GOOGLE_ACCESS_TOKEN"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// Publicly readable sheet.
    #[default]
    None,
    /// API key from an environment variable, sent as the `key` query parameter.
    ApiKey { env: String },
    /// OAuth access token from an environment variable.
    BearerToken { env: String },
    /// OAuth access token stored in a file (first non-empty line).
    TokenFile { path: String },
}

/// A resolved secret, ready to attach to a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Anonymous,
    ApiKey(String),
    Bearer(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Anonymous => f.write_str("Anonymous"),
            Credential::ApiKey(_) => f.write_str("ApiKey(***)"),
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
        }
    }
}

impl CredentialsConfig {
    pub fn describe(&self) -> String {
        match self {
            CredentialsConfig::None => "none".to_string(),
            CredentialsConfig::ApiKey { env } => format!("API key from ${}", env),
            CredentialsConfig::BearerToken { env } => format!("access token from ${}", env),
            CredentialsConfig::TokenFile { path } => format!("access token file {}", path),
        }
    }

    /// Reads the secret. Called once per run so rotated tokens are picked up.
    pub fn resolve(&self) -> Result<Credential> {
        match self {
            CredentialsConfig::None => Ok(Credential::Anonymous),
            CredentialsConfig::ApiKey { env } => read_env(env).map(Credential::ApiKey),
            CredentialsConfig::BearerToken { env } => read_env(env).map(Credential::Bearer),
            CredentialsConfig::TokenFile { path } => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    DashboardError::source_access(
                        "credentials",
                        format!("cannot read token file {}: {}", path, e),
                    )
                })?;
                content
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(|token| Credential::Bearer(token.to_string()))
                    .ok_or_else(|| {
                        DashboardError::source_access(
                            "credentials",
                            format!("token file {} is empty", path),
                        )
                    })
            }
        }
    }
}

fn read_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(DashboardError::source_access(
            "credentials",
            format!("environment variable {} is not set", name),
        )),
    }
}

impl Credential {
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credential::Anonymous => request,
            Credential::ApiKey(key) => request.query(&[("key", key)]),
            Credential::Bearer(token) => request.bearer_auth(token),
        }
    }
}

impl Validate for CredentialsConfig {
    fn validate(&self) -> Result<()> {
        match self {
            CredentialsConfig::None => Ok(()),
            CredentialsConfig::ApiKey { env } | CredentialsConfig::BearerToken { env } => {
                validate_non_empty_string("source.credentials.env", env)
            }
            CredentialsConfig::TokenFile { path } => validate_path("source.credentials.path", path),
        }
    }
}
