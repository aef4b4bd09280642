use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const ENV_BACKEND_URL: &str = "DOCQA_BACKEND_URL";
pub const BACKEND_URL_SOURCE_DEFAULT_LOCAL: &str = "default_local";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("backend url must not be empty")]
    EmptyBaseUrl,
    #[error("backend url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
    #[error("identity provider setting `{0}` must not be empty")]
    MissingIdentitySetting(&'static str),
}

/// Web configuration handed to the identity provider SDK.
///
/// Field names follow the provider's JavaScript config object so the value can
/// be serialized straight across the wasm boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProviderConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

impl IdentityProviderConfig {
    pub fn validate(&self) -> Result<(), InputError> {
        if self.api_key.trim().is_empty() {
            return Err(InputError::MissingIdentitySetting("api_key"));
        }
        if self.auth_domain.trim().is_empty() {
            return Err(InputError::MissingIdentitySetting("auth_domain"));
        }
        if self.project_id.trim().is_empty() {
            return Err(InputError::MissingIdentitySetting("project_id"));
        }
        Ok(())
    }
}

pub fn resolve_backend_base_url() -> Result<(String, &'static str), InputError> {
    if let Some(base_url) = env_non_empty(ENV_BACKEND_URL) {
        return normalize_base_url(&base_url).map(|normalized| (normalized, ENV_BACKEND_URL));
    }
    normalize_base_url(DEFAULT_BACKEND_URL)
        .map(|normalized| (normalized, BACKEND_URL_SOURCE_DEFAULT_LOCAL))
}

pub fn normalize_base_url(raw: &str) -> Result<String, InputError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(InputError::EmptyBaseUrl);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(InputError::InvalidBaseUrl);
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(InputError::InvalidBaseUrl);
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(InputError::InvalidBaseUrl);
    }
    Ok(trimmed.to_string())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
