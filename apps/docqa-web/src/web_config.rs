use docqa_client_core::config::{
    DEFAULT_BACKEND_URL, IdentityProviderConfig, InputError, normalize_base_url,
};
use docqa_client_core::pages::Slot;
use serde::Serialize;
use tracing_subscriber::filter::LevelFilter;

pub(crate) const BUILD_BACKEND_URL: Option<&str> = option_env!("DOCQA_BACKEND_URL");
pub(crate) const BUILD_FIREBASE_API_KEY: Option<&str> = option_env!("DOCQA_FIREBASE_API_KEY");
pub(crate) const BUILD_FIREBASE_AUTH_DOMAIN: Option<&str> =
    option_env!("DOCQA_FIREBASE_AUTH_DOMAIN");
pub(crate) const BUILD_FIREBASE_PROJECT_ID: Option<&str> =
    option_env!("DOCQA_FIREBASE_PROJECT_ID");
pub(crate) const BUILD_FIREBASE_APP_ID: Option<&str> = option_env!("DOCQA_FIREBASE_APP_ID");
pub(crate) const BUILD_LOG_LEVEL: Option<&str> = option_env!("DOCQA_LOG");

pub(crate) const DEFAULT_CONSOLE_LEVEL: LevelFilter = LevelFilter::WARN;

pub(crate) const SIGN_IN_BUTTON_ID: &str = "signInBtn";
pub(crate) const SEND_BUTTON_ID: &str = "sendBtn";
pub(crate) const MANAGE_DOCS_BUTTON_ID: &str = "manageDocsBtn";
pub(crate) const SIGN_OUT_BUTTON_ID: &str = "signOutBtn";
pub(crate) const UPLOAD_BUTTON_ID: &str = "uploadBtn";
pub(crate) const CLEAR_BUTTON_ID: &str = "clearBtn";
pub(crate) const BACK_TO_CHAT_BUTTON_ID: &str = "backToChatBtn";
pub(crate) const FILE_INPUT_ID: &str = "fileInput";

pub(crate) fn slot_element_id(slot: Slot) -> &'static str {
    match slot {
        Slot::UserName => "userName",
        Slot::SignInError => "error",
        Slot::Status => "status",
        Slot::Response => "response",
        Slot::QuestionInput => "questionInput",
        Slot::DocumentList => "docList",
    }
}

pub(crate) fn backend_base_url(raw: Option<&str>) -> Result<String, InputError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_BACKEND_URL);
    normalize_base_url(raw)
}

pub(crate) fn identity_config(
    api_key: Option<&str>,
    auth_domain: Option<&str>,
    project_id: Option<&str>,
    app_id: Option<&str>,
) -> Result<IdentityProviderConfig, InputError> {
    let owned = |value: Option<&str>| value.map(str::trim).unwrap_or_default().to_string();
    let config = IdentityProviderConfig {
        api_key: owned(api_key),
        auth_domain: owned(auth_domain),
        project_id: owned(project_id),
        app_id: app_id
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string),
    };
    config.validate()?;
    Ok(config)
}

/// Runs `attach` on a page's button when the page has it. A missing button is
/// logged and skipped so the rest of the page still wires up.
pub(crate) fn attach_if_present<E, Err>(
    id: &str,
    element: Option<E>,
    attach: impl FnOnce(E) -> Result<(), Err>,
) -> Result<bool, Err> {
    let Some(element) = element else {
        tracing::warn!(element = id, "click target missing; button left unbound");
        return Ok(false);
    };
    attach(element)?;
    Ok(true)
}

/// Console verbosity; an unknown level falls back to the default.
pub(crate) fn console_log_level(raw: Option<&str>) -> LevelFilter {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_CONSOLE_LEVEL)
}

pub(crate) fn build_backend_base_url() -> Result<String, InputError> {
    backend_base_url(BUILD_BACKEND_URL)
}

pub(crate) fn build_identity_config() -> Result<IdentityProviderConfig, InputError> {
    identity_config(
        BUILD_FIREBASE_API_KEY,
        BUILD_FIREBASE_AUTH_DOMAIN,
        BUILD_FIREBASE_PROJECT_ID,
        BUILD_FIREBASE_APP_ID,
    )
}

/// What the bundle was built with, minus the API key.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigDiagnostics {
    pub backend_url: Option<String>,
    pub identity_project_id: Option<String>,
    pub errors: Vec<String>,
}

pub(crate) fn diagnostics(
    backend: Result<String, InputError>,
    identity: Result<IdentityProviderConfig, InputError>,
) -> ConfigDiagnostics {
    let mut errors = Vec::new();
    let backend_url = backend
        .map_err(|error| errors.push(error.to_string()))
        .ok();
    let identity_project_id = identity
        .map(|config| config.project_id)
        .map_err(|error| errors.push(error.to_string()))
        .ok();
    ConfigDiagnostics {
        backend_url,
        identity_project_id,
        errors,
    }
}

pub(crate) fn diagnostics_json() -> String {
    let report = diagnostics(build_backend_base_url(), build_identity_config());
    serde_json::to_string(&report)
        .unwrap_or_else(|_| "{\"errors\":[\"diagnostics serialization failed\"]}".to_string())
}
