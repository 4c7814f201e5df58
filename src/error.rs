use thiserror::Error;

use crate::dto::RelayKey;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("push payload is not a JSON object")]
    NotAnObject,
    #[error("push payload has no known keys (got: {0})")]
    Unrecognized(String),
    #[error("malformed push payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("relay {0} is already configured")]
    DuplicateRelay(RelayKey),
    #[error("host settings have no `{0}` section")]
    MissingSection(String),
    #[error("malformed plugin settings: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "ui")]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] gloo_net::Error),
    #[error("cannot encode request body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("backend answered {status} {text}")]
    Status { status: u16, text: String },
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
