use log::LevelFilter;
use serde::*;

use crate::error::ConfigError;

/// Runtime configuration handed over by the host page when the UI is mounted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginConfig {
    /// Base of the host REST API, with a trailing slash.
    pub api_base_url: String,
    pub plugin_id: String,
    /// Sent as `X-Api-Key`; the session cookie is used when absent.
    pub api_key: Option<String>,
    /// Adds a `requestId` to every command body.
    pub correlate_requests: bool,
    pub log_level: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            api_base_url: "/api/".into(),
            plugin_id: "tasmota_mqtt".into(),
            api_key: None,
            correlate_requests: false,
            log_level: "info".into(),
        }
    }
}

impl PluginConfig {
    pub fn from_json(json: Option<&str>) -> Result<Self, ConfigError> {
        match json.map(str::trim).filter(|json| !json.is_empty()) {
            Some(json) => Ok(serde_json::from_str(json)?),
            None => Ok(Self::default()),
        }
    }

    pub fn command_url(&self) -> String {
        format!("{}plugin/{}", self.base(), self.plugin_id)
    }

    pub fn settings_url(&self) -> String {
        format!("{}settings", self.base())
    }

    pub fn level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    fn base(&self) -> String {
        if self.api_base_url.ends_with('/') {
            self.api_base_url.clone()
        } else {
            format!("{}/", self.api_base_url)
        }
    }
}
