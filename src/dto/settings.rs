use serde::*;

use crate::error::SettingsError;

use super::relay::{Relay, RelayKey};

/// The plugin's section of the host settings (`plugins.<id>`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSettings {
    #[serde(default)]
    pub arr_relays: Vec<Relay>,
    #[serde(default)]
    pub power_off_when_idle: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PluginSettings {
    pub fn relay(&self, key: &RelayKey) -> Option<&Relay> {
        self.arr_relays.iter().find(|relay| relay.is(key))
    }

    pub fn relay_mut(&mut self, key: &RelayKey) -> Option<&mut Relay> {
        self.arr_relays.iter_mut().find(|relay| relay.is(key))
    }

    /// Checks that `relay` could be stored at `index` (appended when `None`)
    /// without clashing with the key of any other entry.
    pub fn check_unique(&self, index: Option<usize>, relay: &Relay) -> Result<(), SettingsError> {
        let key = relay.key();
        let clash = self
            .arr_relays
            .iter()
            .enumerate()
            .any(|(other, existing)| Some(other) != index && existing.key() == key);

        if clash {
            Err(SettingsError::DuplicateRelay(key))
        } else {
            Ok(())
        }
    }

    /// First key used by more than one entry.
    pub fn duplicate(&self) -> Option<RelayKey> {
        self.arr_relays
            .iter()
            .enumerate()
            .find(|(index, relay)| self.arr_relays[..*index].iter().any(|other| other.is(&relay.key())))
            .map(|(_, relay)| relay.key())
    }
}

/// Response shape of the host's settings endpoint; only the plugin section matters.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub plugins: serde_json::Map<String, serde_json::Value>,
}

impl HostSettings {
    pub fn plugin(&self, plugin_id: &str) -> Result<PluginSettings, SettingsError> {
        let section = self
            .plugins
            .get(plugin_id)
            .ok_or_else(|| SettingsError::MissingSection(plugin_id.into()))?;

        Ok(PluginSettings::deserialize(section)?)
    }
}
