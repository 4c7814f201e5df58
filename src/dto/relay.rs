use core::fmt::{self, Debug, Display};

use serde::*;

pub type RelayIndex = u32;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RelayState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
    #[default]
    #[serde(rename = "UNKNOWN", other)]
    Unknown,
}

impl RelayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// `(topic, relayN)` identity of a relay, rendered as `topic|relayN`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RelayKey {
    pub topic: String,
    pub relay_n: Option<RelayIndex>,
}

impl RelayKey {
    pub fn new(topic: impl Into<String>, relay_n: Option<RelayIndex>) -> Self {
        Self {
            topic: topic.into(),
            relay_n,
        }
    }
}

impl Display for RelayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relay_n {
            Some(relay_n) => write!(f, "{}|{}", self.topic, relay_n),
            None => write!(f, "{}|", self.topic),
        }
    }
}

/// A relay record as persisted in the plugin settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relay {
    pub topic: String,
    #[serde(rename = "relayN", default, with = "relay_index")]
    pub relay_n: Option<RelayIndex>,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(rename = "currentstate", alias = "currentState", default)]
    pub current_state: RelayState,
    #[serde(default)]
    pub warn: bool,
    #[serde(default)]
    pub warn_printing: bool,
    #[serde(default)]
    pub automatic_shutdown_enabled: bool,
    #[serde(default)]
    pub gcode: bool,
    #[serde(default)]
    pub gcode_on_delay: u32,
    #[serde(default)]
    pub gcode_off_delay: u32,
    #[serde(default)]
    pub connect: bool,
    #[serde(default)]
    pub connect_on_delay: u32,
    #[serde(default)]
    pub disconnect: bool,
    #[serde(default)]
    pub disconnect_off_delay: u32,
    #[serde(default)]
    pub sys_cmd_on: bool,
    #[serde(default)]
    pub sys_cmd_run_on: String,
    #[serde(default)]
    pub sys_cmd_on_delay: u32,
    #[serde(default)]
    pub sys_cmd_off: bool,
    #[serde(default)]
    pub sys_cmd_run_off: String,
    #[serde(default)]
    pub sys_cmd_off_delay: u32,
    /// Fields this UI does not know about, kept so that saving does not drop them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_icon() -> String {
    "icon-bolt".into()
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            topic: "sonoff".into(),
            relay_n: None,
            icon: default_icon(),
            current_state: RelayState::Unknown,
            warn: true,
            warn_printing: true,
            automatic_shutdown_enabled: false,
            gcode: false,
            gcode_on_delay: 0,
            gcode_off_delay: 0,
            connect: false,
            connect_on_delay: 15,
            disconnect: false,
            disconnect_off_delay: 0,
            sys_cmd_on: false,
            sys_cmd_run_on: String::new(),
            sys_cmd_on_delay: 0,
            sys_cmd_off: false,
            sys_cmd_run_off: String::new(),
            sys_cmd_off_delay: 0,
            extra: serde_json::Map::new(),
        }
    }
}

impl Relay {
    pub fn key(&self) -> RelayKey {
        RelayKey::new(self.topic.clone(), self.relay_n)
    }

    pub fn is(&self, key: &RelayKey) -> bool {
        self.topic == key.topic && self.relay_n == key.relay_n
    }

    /// Whether switching this relay off needs an explicit confirmation.
    pub fn needs_confirmation(&self, printing: bool) -> bool {
        self.current_state == RelayState::On && (self.warn || (self.warn_printing && printing))
    }
}

/// `relayN` is written by several plugin revisions as a number, a numeric
/// string or an empty string.
pub mod relay_index {
    use serde::de::Error;
    use serde::*;

    use super::RelayIndex;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(RelayIndex),
        Text(String),
    }

    pub fn serialize<S>(value: &Option<RelayIndex>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(index) => serializer.serialize_u32(*index),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RelayIndex>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Number(index)) => Ok(Some(index)),
            Some(Raw::Text(text)) => {
                let text = text.trim();

                if text.is_empty() {
                    Ok(None)
                } else {
                    text.parse()
                        .map(Some)
                        .map_err(|_| D::Error::custom(format!("invalid relayN: {text}")))
                }
            }
        }
    }

    /// For push events, where a malformed index must not drop the whole update.
    pub mod lenient {
        use log::warn;
        use serde::*;
        use serde_json::Value;

        use super::super::RelayIndex;

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<RelayIndex>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<Value>::deserialize(deserializer)?;

            let index = match &value {
                None | Some(Value::Null) => None,
                Some(Value::Number(number)) => number
                    .as_u64()
                    .or_else(|| {
                        number
                            .as_f64()
                            .filter(|n| n.fract() == 0.0 && *n >= 0.0)
                            .map(|n| n as u64)
                    })
                    .and_then(|n| RelayIndex::try_from(n).ok()),
                Some(Value::String(text)) => text.trim().parse().ok(),
                Some(_) => None,
            };

            if index.is_none() {
                if let Some(value) = value.filter(|value| !matches!(value, Value::Null) && value != "") {
                    warn!("Ignoring malformed relayN {}", value);
                }
            }

            Ok(index)
        }
    }
}
