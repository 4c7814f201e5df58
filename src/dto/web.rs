use serde::*;
use serde_json::Value;

use crate::error::EventError;

use super::relay::{relay_index, Relay, RelayIndex, RelayKey, RelayState};
use super::settings::PluginSettings;

pub type RequestId = usize;

pub const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RelayTarget {
    pub topic: String,
    #[serde(rename = "relayN", skip_serializing_if = "Option::is_none")]
    pub relay_n: Option<RelayIndex>,
}

impl From<&Relay> for RelayTarget {
    fn from(relay: &Relay) -> Self {
        Self {
            topic: relay.topic.clone(),
            relay_n: relay.relay_n,
        }
    }
}

impl From<&RelayKey> for RelayTarget {
    fn from(key: &RelayKey) -> Self {
        Self {
            topic: key.topic.clone(),
            relay_n: key.relay_n,
        }
    }
}

/// Commands understood by the backend plugin's simple API endpoint.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum PluginCommand {
    CheckStatus,
    CheckRelay(RelayTarget),
    ToggleRelay(RelayTarget),
    RemoveRelay(RelayTarget),
    EnableAutomaticShutdown,
    DisableAutomaticShutdown,
    AbortAutomaticShutdown,
}

impl PluginCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckStatus => "checkStatus",
            Self::CheckRelay(_) => "checkRelay",
            Self::ToggleRelay(_) => "toggleRelay",
            Self::RemoveRelay(_) => "removeRelay",
            Self::EnableAutomaticShutdown => "enableAutomaticShutdown",
            Self::DisableAutomaticShutdown => "disableAutomaticShutdown",
            Self::AbortAutomaticShutdown => "abortAutomaticShutdown",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ApiRequest {
    Command(PluginCommand),
    FetchSettings,
    SaveSettings(PluginSettings),
}

impl From<PluginCommand> for ApiRequest {
    fn from(command: PluginCommand) -> Self {
        Self::Command(command)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ShutdownUpdate {
    #[serde(rename = "powerOffWhenIdle")]
    pub power_off_when_idle: bool,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub timeout_value: Option<i64>,
}

impl ShutdownUpdate {
    pub fn is_timeout(&self) -> bool {
        self.kind.as_deref() == Some("timeout")
    }

    /// Seconds left before power off, `None` once the countdown is over or aborted.
    pub fn remaining(&self) -> Option<u32> {
        self.timeout_value
            .filter(|value| *value > 0)
            .map(|value| value.min(u32::MAX as i64) as u32)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct RelayStateUpdate {
    pub topic: String,
    #[serde(rename = "relayN", default, deserialize_with = "relay_index::lenient::deserialize")]
    pub relay_n: Option<RelayIndex>,
    #[serde(rename = "currentstate", alias = "currentState", default)]
    pub current_state: RelayState,
}

impl RelayStateUpdate {
    pub fn key(&self) -> RelayKey {
        RelayKey::new(self.topic.clone(), self.relay_n)
    }
}

/// Push messages sent by the backend plugin over the host's data channel.
#[derive(Clone, Debug, PartialEq)]
pub enum PushEvent {
    MissingMqtt,
    Shutdown(ShutdownUpdate),
    RelayState(RelayStateUpdate),
}

impl PushEvent {
    pub fn from_json(data: &str) -> Result<Self, EventError> {
        Self::from_value(serde_json::from_str(data)?)
    }

    /// The payloads carry no tag; the first of `noMQTT`, `powerOffWhenIdle`
    /// and `topic` present decides the kind.
    pub fn from_value(value: Value) -> Result<Self, EventError> {
        let Value::Object(map) = value else {
            return Err(EventError::NotAnObject);
        };

        if map.contains_key("noMQTT") {
            Ok(Self::MissingMqtt)
        } else if map.contains_key("powerOffWhenIdle") {
            Ok(Self::Shutdown(serde_json::from_value(Value::Object(map))?))
        } else if map.contains_key("topic") {
            Ok(Self::RelayState(serde_json::from_value(Value::Object(
                map,
            ))?))
        } else {
            Err(EventError::Unrecognized(
                map.keys().cloned().collect::<Vec<_>>().join(", "),
            ))
        }
    }
}

/// Lifecycle callbacks raised by the host application.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    Startup,
    BeforeBinding,
    AfterBinding,
    SettingsUpdated,
    PrinterStateChanged { state_id: String },
    PluginMessage(PushEvent),
}

pub fn is_printing(state_id: &str) -> bool {
    matches!(state_id, "PRINTING" | "PAUSED")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn commands_serialize_flat() {
        let command = PluginCommand::ToggleRelay(RelayTarget {
            topic: "sonoff".into(),
            relay_n: Some(1),
        });

        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({ "command": "toggleRelay", "topic": "sonoff", "relayN": 1 })
        );

        let command = PluginCommand::CheckRelay(RelayTarget {
            topic: "plug".into(),
            relay_n: None,
        });

        assert_eq!(
            serde_json::to_value(&command).unwrap(),
            json!({ "command": "checkRelay", "topic": "plug" })
        );

        assert_eq!(
            serde_json::to_value(PluginCommand::AbortAutomaticShutdown).unwrap(),
            json!({ "command": PluginCommand::AbortAutomaticShutdown.name() })
        );
    }

    #[test]
    fn push_events_are_told_apart_by_keys() {
        assert_eq!(
            PushEvent::from_json(r#"{"noMQTT": true}"#).unwrap(),
            PushEvent::MissingMqtt
        );

        let event = PushEvent::from_value(json!({
            "powerOffWhenIdle": true,
            "type": "timeout",
            "timeout_value": 30
        }))
        .unwrap();

        match event {
            PushEvent::Shutdown(update) => {
                assert!(update.is_timeout());
                assert_eq!(update.remaining(), Some(30));
            }
            other => panic!("unexpected {other:?}"),
        }

        let event = PushEvent::from_value(json!({
            "topic": "sonoff",
            "relayN": 1,
            "currentstate": "ON"
        }))
        .unwrap();

        assert_eq!(
            event,
            PushEvent::RelayState(RelayStateUpdate {
                topic: "sonoff".into(),
                relay_n: Some(1),
                current_state: RelayState::On,
            })
        );
    }

    #[test]
    fn missing_mqtt_wins_over_other_keys() {
        let event = PushEvent::from_value(json!({ "noMQTT": true, "topic": "sonoff" })).unwrap();

        assert_eq!(event, PushEvent::MissingMqtt);
    }

    #[test]
    fn null_or_expired_timeouts_have_no_remaining_time() {
        for value in [json!(null), json!(0), json!(-5)] {
            let event = PushEvent::from_value(json!({
                "powerOffWhenIdle": true,
                "type": "timeout",
                "timeout_value": value
            }))
            .unwrap();

            let PushEvent::Shutdown(update) = event else {
                panic!("expected a shutdown update");
            };

            assert_eq!(update.remaining(), None);
        }
    }

    #[test]
    fn malformed_relay_index_still_yields_an_update() {
        let parse = |relay_n: serde_json::Value| match PushEvent::from_value(json!({
            "topic": "sonoff",
            "relayN": relay_n,
            "currentstate": "ON"
        })) {
            Ok(PushEvent::RelayState(update)) => update.relay_n,
            other => panic!("not a relay update: {:?}", other),
        };

        assert_eq!(parse(json!("abc")), None);
        assert_eq!(parse(json!(1.5)), None);
        assert_eq!(parse(json!(-1)), None);
        assert_eq!(parse(json!(2.0)), Some(2));
        assert_eq!(parse(json!(" 3 ")), Some(3));
    }

    #[test]
    fn malformed_payloads_are_errors() {
        assert!(matches!(
            PushEvent::from_value(json!(["topic"])),
            Err(EventError::NotAnObject)
        ));
        assert!(matches!(
            PushEvent::from_value(json!({ "hello": 1 })),
            Err(EventError::Unrecognized(keys)) if keys == "hello"
        ));
        assert!(matches!(
            PushEvent::from_json("{"),
            Err(EventError::Json(_))
        ));
        assert!(matches!(
            PushEvent::from_value(json!({ "powerOffWhenIdle": "yes" })),
            Err(EventError::Json(_))
        ));
    }

    #[test]
    fn printing_states() {
        assert!(is_printing("PRINTING"));
        assert!(is_printing("PAUSED"));
        assert!(!is_printing("OPERATIONAL"));
    }
}
