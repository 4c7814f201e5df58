use crate::dto::*;

use super::middleware::dispatch;
use super::notices::NoticeMsg;
use super::relays::RelayMsg;
use super::settings::SettingsStore;
use super::settings::SettingsMsg;

/// A message addressed to one of the stores, or straight to the backend.
#[derive(Clone, Debug, PartialEq)]
pub enum AppMsg {
    Relay(RelayMsg),
    Settings(SettingsMsg),
    Notice(NoticeMsg),
    Request(ApiRequest),
}

impl AppMsg {
    pub fn invoke(self) {
        match self {
            Self::Relay(msg) => dispatch::invoke(msg),
            Self::Settings(msg) => dispatch::invoke(msg),
            Self::Notice(msg) => dispatch::invoke(msg),
            Self::Request(request) => dispatch::invoke(request),
        }
    }
}

/// Translates a host callback into the store messages it implies, in order.
pub fn from_event(settings: &SettingsStore, event: HostEvent) -> Vec<AppMsg> {
    match event {
        HostEvent::Startup => vec![AppMsg::Settings(SettingsMsg::Refresh)],
        HostEvent::BeforeBinding => vec![AppMsg::Relay(RelayMsg::Sync(
            settings.settings.arr_relays.clone(),
        ))],
        HostEvent::AfterBinding => vec![AppMsg::Request(PluginCommand::CheckStatus.into())],
        HostEvent::SettingsUpdated => vec![AppMsg::Settings(SettingsMsg::Refresh)],
        HostEvent::PrinterStateChanged { state_id } => {
            vec![AppMsg::Relay(RelayMsg::PrinterState(state_id))]
        }
        HostEvent::PluginMessage(PushEvent::MissingMqtt) => {
            vec![AppMsg::Notice(NoticeMsg::MissingMqtt)]
        }
        HostEvent::PluginMessage(PushEvent::Shutdown(update)) => {
            let mut msgs = vec![AppMsg::Settings(SettingsMsg::PowerOffWhenIdle(
                update.power_off_when_idle,
            ))];

            if update.is_timeout() {
                msgs.push(AppMsg::Notice(NoticeMsg::Countdown(update.remaining())));
            }

            msgs
        }
        HostEvent::PluginMessage(PushEvent::RelayState(update)) => vec![
            AppMsg::Settings(SettingsMsg::RelayState(update.clone())),
            AppMsg::Relay(RelayMsg::StateUpdate(update)),
        ],
    }
}

/// Messages following a completed settings load: mirror first, then re-copy
/// the working relay list.
pub fn from_settings(settings: PluginSettings) -> Vec<AppMsg> {
    let relays = settings.arr_relays.clone();

    vec![
        AppMsg::Settings(SettingsMsg::Loaded(settings)),
        AppMsg::Relay(RelayMsg::Sync(relays)),
    ]
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use alloc::rc::Rc;

    use yewdux::prelude::Reducer;

    use super::super::notices::NoticesStore;
    use super::super::relays::RelaysStore;
    use super::*;

    /// Applies the routed messages to local stores, collecting outgoing requests.
    #[derive(Default)]
    struct Harness {
        relays: Rc<RelaysStore>,
        settings: Rc<SettingsStore>,
        notices: Rc<NoticesStore>,
        sent: Vec<ApiRequest>,
    }

    impl Harness {
        fn host(&mut self, event: HostEvent) {
            for msg in from_event(&self.settings, event) {
                self.apply(msg);
            }
        }

        fn push(&mut self, data: serde_json::Value) {
            let event = PushEvent::from_value(data).unwrap();

            self.host(HostEvent::PluginMessage(event));
        }

        fn apply(&mut self, msg: AppMsg) {
            use super::super::middleware::Effect;

            match msg {
                AppMsg::Relay(msg) => {
                    self.sent.extend(msg.request(&*self.relays));
                    self.relays = msg.apply(self.relays.clone());
                }
                AppMsg::Settings(msg) => {
                    self.sent.extend(msg.request(&*self.settings));
                    self.settings = msg.apply(self.settings.clone());
                }
                AppMsg::Notice(msg) => {
                    self.sent.extend(msg.request(&*self.notices));
                    self.notices = msg.apply(self.notices.clone());
                }
                AppMsg::Request(request) => self.sent.push(request),
            }
        }
    }

    fn settings() -> PluginSettings {
        serde_json::from_value(serde_json::json!({
            "arrRelays": [
                { "topic": "sonoff", "relayN": 1, "currentstate": "ON", "warn": false, "warnPrinting": true },
                { "topic": "sonoff", "relayN": 2, "currentstate": "OFF" }
            ],
            "powerOffWhenIdle": false
        }))
        .unwrap()
    }

    #[test]
    fn binding_copies_settings_and_checks_status() {
        let mut harness = Harness::default();

        harness.host(HostEvent::Startup);
        assert_eq!(harness.sent, vec![ApiRequest::FetchSettings]);

        for msg in from_settings(settings()) {
            harness.apply(msg);
        }

        harness.host(HostEvent::BeforeBinding);
        harness.host(HostEvent::AfterBinding);

        assert_eq!(harness.relays.relays, settings().arr_relays);
        assert_eq!(
            harness.sent.last(),
            Some(&ApiRequest::Command(PluginCommand::CheckStatus))
        );
    }

    #[test]
    fn settings_updated_refreshes_before_copying() {
        let mut harness = Harness::default();

        harness.host(HostEvent::SettingsUpdated);

        assert_eq!(harness.sent, vec![ApiRequest::FetchSettings]);
        assert!(harness.relays.relays.is_empty());

        for msg in from_settings(settings()) {
            harness.apply(msg);
        }

        assert!(harness.settings.loaded);
        assert_eq!(harness.relays.relays.len(), 2);
    }

    #[test]
    fn printing_gates_warn_printing_relays() {
        let mut harness = Harness::default();

        for msg in from_settings(settings()) {
            harness.apply(msg);
        }

        harness.host(HostEvent::PrinterStateChanged {
            state_id: "PRINTING".into(),
        });
        harness.apply(AppMsg::Relay(RelayMsg::Click(RelayKey::new("sonoff", Some(1)))));

        assert!(harness.relays.warning);
        assert!(harness.sent.is_empty());
    }

    #[test]
    fn unknown_relay_update_only_clears_processing() {
        let mut harness = Harness::default();

        for msg in from_settings(PluginSettings::default()) {
            harness.apply(msg);
        }

        let mut relays = (*harness.relays).clone();
        relays.processing.insert("sonoff|1".into());
        harness.relays = Rc::new(relays);

        harness.push(serde_json::json!({ "topic": "sonoff", "relayN": 1, "currentstate": "ON" }));

        assert!(harness.settings.settings.arr_relays.is_empty());
        assert!(harness.relays.relays.is_empty());
        assert!(harness.relays.processing.is_empty());
    }

    #[test]
    fn malformed_relay_index_still_clears_processing() {
        let mut harness = Harness::default();

        for msg in from_settings(PluginSettings {
            arr_relays: vec![Relay {
                current_state: RelayState::Off,
                ..Default::default()
            }],
            ..Default::default()
        }) {
            harness.apply(msg);
        }

        harness.apply(AppMsg::Relay(RelayMsg::Click(RelayKey::new("sonoff", None))));
        assert!(harness.relays.is_processing(&RelayKey::new("sonoff", None)));

        harness.push(serde_json::json!({ "topic": "sonoff", "relayN": "abc", "currentstate": "ON" }));

        assert!(harness.relays.processing.is_empty());
        assert_eq!(harness.relays.relays[0].current_state, RelayState::On);
    }

    #[test]
    fn known_relay_update_reaches_both_stores() {
        let mut harness = Harness::default();

        for msg in from_settings(settings()) {
            harness.apply(msg);
        }

        harness.push(serde_json::json!({ "topic": "sonoff", "relayN": "2", "currentstate": "ON" }));

        let key = RelayKey::new("sonoff", Some(2));
        assert_eq!(harness.relays.relay(&key).unwrap().current_state, RelayState::On);
        assert_eq!(
            harness.settings.settings.relay(&key).unwrap().current_state,
            RelayState::On
        );
    }

    #[test]
    fn shutdown_countdown_round_trip() {
        let mut harness = Harness::default();

        harness.push(serde_json::json!({
            "powerOffWhenIdle": true,
            "type": "timeout",
            "timeout_value": 30
        }));

        assert!(harness.settings.settings.power_off_when_idle);
        assert_eq!(
            harness.notices.shutdown.map(|notice| notice.text()),
            Some("Powering off in 30".to_string())
        );

        harness.push(serde_json::json!({
            "powerOffWhenIdle": true,
            "type": "timeout",
            "timeout_value": null
        }));

        assert_eq!(harness.notices.shutdown, None);
    }

    #[test]
    fn preference_updates_without_timeout_leave_the_notice_alone() {
        let mut harness = Harness::default();

        harness.apply(AppMsg::Notice(NoticeMsg::Countdown(Some(12))));
        harness.push(serde_json::json!({ "powerOffWhenIdle": false }));

        assert!(!harness.settings.settings.power_off_when_idle);
        assert!(harness.notices.shutdown.is_some());
    }

    #[test]
    fn missing_mqtt_shows_exactly_one_notice() {
        let mut harness = Harness::default();

        harness.push(serde_json::json!({ "noMQTT": true }));

        assert_eq!(harness.notices.notices.len(), 1);
        assert!(harness.sent.is_empty());
    }
}
