use std::collections::BTreeSet;

extern crate alloc;
use alloc::rc::Rc;

use itertools::Itertools;
use log::debug;

use yew::prelude::*;
use yewdux::prelude::{use_store_value, Reducer, Store};

use crate::dto::*;

use super::middleware::{dispatch, Effect};

#[derive(Clone, Debug, PartialEq)]
pub enum RelayMsg {
    /// Replaces the working list with a fresh copy of the settings' relays.
    Sync(Vec<Relay>),
    Click(RelayKey),
    Confirm,
    Dismiss,
    Cancel(RelayKey),
    StateUpdate(RelayStateUpdate),
    PrinterState(String),
}

impl Effect<RelaysStore> for RelayMsg {
    fn request(&self, state: &RelaysStore) -> Option<ApiRequest> {
        match self {
            Self::Click(key) => {
                let relay = state.relay(key)?;

                match relay.current_state {
                    RelayState::Unknown => Some(PluginCommand::CheckRelay(key.into()).into()),
                    _ if relay.needs_confirmation(state.printing) => None,
                    _ => Some(PluginCommand::ToggleRelay(key.into()).into()),
                }
            }
            Self::Confirm => state
                .selected
                .as_ref()
                .filter(|_| state.warning)
                .map(|key| PluginCommand::ToggleRelay(key.into()).into()),
            _ => None,
        }
    }
}

impl Reducer<RelaysStore> for RelayMsg {
    fn apply(self, mut store: Rc<RelaysStore>) -> Rc<RelaysStore> {
        let state = Rc::make_mut(&mut store);

        match self {
            Self::Sync(relays) => {
                state.relays = relays;
            }
            Self::Click(key) => {
                state.processing.insert(key.to_string());

                let confirm = state
                    .relay(&key)
                    .map(|relay| relay.needs_confirmation(state.printing))
                    .unwrap_or(false);

                if confirm {
                    state.selected = Some(key);
                    state.warning = true;
                }
            }
            Self::Confirm => {
                state.warning = false;
            }
            Self::Dismiss => {
                state.warning = false;

                if let Some(key) = state.selected.take() {
                    state.processing.remove(&key.to_string());
                }
            }
            Self::Cancel(key) => {
                state.processing.remove(&key.to_string());
            }
            Self::StateUpdate(update) => {
                let key = update.key();

                if let Some(relay) = state.relays.iter_mut().find(|relay| relay.is(&key)) {
                    if relay.current_state != update.current_state {
                        relay.current_state = update.current_state;
                    }
                } else {
                    debug!("State update for unconfigured relay {}", key);
                }

                state.processing.remove(&key.to_string());
            }
            Self::PrinterState(state_id) => {
                state.printing = is_printing(&state_id);
            }
        }

        store
    }
}

#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct RelaysStore {
    pub relays: Vec<Relay>,
    /// `topic|relayN` keys of relays with a command in flight.
    pub processing: BTreeSet<String>,
    pub selected: Option<RelayKey>,
    pub warning: bool,
    pub printing: bool,
}

impl RelaysStore {
    pub fn relay(&self, key: &RelayKey) -> Option<&Relay> {
        self.relays.iter().find(|relay| relay.is(key))
    }

    pub fn is_processing(&self, key: &RelayKey) -> bool {
        self.processing.contains(&key.to_string())
    }

    pub fn automatic_shutdown_relays(&self) -> impl Iterator<Item = &Relay> {
        self.relays
            .iter()
            .filter(|relay| relay.automatic_shutdown_enabled)
    }
}

#[function_component(Relays)]
pub fn relays() -> Html {
    let store = use_store_value::<RelaysStore>();

    let groups = store.relays.iter().group_by(|relay| relay.topic.clone());
    let groups = (&groups)
        .into_iter()
        .map(|(topic, group)| (topic, group.map(Relay::key).collect::<Vec<_>>()))
        .collect::<Vec<_>>();

    html! {
        <ul class="nav tasmota_mqtt">
            {
                for groups.into_iter().map(|(topic, relays)| html! {
                    <RelayGroup topic={topic} relays={relays}/>
                })
            }
        </ul>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct RelayGroupProps {
    pub topic: String,
    pub relays: Vec<RelayKey>,
}

#[function_component(RelayGroup)]
pub fn relay_group(props: &RelayGroupProps) -> Html {
    html! {
        <li class="relay-group" title={props.topic.clone()}>
            {
                for props.relays.iter().map(|relay| html! {
                    <RelayButton relay={relay.clone()}/>
                })
            }
        </li>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct RelayButtonProps {
    pub relay: RelayKey,
}

#[function_component(RelayButton)]
pub fn relay_button(props: &RelayButtonProps) -> Html {
    let store = use_store_value::<RelaysStore>();

    let Some(relay) = store.relay(&props.relay) else {
        return html! {};
    };

    let processing = store.is_processing(&props.relay);

    let onclick = {
        let key = props.relay.clone();
        Callback::from(move |_: MouseEvent| dispatch::invoke(RelayMsg::Click(key.clone())))
    };

    let oncancel = {
        let key = props.relay.clone();
        Callback::from(move |_: MouseEvent| dispatch::invoke(RelayMsg::Cancel(key.clone())))
    };

    let state_class = match relay.current_state {
        RelayState::On => "text-success",
        RelayState::Off => "text-error",
        RelayState::Unknown => "muted",
    };

    html! {
        <span class="relay">
            <a
                class={classes!("btn", "btn-mini", state_class)}
                title={format!("{} ({})", props.relay, relay.current_state.as_str())}
                {onclick}
            >
                <i class={classes!(relay.icon.clone(), processing.then_some("icon-spin"))}/>
            </a>
            if processing {
                <a class="relay-cancel" title="Cancel" onclick={oncancel}>
                    <i class="icon-remove"/>
                </a>
            }
        </span>
    }
}

#[function_component(RelayWarning)]
pub fn relay_warning() -> Html {
    let store = use_store_value::<RelaysStore>();

    let Some(selected) = store.selected.as_ref().filter(|_| store.warning) else {
        return html! {};
    };

    let onconfirm = Callback::from(|_: MouseEvent| dispatch::invoke(RelayMsg::Confirm));
    let ondismiss = Callback::from(|_: MouseEvent| dispatch::invoke(RelayMsg::Dismiss));

    html! {
        <div class="modal tasmota-warning">
            <div class="modal-header">
                <h3>{ "Tasmota-MQTT" }</h3>
            </div>
            <div class="modal-body">
                <p>{ format!("You are about to turn off {}. Are you sure?", selected) }</p>
            </div>
            <div class="modal-footer">
                <button class="btn" onclick={ondismiss}>{ "Cancel" }</button>
                <button class="btn btn-danger" onclick={onconfirm}>{ "Turn off" }</button>
            </div>
        </div>
    }
}
