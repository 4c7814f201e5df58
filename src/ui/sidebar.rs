use yew::prelude::*;
use yewdux::prelude::use_store_value;

use crate::dto::Relay;

use super::middleware::dispatch;
use super::relays::RelaysStore;
use super::settings::{SettingsMsg, SettingsStore};

pub fn toggle_shutdown_title(power_off_when_idle: bool) -> &'static str {
    if power_off_when_idle {
        "Disable Automatic Power Off"
    } else {
        "Enable Automatic Power Off"
    }
}

#[function_component(Sidebar)]
pub fn sidebar() -> Html {
    let relays = use_store_value::<RelaysStore>();
    let settings = use_store_value::<SettingsStore>();

    let watched = relays.automatic_shutdown_relays().collect::<Vec<&Relay>>();

    if watched.is_empty() {
        return html! {};
    }

    let power_off_when_idle = settings.settings.power_off_when_idle;
    let ontoggle =
        Callback::from(|_: MouseEvent| dispatch::invoke(SettingsMsg::ToggleAutomaticShutdown));

    html! {
        <div id="sidebar_plugin_tasmota_mqtt" class="accordion-body">
            <ul class="unstyled">
                {
                    for watched.iter().map(|relay| html! {
                        <li>
                            <i class={relay.icon.clone()}/>
                            { format!(" {}", relay.key()) }
                        </li>
                    })
                }
            </ul>
            <button
                class={classes!("btn", "btn-block", power_off_when_idle.then_some("active"))}
                onclick={ontoggle}
            >
                { toggle_shutdown_title(power_off_when_idle) }
            </button>
        </div>
    }
}
