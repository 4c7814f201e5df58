extern crate alloc;
use alloc::rc::Rc;

use log::warn;
use yew::prelude::*;
use yewdux::prelude::{use_store, Dispatch as StoreDispatch};

use crate::api::ApiClient;
use crate::config::PluginConfig;
use crate::dto::{ApiRequest, HostEvent};
use crate::host::PluginMessage;

use middleware::*;
use notices::*;
use relays::*;
use settings::*;
use sidebar::*;

pub mod middleware;
pub mod notices;
pub mod relays;
pub mod settings;
pub mod sidebar;
pub mod state;

#[derive(Properties, Clone, PartialEq, Default)]
pub struct AppProps {
    #[prop_or_default]
    pub config: Rc<PluginConfig>,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let (_, relays) = use_store::<RelaysStore>();
    let (_, settings) = use_store::<SettingsStore>();
    let (_, notices) = use_store::<NoticesStore>();

    {
        let config = props.config.clone();

        use_effect_with((), move |_| {
            init_middleware(config, relays, settings, notices);

            dispatch::invoke(HostEvent::Startup);
            dispatch::invoke(HostEvent::BeforeBinding);
            dispatch::invoke(HostEvent::AfterBinding);

            || ()
        });
    }

    html! {
        <>
            <Notices/>
            <RelayWarning/>
            <div id="navbar_plugin_tasmota_mqtt">
                <Relays/>
            </div>
            <div id="sidebar_plugin_tasmota_mqtt_wrapper">
                <Sidebar/>
            </div>
            <div id="settings_plugin_tasmota_mqtt">
                <SettingsPanel/>
            </div>
        </>
    }
}

fn init_middleware(
    config: Rc<PluginConfig>,
    relays: StoreDispatch<RelaysStore>,
    settings: StoreDispatch<SettingsStore>,
    notices: StoreDispatch<NoticesStore>,
) {
    // Dispatch ApiRequest messages => send to backend
    let client = ApiClient::new(config.clone());
    dispatch::register::<ApiRequest, _>(move |request: ApiRequest| client.send(request));

    // Receive raw plugin messages => keep ours, dispatch them as HostEvent messages
    dispatch::register::<PluginMessage, _>(move |message: PluginMessage| {
        match message.parse(&config.plugin_id) {
            Some(Ok(event)) => dispatch::invoke(HostEvent::PluginMessage(event)),
            Some(Err(err)) => warn!("Ignoring message from {}: {}", message.plugin, err),
            None => (),
        }
    });

    // Dispatch HostEvent messages => redispatch as store messages or requests
    {
        let settings = settings.clone();

        dispatch::register::<HostEvent, _>(move |event: HostEvent| {
            for msg in state::from_event(&settings.get(), event) {
                msg.invoke();
            }
        });
    }

    dispatch::register::<RelayMsg, _>(store_dispatch::<RelaysStore, RelayMsg>(relays));
    dispatch::register::<SettingsMsg, _>(store_dispatch::<SettingsStore, SettingsMsg>(settings));
    dispatch::register::<NoticeMsg, _>(store_dispatch::<NoticesStore, NoticeMsg>(notices));
}
