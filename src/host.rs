//! Entry points called by the host page's JavaScript glue.
//!
//! The host owns the socket and its lifecycle callbacks; it forwards them
//! here as JSON strings.

use std::sync::Once;

extern crate alloc;
use alloc::rc::Rc;

use log::{debug, warn};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::config::PluginConfig;
use crate::dto::{HostEvent, PushEvent};
use crate::error::EventError;
use crate::ui::middleware::dispatch;
use crate::ui::{App, AppProps};

static LOGGER: Once = Once::new();

#[derive(Deserialize)]
struct PrinterStatePayload {
    state_id: String,
}

/// Raw plugin message, filtered by plugin id once the UI knows its configuration.
#[derive(Clone, Debug)]
pub struct PluginMessage {
    pub plugin: String,
    pub data: String,
}

impl PluginMessage {
    /// `None` when the message belongs to another plugin.
    pub fn parse(&self, plugin_id: &str) -> Option<Result<PushEvent, EventError>> {
        (self.plugin == plugin_id).then(|| PushEvent::from_json(&self.data))
    }
}

pub fn init_logger(config: &PluginConfig) {
    let level = config.level().to_level().unwrap_or(log::Level::Info);

    LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::new(level)));
}

/// Renders the UI into the element with the given id, or into `<body>`.
#[wasm_bindgen]
pub fn mount(element_id: Option<String>, config: Option<String>) -> Result<(), JsValue> {
    let config = PluginConfig::from_json(config.as_deref())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    init_logger(&config);

    let props = AppProps {
        config: Rc::new(config),
    };

    let root = element_id.and_then(|id| {
        web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(&id))
    });

    match root {
        Some(root) => {
            yew::Renderer::<App>::with_root_and_props(root, props).render();
        }
        None => {
            yew::Renderer::<App>::with_props(props).render();
        }
    }

    Ok(())
}

#[wasm_bindgen(js_name = onEventSettingsUpdated)]
pub fn on_event_settings_updated() {
    dispatch::invoke(HostEvent::SettingsUpdated);
}

#[wasm_bindgen(js_name = onEventPrinterStateChanged)]
pub fn on_event_printer_state_changed(payload: &str) {
    match serde_json::from_str::<PrinterStatePayload>(payload) {
        Ok(payload) => dispatch::invoke(HostEvent::PrinterStateChanged {
            state_id: payload.state_id,
        }),
        Err(err) => warn!("Ignoring printer state payload: {}", err),
    }
}

#[wasm_bindgen(js_name = onDataUpdaterPluginMessage)]
pub fn on_data_updater_plugin_message(plugin: &str, data: &str) {
    debug!("Plugin message from {}: {}", plugin, data);

    dispatch::invoke(PluginMessage {
        plugin: plugin.into(),
        data: data.into(),
    });
}
