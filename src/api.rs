use core::cell::Cell;

extern crate alloc;
use alloc::rc::Rc;

use gloo_net::http::{Request, RequestBuilder, Response};
use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::config::PluginConfig;
use crate::dto::*;
use crate::error::ApiError;
use crate::ui::middleware::dispatch;
use crate::ui::state::{from_settings, AppMsg};

/// Sends [`ApiRequest`]s to the host without waiting for them to complete.
///
/// Plugin commands have no meaningful response: their effect comes back later
/// as a push event. Failures are logged and dropped.
pub struct ApiClient {
    config: Rc<PluginConfig>,
    next_id: Cell<RequestId>,
}

impl ApiClient {
    pub fn new(config: Rc<PluginConfig>) -> Self {
        Self {
            config,
            next_id: Cell::new(1),
        }
    }

    pub fn send(&self, request: ApiRequest) {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));

        let config = self.config.clone();

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(err) = process(&config, id, request).await {
                warn!("[{}] {}", id, err);
            }
        });
    }
}

async fn process(config: &PluginConfig, id: RequestId, request: ApiRequest) -> Result<(), ApiError> {
    match request {
        ApiRequest::Command(command) => {
            info!("[{}] {}", id, command.name());

            let body = command_body(config, id, &command)?;
            let response = send(authorize(config, Request::post(&config.command_url())), body).await?;

            debug!("[{}] {} -> {}", id, command.name(), response.text().await?);
        }
        ApiRequest::FetchSettings => {
            let response = check(authorize(config, Request::get(&config.settings_url())).send().await?).await?;
            let settings: HostSettings = response.json().await?;
            let settings = settings.plugin(&config.plugin_id)?;

            debug!("[{}] Loaded {} relay(s)", id, settings.arr_relays.len());

            from_settings(settings).into_iter().for_each(AppMsg::invoke);
        }
        ApiRequest::SaveSettings(settings) => {
            let body = settings_body(&config.plugin_id, &settings)?;

            send(authorize(config, Request::post(&config.settings_url())), body).await?;

            info!("[{}] Settings saved", id);
        }
    }

    Ok(())
}

fn authorize(config: &PluginConfig, builder: RequestBuilder) -> RequestBuilder {
    match config.api_key.as_deref() {
        Some(key) => builder.header("X-Api-Key", key),
        None => builder,
    }
}

async fn send(builder: RequestBuilder, body: String) -> Result<Response, ApiError> {
    let response = builder
        .header("Content-Type", CONTENT_TYPE)
        .body(body)?
        .send()
        .await?;

    check(response).await
}

async fn check(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status: response.status(),
            text: response.text().await.unwrap_or_default(),
        })
    }
}

/// `{command, ...payload}`, plus the request id when correlation is enabled.
pub fn command_body(
    config: &PluginConfig,
    id: RequestId,
    command: &PluginCommand,
) -> Result<String, serde_json::Error> {
    let mut body = serde_json::to_value(command)?;

    if config.correlate_requests {
        if let Value::Object(map) = &mut body {
            map.insert("requestId".into(), json!(id));
        }
    }

    serde_json::to_string(&body)
}

pub fn settings_body(plugin_id: &str, settings: &PluginSettings) -> Result<String, serde_json::Error> {
    serde_json::to_string(&json!({ "plugins": { plugin_id: settings } }))
}
