extern crate alloc;
use alloc::rc::Rc;

use yew::prelude::*;
use yewdux::prelude::{use_store_value, Reducer, Store};

use crate::dto::*;

use super::middleware::{dispatch, Effect};

pub const MISSING_MQTT_TITLE: &str = "Tasmota-MQTT Error";
pub const MISSING_MQTT_TEXT: &str =
    "Missing the MQTT plugin. Please install that plugin to make this plugin operational.";
pub const MQTT_PLUGIN_URL: &str = "https://plugins.octoprint.org/plugins/mqtt/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeMsg {
    MissingMqtt,
    /// Remaining seconds of the power-off countdown, `None` once it is over.
    Countdown(Option<u32>),
    AbortShutdown,
    Dismiss(usize),
}

impl Effect<NoticesStore> for NoticeMsg {
    fn request(&self, _state: &NoticesStore) -> Option<ApiRequest> {
        match self {
            Self::AbortShutdown => Some(PluginCommand::AbortAutomaticShutdown.into()),
            _ => None,
        }
    }
}

impl Reducer<NoticesStore> for NoticeMsg {
    fn apply(self, mut store: Rc<NoticesStore>) -> Rc<NoticesStore> {
        let state = Rc::make_mut(&mut store);

        match self {
            Self::MissingMqtt => {
                let id = state.next_id;
                state.next_id += 1;

                state.notices.push(Notice {
                    id,
                    kind: NoticeKind::Error,
                    title: MISSING_MQTT_TITLE.into(),
                    text: MISSING_MQTT_TEXT.into(),
                    link: Some(MQTT_PLUGIN_URL.into()),
                });
            }
            Self::Countdown(remaining) => {
                state.shutdown = remaining.map(|remaining| ShutdownNotice { remaining });
            }
            Self::AbortShutdown => {
                state.shutdown = None;
            }
            Self::Dismiss(id) => {
                state.notices.retain(|notice| notice.id != id);
            }
        }

        store
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Info,
}

/// A notice that stays on screen until the user closes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: usize,
    pub kind: NoticeKind,
    pub title: String,
    pub text: String,
    pub link: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ShutdownNotice {
    pub remaining: u32,
}

impl ShutdownNotice {
    pub fn text(&self) -> String {
        format!("Powering off in {}", self.remaining)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Store)]
pub struct NoticesStore {
    pub notices: Vec<Notice>,
    pub next_id: usize,
    pub shutdown: Option<ShutdownNotice>,
}

#[function_component(Notices)]
pub fn notices() -> Html {
    let store = use_store_value::<NoticesStore>();

    html! {
        <div class="tasmota-notices">
            if let Some(shutdown) = store.shutdown {
                <ShutdownNoticeView remaining={shutdown.remaining}/>
            }
            {
                for store.notices.iter().map(|notice| html! {
                    <NoticeView key={notice.id} notice={notice.clone()}/>
                })
            }
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct NoticeViewProps {
    pub notice: Notice,
}

#[function_component(NoticeView)]
pub fn notice_view(props: &NoticeViewProps) -> Html {
    let notice = &props.notice;

    let onclose = {
        let id = notice.id;
        Callback::from(move |_: MouseEvent| dispatch::invoke(NoticeMsg::Dismiss(id)))
    };

    let class = match notice.kind {
        NoticeKind::Error => "alert-error",
        NoticeKind::Info => "alert-info",
    };

    html! {
        <div class={classes!("alert", class)}>
            <button class="close" onclick={onclose}>{ "×" }</button>
            <h4>{ notice.title.clone() }</h4>
            <p>{ notice.text.clone() }</p>
            if let Some(link) = notice.link.clone() {
                <a href={link.clone()} target="_blank">{ link }</a>
            }
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct ShutdownNoticeProps {
    pub remaining: u32,
}

#[function_component(ShutdownNoticeView)]
pub fn shutdown_notice_view(props: &ShutdownNoticeProps) -> Html {
    let onabort = Callback::from(|_: MouseEvent| dispatch::invoke(NoticeMsg::AbortShutdown));
    let notice = ShutdownNotice {
        remaining: props.remaining,
    };

    html! {
        <div class="alert alert-info tasmota-shutdown">
            <h4>{ "Automatic Power Off" }</h4>
            <p>{ notice.text() }</p>
            <button class="btn btn-block btn-danger" onclick={onabort}>{ "Cancel Power Off" }</button>
        </div>
    }
}
