extern crate alloc;
use alloc::rc::Rc;

use log::warn;
use web_sys::HtmlInputElement;

use yew::prelude::*;
use yewdux::prelude::{use_store_value, Reducer, Store};

use crate::dto::*;

use super::middleware::{dispatch, Effect};

#[derive(Clone, Debug, PartialEq)]
pub enum SettingsMsg {
    /// Asks the host for the authoritative copy of the settings.
    Refresh,
    Loaded(PluginSettings),
    Save,
    PowerOffWhenIdle(bool),
    ToggleAutomaticShutdown,
    RelayState(RelayStateUpdate),
    AddRelay,
    EditRelay(usize),
    Draft(Relay),
    SaveRelay,
    CloseEditor,
    RemoveRelay(usize),
}

impl Effect<SettingsStore> for SettingsMsg {
    fn request(&self, state: &SettingsStore) -> Option<ApiRequest> {
        match self {
            Self::Refresh => Some(ApiRequest::FetchSettings),
            Self::Save => match state.settings.duplicate() {
                Some(key) => {
                    warn!("Not saving settings, relay {} is configured twice", key);
                    None
                }
                None => Some(ApiRequest::SaveSettings(state.settings.clone())),
            },
            Self::ToggleAutomaticShutdown => Some(
                if state.settings.power_off_when_idle {
                    PluginCommand::DisableAutomaticShutdown
                } else {
                    PluginCommand::EnableAutomaticShutdown
                }
                .into(),
            ),
            Self::RemoveRelay(index) => state
                .settings
                .arr_relays
                .get(*index)
                .map(|relay| PluginCommand::RemoveRelay(relay.into()).into()),
            _ => None,
        }
    }
}

impl Reducer<SettingsStore> for SettingsMsg {
    fn apply(self, mut store: Rc<SettingsStore>) -> Rc<SettingsStore> {
        let state = Rc::make_mut(&mut store);

        match self {
            Self::Refresh | Self::Save | Self::ToggleAutomaticShutdown => (),
            Self::Loaded(settings) => {
                state.settings = settings;
                state.loaded = true;

                let len = state.settings.arr_relays.len();

                if state
                    .editor
                    .as_ref()
                    .and_then(|editor| editor.index)
                    .map(|index| index >= len)
                    .unwrap_or(false)
                {
                    state.editor = None;
                }
            }
            Self::PowerOffWhenIdle(enabled) => {
                state.settings.power_off_when_idle = enabled;
            }
            Self::RelayState(update) => {
                if let Some(relay) = state.settings.relay_mut(&update.key()) {
                    relay.current_state = update.current_state;
                }
            }
            Self::AddRelay => {
                state.editor = Some(RelayEditor::new(None, Relay::default()));
            }
            Self::EditRelay(index) => {
                if let Some(relay) = state.settings.arr_relays.get(index) {
                    state.editor = Some(RelayEditor::new(Some(index), relay.clone()));
                }
            }
            Self::Draft(relay) => {
                if let Some(editor) = state.editor.as_mut() {
                    editor.draft = relay;
                    editor.error = None;
                }
            }
            Self::SaveRelay => {
                if let Some(mut editor) = state.editor.take() {
                    match state.settings.check_unique(editor.index, &editor.draft) {
                        Ok(()) => match editor.index {
                            Some(index) => {
                                if let Some(relay) = state.settings.arr_relays.get_mut(index) {
                                    *relay = editor.draft;
                                }
                            }
                            None => state.settings.arr_relays.push(editor.draft),
                        },
                        Err(err) => {
                            warn!("Not saving relay: {}", err);

                            editor.error = Some(err.to_string());
                            state.editor = Some(editor);
                        }
                    }
                }
            }
            Self::CloseEditor => {
                state.editor = None;
            }
            Self::RemoveRelay(index) => {
                if index < state.settings.arr_relays.len() {
                    state.settings.arr_relays.remove(index);

                    state.editor = state.editor.take().and_then(|mut editor| match editor.index {
                        Some(edited) if edited == index => None,
                        Some(edited) => {
                            if edited > index {
                                editor.index = Some(edited - 1);
                            }

                            Some(editor)
                        }
                        None => Some(editor),
                    });
                }
            }
        }

        store
    }
}

#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct SettingsStore {
    pub settings: PluginSettings,
    pub loaded: bool,
    pub editor: Option<RelayEditor>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelayEditor {
    /// Entry being edited, `None` for a relay that is only added on save.
    pub index: Option<usize>,
    pub draft: Relay,
    pub error: Option<String>,
}

impl RelayEditor {
    fn new(index: Option<usize>, draft: Relay) -> Self {
        Self {
            index,
            draft,
            error: None,
        }
    }
}

#[function_component(SettingsPanel)]
pub fn settings_panel() -> Html {
    let store = use_store_value::<SettingsStore>();

    let onadd = Callback::from(|_: MouseEvent| dispatch::invoke(SettingsMsg::AddRelay));
    let onsave = Callback::from(|_: MouseEvent| dispatch::invoke(SettingsMsg::Save));

    html! {
        <div class="tasmota-settings">
            <table class="table table-condensed">
                <thead>
                    <tr>
                        <th>{ "Topic" }</th>
                        <th>{ "Relay" }</th>
                        <th>{ "State" }</th>
                        <th/>
                    </tr>
                </thead>
                <tbody>
                    {
                        for store.settings.arr_relays.iter().enumerate().map(|(index, relay)| {
                            let onedit = Callback::from(move |_: MouseEvent| dispatch::invoke(SettingsMsg::EditRelay(index)));
                            let onremove = Callback::from(move |_: MouseEvent| dispatch::invoke(SettingsMsg::RemoveRelay(index)));

                            html! {
                                <tr>
                                    <td>{ relay.topic.clone() }</td>
                                    <td>{ relay.relay_n.map(|n| n.to_string()).unwrap_or_default() }</td>
                                    <td>{ relay.current_state.as_str() }</td>
                                    <td>
                                        <button class="btn btn-mini" title="Edit" onclick={onedit}><i class="icon-pencil"/></button>
                                        <button class="btn btn-mini btn-danger" title="Remove" onclick={onremove}><i class="icon-trash"/></button>
                                    </td>
                                </tr>
                            }
                        })
                    }
                </tbody>
            </table>
            <button class="btn" onclick={onadd}><i class="icon-plus"/>{ " Add Relay" }</button>
            <button class="btn btn-primary" onclick={onsave}>{ "Save" }</button>
            <RelayEditorDialog/>
        </div>
    }
}

fn on_check(draft: &Relay, set: fn(&mut Relay, bool)) -> Callback<bool> {
    let draft = draft.clone();

    Callback::from(move |value| {
        let mut relay = draft.clone();
        set(&mut relay, value);
        dispatch::invoke(SettingsMsg::Draft(relay));
    })
}

fn on_text(draft: &Relay, set: fn(&mut Relay, String)) -> Callback<String> {
    let draft = draft.clone();

    Callback::from(move |value| {
        let mut relay = draft.clone();
        set(&mut relay, value);
        dispatch::invoke(SettingsMsg::Draft(relay));
    })
}

fn on_seconds(draft: &Relay, set: fn(&mut Relay, u32)) -> Callback<String> {
    let draft = draft.clone();

    Callback::from(move |value: String| {
        if let Ok(seconds) = value.trim().parse() {
            let mut relay = draft.clone();
            set(&mut relay, seconds);
            dispatch::invoke(SettingsMsg::Draft(relay));
        }
    })
}

#[function_component(RelayEditorDialog)]
pub fn relay_editor_dialog() -> Html {
    let store = use_store_value::<SettingsStore>();

    let Some(editor) = store.editor.as_ref() else {
        return html! {};
    };

    let draft = &editor.draft;

    let onrelayn = {
        let draft = draft.clone();

        Callback::from(move |value: String| {
            let value = value.trim();
            let relay_n = if value.is_empty() {
                None
            } else if let Ok(index) = value.parse() {
                Some(index)
            } else {
                return;
            };

            dispatch::invoke(SettingsMsg::Draft(Relay {
                relay_n,
                ..draft.clone()
            }));
        })
    };

    let onsave = Callback::from(|_: MouseEvent| dispatch::invoke(SettingsMsg::SaveRelay));
    let onclose = Callback::from(|_: MouseEvent| dispatch::invoke(SettingsMsg::CloseEditor));

    html! {
        <div class="modal tasmota-editor">
            <div class="modal-header">
                <h3>{ if editor.index.is_some() { "Edit Relay" } else { "Add Relay" } }</h3>
            </div>
            <div class="modal-body form-horizontal">
                if let Some(error) = editor.error.as_ref() {
                    <div class="alert alert-error">{ error.clone() }</div>
                }
                <TextField label="Topic" value={draft.topic.clone()} onchange={on_text(draft, |relay, value| relay.topic = value)}/>
                <TextField label="Relay #" value={draft.relay_n.map(|n| n.to_string()).unwrap_or_default()} onchange={onrelayn}/>
                <TextField label="Icon" value={draft.icon.clone()} onchange={on_text(draft, |relay, value| relay.icon = value)}/>
                <CheckField label="Warn" checked={draft.warn} onchange={on_check(draft, |relay, value| relay.warn = value)}/>
                <CheckField label="Warn While Printing" checked={draft.warn_printing} onchange={on_check(draft, |relay, value| relay.warn_printing = value)}/>
                <CheckField label="Automatic Power Off" checked={draft.automatic_shutdown_enabled} onchange={on_check(draft, |relay, value| relay.automatic_shutdown_enabled = value)}/>
                <CheckField label="GCODE Trigger" checked={draft.gcode} onchange={on_check(draft, |relay, value| relay.gcode = value)}/>
                if draft.gcode {
                    <>
                        <TextField label="On Delay" value={draft.gcode_on_delay.to_string()} onchange={on_seconds(draft, |relay, value| relay.gcode_on_delay = value)}/>
                        <TextField label="Off Delay" value={draft.gcode_off_delay.to_string()} onchange={on_seconds(draft, |relay, value| relay.gcode_off_delay = value)}/>
                    </>
                }
                <CheckField label="Auto Connect" checked={draft.connect} onchange={on_check(draft, |relay, value| relay.connect = value)}/>
                if draft.connect {
                    <>
                        <TextField label="Connect Delay" value={draft.connect_on_delay.to_string()} onchange={on_seconds(draft, |relay, value| relay.connect_on_delay = value)}/>
                    </>
                }
                <CheckField label="Auto Disconnect" checked={draft.disconnect} onchange={on_check(draft, |relay, value| relay.disconnect = value)}/>
                if draft.disconnect {
                    <>
                        <TextField label="Disconnect Delay" value={draft.disconnect_off_delay.to_string()} onchange={on_seconds(draft, |relay, value| relay.disconnect_off_delay = value)}/>
                    </>
                }
                <CheckField label="Run System Command On" checked={draft.sys_cmd_on} onchange={on_check(draft, |relay, value| relay.sys_cmd_on = value)}/>
                if draft.sys_cmd_on {
                    <>
                        <TextField label="Command" value={draft.sys_cmd_run_on.clone()} onchange={on_text(draft, |relay, value| relay.sys_cmd_run_on = value)}/>
                        <TextField label="Delay" value={draft.sys_cmd_on_delay.to_string()} onchange={on_seconds(draft, |relay, value| relay.sys_cmd_on_delay = value)}/>
                    </>
                }
                <CheckField label="Run System Command Off" checked={draft.sys_cmd_off} onchange={on_check(draft, |relay, value| relay.sys_cmd_off = value)}/>
                if draft.sys_cmd_off {
                    <>
                        <TextField label="Command" value={draft.sys_cmd_run_off.clone()} onchange={on_text(draft, |relay, value| relay.sys_cmd_run_off = value)}/>
                        <TextField label="Delay" value={draft.sys_cmd_off_delay.to_string()} onchange={on_seconds(draft, |relay, value| relay.sys_cmd_off_delay = value)}/>
                    </>
                }
            </div>
            <div class="modal-footer">
                <button class="btn" onclick={onclose}>{ "Close" }</button>
                <button class="btn btn-primary" onclick={onsave}>{ "Save Relay" }</button>
            </div>
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct CheckFieldProps {
    pub label: AttrValue,
    pub checked: bool,
    pub onchange: Callback<bool>,
}

#[function_component(CheckField)]
pub fn check_field(props: &CheckFieldProps) -> Html {
    let onchange = props.onchange.clone();
    let onclick = Callback::from(move |event: MouseEvent| {
        onchange.emit(event.target_unchecked_into::<HtmlInputElement>().checked())
    });

    html! {
        <div class="control-group">
            <label class="checkbox">
                <input type="checkbox" checked={props.checked} {onclick}/>
                { props.label.clone() }
            </label>
        </div>
    }
}

#[derive(Properties, Clone, PartialEq)]
pub struct TextFieldProps {
    pub label: AttrValue,
    pub value: String,
    pub onchange: Callback<String>,
}

#[function_component(TextField)]
pub fn text_field(props: &TextFieldProps) -> Html {
    let onchange = props.onchange.clone();
    let oninput = Callback::from(move |event: InputEvent| {
        onchange.emit(event.target_unchecked_into::<HtmlInputElement>().value())
    });

    html! {
        <div class="control-group">
            <label class="control-label">{ props.label.clone() }</label>
            <div class="controls">
                <input class="input-block-level" type="text" value={props.value.clone()} {oninput}/>
            </div>
        </div>
    }
}
