/// Popup UI: the current tab's instance and object, with admin actions

use crate::actions::{ActionKind, ActionOutcome, ActionParams, ActionRequest, ActivityScope};
use crate::chrome::{from_js, to_js};
use crate::context::{ObjectInstance, TabContext, TabId};
use crate::error::{Result, Severity, Toast, ToolkitError};
use crate::messages::{Reply, Request, WorkerEvent};
use crate::registry::Registry;
use crate::ui::components::{ClipboardPrompt, ContextSummary, ToastAlert};
use log::{debug, warn};
use patternfly_yew::prelude::*;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getActiveTabId() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openUrl(url: &str) -> std::result::Result<(), JsValue>;

    /// Returns a function that removes the listener
    fn onWorkerEvent(callback: &js_sys::Function) -> js_sys::Function;
}

#[derive(Clone, PartialEq)]
enum PopupState {
    Idle,
    Busy(String),
}

/// Actions offered for a context, in display order
pub fn available_actions(context: &TabContext) -> Vec<ActionKind> {
    let mut actions = Vec::new();
    if let Some(object_type) = context.object.as_ref().and_then(|o| Registry::global().get(o.type_id)) {
        actions.push(ActionKind::CopyId);
        if object_type.supports_share_with_self() {
            actions.push(ActionKind::ShareWithSelf);
        }
        if object_type.supports_delete() {
            actions.push(ActionKind::Delete);
        }
    }
    if context.is_host_page() {
        actions.push(ActionKind::ClearInstanceCookies);
    }
    actions
}

pub fn action_label(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::ShareWithSelf => "Share with me",
        ActionKind::Delete => "Delete",
        ActionKind::CopyId => "Copy ID",
        ActionKind::ClearInstanceCookies => "Clear instance cookies",
    }
}

/// Success notice for a finished action
pub fn outcome_toast(outcome: &ActionOutcome) -> Toast {
    match outcome {
        ActionOutcome::Shared { type_id, id, .. } => {
            Toast::new("Shared", format!("{} {} is now shared with you", type_id, id), Severity::Success)
        }
        ActionOutcome::Deleted { type_id, id } => {
            Toast::new("Deleted", format!("{} {} was deleted", type_id, id), Severity::Success)
        }
        ActionOutcome::Copied { text } => Toast::new("Copied", text.replace('\n', " "), Severity::Success),
        ActionOutcome::CookiesCleared { report } => {
            let mut description = format!("Removed {} cookies, kept {}", report.removed, report.retained);
            if report.failed > 0 {
                description.push_str(&format!(", {} could not be removed", report.failed));
            }
            Toast::new("Cookies cleared", description, Severity::Success)
        }
    }
}

fn delete_prompt(context: &TabContext) -> String {
    match &context.object {
        Some(object) => format!("Delete {} {}? This cannot be undone.", object.type_id, object.name().unwrap_or(&object.id)),
        None => "Delete this object? This cannot be undone.".to_string(),
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

async fn exchange(message: &Request) -> Result<Reply> {
    let raw = sendMessage(to_js(message)?)
        .await
        .map_err(|err| ToolkitError::PageError(format!("{:?}", err)))?;
    from_js(raw)
}

/// Send a request to the worker and decode its reply data; failures arrive as toasts
async fn request<T: DeserializeOwned>(message: &Request) -> std::result::Result<Option<T>, Toast> {
    let reply = exchange(message).await.map_err(|err| err.to_toast())?;
    if !reply.ok {
        return Err(reply
            .error
            .unwrap_or_else(|| Toast::new("Error", "Request failed", Severity::Danger)));
    }
    match reply.data {
        Some(data) => serde_json::from_value(data)
            .map(Some)
            .map_err(|err| ToolkitError::from(err).to_toast()),
        None => Ok(None),
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Idle);
    let tab_id = use_state(|| None::<TabId>);
    let context = use_state(|| None::<TabContext>);
    let toast = use_state(|| None::<Toast>);
    let clipboard = use_state(|| None::<ObjectInstance>);
    let current_tab = use_mut_ref(|| None::<TabId>);

    // Load the active tab's context on mount
    {
        let tab_id = tab_id.clone();
        let context = context.clone();
        let toast = toast.clone();
        let current_tab = current_tab.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                let id = match getActiveTabId().await.ok().and_then(|v| v.as_f64()) {
                    Some(id) => id as TabId,
                    None => {
                        toast.set(Some(ToolkitError::NoTabContext.to_toast()));
                        return;
                    }
                };
                *current_tab.borrow_mut() = Some(id);
                tab_id.set(Some(id));
                match request::<TabContext>(&Request::GetTabContext { tab_id: id }).await {
                    Ok(found) => context.set(found),
                    Err(err) => toast.set(Some(err)),
                }
            });
            || ()
        });
    }

    // Follow worker broadcasts while the popup is open
    {
        let context = context.clone();
        let clipboard = clipboard.clone();
        let current_tab = current_tab.clone();
        use_effect_with((), move |_| {
            let listener = Closure::wrap(Box::new(move |raw: JsValue| {
                let event: WorkerEvent = match from_js(raw) {
                    Ok(event) => event,
                    Err(err) => {
                        debug!("ignoring worker event: {}", err);
                        return;
                    }
                };
                match event {
                    WorkerEvent::TabContextUpdated { tab_id, context: update } => {
                        if *current_tab.borrow() == Some(tab_id) {
                            context.set(update);
                        }
                    }
                    WorkerEvent::ClipboardUpdated { recognized, .. } => clipboard.set(recognized),
                }
            }) as Box<dyn Fn(JsValue)>);
            let unsubscribe = onWorkerEvent(listener.as_ref().unchecked_ref());
            move || {
                if let Err(err) = unsubscribe.call0(&JsValue::NULL) {
                    warn!("could not remove worker listener: {:?}", err);
                }
                drop(listener);
            }
        });
    }

    let on_action = {
        let state = state.clone();
        let tab_id = tab_id.clone();
        let context = context.clone();
        let toast = toast.clone();
        move |kind: ActionKind| {
            let state = state.clone();
            let tab_id = tab_id.clone();
            let context = context.clone();
            let toast = toast.clone();
            Callback::from(move |_| {
                let (Some(id), Some(current)) = (*tab_id, (*context).clone()) else {
                    return;
                };
                if kind == ActionKind::Delete && !confirm(&delete_prompt(&current)) {
                    return;
                }
                let state = state.clone();
                let toast = toast.clone();
                state.set(PopupState::Busy(format!("{}...", action_label(kind))));
                spawn_local(async move {
                    let message = Request::Action(ActionRequest {
                        kind,
                        tab_id: id,
                        object_ref: None,
                        params: ActionParams::default(),
                    });
                    match request::<ActionOutcome>(&message).await {
                        Ok(Some(outcome)) => toast.set(Some(outcome_toast(&outcome))),
                        Ok(None) => toast.set(None),
                        Err(err) => toast.set(Some(err)),
                    }
                    state.set(PopupState::Idle);
                });
            })
        }
    };

    let on_activity_log = {
        let tab_id = tab_id.clone();
        let toast = toast.clone();
        move |scope: ActivityScope| {
            let tab_id = tab_id.clone();
            let toast = toast.clone();
            Callback::from(move |_| {
                let Some(id) = *tab_id else {
                    return;
                };
                let toast = toast.clone();
                spawn_local(async move {
                    let message = Request::OpenActivityLog { tab_id: id, scope };
                    if let Err(err) = request::<serde_json::Value>(&message).await {
                        toast.set(Some(err));
                    }
                });
            })
        }
    };

    let on_redetect = {
        let tab_id = tab_id.clone();
        let context = context.clone();
        let toast = toast.clone();
        Callback::from(move |_| {
            let Some(id) = *tab_id else {
                return;
            };
            let context = context.clone();
            let toast = toast.clone();
            spawn_local(async move {
                let message = Request::DetectContext {
                    tab_id: Some(id),
                    reason: Some("popup".to_string()),
                    force: true,
                };
                match request::<TabContext>(&message).await {
                    Ok(found) => context.set(found),
                    Err(err) => toast.set(Some(err)),
                }
            });
        })
    };

    let on_open_clipboard = {
        let toast = toast.clone();
        Callback::from(move |url: String| {
            let toast = toast.clone();
            spawn_local(async move {
                if let Err(err) = openUrl(&url).await {
                    toast.set(Some(ToolkitError::PageError(format!("{:?}", err)).to_toast()));
                }
            });
        })
    };

    let is_busy = !matches!(*state, PopupState::Idle);
    let actions = (*context).as_ref().map(available_actions).unwrap_or_default();
    let has_object = (*context).as_ref().is_some_and(|c| c.object.is_some());
    let on_host = (*context).as_ref().is_some_and(TabContext::is_host_page);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Instance Toolkit"}</h1>

            <ContextSummary context={(*context).clone()} />

            if let PopupState::Busy(msg) = &*state {
                <div class="loading-text-center">
                    <Spinner />
                    <p class="loading-text">{msg}</p>
                </div>
            }

            if let Some(toast) = (*toast).clone() {
                <ToastAlert {toast} />
            }

            <div class="flex-column-gap">
                {for actions.into_iter().map(|kind| {
                    let variant = if kind == ActionKind::Delete { ButtonVariant::Danger } else { ButtonVariant::Secondary };
                    html! {
                        <Button onclick={on_action(kind)} disabled={is_busy} {variant} block={true}>
                            {action_label(kind)}
                        </Button>
                    }
                })}
                if has_object {
                    <Button onclick={on_activity_log(ActivityScope::Object)} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                        {"Activity log for this object"}
                    </Button>
                }
                if on_host {
                    <Button onclick={on_activity_log(ActivityScope::Instance)} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                        {"Instance activity log"}
                    </Button>
                }
                <Button onclick={on_redetect} disabled={is_busy} variant={ButtonVariant::Link} block={true}>
                    {"Detect again"}
                </Button>
            </div>

            if let Some(object) = (*clipboard).clone() {
                <ClipboardPrompt {object} onopen={on_open_clipboard} />
            }

            <p class="footer-popup">
                {concat!("Instance Toolkit v", env!("CARGO_PKG_VERSION"))}
            </p>
        </div>
    }
}
