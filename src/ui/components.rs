/// Reusable popup components

use crate::context::{ObjectInstance, TabContext};
use crate::error::{Severity, Toast};
use crate::registry::Registry;
use patternfly_yew::prelude::*;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ContextSummaryProps {
    pub context: Option<TabContext>,
}

/// Instance and object shown in the current tab
#[function_component(ContextSummary)]
pub fn context_summary(props: &ContextSummaryProps) -> Html {
    let Some(context) = &props.context else {
        return html! { <p class="summary-muted">{"Detecting..."}</p> };
    };
    let Some(instance) = &context.instance else {
        return html! { <p class="summary-muted">{"This tab is not on an instance."}</p> };
    };

    html! {
        <div class="summary">
            <p class="summary-instance">{instance}</p>
            {match &context.object {
                Some(object) => object_line(object),
                None => html! { <p class="summary-muted">{"No object on this page"}</p> },
            }}
        </div>
    }
}

/// Rendered inline: `ObjectInstance` equality ignores metadata
fn object_line(object: &ObjectInstance) -> Html {
    let type_name = Registry::global()
        .get(object.type_id)
        .map(|t| t.display_name)
        .unwrap_or("Object");

    html! {
        <div class="summary-object">
            <p class="summary-name">{object.name().unwrap_or(object.id.as_str())}</p>
            <p class="summary-detail">{format!("{} {}", type_name, object.id)}</p>
            if object.parent_pending {
                <p class="summary-muted">{"Resolving parent..."}</p>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastAlertProps {
    pub toast: Toast,
}

#[function_component(ToastAlert)]
pub fn toast_alert(props: &ToastAlertProps) -> Html {
    let alert_type = match props.toast.severity {
        Severity::Info => AlertType::Info,
        Severity::Success => AlertType::Success,
        Severity::Warning => AlertType::Warning,
        Severity::Danger => AlertType::Danger,
    };

    html! {
        <div class="message-top-margin">
            <Alert r#type={alert_type} title={props.toast.title.clone()} inline={true}>
                {props.toast.description.clone()}
            </Alert>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ClipboardPromptProps {
    pub object: ObjectInstance,
    pub onopen: Callback<String>,
}

/// Offer to open an object whose id was just copied
#[function_component(ClipboardPrompt)]
pub fn clipboard_prompt(props: &ClipboardPromptProps) -> Html {
    let Some(url) = props.object.url.clone() else {
        return html! {};
    };
    let label = format!("Open {}", props.object.name().unwrap_or(props.object.id.as_str()));
    let onclick = {
        let onopen = props.onopen.clone();
        Callback::from(move |_| onopen.emit(url.clone()))
    };

    html! {
        <div class="clipboard-prompt">
            <Button {onclick} variant={ButtonVariant::Link} block={true}>{label}</Button>
        </div>
    }
}
