/// Message kinds exchanged between the worker, page observers and UI surfaces
use crate::actions::{ActionRequest, ActivityScope};
use crate::context::{ObjectInstance, TabContext, TabId};
use crate::error::{Result, Toast, ToolkitError};
use crate::observer::Hint;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requests handled by the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Request {
    GetTabContext {
        tab_id: TabId,
    },
    /// `tab_id` is absent when an observer asks for its own tab
    DetectContext {
        #[serde(default)]
        tab_id: Option<TabId>,
        #[serde(default)]
        reason: Option<String>,
        #[serde(default)]
        force: bool,
    },
    ClipboardCopied {
        value: String,
    },
    OpenActivityLog {
        tab_id: TabId,
        scope: ActivityScope,
    },
    Action(ActionRequest),
    ObserverHint {
        #[serde(default)]
        tab_id: Option<TabId>,
        hint: Hint,
    },
    HostResponseObserved {
        tab_id: TabId,
        url: String,
        status: u16,
    },
    PurgeFaviconCache,
    SettingsChanged {
        settings: Settings,
    },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::GetTabContext { .. } => "GET_TAB_CONTEXT",
            Request::DetectContext { .. } => "DETECT_CONTEXT",
            Request::ClipboardCopied { .. } => "CLIPBOARD_COPIED",
            Request::OpenActivityLog { .. } => "OPEN_ACTIVITY_LOG",
            Request::Action(_) => "ACTION",
            Request::ObserverHint { .. } => "OBSERVER_HINT",
            Request::HostResponseObserved { .. } => "HOST_RESPONSE_OBSERVED",
            Request::PurgeFaviconCache => "PURGE_FAVICON_CACHE",
            Request::SettingsChanged { .. } => "SETTINGS_CHANGED",
        }
    }
}

/// Broadcasts from the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum WorkerEvent {
    /// `context` is absent once the tab is gone
    TabContextUpdated {
        tab_id: TabId,
        context: Option<TabContext>,
    },
    ClipboardUpdated {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recognized: Option<ObjectInstance>,
    },
}

/// Structured reply to every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Toast>,
}

impl Reply {
    pub fn success(data: Value) -> Self {
        Reply {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn empty() -> Self {
        Reply {
            ok: true,
            data: None,
            error: None,
        }
    }

    pub fn failure(err: &ToolkitError) -> Self {
        Reply {
            ok: false,
            data: None,
            error: Some(err.to_toast()),
        }
    }

    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result.and_then(|data| serde_json::to_value(data).map_err(ToolkitError::from)) {
            Ok(Value::Null) => Reply::empty(),
            Ok(data) => Reply::success(data),
            Err(err) => Reply::failure(&err),
        }
    }
}
