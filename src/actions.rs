/// Actions issued from UI surfaces and executed against the host
use crate::bridge::{HostRequest, PageBridge, fetch_json};
use crate::codec::{value_text, walk_path};
use crate::context::{ObjectInstance, TabId};
use crate::cookies::{ClearReport, ClearScope, CookieClearMode, RecentInstances};
use crate::env::ClipboardApi;
use crate::error::{Result, ToolkitError};
use crate::object_type::{ObjectType, ObjectTypeId};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;

pub const CURRENT_USER_ENDPOINT: &str = "/api/content/v2/users/me";
pub const ACTIVITY_LOG_PATH: &str = "admin/logging";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    ShareWithSelf,
    Delete,
    CopyId,
    ClearInstanceCookies,
}

/// The object an action targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub type_id: ObjectTypeId,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl From<&ObjectInstance> for ObjectRef {
    fn from(object: &ObjectInstance) -> Self {
        ObjectRef {
            type_id: object.type_id,
            id: object.id.clone(),
            parent_id: object.parent_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionParams {
    /// CopyId: also copy the type's secondary identifier
    pub include_secondary: bool,
    /// ClearInstanceCookies: overrides the configured mode
    pub mode: Option<CookieClearMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub tab_id: TabId,
    /// Defaults to the object detected in the tab
    #[serde(default)]
    pub object_ref: Option<ObjectRef>,
    #[serde(default)]
    pub params: ActionParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionOutcome {
    Shared { type_id: ObjectTypeId, id: String, user_id: String },
    Deleted { type_id: ObjectTypeId, id: String },
    Copied { text: String },
    CookiesCleared { report: ClearReport },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityScope {
    /// Entries for the tab's current object
    Object,
    /// The whole instance log
    Instance,
}

/// Signed-in user per tab, kept for the session
#[derive(Debug, Default)]
pub struct UserCache {
    users: HashMap<TabId, String>,
}

impl UserCache {
    pub fn get(&self, tab_id: TabId) -> Option<String> {
        self.users.get(&tab_id).cloned()
    }

    pub fn insert(&mut self, tab_id: TabId, user_id: String) {
        self.users.insert(tab_id, user_id);
    }

    pub fn forget_tab(&mut self, tab_id: TabId) {
        self.users.remove(&tab_id);
    }
}

pub async fn current_user_id<B: PageBridge + ?Sized>(bridge: &B, tab_id: TabId, users: &RefCell<UserCache>) -> Result<String> {
    if let Some(user_id) = users.borrow().get(tab_id) {
        return Ok(user_id);
    }

    let body = fetch_json(bridge, tab_id, &HostRequest::get(CURRENT_USER_ENDPOINT)).await?;
    let user_id = walk_path(&body, "id")
        .and_then(value_text)
        .ok_or_else(|| ToolkitError::PageError("current user has no id".to_string()))?;
    users.borrow_mut().insert(tab_id, user_id.clone());
    Ok(user_id)
}

pub async fn share_with_self<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    object_type: &ObjectType,
    object: &ObjectRef,
    users: &RefCell<UserCache>,
) -> Result<ActionOutcome> {
    let recipe = object_type
        .share
        .ok_or_else(|| ToolkitError::Unsupported(format!("{} cannot be shared", object_type.display_name)))?;
    validate(object_type, &object.id)?;

    let user_id = current_user_id(bridge, tab_id, users).await?;
    let request = recipe.request(&object.id, &user_id)?;
    fetch_json(bridge, tab_id, &request).await?;

    info!("shared {} {} with user {}", object.type_id, object.id, user_id);
    Ok(ActionOutcome::Shared {
        type_id: object.type_id,
        id: object.id.clone(),
        user_id,
    })
}

/// Delete an object; the UI has already confirmed
pub async fn delete_object<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    object_type: &ObjectType,
    object: &ObjectRef,
) -> Result<ActionOutcome> {
    let recipe = object_type
        .delete
        .ok_or_else(|| ToolkitError::Unsupported(format!("{} cannot be deleted", object_type.display_name)))?;
    validate(object_type, &object.id)?;

    let request = recipe.request(&object.id, object.parent_id.as_deref())?;
    fetch_json(bridge, tab_id, &request).await?;

    info!("deleted {} {}", object.type_id, object.id);
    Ok(ActionOutcome::Deleted {
        type_id: object.type_id,
        id: object.id.clone(),
    })
}

/// Text placed on the clipboard by CopyId
pub fn copy_text(object_type: &ObjectType, id: &str, details: Option<&Value>, include_secondary: bool) -> String {
    let secondary = object_type
        .secondary_id
        .filter(|_| include_secondary)
        .and_then(|secondary| details.and_then(|d| walk_path(d, secondary.path)).and_then(value_text));
    match secondary {
        Some(secondary) => format!("{}\n{}", id, secondary),
        None => id.to_string(),
    }
}

pub async fn copy_id<C: ClipboardApi + ?Sized>(
    clipboard: &C,
    object_type: &ObjectType,
    object: &ObjectRef,
    details: Option<&Value>,
    include_secondary: bool,
) -> Result<ActionOutcome> {
    let text = copy_text(object_type, &object.id, details, include_secondary);
    clipboard.write_text(&text).await?;
    debug!("copied {} {}", object.type_id, object.id);
    Ok(ActionOutcome::Copied { text })
}

/// What started a cookie clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearTrigger {
    /// The user asked from a UI surface
    Manual,
    /// The host answered 431
    HeaderOverflow,
}

/// Which cookies a clear removes, or `None` when the mode ignores the trigger
pub fn clear_scope(mode: CookieClearMode, trigger: ClearTrigger, instance: &str, recent: &RecentInstances) -> Option<ClearScope> {
    match (mode, trigger) {
        (CookieClearMode::Auto, ClearTrigger::HeaderOverflow) => {
            let mut retained = recent.clone();
            retained.touch(instance);
            Some(ClearScope::AllExcept(retained.most_recent(2)))
        }
        (CookieClearMode::PreserveLast2, ClearTrigger::HeaderOverflow) => None,
        (CookieClearMode::All, _) => Some(ClearScope::All),
        (CookieClearMode::Auto, ClearTrigger::Manual) => Some(ClearScope::Instances(vec![instance.to_string()])),
        (CookieClearMode::PreserveLast2, ClearTrigger::Manual) => Some(ClearScope::AllExcept(recent.most_recent(2))),
    }
}

/// Activity log on an instance, filtered to `object` for the object scope
pub fn activity_log_url(origin: &str, scope: ActivityScope, object: Option<&ObjectInstance>) -> Result<String> {
    let mut url = url::Url::parse(&format!("{}/{}", origin.trim_end_matches('/'), ACTIVITY_LOG_PATH))
        .map_err(|err| ToolkitError::Unsupported(err.to_string()))?;

    if scope == ActivityScope::Object {
        let object = object.ok_or_else(|| ToolkitError::Unsupported("no object on this page".to_string()))?;
        url.query_pairs_mut()
            .append_pair("objectType", object.type_id.as_str())
            .append_pair("objectId", &object.id);
    }
    Ok(url.to_string())
}

fn validate(object_type: &ObjectType, id: &str) -> Result<()> {
    if object_type.validate(id) {
        Ok(())
    } else {
        Err(ToolkitError::Validation {
            type_name: object_type.display_name.to_string(),
            id: id.to_string(),
        })
    }
}

pub fn outcome_value(outcome: &ActionOutcome) -> Value {
    serde_json::to_value(outcome).unwrap_or(Value::Null)
}
