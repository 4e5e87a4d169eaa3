/// Persistent snapshots: session-scoped tab contexts and local settings
use crate::context::{TabContext, TabId};
use crate::env::{KeyValueStore, StorageArea};
use crate::error::{Result, ToolkitError};
use crate::settings::Settings;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const TAB_CONTEXT_KEY: &str = "tabContextCache";
pub const RECENT_INSTANCES_KEY: &str = "recentInstances";
pub const SETTINGS_KEY: &str = "settings";

/// Serialized tab-context cache, oldest write first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub contexts: Vec<TabContext>,
}

impl SessionSnapshot {
    pub fn new(contexts: Vec<TabContext>) -> Self {
        SessionSnapshot { contexts }
    }

    pub fn context(&self, tab_id: TabId) -> Option<&TabContext> {
        self.contexts.iter().find(|c| c.tab_id == tab_id)
    }

    /// Sequence recorded per tab, so a restarted worker keeps counting up
    pub fn sequences(&self) -> impl Iterator<Item = (TabId, u64)> + '_ {
        self.contexts.iter().map(|c| (c.tab_id, c.sequence))
    }
}

async fn load_json<S: KeyValueStore + ?Sized, T: DeserializeOwned + Default>(store: &S, area: StorageArea, key: &str) -> T {
    let loaded = match store.load(area, key).await {
        Ok(Some(value)) => serde_json::from_value(value).map_err(ToolkitError::from),
        Ok(None) => return T::default(),
        Err(err) => Err(err),
    };
    loaded.unwrap_or_else(|err| {
        warn!("ignoring stored {}: {}", key, err);
        T::default()
    })
}

async fn save_json<S: KeyValueStore + ?Sized, T: Serialize>(store: &S, area: StorageArea, key: &str, value: &T) -> Result<()> {
    store.store(area, key, serde_json::to_value(value)?).await
}

pub async fn load_session<S: KeyValueStore + ?Sized>(store: &S) -> SessionSnapshot {
    load_json(store, StorageArea::Session, TAB_CONTEXT_KEY).await
}

pub async fn save_session<S: KeyValueStore + ?Sized>(store: &S, snapshot: &SessionSnapshot) -> Result<()> {
    save_json(store, StorageArea::Session, TAB_CONTEXT_KEY, snapshot).await
}

/// Most recently active instances, newest first
pub async fn load_recent_instances<S: KeyValueStore + ?Sized>(store: &S) -> Vec<String> {
    load_json(store, StorageArea::Session, RECENT_INSTANCES_KEY).await
}

pub async fn save_recent_instances<S: KeyValueStore + ?Sized>(store: &S, instances: &[String]) -> Result<()> {
    save_json(store, StorageArea::Session, RECENT_INSTANCES_KEY, &instances).await
}

pub async fn load_settings<S: KeyValueStore + ?Sized>(store: &S) -> Settings {
    load_json(store, StorageArea::Local, SETTINGS_KEY).await
}

pub async fn save_settings<S: KeyValueStore + ?Sized>(store: &S, settings: &Settings) -> Result<()> {
    save_json(store, StorageArea::Local, SETTINGS_KEY, settings).await
}
