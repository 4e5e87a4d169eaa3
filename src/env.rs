/// Seams to the host browser, implemented by `chrome::ChromeEnv` in the extension
/// and by `testing::FakeEnv` in unit tests
use crate::bridge::PageBridge;
use crate::context::TabId;
use crate::cookies::Cookie;
use crate::error::Result;
use crate::tab_data::{ModalObject, TabInfo};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[allow(async_fn_in_trait)]
pub trait TabsApi {
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo>;
    async fn set_title(&self, tab_id: TabId, title: &str) -> Result<()>;
    async fn set_favicon(&self, tab_id: TabId, data_url: &str) -> Result<()>;
    /// Ask the tab's page observer which in-place object is open, if any
    async fn query_modal(&self, tab_id: TabId) -> Option<ModalObject>;
    async fn open_tab(&self, url: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageArea {
    /// Cleared when the browser session ends
    Session,
    /// Extension-local, survives restarts
    Local,
}

#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    async fn load(&self, area: StorageArea, key: &str) -> Result<Option<Value>>;
    async fn store(&self, area: StorageArea, key: &str, value: Value) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait CookieJar {
    /// Every cookie whose domain is `domain` or one of its subdomains
    async fn list_cookies(&self, domain: &str) -> Result<Vec<Cookie>>;
    async fn remove_cookie(&self, url: &str, name: &str, store_id: Option<&str>) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait ClipboardApi {
    async fn write_text(&self, text: &str) -> Result<()>;
}

#[allow(async_fn_in_trait)]
pub trait Runtime {
    async fn sleep(&self, ms: u32);
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    /// Milliseconds since the epoch
    fn now(&self) -> f64;
}

/// Everything the worker needs from its surroundings
pub trait HostEnv: PageBridge + TabsApi + KeyValueStore + CookieJar + ClipboardApi + Runtime + 'static {}

impl<T> HostEnv for T where T: PageBridge + TabsApi + KeyValueStore + CookieJar + ClipboardApi + Runtime + 'static {}
