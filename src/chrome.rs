/// `HostEnv` backed by the `chrome.*` APIs through `worker.js`
use crate::bridge::{PageBridge, PageCall, is_injectable};
use crate::context::TabId;
use crate::cookies::Cookie;
use crate::env::{ClipboardApi, CookieJar, KeyValueStore, Runtime, StorageArea, TabsApi};
use crate::error::{Result, ToolkitError};
use crate::messages::WorkerEvent;
use crate::tab_data::{ModalObject, TabInfo};
use futures::future::LocalBoxFuture;
use log::{debug, error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

#[wasm_bindgen(module = "/worker.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn runInPage(tab_id: i32, call: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setTabTitle(tab_id: i32, title: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn setTabFavicon(tab_id: i32, data_url: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveModal(tab_id: i32) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(area: &str, key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(area: &str, key: &str, value: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn listCookies(domain: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeCookie(url: &str, name: &str, store_id: Option<String>) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn writeClipboard(text: &str) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn delay(ms: u32) -> std::result::Result<(), JsValue>;

    fn broadcast(event: JsValue);
}

/// Map an error code thrown by the glue onto the taxonomy
pub fn error_from_code(code: Option<&str>, message: String) -> ToolkitError {
    match code {
        Some("NO_TAB_CONTEXT") => ToolkitError::NoTabContext,
        Some("INJECTION_FORBIDDEN") => ToolkitError::InjectionForbidden,
        Some("NOT_SERIALIZABLE") => ToolkitError::NotSerializable,
        Some("STORAGE") => ToolkitError::Storage(message),
        _ => ToolkitError::PageError(message),
    }
}

fn js_error(err: JsValue) -> ToolkitError {
    let field = |name: &str| js_sys::Reflect::get(&err, &JsValue::from_str(name)).ok().and_then(|v| v.as_string());
    let message = err
        .as_string()
        .or_else(|| field("message"))
        .unwrap_or_else(|| format!("{:?}", err));
    error_from_code(field("code").as_deref(), message)
}

/// Plain JS objects, not `Map`s, so the glue can hand them to `chrome.*`
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| ToolkitError::Serialization(err.to_string()))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T> {
    serde_wasm_bindgen::from_value(value).map_err(|err| ToolkitError::Serialization(err.to_string()))
}

fn area_name(area: StorageArea) -> &'static str {
    match area {
        StorageArea::Session => "session",
        StorageArea::Local => "local",
    }
}

/// Forward a worker event to every extension surface
pub fn broadcast_event(event: &WorkerEvent) {
    match to_js(event) {
        Ok(value) => broadcast(value),
        Err(err) => error!("could not broadcast event: {}", err),
    }
}

#[derive(Debug, Default)]
pub struct ChromeEnv;

impl PageBridge for ChromeEnv {
    async fn run_in_page(&self, tab_id: TabId, call: PageCall) -> Result<Value> {
        let tab = self.get_tab(tab_id).await?;
        if !is_injectable(&tab.url) {
            return Err(ToolkitError::InjectionForbidden);
        }
        let raw = runInPage(tab_id, to_js(&call)?).await.map_err(js_error)?;
        from_js(raw).map_err(|_| ToolkitError::NotSerializable)
    }
}

impl TabsApi for ChromeEnv {
    async fn get_tab(&self, tab_id: TabId) -> Result<TabInfo> {
        from_js(getTab(tab_id).await.map_err(js_error)?)
    }

    async fn set_title(&self, tab_id: TabId, title: &str) -> Result<()> {
        setTabTitle(tab_id, title).await.map_err(js_error)
    }

    async fn set_favicon(&self, tab_id: TabId, data_url: &str) -> Result<()> {
        setTabFavicon(tab_id, data_url).await.map_err(js_error)
    }

    async fn query_modal(&self, tab_id: TabId) -> Option<ModalObject> {
        match queryActiveModal(tab_id).await {
            Ok(value) if value.is_null() || value.is_undefined() => None,
            Ok(value) => from_js(value).ok(),
            Err(err) => {
                debug!("tab {}: no observer answered: {}", tab_id, js_error(err));
                None
            }
        }
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        openTab(url).await.map_err(js_error)
    }
}

impl KeyValueStore for ChromeEnv {
    async fn load(&self, area: StorageArea, key: &str) -> Result<Option<Value>> {
        let value = getStorage(area_name(area), key).await.map_err(js_error)?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        from_js(value).map(Some)
    }

    async fn store(&self, area: StorageArea, key: &str, value: Value) -> Result<()> {
        setStorage(area_name(area), key, to_js(&value)?).await.map_err(js_error)
    }
}

impl CookieJar for ChromeEnv {
    async fn list_cookies(&self, domain: &str) -> Result<Vec<Cookie>> {
        from_js(listCookies(domain).await.map_err(js_error)?)
    }

    async fn remove_cookie(&self, url: &str, name: &str, store_id: Option<&str>) -> Result<()> {
        removeCookie(url, name, store_id.map(str::to_string)).await.map_err(js_error)
    }
}

impl ClipboardApi for ChromeEnv {
    async fn write_text(&self, text: &str) -> Result<()> {
        writeClipboard(text).await.map_err(js_error)
    }
}

impl Runtime for ChromeEnv {
    async fn sleep(&self, ms: u32) {
        if let Err(err) = delay(ms).await {
            debug!("timer failed: {:?}", err);
        }
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        spawn_local(task);
    }

    fn now(&self) -> f64 {
        js_sys::Date::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(error_from_code(Some("NO_TAB_CONTEXT"), String::new()), ToolkitError::NoTabContext);
        assert_eq!(
            error_from_code(Some("INJECTION_FORBIDDEN"), String::new()),
            ToolkitError::InjectionForbidden
        );
        assert_eq!(
            error_from_code(Some("STORAGE"), "quota".to_string()),
            ToolkitError::Storage("quota".to_string())
        );
        assert_eq!(
            error_from_code(None, "TypeError: x".to_string()),
            ToolkitError::PageError("TypeError: x".to_string())
        );
    }

    #[test]
    fn test_area_names() {
        assert_eq!(area_name(StorageArea::Session), "session");
        assert_eq!(area_name(StorageArea::Local), "local");
    }
}
