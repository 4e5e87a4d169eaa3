/// Isolated-world bridge: the only path for authenticated traffic to the host
///
/// Extension surfaces cannot read the host page's cookies or globals, so every
/// data-plane call is shipped into the tab's main world. Page functions are a
/// closed set of named, self-contained bodies that live in the JS glue; callers
/// pick one and pass everything else through `args`. There is no way to hand a
/// closure across this boundary.
use crate::context::TabId;
use crate::error::{Result, ToolkitError};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Named page-world functions; the bodies live in `worker.js`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageFunction {
    /// `fetch` with the session's credentials, JSON response
    Fetch,
    /// `fetch` with credentials, body returned as base64
    FetchBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageCall {
    pub function: PageFunction,
    pub args: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// A request against the host data plane, relative to the tab's instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostRequest {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HostRequest {
    pub fn get(path: impl Into<String>) -> Self {
        HostRequest { method: Method::Get, path: path.into(), body: None }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        HostRequest { method: Method::Delete, path: path.into(), body: None }
    }

    pub fn with_body(method: Method, path: impl Into<String>, body: Value) -> Self {
        HostRequest { method, path: path.into(), body: Some(body) }
    }

    fn to_call(&self, function: PageFunction) -> PageCall {
        PageCall {
            function,
            args: json!({
                "method": self.method,
                "path": self.path,
                "body": self.body,
            }),
        }
    }
}

/// What the page-world fetch hands back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    pub status: u16,
    #[serde(default)]
    pub body: Value,
}

impl HostResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a page function inside a tab's main world
///
/// Implementations must settle every call exactly once and map host failures
/// onto `NoTabContext`, `InjectionForbidden`, `PageError` or `NotSerializable`.
#[allow(async_fn_in_trait)]
pub trait PageBridge {
    async fn run_in_page(&self, tab_id: TabId, call: PageCall) -> Result<Value>;
}

/// Run an authenticated JSON request in the tab and return the response body
pub async fn fetch_json<B: PageBridge + ?Sized>(bridge: &B, tab_id: TabId, request: &HostRequest) -> Result<Value> {
    debug!("bridge {:?} {} (tab {})", request.method, request.path, tab_id);
    let raw = bridge.run_in_page(tab_id, request.to_call(PageFunction::Fetch)).await?;
    let response = parse_response(raw)?;
    if !response.is_success() {
        return Err(ToolkitError::UpstreamHttp(response.status));
    }
    Ok(response.body)
}

/// Run an authenticated request and return the raw response bytes
pub async fn fetch_bytes<B: PageBridge + ?Sized>(bridge: &B, tab_id: TabId, path: &str) -> Result<Vec<u8>> {
    let request = HostRequest::get(path);
    let raw = bridge.run_in_page(tab_id, request.to_call(PageFunction::FetchBytes)).await?;
    let response = parse_response(raw)?;
    if !response.is_success() {
        return Err(ToolkitError::UpstreamHttp(response.status));
    }
    let encoded = response.body.as_str().ok_or(ToolkitError::NotSerializable)?;
    STANDARD
        .decode(encoded)
        .map_err(|e| ToolkitError::PageError(format!("invalid base64 body: {}", e)))
}

fn parse_response(raw: Value) -> Result<HostResponse> {
    serde_json::from_value(raw).map_err(|e| {
        error!("page function returned an unexpected shape: {}", e);
        ToolkitError::NotSerializable
    })
}

/// Whether the browser lets extensions inject into a URL at all
pub fn is_injectable(url: &str) -> bool {
    let lowered = url.trim().to_lowercase();
    let forbidden_scheme = ["chrome:", "chrome-extension:", "edge:", "about:", "view-source:", "devtools:", "file:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme));
    let web_store = lowered.starts_with("https://chrome.google.com/webstore")
        || lowered.starts_with("https://chromewebstore.google.com");
    !lowered.is_empty() && !forbidden_scheme && !web_store
}
