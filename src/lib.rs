/// Instance Toolkit - admin assistant for hosted analytics instances
/// Built with Rust + WASM + Yew

pub mod actions;
pub mod bridge;
pub mod bus;
pub mod cache;
pub mod chrome;
pub mod clipboard;
pub mod coalesce;
pub mod codec;
pub mod context;
pub mod cookies;
pub mod detect;
pub mod env;
pub mod error;
pub mod favicon;
pub mod messages;
pub mod metadata;
pub mod object_type;
pub mod observer;
pub mod parent;
pub mod registry;
pub mod settings;
pub mod storage;
pub mod tab_data;
pub mod ui;
pub mod worker;

use crate::bus::Subscription;
use crate::chrome::{ChromeEnv, broadcast_event, from_js, to_js};
use crate::messages::{Reply, Request};
use crate::observer::PageObserver;
use crate::worker::Worker;
use log::info;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

thread_local! {
    static WORKER: RefCell<Option<(Rc<Worker<ChromeEnv>>, Subscription)>> = const { RefCell::new(None) };
    static OBSERVER: RefCell<PageObserver> = RefCell::new(PageObserver::new());
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn to_js_error(err: error::ToolkitError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn running_worker() -> Result<Rc<Worker<ChromeEnv>>, JsValue> {
    WORKER
        .with(|slot| slot.borrow().as_ref().map(|(worker, _)| worker.clone()))
        .ok_or_else(|| JsValue::from_str("worker not started"))
}

/// Start the worker: restore persisted state and forward its events to every surface
#[wasm_bindgen]
pub async fn init_worker() {
    let worker = Worker::start(Rc::new(ChromeEnv)).await;
    let subscription = worker.subscribe(broadcast_event);
    WORKER.with(|slot| *slot.borrow_mut() = Some((worker, subscription)));
    info!("worker started");
}

/// Route one runtime message; always answers with a structured reply
#[wasm_bindgen]
pub async fn handle_message(message: JsValue, sender_tab: Option<i32>) -> Result<JsValue, JsValue> {
    let worker = running_worker()?;
    let reply = match from_js::<Request>(message) {
        Ok(request) => worker.handle_message(request, sender_tab).await,
        Err(err) => Reply::failure(&err),
    };
    to_js(&reply).map_err(to_js_error)
}

/// Tab activated, navigated or finished loading
#[wasm_bindgen]
pub fn on_tab_changed(tab_id: i32, reason: &str) -> Result<(), JsValue> {
    running_worker()?.trigger(tab_id, reason);
    Ok(())
}

#[wasm_bindgen]
pub fn on_tab_removed(tab_id: i32) -> Result<(), JsValue> {
    running_worker()?.on_tab_removed(tab_id);
    Ok(())
}

/// Read the host page and return hints for whatever changed since the last call
#[wasm_bindgen]
pub fn observe_page() -> Result<JsValue, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let url = window.location().href()?;

    let snapshot = observer::read_snapshot(&document, &url);
    let hints = OBSERVER.with(|observer| observer.borrow_mut().observe(snapshot));
    to_js(&hints).map_err(to_js_error)
}

/// The modal object seen by the last `observe_page`, or null
#[wasm_bindgen]
pub fn active_modal() -> Result<JsValue, JsValue> {
    let modal = OBSERVER.with(|observer| observer.borrow().active_modal().cloned());
    to_js(&modal).map_err(to_js_error)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
