//! Browser tests for the DOM-facing parts of the observer
#![cfg(target_arch = "wasm32")]

use instance_toolkit::object_type::ObjectTypeId;
use instance_toolkit::observer::{Hint, PageObserver, read_snapshot};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

#[wasm_bindgen_test]
fn test_reads_card_modal_and_logo() {
    let document = document();
    let body = document.body().unwrap();
    body.set_inner_html(
        r#"<div role="dialog"><div data-card-id="101"></div></div>
           <img data-testid="instance-logo" src="https://acme.domo.com/logo.png">"#,
    );

    let snapshot = read_snapshot(&document, "https://acme.domo.com/page/1");

    let modal = snapshot.modal.unwrap();
    assert_eq!(modal.type_id, ObjectTypeId::Card);
    assert_eq!(modal.id, "101");
    assert_eq!(snapshot.logo_src.as_deref(), Some("https://acme.domo.com/logo.png"));
}

#[wasm_bindgen_test]
fn test_modal_close_becomes_hint() {
    let document = document();
    let body = document.body().unwrap();
    let mut observer = PageObserver::new();

    body.set_inner_html(r#"<div role="dialog"><div data-card-id="101"></div></div>"#);
    observer.observe(read_snapshot(&document, "https://acme.domo.com/page/1"));

    body.set_inner_html("");
    let hints = observer.observe(read_snapshot(&document, "https://acme.domo.com/page/1"));
    assert_eq!(hints, vec![Hint::ModalClosed]);
}
