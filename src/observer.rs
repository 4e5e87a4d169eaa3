/// Page observer: turns DOM snapshots of a host page into hints for the worker
///
/// The observer keeps only the previous snapshot. It never talks to the data
/// plane; everything it learns goes upward as a `Hint`.
use crate::object_type::ObjectTypeId;
use crate::registry::Registry;
use crate::tab_data::ModalObject;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlImageElement};

/// In-place card preview
pub const CARD_MODAL_SELECTOR: &str = "[role=\"dialog\"] [data-card-id]";
pub const INSTANCE_LOGO_SELECTOR: &str = "img[data-testid=\"instance-logo\"], .instance-logo img";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Hint {
    UrlChanged { url: String },
    ModalOpened { modal: ModalObject },
    ModalClosed,
    InstanceLogo { src: String },
}

/// What one DOM pass saw
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub modal: Option<ModalObject>,
    pub logo_src: Option<String>,
}

#[derive(Debug, Default)]
pub struct PageObserver {
    last: Option<PageSnapshot>,
}

impl PageObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints for whatever changed since the previous snapshot
    pub fn observe(&mut self, snapshot: PageSnapshot) -> Vec<Hint> {
        let previous = self.last.take().unwrap_or_default();
        let mut hints = Vec::new();

        if snapshot.url != previous.url {
            hints.push(Hint::UrlChanged { url: snapshot.url.clone() });
        }

        match (&previous.modal, &snapshot.modal) {
            (_, Some(modal)) if previous.modal.as_ref() != Some(modal) => {
                hints.push(Hint::ModalOpened { modal: modal.clone() });
            }
            (Some(_), None) => hints.push(Hint::ModalClosed),
            _ => {}
        }

        if let Some(src) = &snapshot.logo_src {
            if previous.logo_src.as_ref() != Some(src) {
                hints.push(Hint::InstanceLogo { src: src.clone() });
            }
        }

        self.last = Some(snapshot);
        hints
    }

    pub fn active_modal(&self) -> Option<&ModalObject> {
        self.last.as_ref().and_then(|snapshot| snapshot.modal.as_ref())
    }
}

/// Card shown by a modal element, if its id is a valid card id
pub fn modal_from_attribute(card_id: Option<String>) -> Option<ModalObject> {
    let id = card_id?.trim().to_string();
    Registry::global().validate(ObjectTypeId::Card, &id).then(|| ModalObject {
        type_id: ObjectTypeId::Card,
        id,
        parent_id: None,
    })
}

fn first_match(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// Read the current page state from the DOM
pub fn read_snapshot(document: &Document, url: &str) -> PageSnapshot {
    let modal = first_match(document, CARD_MODAL_SELECTOR).and_then(|el| modal_from_attribute(el.get_attribute("data-card-id")));
    let logo_src = first_match(document, INSTANCE_LOGO_SELECTOR)
        .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        .map(|img| img.src())
        .filter(|src| !src.is_empty());

    PageSnapshot {
        url: url.to_string(),
        modal,
        logo_src,
    }
}
