/// Context detection steps
///
/// `partial_context` is the synchronous part of a run: instance, modal or URL
/// identification, and local parent recovery. `enrich_object` is the part that
/// needs the data plane and runs in the background.
use crate::bridge::PageBridge;
use crate::codec::{HostUrl, parse_host_url};
use crate::context::{ObjectInstance, TabContext, TabId};
use crate::error::{Result, ToolkitError};
use crate::metadata::fetch_metadata;
use crate::parent::{ParentMemo, lookup_parent, recover_locally};
use crate::registry::{Identified, Registry};
use crate::tab_data::{ModalObject, TabInfo};
use log::{debug, info};
use std::cell::RefCell;

/// Steps 1 to 4 of a detection run, without any data-plane traffic
pub fn partial_context(
    tab: &TabInfo,
    host_url: Option<&HostUrl>,
    modal: Option<&ModalObject>,
    previous: Option<&TabContext>,
    sequence: u64,
    now: f64,
) -> TabContext {
    let mut context = TabContext::empty(tab.id, tab.url.clone(), sequence, now);
    let Some(url) = host_url else {
        return context;
    };
    context.instance = Some(url.instance.clone());

    let registry = Registry::global();
    let found = modal
        .filter(|modal| registry.validate(modal.type_id, &modal.id))
        .map(|modal| Identified {
            type_id: modal.type_id,
            id: modal.id.clone(),
            parent_id: modal.parent_id.clone(),
        })
        .or_else(|| registry.identify(url));

    let previous_object = previous.and_then(|c| c.object.as_ref());
    context.object = found.and_then(|found| build_object(registry, url, found, previous_object));
    context
}

/// Parse a tab URL against the configured host domains
pub fn host_url(tab: &TabInfo, host_domains: &[String]) -> Option<HostUrl> {
    parse_host_url(&tab.url, host_domains)
}

fn build_object(registry: &Registry, url: &HostUrl, found: Identified, previous: Option<&ObjectInstance>) -> Option<ObjectInstance> {
    let object_type = registry.get(found.type_id)?;
    let mut object = ObjectInstance::new(found.type_id, found.id, found.parent_id);

    let needs_parent = object_type.requires_parent_for_url() || object_type.requires_parent_for_api();
    if needs_parent && object.parent_id.is_none() {
        object.parent_id = recover_locally(registry, object_type, &object.id, previous, url);
        object.parent_pending = object.parent_id.is_none();
    }

    // Same object as before: keep its metadata until enrichment refreshes it
    if let Some(previous) = previous.filter(|p| **p == object && p.parent_id == object.parent_id) {
        object.metadata = previous.metadata.clone();
    }

    object.url = canonical_url(registry, &url.origin, &object);
    Some(object)
}

/// Link to the object on its instance, when every URL slot is known
pub fn canonical_url(registry: &Registry, origin: &str, object: &ObjectInstance) -> Option<String> {
    let object_type = registry.get(object.type_id)?;
    if object_type.requires_parent_for_url() && object.parent_id.is_none() {
        return None;
    }
    registry.build_url(origin, object.type_id, &object.id, object.parent_id.as_deref())
}

/// Resolve a pending parent through the data plane, then fetch metadata
///
/// A parent that cannot be found leaves the object parent-pending; metadata
/// is then skipped when the API needs the parent.
pub async fn enrich_object<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    origin: &str,
    mut object: ObjectInstance,
    memo: &RefCell<ParentMemo>,
) -> Result<ObjectInstance> {
    let registry = Registry::global();
    let object_type = registry
        .get(object.type_id)
        .ok_or_else(|| ToolkitError::Unsupported(format!("unknown type {}", object.type_id)))?;

    if object.parent_pending {
        if let Some(parent) = lookup_parent(bridge, tab_id, object_type, &object.id, memo).await {
            info!("tab {}: {} {} has parent {}", tab_id, object.type_id, object.id, parent);
            object.parent_id = Some(parent);
            object.parent_pending = false;
            object.url = canonical_url(registry, origin, &object);
        }
    }

    if object.parent_pending && object_type.requires_parent_for_api() {
        debug!("tab {}: {} {} still waiting for its parent", tab_id, object.type_id, object.id);
        return Ok(object);
    }

    let metadata = fetch_metadata(bridge, tab_id, object_type, &object.id, object.parent_id.as_deref(), true).await?;
    object.metadata = Some(metadata);
    Ok(object)
}
