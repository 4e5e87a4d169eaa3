/// Recognition of copied platform identifiers
use crate::bridge::PageBridge;
use crate::codec::IdPattern;
use crate::context::{ObjectInstance, TabId};
use crate::detect::canonical_url;
use crate::metadata::fetch_metadata;
use crate::registry::Registry;
use log::debug;

/// The identifier in a clipboard value, if it is an integer or a canonical UUID
pub fn candidate_id(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    IdPattern::classify(trimmed).map(|_| trimmed)
}

/// Try every type that accepts `id` and needs no parent, in registry order;
/// the first whose metadata yields a name wins
pub async fn recognize<B: PageBridge + ?Sized>(bridge: &B, tab_id: TabId, origin: &str, id: &str) -> Option<ObjectInstance> {
    let registry = Registry::global();
    for object_type in registry.types_accepting(id) {
        let metadata = match fetch_metadata(bridge, tab_id, object_type, id, None, false).await {
            Ok(metadata) if metadata.name.is_some() => metadata,
            _ => continue,
        };

        debug!("clipboard {} recognized as {}", id, object_type.id);
        let mut object = ObjectInstance::new(object_type.id, id, None);
        object.url = canonical_url(registry, origin, &object);
        object.metadata = Some(metadata);
        return Some(object);
    }
    None
}
