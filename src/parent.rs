/// Parent recovery for objects whose URL omits the parent id
use crate::bridge::{HostRequest, PageBridge, fetch_json};
use crate::codec::{HostUrl, expand_template, value_text, walk_path};
use crate::context::{ObjectInstance, TabId};
use crate::object_type::{ObjectType, ObjectTypeId, ParentLookup};
use crate::registry::Registry;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use log::{debug, warn};
use std::cell::RefCell;
use std::collections::HashMap;

/// Lookups chain through at most this many types
pub const MAX_LOOKUP_DEPTH: usize = 2;

type MemoKey = (TabId, ObjectTypeId, String);

/// Lookup results per tab; a `None` entry is a failed or in-progress lookup
#[derive(Debug, Default)]
pub struct ParentMemo {
    entries: HashMap<MemoKey, Option<String>>,
}

impl ParentMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tab_id: TabId, type_id: ObjectTypeId, id: &str) -> Option<Option<String>> {
        self.entries.get(&(tab_id, type_id, id.to_string())).cloned()
    }

    pub fn insert(&mut self, tab_id: TabId, type_id: ObjectTypeId, id: &str, parent: Option<String>) {
        self.entries.insert((tab_id, type_id, id.to_string()), parent);
    }

    pub fn forget_tab(&mut self, tab_id: TabId) {
        self.entries.retain(|(tab, _, _), _| *tab != tab_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recover a parent without touching the data plane: the previous context's
/// parent for the same object, then the URL's parent slot, then its query
pub fn recover_locally(
    registry: &Registry,
    object_type: &ObjectType,
    id: &str,
    previous: Option<&ObjectInstance>,
    url: &HostUrl,
) -> Option<String> {
    previous
        .filter(|object| object.type_id == object_type.id && object.id == id)
        .and_then(|object| object.parent_id.clone())
        .or_else(|| registry.extract_parent(object_type.id, url))
        .or_else(|| registry.parent_from_query(object_type.id, url))
}

/// Discover a parent through the type's lookup recipe
pub async fn lookup_parent<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    object_type: &ObjectType,
    id: &str,
    memo: &RefCell<ParentMemo>,
) -> Option<String> {
    let registry = Registry::global();
    let parent = lookup_at_depth(bridge, registry, tab_id, object_type.id, id.to_string(), memo, 0).await?;

    let parent_type = object_type.parent_type()?;
    if registry.validate(parent_type, &parent) {
        Some(parent)
    } else {
        warn!("{} {}: lookup returned invalid {} id '{}'", object_type.id, id, parent_type, parent);
        None
    }
}

fn lookup_at_depth<'a, B: PageBridge + ?Sized>(
    bridge: &'a B,
    registry: &'static Registry,
    tab_id: TabId,
    type_id: ObjectTypeId,
    id: String,
    memo: &'a RefCell<ParentMemo>,
    depth: usize,
) -> LocalBoxFuture<'a, Option<String>> {
    async move {
        if depth >= MAX_LOOKUP_DEPTH {
            debug!("{} {}: parent lookup depth exhausted", type_id, id);
            return None;
        }
        if let Some(known) = memo.borrow().get(tab_id, type_id, &id) {
            return known;
        }
        // Mark in progress so a cycle back to this object stops here
        memo.borrow_mut().insert(tab_id, type_id, &id, None);

        let lookup = registry.get(type_id).and_then(|t| t.parent_lookup)?;
        let found = match lookup {
            ParentLookup::Endpoint { endpoint, path } => read_id(bridge, tab_id, endpoint, path, &id).await,
            ParentLookup::Via { endpoint, path, related } => match read_id(bridge, tab_id, endpoint, path, &id).await {
                Some(related_id) if registry.validate(related, &related_id) => {
                    lookup_at_depth(bridge, registry, tab_id, related, related_id, memo, depth + 1).await
                }
                _ => None,
            },
        };

        memo.borrow_mut().insert(tab_id, type_id, &id, found.clone());
        found
    }
    .boxed_local()
}

async fn read_id<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    endpoint: &str,
    path: &str,
    id: &str,
) -> Option<String> {
    let request = HostRequest::get(expand_template(endpoint, id, None).ok()?);
    match fetch_json(bridge, tab_id, &request).await {
        Ok(body) => walk_path(&body, path).and_then(value_text),
        Err(err) => {
            debug!("parent lookup {} failed: {}", request.path, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_host_url;
    use crate::env::testing::FakeEnv;
    use futures::executor::block_on;
    use serde_json::json;

    fn object_type(type_id: ObjectTypeId) -> &'static ObjectType {
        Registry::global().get(type_id).unwrap()
    }

    fn host(url: &str) -> HostUrl {
        parse_host_url(url, &["example".to_string()]).unwrap()
    }

    fn script_app_page(env: &FakeEnv) {
        env.respond("/api/content/v3/stacks/9876/cards", 200, json!({"cards": [{"id": 101}]}));
        env.respond(
            "/api/content/v1/cards?urns=101&parts=adminAllPages",
            200,
            json!([{"adminAllPages": [{"appId": 55}]}]),
        );
    }

    #[test]
    fn test_lookup_through_related_card() {
        let env = FakeEnv::new();
        script_app_page(&env);
        let memo = RefCell::new(ParentMemo::new());

        let parent = block_on(lookup_parent(&env, 1, object_type(ObjectTypeId::DataAppView), "9876", &memo));

        assert_eq!(parent.as_deref(), Some("55"));
        assert_eq!(env.requests().len(), 2);
        assert_eq!(memo.borrow().get(1, ObjectTypeId::Card, "101"), Some(Some("55".to_string())));
    }

    #[test]
    fn test_lookup_memoized_per_tab() {
        let env = FakeEnv::new();
        script_app_page(&env);
        let memo = RefCell::new(ParentMemo::new());
        let view = object_type(ObjectTypeId::DataAppView);

        block_on(lookup_parent(&env, 1, view, "9876", &memo));
        block_on(lookup_parent(&env, 1, view, "9876", &memo));
        assert_eq!(env.requests().len(), 2);

        block_on(lookup_parent(&env, 2, view, "9876", &memo));
        assert_eq!(env.requests().len(), 4);

        memo.borrow_mut().forget_tab(1);
        assert!(memo.borrow().get(1, ObjectTypeId::DataAppView, "9876").is_none());
        assert!(memo.borrow().get(2, ObjectTypeId::DataAppView, "9876").is_some());
    }

    #[test]
    fn test_failed_lookup_is_remembered() {
        let env = FakeEnv::new();
        let memo = RefCell::new(ParentMemo::new());
        let view = object_type(ObjectTypeId::DataAppView);

        assert_eq!(block_on(lookup_parent(&env, 1, view, "9876", &memo)), None);
        assert_eq!(block_on(lookup_parent(&env, 1, view, "9876", &memo)), None);
        assert_eq!(env.requests_to("/api/content/v3/stacks/9876/cards"), 1);
    }

    #[test]
    fn test_in_progress_entry_breaks_cycle() {
        let env = FakeEnv::new();
        env.respond("/api/content/v3/stacks/9876/cards", 200, json!({"cards": [{"id": 101}]}));
        let memo = RefCell::new(ParentMemo::new());
        memo.borrow_mut().insert(1, ObjectTypeId::Card, "101", None);

        let parent = block_on(lookup_parent(&env, 1, object_type(ObjectTypeId::DataAppView), "9876", &memo));

        assert_eq!(parent, None);
        assert_eq!(env.requests().len(), 1);
    }

    #[test]
    fn test_invalid_lookup_result_rejected() {
        let env = FakeEnv::new();
        env.respond("/api/content/v3/stacks/9876/cards", 200, json!({"cards": [{"id": 101}]}));
        env.respond(
            "/api/content/v1/cards?urns=101&parts=adminAllPages",
            200,
            json!([{"adminAllPages": [{"appId": "not-an-app"}]}]),
        );
        let memo = RefCell::new(ParentMemo::new());

        let parent = block_on(lookup_parent(&env, 1, object_type(ObjectTypeId::DataAppView), "9876", &memo));
        assert_eq!(parent, None);
    }

    #[test]
    fn test_previous_parent_preferred() {
        let registry = Registry::global();
        let view = object_type(ObjectTypeId::DataAppView);
        let url = host("https://acme.example/app-studio/pages/9876");

        let mut previous = ObjectInstance::new(ObjectTypeId::DataAppView, "9876", Some("55".to_string()));
        assert_eq!(recover_locally(registry, view, "9876", Some(&previous), &url).as_deref(), Some("55"));

        previous.id = "1111".to_string();
        assert_eq!(recover_locally(registry, view, "9876", Some(&previous), &url), None);
    }

    #[test]
    fn test_parent_from_url() {
        let registry = Registry::global();
        let execution = object_type(ObjectTypeId::WorkflowInstance);
        let model = "11111111-2222-3333-4444-555555555555";
        let url = host(&format!(
            "https://acme.example/workflows/models/{}/instances/7f3c2a10-1b2d-4c0e-9f5a-0a0b0c0d0e0f",
            model
        ));

        let parent = recover_locally(registry, execution, "7f3c2a10-1b2d-4c0e-9f5a-0a0b0c0d0e0f", None, &url);
        assert_eq!(parent.as_deref(), Some(model));
    }

    #[test]
    fn test_parent_from_url_query() {
        let registry = Registry::global();
        let view = object_type(ObjectTypeId::DataAppView);

        let url = host("https://acme.example/app-studio/pages/9876?appId=55");
        assert_eq!(recover_locally(registry, view, "9876", None, &url).as_deref(), Some("55"));

        let slot_wins = host("https://acme.example/app-studio/44/pages/9876?appId=55");
        assert_eq!(recover_locally(registry, view, "9876", None, &slot_wins).as_deref(), Some("44"));
    }
}
