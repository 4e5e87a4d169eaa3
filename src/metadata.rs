/// Metadata fetcher: runs a type's metadata recipe through the bridge
use crate::bridge::{PageBridge, fetch_json};
use crate::codec::{value_text, walk_path};
use crate::context::{ObjectMetadata, TabId};
use crate::error::{Result, ToolkitError};
use crate::object_type::ObjectType;
use log::{debug, warn};

/// Fetch `{details, name}` for an object
///
/// With `throw_on_error = false` every failure becomes empty metadata.
pub async fn fetch_metadata<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    object_type: &ObjectType,
    id: &str,
    parent_id: Option<&str>,
    throw_on_error: bool,
) -> Result<ObjectMetadata> {
    match try_fetch(bridge, tab_id, object_type, id, parent_id).await {
        Ok(metadata) => Ok(metadata),
        Err(err) if throw_on_error => Err(err),
        Err(err) => {
            debug!("metadata for {} {} unavailable: {}", object_type.id, id, err);
            Ok(ObjectMetadata::default())
        }
    }
}

async fn try_fetch<B: PageBridge + ?Sized>(
    bridge: &B,
    tab_id: TabId,
    object_type: &ObjectType,
    id: &str,
    parent_id: Option<&str>,
) -> Result<ObjectMetadata> {
    if !object_type.validate(id) {
        return Err(ToolkitError::Validation {
            type_name: object_type.display_name.to_string(),
            id: id.to_string(),
        });
    }

    let recipe = object_type
        .metadata_api
        .ok_or_else(|| ToolkitError::Unsupported(format!("{} has no metadata API", object_type.display_name)))?;

    if object_type.requires_parent_for_api() && parent_id.is_none() {
        return Err(ToolkitError::MissingParent);
    }

    let request = recipe.request(id, parent_id)?;
    let body = fetch_json(bridge, tab_id, &request).await?;

    let name = walk_path(&body, recipe.path_to_name).and_then(value_text);
    if name.is_none() {
        warn!("{} {}: no name at '{}'", object_type.id, id, recipe.path_to_name);
    }

    Ok(ObjectMetadata {
        details: Some(body),
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::testing::FakeEnv;
    use crate::object_type::ObjectTypeId;
    use crate::registry::Registry;
    use futures::executor::block_on;
    use serde_json::json;

    fn object_type(type_id: ObjectTypeId) -> &'static ObjectType {
        Registry::global().get(type_id).unwrap()
    }

    #[test]
    fn test_fetch_page_name() {
        let env = FakeEnv::new();
        env.respond("/api/content/v1/pages/12345", 200, json!({"title": "Quarterly Sales"}));

        let metadata = block_on(fetch_metadata(&env, 1, object_type(ObjectTypeId::Page), "12345", None, true)).unwrap();

        assert_eq!(metadata.name.as_deref(), Some("Quarterly Sales"));
        assert_eq!(metadata.details.unwrap()["title"], "Quarterly Sales");
    }

    #[test]
    fn test_nested_name_path() {
        let env = FakeEnv::new();
        env.respond(
            "/api/content/v1/cards?urns=101&parts=metadata,problems",
            200,
            json!([{"id": 101, "title": "Pipeline"}]),
        );

        let metadata = block_on(fetch_metadata(&env, 1, object_type(ObjectTypeId::Card), "101", None, true)).unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Pipeline"));
    }

    #[test]
    fn test_missing_parent() {
        let env = FakeEnv::new();
        let result = block_on(fetch_metadata(&env, 1, object_type(ObjectTypeId::DataAppView), "9876", None, true));

        assert_eq!(result, Err(ToolkitError::MissingParent));
        assert_eq!(env.bridge_calls(), 0);
    }

    #[test]
    fn test_upstream_status() {
        let env = FakeEnv::new();
        env.respond("/api/content/v1/pages/12345", 404, json!({"status": 404}));

        let result = block_on(fetch_metadata(&env, 1, object_type(ObjectTypeId::Page), "12345", None, true));
        assert_eq!(result, Err(ToolkitError::UpstreamHttp(404)));
    }

    #[test]
    fn test_errors_coerced_when_not_throwing() {
        let env = FakeEnv::new();
        env.respond("/api/content/v1/pages/12345", 500, json!({}));

        let metadata = block_on(fetch_metadata(&env, 1, object_type(ObjectTypeId::Page), "12345", None, false)).unwrap();
        assert_eq!(metadata, ObjectMetadata::default());
    }

    #[test]
    fn test_invalid_id_is_validation_error() {
        let env = FakeEnv::new();
        let result = block_on(fetch_metadata(&env, 1, object_type(ObjectTypeId::Page), "abc", None, true));
        assert!(matches!(result, Err(ToolkitError::Validation { .. })));
    }
}
