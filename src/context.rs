/// Per-tab context: which instance and which object a tab is showing
use crate::object_type::ObjectTypeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TabId = i32;

/// Enriched metadata for an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub details: Option<Value>,
    pub name: Option<String>,
}

/// A live reference to a concrete platform object; equality is `(type_id, id)`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInstance {
    pub type_id: ObjectTypeId,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// A required parent is not known yet
    #[serde(default)]
    pub parent_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl PartialEq for ObjectInstance {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.id == other.id
    }
}

impl Eq for ObjectInstance {}

impl ObjectInstance {
    pub fn new(type_id: ObjectTypeId, id: impl Into<String>, parent_id: Option<String>) -> Self {
        ObjectInstance {
            type_id,
            id: id.into(),
            parent_id,
            parent_pending: false,
            metadata: None,
            url: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.name.as_deref())
    }

    pub fn details(&self) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.details.as_ref())
    }

    /// The tuple whose change triggers title and favicon updates
    pub fn identity(&self) -> ObjectIdentity {
        ObjectIdentity {
            type_id: self.type_id,
            id: self.id.clone(),
            parent_id: self.parent_id.clone(),
            name: self.name().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentity {
    pub type_id: ObjectTypeId,
    pub id: String,
    pub parent_id: Option<String>,
    pub name: Option<String>,
}

/// The per-tab record, replaced atomically on every detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabContext {
    pub tab_id: TabId,
    pub url: String,
    /// Instance subdomain; absent on non-host pages
    pub instance: Option<String>,
    pub object: Option<ObjectInstance>,
    pub last_updated_at: f64,
    /// Detection run that produced this context
    #[serde(default)]
    pub sequence: u64,
}

impl TabContext {
    pub fn empty(tab_id: TabId, url: impl Into<String>, sequence: u64, now: f64) -> Self {
        TabContext {
            tab_id,
            url: url.into(),
            instance: None,
            object: None,
            last_updated_at: now,
            sequence,
        }
    }

    pub fn is_host_page(&self) -> bool {
        self.instance.is_some()
    }

    pub fn identity(&self) -> Option<ObjectIdentity> {
        self.object.as_ref().map(ObjectInstance::identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_equality_ignores_metadata() {
        let mut named = ObjectInstance::new(ObjectTypeId::Page, "1", None);
        named.metadata = Some(ObjectMetadata {
            details: None,
            name: Some("Sales".to_string()),
        });
        let bare = ObjectInstance::new(ObjectTypeId::Page, "1", Some("9".to_string()));

        assert_eq!(named, bare);
        assert_ne!(named, ObjectInstance::new(ObjectTypeId::Card, "1", None));
    }

    #[test]
    fn test_identity_tracks_name() {
        let mut object = ObjectInstance::new(ObjectTypeId::Page, "1", None);
        let before = object.identity();
        object.metadata = Some(ObjectMetadata {
            details: Some(json!({"title": "Sales"})),
            name: Some("Sales".to_string()),
        });

        assert_ne!(before, object.identity());
        assert_eq!(object.name(), Some("Sales"));
        assert_eq!(object.details().unwrap()["title"], "Sales");
    }

    #[test]
    fn test_serialization() {
        let context = TabContext {
            tab_id: 3,
            url: "https://acme.domo.com/page/1".to_string(),
            instance: Some("acme".to_string()),
            object: Some(ObjectInstance::new(ObjectTypeId::Page, "1", None)),
            last_updated_at: 1698508200000.0,
            sequence: 4,
        };

        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["tabId"], 3);
        assert_eq!(json["object"]["typeId"], "PAGE");
        assert!(json["object"].get("parentId").is_none());

        let back: TabContext = serde_json::from_value(json).unwrap();
        assert_eq!(back.sequence, 4);
        assert_eq!(back.object.unwrap().id, "1");
    }

    #[test]
    fn test_empty_context() {
        let context = TabContext::empty(5, "https://www.google.com", 1, 0.0);
        assert!(!context.is_host_page());
        assert_eq!(context.identity(), None);
    }
}
