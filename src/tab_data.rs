/// Browser-side facts about tabs, as reported by the host browser and the page observer
use crate::context::TabId;
use crate::object_type::ObjectTypeId;
use serde::{Deserialize, Serialize};

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

impl TabInfo {
    pub fn new(id: TabId, url: impl Into<String>, title: impl Into<String>) -> TabInfo {
        TabInfo {
            id,
            url: url.into(),
            title: title.into(),
            fav_icon_url: None,
        }
    }
}

/// An object shown in place (e.g. the card details modal) rather than by URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalObject {
    pub type_id: ObjectTypeId,
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_info_creation() {
        let tab = TabInfo::new(1, "https://acme.domo.com/page/1", "Sales");

        assert_eq!(tab.id, 1);
        assert_eq!(tab.url, "https://acme.domo.com/page/1");
        assert_eq!(tab.title, "Sales");
        assert_eq!(tab.fav_icon_url, None);
    }

    #[test]
    fn test_tab_info_from_browser_shape() {
        let json = r#"{"id": 7, "url": "https://acme.domo.com/", "favIconUrl": "https://acme.domo.com/favicon.ico"}"#;
        let tab: TabInfo = serde_json::from_str(json).unwrap();

        assert_eq!(tab.id, 7);
        assert_eq!(tab.title, "");
        assert_eq!(tab.fav_icon_url.as_deref(), Some("https://acme.domo.com/favicon.ico"));
    }

    #[test]
    fn test_modal_object_serialization() {
        let modal = ModalObject {
            type_id: ObjectTypeId::Card,
            id: "101".to_string(),
            parent_id: None,
        };

        let json = serde_json::to_string(&modal).unwrap();
        assert!(json.contains("\"typeId\":\"CARD\""));
        let back: ModalObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, modal);
    }
}
