/// Read-only registry of object types: lookup, URL identification, validation
use crate::codec::{HostUrl, IdPattern, build_path, match_template};
use crate::object_type::{OBJECT_TYPES, ObjectType, ObjectTypeId};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Result of recognising an object in a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identified {
    pub type_id: ObjectTypeId,
    pub id: String,
    pub parent_id: Option<String>,
}

pub struct Registry {
    ordered: &'static [ObjectType],
    by_id: HashMap<ObjectTypeId, &'static ObjectType>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// The process-wide registry, frozen on first use
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(|| Registry::new(OBJECT_TYPES))
    }

    fn new(ordered: &'static [ObjectType]) -> Registry {
        let by_id = ordered.iter().map(|t| (t.id, t)).collect();
        Registry { ordered, by_id }
    }

    pub fn get(&self, type_id: ObjectTypeId) -> Option<&'static ObjectType> {
        self.by_id.get(&type_id).copied()
    }

    pub fn all(&self) -> &'static [ObjectType] {
        self.ordered
    }

    pub fn validate(&self, type_id: ObjectTypeId, candidate: &str) -> bool {
        self.get(type_id).is_some_and(|t| t.validate(candidate))
    }

    /// First type, in registry order, whose URL template matches and whose
    /// pattern accepts the id its extraction rule reads from the path
    pub fn identify(&self, url: &HostUrl) -> Option<Identified> {
        self.ordered.iter().find_map(|object_type| {
            let template = object_type.url_path?;
            let found = match_template(template, &url.segments)?;
            let id = match object_type.extract {
                Some(config) => config.extract(&url.segments)?.to_string(),
                None => found.id,
            };
            if !object_type.validate(&id) {
                return None;
            }

            if let Some(parent) = &found.parent {
                if !self.parent_is_valid(object_type, parent) {
                    return None;
                }
            }

            Some(Identified {
                type_id: object_type.id,
                id,
                parent_id: found.parent,
            })
        })
    }

    /// Recover a parent id from the URL using the type's parent extraction
    pub fn extract_parent(&self, type_id: ObjectTypeId, url: &HostUrl) -> Option<String> {
        let object_type = self.get(type_id)?;
        let candidate = object_type.parent_extract?.extract(&url.segments)?;
        self.parent_is_valid(object_type, candidate).then(|| candidate.to_string())
    }

    /// Recover a parent id from the type's query parameter, e.g. `?appId=55`
    pub fn parent_from_query(&self, type_id: ObjectTypeId, url: &HostUrl) -> Option<String> {
        let object_type = self.get(type_id)?;
        let candidate = url.query_param(object_type.parent_query?)?;
        self.parent_is_valid(object_type, candidate).then(|| candidate.to_string())
    }

    /// Types whose pattern accepts `candidate` and whose metadata needs no parent
    pub fn types_accepting(&self, candidate: &str) -> Vec<&'static ObjectType> {
        self.ordered
            .iter()
            .filter(|t| t.validate(candidate))
            .filter(|t| t.metadata_api.is_some() && !t.requires_parent_for_api())
            .collect()
    }

    /// Absolute URL of an object on an instance origin
    pub fn build_url(&self, origin: &str, type_id: ObjectTypeId, id: &str, parent: Option<&str>) -> Option<String> {
        let template = self.get(type_id)?.url_path?;
        Some(format!("{}/{}", origin.trim_end_matches('/'), build_path(template, id, parent)))
    }

    fn parent_is_valid(&self, object_type: &ObjectType, candidate: &str) -> bool {
        object_type
            .parent_type()
            .and_then(|parent| self.get(parent))
            .map_or_else(|| IdPattern::classify(candidate).is_some(), |parent| parent.validate(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ExtractConfig, parse_host_url};

    const UUID: &str = "7f3c2a10-1b2d-4c0e-9f5a-0a0b0c0d0e0f";

    fn host(url: &str) -> HostUrl {
        parse_host_url(url, &["example".to_string(), "domo.com".to_string()]).unwrap()
    }

    #[test]
    fn test_get_is_total_over_known_types() {
        let registry = Registry::global();
        for object_type in registry.all() {
            assert_eq!(registry.get(object_type.id).unwrap().id, object_type.id);
        }
    }

    #[test]
    fn test_identify_page() {
        let found = Registry::global().identify(&host("https://acme.example/page/12345")).unwrap();
        assert_eq!(found.type_id, ObjectTypeId::Page);
        assert_eq!(found.id, "12345");
        assert_eq!(found.parent_id, None);
    }

    #[test]
    fn test_identify_app_page_without_parent() {
        let found = Registry::global()
            .identify(&host("https://acme.example/app-studio/pages/9876"))
            .unwrap();
        assert_eq!(found.type_id, ObjectTypeId::DataAppView);
        assert_eq!(found.id, "9876");
        assert_eq!(found.parent_id, None);
    }

    #[test]
    fn test_identify_app_page_with_parent() {
        let found = Registry::global()
            .identify(&host("https://acme.example/app-studio/55/pages/9876"))
            .unwrap();
        assert_eq!(found.type_id, ObjectTypeId::DataAppView);
        assert_eq!(found.parent_id.as_deref(), Some("55"));
    }

    #[test]
    fn test_identify_rejects_invalid_ids() {
        let registry = Registry::global();
        assert_eq!(registry.identify(&host("https://acme.example/page/overview")), None);
        assert_eq!(registry.identify(&host("https://acme.example/datasources/12345")), None);
        assert_eq!(registry.identify(&host("https://acme.example/")), None);
    }

    #[test]
    fn test_identify_with_trailing_segments() {
        let url = format!("https://acme.domo.com/datasources/{}/details/overview", UUID);
        let found = Registry::global().identify(&host(&url)).unwrap();
        assert_eq!(found.type_id, ObjectTypeId::DataSource);
        assert_eq!(found.id, UUID);
    }

    #[test]
    fn test_identify_reads_id_before_sub_tab() {
        let url = format!("https://acme.domo.com/approval/request-details/{}/history", UUID);
        let found = Registry::global().identify(&host(&url)).unwrap();
        assert_eq!(found.type_id, ObjectTypeId::Approval);
        assert_eq!(found.id, UUID);
    }

    #[test]
    fn test_validate() {
        let registry = Registry::global();
        assert!(registry.validate(ObjectTypeId::Page, "42"));
        assert!(!registry.validate(ObjectTypeId::Page, UUID));
        assert!(registry.validate(ObjectTypeId::DataSource, UUID));
    }

    #[test]
    fn test_validated_ids_round_trip_through_urls() {
        let registry = Registry::global();
        for object_type in registry.all().iter().filter(|t| t.has_url()) {
            let id = match object_type.id_pattern {
                IdPattern::Integer => "12345",
                IdPattern::Uuid => UUID,
            };
            assert!(registry.validate(object_type.id, id));

            let parent = object_type
                .parent_type()
                .and_then(|p| registry.get(p))
                .map(|p| if p.id_pattern == IdPattern::Integer { "55" } else { UUID });

            // A sub-route after the id must not hand the URL to another type,
            // except where the id is read from the last segment
            let reads_last_segment = matches!(object_type.extract, Some(ExtractConfig::FromEnd(_)));
            for parent_slot in [None, parent] {
                let url = registry.build_url("https://acme.example", object_type.id, id, parent_slot).unwrap();
                let mut urls = vec![url.clone()];
                if !reads_last_segment {
                    urls.push(format!("{}/details", url));
                }
                for url in urls {
                    let found = registry
                        .identify(&host(&url))
                        .unwrap_or_else(|| panic!("{} did not identify {}", url, object_type.id));
                    assert_eq!((found.type_id, found.id.as_str()), (object_type.id, id), "{}", url);
                }
            }
        }
    }

    #[test]
    fn test_extract_parent() {
        let registry = Registry::global();
        let url = host("https://acme.example/app-studio/55/pages/9876");
        assert_eq!(registry.extract_parent(ObjectTypeId::DataAppView, &url), Some("55".to_string()));

        let bare = host("https://acme.example/app-studio/pages/9876");
        assert_eq!(registry.extract_parent(ObjectTypeId::DataAppView, &bare), None);
    }

    #[test]
    fn test_templates_are_distinct() {
        let registry = Registry::global();
        let mut seen = std::collections::HashSet::new();
        for object_type in registry.all() {
            if let Some(template) = object_type.url_path {
                assert!(seen.insert(template), "{} shares {}", object_type.id, template);
            }
        }
        assert!(registry.all().len() > 60);
    }

    #[test]
    fn test_parent_from_query() {
        let registry = Registry::global();
        let url = host("https://acme.example/app-studio/pages/9876?appId=55");
        assert_eq!(registry.parent_from_query(ObjectTypeId::DataAppView, &url), Some("55".to_string()));

        let bad = host("https://acme.example/app-studio/pages/9876?appId=home");
        assert_eq!(registry.parent_from_query(ObjectTypeId::DataAppView, &bad), None);
        assert_eq!(registry.parent_from_query(ObjectTypeId::Page, &url), None);
    }

    #[test]
    fn test_types_accepting_uuid_skip_parent_bound_types() {
        let accepting = Registry::global().types_accepting(UUID);
        assert_eq!(accepting.first().map(|t| t.id), Some(ObjectTypeId::DataSource));
        assert!(accepting.iter().all(|t| !t.requires_parent_for_api()));
        assert!(accepting.iter().any(|t| t.id == ObjectTypeId::WorkflowInstance));
    }
}
