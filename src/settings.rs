/// User preferences kept in extension-local storage
use crate::cookies::CookieClearMode;
use crate::favicon::FaviconRule;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub favicon_rules: Vec<FaviconRule>,
    /// Instance used when a recognized clipboard id has no tab to open on
    pub default_instance: Option<String>,
    pub cookie_clear_mode: CookieClearMode,
    pub theme: Theme,
    /// Registrable domains whose subdomains are instances
    pub host_domains: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            favicon_rules: Vec::new(),
            default_instance: None,
            cookie_clear_mode: CookieClearMode::default(),
            theme: Theme::default(),
            host_domains: vec!["domo.com".to_string()],
        }
    }
}

impl Settings {
    /// The configured host domain `host` belongs to
    pub fn host_domain_for(&self, host: &str) -> Option<&str> {
        let host = host.trim_start_matches('.').to_lowercase();
        self.host_domains
            .iter()
            .map(String::as_str)
            .find(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }

    /// Origin of an instance on the first host domain
    pub fn instance_origin(&self, instance: &str) -> Option<String> {
        self.host_domains
            .first()
            .map(|domain| format!("https://{}.{}", instance, domain))
    }
}
