/// Instance cookie clearing
///
/// Every instance of the host site shares the parent domain, so cookies from
/// many instances pile up on each request until the host answers 431. Clearing
/// is scoped either to one instance, to everything except the most recently
/// used instances, or to every host cookie.
use crate::env::CookieJar;
use crate::error::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A browser cookie, in the shape the cookies API reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub store_id: Option<String>,
}

fn root_path() -> String {
    "/".to_string()
}

impl Cookie {
    pub fn new(name: &str, domain: &str, secure: bool) -> Self {
        Cookie {
            name: name.to_string(),
            domain: domain.to_string(),
            path: root_path(),
            secure,
            store_id: None,
        }
    }

    /// The URL the cookies API needs to remove this cookie
    pub fn removal_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.domain.trim_start_matches('.'), self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CookieClearMode {
    /// Clear automatically when the host answers 431
    #[default]
    Auto,
    /// Manual clear that keeps the two most recently active instances
    #[serde(rename = "preserve-last-2")]
    PreserveLast2,
    /// Manual clear of every host cookie
    All,
}

/// Which cookies a clear removes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "instances", rename_all = "camelCase")]
pub enum ClearScope {
    /// Only cookies belonging to these instances
    Instances(Vec<String>),
    /// Instance cookies except those of these instances; host-wide cookies stay
    AllExcept(Vec<String>),
    /// Every host cookie, host-wide ones included
    All,
}

/// Who a host cookie belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieOwner {
    Instance(String),
    /// Set on the host domain itself (`.domo.com`)
    HostWide,
    Foreign,
}

/// Classify a cookie domain against the host domain
///
/// Examples (host domain `domo.com`):
/// - `.acme.domo.com` → Instance("acme") (wildcard form)
/// - `acme.domo.com` → Instance("acme")
/// - `acme.eu.domo.com` → Instance("acme")
/// - `.domo.com` → HostWide
pub fn cookie_owner(cookie_domain: &str, host_domain: &str) -> CookieOwner {
    let domain = cookie_domain.trim_start_matches('.').to_lowercase();
    let host = host_domain.trim_start_matches('.').to_lowercase();

    if domain == host {
        return CookieOwner::HostWide;
    }

    match domain.strip_suffix(&format!(".{}", host)) {
        Some(prefix) => prefix
            .split('.')
            .next()
            .filter(|label| !label.is_empty())
            .map(|label| CookieOwner::Instance(label.to_string()))
            .unwrap_or(CookieOwner::Foreign),
        None => CookieOwner::Foreign,
    }
}

impl ClearScope {
    pub fn removes(&self, owner: &CookieOwner) -> bool {
        match (self, owner) {
            (_, CookieOwner::Foreign) => false,
            (ClearScope::All, _) => true,
            (ClearScope::Instances(targets), CookieOwner::Instance(name)) => targets.contains(name),
            (ClearScope::AllExcept(kept), CookieOwner::Instance(name)) => !kept.contains(name),
            (_, CookieOwner::HostWide) => false,
        }
    }
}

/// Partition cookies into (remove, keep) for a scope
pub fn plan_clear<'a>(cookies: &'a [Cookie], host_domain: &str, scope: &ClearScope) -> (Vec<&'a Cookie>, Vec<&'a Cookie>) {
    cookies
        .iter()
        .partition(|cookie| scope.removes(&cookie_owner(&cookie.domain, host_domain)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearReport {
    pub removed: usize,
    pub retained: usize,
    pub failed: usize,
}

/// Remove host cookies matching `scope`; one failed removal does not stop the rest
pub async fn clear_cookies<J: CookieJar + ?Sized>(jar: &J, host_domain: &str, scope: &ClearScope) -> Result<ClearReport> {
    let cookies = jar.list_cookies(host_domain).await?;
    let (remove, keep) = plan_clear(&cookies, host_domain, scope);

    let mut report = ClearReport {
        retained: keep.len(),
        ..ClearReport::default()
    };

    for cookie in remove {
        match jar.remove_cookie(&cookie.removal_url(), &cookie.name, cookie.store_id.as_deref()).await {
            Ok(()) => report.removed += 1,
            Err(err) => {
                warn!("could not remove cookie {} on {}: {}", cookie.name, cookie.domain, err);
                report.failed += 1;
            }
        }
    }

    info!(
        "cleared {} cookies on {} ({} kept, {} failed)",
        report.removed, host_domain, report.retained, report.failed
    );
    Ok(report)
}

/// Instances ordered by most recent activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentInstances {
    order: VecDeque<String>,
}

const RECENT_INSTANCE_LIMIT: usize = 16;

impl RecentInstances {
    pub fn from_list(instances: Vec<String>) -> Self {
        let mut recent = RecentInstances::default();
        for instance in instances.into_iter().rev() {
            recent.touch(&instance);
        }
        recent
    }

    /// Mark an instance as the most recently active
    pub fn touch(&mut self, instance: &str) {
        self.order.retain(|known| known != instance);
        self.order.push_front(instance.to_string());
        self.order.truncate(RECENT_INSTANCE_LIMIT);
    }

    pub fn most_recent(&self, n: usize) -> Vec<String> {
        self.order.iter().take(n).cloned().collect()
    }

    pub fn to_list(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::testing::FakeEnv;
    use futures::executor::block_on;

    const HOST: &str = "domo.com";

    #[test]
    fn test_cookie_owner() {
        assert_eq!(cookie_owner(".acme.domo.com", HOST), CookieOwner::Instance("acme".to_string()));
        assert_eq!(cookie_owner("acme.domo.com", HOST), CookieOwner::Instance("acme".to_string()));
        assert_eq!(cookie_owner("acme.eu.domo.com", HOST), CookieOwner::Instance("acme".to_string()));
        assert_eq!(cookie_owner(".domo.com", HOST), CookieOwner::HostWide);
        assert_eq!(cookie_owner(".google.com", HOST), CookieOwner::Foreign);
        assert_eq!(cookie_owner("notdomo.com", HOST), CookieOwner::Foreign);
    }

    #[test]
    fn test_removal_url() {
        let mut secure = Cookie::new("DA-SID", ".acme.domo.com", true);
        secure.path = "/api".to_string();
        assert_eq!(secure.removal_url(), "https://acme.domo.com/api");

        let plain = Cookie::new("pref", "beta.domo.com", false);
        assert_eq!(plain.removal_url(), "http://beta.domo.com/");
    }

    #[test]
    fn test_scope_instances_includes_wildcard_form() {
        let cookies = vec![
            Cookie::new("a", ".acme.domo.com", true),
            Cookie::new("b", "acme.domo.com", true),
            Cookie::new("c", "beta.domo.com", true),
            Cookie::new("d", ".domo.com", true),
        ];
        let (remove, keep) = plan_clear(&cookies, HOST, &ClearScope::Instances(vec!["acme".to_string()]));
        assert_eq!(remove.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(keep.len(), 2);
    }

    #[test]
    fn test_scope_all_removes_host_wide() {
        let cookies = vec![Cookie::new("d", ".domo.com", true), Cookie::new("g", ".google.com", true)];
        let (remove, keep) = plan_clear(&cookies, HOST, &ClearScope::All);
        assert_eq!(remove.len(), 1);
        assert_eq!(keep[0].name, "g");
    }

    #[test]
    fn test_clear_keeps_two_most_recent_instances() {
        let env = FakeEnv::new();
        for (name, domain) in [("a", ".acme.domo.com"), ("b", ".beta.domo.com"), ("g", ".gamma.domo.com"), ("o", "old.domo.com")] {
            env.add_cookie(Cookie::new(name, domain, true));
        }

        let mut recent = RecentInstances::default();
        for instance in ["old", "gamma", "beta", "acme"] {
            recent.touch(instance);
        }
        let scope = ClearScope::AllExcept(recent.most_recent(2));

        let report = block_on(clear_cookies(&env, HOST, &scope)).unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(report.retained, 2);
        let left: Vec<String> = env.cookies().into_iter().map(|c| c.name).collect();
        assert_eq!(left, vec!["a", "b"]);
        assert!(env.removed_cookies().contains(&("https://gamma.domo.com/".to_string(), "g".to_string())));
    }

    #[test]
    fn test_recent_instances_order() {
        let mut recent = RecentInstances::default();
        recent.touch("acme");
        recent.touch("beta");
        recent.touch("acme");

        assert_eq!(recent.most_recent(5), vec!["acme", "beta"]);
        assert_eq!(RecentInstances::from_list(recent.to_list()), recent);
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_value(CookieClearMode::PreserveLast2).unwrap(), "preserve-last-2");
        let mode: CookieClearMode = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(mode, CookieClearMode::All);
    }
}
