/// Identifier and URL codec: instance extraction, path templates, id patterns
use crate::error::{Result, ToolkitError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// A URL on the host site, broken into the parts detection cares about
#[derive(Debug, Clone, PartialEq)]
pub struct HostUrl {
    /// `scheme://host[:port]` without a trailing slash
    pub origin: String,
    /// Left-most DNS label of the host
    pub instance: String,
    /// Non-empty path segments
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl HostUrl {
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parse a URL and return it only when it belongs to one of the host domains
///
/// Algorithm:
/// 1. Parse with the `url` crate; only http(s) schemes qualify
/// 2. Lowercase the hostname
/// 3. The hostname must end with `.<domain>` for one of `host_domains`
/// 4. The instance is the left-most label of the hostname
///
/// Examples (host domain `domo.com`):
/// - https://acme.domo.com/page/1 → instance "acme"
/// - https://acme.eu.domo.com/ → instance "acme"
/// - https://domo.com/ → not a host page
pub fn parse_host_url(url: &str, host_domains: &[String]) -> Option<HostUrl> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let hostname = parsed.host_str()?.to_lowercase();
    let on_host = host_domains.iter().any(|domain| {
        let domain = domain.trim_start_matches('.').to_lowercase();
        hostname.len() > domain.len() + 1 && hostname.ends_with(&format!(".{}", domain))
    });
    if !on_host {
        return None;
    }

    let instance = hostname.split('.').next()?.to_string();
    if instance.is_empty() {
        return None;
    }

    let segments = parsed
        .path_segments()
        .map(|parts| parts.filter(|s| !s.is_empty()).map(String::from).collect())
        .unwrap_or_default();

    let query = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Some(HostUrl {
        origin: parsed.origin().ascii_serialization(),
        instance,
        segments,
        query,
    })
}

/// Shape of a platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdPattern {
    /// A run of ASCII digits
    Integer,
    /// Canonical hyphenated UUID (8-4-4-4-12)
    Uuid,
}

impl IdPattern {
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            IdPattern::Integer => {
                !candidate.is_empty()
                    && candidate.len() <= 19
                    && candidate.bytes().all(|b| b.is_ascii_digit())
            }
            IdPattern::Uuid => {
                candidate.len() == 36
                    && candidate.as_bytes()[8] == b'-'
                    && uuid::Uuid::try_parse(candidate).is_ok()
            }
        }
    }

    /// Classify a free-form value (e.g. clipboard text) by the pattern it satisfies
    pub fn classify(candidate: &str) -> Option<IdPattern> {
        [IdPattern::Integer, IdPattern::Uuid]
            .into_iter()
            .find(|pattern| pattern.matches(candidate))
    }
}

/// How to recover an identifier from URL path segments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractConfig {
    /// Find the segment equal to `keyword`, take the one `offset` positions later
    Keyword { keyword: &'static str, offset: usize },
    /// Index from the last segment; offset 0 is the last segment
    FromEnd(usize),
}

impl ExtractConfig {
    pub fn extract<'a>(&self, segments: &'a [String]) -> Option<&'a str> {
        match *self {
            ExtractConfig::Keyword { keyword, offset } => {
                let position = segments.iter().position(|s| s == keyword)?;
                segments.get(position + offset).map(String::as_str)
            }
            ExtractConfig::FromEnd(offset) => {
                let index = segments.len().checked_sub(offset + 1)?;
                segments.get(index).map(String::as_str)
            }
        }
    }
}

const ID_SLOT: &str = "{id}";
const PARENT_SLOT: &str = "{parent}";

/// Identifiers captured by a URL template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatch {
    pub id: String,
    pub parent: Option<String>,
}

/// Match a path template such as `app-studio/{parent}/pages/{id}` against URL segments
///
/// The template must match a prefix of the segments; trailing segments are allowed.
/// A `{parent}` slot is optional: when the full template does not match, the
/// template is retried with that segment removed.
pub fn match_template(template: &str, segments: &[String]) -> Option<TemplateMatch> {
    let parts: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(found) = match_parts(&parts, segments) {
        return Some(found);
    }

    if parts.contains(&PARENT_SLOT) {
        let without_parent: Vec<&str> = parts.iter().copied().filter(|p| *p != PARENT_SLOT).collect();
        return match_parts(&without_parent, segments);
    }

    None
}

fn match_parts(parts: &[&str], segments: &[String]) -> Option<TemplateMatch> {
    if segments.len() < parts.len() {
        return None;
    }

    let mut id = None;
    let mut parent = None;
    for (part, segment) in parts.iter().zip(segments) {
        match *part {
            ID_SLOT => id = Some(segment.clone()),
            PARENT_SLOT => parent = Some(segment.clone()),
            literal if literal == segment => {}
            _ => return None,
        }
    }

    id.map(|id| TemplateMatch { id, parent })
}

/// Build a URL path from a template; a missing parent drops the `{parent}` segment
pub fn build_path(template: &str, id: &str, parent: Option<&str>) -> String {
    template
        .split('/')
        .filter(|s| !s.is_empty())
        .filter_map(|part| match part {
            ID_SLOT => Some(id),
            PARENT_SLOT => parent,
            literal => Some(literal),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand `{id}` and `{parent}` slots in an endpoint or body template
pub fn expand_template(template: &str, id: &str, parent: Option<&str>) -> Result<String> {
    let expanded = template.replace(ID_SLOT, id);
    if expanded.contains(PARENT_SLOT) {
        let parent = parent.ok_or(ToolkitError::MissingParent)?;
        return Ok(expanded.replace(PARENT_SLOT, parent));
    }
    Ok(expanded)
}

/// Walk a dotted path (`cards.0.id`) through a JSON value; numeric segments index arrays
pub fn walk_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            Value::Object(map) => map.get(segment),
            _ => None,
        })
}

/// Render a scalar JSON value as display text
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON representation of an identifier: numbers stay numbers
pub fn id_value(id: &str) -> Value {
    id.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}
