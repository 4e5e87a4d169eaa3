/// Error taxonomy and the user-facing toast policy
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ToolkitError>;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolkitError {
    #[error("the tab is no longer available")]
    NoTabContext,

    #[error("this page does not allow the extension to run")]
    InjectionForbidden,

    #[error("the host responded with HTTP {0}")]
    UpstreamHttp(u16),

    #[error("this object needs a parent identifier that is not known yet")]
    MissingParent,

    #[error("the page returned a value that cannot be transferred")]
    NotSerializable,

    #[error("page function failed: {0}")]
    PageError(String),

    #[error("'{id}' is not a valid {type_name} identifier")]
    Validation { type_name: String, id: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("favicon composition failed: {0}")]
    Favicon(String),
}

impl From<serde_json::Error> for ToolkitError {
    fn from(err: serde_json::Error) -> Self {
        ToolkitError::Serialization(err.to_string())
    }
}

impl ToolkitError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ToolkitError::UpstreamHttp(status) => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 431 Request Header Fields Too Large: too many cookies on the host
    pub fn is_header_overflow(&self) -> bool {
        self.status() == Some(431)
    }

    pub fn to_toast(&self) -> Toast {
        let (title, severity) = match self {
            ToolkitError::NoTabContext => ("Tab closed", Severity::Info),
            ToolkitError::InjectionForbidden => ("Not available here", Severity::Info),
            err if err.is_session_expired() => {
                return Toast::new(
                    "Session expired",
                    "Sign in to the instance again and retry.",
                    Severity::Warning,
                );
            }
            ToolkitError::UpstreamHttp(_) => ("Request failed", Severity::Danger),
            ToolkitError::MissingParent => ("Parent not resolved", Severity::Warning),
            ToolkitError::Validation { .. } => ("Invalid identifier", Severity::Warning),
            ToolkitError::NotSerializable
            | ToolkitError::PageError(_)
            | ToolkitError::Storage(_)
            | ToolkitError::Serialization(_)
            | ToolkitError::Favicon(_) => ("Something went wrong", Severity::Danger),
            ToolkitError::Unsupported(_) => ("Not supported", Severity::Info),
        };
        Toast::new(title, self.to_string(), severity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

/// Transient notice shown by UI surfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>, severity: Severity) -> Self {
        Toast {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_toast() {
        for status in [401, 403] {
            let toast = ToolkitError::UpstreamHttp(status).to_toast();
            assert_eq!(toast.title, "Session expired");
            assert_eq!(toast.severity, Severity::Warning);
        }
    }

    #[test]
    fn test_other_statuses_surface_verbatim() {
        let toast = ToolkitError::UpstreamHttp(500).to_toast();
        assert_eq!(toast.title, "Request failed");
        assert!(toast.description.contains("500"));
    }

    #[test]
    fn test_status_predicates() {
        assert!(ToolkitError::UpstreamHttp(404).is_not_found());
        assert!(ToolkitError::UpstreamHttp(431).is_header_overflow());
        assert!(!ToolkitError::MissingParent.is_session_expired());
        assert_eq!(ToolkitError::NoTabContext.status(), None);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(ToolkitError::UpstreamHttp(431)).unwrap();
        assert_eq!(json["code"], "UPSTREAM_HTTP");
        assert_eq!(json["detail"], 431);

        let back: ToolkitError = serde_json::from_value(json).unwrap();
        assert_eq!(back, ToolkitError::UpstreamHttp(431));
    }
}
