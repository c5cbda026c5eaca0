use crate::detect::DiffArtifact;
use crate::parsers::ContentType;
use serde::{Deserialize, Serialize};

/// Raw document returned by a fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    /// URL the document was fetched from
    pub url: String,

    /// Title of the page (if available)
    pub title: Option<String>,

    /// Page source
    pub body: String,

    pub content_type: ContentType,
}

impl FetchedDocument {
    /// Create a document, detecting its content type from the URL and body
    pub fn new(url: &str, title: Option<String>, body: String) -> Self {
        let content_type = ContentType::detect(url, &body);
        Self {
            url: url.to_string(),
            title,
            body,
            content_type,
        }
    }

    pub fn html(url: &str, body: &str) -> Self {
        Self {
            url: url.to_string(),
            title: None,
            body: body.to_string(),
            content_type: ContentType::Html,
        }
    }
}

/// Event delivered to the notification collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum Notification {
    /// A scan detected a reportable change
    Changed {
        url: String,
        title: String,
        diff: DiffArtifact,
    },
    /// The page went into error
    Error {
        url: String,
        title: String,
        reason: String,
    },
}
