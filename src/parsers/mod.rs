pub mod html;
pub mod text;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

/// Kind of document returned by a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// HTML document, selectors apply
    Html,
    /// Plain text (txt, yaml, json, ...), compared as a whole
    Text,
}

impl ContentType {
    /// Determines the content type from the URL and, failing that, the body
    pub fn detect(url: &str, body: &str) -> Self {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or(url)
            .to_ascii_lowercase();

        if path.ends_with(".txt")
            || path.ends_with(".yaml")
            || path.ends_with(".yml")
            || path.ends_with(".json")
            || path.ends_with(".csv")
        {
            ::log::debug!("Classifying as Text: {}", url);
            return ContentType::Text;
        }

        if path.ends_with(".html") || path.ends_with(".htm") || looks_like_html(body) {
            ::log::debug!("Classifying as HTML: {}", url);
            ContentType::Html
        } else {
            ::log::debug!("Classifying as Text (no markup): {}", url);
            ContentType::Text
        }
    }

    pub fn supports_selectors(&self) -> bool {
        matches!(self, ContentType::Html)
    }
}

/// Cheap sniff for markup at the start of a document
fn looks_like_html(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(256)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html")
        || head.starts_with("<html")
        || head.contains("<head")
        || head.contains("<body")
}
