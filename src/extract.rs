use crate::error::ScanError;
use crate::page::{ContentMode, Page, Snapshot};
use crate::parsers::{ContentType, html, text};
use crate::results::FetchedDocument;

/// Joins matched fragments in text mode
pub const FRAGMENT_SEPARATOR: &str = "\n";

/// Produces the comparable content of a document for one page's settings
#[derive(Debug, Clone)]
pub struct ContentExtractor<'a> {
    selectors: &'a str,
    partial_scan: bool,
    content_mode: ContentMode,
    ignore_numbers: bool,
}

impl<'a> ContentExtractor<'a> {
    pub fn new(selectors: &'a str, partial_scan: bool, content_mode: ContentMode) -> Self {
        Self {
            selectors,
            partial_scan,
            content_mode,
            ignore_numbers: false,
        }
    }

    pub fn for_page(page: &'a Page) -> Self {
        Self::new(&page.selectors, page.partial_scan, page.content_mode)
            .with_ignore_numbers(page.ignore_numbers)
    }

    pub fn with_ignore_numbers(mut self, ignore_numbers: bool) -> Self {
        self.ignore_numbers = ignore_numbers;
        self
    }

    /// Whether extraction is restricted to selector matches
    ///
    /// An empty selector list scans the whole document even with partial
    /// scan switched on.
    fn uses_selectors(&self) -> bool {
        self.partial_scan && !self.selectors.trim().is_empty()
    }

    pub fn extract(&self, document: &FetchedDocument) -> Result<Snapshot, ScanError> {
        if !self.uses_selectors() {
            return Ok(match self.content_mode {
                ContentMode::Text => Snapshot::text(self.finish_text(self.whole_text(document))),
                // Nothing to count without selectors
                ContentMode::Ignore => Snapshot::count(1),
            });
        }

        if !document.content_type.supports_selectors() {
            return Err(ScanError::Extraction(format!(
                "{} is not HTML, selectors `{}` cannot be applied",
                document.url, self.selectors
            )));
        }

        let selector = html::parse_selectors(self.selectors)?;
        let snapshot = match self.content_mode {
            ContentMode::Text => {
                let texts = html::matched_texts(&document.body, &selector);
                let count = texts.len();
                let joined = texts
                    .into_iter()
                    .map(|fragment| self.finish_text(fragment))
                    .collect::<Vec<_>>()
                    .join(FRAGMENT_SEPARATOR);
                Snapshot::matched_text(joined, count)
            }
            ContentMode::Ignore => Snapshot::count(html::match_count(&document.body, &selector)),
        };

        ::log::debug!(
            "Extracted {} snapshot from {} using `{}`",
            snapshot.kind(),
            document.url,
            self.selectors
        );
        Ok(snapshot)
    }

    fn whole_text(&self, document: &FetchedDocument) -> String {
        match document.content_type {
            ContentType::Html => html::document_text(&document.body),
            ContentType::Text => text::normalize(&document.body),
        }
    }

    fn finish_text(&self, value: String) -> String {
        if self.ignore_numbers {
            text::strip_numbers(&value)
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div id="news"><p class="story">Rain expected</p><p class="story">Roads closed</p></div>
        <p class="footer">Visitors: 1532</p>
    </body></html>"#;

    fn doc() -> FetchedDocument {
        FetchedDocument::html("https://example.com/news", PAGE)
    }

    #[test]
    fn test_whole_document_text() {
        let snapshot = ContentExtractor::new("", false, ContentMode::Text)
            .extract(&doc())
            .unwrap();
        assert_eq!(
            snapshot,
            Snapshot::text("Rain expected Roads closed Visitors: 1532")
        );
    }

    #[test]
    fn test_whole_document_ignore_is_constant() {
        let snapshot = ContentExtractor::new("", false, ContentMode::Ignore)
            .extract(&doc())
            .unwrap();
        assert_eq!(snapshot, Snapshot::count(1));
    }

    #[test]
    fn test_selectors_unused_without_partial_scan() {
        let result = ContentExtractor::new("p[[", false, ContentMode::Text).extract(&doc());
        assert!(result.is_ok());
    }

    #[test]
    fn test_partial_text_joins_matches() {
        let snapshot = ContentExtractor::new("p.story", true, ContentMode::Text)
            .extract(&doc())
            .unwrap();
        assert_eq!(
            snapshot,
            Snapshot::matched_text("Rain expected\nRoads closed", 2)
        );
    }

    #[test]
    fn test_partial_count() {
        let snapshot = ContentExtractor::new("p", true, ContentMode::Ignore)
            .extract(&doc())
            .unwrap();
        assert_eq!(snapshot, Snapshot::count(3));
    }

    #[test]
    fn test_invalid_selector_with_partial_scan() {
        let result = ContentExtractor::new("p[[", true, ContentMode::Text).extract(&doc());
        assert!(matches!(result, Err(ScanError::SelectorSyntax { .. })));
    }

    #[test]
    fn test_empty_selectors_scan_whole_document() {
        let snapshot = ContentExtractor::new("  ", true, ContentMode::Text)
            .extract(&doc())
            .unwrap();
        assert_eq!(snapshot.kind(), "text");
    }

    #[test]
    fn test_selectors_on_plain_text_fail() {
        let document = FetchedDocument::new(
            "https://example.com/notes.txt",
            None,
            "plain words".to_string(),
        );
        let result = ContentExtractor::new("p", true, ContentMode::Text).extract(&document);
        assert!(matches!(result, Err(ScanError::Extraction(_))));
    }

    #[test]
    fn test_ignore_numbers() {
        let snapshot = ContentExtractor::new(".footer", true, ContentMode::Text)
            .with_ignore_numbers(true)
            .extract(&doc())
            .unwrap();
        assert_eq!(snapshot, Snapshot::matched_text("Visitors:", 1));
    }
}
