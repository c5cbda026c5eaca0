use crate::error::ScanError;
use crate::parsers::text::normalize_whitespace_in_segment;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Elements whose text never counts as page content
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Parses a selector list, mapping failures to `SelectorSyntax`
pub fn parse_selectors(selectors: &str) -> Result<Selector, ScanError> {
    Selector::parse(selectors).map_err(|e| ScanError::SelectorSyntax {
        selector: selectors.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text of the document body, whitespace normalised
pub fn document_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let body = Selector::parse("body").ok().and_then(|s| doc.select(&s).next());
    let root = body.unwrap_or_else(|| doc.root_element());
    element_text(root)
}

/// Normalised text of every element matched by `selector`, in document order
///
/// Each element appears once even if the selector list matches it through
/// several of its selectors.
pub fn matched_texts(html: &str, selector: &Selector) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let texts = doc
        .select(selector)
        .filter(|element| seen.insert(element.id()))
        .map(element_text)
        .collect::<Vec<_>>();

    ::log::debug!("HTML selector matched {} elements", texts.len());
    texts
}

/// Number of distinct elements matched by `selector`
pub fn match_count(html: &str, selector: &Selector) -> usize {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    doc.select(selector)
        .filter(|element| seen.insert(element.id()))
        .count()
}

/// Text under an element, skipping scripts and styles
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            parts.push(&**text);
        }
    }
    normalize_whitespace_in_segment(&parts.join(" "))
}
