use crate::parsers::ContentType;

#[test]
fn test_different_file_extensions() {
    let types = [
        ("https://example.org/notes.txt", "", ContentType::Text),
        ("https://example.org/feed.yml", "", ContentType::Text),
        ("https://example.org/data.json?v=2", "{}", ContentType::Text),
        ("https://example.org/index.html", "", ContentType::Html),
        ("https://example.org/INDEX.HTM#top", "", ContentType::Html),
    ];

    for (url, body, expected) in types {
        assert_eq!(
            ContentType::detect(url, body),
            expected,
            "URL '{}' should be detected as {:?}",
            url,
            expected
        );
    }
}

#[test]
fn test_sniffs_body_without_extension() {
    let html = "  <!DOCTYPE html><html><body>Hi</body></html>";
    assert_eq!(
        ContentType::detect("https://example.org/page", html),
        ContentType::Html
    );
    assert_eq!(
        ContentType::detect("https://example.org/page", "just words"),
        ContentType::Text
    );
}

#[test]
fn test_selector_support() {
    assert!(ContentType::Html.supports_selectors());
    assert!(!ContentType::Text.supports_selectors());
}
