use crate::parsers::text;

#[test]
fn test_empty_text() {
    assert_eq!(text::normalize(""), "");
    assert_eq!(text::normalize("   \n   \t   \r\n   "), "");
}

#[test]
fn test_mixed_whitespace() {
    let input = "  Line 1  \n\n  Line 2  \t\r\n  Line 3  ";
    assert_eq!(text::normalize(input), "Line 1 Line 2 Line 3");
}

#[test]
fn test_reflowed_text_compares_equal() {
    let narrow = "The quick brown\nfox jumps over\nthe lazy dog.";
    let wide = "The quick brown fox jumps\nover the lazy dog.";
    assert_eq!(text::normalize(narrow), text::normalize(wide));
}

#[test]
fn test_normalize_whitespace_in_segment() {
    assert_eq!(
        text::normalize_whitespace_in_segment("Tabs\tand\tspaces"),
        "Tabs and spaces"
    );
    assert_eq!(text::normalize_whitespace_in_segment("   "), "");
}

#[test]
fn test_strip_numbers() {
    assert_eq!(
        text::strip_numbers("Visitors: 1,024 as of 12.05.2024 today"),
        "Visitors: as of today"
    );
    assert_eq!(text::strip_numbers("no digits here"), "no digits here");
}
