use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a scan compares text or only the number of selector matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// Compare textual content
    #[default]
    Text,
    /// Compare presence/count only, content is never diffed
    Ignore,
}

/// Result of the most recent completed scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStatus {
    #[default]
    Unknown,
    NoChange,
    Changed,
    Error,
}

/// Comparable content captured by a scan
///
/// Stored as the page's `lastContent` and replaced wholesale after each
/// completed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Snapshot {
    /// Text content, with the number of selector matches it was built from
    #[serde(rename_all = "camelCase")]
    Text {
        value: String,
        #[serde(default)]
        match_count: Option<usize>,
    },
    /// Number of selector matches
    Count { value: usize },
}

impl Snapshot {
    pub fn text(value: impl Into<String>) -> Self {
        Snapshot::Text {
            value: value.into(),
            match_count: None,
        }
    }

    pub fn matched_text(value: impl Into<String>, match_count: usize) -> Self {
        Snapshot::Text {
            value: value.into(),
            match_count: Some(match_count),
        }
    }

    pub fn count(value: usize) -> Self {
        Snapshot::Count { value }
    }

    /// Short name of the snapshot kind, used in logs and diffs
    pub fn kind(&self) -> &'static str {
        match self {
            Snapshot::Text { .. } => "text",
            Snapshot::Count { .. } => "count",
        }
    }

    /// Renders the snapshot as plain text for display
    pub fn to_display_string(&self) -> String {
        match self {
            Snapshot::Text { value, .. } => value.clone(),
            Snapshot::Count { value } => format!("{} matches", value),
        }
    }
}

/// One monitored web page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Identity of the page within a collection
    pub url: String,

    #[serde(default)]
    pub title: String,

    /// Raw selector list; empty means the whole document
    #[serde(default)]
    pub selectors: String,

    #[serde(default)]
    pub content_mode: ContentMode,

    /// Restrict extraction to `selectors` matches
    #[serde(default)]
    pub partial_scan: bool,

    /// Flag a change whenever the number of selector matches differs
    #[serde(default)]
    pub require_exact_match_count: bool,

    /// Character difference below which a change is not reported
    #[serde(default = "default_change_threshold")]
    pub change_threshold: u32,

    /// Minutes between automatic scans; 0 means manual scan only
    #[serde(default = "default_scan_rate_minutes")]
    pub scan_rate_minutes: u32,

    /// Drop numbers from text before comparing
    #[serde(default)]
    pub ignore_numbers: bool,

    #[serde(default)]
    pub last_content: Option<Snapshot>,

    #[serde(default)]
    pub status: ScanStatus,

    #[serde(default)]
    pub last_scan: Option<DateTime<Utc>>,

    #[serde(default)]
    pub error_reason: Option<String>,
}

/// Default change threshold in characters
fn default_change_threshold() -> u32 {
    100
}

/// Default scan rate (once a day)
fn default_scan_rate_minutes() -> u32 {
    24 * 60
}

impl Page {
    /// Create a page with default scan settings
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            selectors: String::new(),
            content_mode: ContentMode::Text,
            partial_scan: false,
            require_exact_match_count: false,
            change_threshold: default_change_threshold(),
            scan_rate_minutes: default_scan_rate_minutes(),
            ignore_numbers: false,
            last_content: None,
            status: ScanStatus::Unknown,
            last_scan: None,
            error_reason: None,
        }
    }

    /// Current configuration, detached from scan state
    pub fn settings(&self) -> PageSettings {
        PageSettings {
            url: self.url.clone(),
            title: self.title.clone(),
            selectors: self.selectors.clone(),
            content_mode: self.content_mode,
            partial_scan: self.partial_scan,
            require_exact_match_count: self.require_exact_match_count,
            change_threshold: self.change_threshold,
            scan_rate_minutes: self.scan_rate_minutes,
            ignore_numbers: self.ignore_numbers,
        }
    }

    /// Replace every configuration field at once; scan state is untouched
    pub fn apply_settings(&mut self, settings: PageSettings) {
        let PageSettings {
            url,
            title,
            selectors,
            content_mode,
            partial_scan,
            require_exact_match_count,
            change_threshold,
            scan_rate_minutes,
            ignore_numbers,
        } = settings;

        self.url = url;
        self.title = title;
        self.selectors = selectors;
        self.content_mode = content_mode;
        self.partial_scan = partial_scan;
        self.require_exact_match_count = require_exact_match_count;
        self.change_threshold = change_threshold;
        self.scan_rate_minutes = scan_rate_minutes;
        self.ignore_numbers = ignore_numbers;
    }
}

/// Page configuration passed by value between the settings surface and a monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub url: String,
    pub title: String,
    pub selectors: String,
    pub content_mode: ContentMode,
    pub partial_scan: bool,
    pub require_exact_match_count: bool,
    pub change_threshold: u32,
    pub scan_rate_minutes: u32,
    pub ignore_numbers: bool,
}

/// A named grouping of pages and nested folders
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageFolder {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub children: Vec<PageNode>,
}

/// Child of a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageNode {
    Page(Page),
    Folder(PageFolder),
}

impl PageFolder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            children: Vec::new(),
        }
    }

    pub fn add_page(&mut self, page: Page) {
        self.children.push(PageNode::Page(page));
    }

    pub fn add_folder(&mut self, folder: PageFolder) {
        self.children.push(PageNode::Folder(folder));
    }

    /// All pages in the tree, depth first
    pub fn pages(&self) -> Vec<&Page> {
        let mut pages = Vec::new();
        for child in &self.children {
            match child {
                PageNode::Page(page) => pages.push(page),
                PageNode::Folder(folder) => pages.extend(folder.pages()),
            }
        }
        pages
    }

    pub fn find_page_mut(&mut self, url: &str) -> Option<&mut Page> {
        for child in self.children.iter_mut() {
            let found = match child {
                PageNode::Page(page) if page.url == url => Some(page),
                PageNode::Page(_) => None,
                PageNode::Folder(folder) => folder.find_page_mut(url),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Remove a page anywhere in the tree
    pub fn remove_page(&mut self, url: &str) -> Option<Page> {
        if let Some(index) = self
            .children
            .iter()
            .position(|child| matches!(child, PageNode::Page(page) if page.url == url))
        {
            return match self.children.remove(index) {
                PageNode::Page(page) => Some(page),
                PageNode::Folder(_) => None,
            };
        }

        self.children.iter_mut().find_map(|child| match child {
            PageNode::Folder(folder) => folder.remove_page(url),
            PageNode::Page(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_page_defaults() {
        let page: Page =
            serde_json::from_str(r#"{"url": "https://example.com", "title": "Example"}"#).unwrap();

        assert_eq!(page.content_mode, ContentMode::Text);
        assert!(!page.partial_scan);
        assert!(!page.require_exact_match_count);
        assert_eq!(page.status, ScanStatus::Unknown);
        assert!(page.last_content.is_none());
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = serde_json::to_value(Snapshot::matched_text("a", 2)).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["matchCount"], 2);

        let json = serde_json::to_value(Snapshot::count(3)).unwrap();
        assert_eq!(json["kind"], "count");
        assert_eq!(json["value"], 3);
    }

    #[test]
    fn test_apply_settings_keeps_scan_state() {
        let mut page = Page::new("https://example.com", "Example");
        page.last_content = Some(Snapshot::text("baseline"));
        page.status = ScanStatus::NoChange;

        let mut settings = page.settings();
        settings.partial_scan = true;
        settings.selectors = "#main".to_string();
        page.apply_settings(settings);

        assert!(page.partial_scan);
        assert_eq!(page.selectors, "#main");
        assert_eq!(page.last_content, Some(Snapshot::text("baseline")));
        assert_eq!(page.status, ScanStatus::NoChange);
    }

    #[test]
    fn test_folder_tree_lookup() {
        let mut inner = PageFolder::new("News");
        inner.add_page(Page::new("https://a.example", "A"));
        let mut root = PageFolder::new("Root");
        root.add_page(Page::new("https://b.example", "B"));
        root.add_folder(inner);

        assert_eq!(root.pages().len(), 2);
        root.find_page_mut("https://a.example").unwrap().title = "Renamed".into();
        let removed = root.remove_page("https://a.example").unwrap();
        assert_eq!(removed.title, "Renamed");
        assert_eq!(root.pages().len(), 1);
        assert!(root.remove_page("https://missing.example").is_none());
    }
}
