use crate::curves::MANUAL_SCAN;
use crate::detect::{ChangeDetector, DiffArtifact, Outcome};
use crate::error::ScanError;
use crate::extract::ContentExtractor;
use crate::page::{Page, PageSettings, ScanStatus};
use crate::results::{FetchedDocument, Notification};
use chrono::{DateTime, Duration, Utc};

/// When a page should next be scanned automatically
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDue {
    /// Manual scan only
    Never,
    At(DateTime<Utc>),
}

impl ScanDue {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self {
            ScanDue::Never => false,
            ScanDue::At(at) => *at <= now,
        }
    }
}

/// What one completed scan did to a page
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub url: String,
    pub previous_status: ScanStatus,
    pub status: ScanStatus,
    pub diff: Option<DiffArtifact>,
    pub error: Option<ScanError>,
}

impl ScanReport {
    /// Event for the notification collaborator, if this scan warrants one
    ///
    /// Every detected change is reported; errors only on entering the
    /// error state, so a page failing on each retry is reported once.
    pub fn notification(&self, title: &str) -> Option<Notification> {
        match self.status {
            ScanStatus::Changed => Some(Notification::Changed {
                url: self.url.clone(),
                title: title.to_string(),
                diff: self.diff.clone().unwrap_or_default(),
            }),
            ScanStatus::Error if self.previous_status != ScanStatus::Error => {
                Some(Notification::Error {
                    url: self.url.clone(),
                    title: title.to_string(),
                    reason: self
                        .error
                        .as_ref()
                        .map(|e| e.to_string())
                        .unwrap_or_default(),
                })
            }
            _ => None,
        }
    }
}

/// Live monitoring state of one page
#[derive(Debug, Clone)]
pub struct PageMonitor {
    page: Page,
}

impl PageMonitor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    /// Run extraction and detection against a fetch result
    ///
    /// Failures never escape: they set the status to `Error`, keep the
    /// reason, and leave `last_content` as the last good baseline.
    pub fn scan_once(
        &mut self,
        fetched: Result<FetchedDocument, ScanError>,
        now: DateTime<Utc>,
    ) -> ScanReport {
        let previous_status = self.page.status;
        self.page.last_scan = Some(now);

        let snapshot = fetched.and_then(|document| {
            if self.page.title.is_empty() {
                if let Some(title) = &document.title {
                    self.page.title = title.clone();
                }
            }
            ContentExtractor::for_page(&self.page).extract(&document)
        });

        let snapshot = match snapshot {
            Ok(snapshot) => snapshot,
            Err(e) => {
                ::log::warn!("Scan of {} failed: {}", self.page.url, e);
                self.page.status = ScanStatus::Error;
                self.page.error_reason = Some(e.to_string());
                return ScanReport {
                    url: self.page.url.clone(),
                    previous_status,
                    status: ScanStatus::Error,
                    diff: None,
                    error: Some(e),
                };
            }
        };

        let detection =
            ChangeDetector::for_page(&self.page).detect(self.page.last_content.as_ref(), &snapshot);

        self.page.last_content = Some(snapshot);
        self.page.status = detection.outcome.into();
        self.page.error_reason = None;
        if detection.outcome == Outcome::Changed {
            ::log::info!("Change detected on {}", self.page.url);
        } else {
            ::log::debug!("No change on {}", self.page.url);
        }

        ScanReport {
            url: self.page.url.clone(),
            previous_status,
            status: self.page.status,
            diff: detection.diff,
            error: None,
        }
    }

    pub fn next_scan_due_at(&self, now: DateTime<Utc>) -> ScanDue {
        if self.page.scan_rate_minutes == MANUAL_SCAN {
            return ScanDue::Never;
        }
        match self.page.last_scan {
            None => ScanDue::At(now),
            Some(last) => {
                ScanDue::At(last + Duration::minutes(i64::from(self.page.scan_rate_minutes)))
            }
        }
    }

    /// Replace the page configuration; the baseline is kept
    pub fn update_config(&mut self, settings: PageSettings) {
        ::log::debug!("Updating settings for {}", self.page.url);
        self.page.apply_settings(settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{ContentMode, Snapshot};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn html(body: &str) -> Result<FetchedDocument, ScanError> {
        Ok(FetchedDocument::html(
            "https://example.com",
            &format!("<html><body>{}</body></html>", body),
        ))
    }

    fn text_page(threshold: u32) -> PageMonitor {
        let mut page = Page::new("https://example.com", "Example");
        page.change_threshold = threshold;
        PageMonitor::new(page)
    }

    #[test]
    fn test_first_scan_establishes_baseline() {
        let mut monitor = text_page(0);
        let report = monitor.scan_once(html("<p>Hello</p>"), now());
        assert_eq!(report.status, ScanStatus::NoChange);
        assert_eq!(monitor.page().last_content, Some(Snapshot::text("Hello")));
        assert!(report.notification("Example").is_none());
    }

    #[test]
    fn test_untitled_page_takes_document_title() {
        let mut monitor = PageMonitor::new(Page::new("https://example.com", ""));
        let document = FetchedDocument::new(
            "https://example.com",
            Some("Example Domain".to_string()),
            "<html><body><p>Hello</p></body></html>".to_string(),
        );
        monitor.scan_once(Ok(document), now());
        assert_eq!(monitor.page().title, "Example Domain");

        // An existing title is kept
        let document = FetchedDocument::new(
            "https://example.com",
            Some("Renamed".to_string()),
            "<html><body><p>Hello</p></body></html>".to_string(),
        );
        monitor.scan_once(Ok(document), now());
        assert_eq!(monitor.page().title, "Example Domain");
    }

    #[test]
    fn test_threshold_applies_between_scans() {
        let mut monitor = text_page(10);
        monitor.scan_once(html("<p>Hello world</p>"), now());

        let report = monitor.scan_once(html("<p>Hello world!</p>"), now());
        assert_eq!(report.status, ScanStatus::NoChange);

        let report = monitor.scan_once(html("<p>Completely different content here</p>"), now());
        assert_eq!(report.status, ScanStatus::Changed);
        assert!(report.diff.is_some());
        assert!(matches!(
            report.notification("Example"),
            Some(Notification::Changed { .. })
        ));
    }

    #[test]
    fn test_count_only_change() {
        let mut page = Page::new("https://example.com", "Example");
        page.partial_scan = true;
        page.require_exact_match_count = true;
        page.content_mode = ContentMode::Ignore;
        page.selectors = "li".to_string();
        page.change_threshold = 1000;
        let mut monitor = PageMonitor::new(page);

        monitor.scan_once(html("<li>a</li><li>b</li><li>c</li>"), now());
        let report = monitor.scan_once(html("<li>a</li><li>b</li><li>c</li><li>d</li>"), now());
        assert_eq!(report.status, ScanStatus::Changed);
    }

    #[test]
    fn test_exact_match_count_drop() {
        let mut page = Page::new("https://example.com", "Example");
        page.partial_scan = true;
        page.require_exact_match_count = true;
        page.selectors = "p".to_string();
        page.change_threshold = 1000;
        let mut monitor = PageMonitor::new(page);

        // Only empty paragraphs disappear, the text barely moves
        monitor.scan_once(html("<p>news</p><p></p><p></p><p></p><p></p>"), now());
        let report = monitor.scan_once(html("<p>news</p><p></p><p></p><p></p>"), now());
        assert_eq!(report.status, ScanStatus::Changed);
        let diff = report.diff.unwrap();
        assert_eq!((diff.old_count, diff.new_count), (Some(5), Some(4)));
    }

    #[test]
    fn test_failed_fetch_keeps_baseline() {
        let mut monitor = text_page(0);
        monitor.scan_once(html("<p>Before</p>"), now());

        let report = monitor.scan_once(
            Err(ScanError::fetch("https://example.com", "connection refused")),
            now(),
        );
        assert_eq!(report.status, ScanStatus::Error);
        assert_eq!(monitor.page().status, ScanStatus::Error);
        assert_eq!(monitor.page().last_content, Some(Snapshot::text("Before")));
        assert!(monitor.page().error_reason.is_some());
        assert!(matches!(
            report.notification("Example"),
            Some(Notification::Error { .. })
        ));

        // Repeated failure is not reported again
        let report = monitor.scan_once(
            Err(ScanError::fetch("https://example.com", "connection refused")),
            now(),
        );
        assert!(report.notification("Example").is_none());

        // Recovery compares against the pre-failure baseline
        let report = monitor.scan_once(html("<p>After</p>"), now());
        assert_eq!(report.status, ScanStatus::Changed);
        assert!(monitor.page().error_reason.is_none());
    }

    #[test]
    fn test_selector_error_becomes_error_status() {
        let mut page = Page::new("https://example.com", "Example");
        page.partial_scan = true;
        page.selectors = "div[[".to_string();
        let mut monitor = PageMonitor::new(page);

        let report = monitor.scan_once(html("<div>x</div>"), now());
        assert_eq!(report.status, ScanStatus::Error);
        assert!(matches!(report.error, Some(ScanError::SelectorSyntax { .. })));
        assert!(monitor.page().last_content.is_none());
    }

    #[test]
    fn test_next_scan_due() {
        let mut monitor = text_page(0);
        assert_eq!(monitor.next_scan_due_at(now()), ScanDue::At(now()));

        monitor.scan_once(html("<p>x</p>"), now());
        let due = monitor.next_scan_due_at(now());
        assert_eq!(due, ScanDue::At(now() + Duration::days(1)));
        assert!(!due.is_due(now()));

        let mut settings = monitor.page().settings();
        settings.scan_rate_minutes = MANUAL_SCAN;
        monitor.update_config(settings);
        assert_eq!(monitor.next_scan_due_at(now()), ScanDue::Never);
    }

    #[test]
    fn test_config_change_keeps_baseline() {
        let mut monitor = text_page(0);
        monitor.scan_once(html("<p id=\"a\">Same</p>"), now());

        let mut settings = monitor.page().settings();
        settings.change_threshold = 50;
        monitor.update_config(settings);
        assert!(monitor.page().last_content.is_some());

        let report = monitor.scan_once(html("<p id=\"a\">Same</p>"), now());
        assert_eq!(report.status, ScanStatus::NoChange);
    }

    #[test]
    fn test_mode_change_forces_change() {
        let mut monitor = text_page(0);
        monitor.scan_once(html("<p>Same</p>"), now());

        let mut settings = monitor.page().settings();
        settings.partial_scan = true;
        settings.require_exact_match_count = true;
        settings.content_mode = ContentMode::Ignore;
        settings.selectors = "p".to_string();
        monitor.update_config(settings);

        let report = monitor.scan_once(html("<p>Same</p>"), now());
        assert_eq!(report.status, ScanStatus::Changed);
    }
}
