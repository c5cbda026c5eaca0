//! Model of the page settings form.
//!
//! The form is plain data: `reduce` applies one user edit, `render` derives
//! what the form should display, and `submit` turns the form back into
//! `PageSettings`. Values cross the boundary as curve ordinals and scan mode
//! names, never as shared state.

use crate::curves::{SCHEDULE_CURVE, THRESHOLD_CURVE};
use crate::error::ScanError;
use crate::modes::{self, ScanMode};
use crate::page::{ContentMode, Page, PageSettings};

/// Current values of the settings form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub title: String,
    pub url: String,
    pub selectors: String,
    pub scan_mode: ScanMode,
    /// Ordinal into the schedule curve
    pub autoscan: usize,
    /// Ordinal into the threshold curve
    pub threshold: usize,
    pub ignore_numbers: bool,
}

/// One edit made by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    Title(String),
    Url(String),
    Selectors(String),
    ScanMode(String),
    Autoscan(usize),
    Threshold(usize),
    IgnoreNumbers(bool),
}

/// What the form should show for a given state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub autoscan_max: usize,
    pub autoscan_description: &'static str,
    pub threshold_max: usize,
    pub threshold_enabled: bool,
    pub threshold_description: &'static str,
    pub threshold_subdescription: &'static str,
    pub scan_mode_description: &'static str,
    pub selectors_enabled: bool,
    pub selectors_placeholder: &'static str,
}

impl SettingsState {
    /// Fill the form from a page
    pub fn for_page(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            url: page.url.clone(),
            selectors: page.selectors.clone(),
            scan_mode: modes::classify_page(page),
            autoscan: SCHEDULE_CURVE.to_ordinal(page.scan_rate_minutes),
            threshold: THRESHOLD_CURVE.to_ordinal(page.change_threshold),
            ignore_numbers: page.ignore_numbers,
        }
    }

    /// Settings the form describes
    pub fn submit(&self) -> Result<PageSettings, ScanError> {
        let mode = self.scan_mode.descriptor();
        Ok(PageSettings {
            url: self.url.clone(),
            title: self.title.clone(),
            selectors: self.selectors.clone(),
            content_mode: mode.content_mode,
            partial_scan: mode.partial_scan,
            require_exact_match_count: mode.require_exact_match_count,
            change_threshold: THRESHOLD_CURVE.from_ordinal(self.threshold)?,
            scan_rate_minutes: SCHEDULE_CURVE.from_ordinal(self.autoscan)?,
            ignore_numbers: self.ignore_numbers,
        })
    }
}

/// Apply one edit to the form
///
/// Unknown mode names and out-of-range ordinals are rejected.
pub fn reduce(state: SettingsState, event: SettingsEvent) -> Result<SettingsState, ScanError> {
    let mut state = state;
    match event {
        SettingsEvent::Title(title) => state.title = title,
        SettingsEvent::Url(url) => state.url = url,
        SettingsEvent::Selectors(selectors) => state.selectors = selectors,
        SettingsEvent::ScanMode(name) => state.scan_mode = name.parse()?,
        SettingsEvent::Autoscan(ordinal) => {
            SCHEDULE_CURVE.entry(ordinal)?;
            state.autoscan = ordinal;
        }
        SettingsEvent::Threshold(ordinal) => {
            THRESHOLD_CURVE.entry(ordinal)?;
            state.threshold = ordinal;
        }
        SettingsEvent::IgnoreNumbers(ignore) => state.ignore_numbers = ignore,
    }
    Ok(state)
}

pub fn render(state: &SettingsState) -> SettingsView {
    let mode = state.scan_mode.descriptor();
    let autoscan = SCHEDULE_CURVE.entry(state.autoscan).ok();
    let threshold = THRESHOLD_CURVE.entry(state.threshold).ok();

    SettingsView {
        autoscan_max: SCHEDULE_CURVE.max_ordinal(),
        autoscan_description: autoscan.map(|e| e.description).unwrap_or_default(),
        threshold_max: THRESHOLD_CURVE.max_ordinal(),
        threshold_enabled: mode.content_mode == ContentMode::Text,
        threshold_description: threshold.map(|e| e.description).unwrap_or_default(),
        threshold_subdescription: threshold.map(|e| e.detail).unwrap_or_default(),
        scan_mode_description: state.scan_mode.description(),
        selectors_enabled: mode.partial_scan,
        selectors_placeholder: if mode.partial_scan {
            ""
        } else {
            "Selectors not available in \"Anywhere\" scan mode."
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SettingsState {
        let mut page = Page::new("https://example.com", "Example");
        page.scan_rate_minutes = 45;
        page.change_threshold = 10;
        SettingsState::for_page(&page)
    }

    #[test]
    fn test_for_page_maps_ordinals() {
        let state = state();
        assert_eq!(state.scan_mode, ScanMode::Anywhere);
        assert_eq!(state.autoscan, 3);
        assert_eq!(state.threshold, 1);
    }

    #[test]
    fn test_render_anywhere() {
        let view = render(&state());
        assert!(!view.selectors_enabled);
        assert!(view.threshold_enabled);
        assert_eq!(view.autoscan_description, "Scan every hour");
        assert_eq!(view.threshold_description, "Cosmetic changes are ignored");
        assert_eq!(view.autoscan_max, 7);
        assert_eq!(view.threshold_max, 5);
    }

    #[test]
    fn test_count_only_disables_threshold() {
        let state = reduce(state(), SettingsEvent::ScanMode("count-only".into())).unwrap();
        let view = render(&state);
        assert!(view.selectors_enabled);
        assert!(!view.threshold_enabled);
        assert_eq!(view.selectors_placeholder, "");
    }

    #[test]
    fn test_invalid_events_rejected() {
        assert_eq!(
            reduce(state(), SettingsEvent::ScanMode("bogus".into())),
            Err(ScanError::UnknownMode("bogus".into()))
        );
        assert!(reduce(state(), SettingsEvent::Autoscan(8)).is_err());
        assert!(reduce(state(), SettingsEvent::Threshold(6)).is_err());
    }

    #[test]
    fn test_submit_applies_mode_bundle() {
        let state = [
            SettingsEvent::ScanMode("inside-elements".into()),
            SettingsEvent::Selectors("#prices".into()),
            SettingsEvent::Autoscan(7),
            SettingsEvent::Threshold(0),
            SettingsEvent::IgnoreNumbers(true),
        ]
        .into_iter()
        .try_fold(state(), reduce)
        .unwrap();

        let settings = state.submit().unwrap();
        assert!(settings.partial_scan);
        assert!(settings.require_exact_match_count);
        assert_eq!(settings.content_mode, ContentMode::Text);
        assert_eq!(settings.selectors, "#prices");
        assert_eq!(settings.scan_rate_minutes, 0);
        assert_eq!(settings.change_threshold, 0);
        assert!(settings.ignore_numbers);
    }
}
