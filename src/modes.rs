use crate::error::ScanError;
use crate::page::{ContentMode, Page};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named bundle of scan settings offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanMode {
    /// Whole document, text compare
    Anywhere,
    /// Selector-scoped text compare, match count enforced
    InsideElements,
    /// Selector-scoped match count only
    CountOnly,
}

/// The scan-relevant fields a scan mode fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanModeDescriptor {
    pub mode: ScanMode,
    pub partial_scan: bool,
    pub require_exact_match_count: bool,
    pub content_mode: ContentMode,
}

impl ScanMode {
    pub const ALL: [ScanMode; 3] = [
        ScanMode::Anywhere,
        ScanMode::InsideElements,
        ScanMode::CountOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScanMode::Anywhere => "anywhere",
            ScanMode::InsideElements => "inside-elements",
            ScanMode::CountOnly => "count-only",
        }
    }

    /// Help text shown next to the mode picker
    pub fn description(&self) -> &'static str {
        match self {
            ScanMode::Anywhere => "",
            ScanMode::InsideElements => {
                "Check only inside selected elements using HTML elements selector."
            }
            ScanMode::CountOnly => {
                "Check only for change in number of HTML element matches. Content is ignored."
            }
        }
    }

    pub fn descriptor(&self) -> ScanModeDescriptor {
        let (partial_scan, require_exact_match_count, content_mode) = match self {
            ScanMode::Anywhere => (false, false, ContentMode::Text),
            ScanMode::InsideElements => (true, true, ContentMode::Text),
            ScanMode::CountOnly => (true, true, ContentMode::Ignore),
        };
        ScanModeDescriptor {
            mode: *self,
            partial_scan,
            require_exact_match_count,
            content_mode,
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScanMode {
    type Err = ScanError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ScanMode::ALL
            .into_iter()
            .find(|mode| mode.name() == name)
            .ok_or_else(|| ScanError::UnknownMode(name.to_string()))
    }
}

/// Look up the settings bundle for a mode name
pub fn describe(name: &str) -> Result<ScanModeDescriptor, ScanError> {
    Ok(name.parse::<ScanMode>()?.descriptor())
}

/// Find the canonical mode matching a set of scan fields
///
/// `anywhere` never looks at match counts, so it matches regardless of
/// `require_exact_match_count`. The selector-scoped modes require it set.
/// Combinations outside the three modes return `None`; callers pick the
/// default (usually `anywhere`).
pub fn classify(
    partial_scan: bool,
    require_exact_match_count: bool,
    content_mode: ContentMode,
) -> Option<ScanMode> {
    match (partial_scan, content_mode, require_exact_match_count) {
        (false, ContentMode::Text, _) => Some(ScanMode::Anywhere),
        (true, ContentMode::Text, true) => Some(ScanMode::InsideElements),
        (true, ContentMode::Ignore, true) => Some(ScanMode::CountOnly),
        _ => None,
    }
}

/// Classify a page, falling back to `anywhere`
pub fn classify_page(page: &Page) -> ScanMode {
    classify(
        page.partial_scan,
        page.require_exact_match_count,
        page.content_mode,
    )
    .unwrap_or(ScanMode::Anywhere)
}

/// Classify a descriptor's fields
pub fn classify_descriptor(descriptor: &ScanModeDescriptor) -> Option<ScanMode> {
    classify(
        descriptor.partial_scan,
        descriptor.require_exact_match_count,
        descriptor.content_mode,
    )
}
