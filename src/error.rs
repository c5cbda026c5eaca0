use thiserror::Error;

/// Errors raised while configuring or scanning a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Scan mode name outside the closed set
    #[error("unknown scan mode: {0}")]
    UnknownMode(String),

    /// Curve ordinal outside the curve
    #[error("ordinal {index} is out of range (curve has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Selector list that could not be parsed while partial scan is on
    #[error("invalid selector `{selector}`: {reason}")]
    SelectorSyntax { selector: String, reason: String },

    /// Network or WebDriver failure
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Content that cannot be handled by the active scan settings
    #[error("cannot extract content: {0}")]
    Extraction(String),
}

impl ScanError {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        ScanError::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from loading or saving the page store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("page store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("page store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("page store version {0} is newer than this build understands")]
    UnsupportedVersion(u32),
}
