use crate::error::ScanError;

/// One step of a slider-style curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveEntry {
    pub value: u32,
    pub description: &'static str,
    pub detail: &'static str,
}

const fn entry(value: u32, description: &'static str, detail: &'static str) -> CurveEntry {
    CurveEntry {
        value,
        description,
        detail,
    }
}

/// Ordered discrete values addressed by ordinal
///
/// `to_ordinal` rounds up to the first entry at least as large as the
/// value and saturates at the last regular entry. A sentinel entry, if
/// present, is only reached by its exact value.
#[derive(Debug)]
pub struct Curve {
    entries: &'static [CurveEntry],
    sentinel: Option<usize>,
}

/// Character-count significance thresholds
pub const THRESHOLD_CURVE: Curve = Curve {
    entries: &[
        entry(0, "All changes are detected", ""),
        entry(
            10,
            "Cosmetic changes are ignored",
            "(less than about 10 characters)",
        ),
        entry(
            50,
            "Minor changes are ignored",
            "(less than about 50 characters)",
        ),
        entry(
            100,
            "Small changes are ignored",
            "(less than about 100 characters)",
        ),
        entry(
            500,
            "Medium changes are ignored",
            "(less than about 500 characters)",
        ),
        entry(
            1000,
            "Major changes are ignored",
            "(less than about 1000 characters)",
        ),
    ],
    sentinel: None,
};

/// Scan intervals in minutes, ending with the manual-only sentinel
pub const SCHEDULE_CURVE: Curve = Curve {
    entries: &[
        entry(5, "Scan every 5 minutes", ""),
        entry(15, "Scan every 15 minutes", ""),
        entry(30, "Scan every 30 minutes", ""),
        entry(60, "Scan every hour", ""),
        entry(6 * 60, "Scan every 6 hours", ""),
        entry(24 * 60, "Scan every day", ""),
        entry(7 * 24 * 60, "Scan every week", ""),
        entry(MANUAL_SCAN, "Manual scan only", ""),
    ],
    sentinel: Some(7),
};

/// Scan rate meaning "never scan automatically"
pub const MANUAL_SCAN: u32 = 0;

impl Curve {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest valid ordinal
    pub fn max_ordinal(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn sentinel(&self) -> Option<usize> {
        self.sentinel
    }

    pub fn entry(&self, index: usize) -> Result<&'static CurveEntry, ScanError> {
        self.entries.get(index).ok_or(ScanError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    pub fn from_ordinal(&self, index: usize) -> Result<u32, ScanError> {
        self.entry(index).map(|entry| entry.value)
    }

    pub fn to_ordinal(&self, value: u32) -> usize {
        if let Some(sentinel) = self.sentinel {
            if self.entries[sentinel].value == value {
                return sentinel;
            }
        }

        let mut last_regular = 0;
        for (index, entry) in self.entries.iter().enumerate() {
            if Some(index) == self.sentinel {
                continue;
            }
            if entry.value >= value {
                return index;
            }
            last_regular = index;
        }
        last_regular
    }
}
