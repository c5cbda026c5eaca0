use crate::page::{Page, ScanStatus, Snapshot};
use serde::{Deserialize, Serialize};
use similar::{Algorithm, ChangeTag, TextDiff};
use std::time::Duration;

/// Upper bound on time spent computing a character diff
///
/// Past the deadline `similar` falls back to a coarser diff, which can only
/// overstate the magnitude.
const DIFF_DEADLINE: Duration = Duration::from_millis(500);

/// Terminal outcome of one scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoChange,
    Changed,
    Error,
}

impl From<Outcome> for ScanStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::NoChange => ScanStatus::NoChange,
            Outcome::Changed => ScanStatus::Changed,
            Outcome::Error => ScanStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentTag {
    Equal,
    Delete,
    Insert,
}

/// A run of text that was kept, removed or added
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffFragment {
    pub tag: FragmentTag,
    pub text: String,
}

/// Aligned old/new content of a detected change
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffArtifact {
    pub fragments: Vec<DiffFragment>,
    pub old_count: Option<usize>,
    pub new_count: Option<usize>,
    /// Characters inserted plus deleted
    pub magnitude: usize,
}

impl DiffArtifact {
    /// Inline rendering with `[-removed-]` and `{+added+}` markers
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let (Some(old), Some(new)) = (self.old_count, self.new_count) {
            if old != new {
                out.push_str(&format!("[matches: {} -> {}]\n", old, new));
            }
        }
        for fragment in &self.fragments {
            match fragment.tag {
                FragmentTag::Equal => out.push_str(&fragment.text),
                FragmentTag::Delete => {
                    out.push_str("[-");
                    out.push_str(&fragment.text);
                    out.push_str("-]");
                }
                FragmentTag::Insert => {
                    out.push_str("{+");
                    out.push_str(&fragment.text);
                    out.push_str("+}");
                }
            }
        }
        out
    }

    /// Fragments that were added or removed
    pub fn changes(&self) -> impl Iterator<Item = &DiffFragment> {
        self.fragments
            .iter()
            .filter(|fragment| fragment.tag != FragmentTag::Equal)
    }

    fn replaced(old: String, new: String) -> Self {
        let magnitude = old.chars().count() + new.chars().count();
        Self {
            fragments: vec![
                DiffFragment {
                    tag: FragmentTag::Delete,
                    text: old,
                },
                DiffFragment {
                    tag: FragmentTag::Insert,
                    text: new,
                },
            ],
            old_count: None,
            new_count: None,
            magnitude,
        }
    }
}

/// Result of comparing two snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub outcome: Outcome,
    /// Present only when the outcome is `Changed`
    pub diff: Option<DiffArtifact>,
}

impl Detection {
    fn no_change() -> Self {
        Self {
            outcome: Outcome::NoChange,
            diff: None,
        }
    }

    fn changed(diff: DiffArtifact) -> Self {
        Self {
            outcome: Outcome::Changed,
            diff: Some(diff),
        }
    }
}

/// Decides whether the difference between two snapshots is reportable
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    change_threshold: u32,
    require_exact_match_count: bool,
}

impl ChangeDetector {
    pub fn new(change_threshold: u32, require_exact_match_count: bool) -> Self {
        Self {
            change_threshold,
            require_exact_match_count,
        }
    }

    pub fn for_page(page: &Page) -> Self {
        Self::new(page.change_threshold, page.require_exact_match_count)
    }

    pub fn detect(&self, previous: Option<&Snapshot>, current: &Snapshot) -> Detection {
        let Some(previous) = previous else {
            // First observation only establishes the baseline
            return Detection::no_change();
        };

        match (previous, current) {
            (Snapshot::Count { value: old }, Snapshot::Count { value: new }) => {
                if old == new {
                    return Detection::no_change();
                }
                let mut diff = DiffArtifact::replaced(
                    previous.to_display_string(),
                    current.to_display_string(),
                );
                diff.old_count = Some(*old);
                diff.new_count = Some(*new);
                Detection::changed(diff)
            }
            (
                Snapshot::Text {
                    value: old,
                    match_count: old_count,
                },
                Snapshot::Text {
                    value: new,
                    match_count: new_count,
                },
            ) => self.detect_text(old, *old_count, new, *new_count),
            _ => {
                ::log::debug!(
                    "Snapshot kind changed from {} to {}",
                    previous.kind(),
                    current.kind()
                );
                Detection::changed(DiffArtifact::replaced(
                    previous.to_display_string(),
                    current.to_display_string(),
                ))
            }
        }
    }

    fn detect_text(
        &self,
        old: &str,
        old_count: Option<usize>,
        new: &str,
        new_count: Option<usize>,
    ) -> Detection {
        let count_changed = match (old_count, new_count) {
            (Some(before), Some(after)) => self.require_exact_match_count && before != after,
            _ => false,
        };

        let magnitude = difference_magnitude(old, new);
        if !count_changed && magnitude <= self.change_threshold as usize {
            if magnitude > 0 {
                ::log::debug!(
                    "Difference of {} characters is within threshold {}",
                    magnitude,
                    self.change_threshold
                );
            }
            return Detection::no_change();
        }

        let mut diff = word_diff(old, new);
        diff.magnitude = magnitude;
        diff.old_count = old_count;
        diff.new_count = new_count;
        Detection::changed(diff)
    }
}

/// Number of characters inserted or deleted to turn `old` into `new`
pub fn difference_magnitude(old: &str, new: &str) -> usize {
    if old == new {
        return 0;
    }

    TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .timeout(DIFF_DEADLINE)
        .diff_chars(old, new)
        .iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .map(|change| change.value().chars().count())
        .sum()
}

/// Word-level alignment of old and new text
fn word_diff(old: &str, new: &str) -> DiffArtifact {
    let diff = TextDiff::configure()
        .timeout(DIFF_DEADLINE)
        .diff_words(old, new);

    let mut fragments: Vec<DiffFragment> = Vec::new();
    for change in diff.iter_all_changes() {
        let tag = match change.tag() {
            ChangeTag::Equal => FragmentTag::Equal,
            ChangeTag::Delete => FragmentTag::Delete,
            ChangeTag::Insert => FragmentTag::Insert,
        };
        match fragments.last_mut() {
            Some(last) if last.tag == tag => last.text.push_str(change.value()),
            _ => fragments.push(DiffFragment {
                tag,
                text: change.value().to_string(),
            }),
        }
    }

    DiffArtifact {
        fragments,
        ..DiffArtifact::default()
    }
}
