//! Final highlight selection and the external export format.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::candidate::HighlightCandidate;
use crate::timestamp::{format_timestamp, parse_timestamp};

/// The ordered final set of highlights for one run.
///
/// Invariants (enforced by the selector, checkable here):
/// - pairwise non-overlapping, separated by at least the configured gap
/// - each duration within the configured bounds
/// - at most the configured number of highlights
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HighlightSelection {
    /// Selected highlights, in selection priority order.
    pub highlights: Vec<HighlightCandidate>,
}

impl HighlightSelection {
    /// An explicit empty selection (e.g., no viable candidates existed).
    pub fn empty() -> Self {
        Self {
            highlights: Vec::new(),
        }
    }

    /// Number of selected highlights.
    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    /// Whether the selection is empty.
    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    /// Check the pairwise gap invariant.
    pub fn satisfies_gap(&self, min_gap: f64) -> bool {
        for (i, a) in self.highlights.iter().enumerate() {
            for b in self.highlights.iter().skip(i + 1) {
                if a.overlaps(b) || a.gap_to(b) < min_gap {
                    return false;
                }
            }
        }
        true
    }

    /// Check the duration-bounds invariant.
    pub fn satisfies_durations(&self, min_duration: f64, max_duration: f64) -> bool {
        self.highlights
            .iter()
            .all(|h| h.duration() >= min_duration && h.duration() <= max_duration)
    }

    /// Convert to the export format consumed by clip generation.
    pub fn to_export(&self) -> SelectionExport {
        SelectionExport {
            highlights: self
                .highlights
                .iter()
                .enumerate()
                .map(|(idx, h)| SelectedHighlight {
                    id: (idx + 1) as u32,
                    start: format_timestamp(h.start),
                    end: format_timestamp(h.end),
                    composite_score: h.composite_score,
                    rationale: h.rationale.clone(),
                })
                .collect(),
        }
    }
}

/// One exported highlight row: `{start, end, composite_score, rationale}`.
///
/// Timestamps are `HH:MM:SS.mmm` strings; parsing them back reproduces the
/// original seconds within millisecond tolerance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectedHighlight {
    /// 1-indexed position in the selection.
    pub id: u32,

    /// Start timestamp (HH:MM:SS.mmm).
    pub start: String,

    /// End timestamp (HH:MM:SS.mmm).
    pub end: String,

    /// Fused composite score (0-1).
    pub composite_score: f64,

    /// Dominant contributing signals, for auditability.
    #[serde(default)]
    pub rationale: Vec<String>,
}

impl SelectedHighlight {
    /// Start time in seconds.
    pub fn start_seconds(&self) -> crate::error::ConfigResult<f64> {
        parse_timestamp(&self.start)
    }

    /// End time in seconds.
    pub fn end_seconds(&self) -> crate::error::ConfigResult<f64> {
        parse_timestamp(&self.end)
    }
}

/// The exported selection document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionExport {
    /// Exported highlight rows, in selection order.
    pub highlights: Vec<SelectedHighlight>,
}
