//! Drag-end resolution and dismiss-area decisions.
//!
//! Every function here is pure over `(offset, velocity, current index,
//! resolved heights, tuning)`, so the whole drag/snap policy can be tested
//! without a clock or a view tree.
//!
//! # Resolution order
//!
//! 1. Dismiss: the offset sits more than `offset_threshold` below the
//!    smallest height, or has reached 0 above a non-zero smallest height,
//!    or the downward velocity exceeds `velocity_threshold`. Only honored
//!    when the sheet is dismissible.
//! 2. Snap: the height nearest to the final offset. Exact ties keep the
//!    current index; other ties go to the lowest index.
//!
//! # Invariants
//!
//! - `resolve_drag_end` always returns an index in `[0, len)`.
//! - `dim_progress` is always in `[0.0, 1.0]`.
//! - A non-dismissible sheet never resolves to [`DragOutcome::Dismiss`].

use crate::height::ResolvedHeights;

/// Default distance below the smallest height that enters the dismiss area.
pub const DEFAULT_DISMISS_OFFSET_THRESHOLD: f64 = 80.0;

/// Default downward velocity (units/second) that enters the dismiss area.
pub const DEFAULT_DISMISS_VELOCITY_THRESHOLD: f64 = 1200.0;

/// Thresholds that define the dismiss area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DismissTuning {
    /// Distance below the smallest resolved height.
    pub offset_threshold: f64,
    /// Downward velocity in units per second.
    pub velocity_threshold: f64,
}

impl Default for DismissTuning {
    fn default() -> Self {
        Self {
            offset_threshold: DEFAULT_DISMISS_OFFSET_THRESHOLD,
            velocity_threshold: DEFAULT_DISMISS_VELOCITY_THRESHOLD,
        }
    }
}

impl DismissTuning {
    /// Set the offset threshold.
    #[must_use]
    pub fn offset_threshold(mut self, value: f64) -> Self {
        self.offset_threshold = value;
        self
    }

    /// Set the velocity threshold.
    #[must_use]
    pub fn velocity_threshold(mut self, value: f64) -> Self {
        self.velocity_threshold = value;
        self
    }

    /// A sheet dragged fully down counts as past the offset threshold even
    /// when its smallest height is within the threshold of the bottom edge.
    fn cause(self, offset: f64, velocity: f64, heights: &ResolvedHeights) -> Option<DismissCause> {
        let smallest = heights.smallest();
        let collapsed = offset <= 0.0 && smallest > 0.0;
        if offset < smallest - self.offset_threshold || collapsed {
            Some(DismissCause::OffsetPastThreshold)
        } else if velocity > self.velocity_threshold {
            Some(DismissCause::VelocityPastThreshold)
        } else {
            None
        }
    }
}

/// How interactive offsets above the largest height behave.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "mode", rename_all = "snake_case")
)]
pub enum Overdrag {
    /// Stop at the largest height.
    #[default]
    Clamp,
    /// Follow the finger past the largest height, scaled by `resistance`
    /// (`0.0` behaves like `Clamp`, `1.0` follows exactly).
    Elastic { resistance: f64 },
}

impl Overdrag {
    /// Map a raw interactive offset to the displayed offset.
    ///
    /// The result is never negative and never exceeds `limit`.
    #[must_use]
    pub fn apply(self, raw_offset: f64, largest: f64, limit: f64) -> f64 {
        let raw = if raw_offset.is_nan() {
            0.0
        } else {
            raw_offset.max(0.0)
        };
        let shaped = if raw <= largest {
            raw
        } else {
            match self {
                Self::Clamp => largest,
                Self::Elastic { resistance } => {
                    largest + (raw - largest) * resistance.clamp(0.0, 1.0)
                }
            }
        };
        shaped.min(limit.max(0.0))
    }
}

/// Why a drag ended in dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissCause {
    OffsetPastThreshold,
    VelocityPastThreshold,
}

/// Why a drag ended on a particular index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapReason {
    /// The nearest height was the one the sheet rested on before the drag.
    RetainedCurrent,
    /// A different height was nearer.
    SnappedNearest,
    /// The dismiss area was reached but the sheet is not dismissible.
    DismissSuppressed,
}

/// Terminal outcome of a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dismiss(DismissCause),
    Snap { index: usize, reason: SnapReason },
}

/// Output of drag-end evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDecision {
    pub outcome: DragOutcome,
    pub nearest_index: usize,
    pub nearest_distance: f64,
}

impl DragDecision {
    /// Whether the sheet should dismiss.
    #[must_use]
    pub fn is_dismiss(&self) -> bool {
        matches!(self.outcome, DragOutcome::Dismiss(_))
    }

    /// Target index, when the outcome is a snap.
    #[must_use]
    pub fn snap_index(&self) -> Option<usize> {
        match self.outcome {
            DragOutcome::Snap { index, .. } => Some(index),
            DragOutcome::Dismiss(_) => None,
        }
    }
}

/// Whether `offset`/`velocity` lie in the dismiss area.
///
/// This ignores whether the sheet is dismissible; see [`resolve_drag_end`].
#[must_use]
pub fn is_in_dismiss_area(
    offset: f64,
    velocity: f64,
    heights: &ResolvedHeights,
    tuning: DismissTuning,
) -> bool {
    tuning.cause(offset, velocity, heights).is_some()
}

/// Index of the height nearest to `offset`.
///
/// Exact ties resolve to `current` when it is among the tied candidates and
/// to the lowest tied index otherwise. Out-of-range `current` values are
/// clamped first.
#[must_use]
pub fn nearest_index(offset: f64, heights: &ResolvedHeights, current: usize) -> usize {
    let current = heights.clamp_index(current);
    let values = heights.as_slice();

    let mut best = current;
    let mut best_distance = (values[current] - offset).abs();
    for (index, value) in values.iter().enumerate() {
        let distance = (value - offset).abs();
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}

/// Decide where a drag ending at `offset` with `velocity` goes.
#[must_use]
pub fn resolve_drag_end(
    offset: f64,
    velocity: f64,
    current: usize,
    heights: &ResolvedHeights,
    tuning: DismissTuning,
    dismissible: bool,
) -> DragDecision {
    let current = heights.clamp_index(current);
    let nearest = nearest_index(offset, heights, current);
    let nearest_distance = (heights.at_clamped(nearest) - offset).abs();

    let outcome = match tuning.cause(offset, velocity, heights) {
        Some(cause) if dismissible => DragOutcome::Dismiss(cause),
        Some(_) => DragOutcome::Snap {
            index: nearest,
            reason: SnapReason::DismissSuppressed,
        },
        None if nearest == current => DragOutcome::Snap {
            index: nearest,
            reason: SnapReason::RetainedCurrent,
        },
        None => DragOutcome::Snap {
            index: nearest,
            reason: SnapReason::SnappedNearest,
        },
    };

    DragDecision {
        outcome,
        nearest_index: nearest,
        nearest_distance,
    }
}

/// Backdrop progress for an offset, in `[0.0, 1.0]`.
///
/// Linear between the smallest and largest heights. When every height is
/// equal, the backdrop is fully shown at or above that height and hidden
/// below it.
#[must_use]
pub fn dim_progress(offset: f64, heights: &ResolvedHeights) -> f64 {
    if offset.is_nan() {
        return 0.0;
    }
    let span = heights.largest() - heights.smallest();
    if span <= f64::EPSILON {
        return if offset >= heights.smallest() { 1.0 } else { 0.0 };
    }
    ((offset - heights.smallest()) / span).clamp(0.0, 1.0)
}

/// Index to rest on after the heights were re-resolved for a new size.
///
/// Picks the new height nearest to the previously rested offset, keeping
/// `current` on ties.
#[must_use]
pub fn relayout_index(previous_offset: f64, current: usize, heights: &ResolvedHeights) -> usize {
    nearest_index(previous_offset, heights, current)
}
