//! Configured target heights and their resolution against a container.
//!
//! # Invariants
//!
//! - A [`ResolvedHeights`] is never empty.
//! - Every resolved value is finite and within `[0, container.height]` when
//!   produced by [`ResolvedHeights::resolve`].
//! - Configured order is preserved; indices always refer to it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Empty sequence | No targets configured | `SheetError::EmptyTargetHeights` |
//! | Non-finite value | NaN or infinity configured | Resolves to `0.0` |
//! | Oversized value | Taller than the container | Clamped to container height |

use crate::error::SheetError;
use crate::geometry::Size;

/// A configured resting height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetHeight {
    /// A fixed height in layout units.
    Fixed(f64),
    /// Fit the content's intrinsic height.
    Automatic,
}

impl TargetHeight {
    /// Reserved sentinel for "fit content".
    pub const AUTOMATIC: Self = Self::Automatic;

    #[inline]
    #[must_use]
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }
}

impl From<f64> for TargetHeight {
    fn from(value: f64) -> Self {
        Self::Fixed(value)
    }
}

/// Concrete heights, in configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHeights {
    values: Vec<f64>,
    smallest: f64,
    largest: f64,
}

impl ResolvedHeights {
    /// Build from already-concrete values.
    ///
    /// Non-finite and negative values become `0.0`.
    pub fn new(values: impl IntoIterator<Item = f64>) -> Result<Self, SheetError> {
        let values: Vec<f64> = values.into_iter().map(sanitize).collect();
        Self::from_sanitized(values)
    }

    /// Resolve `targets` against a container.
    ///
    /// `intrinsic_height` is called at most once, with the container width,
    /// and only when an [`TargetHeight::Automatic`] entry is present.
    pub fn resolve(
        targets: &[TargetHeight],
        container: Size,
        intrinsic_height: impl FnOnce(f64) -> f64,
    ) -> Result<Self, SheetError> {
        if targets.is_empty() {
            return Err(SheetError::EmptyTargetHeights);
        }

        let max = sanitize(container.height);
        let automatic = if targets.iter().any(|t| t.is_automatic()) {
            Some(sanitize(intrinsic_height(container.width)))
        } else {
            None
        };

        let values = targets
            .iter()
            .map(|target| {
                let raw = match target {
                    TargetHeight::Fixed(value) => sanitize(*value),
                    TargetHeight::Automatic => automatic.unwrap_or(0.0),
                };
                raw.min(max)
            })
            .collect();

        Self::from_sanitized(values)
    }

    fn from_sanitized(values: Vec<f64>) -> Result<Self, SheetError> {
        if values.is_empty() {
            return Err(SheetError::EmptyTargetHeights);
        }
        let smallest = values.iter().copied().fold(f64::INFINITY, f64::min);
        let largest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            values,
            smallest,
            largest,
        })
    }

    /// Number of heights (always at least one).
    #[inline]
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Height at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Height at `index`, failing on out-of-range indices.
    pub fn checked(&self, index: usize) -> Result<f64, SheetError> {
        self.get(index).ok_or(SheetError::InvalidTargetIndex {
            index,
            len: self.len(),
        })
    }

    /// Height at the nearest valid index to `index`.
    #[must_use]
    pub fn at_clamped(&self, index: usize) -> f64 {
        self.values[self.clamp_index(index)]
    }

    /// Clamp `index` into `[0, len)`.
    #[inline]
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.values.len() - 1)
    }

    #[inline]
    #[must_use]
    pub fn smallest(&self) -> f64 {
        self.smallest
    }

    #[inline]
    #[must_use]
    pub fn largest(&self) -> f64 {
        self.largest
    }

    /// All heights in configured order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Index of the height nearest to `offset`, preferring `current` on ties.
    ///
    /// See [`crate::snap::nearest_index`].
    #[must_use]
    pub fn nearest_index(&self, offset: f64, current: usize) -> usize {
        crate::snap::nearest_index(offset, self, current)
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
