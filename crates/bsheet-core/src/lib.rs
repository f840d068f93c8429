#![forbid(unsafe_code)]

//! Pure building blocks for bottom sheets.
//!
//! This crate holds everything about a sheet that can be decided without a
//! clock, a view tree, or a callback:
//!
//! - [`geometry`]: layout-unit sizes, points, and rectangles.
//! - [`height`]: configured [`TargetHeight`]s and their [`ResolvedHeights`].
//! - [`snap`]: drag-end resolution, dismiss-area checks, backdrop progress.
//! - [`motion`]: easing curves and motion timing configuration.
//! - [`policy`]: the combined [`SheetPolicy`] (optionally loaded from files).
//!
//! # Coordinates
//!
//! An *offset* is the sheet's visible extent above the container's bottom
//! edge. A resolved target height is therefore also a resolved offset, and a
//! downward drag reduces the offset. Velocities are in layout units per
//! second, positive when moving down.

pub mod error;
pub mod geometry;
pub mod height;
pub mod motion;
pub mod policy;
pub mod snap;

pub use error::SheetError;
pub use geometry::{Point, Rect, Size};
pub use height::{ResolvedHeights, TargetHeight};
pub use motion::{MotionConfig, SheetEasing};
#[cfg(feature = "policy-config")]
pub use policy::PolicyError;
pub use policy::SheetPolicy;
pub use snap::{
    DEFAULT_DISMISS_OFFSET_THRESHOLD, DEFAULT_DISMISS_VELOCITY_THRESHOLD, DismissCause,
    DismissTuning, DragDecision, DragOutcome, Overdrag, SnapReason, dim_progress,
    is_in_dismiss_area, nearest_index, relayout_index, resolve_drag_end,
};
