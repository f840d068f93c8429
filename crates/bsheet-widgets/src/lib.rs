#![forbid(unsafe_code)]

//! Bottom sheet surface and modal transition coordination.
//!
//! - [`SheetSurface`] owns a draggable panel: its live offset, the backdrop,
//!   drag tracking, snapping, and the dismiss decision.
//! - [`TransitionCoordinator`] sequences one present and one dismiss move for
//!   a modal session and reports completion to the host.
//! - [`SheetTransitioningDelegate`] creates a fresh coordinator per
//!   presentation and hands it to the host's transition runtime.
//!
//! Everything runs on one UI thread. Motion advances only when the host calls
//! `tick` with elapsed time, and all callbacks (completions and observers)
//! are dispatched after the surface has committed its new state, so they may
//! call back into the surface.

pub mod clock;
pub mod coordinator;
pub mod host;
mod motion;
pub mod observer;
pub mod surface;
pub mod transitioning;

/// Target for every event this crate logs.
pub(crate) const LOG_TARGET: &str = "bsheet";

pub use bsheet_core::{
    DismissTuning, MotionConfig, Overdrag, Point, Rect, ResolvedHeights, SheetEasing,
    SheetError, SheetPolicy, Size, TargetHeight,
};
pub use clock::FrameClock;
pub use coordinator::{TransitionCoordinator, TransitionState};
pub use host::{Completion, ContainerView, ContentView, ModalHost, SheetId, TransitionContext};
pub use observer::{DismissObserver, ObserverSlot, PanObserver};
pub use surface::{DismissRequest, SheetOptions, SheetPhase, SheetSurface};
pub use transitioning::SheetTransitioningDelegate;
