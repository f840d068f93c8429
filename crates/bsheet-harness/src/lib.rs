#![forbid(unsafe_code)]

//! Deterministic fake host for driving bottom sheets in tests.
//!
//! - [`host`]: container, content, transition context, and a modal host that
//!   runs present/dismiss transitions through a [`SheetTransitioningDelegate`].
//! - [`record`]: recording observers and completion logs.
//! - [`strategies`]: `proptest` strategies for height configurations.
//!
//! Nothing here reads a clock. Frames are advanced explicitly with a fixed
//! step, so every run is reproducible.
//!
//! [`SheetTransitioningDelegate`]: bsheet_widgets::SheetTransitioningDelegate

pub mod host;
pub mod record;
pub mod strategies;

use std::time::Duration;

use bsheet_widgets::SheetSurface;

pub use host::{FakeModalHost, FixedContent, RecordingContext, TestContainer};
pub use record::{CompletionLog, RecordingObserver, SheetEvent};

/// One 60 Hz frame.
pub const FRAME: Duration = Duration::from_millis(16);

/// Tick `surface` by `step` until no motion is in flight.
///
/// Returns the number of frames ticked. Stops after `max_frames` even if a
/// motion is still running.
pub fn run_until_idle(surface: &SheetSurface, step: Duration, max_frames: usize) -> usize {
    let mut frames = 0;
    while surface.is_animating() && frames < max_frames {
        surface.tick(step);
        frames += 1;
    }
    tracing::trace!(frames, "surface idle");
    frames
}
