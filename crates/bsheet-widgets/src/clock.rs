//! Frame clock for hosts that drive the sheet from wall time.
//!
//! The sheet itself only understands elapsed [`Duration`]s. Hosts with a
//! frame loop can hand each frame's timestamp to a [`FrameClock`] and let it
//! compute the delta.

use std::time::Duration;

use web_time::Instant;

use crate::surface::SheetSurface;

/// Converts frame timestamps into elapsed durations.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now` and return the time since the previous frame.
    ///
    /// The first frame yields [`Duration::ZERO`]. Timestamps that go
    /// backwards also yield zero.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let delta = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        delta
    }

    /// Record a frame at the current time.
    pub fn tick_now(&mut self) -> Duration {
        self.tick(Instant::now())
    }

    /// Advance `surface` by the time since the previous frame.
    ///
    /// Returns whether the surface is still animating.
    pub fn advance(&mut self, surface: &SheetSurface, now: Instant) -> bool {
        let delta = self.tick(now);
        surface.tick(delta)
    }

    /// Forget the previous frame, e.g. after the host was suspended.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
