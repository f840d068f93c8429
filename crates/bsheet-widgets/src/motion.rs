//! The single in-flight sheet motion.
//!
//! A motion interpolates the sheet offset from `from` to `to` over a
//! duration, advanced by host ticks. Progress is always in `[0.0, 1.0]`;
//! zero-duration motions are finished as soon as they exist.

use std::fmt;
use std::time::Duration;

use bsheet_core::SheetEasing;

use crate::host::Completion;

/// What arriving at the end of a motion means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MotionKind {
    Present { index: usize },
    Snap { index: usize },
    Dismiss,
}

pub(crate) struct Motion {
    pub(crate) kind: MotionKind,
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
    easing: SheetEasing,
    pub(crate) completion: Option<Completion>,
}

impl fmt::Debug for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Motion")
            .field("kind", &self.kind)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("elapsed", &self.elapsed)
            .field("duration", &self.duration)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}

impl Motion {
    pub(crate) fn new(
        kind: MotionKind,
        from: f64,
        to: f64,
        duration: Duration,
        easing: SheetEasing,
        completion: Option<Completion>,
    ) -> Self {
        Self {
            kind,
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            easing,
            completion,
        }
    }

    pub(crate) fn target(&self) -> f64 {
        self.to
    }

    pub(crate) fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Current interpolated offset.
    pub(crate) fn value(&self) -> f64 {
        if self.is_finished() {
            return self.to;
        }
        self.from + (self.to - self.from) * self.easing.apply(self.progress())
    }

    /// Advance by `delta`; returns `true` once the motion is finished.
    pub(crate) fn advance(&mut self, delta: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(delta).min(self.duration);
        self.is_finished()
    }

    /// Continue from the current value toward a new target, restarting the
    /// clock.
    pub(crate) fn retarget(&mut self, to: f64) {
        self.from = self.value();
        self.to = to;
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(from: f64, to: f64, millis: u64) -> Motion {
        Motion::new(
            MotionKind::Snap { index: 0 },
            from,
            to,
            Duration::from_millis(millis),
            SheetEasing::Linear,
            None,
        )
    }

    #[test]
    fn zero_duration_is_finished_immediately() {
        let motion = linear(0.0, 100.0, 0);
        assert!(motion.is_finished());
        assert_eq!(motion.value(), 100.0);
    }

    #[test]
    fn advance_interpolates_and_finishes() {
        let mut motion = linear(0.0, 100.0, 100);
        assert!(!motion.advance(Duration::from_millis(25)));
        assert!((motion.value() - 25.0).abs() < 1e-9);
        assert!(!motion.advance(Duration::from_millis(50)));
        assert!((motion.value() - 75.0).abs() < 1e-9);
        assert!(motion.advance(Duration::from_millis(500)));
        assert_eq!(motion.value(), 100.0);
        assert_eq!(motion.progress(), 1.0);
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut motion = linear(0.0, 100.0, 100);
        motion.advance(Duration::from_millis(50));
        motion.retarget(300.0);
        assert!((motion.value() - 50.0).abs() < 1e-9);
        assert_eq!(motion.target(), 300.0);
        motion.advance(Duration::from_millis(100));
        assert_eq!(motion.value(), 300.0);
    }

    #[test]
    fn motion_downward_interpolates() {
        let mut motion = linear(500.0, 0.0, 200);
        motion.advance(Duration::from_millis(100));
        assert!((motion.value() - 250.0).abs() < 1e-9);
    }
}
