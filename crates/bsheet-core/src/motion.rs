//! Easing curves and motion timing for sheet transitions.
//!
//! The sheet has three kinds of motion: presenting (off-screen to the start
//! height), snapping (between heights after a drag or programmatic request),
//! and dismissing (current height to off-screen). Each has its own duration
//! and easing.
//!
//! # Invariants
//!
//! - `SheetEasing::apply` maps `0.0 → 0.0` and `1.0 → 1.0`.
//! - Only [`SheetEasing::Back`] can leave `[0.0, 1.0]` in between.

use std::time::Duration;

/// Easing curve applied to linear motion progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SheetEasing {
    Linear,
    /// Decelerating; the default for presentation and snapping.
    #[default]
    EaseOut,
    /// Accelerating; the default for dismissal.
    EaseIn,
    EaseInOut,
    /// Slight overshoot, then settle.
    Back,
}

impl SheetEasing {
    /// Apply the curve to `t` (clamped to `[0.0, 1.0]`).
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let t_minus_1 = t - 1.0;
                1.0 + c3 * t_minus_1 * t_minus_1 * t_minus_1 + c1 * t_minus_1 * t_minus_1
            }
        }
    }

    /// Whether this curve can produce values outside `[0.0, 1.0]`.
    #[must_use]
    pub fn can_overshoot(self) -> bool {
        matches!(self, Self::Back)
    }
}

/// Durations and curves for the three sheet motions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MotionConfig {
    #[cfg_attr(feature = "policy-config", serde(with = "duration_ms"))]
    pub present_duration: Duration,
    #[cfg_attr(feature = "policy-config", serde(with = "duration_ms"))]
    pub dismiss_duration: Duration,
    #[cfg_attr(feature = "policy-config", serde(with = "duration_ms"))]
    pub snap_duration: Duration,
    pub present_easing: SheetEasing,
    pub dismiss_easing: SheetEasing,
    pub snap_easing: SheetEasing,
    /// Whether [`MotionConfig::effective`] honors a reduced-motion request.
    pub respect_reduced_motion: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            present_duration: Duration::from_millis(250),
            dismiss_duration: Duration::from_millis(200),
            snap_duration: Duration::from_millis(220),
            present_easing: SheetEasing::EaseOut,
            dismiss_easing: SheetEasing::EaseIn,
            snap_easing: SheetEasing::EaseOut,
            respect_reduced_motion: true,
        }
    }
}

impl MotionConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every motion completes immediately.
    #[must_use]
    pub fn none() -> Self {
        Self {
            present_duration: Duration::ZERO,
            dismiss_duration: Duration::ZERO,
            snap_duration: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Short linear motions for users who asked for reduced motion.
    #[must_use]
    pub fn reduced_motion() -> Self {
        Self {
            present_duration: Duration::from_millis(100),
            dismiss_duration: Duration::from_millis(100),
            snap_duration: Duration::from_millis(80),
            present_easing: SheetEasing::Linear,
            dismiss_easing: SheetEasing::Linear,
            snap_easing: SheetEasing::Linear,
            respect_reduced_motion: true,
        }
    }

    #[must_use]
    pub fn present_duration(mut self, duration: Duration) -> Self {
        self.present_duration = duration;
        self
    }

    #[must_use]
    pub fn dismiss_duration(mut self, duration: Duration) -> Self {
        self.dismiss_duration = duration;
        self
    }

    #[must_use]
    pub fn snap_duration(mut self, duration: Duration) -> Self {
        self.snap_duration = duration;
        self
    }

    #[must_use]
    pub fn present_easing(mut self, easing: SheetEasing) -> Self {
        self.present_easing = easing;
        self
    }

    #[must_use]
    pub fn dismiss_easing(mut self, easing: SheetEasing) -> Self {
        self.dismiss_easing = easing;
        self
    }

    #[must_use]
    pub fn snap_easing(mut self, easing: SheetEasing) -> Self {
        self.snap_easing = easing;
        self
    }

    #[must_use]
    pub fn respect_reduced_motion(mut self, respect: bool) -> Self {
        self.respect_reduced_motion = respect;
        self
    }

    /// Whether every motion completes immediately.
    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.present_duration.is_zero()
            && self.dismiss_duration.is_zero()
            && self.snap_duration.is_zero()
    }

    /// The config to use, given the host's reduced-motion preference.
    #[must_use]
    pub fn effective(&self, reduced_motion: bool) -> Self {
        if reduced_motion && self.respect_reduced_motion {
            Self::reduced_motion()
        } else {
            *self
        }
    }
}

#[cfg(feature = "policy-config")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
