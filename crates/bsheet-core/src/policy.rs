//! Combined sheet behavior policy.
//!
//! With the `policy-config` feature, a [`SheetPolicy`] can be loaded from a
//! JSON or TOML document. Durations are written in milliseconds and any
//! missing field falls back to its default:
//!
//! ```toml
//! [dismiss]
//! offset_threshold = 60.0
//! velocity_threshold = 900.0
//!
//! [overdrag]
//! mode = "elastic"
//! resistance = 0.35
//!
//! [motion]
//! present_duration = 300
//! snap_easing = "ease_in_out"
//! ```

use crate::motion::MotionConfig;
use crate::snap::{DismissTuning, Overdrag};

/// Tuning shared by every sheet built from the same configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "policy-config",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SheetPolicy {
    pub dismiss: DismissTuning,
    pub overdrag: Overdrag,
    pub motion: MotionConfig,
}

impl SheetPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dismiss(mut self, dismiss: DismissTuning) -> Self {
        self.dismiss = dismiss;
        self
    }

    #[must_use]
    pub fn overdrag(mut self, overdrag: Overdrag) -> Self {
        self.overdrag = overdrag;
        self
    }

    #[must_use]
    pub fn motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }
}

/// Errors from loading a [`SheetPolicy`] document.
#[cfg(feature = "policy-config")]
#[derive(Debug)]
pub enum PolicyError {
    Json(serde_json::Error),
    Toml(toml::de::Error),
}

#[cfg(feature = "policy-config")]
impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid JSON sheet policy: {err}"),
            Self::Toml(err) => write!(f, "invalid TOML sheet policy: {err}"),
        }
    }
}

#[cfg(feature = "policy-config")]
impl std::error::Error for PolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Toml(err) => Some(err),
        }
    }
}

#[cfg(feature = "policy-config")]
impl SheetPolicy {
    /// Parse a policy from JSON.
    pub fn from_json_str(input: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(input).map_err(PolicyError::Json)
    }

    /// Parse a policy from TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, PolicyError> {
        toml::from_str(input).map_err(PolicyError::Toml)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, PolicyError> {
        serde_json::to_string_pretty(self).map_err(PolicyError::Json)
    }
}
