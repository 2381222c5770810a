// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Game configuration.
//!
//! This module defines the [`GameConfig`] struct, which controls the tuning of a
//! session: sequence length, keypoint confidence threshold, joint-angle match
//! threshold, hold-confirmation mode and the joint triples used for scoring.
//! The thresholds are tuning, not semantics, so every one of them is exposed.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PoseMatchError, Result};
use crate::similarity::{JointTriple, default_joints};

/// How a sustained match is confirmed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldMode {
    /// The match must persist for `duration_ms` of wall-clock time.
    Time {
        /// Required hold in milliseconds.
        duration_ms: f64,
    },
    /// The match must persist for `frames` consecutive scored frames.
    Count {
        /// Required consecutive matching frames.
        frames: u32,
    },
    /// A single matching frame confirms.
    Instant,
}

impl HoldMode {
    /// Default duration for time-based holds.
    pub const DEFAULT_DURATION_MS: f64 = 3000.0;
    /// Default frame count for count-based holds.
    pub const DEFAULT_FRAMES: u32 = 50;

    /// Short mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Time { .. } => "time",
            Self::Count { .. } => "count",
            Self::Instant => "instant",
        }
    }
}

impl Default for HoldMode {
    fn default() -> Self {
        Self::Time {
            duration_ms: Self::DEFAULT_DURATION_MS,
        }
    }
}

impl fmt::Display for HoldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Time { duration_ms } => write!(f, "time:{duration_ms}"),
            Self::Count { frames } => write!(f, "count:{frames}"),
            Self::Instant => write!(f, "instant"),
        }
    }
}

impl FromStr for HoldMode {
    type Err = PoseMatchError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        let (kind, value) = match lower.split_once(':') {
            Some((kind, value)) => (kind, Some(value.trim())),
            None => (lower.as_str(), None),
        };

        let invalid = || {
            PoseMatchError::ConfigError(format!(
                "invalid hold mode '{s}', expected one of: time[:ms], count[:frames], instant"
            ))
        };

        match (kind, value) {
            ("time" | "timed" | "duration", None) => Ok(Self::default()),
            ("time" | "timed" | "duration", Some(v)) => v
                .trim_end_matches("ms")
                .parse::<f64>()
                .map(|duration_ms| Self::Time { duration_ms })
                .map_err(|_| invalid()),
            ("count" | "frames", None) => Ok(Self::Count {
                frames: Self::DEFAULT_FRAMES,
            }),
            ("count" | "frames", Some(v)) => v
                .parse::<u32>()
                .map(|frames| Self::Count { frames })
                .map_err(|_| invalid()),
            ("instant" | "immediate", None) => Ok(Self::Instant),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for HoldMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HoldMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration for a game session.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use posematch::{GameConfig, HoldMode};
///
/// let config = GameConfig::new()
///     .with_total_poses(5)
///     .with_confidence(0.5)
///     .with_match_threshold(10.0)
///     .with_hold(HoldMode::Count { frames: 50 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of reference poses in a sequence; ids run `1..=total_poses`.
    pub total_poses: u32,
    /// Keypoints must score strictly above this to take part in a comparison (0.0 to 1.0).
    pub confidence_threshold: f32,
    /// A pose matches when the mean joint-angle difference is strictly below this (degrees).
    pub match_threshold: f32,
    /// Hold-confirmation mode.
    pub hold: HoldMode,
    /// Joint triples compared between live and reference poses.
    pub joints: Vec<JointTriple>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_poses: 7,
            confidence_threshold: 0.4,
            match_threshold: 45.0,
            hold: HoldMode::default(),
            joints: default_joints(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of poses in a sequence.
    #[must_use]
    pub const fn with_total_poses(mut self, total: u32) -> Self {
        self.total_poses = total;
        self
    }

    /// Set the keypoint confidence threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum keypoint score (0.0 to 1.0), exclusive.
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the match threshold in degrees.
    ///
    /// Smaller values make the game stricter.
    #[must_use]
    pub const fn with_match_threshold(mut self, degrees: f32) -> Self {
        self.match_threshold = degrees;
        self
    }

    /// Set the hold-confirmation mode.
    #[must_use]
    pub const fn with_hold(mut self, hold: HoldMode) -> Self {
        self.hold = hold;
        self
    }

    /// Replace the joint triples used for scoring.
    #[must_use]
    pub fn with_joints(mut self, joints: Vec<JointTriple>) -> Self {
        self.joints = joints;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::ConfigError`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.total_poses == 0 {
            return Err(PoseMatchError::ConfigError(
                "total_poses must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(PoseMatchError::ConfigError(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !(self.match_threshold > 0.0 && self.match_threshold <= 180.0) {
            return Err(PoseMatchError::ConfigError(format!(
                "match_threshold must be within (0, 180] degrees, got {}",
                self.match_threshold
            )));
        }
        match self.hold {
            HoldMode::Time { duration_ms } if !(duration_ms > 0.0 && duration_ms.is_finite()) => {
                return Err(PoseMatchError::ConfigError(format!(
                    "hold duration must be positive, got {duration_ms}ms"
                )));
            }
            HoldMode::Count { frames: 0 } => {
                return Err(PoseMatchError::ConfigError(
                    "hold frame count must be at least 1".to_string(),
                ));
            }
            _ => {}
        }
        if self.joints.is_empty() {
            return Err(PoseMatchError::ConfigError(
                "at least one joint triple is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration from a TOML file.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
