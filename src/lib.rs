// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # posematch
//!
//! Pose-progression engine for copy-the-pose games. A player sees one
//! reference pose at a time, in a freshly shuffled order, and must hold a
//! matching body posture in front of a camera to move on.
//!
//! The crate does not run a pose model or draw anything. It consumes keypoint
//! sets from any [`PoseEstimator`] and publishes [`Snapshot`]s to any
//! [`PresentationSink`].
//!
//! ## Features
//!
//! - **Joint-angle similarity** - Compares interior angles at shoulders, elbows and hips
//! - **Hold confirmation** - Time, frame-count or instant confirmation modes
//! - **Shuffled sequences** - Uniform Fisher–Yates order, reshuffled on every restart
//! - **Pluggable sources** - Reference poses from a directory, an HTTP(S) URL or memory
//! - **Replay** - Drive a full game from a recorded JSON-lines pose stream
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use posematch::{DirectoryLoader, GameConfig, GameController, HoldMode, TickOutcome};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::new()
//!         .with_total_poses(7)
//!         .with_hold(HoldMode::Count { frames: 50 });
//!     let mut game = GameController::new(config, DirectoryLoader::new("poses")?)?;
//!     game.start()?;
//!
//!     # let frames: Vec<Option<posematch::KeypointSet>> = Vec::new();
//!     for live in &frames {
//!         match game.tick(live.as_ref()) {
//!             TickOutcome::Advanced { index } => println!("next pose: {index}"),
//!             TickOutcome::Completed => println!("done"),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Replay a recorded pose stream against the poses in ./poses
//! posematch play --poses poses/ --stream session.jsonl
//!
//! # Frame-count hold, stricter threshold, reproducible order
//! posematch play --poses poses/ --stream session.jsonl --mode count:50 --threshold 30 --seed 7
//!
//! # Reference poses served over HTTP
//! posematch play --poses https://example.com/poses --stream session.jsonl
//!
//! # Print a shuffled order
//! posematch shuffle --count 7 --seed 42
//! ```
//!
//! ## Custom Configuration
//!
//! ```rust
//! use posematch::{GameConfig, HoldMode};
//!
//! let config = GameConfig::new()
//!     .with_total_poses(5)                                  // Poses per game
//!     .with_confidence(0.5)                                 // Keypoint confidence threshold
//!     .with_match_threshold(30.0)                           // Mean angle difference, degrees
//!     .with_hold(HoldMode::Time { duration_ms: 2000.0 });   // Hold for two seconds
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`keypoints`] | Named 2-D keypoints ([`Keypoint`], [`KeypointSet`]) |
//! | [`geometry`] | Interior angle at a joint ([`angle_at`]) |
//! | [`similarity`] | Joint-angle similarity ([`score`], [`MatchScore`]) |
//! | [`config`] | [`GameConfig`] and [`HoldMode`] |
//! | [`hold`] | Hold-confirmation state machine ([`HoldTracker`]) |
//! | [`loader`] | Reference pose sources ([`ReferenceLoader`]) |
//! | [`sequence`] | Shuffled pose sequences ([`build_sequence`], [`Sequence`]) |
//! | [`estimator`] | Pose estimator interface and [`ReplayEstimator`] |
//! | [`clock`] | Time sources for time-based holds |
//! | [`game`] | [`GameController`] |
//! | [`session`] | Frame loop ([`Session`]) |
//! | [`error`] | Error types ([`PoseMatchError`], [`Result`]) |

// Modules
pub mod clock;
pub mod config;
pub mod error;
pub mod estimator;
pub mod game;
pub mod geometry;
pub mod hold;
pub mod keypoints;
pub mod loader;
pub mod sequence;
pub mod session;
pub mod similarity;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{GameConfig, HoldMode};
pub use error::{PoseMatchError, Result};
pub use estimator::{Frame, PoseEstimator, RecordedFrame, ReplayEstimator};
pub use game::{GameController, Phase, Snapshot, TickOutcome};
pub use geometry::{DEGENERATE_ANGLE, angle_at};
pub use hold::{HoldState, HoldTracker, HoldUpdate};
pub use keypoints::{COCO_KEYPOINT_NAMES, Keypoint, KeypointSet};
pub use loader::{DirectoryLoader, HttpLoader, ImageRef, MemoryLoader, ReferenceLoader};
pub use sequence::{ReferencePose, Sequence, build_sequence};
pub use session::{NullSink, PresentationSink, Session, SessionEnd, SessionReport, StopHandle};
pub use similarity::{JointTriple, MatchScore, score};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
