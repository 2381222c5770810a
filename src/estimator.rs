// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose estimator interface and a recorded-stream implementation.
//!
//! The engine never runs a model itself. Anything that turns a frame into
//! keypoint sets can drive it: a live model wrapper, or [`ReplayEstimator`],
//! which plays back a JSON-lines recording with one frame per line:
//!
//! ```text
//! {"t_ms": 0.0, "poses": [[{"name": "nose", "x": 320, "y": 90, "score": 0.92}, ...]]}
//! {"t_ms": 33.3, "poses": []}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PoseMatchError, Result};
use crate::keypoints::KeypointSet;

/// Handle to one sampled video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Position of the frame in its source.
    pub index: usize,
    /// Capture time in milliseconds, if the source records it.
    pub timestamp_ms: Option<f64>,
}

/// Turns frames into detected poses.
pub trait PoseEstimator {
    /// Estimate the poses visible in `frame`.
    ///
    /// An empty result means nobody was detected and is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::EstimatorError`] if estimation fails.
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<KeypointSet>>;
}

/// One line of a recorded pose stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Capture time in milliseconds.
    #[serde(default)]
    pub t_ms: Option<f64>,
    /// Poses detected in the frame.
    #[serde(default)]
    pub poses: Vec<KeypointSet>,
}

/// Plays back a recorded pose stream.
#[derive(Debug, Clone, Default)]
pub struct ReplayEstimator {
    frames: Vec<RecordedFrame>,
}

impl ReplayEstimator {
    /// Create an estimator from recorded frames.
    #[must_use]
    pub const fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames }
    }

    /// Open a JSON-lines recording.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::AcquisitionError`] if the file cannot be opened
    /// and [`PoseMatchError::ParseError`] for a malformed line.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PoseMatchError::AcquisitionError(format!("cannot open pose stream {}: {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a JSON-lines recording. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::ParseError`] naming the first malformed line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(&line)
                .map_err(|e| PoseMatchError::ParseError(format!("line {}: {e}", line_no + 1)))?;
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    /// Number of recorded frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Check if the recording has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame handles in recording order.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames
            .iter()
            .enumerate()
            .map(|(index, frame)| Frame {
                index,
                timestamp_ms: frame.t_ms,
            })
            .collect()
    }
}

impl PoseEstimator for ReplayEstimator {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<KeypointSet>> {
        self.frames
            .get(frame.index)
            .map(|recorded| recorded.poses.clone())
            .ok_or_else(|| {
                PoseMatchError::EstimatorError(format!(
                    "frame {} is past the end of the recording ({} frames)",
                    frame.index,
                    self.frames.len()
                ))
            })
    }
}
