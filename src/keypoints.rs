// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint data model.
//!
//! A [`KeypointSet`] is one full-body pose snapshot, either live (from the
//! estimator) or reference (from stored data). Keypoints are addressed by name
//! using the COCO-17 naming shared by `MoveNet` and YOLO pose models.

use ndarray::{ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PoseMatchError, Result};

/// COCO-Pose keypoint names, in model output order.
pub const COCO_KEYPOINT_NAMES: [&str; 17] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

/// A named 2D body landmark with detection confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark name (e.g. `left_elbow`).
    pub name: String,
    /// X coordinate in pixels.
    pub x: f32,
    /// Y coordinate in pixels.
    pub y: f32,
    /// Detection confidence (0.0 to 1.0). A missing score reads as 0.0, which
    /// no confidence threshold accepts.
    #[serde(default)]
    pub score: f32,
}

impl Keypoint {
    /// Create a new keypoint.
    #[must_use]
    pub fn new(name: impl Into<String>, x: f32, y: f32, score: f32) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }

    /// Position as an `(x, y)` tuple.
    #[must_use]
    pub const fn xy(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// An ordered set of keypoints, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeypointSet {
    points: Vec<Keypoint>,
}

impl KeypointSet {
    /// Build a set from keypoints.
    ///
    /// When a name occurs more than once, the first occurrence wins.
    #[must_use]
    pub fn new(points: Vec<Keypoint>) -> Self {
        let mut unique: Vec<Keypoint> = Vec::with_capacity(points.len());
        for kp in points {
            if !unique.iter().any(|u| u.name == kp.name) {
                unique.push(kp);
            }
        }
        Self { points: unique }
    }

    /// Look up a keypoint by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Keypoint> {
        self.points.iter().find(|kp| kp.name == name)
    }

    /// Number of keypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the set has no keypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over keypoints in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Keypoint> {
        self.points.iter()
    }

    /// Keypoints with confidence strictly above `threshold`.
    pub fn confident(&self, threshold: f32) -> impl Iterator<Item = &Keypoint> {
        self.points.iter().filter(move |kp| kp.score > threshold)
    }

    /// Parse a reference pose file.
    ///
    /// Accepts either a bare array of keypoints or an object with a
    /// `keypoints` array.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::ParseError`] if the text is not valid pose JSON.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a set from a `(K, 2)` or `(K, 3)` array of `[x, y, conf]` rows in
    /// COCO-17 order, as produced by YOLO pose models.
    ///
    /// Rows without a confidence column are treated as fully confident.
    ///
    /// # Errors
    ///
    /// Returns [`PoseMatchError::ParseError`] if the array has more than 17 rows
    /// or fewer than 2 columns.
    pub fn from_array(data: ArrayView2<'_, f32>) -> Result<Self> {
        let (rows, cols) = data.dim();
        if rows > COCO_KEYPOINT_NAMES.len() {
            return Err(PoseMatchError::ParseError(format!(
                "expected at most {} keypoints, got {rows}",
                COCO_KEYPOINT_NAMES.len()
            )));
        }
        if cols < 2 {
            return Err(PoseMatchError::ParseError(format!(
                "keypoint rows need at least x and y, got {cols} columns"
            )));
        }

        let points = data
            .outer_iter()
            .zip(COCO_KEYPOINT_NAMES)
            .map(|(row, name)| {
                let score = if cols > 2 { row[2] } else { 1.0 };
                Keypoint::new(name, row[0], row[1], score)
            })
            .collect();
        Ok(Self::new(points))
    }
}

/// Split an `(N, K, 2|3)` keypoint array into one set per detected person.
///
/// # Errors
///
/// Returns an error if any person's rows fail [`KeypointSet::from_array`].
pub fn poses_from_array(data: ArrayView3<'_, f32>) -> Result<Vec<KeypointSet>> {
    data.axis_iter(Axis(0))
        .map(KeypointSet::from_array)
        .collect()
}

impl<'a> IntoIterator for &'a KeypointSet {
    type Item = &'a Keypoint;
    type IntoIter = std::slice::Iter<'a, Keypoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl From<Vec<Keypoint>> for KeypointSet {
    fn from(points: Vec<Keypoint>) -> Self {
        Self::new(points)
    }
}

/// On-disk pose layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum PoseFile {
    Wrapped { keypoints: Vec<Keypoint> },
    Bare(Vec<Keypoint>),
}

impl<'de> Deserialize<'de> for KeypointSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = match PoseFile::deserialize(deserializer)? {
            PoseFile::Wrapped { keypoints } | PoseFile::Bare(keypoints) => keypoints,
        };
        Ok(Self::new(points))
    }
}
