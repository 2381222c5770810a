// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Joint-angle similarity between a live pose and a reference pose.
//!
//! Each [`JointTriple`] names a proximal, vertex and distal keypoint. A triple
//! takes part in the comparison only when all six keypoints (three live, three
//! reference) exist and are confident; everything else is left out of the
//! evidence rather than counted for or against the match.

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::geometry::{DEGENERATE_ANGLE, joint_angle};
use crate::keypoints::{Keypoint, KeypointSet};

/// Joints compared by default: both elbows, both knees and both shoulders
/// measured against the hip.
pub const DEFAULT_JOINTS: [[&str; 3]; 6] = [
    ["left_shoulder", "left_elbow", "left_wrist"],
    ["right_shoulder", "right_elbow", "right_wrist"],
    ["left_hip", "left_knee", "left_ankle"],
    ["right_hip", "right_knee", "right_ankle"],
    ["left_elbow", "left_shoulder", "left_hip"],
    ["right_elbow", "right_shoulder", "right_hip"],
];

/// A `(proximal, vertex, distal)` keypoint-name triple; the angle is measured at `vertex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointTriple {
    /// Keypoint on one side of the joint.
    pub proximal: String,
    /// Keypoint at the joint.
    pub vertex: String,
    /// Keypoint on the other side of the joint.
    pub distal: String,
}

impl JointTriple {
    /// Create a new triple.
    #[must_use]
    pub fn new(proximal: impl Into<String>, vertex: impl Into<String>, distal: impl Into<String>) -> Self {
        Self {
            proximal: proximal.into(),
            vertex: vertex.into(),
            distal: distal.into(),
        }
    }

    /// Resolve the triple in `set`, requiring every keypoint to score above `threshold`.
    fn resolve<'a>(&self, set: &'a KeypointSet, threshold: f32) -> Option<[&'a Keypoint; 3]> {
        let pick = |name: &str| set.get(name).filter(|kp| kp.score > threshold);
        Some([pick(&self.proximal)?, pick(&self.vertex)?, pick(&self.distal)?])
    }
}

/// The default joint triples as owned values.
#[must_use]
pub fn default_joints() -> Vec<JointTriple> {
    DEFAULT_JOINTS
        .iter()
        .map(|[p, v, d]| JointTriple::new(*p, *v, *d))
        .collect()
}

/// Outcome of comparing one live pose with one reference pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    /// Whether the mean angle difference is below the match threshold.
    pub matched: bool,
    /// Mean absolute joint-angle difference in degrees over the considered joints.
    /// [`DEGENERATE_ANGLE`] when no joint could be considered.
    pub mean_angle_diff: f32,
    /// Number of joint triples that took part in the comparison.
    pub considered_joints: usize,
}

impl MatchScore {
    /// Score reported when no joint had enough evidence.
    #[must_use]
    pub const fn no_evidence() -> Self {
        Self {
            matched: false,
            mean_angle_diff: DEGENERATE_ANGLE,
            considered_joints: 0,
        }
    }
}

/// Compare a live pose against a reference pose.
///
/// # Arguments
///
/// * `live` - Keypoints from the estimator.
/// * `reference` - Keypoints of the target pose.
/// * `config` - Supplies the joint triples and both thresholds.
///
/// # Returns
///
/// A [`MatchScore`]. With zero considered joints the result never matches.
#[must_use]
pub fn score(live: &KeypointSet, reference: &KeypointSet, config: &GameConfig) -> MatchScore {
    let threshold = config.confidence_threshold;
    let mut total_diff = 0.0_f32;
    let mut considered = 0_usize;

    for joint in &config.joints {
        let (Some([la, lb, lc]), Some([ra, rb, rc])) =
            (joint.resolve(live, threshold), joint.resolve(reference, threshold))
        else {
            continue;
        };
        total_diff += (joint_angle(la, lb, lc) - joint_angle(ra, rb, rc)).abs();
        considered += 1;
    }

    if considered == 0 {
        return MatchScore::no_evidence();
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_angle_diff = total_diff / considered as f32;
    MatchScore {
        matched: mean_angle_diff < config.match_threshold,
        mean_angle_diff,
        considered_joints: considered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A standing pose with arms out and slightly bent knees.
    fn pose(score: f32) -> KeypointSet {
        KeypointSet::new(vec![
            Keypoint::new("left_shoulder", 120.0, 100.0, score),
            Keypoint::new("right_shoulder", 80.0, 100.0, score),
            Keypoint::new("left_elbow", 160.0, 100.0, score),
            Keypoint::new("right_elbow", 40.0, 100.0, score),
            Keypoint::new("left_wrist", 200.0, 90.0, score),
            Keypoint::new("right_wrist", 0.0, 90.0, score),
            Keypoint::new("left_hip", 115.0, 200.0, score),
            Keypoint::new("right_hip", 85.0, 200.0, score),
            Keypoint::new("left_knee", 118.0, 260.0, score),
            Keypoint::new("right_knee", 82.0, 260.0, score),
            Keypoint::new("left_ankle", 115.0, 320.0, score),
            Keypoint::new("right_ankle", 85.0, 320.0, score),
        ])
    }

    /// Copy of `set` with `name` moved to `(x, y)`.
    fn moved(set: &KeypointSet, name: &str, x: f32, y: f32) -> KeypointSet {
        set.iter()
            .map(|kp| {
                if kp.name == name {
                    Keypoint::new(name, x, y, kp.score)
                } else {
                    kp.clone()
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_identical_poses_match() {
        let config = GameConfig::default();
        let result = score(&pose(0.9), &pose(0.9), &config);
        assert!(result.matched);
        assert!(result.mean_angle_diff.abs() < f32::EPSILON);
        assert_eq!(result.considered_joints, 6);
    }

    #[test]
    fn test_no_confident_keypoints() {
        let config = GameConfig::default();
        let result = score(&pose(0.2), &pose(0.9), &config);
        assert!(!result.matched);
        assert_eq!(result.considered_joints, 0);

        let result = score(&KeypointSet::default(), &pose(0.9), &config);
        assert!(!result.matched);
        assert_eq!(result.considered_joints, 0);
    }

    #[test]
    fn test_unscored_json_pose_is_not_evidence() {
        let unscored: Vec<serde_json::Value> = pose(0.9)
            .iter()
            .map(|kp| serde_json::json!({"name": kp.name, "x": kp.x, "y": kp.y}))
            .collect();
        let text = serde_json::Value::Array(unscored).to_string();
        let live = KeypointSet::from_json_str(&text).unwrap();
        assert_eq!(live.len(), pose(0.9).len());

        let result = score(&live, &live, &GameConfig::default());
        assert_eq!(result.considered_joints, 0);
        assert!(!result.matched);
        assert!((result.mean_angle_diff - DEGENERATE_ANGLE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let config = GameConfig::default().with_confidence(0.5);
        let result = score(&pose(0.5), &pose(0.9), &config);
        assert_eq!(result.considered_joints, 0);
    }

    #[test]
    fn test_missing_joint_only_narrows_evidence() {
        let config = GameConfig::default();
        let live: KeypointSet = pose(0.9)
            .iter()
            .filter(|kp| kp.name != "left_wrist")
            .cloned()
            .collect::<Vec<_>>()
            .into();
        let result = score(&live, &pose(0.9), &config);
        assert_eq!(result.considered_joints, 5);
        assert!(result.matched);
    }

    #[test]
    fn test_bent_elbow_changes_mean() {
        let config = GameConfig::default();
        let reference = pose(0.9);
        // Fold the left forearm straight up: the elbow goes from ~166° to 90°.
        let live = moved(&reference, "left_wrist", 160.0, 60.0);
        let result = score(&live, &reference, &config);
        assert_eq!(result.considered_joints, 6);
        assert!(result.mean_angle_diff > 10.0);
        assert!(result.matched);

        let strict = config.with_match_threshold(10.0);
        assert!(!score(&live, &reference, &strict).matched);
    }

    #[test]
    fn test_custom_joints() {
        let config = GameConfig::default().with_joints(vec![JointTriple::new(
            "left_shoulder",
            "left_elbow",
            "left_wrist",
        )]);
        let result = score(&pose(0.9), &pose(0.9), &config);
        assert_eq!(result.considered_joints, 1);
    }
}
