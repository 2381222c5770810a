// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Joint-angle geometry.

use crate::keypoints::Keypoint;

/// Angle reported when a joint vector has zero length.
///
/// 180° is the largest possible joint angle, so a degenerate joint reads as
/// maximally different from any well-formed one instead of producing NaN.
pub const DEGENERATE_ANGLE: f32 = 180.0;

/// Calculate the angle at vertex `b` formed by the rays `b→a` and `b→c`.
///
/// # Arguments
///
/// * `a` - Proximal point `(x, y)`.
/// * `b` - Vertex point `(x, y)`.
/// * `c` - Distal point `(x, y)`.
///
/// # Returns
///
/// Angle in degrees within `[0, 180]`, or [`DEGENERATE_ANGLE`] when either ray
/// has zero length.
#[must_use]
pub fn angle_at(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);

    let mag_ba = ba.0.hypot(ba.1);
    let mag_bc = bc.0.hypot(bc.1);
    let denom = mag_ba * mag_bc;
    if denom == 0.0 || !denom.is_finite() {
        return DEGENERATE_ANGLE;
    }

    let cos = (ba.0 * bc.0 + ba.1 * bc.1) / denom;
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// [`angle_at`] over three keypoints.
#[must_use]
pub fn joint_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> f32 {
    angle_at(a.xy(), b.xy(), c.xy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_angle() {
        let angle = angle_at((1.0, 0.0), (0.0, 0.0), (0.0, 1.0));
        assert!((angle - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_collinear_is_straight() {
        let angle = angle_at((0.0, 0.0), (5.0, 0.0), (10.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-3);

        let angle = angle_at((0.0, 0.0), (5.0, 5.0), (10.0, 10.0));
        assert!((angle - 180.0).abs() < 0.1);
    }

    #[test]
    fn test_folded_is_zero() {
        let angle = angle_at((2.0, 0.0), (0.0, 0.0), (4.0, 0.0));
        assert!(angle.abs() < 1e-4);
    }

    #[test]
    fn test_coincident_points_return_sentinel() {
        let angle = angle_at((3.0, 3.0), (3.0, 3.0), (3.0, 3.0));
        assert!(!angle.is_nan());
        assert!((angle - DEGENERATE_ANGLE).abs() < f32::EPSILON);

        let angle = angle_at((3.0, 3.0), (3.0, 3.0), (7.0, 1.0));
        assert!((angle - DEGENERATE_ANGLE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_direction_independent() {
        let a = (12.0, -3.0);
        let b = (1.5, 2.0);
        let c = (-4.0, 9.0);
        assert!((angle_at(a, b, c) - angle_at(c, b, a)).abs() < 1e-4);
    }

    #[test]
    fn test_joint_angle_uses_positions() {
        let a = Keypoint::new("left_shoulder", 0.0, 10.0, 0.9);
        let b = Keypoint::new("left_elbow", 0.0, 0.0, 0.9);
        let c = Keypoint::new("left_wrist", 10.0, 0.0, 0.9);
        assert!((joint_angle(&a, &b, &c) - 90.0).abs() < 1e-4);
    }
}
