// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Shuffled sequences of reference poses.

use rand::Rng;

use crate::error::Result;
use crate::keypoints::KeypointSet;
use crate::loader::{ImageRef, ReferenceLoader};

/// A loaded reference pose.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePose {
    /// Stable identifier in `1..=N`.
    pub id: u32,
    /// Target keypoints.
    pub keypoints: KeypointSet,
    /// Illustrative image shown to the player.
    pub image: ImageRef,
}

/// Uniformly random permutation of `1..=n`.
///
/// Fisher–Yates from the last index down: position `i` swaps with a uniform
/// index in `[0, i]`, so every permutation is equally likely for a uniform `rng`.
pub fn build_sequence<R: Rng + ?Sized>(n: u32, rng: &mut R) -> Vec<u32> {
    let mut order: Vec<u32> = (1..=n).collect();
    for i in (1..order.len()).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }
    order
}

/// An ordered, fully loaded list of reference poses for one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    poses: Vec<ReferencePose>,
}

impl Sequence {
    /// Load every pose in `order`, one at a time and in order.
    ///
    /// # Errors
    ///
    /// The first loader failure aborts the whole load; no partial sequence is returned.
    pub fn load(order: &[u32], loader: &mut dyn ReferenceLoader) -> Result<Self> {
        let poses = order
            .iter()
            .map(|&id| {
                Ok(ReferencePose {
                    id,
                    keypoints: loader.load_keypoints(id)?,
                    image: loader.resolve_image(id)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { poses })
    }

    /// Pose at `index`, or `None` past the end.
    #[must_use]
    pub fn current(&self, index: usize) -> Option<&ReferencePose> {
        self.poses.get(index)
    }

    /// Number of poses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Check if the sequence is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Pose ids in play order.
    #[must_use]
    pub fn order(&self) -> Vec<u32> {
        self.poses.iter().map(|pose| pose.id).collect()
    }

    /// Iterate over poses in play order.
    pub fn iter(&self) -> std::slice::Iter<'_, ReferencePose> {
        self.poses.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PoseMatchError;
    use crate::keypoints::Keypoint;
    use crate::loader::MemoryLoader;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_build_sequence_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in 0..=20 {
            let mut order = build_sequence(n, &mut rng);
            assert_eq!(order.len(), n as usize);
            order.sort_unstable();
            assert_eq!(order, (1..=n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_build_sequence_seeded_is_reproducible() {
        let a = build_sequence(7, &mut StdRng::seed_from_u64(42));
        let b = build_sequence(7, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_sequence_is_uniform_per_position() {
        const N: u32 = 5;
        const TRIALS: u32 = 50_000;
        let mut rng = StdRng::seed_from_u64(2024);
        let mut counts = [[0_u32; N as usize]; N as usize];
        for _ in 0..TRIALS {
            for (pos, id) in build_sequence(N, &mut rng).into_iter().enumerate() {
                counts[pos][(id - 1) as usize] += 1;
            }
        }
        let expected = f64::from(TRIALS) / f64::from(N);
        for row in counts {
            for count in row {
                // 10,000 expected per cell; 5% leaves well over 10 standard deviations of slack.
                assert!((f64::from(count) - expected).abs() < expected * 0.05);
            }
        }
    }

    #[test]
    fn test_load_preserves_order() {
        let mut loader = (1..=3).fold(MemoryLoader::new(), |loader, id| {
            #[allow(clippy::cast_precision_loss)]
            let x = id as f32;
            loader.with_pose(id, KeypointSet::new(vec![Keypoint::new("nose", x, 0.0, 1.0)]))
        });
        let sequence = Sequence::load(&[3, 1, 2], &mut loader).unwrap();
        assert_eq!(sequence.order(), vec![3, 1, 2]);
        assert_eq!(sequence.len(), 3);
        let ids: Vec<u32> = sequence.iter().map(|pose| pose.id).collect();
        assert_eq!(ids, sequence.order());
        let first = sequence.current(0).unwrap();
        assert!((first.keypoints.get("nose").unwrap().x - 3.0).abs() < f32::EPSILON);
        assert_eq!(first.image.location(), "memory://pose3.png");
        assert!(sequence.current(3).is_none());
    }

    #[test]
    fn test_load_aborts_on_missing_pose() {
        let set = KeypointSet::new(vec![Keypoint::new("nose", 0.0, 0.0, 1.0)]);
        let mut loader = MemoryLoader::uniform(2, &set);
        let err = Sequence::load(&[1, 3, 2], &mut loader).unwrap_err();
        assert!(matches!(err, PoseMatchError::NotFound(_)));
    }
}
