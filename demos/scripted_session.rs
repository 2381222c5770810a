// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Example script demonstrating a complete game without a camera.
//!
//! This example covers:
//! 1. Building reference poses from a YOLO-style `(N, 17, 3)` keypoint array.
//! 2. Driving a [`Session`] with a scripted estimator and a printing sink.
//! 3. Skipping a pose and restarting the game.

use ndarray::Array3;
use posematch::keypoints::poses_from_array;
use posematch::{
    Frame, GameConfig, GameController, HoldMode, KeypointSet, MemoryLoader, PoseEstimator,
    PresentationSink, Result, Session, Snapshot,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Holds every reference pose in turn, looking away for a few frames each time.
struct Mimic {
    poses: Vec<KeypointSet>,
    order: Vec<u32>,
    frames_per_pose: usize,
}

impl PoseEstimator for Mimic {
    fn estimate(&mut self, frame: &Frame) -> Result<Vec<KeypointSet>> {
        let slot = frame.index / self.frames_per_pose;
        let Some(&id) = self.order.get(slot) else {
            return Ok(Vec::new());
        };
        // Nobody in view for the first frames of every pose.
        if frame.index % self.frames_per_pose < 3 {
            return Ok(Vec::new());
        }
        Ok(self.poses.get(id as usize - 1).cloned().into_iter().collect())
    }
}

struct Printer;

impl PresentationSink for Printer {
    fn on_frame(&mut self, snapshot: &Snapshot) {
        if let Some(score) = snapshot.last_score {
            println!(
                "pose {}/{}  progress {:>3.0}%  mean diff {:.1}°",
                snapshot.current_index + 1,
                snapshot.total,
                snapshot.progress * 100.0,
                score.mean_angle_diff
            );
        }
    }

    fn on_complete(&mut self, snapshot: &Snapshot) {
        println!("completed all {} poses", snapshot.total);
    }

    fn on_error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Three synthetic poses: arms out, left arm raised, both arms raised.
#[allow(clippy::cast_precision_loss)]
fn reference_array() -> Array3<f32> {
    let mut data = Array3::<f32>::zeros((3, 17, 3));
    for pose in 0..3 {
        for k in 0..17 {
            data[[pose, k, 0]] = 100.0 + 10.0 * k as f32;
            data[[pose, k, 1]] = 100.0 + 20.0 * (k / 2) as f32;
            data[[pose, k, 2]] = 0.9;
        }
        // Wrists (9, 10) above elbows (7, 8) for raised arms.
        if pose >= 1 {
            data[[pose, 9, 1]] = 20.0;
        }
        if pose == 2 {
            data[[pose, 10, 1]] = 20.0;
        }
    }
    data
}

fn main() -> Result<()> {
    // 1. Reference poses from model-style output
    let poses = poses_from_array(reference_array().view())?;
    let loader = poses
        .iter()
        .zip(1..)
        .fold(MemoryLoader::new(), |loader, (pose, id)| loader.with_pose(id, pose.clone()));

    // 2. A short frame-count hold so the script finishes quickly
    let config = GameConfig::new()
        .with_total_poses(3)
        .with_hold(HoldMode::Count { frames: 5 });
    let game = GameController::new(config, loader)?.with_rng(StdRng::seed_from_u64(7));
    let mut session = Session::new(game);
    let mut sink = Printer;
    session.begin(&mut sink)?;

    let order = session.game().sequence().order();
    println!("order: {order:?}");
    let mut mimic = Mimic {
        poses,
        order,
        frames_per_pose: 8,
    };
    let frames = (0..100).map(|index| Frame {
        index,
        timestamp_ms: None,
    });
    let report = session.run(&mut mimic, frames, &mut sink)?;
    println!("{report:?}");

    // 3. Skip straight through a restarted game
    session.restart(&mut sink)?;
    while session.game().current().is_some() {
        session.game_mut().skip();
    }
    println!("after skipping: {}", session.game().phase());

    Ok(())
}
