// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use posematch::{
    DirectoryLoader, GameConfig, GameController, HoldMode, HttpLoader, ManualClock, Phase, PresentationSink,
    ReferenceLoader, ReplayEstimator, Result, Session, SessionEnd, Snapshot, VERSION,
    build_sequence,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::args::{PlayArgs, ShuffleArgs};
use crate::cli::logging::hold_bar;
use crate::{error, info, section, success, verbose, warn};

/// Prints game progress to the terminal.
#[derive(Debug, Default)]
struct TerminalSink {
    shown_index: Option<usize>,
    last_tenth: Option<u32>,
}

impl PresentationSink for TerminalSink {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn on_frame(&mut self, snapshot: &Snapshot) {
        if snapshot.phase != Phase::Running {
            return;
        }
        if self.shown_index != Some(snapshot.current_index) {
            self.shown_index = Some(snapshot.current_index);
            self.last_tenth = None;
            let image = snapshot
                .current_image
                .as_ref()
                .map_or_else(String::new, ToString::to_string);
            section!("Pose {}/{}  {image}", snapshot.current_index + 1, snapshot.total);
        }

        // One meter line per 10% step keeps long streams readable.
        let tenth = (snapshot.progress * 10.0).floor() as u32;
        if self.last_tenth != Some(tenth) {
            self.last_tenth = Some(tenth);
            let diff = snapshot
                .last_score
                .map_or_else(|| "-".to_string(), |s| format!("{:.1}°", s.mean_angle_diff));
            verbose!("  {}  mean diff {diff}", hold_bar(snapshot.progress));
        }
    }

    fn on_complete(&mut self, snapshot: &Snapshot) {
        success!("All {} poses completed!", snapshot.total);
    }

    fn on_error(&mut self, message: &str) {
        error!("{message}");
    }
}

/// Build the game configuration from an optional file plus command-line overrides.
fn build_config(args: &PlayArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(n) = args.poses_count {
        config = config.with_total_poses(n);
    }
    if let Some(mode) = args.mode {
        config = config.with_hold(mode);
    }
    if let Some(threshold) = args.threshold {
        config = config.with_match_threshold(threshold);
    }
    if let Some(conf) = args.conf {
        config = config.with_confidence(conf);
    }
    config.validate()?;
    Ok(config)
}

fn rng_for(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}

fn controller<L: ReferenceLoader + 'static>(
    config: GameConfig,
    loader: L,
    seed: Option<u64>,
    clock: ManualClock,
) -> Result<GameController> {
    Ok(GameController::new(config, loader)?
        .with_rng(rng_for(seed))
        .with_clock(clock))
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Play a game against a recorded pose stream.
pub fn run_play(args: &PlayArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let config = match build_config(args) {
        Ok(c) => c,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let mut estimator = match ReplayEstimator::open(&args.stream) {
        Ok(r) => r,
        Err(e) => {
            error!("{}", e.user_message());
            process::exit(1);
        }
    };
    if estimator.is_empty() {
        warn!("pose stream {} has no frames", args.stream.display());
    }
    let frames = estimator.frames();
    if frames.iter().any(|f| f.timestamp_ms.is_none()) && matches!(config.hold, HoldMode::Time { .. }) {
        warn!("some frames have no t_ms; time-based holds only advance on timestamped frames");
    }

    verbose!(
        "posematch {VERSION} | {} poses | hold {} | threshold {}° | conf {}",
        config.total_poses,
        config.hold,
        config.match_threshold,
        config.confidence_threshold
    );

    let clock = ManualClock::new();
    let game = if is_url(&args.poses) {
        controller(config, HttpLoader::new(&args.poses), args.seed, clock.clone())
    } else {
        DirectoryLoader::new(&args.poses)
            .and_then(|loader| controller(config, loader, args.seed, clock.clone()))
    };
    let game = match game {
        Ok(g) => g,
        Err(e) => {
            error!("{}", e.user_message());
            process::exit(1);
        }
    };

    let mut session = Session::new(game).with_frame_clock(clock);
    let mut sink = TerminalSink::default();
    if session.begin(&mut sink).is_err() {
        process::exit(1);
    }
    let order = session.game().sequence().order();
    verbose!(
        "Order: {}",
        order.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    );

    let report = match session.run(&mut estimator, frames, &mut sink) {
        Ok(r) => r,
        Err(_) => process::exit(1),
    };

    let game = session.game();
    info!(
        "{} frames, {} without a pose, {}/{} poses confirmed",
        report.frames,
        report.empty_frames,
        game.confirmations(),
        game.total()
    );
    match report.end {
        SessionEnd::Completed => {}
        SessionEnd::Exhausted => {
            warn!(
                "pose stream ended at pose {}/{}",
                game.current_index() + 1,
                game.total()
            );
        }
        SessionEnd::Stopped | SessionEnd::NotRunning => process::exit(1),
    }
}

/// Print a shuffled pose order.
pub fn run_shuffle(args: &ShuffleArgs) {
    let order = build_sequence(args.count, &mut rng_for(args.seed));
    info!(
        "{}",
        order.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Commands};
    use clap::Parser;

    fn play_args(extra: &[&str]) -> PlayArgs {
        let mut argv = vec!["app", "play", "-p", "poses", "-s", "s.jsonl"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Play(args) => args,
            Commands::Shuffle(_) => panic!("expected play"),
        }
    }

    #[test]
    fn test_build_config_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        GameConfig::new()
            .with_total_poses(4)
            .with_match_threshold(20.0)
            .save(&path)
            .unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let args = play_args(&["-c", &path_arg, "--mode", "instant", "--conf", "0.6"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.total_poses, 4);
        assert!((config.match_threshold - 20.0).abs() < f32::EPSILON);
        assert!((config.confidence_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.hold, HoldMode::Instant);
    }

    #[test]
    fn test_build_config_rejects_invalid_override() {
        let args = play_args(&["--poses-count", "0"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/poses"));
        assert!(is_url("http://localhost:8000"));
        assert!(!is_url("poses/"));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = build_sequence(7, &mut rng_for(Some(5)));
        let b = build_sequence(7, &mut rng_for(Some(5)));
        assert_eq!(a, b);
    }
}
