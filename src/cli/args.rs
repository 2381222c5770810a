// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use posematch::HoldMode;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Play Options:
    --poses, -p <POSES>      Directory or HTTP(S) base URL holding pose{N}.json and pose{N}.png
    --stream, -s <STREAM>    Recorded pose stream (JSON lines)
    --config, -c <CONFIG>    TOML game configuration
    --poses-count <N>        Poses per game [default: 7]
    --mode <MODE>            Hold mode: time[:ms], count[:frames] or instant [default: time:3000]
    --threshold <DEG>        Mean joint-angle difference that counts as a match [default: 45]
    --conf <CONF>            Keypoint confidence threshold [default: 0.4]
    --seed <SEED>            Seed for a reproducible pose order
    --verbose                Show verbose output

Examples:
    posematch play --poses poses/ --stream session.jsonl
    posematch play -p poses/ -s session.jsonl --mode count:50 --threshold 30
    posematch play -p https://example.com/poses -s session.jsonl --seed 7
    posematch shuffle --count 7 --seed 42"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a game against a recorded pose stream
    Play(PlayArgs),
    /// Print a shuffled pose order
    Shuffle(ShuffleArgs),
}

/// Arguments for the play command.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Directory or HTTP(S) base URL holding the reference poses
    #[arg(short, long)]
    pub poses: String,

    /// Recorded pose stream (JSON lines)
    #[arg(short, long)]
    pub stream: PathBuf,

    /// TOML game configuration; command-line values take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Poses per game
    #[arg(long)]
    pub poses_count: Option<u32>,

    /// Hold mode: time[:ms], count[:frames] or instant
    #[arg(long)]
    pub mode: Option<HoldMode>,

    /// Mean joint-angle difference in degrees that counts as a match
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Keypoint confidence threshold
    #[arg(long)]
    pub conf: Option<f32>,

    /// Seed for a reproducible pose order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the shuffle command.
#[derive(Args, Debug)]
pub struct ShuffleArgs {
    /// Number of poses
    #[arg(short = 'n', long, default_value_t = 7)]
    pub count: u32,

    /// Seed for a reproducible order
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_play_args_defaults() {
        let args = Cli::parse_from(["app", "play", "--poses", "poses", "--stream", "s.jsonl"]);
        match args.command {
            Commands::Play(play) => {
                assert_eq!(play.poses, "poses");
                assert_eq!(play.stream, PathBuf::from("s.jsonl"));
                assert!(play.config.is_none());
                assert!(play.mode.is_none());
                assert!(play.seed.is_none());
                assert!(play.verbose);
            }
            Commands::Shuffle(_) => panic!("expected play"),
        }
    }

    #[test]
    fn test_play_args_custom() {
        let args = Cli::parse_from([
            "app",
            "play",
            "-p",
            "https://example.com/poses",
            "-s",
            "s.jsonl",
            "--poses-count",
            "3",
            "--mode",
            "count:20",
            "--threshold",
            "30",
            "--conf",
            "0.5",
            "--seed",
            "9",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Play(play) => {
                assert_eq!(play.poses_count, Some(3));
                assert_eq!(play.mode, Some(HoldMode::Count { frames: 20 }));
                assert!((play.threshold.unwrap() - 30.0).abs() < f32::EPSILON);
                assert!((play.conf.unwrap() - 0.5).abs() < f32::EPSILON);
                assert_eq!(play.seed, Some(9));
                assert!(!play.verbose);
            }
            Commands::Shuffle(_) => panic!("expected play"),
        }
    }

    #[test]
    fn test_play_rejects_bad_mode() {
        let result = Cli::try_parse_from(["app", "play", "-p", "x", "-s", "y", "--mode", "forever"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_shuffle_args() {
        let args = Cli::parse_from(["app", "shuffle", "-n", "5", "--seed", "1"]);
        match args.command {
            Commands::Shuffle(shuffle) => {
                assert_eq!(shuffle.count, 5);
                assert_eq!(shuffle.seed, Some(1));
            }
            Commands::Play(_) => panic!("expected shuffle"),
        }
    }
}
