// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! `posematch` command-line entry point.

mod cli;

use clap::Parser;

use crate::cli::args::{Cli, Commands};
use crate::cli::play::{run_play, run_shuffle};

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Play(args) => run_play(args),
        Commands::Shuffle(args) => run_shuffle(args),
    }
}
