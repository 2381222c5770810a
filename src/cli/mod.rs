// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for playing recorded sessions.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! terminal logging and the `play` and `shuffle` command implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Terminal output.
pub mod logging;

/// Play and shuffle commands.
pub mod play;
