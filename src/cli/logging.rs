// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;

/// Global verbosity flag.
static VERBOSE: AtomicBool = AtomicBool::new(true);

/// Width of the hold meter in characters.
const BAR_WIDTH: usize = 20;

/// Set the global verbosity flag.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Check if verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Kind of terminal message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Plain line on stdout.
    Info,
    /// Stderr, yellow prefix.
    Warn,
    /// Stderr, red prefix.
    Error,
    /// Stdout, green check mark.
    Success,
    /// Stdout, only when verbose.
    Verbose,
    /// Blank line plus a cyan header, only when verbose.
    Section,
}

impl Level {
    const fn to_stderr(self) -> bool {
        matches!(self, Self::Warn | Self::Error)
    }
}

/// Format a message, or `None` if the level is silenced at this verbosity.
pub fn render(level: Level, message: &str, verbose: bool) -> Option<String> {
    match level {
        Level::Info => Some(message.to_string()),
        Level::Warn => Some(format!("{} {message}", "WARNING ⚠️".yellow().bold())),
        Level::Error => Some(format!("{} {message}", "Error:".red().bold())),
        Level::Success => Some(format!("{} {message}", "✅".green())),
        Level::Verbose => verbose.then(|| message.to_string()),
        Level::Section => verbose.then(|| format!("\n{}", message.cyan().bold())),
    }
}

/// Print a message at `level`. Used by the logging macros.
pub fn emit(level: Level, args: fmt::Arguments<'_>) {
    let Some(line) = render(level, &args.to_string(), is_verbose()) else {
        return;
    };
    if level.to_stderr() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

/// Render hold progress in `[0, 1]` as a fixed-width meter.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn hold_bar(progress: f32) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let filled = ((progress * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled).green(),
        "-".repeat(BAR_WIDTH - filled).dimmed(),
        progress * 100.0
    )
}

/// Macro for standard info messages.
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Info, format_args!($($arg)*))
    };
}

/// Macro for warning messages.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Warn, format_args!($($arg)*))
    };
}

/// Macro for error messages.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Error, format_args!($($arg)*))
    };
}

/// Macro for success messages.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Success, format_args!($($arg)*))
    };
}

/// Macro for verbose messages.
#[macro_export]
macro_rules! verbose {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Verbose, format_args!($($arg)*))
    };
}

/// Macro for section headers.
#[macro_export]
macro_rules! section {
    ($($arg:tt)*) => {
        $crate::cli::logging::emit($crate::cli::logging::Level::Section, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_toggle() {
        set_verbose(false);
        assert!(!is_verbose());

        set_verbose(true);
        assert!(is_verbose());
    }

    #[test]
    fn test_render_levels() {
        colored::control::set_override(false);
        assert_eq!(render(Level::Info, "3 frames", false).as_deref(), Some("3 frames"));
        assert_eq!(
            render(Level::Warn, "stream ended", false).as_deref(),
            Some("WARNING ⚠️ stream ended")
        );
        assert_eq!(render(Level::Error, "no poses", false).as_deref(), Some("Error: no poses"));
        assert_eq!(render(Level::Success, "done", false).as_deref(), Some("✅ done"));
        assert!(Level::Error.to_stderr());
        assert!(!Level::Success.to_stderr());
    }

    #[test]
    fn test_render_respects_verbosity() {
        colored::control::set_override(false);
        assert_eq!(render(Level::Verbose, "order: 3 1 2", false), None);
        assert_eq!(render(Level::Section, "Pose 1/7", false), None);
        assert_eq!(render(Level::Verbose, "order: 3 1 2", true).as_deref(), Some("order: 3 1 2"));
        assert_eq!(render(Level::Section, "Pose 1/7", true).as_deref(), Some("\nPose 1/7"));
    }

    #[test]
    fn test_hold_bar() {
        colored::control::set_override(false);
        assert_eq!(hold_bar(0.0), format!("[{}]   0%", "-".repeat(BAR_WIDTH)));
        assert_eq!(hold_bar(0.5), format!("[{}{}]  50%", "#".repeat(10), "-".repeat(10)));
        assert_eq!(hold_bar(2.0), format!("[{}] 100%", "#".repeat(BAR_WIDTH)));
    }
}
