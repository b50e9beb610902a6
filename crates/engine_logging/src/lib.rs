#![deny(missing_docs)]
//! Shared logging utilities for the common-values workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! the [`Verbosity`] switch shared by the binary and its tests, and a minimal
//! test initializer for the global logger.

use log::LevelFilter;

/// How chatty a run should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Only report serious problems.
    Quiet,
    /// Per-key progress and summaries.
    #[default]
    Normal,
    /// Everything, including each requested page.
    Verbose,
}

impl Verbosity {
    /// Resolves the command-line flags; `verbose` wins over `quiet`.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    /// The `log` filter matching this verbosity.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Warn,
            Verbosity::Normal => LevelFilter::Info,
            Verbosity::Verbose => LevelFilter::Debug,
        }
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        Verbosity::Verbose.level_filter()
    } else {
        Verbosity::Normal.level_filter()
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::Verbosity;
    use log::LevelFilter;

    #[test]
    fn verbose_overrides_quiet() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn levels_follow_verbosity() {
        assert_eq!(Verbosity::Quiet.level_filter(), LevelFilter::Warn);
        assert_eq!(Verbosity::Normal.level_filter(), LevelFilter::Info);
        assert_eq!(Verbosity::Verbose.level_filter(), LevelFilter::Debug);
    }
}
