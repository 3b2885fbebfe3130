//! Diagnostic output
//!
//! All diagnostics go to standard error as `hbrender: <level>: <message>`.
//! The gating flags live in an immutable [`Verbosity`] built from the
//! command line; it is applied once when the logger is installed.

use std::io::{IsTerminal, Write};

use colored::Colorize;
use eyre::Result;
use log::{Level, LevelFilter};

use crate::PROG;

/// Logging flags taken from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verbosity {
    pub debug: bool,
    pub verbose: bool,
    pub quiet: bool,
}

impl Verbosity {
    pub fn new(debug: bool, verbose: bool, quiet: bool) -> Self {
        // --debug implies --verbose
        Self {
            debug,
            verbose: verbose || debug,
            quiet,
        }
    }

    /// Most detailed level that is still printed
    ///
    /// `quiet` wins over `verbose` and `debug`; errors are never filtered.
    pub fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }
}

/// Label printed between the program name and the message
pub fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warning",
        Level::Info => "info",
        Level::Debug | Level::Trace => "debug",
    }
}

fn colored_label(level: Level) -> colored::ColoredString {
    let label = level_label(level);
    match level {
        Level::Error => label.red().bold(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug | Level::Trace => label.dimmed(),
    }
}

/// Install the process logger for the given verbosity
pub fn setup_logging(verbosity: Verbosity) -> Result<()> {
    colored::control::set_override(std::io::stderr().is_terminal());

    env_logger::Builder::from_default_env()
        .filter_level(verbosity.level_filter())
        .target(env_logger::Target::Stderr)
        .format(|buf, record| writeln!(buf, "{}: {}: {}", PROG, colored_label(record.level()), record.args()))
        .try_init()?;
    Ok(())
}
