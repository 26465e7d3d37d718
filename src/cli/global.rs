// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Options that do not change what a release does.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional config files (can repeat)
//! --verbose         ← Console at DEBUG at least
//! --log-level N     ← Console verbosity (0-6)
//! --file-log-level  ← File verbosity (defaults to TRACE)
//! --log-file PATH   ← Enables file logging
//!
//! Precedence: CLI flags > RELMAN_* > --config > release-manager.toml > defaults
//! ```

use clap::Args;
use std::path::PathBuf;

/// Logging and configuration options.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append)]
    pub configs: Vec<PathBuf>,

    /// Enables debug output on the console.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// File log level.
    #[arg(long = "file-log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Prints the effective configuration and exits.
    #[arg(long = "show-config")]
    pub show_config: bool,
}

impl GlobalOptions {
    /// Converts command-line options to configuration overrides.
    #[must_use]
    pub fn to_config_overrides(&self) -> Vec<(&'static str, i64)> {
        let mut overrides = Vec::new();

        if let Some(level) = self.log_level {
            overrides.push(("global.output_log_level", i64::from(level)));
        }
        if let Some(level) = self.file_log_level {
            overrides.push(("global.file_log_level", i64::from(level)));
        }

        overrides
    }
}
