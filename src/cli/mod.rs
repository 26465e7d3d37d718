// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module using clap derive.
//!
//! # Invocation
//!
//! ```text
//! release-manager [global options] [-d] [-s] [-k] <INPUT>
//! release-manager [global options] --show-config
//! ```

pub mod global;
pub mod release;


use crate::cli::global::GlobalOptions;
use crate::cli::release::ReleaseArgs;
use clap::Parser;

/// Multi-Repository Release Coordinator
///
/// Creates release branches and tags across every repository of a
/// Google-repo manifest set.
#[derive(Debug, Parser)]
#[command(
    name = "release-manager",
    author,
    version,
    about = "Multi-repository release coordinator",
    long_about = "release-manager Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Reads a JSON document of new revisions, clones the manifest hub\n\
                  and every affected repository, creates the new branches and tags,\n\
                  pushes them, and rewrites the manifests to point at them. Any\n\
                  failure after the first push deletes everything pushed so far.",
    after_help = "INPUT FORMAT:\n\n\
                  {\n  \
                    \"_external_\": { \"armmbed/mbl-manifest\": [\"refs/heads/warrior\", \"refs/heads/mbl-os-0.9\"] },\n  \
                    \"_common_\":   { \"armmbed/mbl-core\": \"refs/heads/mbl-os-0.9\" },\n  \
                    \"default\":    { \"armmbed/meta-mbl\": \"refs/tags/mbl-os-0.9.0\" }\n\
                  }\n\n\
                  CONFIG FILES:\n\n\
                  `release-manager.toml` in the current directory is loaded if present.\n\
                  Additional files can be given with --config. RELMAN_SECTION__KEY\n\
                  environment variables override both."
)]
pub struct Cli {
    /// Logging and configuration options
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Release options
    #[command(flatten)]
    pub release: ReleaseArgs,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
