// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release run arguments.
//!
//! ```text
//! <INPUT>               revision document (.json, must exist)
//! -d/--diagnostic       confirm every push
//! -s/--simulate         everything but the push
//! -k/--keep-workdir     leave the clones behind
//! ```

use clap::Args;
use std::path::{Path, PathBuf};

use crate::error::InputError;
use crate::release::context::RunFlags;

/// Arguments of a release run.
#[derive(Debug, Clone, Default, Args)]
pub struct ReleaseArgs {
    /// JSON document listing the new revisions.
    #[arg(
        value_name = "INPUT",
        value_parser = input_document,
        required_unless_present = "show_config"
    )]
    pub input: Option<PathBuf>,

    /// Asks for confirmation before every push.
    #[arg(short = 'd', long)]
    pub diagnostic: bool,

    /// Performs every step except pushing to remotes.
    #[arg(short = 's', long)]
    pub simulate: bool,

    /// Keeps the temporary working directory after the run.
    #[arg(short = 'k', long = "keep-workdir")]
    pub keep_workdir: bool,
}

impl ReleaseArgs {
    #[must_use]
    pub fn flags(&self) -> RunFlags {
        let mut flags = RunFlags::empty();
        flags.set(RunFlags::DIAGNOSTIC, self.diagnostic);
        flags.set(RunFlags::SIMULATE, self.simulate);
        flags.set(RunFlags::KEEP_WORKDIR, self.keep_workdir);
        flags
    }
}

/// Accept an existing `.json` file.
///
/// # Errors
///
/// Returns `InputError::BadInputPath` if the file is missing or has another
/// extension.
pub fn input_document(raw: &str) -> Result<PathBuf, InputError> {
    let path = Path::new(raw);
    let bad = |message: &str| InputError::BadInputPath {
        path: raw.to_string(),
        message: message.to_string(),
    };
    if !path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        return Err(bad("expected a .json file"));
    }
    if !path.is_file() {
        return Err(bad("file not found"));
    }
    Ok(path.to_path_buf())
}
