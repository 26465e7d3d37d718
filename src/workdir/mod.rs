// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Temporary working directory for all clones of a run.
//!
//! ```text
//! <tmp>/mbl_XXXXXX/
//!   mbl-manifest/          external clones  <work>/<short>
//!   default/mbl-core/      manifest clones  <work>/<file>/<short>
//! ```
//!
//! Removed when dropped unless kept.


use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::info;

use crate::error::{FsError, ReleaseResult};

#[derive(Debug)]
pub struct WorkDir {
    dir: TempDir,
    keep: bool,
}

impl WorkDir {
    /// Create a fresh directory under the system temp dir.
    ///
    /// # Errors
    ///
    /// Returns an `FsError` if the directory cannot be created.
    pub fn create(prefix: &str, keep: bool) -> ReleaseResult<Self> {
        Self::create_in(&std::env::temp_dir(), prefix, keep)
    }

    /// Create a fresh directory under `parent`.
    ///
    /// # Errors
    ///
    /// Returns an `FsError` if the directory cannot be created.
    pub fn create_in(parent: &Path, prefix: &str, keep: bool) -> ReleaseResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .map_err(|e| FsError::io(parent, e))?;
        info!(path = %dir.path().display(), keep, "working directory created");
        Ok(Self { dir, keep })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Destination of an external repository clone.
    #[must_use]
    pub fn external_dest(&self, short_name: &str) -> PathBuf {
        self.path().join(short_name)
    }

    /// Destination of a manifest project clone.
    #[must_use]
    pub fn manifest_dest(&self, manifest: &str, short_name: &str) -> PathBuf {
        self.path().join(manifest).join(short_name)
    }

    /// Remove the directory, or keep it and return its path.
    #[must_use]
    pub fn finish(self) -> Option<PathBuf> {
        if self.keep {
            let path = self.dir.keep();
            info!(path = %path.display(), "working directory kept");
            Some(path)
        } else {
            None
        }
    }
}
