// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Google-repo manifest model.
//!
//! ```text
//! hub clone/
//!   default.xml  --parse-->  ManifestDocument { id: "default", projects }
//!   rpi3.xml     --parse-->  ManifestDocument { id: "rpi3", .. }
//!
//! apply_revision(project, new_ref)
//!   refs/heads/<default>  -> drop revision attribute
//!   commit hash           -> revision="<hash>"
//!   branch / tag          -> revision="<short name>"
//!   always                -> drop upstream attribute
//!
//! write(backup_suffix)  file -> file<suffix>, then rewritten file
//! ```

mod parse;
mod rewrite;


use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::config::types::{RemoteConfig, RunConfig};
use crate::error::{FsError, ReleaseResult, Result};
use crate::git::refs::Revision;
use crate::git::repo::RepoName;
use crate::utility::fs::walk::{WalkOptions, find_files};

/// One `<project>` entry.
#[derive(Debug, Clone)]
pub struct ManifestProject {
    pub name: RepoName,
    /// Remote key the project refers to.
    pub remote: String,
    /// Fetch prefix of that remote.
    pub fetch: String,
    pub url: String,
    /// Explicit revision, or the manifest default.
    pub revision: String,
    pub explicit_revision: bool,
    /// Owned by the release process and eligible for branch/tag creation.
    pub managed: bool,
    /// Ordinal among the document's `<project>` elements.
    pub(crate) index: usize,
}

/// Pending change to a project's `revision` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionEdit {
    /// Fall back to the manifest default.
    Remove,
    Set(String),
}

impl RevisionEdit {
    /// Edit that makes a project point at `target`.
    #[must_use]
    pub fn for_target(target: &Revision, default_revision: &str) -> Self {
        match target {
            Revision::Branch(name) if name == default_revision => Self::Remove,
            other => Self::Set(other.short_name().to_string()),
        }
    }
}

/// One parsed manifest file.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    /// File base name without `.xml`.
    pub id: String,
    pub path: PathBuf,
    pub default_revision: String,
    /// Remote key to fetch prefix.
    pub remotes: BTreeMap<String, String>,
    projects: BTreeMap<String, ManifestProject>,
    source: String,
    edits: BTreeMap<usize, RevisionEdit>,
}

impl ManifestDocument {
    /// Parse manifest text. `path` is used for the identifier and messages.
    ///
    /// # Errors
    ///
    /// Returns a `ManifestError` for malformed XML, a missing attribute, a
    /// project name that is not `prefix/name`, an undeclared remote, or two
    /// projects sharing a short name.
    pub fn parse(
        path: &Path,
        text: &str,
        remote_config: &RemoteConfig,
        fallback_revision: &str,
    ) -> ReleaseResult<Self> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Ok(parse::parse_document(
            path,
            id,
            text,
            remote_config,
            fallback_revision,
        )?)
    }

    #[must_use]
    pub fn project(&self, full_name: &str) -> Option<&ManifestProject> {
        self.projects.get(full_name)
    }

    /// Projects sorted by full name.
    pub fn projects(&self) -> impl Iterator<Item = &ManifestProject> {
        self.projects.values()
    }

    /// Record `new_ref` for a project. Returns the edit, or `None` if the
    /// project is not in this document.
    pub fn apply_revision(&mut self, full_name: &str, new_ref: &Revision) -> Option<RevisionEdit> {
        let project = self.projects.get_mut(full_name)?;
        let edit = RevisionEdit::for_target(new_ref, &self.default_revision);
        match &edit {
            RevisionEdit::Remove => {
                project.revision.clone_from(&self.default_revision);
                project.explicit_revision = false;
            }
            RevisionEdit::Set(revision) => {
                project.revision.clone_from(revision);
                project.explicit_revision = true;
            }
        }
        self.edits.insert(project.index, edit.clone());
        Some(edit)
    }

    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.edits.is_empty()
    }

    /// Document text with pending edits applied.
    ///
    /// # Errors
    ///
    /// Returns a `ManifestError` if the source no longer parses.
    pub fn render(&self) -> ReleaseResult<String> {
        Ok(rewrite::rewrite(&self.path, &self.source, &self.edits)?)
    }

    /// Back up the file and overwrite it with the edited text.
    ///
    /// Returns the backup path, or `None` when there was nothing to write.
    ///
    /// # Errors
    ///
    /// Returns an `FsError` if the backup or the write fails.
    pub fn write(&self, backup_suffix: &str) -> ReleaseResult<Option<PathBuf>> {
        if !self.has_edits() {
            return Ok(None);
        }
        let rendered = self.render()?;
        let backup = backup_path(&self.path, backup_suffix);
        std::fs::copy(&self.path, &backup).map_err(|e| FsError::io(&backup, e))?;
        std::fs::write(&self.path, rendered).map_err(|e| FsError::io(&self.path, e))?;
        info!(file = %self.path.display(), backup = %backup.display(), "manifest rewritten");
        Ok(Some(backup))
    }
}

/// `file` with `suffix` appended to its name.
#[must_use]
pub fn backup_path(file: &Path, suffix: &str) -> PathBuf {
    let mut name = file.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Parse every top-level `*.xml` file of a hub clone.
///
/// # Errors
///
/// Returns an error if the directory cannot be walked, a file cannot be
/// read, or a manifest is invalid.
pub fn parse_manifests(
    hub_path: &Path,
    remote_config: &RemoteConfig,
    run_config: &RunConfig,
) -> Result<Vec<ManifestDocument>> {
    let files = find_files(hub_path, "*.xml", &WalkOptions::top_level())
        .with_context(|| format!("failed to list manifests in {}", hub_path.display()))?;

    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        debug!(file = %file.display(), "parsing manifest");
        let text = std::fs::read_to_string(&file).map_err(|e| FsError::io(&file, e))?;
        let document =
            ManifestDocument::parse(&file, &text, remote_config, &run_config.default_revision)?;
        debug!(
            manifest = %document.id,
            projects = document.projects.len(),
            default = %document.default_revision,
            "manifest parsed"
        );
        documents.push(document);
    }
    Ok(documents)
}
