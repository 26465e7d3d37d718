// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository names and local working copies.
//!
//! ```text
//! "armmbed/meta-mbl"
//!  ^^^^^^^ ^^^^^^^^
//!  prefix  short name
//!
//! ClonedRepository::materialize(client, name, url, dest, start)
//!   start already classified (Branch | Tag | Commit)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::backend::{GitMutation, RemoteRefs};
use super::refs::{BRANCH_PREFIX, Revision, TAG_PREFIX};
use crate::error::{GitError, ReleaseResult};

/// A `prefix/short-name` repository name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoName {
    full: String,
    split: usize,
}

impl RepoName {
    /// Split at the last `/`; both halves must be non-empty.
    #[must_use]
    pub fn parse(full: &str) -> Option<Self> {
        let (prefix, short) = full.rsplit_once('/')?;
        if prefix.is_empty() || short.is_empty() {
            return None;
        }
        Some(Self {
            full: full.to_string(),
            split: prefix.len(),
        })
    }

    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.full[..self.split]
    }

    #[must_use]
    pub fn short(&self) -> &str {
        &self.full[self.split + 1..]
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Classify a starting revision taken from a manifest or the input document.
///
/// Fully-qualified refs and commit hashes are returned as-is. A short name
/// is looked up on the remote: a branch wins over a tag of the same name.
///
/// # Errors
///
/// Returns `GitError::RefNotFound` if the short name is neither a branch nor
/// a tag, or a `GitError` if the remote cannot be listed.
pub fn resolve_start_revision<C>(client: &C, url: &str, raw: &str) -> ReleaseResult<Revision>
where
    C: RemoteRefs + ?Sized,
{
    if let Some(revision) = Revision::parse(raw) {
        return Ok(revision);
    }

    let refs = client.list_remote_refs(url)?;
    let has = |full: String| refs.iter().any(|r| r.name == full);
    if has(format!("{BRANCH_PREFIX}{raw}")) {
        Ok(Revision::Branch(raw.to_string()))
    } else if has(format!("{TAG_PREFIX}{raw}")) {
        Ok(Revision::Tag(raw.to_string()))
    } else {
        Err(GitError::RefNotFound {
            name: raw.to_string(),
            url: url.to_string(),
        }
        .into())
    }
}

/// A local working copy of one remote repository.
#[derive(Debug, Clone)]
pub struct ClonedRepository {
    pub name: RepoName,
    /// Remote URL prefix the URL was built from.
    pub fetch: String,
    pub url: String,
    pub path: PathBuf,
    /// Revision checked out by the clone.
    pub checkout: Revision,
}

impl ClonedRepository {
    /// Clone `url` into `dest` at `start`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CloneFailed` if the clone fails.
    pub fn materialize<C>(
        client: &C,
        name: RepoName,
        fetch: &str,
        url: &str,
        dest: &Path,
        start: Revision,
    ) -> ReleaseResult<Self>
    where
        C: GitMutation + ?Sized,
    {
        debug!(repo = %name, url, rev = %start, path = %dest.display(), "cloning");
        client.clone_at(url, dest, &start)?;
        Ok(Self {
            name,
            fetch: fetch.to_string(),
            url: url.to_string(),
            path: dest.to_path_buf(),
            checkout: start,
        })
    }
}
