// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote-state checks.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::PendingChange;
use crate::config::types::RemoteConfig;
use crate::error::{RemoteStateError, Result};
use crate::git::backend::GitClient;
use crate::git::refs::Revision;
use crate::phase::{Job, run_phase};
use crate::revisions::RevisionSpec;

/// Required state of a ref on its remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Expectation {
    /// About to be created.
    Absent,
    /// Only referenced.
    Present,
}

/// One ref to verify on one remote.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RemoteCheck {
    pub repo: String,
    pub url: String,
    pub revision: String,
    pub expect: Expectation,
}

impl RemoteCheck {
    /// Run the check against `client`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteStateError` on a mismatch, or a `GitError` if the
    /// remote cannot be listed.
    pub fn verify(&self, client: &dyn GitClient) -> Result<()> {
        let exists = client.ref_exists(&self.url, &self.revision)?;
        debug!(repo = %self.repo, rev = %self.revision, exists, "remote ref checked");
        match (self.expect, exists) {
            (Expectation::Absent, true) => Err(RemoteStateError::UnexpectedlyPresent {
                repo: self.repo.clone(),
                revision: self.revision.clone(),
                url: self.url.clone(),
            }
            .into()),
            (Expectation::Present, false) => Err(RemoteStateError::Missing {
                repo: self.repo.clone(),
                revision: self.revision.clone(),
                url: self.url.clone(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

/// One absence check per external repository target.
#[must_use]
pub fn external_checks(spec: &RevisionSpec, remote: &RemoteConfig) -> Vec<RemoteCheck> {
    spec.external()
        .map(|(repo, pair)| RemoteCheck {
            repo: repo.to_string(),
            url: remote.url_for(&remote.default_fetch, repo),
            revision: pair.target.full_name(),
            expect: Expectation::Absent,
        })
        .collect()
}

/// One check per distinct (project URL, target) among pending changes.
///
/// Commit hashes referenced by unmanaged projects are not listed by remotes
/// and are not checked.
#[must_use]
pub fn project_checks(changes: &[PendingChange]) -> Vec<RemoteCheck> {
    let checks: BTreeSet<RemoteCheck> = changes
        .iter()
        .filter_map(|change| {
            let expect = if change.project.managed {
                Expectation::Absent
            } else if matches!(change.target, Revision::Commit(_)) {
                return None;
            } else {
                Expectation::Present
            };
            Some(RemoteCheck {
                repo: change.project.name.full().to_string(),
                url: change.project.url.clone(),
                revision: change.target.full_name(),
                expect,
            })
        })
        .collect();
    checks.into_iter().collect()
}

/// Run `checks` concurrently under one deadline.
///
/// # Errors
///
/// Returns the first mismatch or remote failure, or a timeout.
pub async fn check_remote_state(
    phase: &str,
    client: &Arc<dyn GitClient>,
    checks: Vec<RemoteCheck>,
    limit: Duration,
    cancel: &CancellationToken,
) -> Result<()> {
    if checks.is_empty() {
        return Ok(());
    }
    info!(phase, checks = checks.len(), "validating remote repositories state");

    let jobs = checks
        .into_iter()
        .map(|check| {
            let client = Arc::clone(client);
            Job::new(
                format!("remote check of {} {}", check.repo, check.revision),
                move || check.verify(client.as_ref()),
            )
        })
        .collect();

    run_phase(phase, limit, cancel, jobs).await?;
    Ok(())
}
