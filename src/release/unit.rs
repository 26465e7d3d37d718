// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One repository to change.
//!
//! ```text
//! Pending -> Cloned -> RevisionCreated -> Pushed | PushSkipped -> Recorded
//!                            |
//!                            '-> (hub / linked-config repo) push deferred
//! ```

use std::fmt;
use std::path::PathBuf;

use anyhow::Context;
use tracing::{debug, info, warn};

use super::context::{PushRecord, RunContext, RunFlags};
use super::prompt::{PushDecision, PushRequest};
use super::report::{EventKind, EventLog};
use crate::error::{Result, abort};
use crate::git::backend::PushOutcome;
use crate::git::refs::Revision;
use crate::git::repo::{ClonedRepository, RepoName, resolve_start_revision};

/// Where a unit was requested.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum UnitOrigin {
    External,
    /// Manifest identifier.
    Manifest(String),
}

impl fmt::Display for UnitOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => f.write_str("external"),
            Self::Manifest(id) => write!(f, "manifest {id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Pending,
    Cloned,
    RevisionCreated,
    Pushed,
    PushSkipped,
    Recorded,
}

/// Clone, create and (usually) push one new revision.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub name: RepoName,
    pub origin: UnitOrigin,
    pub fetch: String,
    pub url: String,
    /// Fully-qualified ref, commit hash, or a manifest short name.
    pub start: String,
    pub target: Revision,
    pub dest: PathBuf,
}

/// A finished unit, merged into the run at the join point.
#[derive(Debug)]
pub struct UnitOutcome {
    pub unit: WorkUnit,
    pub clone: ClonedRepository,
    pub state: UnitState,
    pub events: EventLog,
}

impl UnitOutcome {
    /// Push still owed by the run (hub and linked-config repositories).
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self.state, UnitState::RevisionCreated)
    }
}

fn advance(unit: &WorkUnit, state: &mut UnitState, next: UnitState) {
    debug!(repo = %unit.name, from = ?*state, to = ?next, "unit state");
    *state = next;
}

/// Run one unit to completion.
///
/// # Errors
///
/// Returns an error naming the repository and URL if any step fails, or if
/// the run was cancelled before the unit started or pushed.
pub fn run_unit(ctx: &RunContext, unit: WorkUnit) -> Result<UnitOutcome> {
    let mut state = UnitState::Pending;
    let mut events = EventLog::default();

    if ctx.is_cancelled() {
        return Err(abort(format!("{} not started: run cancelled", unit.name)).into());
    }

    let git = ctx.git().as_ref();
    let start = resolve_start_revision(git, &unit.url, &unit.start)
        .with_context(|| format!("cannot resolve start revision of {} ({})", unit.name, unit.url))?;

    let clone = ClonedRepository::materialize(
        git,
        unit.name.clone(),
        &unit.fetch,
        &unit.url,
        &unit.dest,
        start,
    )
    .with_context(|| format!("cannot clone {} from {}", unit.name, unit.url))?;
    advance(&unit, &mut state, UnitState::Cloned);

    let path = &clone.path;
    match &unit.target {
        Revision::Branch(name) => {
            git.create_branch(path, name)?;
            events.push(
                EventKind::Branch,
                format!(
                    "Created branch {} in {} ({}) at {}",
                    name,
                    unit.name,
                    unit.origin,
                    path.display()
                ),
            );
        }
        Revision::Tag(name) => {
            git.create_tag(path, name)?;
            events.push(
                EventKind::Tag,
                format!(
                    "Created tag {} in {} ({}) at {}",
                    name,
                    unit.name,
                    unit.origin,
                    path.display()
                ),
            );
        }
        Revision::Commit(hash) => {
            return Err(abort(format!("{}: commit {hash} cannot be created", unit.name)).into());
        }
    }
    git.checkout(path, unit.target.short_name())
        .with_context(|| format!("cannot check out {} in {}", unit.target, unit.name))?;
    advance(&unit, &mut state, UnitState::RevisionCreated);
    info!(repo = %unit.name, rev = %unit.target, path = %path.display(), "revision created");

    if !ctx.config().repos.is_special(unit.name.full()) {
        let pushed = publish(ctx, &clone, &unit.target, &mut events)?;
        advance(&unit, &mut state, pushed);
        advance(&unit, &mut state, UnitState::Recorded);
    }

    Ok(UnitOutcome {
        unit,
        clone,
        state,
        events,
    })
}

/// Push `target` from `clone`, honoring simulate and diagnostic modes.
///
/// Returns `Pushed` or `PushSkipped`. A real push that creates the ref is
/// recorded in the ledger; one that finds it already present is not.
///
/// # Errors
///
/// Returns an error if the run was cancelled, the operator quit, or the
/// push failed.
pub fn publish(
    ctx: &RunContext,
    clone: &ClonedRepository,
    target: &Revision,
    events: &mut EventLog,
) -> Result<UnitState> {
    let reference = target.full_name();
    let repo = clone.name.full();

    if ctx.is_cancelled() {
        return Err(abort(format!("push of {reference} to {repo} cancelled")).into());
    }

    let git = ctx.git().as_ref();
    if ctx.flags().contains(RunFlags::DIAGNOSTIC) {
        let commit = if ctx.config().repos.is_special(repo) {
            Some(git.head_commit(&clone.path)?)
        } else {
            None
        };
        let request = PushRequest {
            repo,
            reference: &reference,
            url: &clone.url,
            path: &clone.path,
            commit: commit.as_deref(),
        };
        match ctx.confirm().confirm(&request)? {
            PushDecision::Push => {}
            PushDecision::Skip => {
                events.push(
                    EventKind::SkipPush,
                    format!("Skipped push of {reference} to {}", clone.url),
                );
                return Ok(UnitState::PushSkipped);
            }
            PushDecision::Quit => {
                return Err(abort(format!("operator quit before pushing {reference} to {repo}")).into());
            }
        }
    }

    if ctx.flags().contains(RunFlags::SIMULATE) {
        info!(repo, rev = %reference, "simulated push");
        events.push(
            EventKind::Push,
            format!("Pushed {reference} to {} (simulated)", clone.url),
        );
        return Ok(UnitState::Pushed);
    }

    let remote = &ctx.config().remote.remote_name;
    let outcome = git
        .push(&clone.path, remote, &reference)
        .with_context(|| format!("push of {reference} to {repo} ({}) failed", clone.url))?;
    match outcome {
        PushOutcome::Pushed => {
            let record = PushRecord {
                repo: repo.to_string(),
                url: clone.url.clone(),
                path: clone.path.clone(),
                reference: reference.clone(),
            };
            if let Err(late) = ctx.ledger().record(record) {
                warn!(repo, rev = %reference, "push finished after rollback, deleting it");
                ctx.undo_push(&late);
                return Err(abort(format!("push of {reference} to {repo} finished after rollback")).into());
            }
            info!(repo, rev = %reference, url = %clone.url, "pushed");
            events.push(EventKind::Push, format!("Pushed {reference} to {}", clone.url));
        }
        PushOutcome::AlreadyExists => {
            info!(repo, rev = %reference, "ref already on remote");
            events.push(
                EventKind::Push,
                format!("{reference} already present on {}", clone.url),
            );
        }
    }
    Ok(UnitState::Pushed)
}
