// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release orchestration.
//!
//! ```text
//! run()
//!   parse + validate revision document          (no network)
//!   hub unit: clone, create branch              (push deferred)
//!   parse manifests, cross-dependencies
//!   external + manifest remote checks [concurrent]
//!   units: clone, create, push        [concurrent]
//!   finalize:
//!     rewrite manifests (backup first)
//!     linked config: rewrite, commit, push
//!     hub: commit, push
//!   completed = true
//! finally
//!   !completed -> delete every recorded push, newest first
//! ```

pub mod context;
pub mod linked;
pub mod prompt;
pub mod report;
pub mod unit;


use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, error, info, warn};

use crate::error::{Result, abort};
use crate::git::repo::RepoName;
use crate::manifest::{ManifestDocument, parse_manifests};
use crate::phase::{Job, run_phase};
use crate::revisions::RevisionSpec;
use crate::validate::remote::{check_remote_state, external_checks, project_checks};
use crate::validate::{PendingChange, check_cross_dependencies, pending_changes};
use crate::workdir::WorkDir;

use context::{RunContext, RunFlags};
use linked::{LinkedPin, update_conf_file};
use report::{EventKind, EventLog, Summary};
use unit::{UnitOrigin, UnitOutcome, WorkUnit, publish, run_unit};

/// Drives one release from an input document.
pub struct ReleaseManager {
    ctx: RunContext,
    input: PathBuf,
}

impl ReleaseManager {
    #[must_use]
    pub fn new(ctx: RunContext, input: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            input: input.into(),
        }
    }

    #[must_use]
    pub const fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Run the release.
    ///
    /// On any failure after the first push, every push recorded so far is
    /// deleted from its remote before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first validation, remote-state, git, or filesystem error.
    pub async fn run(&self) -> Result<Summary> {
        let started = Instant::now();
        let config = self.ctx.config();

        let spec = RevisionSpec::from_file(&self.input)
            .with_context(|| format!("cannot load {}", self.input.display()))?;
        spec.validate_structure(&config.repos)?;
        info!(input = %self.input.display(), "revision document validated");

        let workdir = WorkDir::create(
            &config.run.work_dir_prefix,
            self.ctx.flags().contains(RunFlags::KEEP_WORKDIR),
        )?;

        let mut completed = false;
        let result = self.execute(spec, &workdir, &mut completed).await;
        if !completed {
            self.ctx.cancel_token().cancel();
            let ctx = self.ctx.clone();
            if let Err(e) = tokio::task::spawn_blocking(move || rollback(&ctx)).await {
                error!(error = %e, "rollback panicked");
            }
        }
        let kept = workdir.finish();

        let log = result?;
        Ok(Summary {
            events: log.into_events(),
            workdir: kept,
            elapsed: started.elapsed(),
            simulated: self.ctx.flags().contains(RunFlags::SIMULATE),
        })
    }

    async fn execute(
        &self,
        spec: RevisionSpec,
        workdir: &WorkDir,
        completed: &mut bool,
    ) -> Result<EventLog> {
        let config = self.ctx.config();
        let limit = config.run.phase_timeout();
        let cancel = self.ctx.cancel_token();
        let mut log = EventLog::default();

        let hub_unit = external_unit(&self.ctx, &spec, &config.repos.hub, workdir)?;
        let ctx = self.ctx.clone();
        let hub_job = Job::new(format!("{} (hub)", hub_unit.name), move || {
            run_unit(&ctx, hub_unit)
        });
        let mut hub = run_phase("clone hub", limit, cancel, vec![hub_job])
            .await?
            .pop()
            .ok_or_else(|| abort("hub clone returned no result"))?;
        log.merge(std::mem::take(&mut hub.events));

        let manifests = parse_manifests(&hub.clone.path, &config.remote, &config.run)?;
        check_cross_dependencies(&spec, &manifests, &config.repos)?;
        let changes = pending_changes(&spec, &manifests);
        info!(
            manifests = manifests.len(),
            changes = changes.len(),
            "cross dependencies validated"
        );

        let mut checks = external_checks(&spec, &config.remote);
        checks.extend(project_checks(&changes));
        check_remote_state("remote state checks", self.ctx.git(), checks, limit, cancel).await?;

        let units = plan_units(&self.ctx, &spec, &changes, workdir)?;
        info!(units = units.len(), "creating revisions");
        let jobs = units
            .into_iter()
            .map(|unit| {
                let ctx = self.ctx.clone();
                Job::new(format!("{} ({})", unit.name, unit.origin), move || {
                    run_unit(&ctx, unit)
                })
            })
            .collect();
        let mut outcomes = run_phase("clone and create revisions", limit, cancel, jobs).await?;
        outcomes.sort_by(|a, b| {
            (&a.unit.origin, a.unit.name.full()).cmp(&(&b.unit.origin, b.unit.name.full()))
        });
        for outcome in &mut outcomes {
            log.merge(std::mem::take(&mut outcome.events));
        }

        let ctx = self.ctx.clone();
        let finalize_job = Job::new("finalize", move || {
            finalize(&ctx, &spec, manifests, &changes, hub, outcomes)
        });
        let finalized = run_phase("finalize", limit, cancel, vec![finalize_job])
            .await?
            .pop()
            .ok_or_else(|| abort("finalize returned no result"))?;
        log.merge(finalized);

        *completed = true;
        Ok(log)
    }
}

fn external_unit(
    ctx: &RunContext,
    spec: &RevisionSpec,
    repo: &str,
    workdir: &WorkDir,
) -> Result<WorkUnit> {
    let pair = spec
        .external_pair(repo)
        .ok_or_else(|| abort(format!("{repo} is not in the external scope")))?;
    let name = RepoName::parse(repo).ok_or_else(|| abort(format!("bad repository name {repo}")))?;
    let remote = &ctx.config().remote;
    Ok(WorkUnit {
        url: remote.url_for(&remote.default_fetch, repo),
        fetch: remote.default_fetch.clone(),
        origin: UnitOrigin::External,
        start: pair.start.full_name(),
        target: pair.target.clone(),
        dest: workdir.external_dest(name.short()),
        name,
    })
}

/// Every external repository but the hub, and every managed project with a
/// pending change. A repository listed in several manifests with the same
/// target gets one unit.
fn plan_units(
    ctx: &RunContext,
    spec: &RevisionSpec,
    changes: &[PendingChange],
    workdir: &WorkDir,
) -> Result<Vec<WorkUnit>> {
    let hub = &ctx.config().repos.hub;
    let mut units = Vec::new();
    let mut planned = HashSet::new();
    for (repo, _) in spec.external() {
        if repo != hub {
            let unit = external_unit(ctx, spec, repo, workdir)?;
            planned.insert((unit.url.clone(), unit.target.full_name()));
            units.push(unit);
        }
    }
    for change in changes.iter().filter(|c| c.project.managed) {
        let project = &change.project;
        if !planned.insert((project.url.clone(), change.target.full_name())) {
            debug!(
                repo = %project.name,
                manifest = %change.manifest,
                "revision already planned from another manifest"
            );
            continue;
        }
        units.push(WorkUnit {
            name: project.name.clone(),
            origin: UnitOrigin::Manifest(change.manifest.clone()),
            fetch: project.fetch.clone(),
            url: project.url.clone(),
            start: project.revision.clone(),
            target: change.target.clone(),
            dest: workdir.manifest_dest(&change.manifest, project.name.short()),
        });
    }
    Ok(units)
}

/// Rewrite manifests and linked configuration, then commit and push the
/// repositories whose push was deferred.
fn finalize(
    ctx: &RunContext,
    spec: &RevisionSpec,
    mut manifests: Vec<ManifestDocument>,
    changes: &[PendingChange],
    hub: UnitOutcome,
    outcomes: Vec<UnitOutcome>,
) -> Result<EventLog> {
    let config = ctx.config();
    let git = ctx.git().as_ref();
    let suffix = &config.run.backup_suffix;
    let mut log = EventLog::default();

    for change in changes {
        if let Some(document) = manifests.iter_mut().find(|m| m.id == change.manifest) {
            document.apply_revision(change.project.name.full(), &change.target);
        }
    }
    for document in &manifests {
        if let Some(backup) = document.write(suffix)? {
            log.push(
                EventKind::Backup,
                format!(
                    "Created backup file {} from {}",
                    backup.display(),
                    document.path.display()
                ),
            );
            log.push(
                EventKind::ModifyFile,
                format!("Updated project revisions in {}", document.path.display()),
            );
        }
    }

    let pins = linked_pins(ctx, spec, &outcomes)?;
    let identity = config.remote.commit_identity();
    for outcome in outcomes.iter().filter(|o| o.is_deferred()) {
        if outcome.unit.name.full() == config.repos.linked_repo {
            let path = &outcome.clone.path;
            let file = path.join(&config.repos.linked_conf_path);
            let update = update_conf_file(&file, &config.repos.linked_url_host, &pins, suffix)
                .with_context(|| format!("cannot update linked configuration of {}", outcome.unit.name))?;
            log.push(
                EventKind::Backup,
                format!(
                    "Created backup file {} from {}",
                    update.backup.display(),
                    file.display()
                ),
            );
            if update.changed {
                git.stage_file(path, &file)?;
                git.commit(path, &config.run.commit_message, identity)?;
                log.push(
                    EventKind::ModifyFile,
                    format!("Updated linked repositories in {}", file.display()),
                );
            }
        }
        publish(ctx, &outcome.clone, &outcome.unit.target, &mut log)?;
    }

    let hub_path = &hub.clone.path;
    if manifests.iter().any(ManifestDocument::has_edits) {
        git.stage_tracked(hub_path)?;
        git.commit(hub_path, &config.run.commit_message, identity)?;
    }
    publish(ctx, &hub.clone, &hub.unit.target, &mut log)?;

    info!(pushes = ctx.ledger().len(), "release finalized");
    Ok(log)
}

/// New branch and commit of every external repository the linked
/// configuration can pin.
fn linked_pins(
    ctx: &RunContext,
    spec: &RevisionSpec,
    outcomes: &[UnitOutcome],
) -> Result<Vec<LinkedPin>> {
    let repos = &ctx.config().repos;
    let mut pins = Vec::new();
    for (repo, pair) in spec.external() {
        if repos.is_special(repo) {
            continue;
        }
        let Some(outcome) = outcomes
            .iter()
            .find(|o| o.unit.origin == UnitOrigin::External && o.unit.name.full() == repo)
        else {
            continue;
        };
        pins.push(LinkedPin {
            repo: repo.to_string(),
            branch: pair.target.short_name().to_string(),
            commit: ctx.git().head_commit(&outcome.clone.path)?,
        });
    }
    Ok(pins)
}

/// Close the ledger and delete every recorded push, newest first.
///
/// Workers still running after this point undo their own pushes.
fn rollback(ctx: &RunContext) {
    let records = ctx.ledger().close();
    if records.is_empty() {
        return;
    }
    warn!(count = records.len(), "rolling back pushed revisions");
    for record in records.iter().rev() {
        ctx.undo_push(record);
    }
}
