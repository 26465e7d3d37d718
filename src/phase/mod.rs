// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bounded concurrent phases.
//!
//! ```text
//! run_phase("remote checks", timeout, cancel, jobs)
//!   JoinSet::spawn_blocking(job) for every job
//!   drain until deadline
//!     first error / deadline -> cancel.cancel()
//!   keep draining (grace window) so in-flight git calls finish
//!   -> Ok(results) | Err(first error, rest logged)
//! ```
//!
//! Jobs are never aborted: a blocking git process cannot be interrupted
//! safely. Jobs observe `cancel` between steps instead.


use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{RemoteStateError, Result};

/// One unit of blocking work and the label it is logged under.
pub struct Job<T> {
    pub label: String,
    pub work: Box<dyn FnOnce() -> Result<T> + Send + 'static>,
}

impl<T> Job<T> {
    pub fn new<F>(label: impl Into<String>, work: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            label: label.into(),
            work: Box::new(work),
        }
    }
}

/// Run every job concurrently and wait for all of them.
///
/// Results come back in completion order.
///
/// # Errors
///
/// Returns `RemoteStateError::Timeout` if the phase outlives `limit`, else
/// the first job error. Later errors are logged.
pub async fn run_phase<T>(
    phase: &str,
    limit: Duration,
    cancel: &CancellationToken,
    jobs: Vec<Job<T>>,
) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    let mut set = JoinSet::new();
    for job in jobs {
        let Job { label, work } = job;
        set.spawn_blocking(move || {
            debug!(job = %label, "job started");
            work().map_err(|e| e.context(format!("{label} failed")))
        });
    }

    let total = set.len();
    let deadline = Instant::now() + limit;
    let mut results = Vec::with_capacity(total);
    let mut errors = Vec::new();
    let mut timed_out = false;

    loop {
        match timeout_at(deadline, set.join_next()).await {
            Ok(None) => break,
            Ok(Some(joined)) => match joined {
                Ok(Ok(value)) => results.push(value),
                Ok(Err(e)) => {
                    cancel.cancel();
                    errors.push(e);
                }
                Err(e) => {
                    cancel.cancel();
                    errors.push(anyhow::anyhow!("job panicked: {e}"));
                }
            },
            Err(_) => {
                timed_out = true;
                cancel.cancel();
                break;
            }
        }
    }

    if timed_out {
        warn!(phase, pending = set.len(), "phase timed out, waiting for running jobs");
        let grace = Instant::now() + limit;
        while let Ok(Some(joined)) = timeout_at(grace, set.join_next()).await {
            if let Ok(Err(e)) = joined {
                errors.push(e);
            }
        }
        if !set.is_empty() {
            warn!(phase, pending = set.len(), "detaching jobs that did not finish");
            set.detach_all();
        }
        for e in &errors {
            error!(phase, error = %e, "job error during timeout");
        }
        return Err(RemoteStateError::Timeout {
            phase: phase.to_string(),
            timeout_secs: limit.as_secs(),
        }
        .into());
    }

    let mut errors = errors.into_iter();
    if let Some(first) = errors.next() {
        for (i, e) in errors.enumerate() {
            error!(phase, error = %format!("{e:#}"), index = i + 2, "additional job error");
        }
        return Err(first);
    }

    debug!(phase, jobs = total, "phase complete");
    Ok(results)
}
