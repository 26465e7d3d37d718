// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-run state shared by every worker.
//!
//! ```text
//! RunContext (Clone, all Arc)
//!   config   git   confirm   cancel
//!   ledger: PushLedger   Mutex<{records, closed}>, appended on each push
//!           close() drains it for rollback; later pushes are undone by
//!           the worker that made them
//!   flags:  SIMULATE | DIAGNOSTIC | KEEP_WORKDIR
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use bitflags::bitflags;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::prompt::PushConfirm;
use crate::config::Config;
use crate::git::backend::GitClient;

bitflags! {
    /// Operator switches for one run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RunFlags: u8 {
        /// Do everything except pushing.
        const SIMULATE = 0x01;

        /// Ask before every push.
        const DIAGNOSTIC = 0x02;

        /// Leave the working directory in place.
        const KEEP_WORKDIR = 0x04;
    }
}

/// A ref this run created on a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRecord {
    pub repo: String,
    pub url: String,
    /// Clone the push was made from.
    pub path: PathBuf,
    pub reference: String,
}

#[derive(Debug, Default)]
struct LedgerState {
    records: Vec<PushRecord>,
    closed: bool,
}

/// Pushes to undo if the run fails.
#[derive(Debug, Default)]
pub struct PushLedger {
    state: Mutex<LedgerState>,
}

impl PushLedger {
    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record. A second record of the same ref on the same remote
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Hands the record back if the ledger was already closed by a rollback;
    /// the caller must undo that push itself.
    pub fn record(&self, record: PushRecord) -> std::result::Result<(), PushRecord> {
        let mut state = self.lock();
        if state.closed {
            return Err(record);
        }
        let duplicate = state
            .records
            .iter()
            .any(|r| r.url == record.url && r.reference == record.reference);
        if !duplicate {
            state.records.push(record);
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Drain every record, oldest first.
    pub fn take(&self) -> Vec<PushRecord> {
        std::mem::take(&mut self.lock().records)
    }

    /// Drain every record and refuse any later one.
    pub fn close(&self) -> Vec<PushRecord> {
        let mut state = self.lock();
        state.closed = true;
        std::mem::take(&mut state.records)
    }
}

/// Everything a worker needs, cheap to clone.
#[derive(Clone)]
pub struct RunContext {
    config: Arc<Config>,
    git: Arc<dyn GitClient>,
    confirm: Arc<dyn PushConfirm>,
    flags: RunFlags,
    cancel: CancellationToken,
    ledger: Arc<PushLedger>,
}

impl RunContext {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        git: Arc<dyn GitClient>,
        confirm: Arc<dyn PushConfirm>,
        flags: RunFlags,
    ) -> Self {
        Self {
            config,
            git,
            confirm,
            flags,
            cancel: CancellationToken::new(),
            ledger: Arc::new(PushLedger::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn git(&self) -> &Arc<dyn GitClient> {
        &self.git
    }

    #[must_use]
    pub fn confirm(&self) -> &dyn PushConfirm {
        self.confirm.as_ref()
    }

    #[must_use]
    pub const fn flags(&self) -> RunFlags {
        self.flags
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn ledger(&self) -> &PushLedger {
        &self.ledger
    }

    /// Delete a pushed ref from its remote. Failures are logged.
    pub fn undo_push(&self, record: &PushRecord) {
        let remote = &self.config.remote.remote_name;
        match self
            .git
            .delete_remote_ref(&record.path, remote, &record.reference)
        {
            Ok(()) => {
                info!(repo = %record.repo, rev = %record.reference, url = %record.url, "push rolled back");
            }
            Err(e) => error!(
                repo = %record.repo,
                rev = %record.reference,
                url = %record.url,
                error = %e,
                "rollback failed, delete the ref manually"
            ),
        }
    }
}
