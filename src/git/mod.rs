// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git capability layer.
//!
//! ```text
//!     refs.rs                repo.rs
//!  classify_ref        RepoName, ClonedRepository
//!  Revision            resolve_start_revision
//!        \                 /
//!         v               v
//!      ,---------------------,
//!      |  backend (traits)   |
//!      '--+-------+------+---'
//!         |       |      |
//!         v       v      v
//!   RemoteRefs GitQuery GitMutation
//!   (ls-remote) (gix)   (CLI, write)
//! ```
//!
//! No business logic lives here: the release orchestrator decides what to
//! clone, create and push.

pub mod backend;
pub mod refs;
pub mod repo;

#[cfg(test)]
mod tests;

#[cfg(test)]
pub(crate) mod test_utils;
