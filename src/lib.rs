// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)         config (TOML, env)
//!                |                     |
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          release          |
//!              |  orchestrator, rollback,  |
//!              |   linked conf, summary    |
//!              '--+--------+---------+-----'
//!                 |        |         |
//!                 v        v         v
//!            revisions  manifest  validate
//!              (JSON)   (XML)    cross deps,
//!                 |        |     remote state
//!                 +----+---+---------+
//!                      v
//!              phase (concurrent jobs)   git (ls-remote, clone, push)
//!
//!   +---------------------------------------------------+
//!   |  foundation   error, logging, utility, workdir    |
//!   +---------------------------------------------------+
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod manifest;
pub mod phase;
pub mod release;
pub mod revisions;
pub mod utility;
pub mod validate;
pub mod workdir;
