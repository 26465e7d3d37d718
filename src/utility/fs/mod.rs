// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities.
//!
//! ```text
//! walk:  find_files()   ignore::WalkParallel + wax glob, sorted
//!        WalkOptions    max_depth, hidden, gitignore
//! ```

pub mod walk;
