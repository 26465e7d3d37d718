// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Revision classification.
//!
//! ```text
//! "refs/heads/<name>"  --> Branch
//! "refs/tags/<name>"   --> Tag
//! 40 hex characters    --> CommitHash
//! anything else        --> Invalid
//! ```
//!
//! Classification happens before any network call. Short names found in
//! manifests (`revision="dunfell"`) are not valid here; they are resolved
//! against the remote by [`crate::git::repo::resolve_start_revision`].

use std::fmt;

pub const BRANCH_PREFIX: &str = "refs/heads/";
pub const TAG_PREFIX: &str = "refs/tags/";
pub const COMMIT_HASH_LEN: usize = 40;

/// Kind of a revision string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Branch,
    Tag,
    CommitHash,
    Invalid,
}

/// Returns true for exactly 40 hexadecimal characters.
#[must_use]
pub fn is_commit_hash(s: &str) -> bool {
    s.len() == COMMIT_HASH_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns true if `name` is a branch or tag ref with a well-formed name.
#[must_use]
pub fn is_valid_ref_name(name: &str) -> bool {
    let Some(short) = name
        .strip_prefix(BRANCH_PREFIX)
        .or_else(|| name.strip_prefix(TAG_PREFIX))
    else {
        return false;
    };
    // Reject forms git would normalize away or refuse outright.
    if short.is_empty()
        || short.starts_with('/')
        || short.ends_with('/')
        || short.contains("//")
        || short.contains("..")
        || short.ends_with(".lock")
    {
        return false;
    }
    gix::refs::FullName::try_from(name).is_ok()
}

/// Classify a revision string.
#[must_use]
pub fn classify_ref(name: &str) -> RefKind {
    if is_valid_ref_name(name) {
        if name.starts_with(BRANCH_PREFIX) {
            RefKind::Branch
        } else {
            RefKind::Tag
        }
    } else if is_commit_hash(name) {
        RefKind::CommitHash
    } else {
        RefKind::Invalid
    }
}

/// A validated revision.
///
/// Branches and tags hold their short name; the full ref is rebuilt on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Revision {
    Branch(String),
    Tag(String),
    Commit(String),
}

impl Revision {
    /// Parse a fully-qualified ref or commit hash.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match classify_ref(name) {
            RefKind::Branch => Some(Self::Branch(name[BRANCH_PREFIX.len()..].to_string())),
            RefKind::Tag => Some(Self::Tag(name[TAG_PREFIX.len()..].to_string())),
            RefKind::CommitHash => Some(Self::Commit(name.to_string())),
            RefKind::Invalid => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RefKind {
        match self {
            Self::Branch(_) => RefKind::Branch,
            Self::Tag(_) => RefKind::Tag,
            Self::Commit(_) => RefKind::CommitHash,
        }
    }

    /// Short form: branch or tag name, or the commit hash verbatim.
    #[must_use]
    pub fn short_name(&self) -> &str {
        match self {
            Self::Branch(s) | Self::Tag(s) | Self::Commit(s) => s,
        }
    }

    /// Fully-qualified form: `refs/heads/..`, `refs/tags/..`, or the hash.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            Self::Branch(s) => format!("{BRANCH_PREFIX}{s}"),
            Self::Tag(s) => format!("{TAG_PREFIX}{s}"),
            Self::Commit(s) => s.clone(),
        }
    }

    /// Branches and tags can be created; commits can only be referenced.
    #[must_use]
    pub const fn is_creatable(&self) -> bool {
        matches!(self, Self::Branch(_) | Self::Tag(_))
    }

    #[must_use]
    pub const fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Branch(s) => write!(f, "{BRANCH_PREFIX}{s}"),
            Self::Tag(s) => write!(f, "{TAG_PREFIX}{s}"),
            Self::Commit(s) => f.write_str(s),
        }
    }
}
