// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!               ReleaseError (~24 bytes)
//!                      |
//!   +------+------+----+----+------+-----+----+--------+
//!   |      |      |    |    |      |     |    |        |
//!   v      v      v    v    v      v     v    v        v
//! Input Manifest Cross Remote Git Config Fs Aborted Io/Other
//!  Box    Box    Box   Box   Box   Box   Box Box<str> Box
//!
//! Sub-errors (unboxed internally):
//!   Input     Malformed, MissingScope, BadPairLength, InvalidRevision
//!   Manifest  Xml, MalformedName, UnknownRemote, DuplicateProject
//!   Cross     UnknownManifest, UnknownRepository, NotCreatable
//!   Remote    UnexpectedlyPresent, Missing, Timeout
//!   Git       Gix, CommandFailed, CloneFailed, PushFailed
//!   Config    InvalidValue
//!   Fs        NotFound, IoError, BadFormat
//! ```
//!
//! Kinds are ordered by the stage that reports them: input problems surface
//! before any network activity, cross-dependency problems after the manifests
//! are parsed, remote-state problems before any unit is cloned.

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`ReleaseError`].
pub type ReleaseResult<T> = std::result::Result<T, ReleaseError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The run was stopped before completion (operator quit, phase timeout,
    /// or a sibling worker failure).
    #[error("aborted: {0}")]
    Aborted(Box<str>),

    /// Malformed or structurally invalid revision document.
    #[error("input error: {0}")]
    Input(#[from] Box<InputError>),

    /// Manifest file could not be parsed or written.
    #[error("manifest error: {0}")]
    Manifest(#[from] Box<ManifestError>),

    /// Revision document does not match the parsed manifests.
    #[error("cross-dependency error: {0}")]
    CrossDependency(#[from] Box<CrossDependencyError>),

    /// Remote repository is not in the state the release requires.
    #[error("remote state error: {0}")]
    RemoteState(#[from] Box<RemoteStateError>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Filesystem error.
    #[error("filesystem error: {0}")]
    Fs(#[from] Box<FsError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

/// Create a [`ReleaseError::Aborted`] that stops the run and triggers rollback.
pub fn abort(message: impl Into<String>) -> ReleaseError {
    ReleaseError::Aborted(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for ReleaseError {
                fn from(err: $error) -> Self {
                    ReleaseError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    InputError => Input,
    ManifestError => Manifest,
    CrossDependencyError => CrossDependency,
    RemoteStateError => RemoteState,
    GitError => Git,
    ConfigError => Config,
    FsError => Fs,
    std::io::Error => Io,
}

// --- Input Errors ---

/// Problems with the operator-supplied revision document.
#[derive(Debug, Error)]
pub enum InputError {
    /// Input path is missing or has the wrong extension.
    #[error("invalid input path '{path}': {message}")]
    BadInputPath { path: String, message: String },

    /// Document is not valid JSON, or repeats a key.
    #[error("malformed revision document: {message}")]
    Malformed { message: String },

    /// A mandatory scope is absent.
    #[error("mandatory scope '{scope}' is missing")]
    MissingScope { scope: String },

    /// The hub repository is absent from the external scope.
    #[error("repository '{repo}' must be listed in scope '{scope}'")]
    MissingHubEntry { repo: String, scope: String },

    /// A value has the wrong JSON type for its scope.
    #[error("scope '{scope}', repository '{repo}': {message}")]
    WrongShape {
        scope: String,
        repo: String,
        message: String,
    },

    /// External pair does not have exactly two elements.
    #[error("scope '{scope}', repository '{repo}': expected [start, target], got {len} element(s)")]
    BadPairLength {
        scope: String,
        repo: String,
        len: usize,
    },

    /// External pair repeats the same revision.
    #[error("scope '{scope}', repository '{repo}': start and target are both '{revision}'")]
    IndistinctPair {
        scope: String,
        repo: String,
        revision: String,
    },

    /// Revision string is neither a branch ref, a tag ref, nor a commit hash.
    #[error("scope '{scope}', repository '{repo}': invalid revision '{revision}'")]
    InvalidRevision {
        scope: String,
        repo: String,
        revision: String,
    },

    /// Repository key appears in more than one file scope.
    #[error("repository '{repo}' appears in scopes '{first}' and '{second}'")]
    DuplicateAcrossScopes {
        repo: String,
        first: String,
        second: String,
    },

    /// Target revision cannot be created (a commit hash, or a tag where a
    /// branch is required).
    #[error("repository '{repo}': target '{revision}' cannot be created, expected {expected}")]
    NotCreatable {
        repo: String,
        revision: String,
        expected: &'static str,
    },
}

// --- Manifest Errors ---

/// Manifest parse and rewrite errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// XML syntax error.
    #[error("{path}: XML error at byte {position}: {message}")]
    Xml {
        path: String,
        position: u64,
        message: String,
    },

    /// A required attribute is missing.
    #[error("{path}: <{element}> without '{attribute}' attribute")]
    MissingAttribute {
        path: String,
        element: &'static str,
        attribute: &'static str,
    },

    /// Project name is not of the form `prefix/short-name`.
    #[error("{path}: project name '{name}' is not of the form prefix/name")]
    MalformedName { path: String, name: String },

    /// Project refers to a remote that is not declared.
    #[error("{path}: project '{project}' refers to unknown remote '{remote}'")]
    UnknownRemote {
        path: String,
        project: String,
        remote: String,
    },

    /// Two projects share the same short name.
    #[error("{path}: project '{short_name}' repeats multiple times")]
    DuplicateProject { path: String, short_name: String },
}

// --- Cross-Dependency Errors ---

/// Mismatches between the revision document and the parsed manifests.
#[derive(Debug, Error)]
pub enum CrossDependencyError {
    /// File scope names a manifest that does not exist.
    #[error("scope '{scope}' does not name a manifest file (known: {known})")]
    UnknownManifest { scope: String, known: String },

    /// Repository is not a project of the referenced manifest(s).
    #[error("scope '{scope}': repository '{repo}' not found in {location}")]
    UnknownRepository {
        scope: String,
        repo: String,
        location: String,
    },

    /// Project target cannot be created or committed on.
    #[error("{manifest}: repository '{repo}' needs {expected}, got '{revision}'")]
    NotCreatable {
        manifest: String,
        repo: String,
        revision: String,
        expected: &'static str,
    },
}

// --- Remote State Errors ---

/// Remote repositories not in the state required by the release.
#[derive(Debug, Error)]
pub enum RemoteStateError {
    /// A ref that is about to be created already exists.
    #[error("repository '{repo}': revision '{revision}' already exists on remote {url}")]
    UnexpectedlyPresent {
        repo: String,
        revision: String,
        url: String,
    },

    /// A referenced ref does not exist.
    #[error("repository '{repo}': revision '{revision}' does not exist on remote {url}")]
    Missing {
        repo: String,
        revision: String,
        url: String,
    },

    /// The phase did not complete in time.
    #[error("{phase} did not complete within {timeout_secs} seconds")]
    Timeout { phase: String, timeout_secs: u64 },
}

// --- Gix Errors ---

/// Wrapper for gix-specific errors.
#[derive(Debug, Error)]
pub enum GixError {
    /// Failed to discover repository from path.
    #[error("failed to discover repository: {0}")]
    Discover(#[from] Box<gix::discover::Error>),

    /// Failed to read the commit HEAD points to.
    #[error("failed to resolve HEAD in {path}: {message}")]
    HeadCommit { path: String, message: String },
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git executable is not on PATH.
    #[error("git executable not found in PATH")]
    ExecutableNotFound,

    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// Error from gix library.
    #[error("gix error: {0}")]
    Gix(#[from] GixError),

    /// Clone operation failed.
    #[error("failed to clone {url} at {revision}: {message}")]
    CloneFailed {
        url: String,
        revision: String,
        message: String,
    },

    /// Push rejected for a reason other than a concurrent creation.
    #[error("failed to push {reference} to {remote}: {message}")]
    PushFailed {
        remote: String,
        reference: String,
        message: String,
    },

    /// Short revision name is neither a branch nor a tag on the remote.
    #[error("revision '{name}' is neither a branch nor a tag on {url}")]
    RefNotFound { name: String, url: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Filesystem Errors ---

/// Filesystem operation errors.
#[derive(Debug, Error)]
pub enum FsError {
    /// Path not found.
    #[error("path not found: {0}")]
    NotFound(String),

    /// General I/O error.
    #[error("I/O error on '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File content does not have the expected layout.
    #[error("bad format for file '{path}' in line {line}: {content}")]
    BadFormat {
        path: String,
        line: usize,
        content: String,
    },
}

impl FsError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            source,
        }
    }
}
