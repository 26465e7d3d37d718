// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Operator revision document.
//!
//! ```text
//! {
//!   "_external_": { "armmbed/mbl-manifest": ["refs/heads/warrior", "refs/heads/mbl-os-0.9"],
//!                   "armmbed/meta-mbl":     ["refs/heads/warrior", "refs/heads/mbl-os-0.9"] },
//!   "_common_":   { "armmbed/mbl-core": "refs/heads/mbl-os-0.9" },
//!   "default":    { "armmbed/mbl-tools": "refs/tags/mbl-os-0.9.0" }
//! }
//!
//! resolve(File(f), repo)  = files[f][repo]  ?? common[repo] ?? None
//! resolve(Common, repo)   = common[repo]    ?? None
//! resolve(External, repo) = external[repo].target
//! ```
//!
//! `None` always means "no change requested".

mod strict;


use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::config::types::ReposConfig;
use crate::error::{FsError, InputError, ReleaseResult};
use crate::git::refs::Revision;
use crate::git::repo::RepoName;
use strict::StrictMap;

pub const COMMON_SCOPE: &str = "_common_";
pub const EXTERNAL_SCOPE: &str = "_external_";

/// Precedence tier of a revision assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Manifest file identifier (base name without `.xml`).
    File(String),
    Common,
    External,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(name) => f.write_str(name),
            Self::Common => f.write_str(COMMON_SCOPE),
            Self::External => f.write_str(EXTERNAL_SCOPE),
        }
    }
}

/// Starting point and new revision of an external repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionPair {
    pub start: Revision,
    pub target: Revision,
}

/// Parsed revision document.
#[derive(Debug, Clone, Default)]
pub struct RevisionSpec {
    external: Option<BTreeMap<String, RevisionPair>>,
    common: BTreeMap<String, Revision>,
    files: BTreeMap<String, BTreeMap<String, Revision>>,
}

impl RevisionSpec {
    /// Read and parse the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an `FsError` if the file cannot be read, or an `InputError`
    /// as for [`RevisionSpec::parse`].
    pub fn from_file(path: &Path) -> ReleaseResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| FsError::io(path, e))?;
        Ok(Self::parse(&raw)?)
    }

    /// Parse a JSON revision document.
    ///
    /// Rejects repeated keys at any depth, repository names that are not
    /// `prefix/name`, values of the wrong shape for their scope, and
    /// revision strings that are neither a branch ref, a tag ref, nor a
    /// commit hash.
    ///
    /// # Errors
    ///
    /// Returns the first `InputError` found.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let document: StrictMap<StrictMap<Value>> =
            serde_json::from_str(raw).map_err(|e| InputError::Malformed {
                message: e.to_string(),
            })?;

        let mut spec = Self::default();
        for (scope, entries) in document.0 {
            match scope.as_str() {
                EXTERNAL_SCOPE => {
                    let mut pairs = BTreeMap::new();
                    for (repo, value) in entries.0 {
                        check_repo_name(&scope, &repo)?;
                        let pair = parse_pair(&scope, &repo, &value)?;
                        pairs.insert(repo, pair);
                    }
                    spec.external = Some(pairs);
                }
                _ => {
                    let mut targets = BTreeMap::new();
                    for (repo, value) in entries.0 {
                        check_repo_name(&scope, &repo)?;
                        let Value::String(text) = &value else {
                            return Err(InputError::WrongShape {
                                scope,
                                repo,
                                message: format!("expected a revision string, got {value}"),
                            });
                        };
                        let revision = parse_revision(&scope, &repo, text)?;
                        targets.insert(repo, revision);
                    }
                    if scope == COMMON_SCOPE {
                        spec.common = targets;
                    } else {
                        spec.files.insert(scope, targets);
                    }
                }
            }
        }
        Ok(spec)
    }

    /// Check the scope invariants.
    ///
    /// - the external scope exists and lists the hub repository
    /// - every external pair has two distinct revisions
    /// - external targets are branches or tags; the hub and linked-config
    ///   repositories target a branch
    /// - a repository appears in at most one file scope, and never in both a
    ///   file scope and the external scope
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate_structure(&self, repos: &ReposConfig) -> Result<(), InputError> {
        let external = self.external.as_ref().ok_or_else(|| InputError::MissingScope {
            scope: EXTERNAL_SCOPE.to_string(),
        })?;

        if !external.contains_key(&repos.hub) {
            return Err(InputError::MissingHubEntry {
                repo: repos.hub.clone(),
                scope: EXTERNAL_SCOPE.to_string(),
            });
        }

        for (repo, pair) in external {
            if pair.start == pair.target {
                return Err(InputError::IndistinctPair {
                    scope: EXTERNAL_SCOPE.to_string(),
                    repo: repo.clone(),
                    revision: pair.target.to_string(),
                });
            }
            if repos.is_special(repo) && !pair.target.is_branch() {
                return Err(InputError::NotCreatable {
                    repo: repo.clone(),
                    revision: pair.target.to_string(),
                    expected: "a branch",
                });
            }
            if !pair.target.is_creatable() {
                return Err(InputError::NotCreatable {
                    repo: repo.clone(),
                    revision: pair.target.to_string(),
                    expected: "a branch or tag",
                });
            }
        }

        let mut owner: BTreeMap<&str, &str> = BTreeMap::new();
        for (file, targets) in &self.files {
            for repo in targets.keys() {
                if external.contains_key(repo) {
                    return Err(InputError::DuplicateAcrossScopes {
                        repo: repo.clone(),
                        first: EXTERNAL_SCOPE.to_string(),
                        second: file.clone(),
                    });
                }
                if let Some(first) = owner.insert(repo, file) {
                    return Err(InputError::DuplicateAcrossScopes {
                        repo: repo.clone(),
                        first: first.to_string(),
                        second: file.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Target revision of `repo` under `scope`, following precedence.
    #[must_use]
    pub fn resolve(&self, scope: &Scope, repo: &str) -> Option<&Revision> {
        match scope {
            Scope::External => self
                .external
                .as_ref()
                .and_then(|pairs| pairs.get(repo))
                .map(|pair| &pair.target),
            Scope::Common => self.common.get(repo),
            Scope::File(file) => self
                .files
                .get(file)
                .and_then(|targets| targets.get(repo))
                .or_else(|| self.common.get(repo)),
        }
    }

    /// External repositories and their pairs, sorted by name.
    pub fn external(&self) -> impl Iterator<Item = (&str, &RevisionPair)> {
        self.external
            .iter()
            .flatten()
            .map(|(repo, pair)| (repo.as_str(), pair))
    }

    /// Pair of one external repository.
    #[must_use]
    pub fn external_pair(&self, repo: &str) -> Option<&RevisionPair> {
        self.external.as_ref().and_then(|pairs| pairs.get(repo))
    }

    #[must_use]
    pub fn is_external(&self, repo: &str) -> bool {
        self.external_pair(repo).is_some()
    }

    /// Repositories of the common scope.
    pub fn common(&self) -> impl Iterator<Item = (&str, &Revision)> {
        self.common.iter().map(|(repo, rev)| (repo.as_str(), rev))
    }

    /// File scopes with their repositories.
    pub fn file_scopes(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, Revision>)> {
        self.files.iter().map(|(file, targets)| (file.as_str(), targets))
    }
}

fn check_repo_name(scope: &str, repo: &str) -> Result<(), InputError> {
    if RepoName::parse(repo).is_some() {
        Ok(())
    } else {
        Err(InputError::WrongShape {
            scope: scope.to_string(),
            repo: repo.to_string(),
            message: "repository name must be of the form prefix/name".to_string(),
        })
    }
}

fn parse_revision(scope: &str, repo: &str, text: &str) -> Result<Revision, InputError> {
    Revision::parse(text).ok_or_else(|| InputError::InvalidRevision {
        scope: scope.to_string(),
        repo: repo.to_string(),
        revision: text.to_string(),
    })
}

fn parse_pair(scope: &str, repo: &str, value: &Value) -> Result<RevisionPair, InputError> {
    let Value::Array(items) = value else {
        return Err(InputError::WrongShape {
            scope: scope.to_string(),
            repo: repo.to_string(),
            message: format!("expected [start, target], got {value}"),
        });
    };
    let [start, target] = items.as_slice() else {
        return Err(InputError::BadPairLength {
            scope: scope.to_string(),
            repo: repo.to_string(),
            len: items.len(),
        });
    };

    let as_revision = |item: &Value| match item {
        Value::String(text) => parse_revision(scope, repo, text),
        other => Err(InputError::WrongShape {
            scope: scope.to_string(),
            repo: repo.to_string(),
            message: format!("expected a revision string, got {other}"),
        }),
    };

    Ok(RevisionPair {
        start: as_revision(start)?,
        target: as_revision(target)?,
    })
}
