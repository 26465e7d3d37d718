// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cross-dependency and remote-state validation.
//!
//! ```text
//! RevisionSpec x [ManifestDocument]
//!   check_cross_dependencies   every scope names a manifest,
//!                              every repository exists where it is listed
//!   pending_changes            (manifest, project, target) per requested change
//!
//! remote::external_checks      target must be absent
//! remote::project_checks       managed: absent, otherwise: present
//! remote::check_remote_state   all checks concurrently, first mismatch fails
//! ```

pub mod remote;


use crate::config::types::ReposConfig;
use crate::error::CrossDependencyError;
use crate::git::refs::Revision;
use crate::manifest::{ManifestDocument, ManifestProject};
use crate::revisions::{COMMON_SCOPE, RevisionSpec, Scope};

/// A manifest project with a requested new revision.
#[derive(Debug, Clone)]
pub struct PendingChange {
    /// Identifier of the owning manifest.
    pub manifest: String,
    pub project: ManifestProject,
    pub target: Revision,
}

/// Check the revision document against the parsed manifests.
///
/// # Errors
///
/// Returns the first mismatch: a file scope without a manifest, a
/// repository missing from the manifest(s) it is listed for, or a target
/// that cannot be applied to the project.
pub fn check_cross_dependencies(
    spec: &RevisionSpec,
    manifests: &[ManifestDocument],
    repos: &ReposConfig,
) -> Result<(), CrossDependencyError> {
    for (file, targets) in spec.file_scopes() {
        let Some(document) = manifests.iter().find(|m| m.id == file) else {
            let known: Vec<&str> = manifests.iter().map(|m| m.id.as_str()).collect();
            return Err(CrossDependencyError::UnknownManifest {
                scope: file.to_string(),
                known: known.join(", "),
            });
        };
        for repo in targets.keys() {
            if document.project(repo).is_none() {
                return Err(CrossDependencyError::UnknownRepository {
                    scope: file.to_string(),
                    repo: repo.clone(),
                    location: format!("manifest '{}'", document.path.display()),
                });
            }
        }
    }

    for (repo, _) in spec.common() {
        let listed = manifests.iter().any(|m| m.project(repo).is_some());
        if !listed && !spec.is_external(repo) {
            return Err(CrossDependencyError::UnknownRepository {
                scope: COMMON_SCOPE.to_string(),
                repo: repo.to_string(),
                location: "any manifest or the external scope".to_string(),
            });
        }
    }

    for change in pending_changes(spec, manifests) {
        let repo = change.project.name.full();
        let expected = if repo == repos.linked_repo && !change.target.is_branch() {
            Some("a branch")
        } else if change.project.managed && !change.target.is_creatable() {
            Some("a branch or tag")
        } else {
            None
        };
        if let Some(expected) = expected {
            return Err(CrossDependencyError::NotCreatable {
                manifest: change.manifest,
                repo: repo.to_string(),
                revision: change.target.to_string(),
                expected,
            });
        }
    }
    Ok(())
}

/// Every manifest project whose resolved target is set, in manifest then
/// project order.
#[must_use]
pub fn pending_changes(spec: &RevisionSpec, manifests: &[ManifestDocument]) -> Vec<PendingChange> {
    let mut changes = Vec::new();
    for document in manifests {
        let scope = Scope::File(document.id.clone());
        for project in document.projects() {
            if let Some(target) = spec.resolve(&scope, project.name.full()) {
                changes.push(PendingChange {
                    manifest: document.id.clone(),
                    project: project.clone(),
                    target: target.clone(),
                });
            }
        }
    }
    changes
}
