// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration section types.
//!
//! ```text
//! Config: GlobalConfig, RemoteConfig, ReposConfig, RunConfig
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::logging::LogLevel;

/// Global options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
        }
    }
}

/// Remote URL construction and managed-repository convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Fetch prefix for external-scope repositories (and the hub).
    pub default_fetch: String,
    /// Name of the remote created by clone, used for push and rollback.
    pub remote_name: String,
    /// URL template with `{fetch}` and `{name}` placeholders.
    pub url_template: String,
    /// Name prefix of managed repositories.
    pub managed_prefix: String,
    /// Manifest remote key of managed repositories.
    pub managed_remote_key: String,
    /// Author name for automatic commits (git config is used when unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_author_name: Option<String>,
    /// Author email for automatic commits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_author_email: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            default_fetch: "ssh://git@github.com".to_string(),
            remote_name: "origin".to_string(),
            url_template: "{fetch}:/{name}.git".to_string(),
            managed_prefix: "armmbed".to_string(),
            managed_remote_key: "github".to_string(),
            commit_author_name: None,
            commit_author_email: None,
        }
    }
}

impl RemoteConfig {
    /// Build the clone URL of `full_name` under the `fetch` prefix.
    #[must_use]
    pub fn url_for(&self, fetch: &str, full_name: &str) -> String {
        self.url_template
            .replace("{fetch}", fetch)
            .replace("{name}", full_name)
    }

    /// Whether a manifest project follows the managed-repository convention.
    #[must_use]
    pub fn is_managed(&self, prefix: &str, remote_key: &str) -> bool {
        prefix == self.managed_prefix && remote_key == self.managed_remote_key
    }

    /// Commit identity, if both name and email are configured.
    #[must_use]
    pub fn commit_identity(&self) -> Option<(&str, &str)> {
        match (&self.commit_author_name, &self.commit_author_email) {
            (Some(name), Some(email)) => Some((name.as_str(), email.as_str())),
            _ => None,
        }
    }
}

/// Names of the two repositories that receive file rewrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReposConfig {
    /// Hub repository holding the XML manifests.
    pub hub: String,
    /// Repository holding the linked-repositories configuration file.
    pub linked_repo: String,
    /// Path of the linked-repositories file inside `linked_repo`.
    pub linked_conf_path: String,
    /// Host part that precedes repository names in the linked file.
    pub linked_url_host: String,
}

impl Default for ReposConfig {
    fn default() -> Self {
        Self {
            hub: "armmbed/mbl-manifest".to_string(),
            linked_repo: "armmbed/meta-mbl".to_string(),
            linked_conf_path: "conf/distro/mbl-linked-repositories.conf".to_string(),
            linked_url_host: "git@github.com".to_string(),
        }
    }
}

impl ReposConfig {
    /// Whether pushes for `full_name` are deferred until its files are
    /// rewritten.
    #[must_use]
    pub fn is_special(&self, full_name: &str) -> bool {
        full_name == self.hub || full_name == self.linked_repo
    }
}

/// Run-time behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Upper bound for each concurrent phase.
    pub phase_timeout_secs: u64,
    /// Revision used when a manifest has no `<default revision>`.
    pub default_revision: String,
    /// Suffix appended to backup copies of rewritten files.
    pub backup_suffix: String,
    /// Prefix of the temporary working directory.
    pub work_dir_prefix: String,
    /// Message of automatic commits.
    pub commit_message: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            phase_timeout_secs: 120,
            default_revision: "master".to_string(),
            backup_suffix: "~".to_string(),
            work_dir_prefix: "mbl_".to_string(),
            commit_message: "release manager automatic commit".to_string(),
        }
    }
}

impl RunConfig {
    #[must_use]
    pub const fn phase_timeout(&self) -> Duration {
        Duration::from_secs(self.phase_timeout_secs)
    }
}
