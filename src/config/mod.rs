// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. release-manager.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. RELMAN_* env vars
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! RELMAN_REMOTE__DEFAULT_FETCH=file:///srv  → remote.default_fetch
//! RELMAN_RUN__PHASE_TIMEOUT_SECS=300        → run.phase_timeout_secs
//! RELMAN_REPOS__HUB=acme/manifest           → repos.hub
//! ```

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{GlobalConfig, RemoteConfig, ReposConfig, RunConfig};

/// Name of the optional configuration file picked up from the working
/// directory.
pub const LOCAL_CONFIG_FILE: &str = "release-manager.toml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "RELMAN";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// Remote URL and managed-repository settings.
    pub remote: RemoteConfig,
    /// Special repository names.
    pub repos: ReposConfig,
    /// Run-time behavior.
    pub run: RunConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use release_manager::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("release-manager.toml")
    ///     .with_env_prefix("RELMAN")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate values that serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::InvalidValue` naming the first bad key.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        let template = &self.remote.url_template;
        if !template.contains("{fetch}") || !template.contains("{name}") {
            return Err(invalid(
                "remote",
                "url_template",
                format!("'{template}' must contain both {{fetch}} and {{name}}"),
            ));
        }
        if self.remote.remote_name.trim().is_empty() {
            return Err(invalid("remote", "remote_name", "must not be empty"));
        }
        if self.run.phase_timeout_secs == 0 {
            return Err(invalid("run", "phase_timeout_secs", "must be positive"));
        }
        if self.run.backup_suffix.is_empty() {
            return Err(invalid("run", "backup_suffix", "must not be empty"));
        }
        for (key, name) in [("hub", &self.repos.hub), ("linked_repo", &self.repos.linked_repo)] {
            if name.rsplit_once('/').is_none_or(|(p, s)| p.is_empty() || s.is_empty()) {
                return Err(invalid(
                    "repos",
                    key,
                    format!("'{name}' is not of the form prefix/name"),
                ));
            }
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        options.insert(
            "global.output_log_level".to_string(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".to_string(),
            self.global.file_log_level.as_u8().to_string(),
        );

        let remote = &self.remote;
        options.insert("remote.default_fetch".into(), remote.default_fetch.clone());
        options.insert("remote.remote_name".into(), remote.remote_name.clone());
        options.insert("remote.url_template".into(), remote.url_template.clone());
        options.insert("remote.managed_prefix".into(), remote.managed_prefix.clone());
        options.insert(
            "remote.managed_remote_key".into(),
            remote.managed_remote_key.clone(),
        );
        if let Some(name) = &remote.commit_author_name {
            options.insert("remote.commit_author_name".into(), name.clone());
        }
        if let Some(email) = &remote.commit_author_email {
            options.insert("remote.commit_author_email".into(), email.clone());
        }

        options.insert("repos.hub".into(), self.repos.hub.clone());
        options.insert("repos.linked_repo".into(), self.repos.linked_repo.clone());
        options.insert(
            "repos.linked_conf_path".into(),
            self.repos.linked_conf_path.clone(),
        );
        options.insert(
            "repos.linked_url_host".into(),
            self.repos.linked_url_host.clone(),
        );

        options.insert(
            "run.phase_timeout_secs".into(),
            self.run.phase_timeout_secs.to_string(),
        );
        options.insert(
            "run.default_revision".into(),
            self.run.default_revision.clone(),
        );
        options.insert("run.backup_suffix".into(), self.run.backup_suffix.clone());
        options.insert("run.work_dir_prefix".into(), self.run.work_dir_prefix.clone());
        options.insert("run.commit_message".into(), self.run.commit_message.clone());

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}

fn invalid(section: &str, key: &str, message: impl Into<String>) -> anyhow::Error {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.into(),
    }
    .into()
}
