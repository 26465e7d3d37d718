// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic TOML configurations.

use release_manager::config::Config;
use release_manager::config::loader::ConfigLoader;

// =============================================================================
// Loading from TOML strings
// =============================================================================

#[test]
fn config_defaults() {
    let config = Config::parse("").unwrap();
    assert_eq!(config.repos.hub, "armmbed/mbl-manifest");
    assert_eq!(config.repos.linked_repo, "armmbed/meta-mbl");
    assert_eq!(config.run.phase_timeout_secs, 120);
    assert_eq!(
        config.remote.url_for(&config.remote.default_fetch, "armmbed/mbl-cli"),
        "ssh://git@github.com:/armmbed/mbl-cli.git"
    );
}

#[test]
fn config_parse_remote_section() {
    let toml = r#"
[remote]
default_fetch = "https://git.example.com"
url_template = "{fetch}/{name}"
managed_prefix = "acme"
commit_author_name = "Release Bot"
commit_author_email = "release@example.com"
"#;
    let config = Config::parse(toml).unwrap();
    assert_eq!(
        config.remote.url_for(&config.remote.default_fetch, "acme/tool"),
        "https://git.example.com/acme/tool"
    );
    assert!(config.remote.is_managed("acme", "github"));
    assert!(!config.remote.is_managed("armmbed", "github"));
    assert_eq!(
        config.remote.commit_identity(),
        Some(("Release Bot", "release@example.com"))
    );
}

#[test]
fn config_rejects_unknown_key() {
    let toml = r"
[run]
phase_timeout = 5
";
    assert!(Config::parse(toml).is_err());
}

#[test]
fn config_rejects_template_without_name() {
    let toml = r#"
[remote]
url_template = "{fetch}/fixed.git"
"#;
    let err = Config::parse(toml).unwrap_err();
    assert!(format!("{err:#}").contains("url_template"));
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn config_later_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.toml");
    let site = dir.path().join("site.toml");
    std::fs::write(&base, "[run]\nphase_timeout_secs = 30\nbackup_suffix = \".orig\"\n").unwrap();
    std::fs::write(&site, "[run]\nphase_timeout_secs = 600\n").unwrap();

    let config = ConfigLoader::new()
        .add_toml_file(&base)
        .add_toml_file(&site)
        .build()
        .unwrap();
    assert_eq!(config.run.phase_timeout_secs, 600);
    assert_eq!(config.run.backup_suffix, ".orig");
}

#[test]
fn config_override_wins_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("release-manager.toml");
    std::fs::write(&file, "[global]\noutput_log_level = 2\n").unwrap();

    let config = ConfigLoader::new()
        .add_toml_file_optional(&file)
        .set("global.output_log_level", 5_i64)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.global.output_log_level.as_u8(), 5);
}

#[test]
fn config_missing_required_file() {
    let result = ConfigLoader::new()
        .add_toml_file("/nonexistent/release-manager.toml")
        .build();
    assert!(result.is_err());
}

#[test]
fn config_format_options_is_sorted() {
    let config = Config::default();
    let options = config.format_options();
    let keys: Vec<&str> = options
        .iter()
        .map(|line| line.split_whitespace().next().unwrap())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert!(options.iter().any(|l| l.starts_with("repos.hub")));
}
