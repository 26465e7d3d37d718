// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Config, ConfigLoader};
use crate::logging::LogLevel;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
    assert_eq!(config.remote.remote_name, "origin");
    assert_eq!(config.repos.hub, "armmbed/mbl-manifest");
    assert_eq!(config.repos.linked_repo, "armmbed/meta-mbl");
    assert_eq!(config.run.phase_timeout_secs, 120);
    assert_eq!(config.run.backup_suffix, "~");
}

#[test]
fn test_url_template_default() {
    let config = Config::default();
    assert_eq!(
        config
            .remote
            .url_for("ssh://git@github.com", "armmbed/meta-mbl"),
        "ssh://git@github.com:/armmbed/meta-mbl.git"
    );
}

#[test]
fn test_managed_convention() {
    let remote = Config::default().remote;
    assert!(remote.is_managed("armmbed", "github"));
    assert!(!remote.is_managed("armmbed", "yocto"));
    assert!(!remote.is_managed("openembedded", "github"));
}

#[test]
fn test_parse_overrides_sections() {
    let config = Config::parse(
        r#"
        [remote]
        default_fetch = "file:///srv/git"
        url_template = "{fetch}/{name}.git"

        [run]
        phase_timeout_secs = 30
        "#,
    )
    .unwrap();
    assert_eq!(config.remote.url_for(&config.remote.default_fetch, "a/b"), "file:///srv/git/a/b.git");
    assert_eq!(config.run.phase_timeout_secs, 30);
    assert_eq!(config.repos.hub, "armmbed/mbl-manifest");
}

#[test]
fn test_unknown_key_rejected() {
    let result = Config::parse("[run]\nparallelism = 4\n");
    assert!(result.is_err());
}

#[test]
fn test_template_without_placeholder_rejected() {
    let err = Config::parse("[remote]\nurl_template = \"{fetch}.git\"\n").unwrap_err();
    assert!(err.to_string().contains("url_template"), "{err}");
}

#[test]
fn test_zero_timeout_rejected() {
    assert!(Config::parse("[run]\nphase_timeout_secs = 0\n").is_err());
}

#[test]
fn test_malformed_hub_name_rejected() {
    let err = Config::parse("[repos]\nhub = \"manifest\"\n").unwrap_err();
    assert!(err.to_string().contains("prefix/name"), "{err}");
}

#[test]
fn test_set_override_wins() {
    let config = ConfigLoader::new()
        .add_toml_str("[run]\ndefault_revision = \"main\"\n")
        .set("run.default_revision", "develop")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.run.default_revision, "develop");
}

#[test]
fn test_commit_identity_requires_both_fields() {
    let mut config = Config::default();
    assert!(config.remote.commit_identity().is_none());
    config.remote.commit_author_name = Some("Release Bot".to_string());
    assert!(config.remote.commit_identity().is_none());
    config.remote.commit_author_email = Some("bot@example.com".to_string());
    assert_eq!(
        config.remote.commit_identity(),
        Some(("Release Bot", "bot@example.com"))
    );
}

#[test]
fn test_format_options_sorted_and_aligned() {
    let lines = Config::default().format_options();
    let keys: Vec<_> = lines
        .iter()
        .map(|l| l.split(" = ").next().unwrap_or_default().trim_end().to_string())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(lines.iter().any(|l| l.starts_with("repos.hub") && l.ends_with("= armmbed/mbl-manifest")));
    let eq_positions: Vec<_> = lines.iter().filter_map(|l| l.find(" = ")).collect();
    assert!(eq_positions.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_format_loaded_files_lists_sources_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("release-manager.toml");
    std::fs::write(&present, "").unwrap();
    let absent = dir.path().join("absent.toml");

    let loader = ConfigLoader::new()
        .add_toml_file_optional(&absent)
        .add_toml_file_optional(&present)
        .add_toml_str("[run]\n");

    assert_eq!(
        loader.format_loaded_files(),
        vec![
            format!("1. [optional] {}", present.display()),
            "2. [string] <string>".to_string(),
        ]
    );
}
