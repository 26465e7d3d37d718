// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for CLI parsing.

use clap::Parser;
use clap::error::ErrorKind;
use release_manager::cli::Cli;
use release_manager::release::context::RunFlags;

fn input_file() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("mbl-os-0.9.json");
    std::fs::write(&path, "{}").expect("failed to write input");
    let path = path.display().to_string();
    (dir, path)
}

// =============================================================================
// Release flags
// =============================================================================

#[test]
fn cli_long_flags() {
    let (_dir, path) = input_file();
    let cli = Cli::try_parse_from([
        "release-manager",
        "--diagnostic",
        "--simulate",
        "--keep-workdir",
        "--verbose",
        &path,
    ])
    .unwrap();
    assert_eq!(cli.release.flags(), RunFlags::all());
    assert!(cli.global.verbose);
}

#[test]
fn cli_simulate_only() {
    let (_dir, path) = input_file();
    let cli = Cli::try_parse_from(["release-manager", "-s", &path]).unwrap();
    assert_eq!(cli.release.flags(), RunFlags::SIMULATE);
}

#[test]
fn cli_unknown_flag_rejected() {
    let (_dir, path) = input_file();
    let err = Cli::try_parse_from(["release-manager", "--push-everything", &path]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
}

// =============================================================================
// Input document
// =============================================================================

#[test]
fn cli_rejects_wrong_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("release.txt");
    std::fs::write(&path, "{}").unwrap();
    let err = Cli::try_parse_from(["release-manager", path.to_str().unwrap()]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
    assert!(err.to_string().contains("expected a .json file"));
}

#[test]
fn cli_rejects_second_input() {
    let (_dir, path) = input_file();
    let result = Cli::try_parse_from(["release-manager", &path, &path]);
    assert!(result.is_err());
}

#[test]
fn cli_show_config_without_input() {
    let cli = Cli::try_parse_from(["release-manager", "--show-config", "-c", "extra.toml"]).unwrap();
    assert!(cli.global.show_config);
    assert_eq!(cli.global.configs.len(), 1);
}
