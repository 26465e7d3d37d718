// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end release runs against local bare repositories.
//!
//! ```text
//! <root>/armmbed/mbl-manifest.git   default.xml
//! <root>/armmbed/meta-mbl.git       conf/distro/mbl-linked-repositories.conf
//! <root>/armmbed/mbl-core.git
//! <root>/armmbed/mbl-cli.git        (external)
//! ```
//!
//! Skipped when git is not installed.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use release_manager::config::Config;
use release_manager::git::backend::SystemGit;
use release_manager::release::ReleaseManager;
use release_manager::release::context::{RunContext, RunFlags};
use release_manager::release::prompt::AutoConfirm;
use tempfile::TempDir;

const NEW_BRANCH: &str = "refs/heads/mbl-os-0.9";
const CONF_PATH: &str = "conf/distro/mbl-linked-repositories.conf";

const RELEASE: &str = r#"{
    "_external_": {
        "armmbed/mbl-manifest": ["refs/heads/warrior", "refs/heads/mbl-os-0.9"],
        "armmbed/mbl-cli": ["refs/heads/master", "refs/heads/mbl-os-0.9"]
    },
    "_common_": {
        "armmbed/meta-mbl": "refs/heads/mbl-os-0.9"
    },
    "default": {
        "armmbed/mbl-core": "refs/tags/mbl-os-0.9.0"
    }
}"#;

/// Helper to run git commands in a directory
fn run_git(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

struct Remotes {
    root: TempDir,
}

impl Remotes {
    fn bare(&self, name: &str) -> PathBuf {
        self.root.path().join(format!("{name}.git"))
    }

    /// Create `<root>/<name>.git` with one commit on `branch`.
    fn create(&self, name: &str, branch: &str, files: &[(&str, &str)]) {
        let bare = self.bare(name);
        std::fs::create_dir_all(&bare).unwrap();
        run_git(&["init", "--bare", "-q"], &bare);

        let seed = self.root.path().join("seed").join(name);
        std::fs::create_dir_all(&seed).unwrap();
        run_git(&["init", "-q"], &seed);
        run_git(&["checkout", "-q", "-b", branch], &seed);
        std::fs::write(seed.join("README"), name).unwrap();
        for (path, content) in files {
            let target = seed.join(path);
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(target, content).unwrap();
        }
        run_git(&["add", "-A"], &seed);
        run_git(&["commit", "-q", "-m", "seed"], &seed);
        run_git(
            &["push", "-q", bare.to_str().unwrap(), &format!("{branch}:refs/heads/{branch}")],
            &seed,
        );
    }

    fn has_ref(&self, name: &str, reference: &str) -> bool {
        let bare = self.bare(name);
        run_git(&["ls-remote", "--refs", bare.to_str().unwrap()], self.root.path())
            .lines()
            .any(|line| line.ends_with(&format!("\t{reference}")))
    }

    fn show(&self, name: &str, spec: &str) -> String {
        let bare = self.bare(name);
        run_git(&["show", spec], &bare)
    }

    fn rev_parse(&self, name: &str, reference: &str) -> String {
        let bare = self.bare(name);
        run_git(&["rev-parse", reference], &bare)
    }
}

fn setup() -> Option<(Remotes, Config)> {
    if which::which("git").is_err() {
        eprintln!("git not found, skipping");
        return None;
    }
    let remotes = Remotes {
        root: tempfile::tempdir().unwrap(),
    };
    let fetch = remotes.root.path().display().to_string();

    let manifest = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="github" fetch="{fetch}"/>
  <default revision="warrior" remote="github"/>

  <project name="armmbed/meta-mbl" path="layers/meta-mbl"/>
  <project name="armmbed/mbl-core" path="layers/mbl-core" revision="refs/heads/warrior"/>
</manifest>
"#
    );
    let linked = "\
MBL_CLI_URI = \"git://git@github.com/armmbed/mbl-cli.git;protocol=ssh;branch=master;\"
MBL_CLI_SRCREV = \"0000000000000000000000000000000000000000\"
";

    remotes.create("armmbed/mbl-manifest", "warrior", &[("default.xml", &manifest)]);
    remotes.create("armmbed/meta-mbl", "warrior", &[(CONF_PATH, linked)]);
    remotes.create("armmbed/mbl-core", "warrior", &[]);
    remotes.create("armmbed/mbl-cli", "master", &[]);

    let config = Config::parse(&format!(
        r#"
[remote]
default_fetch = "{fetch}"
url_template = "{{fetch}}/{{name}}.git"
commit_author_name = "Release Bot"
commit_author_email = "release@example.com"

[run]
phase_timeout_secs = 60
"#
    ))
    .unwrap();
    Some((remotes, config))
}

async fn run(config: Config, flags: RunFlags, document: &str) -> anyhow::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("release.json");
    std::fs::write(&input, document).unwrap();

    let ctx = RunContext::new(
        Arc::new(config),
        Arc::new(SystemGit::new()?),
        Arc::new(AutoConfirm),
        flags,
    );
    let summary = ReleaseManager::new(ctx, input).run().await?;
    println!("{summary}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn release_creates_and_records_every_revision() {
    let Some((remotes, config)) = setup() else {
        return;
    };

    run(config, RunFlags::empty(), RELEASE).await.unwrap();

    for repo in ["armmbed/mbl-manifest", "armmbed/mbl-cli", "armmbed/meta-mbl"] {
        assert!(remotes.has_ref(repo, NEW_BRANCH), "{repo} has no new branch");
    }
    assert!(remotes.has_ref("armmbed/mbl-core", "refs/tags/mbl-os-0.9.0"));

    let manifest = remotes.show("armmbed/mbl-manifest", "mbl-os-0.9:default.xml");
    assert!(manifest.contains(r#"path="layers/meta-mbl" revision="mbl-os-0.9""#));
    assert!(manifest.contains(r#"path="layers/mbl-core" revision="mbl-os-0.9.0""#));
    assert!(manifest.contains(r#"<default revision="warrior" remote="github"/>"#));

    let cli_head = remotes.rev_parse("armmbed/mbl-cli", "refs/heads/master");
    let conf = remotes.show("armmbed/meta-mbl", &format!("mbl-os-0.9:{CONF_PATH}"));
    assert!(conf.contains(";protocol=ssh;branch=mbl-os-0.9;"));
    assert!(conf.contains(&format!("MBL_CLI_SRCREV = \"{cli_head}\"")));

    let hub = remotes.bare("armmbed/mbl-manifest");
    let author = run_git(&["log", "-1", "--format=%an", "mbl-os-0.9"], &hub);
    assert_eq!(author, "Release Bot");
}

#[tokio::test(flavor = "multi_thread")]
async fn simulation_leaves_remotes_untouched() {
    let Some((remotes, config)) = setup() else {
        return;
    };

    run(config, RunFlags::SIMULATE, RELEASE).await.unwrap();

    for repo in ["armmbed/mbl-manifest", "armmbed/mbl-cli", "armmbed/meta-mbl"] {
        assert!(!remotes.has_ref(repo, NEW_BRANCH));
    }
    assert!(!remotes.has_ref("armmbed/mbl-core", "refs/tags/mbl-os-0.9.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn existing_target_fails_before_any_push() {
    let Some((remotes, config)) = setup() else {
        return;
    };
    let seed = remotes.root.path().join("seed").join("armmbed/mbl-cli");
    run_git(&["tag", "mbl-os-0.9.0"], &seed);
    run_git(
        &[
            "push",
            "-q",
            remotes.bare("armmbed/mbl-core").to_str().unwrap(),
            "refs/tags/mbl-os-0.9.0",
        ],
        &seed,
    );

    let err = run(config, RunFlags::empty(), RELEASE).await.unwrap_err();
    assert!(format!("{err:#}").contains("armmbed/mbl-core"));

    for repo in ["armmbed/mbl-manifest", "armmbed/mbl-cli", "armmbed/meta-mbl"] {
        assert!(!remotes.has_ref(repo, NEW_BRANCH));
    }
}

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_hub_push_rolls_back() {
    use std::os::unix::fs::PermissionsExt;

    let Some((remotes, config)) = setup() else {
        return;
    };
    let hook = remotes.bare("armmbed/mbl-manifest").join("hooks").join("pre-receive");
    std::fs::write(&hook, "#!/bin/sh\necho 'hub is frozen' >&2\nexit 1\n").unwrap();
    std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755)).unwrap();

    let err = run(config, RunFlags::empty(), RELEASE).await.unwrap_err();
    assert!(format!("{err:#}").contains("armmbed/mbl-manifest"));

    assert!(!remotes.has_ref("armmbed/mbl-manifest", NEW_BRANCH));
    assert!(!remotes.has_ref("armmbed/mbl-cli", NEW_BRANCH));
    assert!(!remotes.has_ref("armmbed/meta-mbl", NEW_BRANCH));
    assert!(!remotes.has_ref("armmbed/mbl-core", "refs/tags/mbl-os-0.9.0"));
    assert!(remotes.has_ref("armmbed/mbl-cli", "refs/heads/master"));
}
