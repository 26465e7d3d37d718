// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::backend::{GitMutation, PushOutcome, RemoteRef, RemoteRefs};
use super::refs::{RefKind, Revision, classify_ref, is_commit_hash};
use super::repo::{RepoName, resolve_start_revision};
use super::test_utils::FakeGit;
use crate::error::ReleaseResult;

struct StaticRefs(Vec<&'static str>);

impl RemoteRefs for StaticRefs {
    fn list_remote_refs(&self, _url: &str) -> ReleaseResult<Vec<RemoteRef>> {
        Ok(self
            .0
            .iter()
            .map(|name| RemoteRef {
                name: (*name).to_string(),
                oid: "0".repeat(40),
            })
            .collect())
    }
}

#[test]
fn test_classify() {
    let cases = [
        ("refs/heads/release-7", RefKind::Branch),
        ("refs/heads/feature/x", RefKind::Branch),
        ("refs/tags/mbl-os-0.9.0", RefKind::Tag),
        ("0123456789abcdef0123456789abcdef01234567", RefKind::CommitHash),
        ("0123456789ABCDEF0123456789ABCDEF01234567", RefKind::CommitHash),
        ("master", RefKind::Invalid),
        ("refs/heads/", RefKind::Invalid),
        ("refs/heads//x", RefKind::Invalid),
        ("refs/heads/a..b", RefKind::Invalid),
        ("refs/heads/x.lock", RefKind::Invalid),
        ("refs/remotes/origin/x", RefKind::Invalid),
        ("0123456789abcdef0123456789abcdef0123456", RefKind::Invalid),
        ("0123456789abcdef0123456789abcdef0123456g", RefKind::Invalid),
    ];
    for (input, expected) in cases {
        assert_eq!(classify_ref(input), expected, "{input}");
    }
}

#[test]
fn test_commit_hash_length_is_exact() {
    assert!(is_commit_hash(&"a".repeat(40)));
    assert!(!is_commit_hash(&"a".repeat(41)));
    assert!(!is_commit_hash(""));
}

#[test]
fn test_revision_forms() {
    let branch = Revision::parse("refs/heads/warrior-dev").unwrap();
    assert_eq!(branch.short_name(), "warrior-dev");
    assert_eq!(branch.full_name(), "refs/heads/warrior-dev");
    assert!(branch.is_creatable() && branch.is_branch());

    let tag = Revision::parse("refs/tags/v1.0").unwrap();
    assert_eq!(tag.to_string(), "refs/tags/v1.0");
    assert!(tag.is_creatable() && !tag.is_branch());

    let hash = "c0ffee0000000000000000000000000000000000";
    let commit = Revision::parse(hash).unwrap();
    assert_eq!(commit.short_name(), hash);
    assert_eq!(commit.full_name(), hash);
    assert_eq!(commit.kind(), RefKind::CommitHash);
    assert!(!commit.is_creatable());

    assert!(Revision::parse("warrior").is_none());
}

#[test]
fn test_repo_name_split() {
    let name = RepoName::parse("armmbed/meta-mbl").unwrap();
    assert_eq!(name.prefix(), "armmbed");
    assert_eq!(name.short(), "meta-mbl");
    assert_eq!(name.to_string(), "armmbed/meta-mbl");

    let nested = RepoName::parse("a/b/c").unwrap();
    assert_eq!(nested.prefix(), "a/b");
    assert_eq!(nested.short(), "c");

    assert!(RepoName::parse("meta-mbl").is_none());
    assert!(RepoName::parse("/meta-mbl").is_none());
    assert!(RepoName::parse("armmbed/").is_none());
}

#[test]
fn test_start_revision_full_ref_needs_no_lookup() {
    let refs = StaticRefs(vec![]);
    let rev = resolve_start_revision(&refs, "u", "refs/tags/v1").unwrap();
    assert_eq!(rev, Revision::Tag("v1".into()));
}

#[test]
fn test_start_revision_short_name_prefers_branch() {
    let refs = StaticRefs(vec!["refs/tags/warrior", "refs/heads/warrior"]);
    let rev = resolve_start_revision(&refs, "u", "warrior").unwrap();
    assert_eq!(rev, Revision::Branch("warrior".into()));
}

#[test]
fn test_start_revision_short_name_falls_to_tag() {
    let refs = StaticRefs(vec!["refs/heads/master", "refs/tags/mbl-os-0.8"]);
    let rev = resolve_start_revision(&refs, "u", "mbl-os-0.8").unwrap();
    assert_eq!(rev, Revision::Tag("mbl-os-0.8".into()));
}

#[test]
fn test_start_revision_unknown_short_name() {
    let refs = StaticRefs(vec!["refs/heads/master"]);
    let err = resolve_start_revision(&refs, "ssh://host:/a/b.git", "zeus").unwrap_err();
    assert!(err.to_string().contains("ssh://host:/a/b.git"), "{err}");
}

#[test]
fn test_fake_push_existing_refs() {
    let url = "ssh://git@github.com:/armmbed/mbl-core.git";
    let git = FakeGit::new().with_remote(url, &["refs/heads/master"]);
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("mbl-core");
    git.clone_at(url, &work, &Revision::Branch("master".into()))
        .unwrap();

    // unchanged branch: up to date, like `git push`
    assert_eq!(
        git.push(&work, "origin", "refs/heads/master").unwrap(),
        PushOutcome::Pushed
    );

    git.create_tag(&work, "v1").unwrap();
    assert_eq!(git.push(&work, "origin", "refs/tags/v1").unwrap(), PushOutcome::Pushed);
    assert_eq!(
        git.push(&work, "origin", "refs/tags/v1").unwrap(),
        PushOutcome::AlreadyExists
    );

    git.commit(&work, "moved", None).unwrap();
    assert!(git.push(&work, "origin", "refs/heads/master").is_err());
}
