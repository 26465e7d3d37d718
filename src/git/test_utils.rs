// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory git client for tests.
//!
//! Remotes are maps of ref name to commit id keyed by URL. A clone creates
//! the destination directory and copies the files seeded for that URL.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::backend::{GitMutation, GitQuery, PushOutcome, RemoteRef, RemoteRefs};
use super::refs::Revision;
use crate::error::{GitError, ReleaseResult};

#[derive(Debug, Clone)]
struct LocalClone {
    url: String,
    head: String,
    refs: BTreeMap<String, String>,
    branch: Option<String>,
}

#[derive(Default)]
pub(crate) struct FakeGit {
    remotes: Mutex<BTreeMap<String, BTreeMap<String, String>>>,
    files: Mutex<BTreeMap<String, Vec<(String, String)>>>,
    clones: Mutex<BTreeMap<PathBuf, LocalClone>>,
    fail_push: Mutex<Vec<String>>,
    slow_push: Mutex<Vec<(String, Duration)>>,
    ops: Mutex<Vec<String>>,
    commits: AtomicUsize,
}

fn oid(n: usize) -> String {
    format!("{n:040x}")
}

impl FakeGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Add a remote advertising `refs`, every ref at the same commit.
    pub(crate) fn with_remote(self, url: &str, refs: &[&str]) -> Self {
        let head = oid(self.commits.fetch_add(1, Ordering::SeqCst) + 1);
        let refs = refs
            .iter()
            .map(|r| ((*r).to_string(), head.clone()))
            .collect();
        self.remotes.lock().unwrap().insert(url.to_string(), refs);
        self
    }

    /// Files every clone of `url` starts with.
    pub(crate) fn with_file(self, url: &str, path: &str, content: &str) -> Self {
        self.files
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push((path.to_string(), content.to_string()));
        self
    }

    /// Make pushes whose `url ref` line contains `needle` fail.
    pub(crate) fn fail_push_matching(&self, needle: &str) {
        self.fail_push.lock().unwrap().push(needle.to_string());
    }

    /// Make pushes whose `url ref` line contains `needle` block for `delay`
    /// before reaching the remote.
    pub(crate) fn slow_push_matching(&self, needle: &str, delay: Duration) {
        self.slow_push
            .lock()
            .unwrap()
            .push((needle.to_string(), delay));
    }

    /// Recorded operations, e.g. `push <url> <ref>`.
    pub(crate) fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    pub(crate) fn ops_starting_with(&self, prefix: &str) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter(|op| op.starts_with(prefix))
            .collect()
    }

    pub(crate) fn remote_has(&self, url: &str, reference: &str) -> bool {
        self.remotes
            .lock()
            .unwrap()
            .get(url)
            .is_some_and(|refs| refs.contains_key(reference))
    }

    fn record(&self, op: String) {
        self.ops.lock().unwrap().push(op);
    }

    fn with_clone<T>(
        &self,
        repo: &Path,
        f: impl FnOnce(&mut LocalClone) -> T,
    ) -> ReleaseResult<T> {
        let mut clones = self.clones.lock().unwrap();
        let clone = clones.get_mut(repo).ok_or_else(|| GitError::CommandFailed {
            command: "fake".to_string(),
            message: format!("{} is not a clone", repo.display()),
        })?;
        Ok(f(clone))
    }
}

impl RemoteRefs for FakeGit {
    fn list_remote_refs(&self, url: &str) -> ReleaseResult<Vec<RemoteRef>> {
        let remotes = self.remotes.lock().unwrap();
        let refs = remotes.get(url).ok_or_else(|| GitError::CommandFailed {
            command: format!("git ls-remote {url}"),
            message: "repository not found".to_string(),
        })?;
        Ok(refs
            .iter()
            .map(|(name, oid)| RemoteRef {
                name: name.clone(),
                oid: oid.clone(),
            })
            .collect())
    }
}

impl GitQuery for FakeGit {
    fn head_commit(&self, repo: &Path) -> ReleaseResult<String> {
        self.with_clone(repo, |c| c.head.clone())
    }
}

impl GitMutation for FakeGit {
    fn clone_at(&self, url: &str, dest: &Path, revision: &Revision) -> ReleaseResult<()> {
        self.record(format!("clone {url} {revision}"));
        let head = match revision {
            Revision::Commit(hash) => hash.clone(),
            other => {
                let remotes = self.remotes.lock().unwrap();
                remotes
                    .get(url)
                    .and_then(|refs| refs.get(&other.full_name()))
                    .cloned()
                    .ok_or_else(|| GitError::CloneFailed {
                        url: url.to_string(),
                        revision: other.to_string(),
                        message: "remote ref not found".to_string(),
                    })?
            }
        };

        std::fs::create_dir_all(dest)?;
        if let Some(files) = self.files.lock().unwrap().get(url) {
            for (path, content) in files {
                let target = dest.join(path);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(target, content)?;
            }
        }

        self.clones.lock().unwrap().insert(
            dest.to_path_buf(),
            LocalClone {
                url: url.to_string(),
                head,
                refs: BTreeMap::new(),
                branch: revision.is_branch().then(|| revision.short_name().to_string()),
            },
        );
        Ok(())
    }

    fn create_branch(&self, repo: &Path, name: &str) -> ReleaseResult<()> {
        self.with_clone(repo, |c| {
            c.refs.insert(format!("refs/heads/{name}"), c.head.clone());
        })
    }

    fn create_tag(&self, repo: &Path, name: &str) -> ReleaseResult<()> {
        self.with_clone(repo, |c| {
            c.refs.insert(format!("refs/tags/{name}"), c.head.clone());
        })
    }

    fn checkout(&self, repo: &Path, what: &str) -> ReleaseResult<()> {
        self.with_clone(repo, |c| {
            c.branch = c
                .refs
                .contains_key(&format!("refs/heads/{what}"))
                .then(|| what.to_string());
        })
    }

    fn stage_tracked(&self, repo: &Path) -> ReleaseResult<()> {
        self.with_clone(repo, |_| ())
    }

    fn stage_file(&self, repo: &Path, _file: &Path) -> ReleaseResult<()> {
        self.with_clone(repo, |_| ())
    }

    fn commit(
        &self,
        repo: &Path,
        message: &str,
        _identity: Option<(&str, &str)>,
    ) -> ReleaseResult<()> {
        let new = oid(self.commits.fetch_add(1, Ordering::SeqCst) + 1);
        let url = self.with_clone(repo, |c| {
            c.head.clone_from(&new);
            if let Some(branch) = &c.branch {
                c.refs.insert(format!("refs/heads/{branch}"), new.clone());
            }
            c.url.clone()
        })?;
        self.record(format!("commit {url} {message}"));
        Ok(())
    }

    fn push(&self, repo: &Path, remote: &str, reference: &str) -> ReleaseResult<PushOutcome> {
        let (url, oid) = self.with_clone(repo, |c| {
            (c.url.clone(), c.refs.get(reference).cloned().unwrap_or_else(|| c.head.clone()))
        })?;
        let line = format!("{url} {reference}");
        let delay = self
            .slow_push
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| line.contains(n.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if self.fail_push.lock().unwrap().iter().any(|n| line.contains(n.as_str())) {
            self.record(format!("failed-push {line}"));
            return Err(GitError::PushFailed {
                remote: remote.to_string(),
                reference: reference.to_string(),
                message: "remote rejected".to_string(),
            }
            .into());
        }

        let mut remotes = self.remotes.lock().unwrap();
        let refs = remotes.entry(url).or_default();
        // An existing tag is refused and an existing branch at the same
        // commit is up to date, as with git. History is not modelled, so
        // any other branch update is rejected.
        match refs.get(reference) {
            Some(_) if reference.starts_with("refs/tags/") => {
                self.record(format!("exists {line}"));
                return Ok(PushOutcome::AlreadyExists);
            }
            Some(current) if *current == oid => {
                self.record(format!("up-to-date {line}"));
                return Ok(PushOutcome::Pushed);
            }
            Some(_) => {
                self.record(format!("failed-push {line}"));
                return Err(GitError::PushFailed {
                    remote: remote.to_string(),
                    reference: reference.to_string(),
                    message: "rejected (non-fast-forward)".to_string(),
                }
                .into());
            }
            None => {}
        }
        refs.insert(reference.to_string(), oid);
        self.record(format!("push {line}"));
        Ok(PushOutcome::Pushed)
    }

    fn delete_remote_ref(
        &self,
        repo: &Path,
        _remote: &str,
        reference: &str,
    ) -> ReleaseResult<()> {
        let url = self.with_clone(repo, |c| c.url.clone())?;
        if let Some(refs) = self.remotes.lock().unwrap().get_mut(&url) {
            refs.remove(reference);
        }
        self.record(format!("delete {url} {reference}"));
        Ok(())
    }
}
