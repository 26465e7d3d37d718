// release-manager: Multi-Repository Release Coordinator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! RemoteRefs  (ls-remote)  --> ShellBackend (git CLI)
//! GitQuery    (read)       --> GixBackend   (pure Rust gix)
//! GitMutation (write)      --> ShellBackend (git CLI)
//!
//! GitClient = RemoteRefs + GitQuery + GitMutation
//!   SystemGit  production client, delegates to both backends
//!   test fakes implement the same traits in memory
//! ```
//!
//! Methods take `&self` so the orchestrator can hold an
//! `Arc<dyn GitClient>` and hand it to blocking workers.

use crate::error::{GitError, GixError, ReleaseResult};
use crate::git::refs::Revision;
use std::path::Path;
use tracing::trace;

/// One ref advertised by a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub name: String,
    pub oid: String,
}

/// Result of a push that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The ref was created on the remote.
    Pushed,
    /// The remote already had the ref (a concurrent peer created it).
    AlreadyExists,
}

// --- Remote Trait ---

/// Queries against a remote URL, no local clone required.
pub trait RemoteRefs: Send + Sync {
    /// List every branch and tag the remote advertises.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be reached.
    fn list_remote_refs(&self, url: &str) -> ReleaseResult<Vec<RemoteRef>>;

    /// Check whether a fully-qualified ref exists on the remote.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the remote cannot be reached.
    fn ref_exists(&self, url: &str, ref_name: &str) -> ReleaseResult<bool> {
        Ok(self
            .list_remote_refs(url)?
            .iter()
            .any(|r| r.name == ref_name))
    }
}

// --- Query Trait (Read-only operations) ---

/// Read-only inspection of a local clone.
pub trait GitQuery: Send + Sync {
    /// Hex id of the commit HEAD points to.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the repository or HEAD cannot be read.
    fn head_commit(&self, repo: &Path) -> ReleaseResult<String>;
}

// --- Mutation Trait (Write operations) ---

/// Operations that modify a local clone or a remote.
pub trait GitMutation: Send + Sync {
    /// Clone `url` into `dest` with `revision` checked out.
    ///
    /// # Errors
    ///
    /// Returns `GitError::CloneFailed` if the clone or checkout fails.
    fn clone_at(&self, url: &str, dest: &Path, revision: &Revision) -> ReleaseResult<()>;

    /// Create a branch at HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    fn create_branch(&self, repo: &Path, name: &str) -> ReleaseResult<()>;

    /// Create a lightweight tag at HEAD.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the tag cannot be created.
    fn create_tag(&self, repo: &Path, name: &str) -> ReleaseResult<()>;

    /// Check out a branch, tag, or commit.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the checkout fails.
    fn checkout(&self, repo: &Path, what: &str) -> ReleaseResult<()>;

    /// Stage modifications of tracked files.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn stage_tracked(&self, repo: &Path) -> ReleaseResult<()>;

    /// Stage a single file.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging fails.
    fn stage_file(&self, repo: &Path, file: &Path) -> ReleaseResult<()>;

    /// Commit the index, optionally as `(name, email)`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the commit fails.
    fn commit(
        &self,
        repo: &Path,
        message: &str,
        identity: Option<(&str, &str)>,
    ) -> ReleaseResult<()>;

    /// Push a fully-qualified ref to `remote`.
    ///
    /// A rejection because the ref already exists is reported as
    /// [`PushOutcome::AlreadyExists`]; every other failure is an error.
    ///
    /// # Errors
    ///
    /// Returns `GitError::PushFailed` for any other rejection.
    fn push(&self, repo: &Path, remote: &str, reference: &str) -> ReleaseResult<PushOutcome>;

    /// Delete a ref from `remote`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::PushFailed` if the deletion is rejected.
    fn delete_remote_ref(&self, repo: &Path, remote: &str, reference: &str)
    -> ReleaseResult<()>;
}

/// Everything the release needs from git.
pub trait GitClient: RemoteRefs + GitQuery + GitMutation {}

impl<T: RemoteRefs + GitQuery + GitMutation + ?Sized> GitClient for T {}

// --- GixBackend Implementation (Pure Rust) ---

/// Pure Rust git backend using gix.
#[derive(Debug, Default, Clone, Copy)]
pub struct GixBackend;

impl GitQuery for GixBackend {
    fn head_commit(&self, repo: &Path) -> ReleaseResult<String> {
        let repository =
            gix::discover(repo).map_err(|e| GitError::Gix(GixError::Discover(Box::new(e))))?;
        let id = repository.head_id().map_err(|e| {
            GitError::Gix(GixError::HeadCommit {
                path: repo.display().to_string(),
                message: e.to_string(),
            })
        })?;
        Ok(id.to_string())
    }
}

// --- ShellBackend Implementation (Git CLI) ---

/// Shell-based git backend using git CLI.
///
/// Used for everything that talks to a remote (ssh transport, credential
/// helpers) and for writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellBackend;

/// Captured output of a git invocation.
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

impl ShellBackend {
    fn run(args: &[&str], cwd: &Path) -> ReleaseResult<GitOutput> {
        use std::process::Command;

        trace!(cwd = %cwd.display(), "git {}", args.join(" "));
        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    /// Execute a git command. Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> ReleaseResult<String> {
        let output = Self::run(args, cwd)?;
        if !output.success {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: output.stderr,
            }
            .into());
        }
        Ok(output.stdout)
    }

    fn parse_ls_remote(stdout: &str) -> Vec<RemoteRef> {
        stdout
            .lines()
            .filter_map(|line| {
                let (oid, name) = line.split_once('\t')?;
                Some(RemoteRef {
                    name: name.trim().to_string(),
                    oid: oid.trim().to_string(),
                })
            })
            .collect()
    }

    fn path_arg<'a>(path: &'a Path, command: &str) -> ReleaseResult<&'a str> {
        path.to_str().ok_or_else(|| {
            GitError::CommandFailed {
                command: command.to_string(),
                message: format!("non UTF-8 path {}", path.display()),
            }
            .into()
        })
    }
}

impl RemoteRefs for ShellBackend {
    fn list_remote_refs(&self, url: &str) -> ReleaseResult<Vec<RemoteRef>> {
        let stdout = Self::git_command(&["ls-remote", "--refs", url], Path::new("."))?;
        Ok(Self::parse_ls_remote(&stdout))
    }

    fn ref_exists(&self, url: &str, ref_name: &str) -> ReleaseResult<bool> {
        // ls-remote patterns match ref name suffixes; compare exactly.
        let stdout = Self::git_command(&["ls-remote", "--refs", url, ref_name], Path::new("."))?;
        Ok(Self::parse_ls_remote(&stdout)
            .iter()
            .any(|r| r.name == ref_name))
    }
}

impl GitMutation for ShellBackend {
    fn clone_at(&self, url: &str, dest: &Path, revision: &Revision) -> ReleaseResult<()> {
        let clone_failed = |message: String| GitError::CloneFailed {
            url: url.to_string(),
            revision: revision.to_string(),
            message,
        };

        let dest_str = dest
            .to_str()
            .ok_or_else(|| clone_failed("invalid destination path".to_string()))?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut args = vec!["clone", "--quiet", "-c", "advice.detachedHead=false"];
        if let Revision::Branch(name) | Revision::Tag(name) = revision {
            args.extend(["--branch", name.as_str()]);
        }
        args.extend([url, dest_str]);

        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let output = Self::run(&args, parent)?;
        if !output.success {
            return Err(clone_failed(output.stderr).into());
        }

        if let Revision::Commit(hash) = revision {
            let output = Self::run(
                &["-c", "advice.detachedHead=false", "checkout", "-q", hash],
                dest,
            )?;
            if !output.success {
                return Err(clone_failed(output.stderr).into());
            }
        }
        Ok(())
    }

    fn create_branch(&self, repo: &Path, name: &str) -> ReleaseResult<()> {
        Self::git_command(&["branch", name], repo)?;
        Ok(())
    }

    fn create_tag(&self, repo: &Path, name: &str) -> ReleaseResult<()> {
        Self::git_command(&["tag", name], repo)?;
        Ok(())
    }

    fn checkout(&self, repo: &Path, what: &str) -> ReleaseResult<()> {
        Self::git_command(
            &["-c", "advice.detachedHead=false", "checkout", "-q", what],
            repo,
        )?;
        Ok(())
    }

    fn stage_tracked(&self, repo: &Path) -> ReleaseResult<()> {
        Self::git_command(&["add", "--update"], repo)?;
        Ok(())
    }

    fn stage_file(&self, repo: &Path, file: &Path) -> ReleaseResult<()> {
        let file_str = Self::path_arg(file, "git add")?;
        Self::git_command(&["add", "--", file_str], repo)?;
        Ok(())
    }

    fn commit(
        &self,
        repo: &Path,
        message: &str,
        identity: Option<(&str, &str)>,
    ) -> ReleaseResult<()> {
        let mut args: Vec<String> = Vec::new();
        if let Some((name, email)) = identity {
            args.extend([
                "-c".to_string(),
                format!("user.name={name}"),
                "-c".to_string(),
                format!("user.email={email}"),
            ]);
        }
        args.extend([
            "commit".to_string(),
            "--quiet".to_string(),
            "-m".to_string(),
            message.to_string(),
        ]);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        Self::git_command(&args, repo)?;
        Ok(())
    }

    fn push(&self, repo: &Path, remote: &str, reference: &str) -> ReleaseResult<PushOutcome> {
        let refspec = format!("{reference}:{reference}");
        let output = Self::run(&["push", remote, &refspec], repo)?;
        if output.success {
            return Ok(PushOutcome::Pushed);
        }
        if output.stderr.contains("already exists") {
            return Ok(PushOutcome::AlreadyExists);
        }
        Err(GitError::PushFailed {
            remote: remote.to_string(),
            reference: reference.to_string(),
            message: output.stderr,
        }
        .into())
    }

    fn delete_remote_ref(
        &self,
        repo: &Path,
        remote: &str,
        reference: &str,
    ) -> ReleaseResult<()> {
        let refspec = format!(":{reference}");
        let output = Self::run(&["push", remote, &refspec], repo)?;
        if output.success {
            return Ok(());
        }
        Err(GitError::PushFailed {
            remote: remote.to_string(),
            reference: refspec,
            message: output.stderr,
        }
        .into())
    }
}

// --- SystemGit (production client) ---

/// Production [`GitClient`]: gix for local reads, git CLI for the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit {
    query: GixBackend,
    shell: ShellBackend,
}

impl SystemGit {
    /// Create a client after checking that `git` is on PATH.
    ///
    /// # Errors
    ///
    /// Returns `GitError::ExecutableNotFound` if git cannot be located.
    pub fn new() -> ReleaseResult<Self> {
        which::which("git").map_err(|_| GitError::ExecutableNotFound)?;
        Ok(Self::default())
    }
}

impl RemoteRefs for SystemGit {
    fn list_remote_refs(&self, url: &str) -> ReleaseResult<Vec<RemoteRef>> {
        self.shell.list_remote_refs(url)
    }

    fn ref_exists(&self, url: &str, ref_name: &str) -> ReleaseResult<bool> {
        self.shell.ref_exists(url, ref_name)
    }
}

impl GitQuery for SystemGit {
    fn head_commit(&self, repo: &Path) -> ReleaseResult<String> {
        self.query.head_commit(repo)
    }
}

impl GitMutation for SystemGit {
    fn clone_at(&self, url: &str, dest: &Path, revision: &Revision) -> ReleaseResult<()> {
        self.shell.clone_at(url, dest, revision)
    }

    fn create_branch(&self, repo: &Path, name: &str) -> ReleaseResult<()> {
        self.shell.create_branch(repo, name)
    }

    fn create_tag(&self, repo: &Path, name: &str) -> ReleaseResult<()> {
        self.shell.create_tag(repo, name)
    }

    fn checkout(&self, repo: &Path, what: &str) -> ReleaseResult<()> {
        self.shell.checkout(repo, what)
    }

    fn stage_tracked(&self, repo: &Path) -> ReleaseResult<()> {
        self.shell.stage_tracked(repo)
    }

    fn stage_file(&self, repo: &Path, file: &Path) -> ReleaseResult<()> {
        self.shell.stage_file(repo, file)
    }

    fn commit(
        &self,
        repo: &Path,
        message: &str,
        identity: Option<(&str, &str)>,
    ) -> ReleaseResult<()> {
        self.shell.commit(repo, message, identity)
    }

    fn push(&self, repo: &Path, remote: &str, reference: &str) -> ReleaseResult<PushOutcome> {
        self.shell.push(repo, remote, reference)
    }

    fn delete_remote_ref(
        &self,
        repo: &Path,
        remote: &str,
        reference: &str,
    ) -> ReleaseResult<()> {
        self.shell.delete_remote_ref(repo, remote, reference)
    }
}
