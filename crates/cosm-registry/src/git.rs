//! Synchronous proxy around the external `git` executable.
//!
//! Every operation takes the directory it runs in as an explicit argument.
//! The process working directory is never changed.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{RegistryError, Result};

/// Author string used when git has no configured identity.
pub const UNKNOWN_AUTHOR: &str = "[unknown]unknown@author.com";

/// Commit identity exported to every git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Handle for running git commands.
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
    identity: Option<Identity>,
}

impl Default for Git {
    fn default() -> Self {
        Git::new("git")
    }
}

impl Git {
    /// Use the given executable (a bare name is looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Git {
            program: program.into(),
            identity: None,
        }
    }

    /// Override the author and committer for commits made through this handle.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Run `git <subcommand> <args...>` and return combined stdout/stderr.
    ///
    /// With `dir = None` the command runs in the ambient scope, which is what
    /// global `git config` lookups want. A `commit` that fails only because
    /// there is nothing to commit counts as success.
    pub fn run(&self, dir: Option<&Path>, subcommand: &str, args: &[&str]) -> Result<String> {
        if subcommand.is_empty() {
            return Err(RegistryError::invalid(format!(
                "no git subcommand provided for {}",
                dir.map(|d| d.display().to_string())
                    .unwrap_or_else(|| "global scope".to_string())
            )));
        }
        let command_line = std::iter::once(subcommand)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = Command::new(&self.program);
        cmd.arg(subcommand).args(args);
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        if let Some(id) = &self.identity {
            cmd.env("GIT_AUTHOR_NAME", &id.name)
                .env("GIT_AUTHOR_EMAIL", &id.email)
                .env("GIT_COMMITTER_NAME", &id.name)
                .env("GIT_COMMITTER_EMAIL", &id.email);
        }

        tracing::debug!(dir = ?dir, "git {command_line}");
        let output = cmd.output().map_err(|source| RegistryError::GitSpawn {
            command: command_line.clone(),
            source,
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            return Ok(text);
        }
        if subcommand == "commit" && text.contains("nothing to commit") {
            tracing::debug!("nothing to commit in {:?}", dir);
            return Ok(text);
        }
        Err(RegistryError::Git {
            dir: dir.map(Path::to_path_buf),
            command: command_line,
            output: text,
        })
    }

    fn run_in(&self, dir: &Path, subcommand: &str, args: &[&str]) -> Result<String> {
        self.run(Some(dir), subcommand, args)
    }

    /// Name of the checked-out branch.
    pub fn current_branch(&self, dir: &Path) -> Result<String> {
        let output = self.run_in(dir, "rev-parse", &["--abbrev-ref", "HEAD"])?;
        let branch = output.trim();
        if branch == "HEAD" {
            return Err(RegistryError::DetachedHead {
                dir: dir.to_path_buf(),
            });
        }
        if branch.is_empty() {
            return Err(RegistryError::invalid(format!(
                "no branch detected in {}",
                dir.display()
            )));
        }
        Ok(branch.to_string())
    }

    pub fn pull(&self, dir: &Path, branch: &str) -> Result<()> {
        self.run_in(dir, "pull", &["origin", branch]).map(|_| ())
    }

    /// Push a branch or tag to `origin`.
    pub fn push(&self, dir: &Path, target: &str, ignore_up_to_date: bool) -> Result<()> {
        match self.run_in(dir, "push", &["origin", target]) {
            Ok(_) => Ok(()),
            Err(RegistryError::Git { ref output, .. })
                if ignore_up_to_date && output.contains("Everything up-to-date") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn fetch_origin(&self, dir: &Path) -> Result<()> {
        self.run_in(dir, "fetch", &["origin"]).map(|_| ())
    }

    /// All tags in the repository; empty when there are none.
    pub fn list_tags(&self, dir: &Path) -> Result<Vec<String>> {
        let output = self.run_in(dir, "tag", &[])?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn create_tag(&self, dir: &Path, tag: &str) -> Result<()> {
        if tag.is_empty() {
            return Err(RegistryError::invalid("tag name cannot be empty"));
        }
        self.run_in(dir, "tag", &[tag]).map(|_| ())
    }

    pub fn stage(&self, dir: &Path, paths: &[&str]) -> Result<()> {
        if paths.is_empty() {
            return Err(RegistryError::invalid(format!(
                "no paths provided to stage in {}",
                dir.display()
            )));
        }
        self.run_in(dir, "add", paths).map(|_| ())
    }

    pub fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        self.run_in(dir, "commit", &["-m", message]).map(|_| ())
    }

    /// Clone `url` into `dest`. The parent of `dest` must exist.
    pub fn clone_into(&self, url: &str, dest: &Path) -> Result<()> {
        let dest_str = dest.to_string_lossy().into_owned();
        self.run(dest.parent(), "clone", &[url, dest_str.as_str()])
            .map(|_| ())
    }

    pub fn checkout(&self, dir: &Path, rev: &str) -> Result<()> {
        self.run_in(dir, "checkout", &[rev]).map(|_| ())
    }

    /// Return to the previously checked-out ref (`git checkout -`).
    pub fn checkout_previous(&self, dir: &Path) -> Result<()> {
        self.checkout(dir, "-")
    }

    /// Commit hash a tag points at.
    pub fn rev_for_tag(&self, dir: &Path, tag: &str) -> Result<String> {
        let output = self.run_in(dir, "rev-list", &["-n", "1", tag])?;
        Ok(output.trim().to_string())
    }

    /// How many commits `origin/<branch>` has that HEAD does not.
    pub fn commits_behind(&self, dir: &Path, branch: &str) -> Result<u64> {
        let range = format!("HEAD..origin/{branch}");
        let output = self.run_in(dir, "rev-list", &["--count", range.as_str()])?;
        output.trim().parse::<u64>().map_err(|e| {
            RegistryError::invalid(format!(
                "failed to parse behind count '{}' in {}: {e}",
                output.trim(),
                dir.display()
            ))
        })
    }

    pub fn remote_url(&self, dir: &Path) -> Result<String> {
        let output = self.run_in(dir, "remote", &["get-url", "origin"])?;
        Ok(output.trim().to_string())
    }

    /// Fail if the working tree has uncommitted changes.
    pub fn ensure_clean(&self, dir: &Path) -> Result<()> {
        let output = self.run_in(dir, "status", &["--porcelain"])?;
        if !output.trim().is_empty() {
            return Err(RegistryError::UncommittedChanges {
                dir: dir.to_path_buf(),
            });
        }
        Ok(())
    }

    /// Fail if the current branch is behind its `origin` counterpart.
    pub fn ensure_in_sync(&self, dir: &Path) -> Result<()> {
        let branch = self.current_branch(dir)?;
        self.fetch_origin(dir)?;
        let count = self.commits_behind(dir, &branch)?;
        if count > 0 {
            return Err(RegistryError::BehindOrigin {
                dir: dir.to_path_buf(),
                branch,
                count,
            });
        }
        Ok(())
    }

    /// Read a config value from the global scope; `None` if unset.
    pub fn config_value(&self, key: &str) -> Option<String> {
        self.run(None, "config", &[key])
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Authors for a new project as `[name]email`.
    pub fn authors(&self) -> Vec<String> {
        let (name, email) = match &self.identity {
            Some(id) => (Some(id.name.clone()), Some(id.email.clone())),
            None => (
                self.config_value("user.name"),
                self.config_value("user.email"),
            ),
        };
        match (name, email) {
            (Some(name), Some(email)) => vec![format!("[{name}]{email}")],
            _ => {
                tracing::warn!(
                    "could not retrieve git user.name or user.email, defaulting to '{UNKNOWN_AUTHOR}'"
                );
                vec![UNKNOWN_AUTHOR.to_string()]
            }
        }
    }
}

/// True if `dir` is the root of a git working copy.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}
