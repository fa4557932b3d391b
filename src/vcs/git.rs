//! `git` CLI implementation of [`Vcs`]

use crate::error::{Error, Result};
use crate::vcs::{Vcs, DEFAULT_REMOTE};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Drives the `git` binary found on `PATH`
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    config: Vec<String>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Create a git driver using `git` from `PATH`
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific git executable
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            config: Vec::new(),
        }
    }

    /// Pass `-c key=value` to every git invocation, submodule commands included
    #[must_use]
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config.push(format!("{key}={value}"));
        self
    }

    /// Run git in `dir`, returning stdout on success
    ///
    /// `label` is what ends up in logs and errors, so callers passing
    /// credentials in `args` supply a redacted one.
    async fn run_labeled(&self, dir: &Path, args: &[&str], label: &str) -> Result<String> {
        debug!(dir = %dir.display(), "git {label}");

        let output = Command::new(&self.program)
            .args(self.config.iter().flat_map(|kv| ["-c", kv.as_str()]))
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Git {
                command: label.to_string(),
                dir: dir.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        self.run_labeled(dir, args, &args.join(" ")).await
    }
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}

#[async_trait]
impl Vcs for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let dest_str = dest.to_string_lossy();
        self.run_labeled(
            parent,
            &["clone", url, &dest_str],
            &format!("clone <url> {dest_str}"),
        )
        .await?;
        Ok(())
    }

    async fn pull(&self, dir: &Path, remote: &str, branch: &str) -> Result<()> {
        self.run(dir, &["fetch", remote, branch]).await?;
        // Earlier bump commits were pushed to their own branch; drop them locally.
        self.run(dir, &["checkout", "--force", "-B", branch, "FETCH_HEAD"])
            .await?;
        Ok(())
    }

    async fn submodule_init_recursive(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["submodule", "update", "--init", "--recursive"])
            .await?;
        Ok(())
    }

    async fn read_config(&self, dir: &Path, file: &str, key_pattern: &str) -> Result<Vec<String>> {
        if !dir.join(file).exists() {
            return Ok(Vec::new());
        }

        match self
            .run(dir, &["config", "--file", file, "--get-regexp", key_pattern])
            .await
        {
            Ok(out) => Ok(non_empty_lines(&out)),
            // git config exits with 1 when no key matches
            Err(Error::Git { stderr, .. }) if stderr.is_empty() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn submodule_status(&self, dir: &Path) -> Result<Vec<String>> {
        let out = self.run(dir, &["submodule", "status"]).await?;
        Ok(non_empty_lines(&out))
    }

    async fn checkout(&self, dir: &Path, reference: &str) -> Result<()> {
        self.run(dir, &["checkout", reference]).await?;
        Ok(())
    }

    async fn fetch(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["fetch", DEFAULT_REMOTE]).await?;
        Ok(())
    }

    async fn stage_all(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["add", "."]).await?;
        Ok(())
    }

    async fn set_config(&self, dir: &Path, key: &str, value: &str) -> Result<()> {
        self.run(dir, &["config", key, value]).await?;
        Ok(())
    }

    async fn commit(&self, dir: &Path, message: &str, signing_key: Option<&str>) -> Result<()> {
        match signing_key {
            Some(key) => {
                let sign = format!("--gpg-sign={key}");
                self.run(dir, &["commit", &sign, "-am", message]).await?;
            }
            None => {
                self.run(dir, &["commit", "-am", message]).await?;
            }
        }
        Ok(())
    }

    async fn push(&self, dir: &Path, remote: &str, refspec: &str) -> Result<()> {
        self.run(dir, &["push", remote, refspec]).await?;
        Ok(())
    }

    async fn remote_pinned_commit(
        &self,
        dir: &Path,
        remote: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>> {
        let head = format!("refs/heads/{branch}");
        match self
            .run(dir, &["ls-remote", "--exit-code", remote, &head])
            .await
        {
            Ok(_) => {}
            // exit code 2 without output: no such ref
            Err(Error::Git { stderr, .. }) if stderr.is_empty() => return Ok(None),
            Err(e) => return Err(e),
        }

        self.run(dir, &["fetch", remote, &head]).await?;

        let spec = format!("FETCH_HEAD:{}", path.trim_end_matches('/'));
        match self
            .run(dir, &["rev-parse", "--verify", "--quiet", &spec])
            .await
        {
            Ok(out) => Ok(Some(out.trim().to_string())),
            Err(Error::Git { stderr, .. }) if stderr.is_empty() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
