//! Local repository mirrors
//!
//! [`GitMirror`] keeps bare clones under `<cache_dir>/dependencies/<name>` and
//! answers tag, reference and file queries from them with the `git` CLI.

use crate::cartfile::Dependency;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

pub type MirrorFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MirrorError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("{dependency} has no git repository")]
    NoRepository { dependency: String },

    #[error("`{command}` failed: {stderr}")]
    GitFailed { command: String, stderr: String },

    #[error("Failed to launch git: {source}")]
    Launch {
        #[from]
        source: std::io::Error,
    },
}

/// Access to the local copy of each dependency's repository
pub trait RepositoryMirror: Send + Sync {
    fn mirror_exists(&self, dependency: &Dependency) -> bool;

    /// True when `commitish` names a commit present locally that is not a
    /// branch, tag or `HEAD`
    fn is_immutable_commit(&self, dependency: &Dependency, commitish: &str)
    -> MirrorFuture<'_, bool>;

    fn clone_repository(&self, dependency: &Dependency) -> MirrorFuture<'_, ()>;

    fn fetch_repository(&self, dependency: &Dependency) -> MirrorFuture<'_, ()>;

    fn list_tags(&self, dependency: &Dependency) -> MirrorFuture<'_, Vec<String>>;

    /// Commit a branch, tag or commit prefix points at, `None` if unknown
    fn resolve_reference(
        &self,
        dependency: &Dependency,
        reference: &str,
    ) -> MirrorFuture<'_, Option<String>>;

    /// Contents of `path` at `revision`, `None` if the file does not exist there
    fn contents_of_file(
        &self,
        dependency: &Dependency,
        revision: &str,
        path: &str,
    ) -> MirrorFuture<'_, Option<String>>;
}

/// Bare git clones driven through the `git` binary
#[derive(Debug, Clone)]
pub struct GitMirror {
    repositories_dir: PathBuf,
}

impl GitMirror {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            repositories_dir: cache_dir.join("dependencies"),
        }
    }

    pub fn repositories_dir(&self) -> &Path {
        &self.repositories_dir
    }

    /// One directory per repository identity, e.g. `github.com_reactivex_rxswift`
    pub fn repository_path(&self, dependency: &Dependency) -> PathBuf {
        let directory: String = dependency
            .identity()
            .chars()
            .map(|c| match c {
                'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
                _ => '_',
            })
            .collect();
        self.repositories_dir.join(directory)
    }
}

impl RepositoryMirror for GitMirror {
    fn mirror_exists(&self, dependency: &Dependency) -> bool {
        self.repository_path(dependency).join("HEAD").is_file()
    }

    fn is_immutable_commit(
        &self,
        dependency: &Dependency,
        commitish: &str,
    ) -> MirrorFuture<'_, bool> {
        let repository = self.repository_path(dependency);
        let commitish = commitish.to_string();

        Box::pin(async move {
            if commitish == "HEAD" {
                return Ok(false);
            }

            let object = format!("{commitish}^{{commit}}");
            let args = ["rev-parse", "--verify", "--quiet", object.as_str()];
            let resolved = run_git(&args, Some(&repository)).await?;
            if !resolved.status.success() {
                return Ok(false);
            }

            // Branches and tags can move; only a bare commit is immutable
            let args = ["show-ref", "--quiet", commitish.as_str()];
            let reference = run_git(&args, Some(&repository)).await?;
            Ok(!reference.status.success())
        })
    }

    fn clone_repository(&self, dependency: &Dependency) -> MirrorFuture<'_, ()> {
        let repository = self.repository_path(dependency);
        let url = dependency.clone_url();
        let name = dependency.name().to_string();
        let repositories_dir = self.repositories_dir.clone();

        Box::pin(async move {
            let url = url.ok_or(MirrorError::NoRepository { dependency: name })?;
            tokio::fs::create_dir_all(&repositories_dir).await?;
            if repository.exists() {
                tokio::fs::remove_dir_all(&repository).await?;
            }

            let target = repository.to_string_lossy().into_owned();
            let args = ["clone", "--bare", "--quiet", url.as_str(), target.as_str()];
            debug!(url = %url, path = %target, "Cloning bare mirror");
            checked(&args, run_git(&args, None).await?)?;
            Ok(())
        })
    }

    fn fetch_repository(&self, dependency: &Dependency) -> MirrorFuture<'_, ()> {
        let repository = self.repository_path(dependency);
        let url = dependency.clone_url();
        let name = dependency.name().to_string();

        Box::pin(async move {
            let url = url.ok_or(MirrorError::NoRepository { dependency: name })?;
            let args = [
                "fetch",
                "--prune",
                "--quiet",
                "--force",
                url.as_str(),
                "refs/tags/*:refs/tags/*",
                "+refs/heads/*:refs/heads/*",
            ];
            debug!(url = %url, "Fetching into mirror");
            checked(&args, run_git(&args, Some(&repository)).await?)?;
            Ok(())
        })
    }

    fn list_tags(&self, dependency: &Dependency) -> MirrorFuture<'_, Vec<String>> {
        let repository = self.repository_path(dependency);

        Box::pin(async move {
            let args = ["tag", "--list"];
            let stdout = checked(&args, run_git(&args, Some(&repository)).await?)?;
            Ok(stdout
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect())
        })
    }

    fn resolve_reference(
        &self,
        dependency: &Dependency,
        reference: &str,
    ) -> MirrorFuture<'_, Option<String>> {
        let repository = self.repository_path(dependency);
        let object = format!("{reference}^{{commit}}");

        Box::pin(async move {
            let args = ["rev-parse", "--verify", "--quiet", object.as_str()];
            let output = run_git(&args, Some(&repository)).await?;
            if !output.status.success() {
                return Ok(None);
            }
            let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
            Ok((!sha.is_empty()).then_some(sha))
        })
    }

    fn contents_of_file(
        &self,
        dependency: &Dependency,
        revision: &str,
        path: &str,
    ) -> MirrorFuture<'_, Option<String>> {
        let repository = self.repository_path(dependency);
        let object = format!("{revision}:{path}");

        Box::pin(async move {
            let output = run_git(&["show", object.as_str()], Some(&repository)).await?;
            if !output.status.success() {
                return Ok(None);
            }
            Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        })
    }
}

async fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<std::process::Output, MirrorError> {
    let mut command = Command::new("git");
    command.args(args).env("GIT_TERMINAL_PROMPT", "0");
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    trace!(?args, "Running git");
    Ok(command.output().await?)
}

fn checked(args: &[&str], output: std::process::Output) -> Result<String, MirrorError> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(MirrorError::GitFailed {
            command: format!("git {}", args.join(" ")),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    include!("mirror.test.rs");
}
