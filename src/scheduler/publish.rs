//! Publishing the results file to a git remote.

use chrono::Local;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

/// Publish error types.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("{0} is not a git working copy")]
    NotRepository(PathBuf),
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        source: std::io::Error,
    },
    #[error("git {args} exited with {status}: {stderr}")]
    CommandFailed {
        args: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Commits and pushes the results file from the working copy containing it.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    message_prefix: String,
}

impl GitPublisher {
    pub fn new<P: AsRef<Path>>(repo_dir: P) -> Self {
        Self {
            repo_dir: repo_dir.as_ref().to_path_buf(),
            message_prefix: "API results update".to_string(),
        }
    }

    /// Publisher rooted at the directory holding `file`.
    pub fn for_file(file: &Path) -> Self {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Self::new(dir)
    }

    pub fn commit_message(&self) -> String {
        format!(
            "{} - {}",
            self.message_prefix,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// Stage `file`, commit and push.
    pub async fn publish(&self, file: &Path) -> Result<(), PublishError> {
        if !self.repo_dir.join(".git").exists() {
            return Err(PublishError::NotRepository(self.repo_dir.clone()));
        }

        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string_lossy().into_owned());

        self.git(&["add", &file_name]).await?;
        self.git(&["commit", "-m", &self.commit_message()]).await?;
        self.git(&["push"]).await?;

        tracing::info!("Published {} to the git remote", file_name);
        Ok(())
    }

    async fn git(&self, args: &[&str]) -> Result<(), PublishError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|source| PublishError::Spawn {
                args: args.join(" "),
                source,
            })?;

        if !output.status.success() {
            return Err(PublishError::CommandFailed {
                args: args.join(" "),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
