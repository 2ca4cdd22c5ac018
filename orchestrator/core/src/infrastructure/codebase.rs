// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Git Codebase
//!
//! [`Codebase`] implementation backed by libgit2. Each instance owns one
//! working copy at `<workspace_root>/<repo-name>-<uuid>`, so concurrent
//! provisioning runs of the same repository never share a directory.
//!
//! Cloning runs on the blocking pool. It is raced against the cancellation
//! token, and the transfer-progress callback also watches the token so an
//! abandoned clone stops writing at its next progress report.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure Layer
//! - **Purpose:** Local working copy lifecycle for provisioning workflows

use async_trait::async_trait;
use git2::{build::RepoBuilder, Cred, CredentialType, FetchOptions, RemoteCallbacks};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::codebase::{Codebase, CodebaseError};

pub struct GitCodebase {
    repository_url: String,
    path: PathBuf,
    token: Option<String>,
}

impl GitCodebase {
    pub fn new(
        repository_url: impl Into<String>,
        workspace_root: &Path,
        token: Option<String>,
    ) -> Result<Self, CodebaseError> {
        let repository_url = repository_url.into();
        let name = repository_name(&repository_url)
            .ok_or_else(|| CodebaseError::InvalidUrl(repository_url.clone()))?;
        let path = workspace_root.join(format!("{}-{}", name, Uuid::new_v4()));

        Ok(Self {
            repository_url,
            path,
            token,
        })
    }
}

/// Last path segment of a repository URL without the `.git` suffix.
fn repository_name(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let last = trimmed.rsplit(|c: char| c == '/' || c == ':').next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

fn is_local(url: &str) -> bool {
    url.starts_with("file://") || url.starts_with('/') || Path::new(url).is_absolute()
}

fn clone_blocking(
    url: &str,
    target: &Path,
    token: Option<&str>,
    ctx: &CancellationToken,
) -> Result<(), CodebaseError> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed| {
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token {
                return Cred::userpass_plaintext("x-access-token", token);
            }
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
        }
        Cred::default()
    });
    // Returning false aborts the transfer
    callbacks.transfer_progress(|_| !ctx.is_cancelled());

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if !is_local(url) {
        fetch_options.depth(1);
    }

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    builder.clone(url, target)?;
    Ok(())
}

#[async_trait]
impl Codebase for GitCodebase {
    async fn clone_repository(&self, ctx: &CancellationToken) -> Result<(), CodebaseError> {
        if ctx.is_cancelled() {
            return Err(CodebaseError::Cancelled);
        }
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(
            repository = %self.repository_url,
            path = %self.path.display(),
            "Cloning repository"
        );

        let url = self.repository_url.clone();
        let target = self.path.clone();
        let token = self.token.clone();
        let clone_ctx = ctx.clone();
        let mut handle = tokio::task::spawn_blocking(move || {
            clone_blocking(&url, &target, token.as_deref(), &clone_ctx)
        });

        let joined = tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                // Checkout ignores the token. Cleanup must not race its writes.
                debug!(path = %self.path.display(), "Clone cancelled, waiting for the clone task to stop");
                let _ = (&mut handle).await;
                return Err(CodebaseError::Cancelled);
            }
            joined = &mut handle => joined,
        };
        let result = joined.map_err(|e| CodebaseError::Clone(format!("clone task failed: {}", e)))?;

        match result {
            Err(_) if ctx.is_cancelled() => Err(CodebaseError::Cancelled),
            other => other,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn cleanup(&self) -> Result<(), CodebaseError> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Removed working copy");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn source_repository() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}\n").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("main.rs")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let signature = git2::Signature::now("agentforge", "agentforge@localhost").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "initial", &tree, &[])
            .unwrap();

        dir
    }

    #[test]
    fn test_repository_name() {
        assert_eq!(repository_name("https://github.com/acme/widgets.git").as_deref(), Some("widgets"));
        assert_eq!(repository_name("git@github.com:acme/widgets.git").as_deref(), Some("widgets"));
        assert_eq!(repository_name("https://github.com/acme/widgets/").as_deref(), Some("widgets"));
        assert_eq!(repository_name("").as_deref(), None);
        assert_eq!(repository_name("https://github.com/acme/.git").as_deref(), None);
    }

    #[test]
    fn test_working_copies_are_unique() {
        let root = Path::new("/tmp/agentforge");
        let a = GitCodebase::new("https://github.com/acme/widgets.git", root, None).unwrap();
        let b = GitCodebase::new("https://github.com/acme/widgets.git", root, None).unwrap();

        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(root));
        assert!(a
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("widgets-"));
    }

    #[tokio::test]
    async fn test_clone_and_cleanup_local_repository() {
        let source = source_repository();
        let workspace = tempfile::tempdir().unwrap();
        let url = source.path().to_string_lossy().to_string();

        let codebase = GitCodebase::new(url, workspace.path(), None).unwrap();
        codebase.clone_repository(&CancellationToken::new()).await.unwrap();
        assert!(codebase.path().join("main.rs").exists());

        codebase.cleanup().await.unwrap();
        assert!(!codebase.path().exists());

        // Already gone counts as cleaned up
        codebase.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_clone_honours_cancelled_token() {
        let source = source_repository();
        let workspace = tempfile::tempdir().unwrap();
        let codebase = GitCodebase::new(
            source.path().to_string_lossy().to_string(),
            workspace.path(),
            None,
        )
        .unwrap();

        let ctx = CancellationToken::new();
        ctx.cancel();

        assert_eq!(
            codebase.clone_repository(&ctx).await,
            Err(CodebaseError::Cancelled)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancelled_clone_leaves_nothing_after_cleanup() {
        let source = tempfile::tempdir().unwrap();
        let repo = git2::Repository::init(source.path()).unwrap();
        let mut index = repo.index().unwrap();
        for i in 0..2000 {
            let name = format!("src_{:04}.rs", i);
            std::fs::write(source.path().join(&name), format!("pub fn f{}() {{}}\n", i)).unwrap();
            index.add_path(Path::new(&name)).unwrap();
        }
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = git2::Signature::now("agentforge", "agentforge@localhost").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "many files", &tree, &[])
            .unwrap();

        let workspace = tempfile::tempdir().unwrap();
        let codebase = GitCodebase::new(
            source.path().to_string_lossy().to_string(),
            workspace.path(),
            None,
        )
        .unwrap();

        let ctx = CancellationToken::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            canceller.cancel();
        });

        // Either outcome is fine, but the clone task must be finished on return
        let _ = codebase.clone_repository(&ctx).await;
        codebase.cleanup().await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!codebase.path().exists());
    }

    #[tokio::test]
    async fn test_clone_missing_repository_fails() {
        let workspace = tempfile::tempdir().unwrap();
        let missing = workspace.path().join("does-not-exist");
        let codebase = GitCodebase::new(
            missing.to_string_lossy().to_string(),
            workspace.path(),
            None,
        )
        .unwrap();

        let err = codebase
            .clone_repository(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CodebaseError::Clone(_)));
    }
}
