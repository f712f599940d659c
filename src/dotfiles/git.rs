//! Version control of the dotfiles location
//!
//! The canonical directory is kept under git. A missing committer identity
//! is a fatal precondition for any commit-producing step; the push is
//! best-effort and only attempted when an `origin` remote is configured.

use std::path::Path;

use git2::{ErrorCode, IndexAddOption, Repository, Signature};

use crate::error::{Result, RigupError};

/// Open the repository at `root`, initializing one if absent.
pub fn ensure_repository(root: &Path) -> Result<Repository> {
    match Repository::open(root) {
        Ok(repo) => Ok(repo),
        Err(_) => Ok(Repository::init(root)?),
    }
}

/// The configured committer identity.
///
/// git2 resolves `user.name`/`user.email` through the usual config chain;
/// when either is unset the error is reported as the missing-identity
/// precondition rather than a generic git failure.
pub fn identity(repo: &Repository) -> Result<Signature<'_>> {
    repo.signature().map_err(|_| RigupError::GitIdentityMissing)
}

fn head_commit(repo: &Repository) -> Result<Option<git2::Commit<'_>>> {
    match repo.head() {
        Ok(head) => Ok(Some(head.peel_to_commit()?)),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Stage everything and commit when the tree changed since HEAD.
/// Returns whether a commit was created.
pub fn commit_all(repo: &Repository, sig: &Signature<'_>, message: &str) -> Result<bool> {
    let mut index = repo.index()?;
    index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
    index.write()?;
    let tree_id = index.write_tree()?;

    let parent = head_commit(repo)?;
    if let Some(parent) = &parent {
        if parent.tree_id() == tree_id {
            return Ok(false);
        }
    }

    let tree = repo.find_tree(tree_id)?;
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
    repo.commit(Some("HEAD"), sig, sig, message, &tree, &parents)?;
    Ok(true)
}

/// Push the current branch to `origin` when such a remote exists.
/// Returns false when there is no remote to push to.
pub fn push_origin(repo: &Repository) -> Result<bool> {
    let mut remote = match repo.find_remote("origin") {
        Ok(remote) => remote,
        Err(e) if e.code() == ErrorCode::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    let head = repo.head()?;
    let branch = head.shorthand().unwrap_or("master").to_string();
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    remote.push(&[&refspec], None)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::temp_dir_base;

    fn repo_with_identity() -> (tempfile::TempDir, Repository) {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
        (temp, repo)
    }

    #[test]
    fn test_ensure_repository_initializes_and_reopens() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();

        let _repo = ensure_repository(temp.path()).unwrap();
        assert!(temp.path().join(".git").exists());

        // Second call opens the same repository instead of failing
        let _repo = ensure_repository(temp.path()).unwrap();
    }

    #[test]
    fn test_commit_all_creates_initial_commit() {
        let (temp, repo) = repo_with_identity();
        std::fs::write(temp.path().join("bashrc"), "alias ll='ls -l'").unwrap();

        let sig = identity(&repo).unwrap();
        assert!(commit_all(&repo, &sig, "first snapshot").unwrap());
        assert!(repo.head().unwrap().peel_to_commit().is_ok());
    }

    #[test]
    fn test_commit_all_skips_unchanged_tree() {
        let (temp, repo) = repo_with_identity();
        std::fs::write(temp.path().join("bashrc"), "alias ll='ls -l'").unwrap();

        let sig = identity(&repo).unwrap();
        assert!(commit_all(&repo, &sig, "first snapshot").unwrap());
        assert!(!commit_all(&repo, &sig, "second snapshot").unwrap());
    }

    #[test]
    fn test_push_without_origin_is_not_an_error() {
        let (temp, repo) = repo_with_identity();
        std::fs::write(temp.path().join("bashrc"), "x").unwrap();
        let sig = identity(&repo).unwrap();
        commit_all(&repo, &sig, "snapshot").unwrap();

        assert!(!push_origin(&repo).unwrap());
    }
}
