// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Version control of the configuration tree.
//!
//! The configuration root doubles as a plain Git repository, so fragments
//! can be backed up and carried between machines. Syncing only commits
//! locally. Pushing to a remote is left to the user's own Git client.

use git2::{IndexAddOption, Oid, Repository, Signature, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Commit message used when the caller does not supply one.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update dotwaifu configuration";

/// Git repository housing the configuration tree.
pub struct ConfigRepo {
    repository: Repository,
}

impl ConfigRepo {
    /// Open repository at target path.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Git2`] if no repository exists at target path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repository = Repository::open(path.as_ref())?;
        Ok(Self { repository })
    }

    /// Open repository at target path, initializing it first if needed.
    ///
    /// Returns the repository, and whether it had to be initialized.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Git2`] if repository cannot be opened or
    ///   initialized.
    #[instrument(skip(path), level = "debug")]
    pub fn open_or_init(path: impl AsRef<Path>) -> Result<(Self, bool)> {
        match Repository::open(path.as_ref()) {
            Ok(repository) => Ok((Self { repository }, false)),
            Err(err) => {
                debug!("no repository at {:?}: {err}", path.as_ref().display());
                info!("initialize git repository at {:?}", path.as_ref().display());
                let repository = Repository::init(path.as_ref())?;
                Ok((Self { repository }, true))
            }
        }
    }

    /// Path to working directory of repository.
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repository.workdir().map(Path::to_path_buf)
    }

    /// Check if working tree has nothing to commit, untracked files included.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Git2`] if status cannot be computed.
    pub fn is_clean(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);
        Ok(self.repository.statuses(Some(&mut opts))?.is_empty())
    }

    /// Stage every change in working tree, deletions included, and commit
    /// it on top of HEAD.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Git2`] if staging or committing fails.
    #[instrument(skip(self), level = "debug")]
    pub fn commit_all(&self, message: &str) -> Result<Oid> {
        let mut index = self.repository.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;

        // INVARIANT: Always use new tree produced by index after staging.
        let tree_oid = index.write_tree()?;
        let tree = self.repository.find_tree(tree_oid)?;

        // INVARIANT: Fall back to a local identity if Git has none configured.
        let signature = self
            .repository
            .signature()
            .or_else(|_| Signature::now("dotwaifu", "dotwaifu@local"))?;

        // INVARIANT: Always determine latest parent commits to append to.
        let mut parents = Vec::new();
        if let Some(parent) = self.repository.head().ok().and_then(|head| head.target()) {
            parents.push(self.repository.find_commit(parent)?);
        }
        let parents = parents.iter().collect::<Vec<_>>();

        let oid = self.repository.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;
        info!("committed {oid}");

        Ok(oid)
    }
}

/// Synchronization error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs::{create_dir_all, remove_file, write};

    #[sealed_test]
    fn init_commit_and_clean() -> anyhow::Result<()> {
        let root = std::env::current_dir()?.join("dotwaifu");
        create_dir_all(root.join("shell/shared/core"))?;

        let (repo, created) = ConfigRepo::open_or_init(&root)?;
        assert!(created);
        assert!(repo.is_clean()?);

        write(root.join("shell/shared/core/aliases.sh"), "alias ll=\"ls -la\"\n")?;
        assert!(!repo.is_clean()?);

        let first = repo.commit_all(DEFAULT_COMMIT_MESSAGE)?;
        assert!(repo.is_clean()?);

        let (repo, created) = ConfigRepo::open_or_init(&root)?;
        assert!(!created);

        remove_file(root.join("shell/shared/core/aliases.sh"))?;
        assert!(!repo.is_clean()?);
        let second = repo.commit_all("drop aliases")?;
        assert!(repo.is_clean()?);

        let repository = Repository::open(&root)?;
        let head = repository.head()?.peel_to_commit()?;
        assert_eq!(head.id(), second);
        assert_eq!(head.parent_id(0)?, first);
        assert_eq!(head.message(), Some("drop aliases"));

        Ok(())
    }
}
