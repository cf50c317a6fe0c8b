// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Bootstrap from an existing configuration.
//!
//! A configuration tree that was synced on one machine can seed another. The
//! source is either a remote Git repository, which gets cloned into the
//! configuration root, or a local directory, which gets copied into it. The
//! configuration root must be empty or missing, existing configuration is
//! never overwritten.

use crate::scaffold::{self, create_dir};

use auth_git2::{GitAuthenticator, Prompter};
use git2::{build::RepoBuilder, Config, FetchOptions, RemoteCallbacks};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Password, Text};
use std::{
    fs,
    path::{Path, PathBuf},
    time,
};
use tracing::{debug, info, instrument};

/// Where to bootstrap configuration from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupSource {
    /// Remote Git repository URL.
    Remote(String),

    /// Local directory holding a configuration tree.
    Local(PathBuf),
}

impl SetupSource {
    /// Construct remote source, expanding GitHub shorthand.
    pub fn remote(target: impl AsRef<str>) -> Self {
        Self::Remote(expand_repo_shorthand(target.as_ref()))
    }

    /// Construct local source.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local(path.into())
    }
}

/// Expand `owner/repo` into a GitHub HTTPS URL.
///
/// Anything that already looks like a URL, an scp-style address, or a path
/// is returned as is.
pub fn expand_repo_shorthand(target: &str) -> String {
    let target = target.trim();
    let looks_like_url = target.contains("://") || target.contains(':');
    let looks_like_path = target.starts_with(['.', '/', '~']);
    let mut parts = target.split('/');
    let is_shorthand = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty()
    );

    if looks_like_url || looks_like_path || !is_shorthand {
        return target.to_string();
    }

    let repo = target.strip_suffix(".git").unwrap_or(target);
    format!("https://github.com/{repo}.git")
}

/// Bootstrap configuration root from target source.
///
/// # Errors
///
/// - Return [`SetupError::RootNotEmpty`] if configuration root already has
///   content.
/// - Return [`SetupError::Git2`] if cloning fails.
/// - Return [`SetupError::Walk`] or [`SetupError::Copy`] if copying a local
///   tree fails.
#[instrument(skip(root), level = "debug")]
pub fn setup_from(source: &SetupSource, root: &Path) -> Result<()> {
    ensure_empty_root(root)?;

    match source {
        SetupSource::Remote(url) => {
            clone_remote(url, root, ProgressBar::new(0))?;
        }
        SetupSource::Local(path) => copy_local(path, root)?,
    }

    Ok(())
}

fn ensure_empty_root(root: &Path) -> Result<()> {
    let has_entries = fs::read_dir(root)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if has_entries {
        return Err(SetupError::RootNotEmpty {
            root_path: root.to_path_buf(),
        });
    }

    Ok(())
}

// INVARIANT: Never copy a tree into itself.
fn ensure_outside_source(source: &Path, root: &Path) -> Result<()> {
    let canonical = |path: &Path| {
        path.canonicalize().map_err(|err| SetupError::Copy {
            source: err,
            path: path.to_path_buf(),
        })
    };
    let source = canonical(source)?;

    // INVARIANT: Root may not exist yet, so resolve its nearest existing ancestor.
    let mut existing = root;
    let mut rest = Vec::new();
    while !existing.exists() {
        let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
            break;
        };
        rest.push(name);
        existing = parent;
    }
    if existing.as_os_str().is_empty() {
        existing = Path::new(".");
    }
    let mut resolved = canonical(existing)?;
    resolved.extend(rest.iter().rev());

    if resolved.starts_with(&source) {
        return Err(SetupError::RootInsideSource {
            root_path: root.to_path_buf(),
            source_path: source,
        });
    }

    Ok(())
}

/// Clone remote repository into configuration root.
///
/// Progress of the clone is displayed through a progress bar. If credentials
/// are needed, the progress bar is suspended while the user is prompted.
fn clone_remote(url: &str, root: &Path, bar: ProgressBar) -> Result<()> {
    info!("clone {url} into {:?}", root.display());
    let style = ProgressStyle::with_template(
        "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}]",
    )?
    .progress_chars("-Cco.");
    bar.set_style(style);
    bar.set_message(url.to_string());
    bar.enable_steady_tick(time::Duration::from_millis(100));

    let prompter = IndicatifPrompter::new(bar);
    let authenticator = GitAuthenticator::default().set_prompter(prompter.clone());
    let config = Config::open_default()?;

    let mut throttle = time::Instant::now();
    let mut rc = RemoteCallbacks::new();
    rc.credentials(authenticator.credentials(&config));
    rc.transfer_progress(|progress| {
        if throttle.elapsed() > time::Duration::from_millis(10) {
            throttle = time::Instant::now();
            prompter.bar.set_length(progress.total_objects() as u64);
            prompter.bar.set_position(progress.received_objects() as u64);
        }
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(rc);
    let result = RepoBuilder::new().fetch_options(fo).clone(url, root);
    prompter.bar.finish_and_clear();
    result?;

    Ok(())
}

/// Copy local configuration tree into configuration root, leaving out any
/// Git directory.
fn copy_local(source: &Path, root: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(SetupError::NotADirectory {
            path: source.to_path_buf(),
        });
    }

    ensure_outside_source(source, root)?;

    info!("copy {:?} into {:?}", source.display(), root.display());
    create_dir(root)?;

    let walker = WalkBuilder::new(source)
        .hidden(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();

    for entry in walker {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = root.join(relative);
        if entry.file_type().is_some_and(|kind| kind.is_dir()) {
            create_dir(&target)?;
        } else {
            debug!("copy {:?}", relative.display());
            fs::copy(entry.path(), &target).map_err(|err| SetupError::Copy {
                source: err,
                path: entry.path().to_path_buf(),
            })?;
        }
    }

    Ok(())
}

/// Git2 authentication prompter for progress bar.
#[derive(Debug, Clone)]
pub struct IndicatifPrompter {
    pub(crate) bar: ProgressBar,
}

impl IndicatifPrompter {
    /// Construct new progress bar authenticator.
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl Prompter for IndicatifPrompter {
    fn prompt_username_password(
        &mut self,
        url: &str,
        _config: &git2::Config,
    ) -> Option<(String, String)> {
        info!("authentication required at {url}");
        self.bar.suspend(|| {
            let username = Text::new("username").prompt().ok()?;
            let password = Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()?;
            Some((username, password))
        })
    }

    fn prompt_password(
        &mut self,
        username: &str,
        url: &str,
        _config: &git2::Config,
    ) -> Option<String> {
        info!("authentication required at {url} for user {username}");
        self.bar.suspend(|| {
            Password::new("password")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }

    fn prompt_ssh_key_passphrase(
        &mut self,
        ssh_key_path: &Path,
        _config: &git2::Config,
    ) -> Option<String> {
        info!(
            "authentication required with ssh key at {}",
            ssh_key_path.display()
        );
        self.bar.suspend(|| {
            Password::new("passphrase")
                .without_confirmation()
                .prompt()
                .ok()
        })
    }
}

/// Bootstrap error types.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Configuration root already has content.
    #[error("configuration directory at {:?} is not empty", root_path.display())]
    RootNotEmpty { root_path: PathBuf },

    /// Configuration root lies inside local source.
    #[error("configuration directory at {:?} is inside {:?}", root_path.display(), source_path.display())]
    RootInsideSource {
        root_path: PathBuf,
        source_path: PathBuf,
    },

    /// Local source is not a directory.
    #[error("{:?} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// File cannot be copied from local source.
    #[error("failed to copy {:?}", path.display())]
    Copy {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Local source cannot be walked.
    #[error(transparent)]
    Walk(#[from] ignore::Error),

    /// Directories cannot be created.
    #[error(transparent)]
    Scaffold(#[from] scaffold::Error),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),

    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),
}

/// Friendly result alias :3
pub type Result<T, E = SetupError> = std::result::Result<T, E>;
