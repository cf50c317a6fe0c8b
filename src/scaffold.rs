// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration tree scaffolding.
//!
//! Dotwaifu splits shell configuration into single-purpose __fragments__:
//! one file for `PATH` edits, one for aliases, one for environment variables,
//! and one for utility functions. The fragments shared by every session live
//! in the __core__ directory, while fragments scoped to one project live in
//! their own directory under __projects__.
//!
//! Scaffolding is non-destructive. Missing directories and files get created
//! with default content, but existing files are never touched. Hence, it is
//! always safe to scaffold again, even after the user edited their fragments.
//! Nothing is rolled back on failure, re-running picks up where it stopped.

use crate::path::Layout;

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::OpenOptions,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, info, instrument};

/// Canonical fragment types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Paths,
    Aliases,
    Env,
    Scripts,
}

impl FragmentKind {
    /// Every fragment kind in loading order.
    pub const ALL: [FragmentKind; 4] = [Self::Paths, Self::Aliases, Self::Env, Self::Scripts];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Paths => "paths",
            Self::Aliases => "aliases",
            Self::Env => "env",
            Self::Scripts => "scripts",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.sh", self.name())
    }

    /// Short human description of what the fragment holds.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Paths => "PATH modifications",
            Self::Aliases => "aliases",
            Self::Env => "environment variables",
            Self::Scripts => "utility scripts",
        }
    }

    fn core_default(&self) -> String {
        format!("# Global {}\n", self.describe())
    }

    fn example_file_name(&self) -> String {
        format!("{}-examples.sh", self.name())
    }

    fn example_content(&self) -> &'static str {
        match self {
            Self::Paths => PATHS_EXAMPLES,
            Self::Aliases => ALIASES_EXAMPLES,
            Self::Env => ENV_EXAMPLES,
            Self::Scripts => SCRIPTS_EXAMPLES,
        }
    }
}

impl Display for FragmentKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.name())
    }
}

impl FromStr for FragmentKind {
    type Err = UnknownFragment;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownFragment(name.to_string()))
    }
}

/// Fragment name outside of the canonical set.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown fragment type {0:?}, expected one of: paths, aliases, env, scripts")]
pub struct UnknownFragment(pub String);

/// Ensure core, projects, and examples directories exist, and that every core
/// fragment exists.
///
/// Returns paths of the fragment files that had to be created.
///
/// # Errors
///
/// - Return [`Error::CreateDir`] if a directory cannot be created.
/// - Return [`Error::WriteFragment`] if a fragment cannot be written.
#[instrument(skip(layout), level = "debug")]
pub fn ensure_structure(layout: &Layout) -> Result<Vec<PathBuf>> {
    for dir in [
        layout.core_dir(),
        layout.projects_dir(),
        layout.examples_dir(),
    ] {
        create_dir(&dir)?;
    }

    let mut created = Vec::new();
    for kind in FragmentKind::ALL {
        let path = layout.core_fragment(kind);
        if write_if_missing(&path, kind.core_default())? {
            created.push(path);
        }
    }

    info!("core fragments ready at {:?}", layout.core_dir().display());
    Ok(created)
}

/// Ensure example files exist for every fragment kind.
///
/// Returns paths of the example files that had to be created.
///
/// # Errors
///
/// - Return [`Error::CreateDir`] if examples directory cannot be created.
/// - Return [`Error::WriteFragment`] if an example file cannot be written.
#[instrument(skip(layout), level = "debug")]
pub fn ensure_examples(layout: &Layout) -> Result<Vec<PathBuf>> {
    let examples_dir = layout.examples_dir();
    create_dir(&examples_dir)?;

    let mut created = Vec::new();
    for kind in FragmentKind::ALL {
        let path = examples_dir.join(kind.example_file_name());
        if write_if_missing(&path, kind.example_content())? {
            created.push(path);
        }
    }

    info!("example files ready at {:?}", examples_dir.display());
    Ok(created)
}

/// Recursively create directory, tolerating that it already exists.
pub(crate) fn create_dir(path: &Path) -> Result<()> {
    mkdirp::mkdirp(path).map_err(|err| Error::CreateDir {
        source: err,
        dir_path: path.to_path_buf(),
    })?;

    Ok(())
}

/// Write file content only if the file does not exist yet.
///
/// Returns `true` if the file was created, `false` if it was left alone.
pub(crate) fn write_if_missing(path: &Path, content: impl AsRef<str>) -> Result<bool> {
    // INVARIANT: Never truncate existing files, user edits always win.
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            debug!("keep existing {:?}", path.display());
            return Ok(false);
        }
        Err(err) => {
            return Err(Error::WriteFragment {
                source: err,
                fragment_path: path.to_path_buf(),
            })
        }
    };

    file.write_all(content.as_ref().as_bytes())
        .map_err(|err| Error::WriteFragment {
            source: err,
            fragment_path: path.to_path_buf(),
        })?;
    debug!("created {:?}", path.display());

    Ok(true)
}

/// Scaffolding error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Directory cannot be created.
    #[error("failed to create directory at {:?}", dir_path.display())]
    CreateDir {
        #[source]
        source: std::io::Error,
        dir_path: PathBuf,
    },

    /// Fragment file cannot be written.
    #[error("failed to write fragment at {:?}", fragment_path.display())]
    WriteFragment {
        #[source]
        source: std::io::Error,
        fragment_path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;

const PATHS_EXAMPLES: &str = r#"# PATH Examples
# Add local bin directory
export PATH="$HOME/bin:$PATH"

# Add development tools
export PATH="/usr/local/go/bin:$PATH"
export PATH="$HOME/.cargo/bin:$PATH"

# Project-specific examples
# Flutter
export PATH="$HOME/development/flutter/bin:$PATH"

# Node.js
export PATH="$HOME/.npm-global/bin:$PATH"
"#;

const ALIASES_EXAMPLES: &str = r#"# Alias Examples
# Basic shortcuts
alias ll="ls -la"
alias la="ls -A"
alias l="ls -CF"

# Git shortcuts
alias gs="git status"
alias ga="git add"
alias gc="git commit"
alias gp="git push"
alias gl="git log --oneline"

# Development shortcuts
alias serve="python3 -m http.server"

# System shortcuts
alias reload="dotwaifu reload"
alias edit-shell="dotwaifu edit"
"#;

const ENV_EXAMPLES: &str = r#"# Environment Variable Examples
# Editor preferences
export EDITOR="code"
export VISUAL="$EDITOR"

# Development environment
export NODE_ENV="development"
export GO111MODULE="on"

# API keys and secrets (use with caution)
# export API_KEY="your-key-here"

# Language-specific settings
export LANG="en_US.UTF-8"
export LC_ALL="en_US.UTF-8"

# History settings
export HISTSIZE=10000
export SAVEHIST=10000
"#;

const SCRIPTS_EXAMPLES: &str = r#"# Utility Script Examples
# Make directory and enter it
mkcd() {
  mkdir -p "$1" && cd "$1"
}

# Extract most archive formats
extract() {
  case "$1" in
    *.tar.gz|*.tgz) tar xzf "$1" ;;
    *.tar.bz2) tar xjf "$1" ;;
    *.zip) unzip "$1" ;;
    *) echo "cannot extract '$1'" ;;
  esac
}
"#;
