// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell startup file integration.
//!
//! Dotwaifu hooks itself into the user's shell by placing an __integration
//! block__ into the shell's startup file. The block sources every core
//! fragment, and is delimited by a begin and an end line that both contain
//! the [`INTEGRATION_MARKER`].
//!
//! # Integration States
//!
//! A startup file is always in one of three states:
//!
//! 1. [`IntegrationState::NoRc`]: startup file does not exist. Integration
//!    creates it with the block as its only content.
//! 2. [`IntegrationState::RcNoIntegration`]: startup file exists without the
//!    marker. Integration copies the file to its backup path, and then
//!    appends the block below the existing content.
//! 3. [`IntegrationState::RcIntegrated`]: startup file contains the marker.
//!    Integration does nothing.
//!
//! Integration always ends in the third state, and running it again is a
//! no-op. If the process dies between backup and append, the next run
//! simply backs up the same content again.
//!
//! # Marker Detection
//!
//! Detection is a plain substring test over the whole file. Shell syntax is
//! not parsed, so the marker sitting in an unrelated comment looks exactly
//! like real integration.
//!
//! # Removal
//!
//! Removal prefers the backup. If a backup exists, it replaces the startup
//! file and is deleted afterwards. Otherwise only the integration block is
//! stripped. A startup file that held nothing but the block is deleted.

use crate::{profile::ShellProfile, scaffold::FragmentKind};

use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Sentinel whose presence marks a startup file as integrated.
pub const INTEGRATION_MARKER: &str = "dotwaifu Configuration";

const BLOCK_BEGIN: &str = "# >>> dotwaifu Configuration >>>";
const BLOCK_END: &str = "# <<< dotwaifu Configuration <<<";

/// Check if startup file content already carries dotwaifu integration.
pub fn is_integrated(content: &str) -> bool {
    contains_marker(content.as_bytes())
}

/// Render integration block that sources core fragments from target
/// directory.
///
/// Canonical fragments load first in their fixed order, then any other
/// `*.sh` file in the directory in listing order. Each file is sourced only
/// if readable, so an empty or missing core directory never breaks shell
/// startup.
pub fn integration_block(core_dir: impl AsRef<Path>) -> String {
    let fragments = FragmentKind::ALL
        .iter()
        .map(FragmentKind::name)
        .collect::<Vec<_>>()
        .join(" ");
    let canonical_files = FragmentKind::ALL
        .iter()
        .map(FragmentKind::file_name)
        .collect::<Vec<_>>()
        .join("|");

    let mut block = String::new();
    block.push_str(BLOCK_BEGIN);
    block.push('\n');
    block.push_str(&format!(
        "DOTWAIFU_CORE=\"{}\"\n",
        core_dir.as_ref().display()
    ));
    block.push_str(&format!("for dotwaifu_fragment in {fragments}; do\n"));
    block.push_str(
        "  [ -r \"$DOTWAIFU_CORE/$dotwaifu_fragment.sh\" ] && . \"$DOTWAIFU_CORE/$dotwaifu_fragment.sh\"\n",
    );
    block.push_str("done\n");
    block.push_str(
        "for dotwaifu_fragment in $(command ls \"$DOTWAIFU_CORE\" 2>/dev/null); do\n",
    );
    block.push_str("  case \"$dotwaifu_fragment\" in\n");
    block.push_str(&format!("    {canonical_files}) ;;\n"));
    block.push_str(
        "    *.sh) [ -r \"$DOTWAIFU_CORE/$dotwaifu_fragment\" ] && . \"$DOTWAIFU_CORE/$dotwaifu_fragment\" ;;\n",
    );
    block.push_str("  esac\n");
    block.push_str("done\n");
    block.push_str("unset DOTWAIFU_CORE dotwaifu_fragment\n");
    block.push_str(BLOCK_END);
    block.push('\n');

    block
}

/// Strip first integration block from startup file content.
///
/// Anchors on the first begin line, removing everything through the end
/// line. Without a begin line, anchors on the first line holding the marker.
/// Without an end line, removes the contiguous non-blank lines from the
/// anchor. One blank separator line above the block goes with it. Bytes
/// outside the block are kept exactly, even when they are not valid UTF-8.
pub fn strip_integration(content: &[u8]) -> Vec<u8> {
    let lines = content.split_inclusive(|byte| *byte == b'\n').collect::<Vec<_>>();
    let is_begin = |line: &&[u8]| line.trim_ascii() == BLOCK_BEGIN.as_bytes();
    let Some(start) = lines
        .iter()
        .position(is_begin)
        .or_else(|| lines.iter().position(|line| contains_marker(line)))
    else {
        return content.to_vec();
    };

    let contiguous_end = || {
        lines[start..]
            .iter()
            .position(|line| line.trim_ascii().is_empty())
            .map_or(lines.len(), |offset| start + offset)
    };
    let end = if is_begin(&lines[start]) {
        lines[start + 1..]
            .iter()
            .position(|line| line.trim_ascii() == BLOCK_END.as_bytes())
            .map(|offset| start + 1 + offset + 1)
            .unwrap_or_else(contiguous_end)
    } else {
        contiguous_end()
    };

    // INVARIANT: Take the blank separator written by append along with block.
    let start = match start.checked_sub(1) {
        Some(prev) if lines[prev].trim_ascii().is_empty() => prev,
        _ => start,
    };

    let mut result = Vec::with_capacity(content.len());
    lines[..start].iter().for_each(|line| result.extend_from_slice(line));
    lines[end..].iter().for_each(|line| result.extend_from_slice(line));
    result
}

fn contains_marker(content: &[u8]) -> bool {
    content
        .windows(INTEGRATION_MARKER.len())
        .any(|window| window == INTEGRATION_MARKER.as_bytes())
}

/// Current integration state of a startup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationState {
    /// Startup file does not exist.
    NoRc,

    /// Startup file exists, but lacks integration marker.
    RcNoIntegration,

    /// Startup file exists, and contains integration marker.
    RcIntegrated,
}

/// What integration did to the startup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationOutcome {
    /// Fresh startup file holding only the integration block.
    Created,

    /// Existing startup file backed up, then integration block appended.
    Appended,

    /// Startup file already integrated, nothing changed.
    AlreadyIntegrated,
}

/// What removal did to the startup file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Startup file replaced by backup, backup deleted.
    Restored,

    /// Integration block stripped from startup file.
    Stripped,

    /// Startup file held only the integration block, so it was deleted.
    Deleted,

    /// No backup and no integration, nothing changed.
    NothingToRemove,
}

/// Integration of dotwaifu into one shell's startup file.
#[derive(Debug, Clone)]
pub struct ShellIntegration {
    profile: ShellProfile,
    block: String,
}

impl ShellIntegration {
    /// Construct new integration for shell profile sourcing target core
    /// fragment directory.
    pub fn new(profile: ShellProfile, core_dir: impl AsRef<Path>) -> Self {
        Self {
            profile,
            block: integration_block(core_dir),
        }
    }

    pub fn profile(&self) -> &ShellProfile {
        &self.profile
    }

    pub fn block(&self) -> &str {
        self.block.as_str()
    }

    /// Determine current integration state of startup file.
    ///
    /// # Errors
    ///
    /// - Return [`Error::ReadRcFile`] if startup file exists but cannot be
    ///   read.
    pub fn state(&self) -> Result<IntegrationState> {
        Ok(match self.read_rc()? {
            None => IntegrationState::NoRc,
            Some(content) if contains_marker(&content) => {
                IntegrationState::RcIntegrated
            }
            Some(_) => IntegrationState::RcNoIntegration,
        })
    }

    /// Bring startup file into integrated state.
    ///
    /// Performs at most one of create or append. Backup is always written
    /// before append, and append is never attempted if backup fails.
    ///
    /// # Errors
    ///
    /// - Return [`Error::ReadRcFile`] if startup file cannot be read.
    /// - Return [`Error::WriteBackup`] if backup cannot be written.
    /// - Return [`Error::WriteRcFile`] if startup file cannot be created or
    ///   appended to.
    #[instrument(skip(self), level = "debug")]
    pub fn integrate(&self) -> Result<IntegrationOutcome> {
        let rc_path = self.profile.rc_file_path();
        let Some(content) = self.read_rc()? else {
            info!("create new {}", self.profile.rc_file_name());
            fs::write(rc_path, &self.block).map_err(|err| Error::WriteRcFile {
                source: err,
                rc_path: rc_path.to_path_buf(),
            })?;
            return Ok(IntegrationOutcome::Created);
        };

        if contains_marker(&content) {
            info!(
                "{} already has dotwaifu integration",
                self.profile.rc_file_name()
            );
            return Ok(IntegrationOutcome::AlreadyIntegrated);
        }

        let backup_path = self.profile.backup_path();
        info!(
            "back up existing {} to {:?}",
            self.profile.rc_file_name(),
            backup_path.display()
        );
        fs::write(&backup_path, &content).map_err(|err| Error::WriteBackup {
            source: err,
            backup_path: backup_path.clone(),
        })?;

        info!("add dotwaifu loader to {}", self.profile.rc_file_name());
        let mut addition = String::new();
        if !content.is_empty() && !content.ends_with(b"\n") {
            addition.push('\n');
        }
        addition.push('\n');
        addition.push_str(&self.block);

        OpenOptions::new()
            .append(true)
            .open(rc_path)
            .and_then(|mut file| file.write_all(addition.as_bytes()))
            .map_err(|err| Error::WriteRcFile {
                source: err,
                rc_path: rc_path.to_path_buf(),
            })?;

        Ok(IntegrationOutcome::Appended)
    }

    /// Undo integration.
    ///
    /// Restores startup file from backup if one exists, otherwise strips the
    /// integration block out of the startup file.
    ///
    /// # Errors
    ///
    /// - Return [`Error::ReadBackup`] if backup exists but cannot be read.
    /// - Return [`Error::RemoveBackup`] if backup cannot be deleted after
    ///   restoring it.
    /// - Return [`Error::ReadRcFile`] if startup file cannot be read.
    /// - Return [`Error::WriteRcFile`] if startup file cannot be rewritten or
    ///   deleted.
    #[instrument(skip(self), level = "debug")]
    pub fn remove(&self) -> Result<RemovalOutcome> {
        let rc_path = self.profile.rc_file_path();
        let backup_path = self.profile.backup_path();

        match fs::read(&backup_path) {
            Ok(backup) => {
                info!(
                    "restore {} from {:?}",
                    self.profile.rc_file_name(),
                    backup_path.display()
                );
                fs::write(rc_path, backup).map_err(|err| Error::WriteRcFile {
                    source: err,
                    rc_path: rc_path.to_path_buf(),
                })?;
                fs::remove_file(&backup_path).map_err(|err| Error::RemoveBackup {
                    source: err,
                    backup_path: backup_path.clone(),
                })?;
                return Ok(RemovalOutcome::Restored);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no backup at {:?}", backup_path.display());
            }
            Err(err) => {
                return Err(Error::ReadBackup {
                    source: err,
                    backup_path,
                })
            }
        }

        let Some(content) = self.read_rc()? else {
            warn!("{} does not exist", self.profile.rc_file_name());
            return Ok(RemovalOutcome::NothingToRemove);
        };

        if !contains_marker(&content) {
            warn!(
                "{} has no dotwaifu integration",
                self.profile.rc_file_name()
            );
            return Ok(RemovalOutcome::NothingToRemove);
        }

        let stripped = strip_integration(&content);
        if stripped.trim_ascii().is_empty() {
            info!("delete {} created by dotwaifu", self.profile.rc_file_name());
            fs::remove_file(rc_path).map_err(|err| Error::WriteRcFile {
                source: err,
                rc_path: rc_path.to_path_buf(),
            })?;
            return Ok(RemovalOutcome::Deleted);
        }

        info!(
            "strip dotwaifu integration from {}",
            self.profile.rc_file_name()
        );
        fs::write(rc_path, stripped).map_err(|err| Error::WriteRcFile {
            source: err,
            rc_path: rc_path.to_path_buf(),
        })?;

        Ok(RemovalOutcome::Stripped)
    }

    fn read_rc(&self) -> Result<Option<Vec<u8>>> {
        let rc_path = self.profile.rc_file_path();
        match fs::read(rc_path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::ReadRcFile {
                source: err,
                rc_path: rc_path.to_path_buf(),
            }),
        }
    }
}

/// Shell integration error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Startup file cannot be read.
    #[error("failed to read startup file at {:?}", rc_path.display())]
    ReadRcFile {
        #[source]
        source: std::io::Error,
        rc_path: PathBuf,
    },

    /// Startup file cannot be created, written, or deleted.
    #[error("failed to write startup file at {:?}", rc_path.display())]
    WriteRcFile {
        #[source]
        source: std::io::Error,
        rc_path: PathBuf,
    },

    /// Backup cannot be read.
    #[error("failed to read backup at {:?}", backup_path.display())]
    ReadBackup {
        #[source]
        source: std::io::Error,
        backup_path: PathBuf,
    },

    /// Backup cannot be written.
    #[error("failed to write backup at {:?}", backup_path.display())]
    WriteBackup {
        #[source]
        source: std::io::Error,
        backup_path: PathBuf,
    },

    /// Backup cannot be deleted after restore.
    #[error("failed to remove backup at {:?}", backup_path.display())]
    RemoveBackup {
        #[source]
        source: std::io::Error,
        backup_path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
