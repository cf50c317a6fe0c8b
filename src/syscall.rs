// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External process calls.
//!
//! Dotwaifu shells out for two things: launching the user's editor on a
//! fragment, and asking the user's shell to source its startup file. Both
//! block until the child exits. Neither is retried.

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Command,
};
use tracing::{debug, instrument};

/// Open file in editor, handing over the terminal until the editor exits.
///
/// The editor command may carry arguments, e.g., "code --wait".
///
/// # Errors
///
/// - Return [`SyscallError::EmptyCommand`] if editor command is blank.
/// - Return [`SyscallError::Spawn`] if editor cannot be started.
/// - Return [`SyscallError::Failed`] if editor exits unsuccessfully.
#[instrument(level = "debug")]
pub fn open_in_editor(editor: &str, path: &Path) -> Result<()> {
    let mut words = editor.split_whitespace();
    let program = words.next().ok_or(SyscallError::EmptyCommand)?;
    let mut args = words.map(OsString::from).collect::<Vec<_>>();
    args.push(path.as_os_str().to_os_string());

    syscall_interactive(program, args)
}

/// Source startup file through target shell to check that it loads.
///
/// Returns whatever the shell printed.
///
/// # Errors
///
/// - Return [`SyscallError::Spawn`] if shell cannot be started.
/// - Return [`SyscallError::Failed`] if sourcing fails.
#[instrument(level = "debug")]
pub fn reload_shell(shell: &str, rc_path: &Path) -> Result<String> {
    let script = format!(". \"{}\"", rc_path.display());
    syscall_non_interactive(shell, ["-c", script.as_str()])
}

fn syscall_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<()> {
    let program = cmd.as_ref().to_string_lossy().into_owned();
    debug!("run {program:?} interactively");
    let status = Command::new(cmd.as_ref())
        .args(args)
        .status()
        .map_err(|err| SyscallError::Spawn {
            source: err,
            program: program.clone(),
        })?;

    if !status.success() {
        return Err(SyscallError::Failed {
            program,
            message: status.to_string(),
        });
    }

    Ok(())
}

fn syscall_non_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let program = cmd.as_ref().to_string_lossy().into_owned();
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|err| SyscallError::Spawn {
            source: err,
            program: program.clone(),
        })?;
    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();
    message.push_str(&stdout);
    message.push_str(&stderr);

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(SyscallError::Failed { program, message });
    }

    Ok(message)
}

/// External process error types.
#[derive(Debug, thiserror::Error)]
pub enum SyscallError {
    /// Command to run is blank.
    #[error("no command to run")]
    EmptyCommand,

    /// Process cannot be started.
    #[error("failed to run {program:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        program: String,
    },

    /// Process exited unsuccessfully.
    #[error("command {program:?} failed: {message}")]
    Failed { program: String, message: String },
}

/// Friendly result alias :3
pub type Result<T, E = SyscallError> = std::result::Result<T, E>;
