// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shell profile model.
//!
//! Maps a shell identifier to everything dotwaifu needs to know about that
//! shell's startup file: its name, where it lives, and which comment header
//! to stamp on files generated for it.
//!
//! Only `zsh` and `bash` are recognized by name. Every other identifier is
//! treated as a __generic__ shell that gets a portable startup file name and
//! a POSIX `sh` header. Unknown shells never cause an error.

use std::{
    ffi::{OsStr, OsString},
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Kind of shell a profile was resolved for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    Zsh,
    Bash,
    #[default]
    Generic,
}

impl ShellKind {
    /// Classify shell identifier.
    pub fn from_id(id: &str) -> Self {
        match id {
            "zsh" => Self::Zsh,
            "bash" => Self::Bash,
            _ => Self::Generic,
        }
    }

    pub fn rc_file_name(&self) -> &'static str {
        match self {
            Self::Zsh => ".zshrc",
            Self::Bash => ".bashrc",
            Self::Generic => ".shellrc",
        }
    }

    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Self::Zsh => "#!/bin/zsh",
            Self::Bash => "#!/bin/bash",
            Self::Generic => "#!/bin/sh",
        }
    }
}

/// Startup file information for a given shell.
///
/// Derived deterministically from a shell identifier and a home directory.
/// Never persisted, just recompute it whenever it is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellProfile {
    id: String,
    kind: ShellKind,
    rc_file_path: PathBuf,
}

impl ShellProfile {
    /// Resolve shell profile for shell identifier relative to home directory.
    ///
    /// Pure, performs no I/O.
    pub fn resolve(id: impl Into<String>, home: impl AsRef<Path>) -> Self {
        let id = id.into();
        let kind = ShellKind::from_id(&id);
        let rc_file_path = home.as_ref().join(kind.rc_file_name());

        Self {
            id,
            kind,
            rc_file_path,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn kind(&self) -> ShellKind {
        self.kind
    }

    pub fn rc_file_name(&self) -> &'static str {
        self.kind.rc_file_name()
    }

    pub fn rc_file_path(&self) -> &Path {
        self.rc_file_path.as_path()
    }

    pub fn comment_prefix(&self) -> &'static str {
        self.kind.comment_prefix()
    }

    /// Single-generation backup of the startup file, `<rc_file_path>_backup`.
    pub fn backup_path(&self) -> PathBuf {
        let mut path = self.rc_file_path.clone().into_os_string();
        path.push("_backup");
        PathBuf::from(path)
    }
}

impl Display for ShellProfile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{} ({})", self.id, self.rc_file_path.display())
    }
}

/// Detect shell identifier from a `$SHELL`-like value.
///
/// Takes the final path component, so `/usr/local/bin/zsh` becomes `zsh`.
/// Returns `None` for an absent or empty value.
pub fn detect_shell(shell: Option<&OsStr>) -> Option<String> {
    let shell = shell.filter(|value| !value.is_empty())?;
    Path::new(shell)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Detect shell identifier from the current process's `$SHELL`.
pub fn detect_shell_from_env() -> Option<String> {
    let shell: Option<OsString> = std::env::var_os("SHELL");
    detect_shell(shell.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simple_test_case::test_case;

    #[test_case("zsh", ".zshrc", "#!/bin/zsh"; "zsh")]
    #[test_case("bash", ".bashrc", "#!/bin/bash"; "bash")]
    #[test_case("fish", ".shellrc", "#!/bin/sh"; "fish falls back to generic")]
    #[test_case("unknown", ".shellrc", "#!/bin/sh"; "unknown falls back to generic")]
    #[test_case("", ".shellrc", "#!/bin/sh"; "empty falls back to generic")]
    #[test]
    fn resolve_shell_profile(id: &str, rc_file_name: &str, comment_prefix: &str) {
        let profile = ShellProfile::resolve(id, "/home/blah");

        pretty_assertions::assert_eq!(profile.id(), id);
        pretty_assertions::assert_eq!(profile.rc_file_name(), rc_file_name);
        pretty_assertions::assert_eq!(
            profile.rc_file_path(),
            Path::new("/home/blah").join(rc_file_name)
        );
        pretty_assertions::assert_eq!(profile.comment_prefix(), comment_prefix);
    }

    #[test]
    fn resolve_is_deterministic() {
        pretty_assertions::assert_eq!(
            ShellProfile::resolve("zsh", "/home/blah"),
            ShellProfile::resolve("zsh", "/home/blah")
        );
    }

    #[test]
    fn backup_path_is_sibling_of_rc_file() {
        let profile = ShellProfile::resolve("bash", "/home/blah");
        pretty_assertions::assert_eq!(
            profile.backup_path(),
            PathBuf::from("/home/blah/.bashrc_backup")
        );
    }

    #[test_case(Some("/bin/zsh"), Some("zsh"); "absolute path")]
    #[test_case(Some("/usr/local/bin/fish"), Some("fish"); "nested path")]
    #[test_case(Some("bash"), Some("bash"); "bare name")]
    #[test_case(Some(""), None; "empty value")]
    #[test_case(None, None; "absent value")]
    #[test]
    fn detect_shell_from_value(value: Option<&str>, expect: Option<&str>) {
        let result = detect_shell(value.map(OsStr::new));
        pretty_assertions::assert_eq!(result.as_deref(), expect);
    }
}
