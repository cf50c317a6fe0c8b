// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for the configuration tree that
//! dotwaifu manages, and for the user's home directory where shell startup
//! files live.
//!
//! # Configuration Tree Layout
//!
//! ```text
//! <config_root>/
//! ├── config.toml
//! └── shell/
//!     ├── shared/
//!     │   ├── core/{paths,aliases,env,scripts}.sh
//!     │   └── projects/<name>/{paths,aliases,env,scripts}.sh
//!     └── templates/
//!         └── examples/*.sh
//! ```

use crate::scaffold::FragmentKind;

use std::path::{Path, PathBuf};

/// Determine absolute path to user's home directory.
///
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(NoWayHome)
}

/// Determine default absolute path to configuration root.
///
/// Uses `$HOME/.config/dotwaifu` regardless of platform so that the loader
/// lines written into shell startup files stay identical across machines.
/// Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`NoWayHome`] if home directory path cannot be determined.
pub fn default_config_root() -> Result<PathBuf> {
    home_dir().map(|path| path.join(".config").join("dotwaifu"))
}

/// Layout of the configuration tree.
///
/// Pure path arithmetic over a configuration root. Nothing here touches the
/// file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Construct new layout rooted at target directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Construct layout rooted at [`default_config_root`].
    ///
    /// # Errors
    ///
    /// - Return [`NoWayHome`] if home directory path cannot be determined.
    pub fn open_default() -> Result<Self> {
        default_config_root().map(Self::new)
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn shell_dir(&self) -> PathBuf {
        self.root.join("shell")
    }

    /// Directory of fragments shared by every shell session.
    pub fn core_dir(&self) -> PathBuf {
        self.shell_dir().join("shared").join("core")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.shell_dir().join("shared").join("projects")
    }

    pub fn project_dir(&self, project: impl AsRef<str>) -> PathBuf {
        self.projects_dir().join(project.as_ref())
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.shell_dir().join("templates").join("examples")
    }

    pub fn core_fragment(&self, kind: FragmentKind) -> PathBuf {
        self.core_dir().join(kind.file_name())
    }
}

/// No way to determine user's home directory.
///
/// # See Also
///
/// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
#[derive(Clone, Debug, thiserror::Error)]
#[error("cannot determine absolute path to user's home directory")]
pub struct NoWayHome;

/// Friendly result alias :3
pub type Result<T, E = NoWayHome> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn layout_paths() {
        let layout = Layout::new("/home/blah/.config/dotwaifu");

        assert_eq!(
            layout.config_path(),
            PathBuf::from("/home/blah/.config/dotwaifu/config.toml")
        );
        assert_eq!(
            layout.core_fragment(FragmentKind::Aliases),
            PathBuf::from("/home/blah/.config/dotwaifu/shell/shared/core/aliases.sh")
        );
        assert_eq!(
            layout.project_dir("flutter"),
            PathBuf::from("/home/blah/.config/dotwaifu/shell/shared/projects/flutter")
        );
        assert_eq!(
            layout.examples_dir(),
            PathBuf::from("/home/blah/.config/dotwaifu/shell/templates/examples")
        );
    }

    #[sealed_test(env = [("HOME", "/home/blah")])]
    fn default_config_root_under_home() -> anyhow::Result<()> {
        assert_eq!(
            default_config_root()?,
            PathBuf::from("/home/blah/.config/dotwaifu")
        );

        Ok(())
    }
}
