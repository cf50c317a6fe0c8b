// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Dotwaifu keeps one small configuration record at
//! `<config_root>/config.toml`. It remembers what the setup wizard learned:
//! which shell was detected, which editor to launch, and which parts of the
//! configuration tree were requested.
//!
//! The record is loaded once when a command starts, and handed down to
//! whoever needs it. Saving always overwrites the whole file.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{debug, warn};

/// Persisted user configuration.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    /// Shell identifier detected during setup, e.g., "zsh".
    #[serde(default)]
    pub detected_shell: String,

    /// Editor command used by the edit command.
    #[serde(default)]
    pub preferred_editor: String,

    /// Whether core fragments were requested.
    #[serde(default)]
    pub init_basic: bool,

    /// Whether example files were requested.
    #[serde(default)]
    pub create_examples: bool,
}

impl UserConfig {
    /// Load configuration from target path.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::ReadConfig`] if file exists but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration at {:?}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(ConfigError::ReadConfig {
                source: err,
                config_path: path.to_path_buf(),
            }),
        }
    }

    /// Save configuration to target path, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Serialize`] if configuration cannot be
    ///   serialized.
    /// - Return [`ConfigError::WriteConfig`] if parent directory cannot be
    ///   created, or file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = toml::ser::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.parent() {
            mkdirp::mkdirp(parent).map_err(|err| ConfigError::WriteConfig {
                source: err,
                config_path: path.to_path_buf(),
            })?;
        }

        write(path, data).map_err(|err| ConfigError::WriteConfig {
            source: err,
            config_path: path.to_path_buf(),
        })
    }

    /// Detected shell, if setup ever ran.
    pub fn shell(&self) -> Option<&str> {
        Some(self.detected_shell.as_str()).filter(|shell| !shell.is_empty())
    }

    /// Preferred editor, if one was configured.
    pub fn editor(&self) -> Option<&str> {
        Some(self.preferred_editor.as_str()).filter(|editor| !editor.trim().is_empty())
    }
}

impl FromStr for UserConfig {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: UserConfig = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on preferred editor field, keeping
        //   the raw value if a variable is undefined.
        let expanded = shellexpand::full(config.preferred_editor.as_str()).map(|e| e.into_owned());
        match expanded {
            Ok(editor) => config.preferred_editor = editor,
            Err(err) => warn!("cannot expand editor {:?}: {err}", config.preferred_editor),
        }

        Ok(config)
    }
}

impl Display for UserConfig {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Configuration file cannot be read.
    #[error("failed to read configuration at {:?}", config_path.display())]
    ReadConfig {
        #[source]
        source: std::io::Error,
        config_path: PathBuf,
    },

    /// Configuration file cannot be written.
    #[error("failed to write configuration at {:?}", config_path.display())]
    WriteConfig {
        #[source]
        source: std::io::Error,
        config_path: PathBuf,
    },
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
