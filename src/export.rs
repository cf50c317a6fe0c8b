// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Standalone export.
//!
//! Consolidates every fragment into one startup file that works without
//! dotwaifu, for migrating to another machine or leaving dotwaifu behind.
//! Core fragments come first in loading order, then each project in
//! alphabetical order. Missing fragments are skipped.

use crate::{path::Layout, profile::ShellProfile, scaffold::FragmentKind};

use glob::Pattern;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Path of export file for shell profile, `<home>/dotwaifu-export-<rc_file_name>`.
pub fn export_path(home: impl AsRef<Path>, profile: &ShellProfile) -> PathBuf {
    home.as_ref()
        .join(format!("dotwaifu-export-{}", profile.rc_file_name()))
}

/// Render consolidated startup file content.
///
/// # Errors
///
/// - Return [`ExportError::ReadFragment`] if an existing fragment cannot be
///   read.
/// - Return [`ExportError::Glob`] if project directories cannot be listed.
#[instrument(skip(layout, profile), level = "debug")]
pub fn render_export(layout: &Layout, profile: &ShellProfile) -> Result<String> {
    let mut out = format!(
        "{}\n# Exported dotwaifu configuration\n\n",
        profile.comment_prefix()
    );

    for kind in FragmentKind::ALL {
        if let Some(content) = read_fragment(&layout.core_fragment(kind))? {
            out.push_str(&format!("# === {} ===\n{content}\n\n", kind.file_name()));
        }
    }

    for project_dir in project_dirs(layout)? {
        let name = project_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.push_str(&format!("# === {name} project ===\n"));

        for kind in FragmentKind::ALL {
            if let Some(content) = read_fragment(&project_dir.join(kind.file_name()))? {
                out.push_str(&format!("# {}\n{content}\n", kind.file_name()));
            }
        }
        out.push('\n');
    }

    Ok(out)
}

/// Render export, and write it next to the user's startup file.
///
/// Returns path of written export file.
///
/// # Errors
///
/// - Return any error of [`render_export`].
/// - Return [`ExportError::WriteExport`] if export file cannot be written.
pub fn write_export(layout: &Layout, profile: &ShellProfile, home: &Path) -> Result<PathBuf> {
    let content = render_export(layout, profile)?;
    let path = export_path(home, profile);
    fs::write(&path, content).map_err(|err| ExportError::WriteExport {
        source: err,
        export_path: path.clone(),
    })?;
    info!("configuration exported to {:?}", path.display());

    Ok(path)
}

fn project_dirs(layout: &Layout) -> Result<Vec<PathBuf>> {
    let projects_dir = layout.projects_dir();
    let pattern = format!(
        "{}/*",
        Pattern::escape(projects_dir.to_string_lossy().as_ref())
    );

    let mut dirs = Vec::new();
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();

    Ok(dirs)
}

fn read_fragment(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("skip missing {:?}", path.display());
            Ok(None)
        }
        Err(err) => Err(ExportError::ReadFragment {
            source: err,
            fragment_path: path.to_path_buf(),
        }),
    }
}

/// Export error types.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Fragment exists, but cannot be read.
    #[error("failed to read fragment at {:?}", fragment_path.display())]
    ReadFragment {
        #[source]
        source: std::io::Error,
        fragment_path: PathBuf,
    },

    /// Export file cannot be written.
    #[error("failed to write export at {:?}", export_path.display())]
    WriteExport {
        #[source]
        source: std::io::Error,
        export_path: PathBuf,
    },

    /// Project listing pattern is malformed.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Project directory cannot be listed.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
}

/// Friendly result alias :3
pub type Result<T, E = ExportError> = std::result::Result<T, E>;
