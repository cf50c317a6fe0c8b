// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Per-project fragments.
//!
//! Projects get their own fragment directory under
//! `shell/shared/projects/<name>`, created on demand the first time one of
//! their fragments is requested. The fragment type is deliberately
//! permissive: anything outside of the canonical set still gets a file with a
//! generic header, as long as it forms a valid file name.

use crate::{
    path::Layout,
    scaffold::{self, create_dir, ensure_structure, write_if_missing, FragmentKind},
};

use std::path::PathBuf;
use tracing::{info, instrument};

/// Project fragment that is guaranteed to exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFragment {
    /// Absolute path to fragment file.
    pub path: PathBuf,

    /// Whether fragment file had to be created.
    pub created: bool,
}

/// Header line for a fresh project fragment.
pub fn project_fragment_header(project: &str, fragment: &str) -> String {
    match fragment.parse::<FragmentKind>() {
        Ok(kind) => format!("# {project} {}\n", kind.describe()),
        Err(_) => format!("# {project} {fragment}\n"),
    }
}

/// Ensure fragment of target project exists.
///
/// Creates project directory if needed. Creates fragment file with a one-line
/// comment naming the project and fragment type if it is missing, but leaves
/// an existing fragment alone.
///
/// # Errors
///
/// - Return [`Error::InvalidName`] if project or fragment name is empty,
///   `.`, `..`, or contains a path separator.
/// - Return [`Error::Scaffold`] if project directory or fragment file cannot
///   be created.
#[instrument(skip(layout), level = "debug")]
pub fn ensure_project_fragment(
    layout: &Layout,
    project: &str,
    fragment: &str,
) -> Result<ProjectFragment> {
    validate_name(project)?;
    validate_name(fragment)?;

    let project_dir = layout.project_dir(project);
    if !project_dir.exists() {
        info!("create {project} project configuration");
    }
    create_dir(&project_dir)?;

    let path = project_dir.join(format!("{fragment}.sh"));
    let created = write_if_missing(&path, project_fragment_header(project, fragment))?;

    Ok(ProjectFragment { path, created })
}

/// Resolve fragment file to hand over to an editor.
///
/// With a project, goes through [`ensure_project_fragment`]. Without one,
/// scaffolds the core structure if the core directory is missing, and points
/// at the core fragment.
///
/// # Errors
///
/// - Return [`Error::InvalidName`] if project name is invalid.
/// - Return [`Error::Scaffold`] if scaffolding fails.
pub fn resolve_edit_target(
    layout: &Layout,
    kind: FragmentKind,
    project: Option<&str>,
) -> Result<PathBuf> {
    if let Some(project) = project {
        return Ok(ensure_project_fragment(layout, project, kind.name())?.path);
    }

    if !layout.core_dir().exists() {
        info!("shell structure not found, creating basic structure");
        ensure_structure(layout)?;
    }

    Ok(layout.core_fragment(kind))
}

fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(Error::InvalidName(name.to_string()));
    }

    Ok(())
}

/// Project fragment error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Name cannot be used as a single path component.
    #[error("invalid project or fragment name {0:?}")]
    InvalidName(String),

    /// Scaffolding of project directory or fragment fails.
    #[error(transparent)]
    Scaffold(#[from] scaffold::Error),
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use sealed_test::prelude::*;
    use simple_test_case::test_case;
    use std::fs::{read_to_string, write};

    fn layout() -> anyhow::Result<Layout> {
        Ok(Layout::new(std::env::current_dir()?.join("dotwaifu")))
    }

    #[test_case("paths", "# flutter PATH modifications\n"; "paths")]
    #[test_case("aliases", "# flutter aliases\n"; "aliases")]
    #[test_case("env", "# flutter environment variables\n"; "env")]
    #[test_case("scripts", "# flutter utility scripts\n"; "scripts")]
    #[test_case("completions", "# flutter completions\n"; "unknown type gets generic header")]
    #[test]
    fn header_names_project_and_type(fragment: &str, expect: &str) {
        pretty_assertions::assert_eq!(project_fragment_header("flutter", fragment), expect);
    }

    #[sealed_test]
    fn creates_missing_project_fragment() -> anyhow::Result<()> {
        let layout = layout()?;
        let result = ensure_project_fragment(&layout, "flutter", "aliases")?;

        pretty_assertions::assert_eq!(
            result,
            ProjectFragment {
                path: layout.project_dir("flutter").join("aliases.sh"),
                created: true,
            }
        );
        pretty_assertions::assert_eq!(read_to_string(&result.path)?, "# flutter aliases\n");

        Ok(())
    }

    #[sealed_test]
    fn keeps_existing_project_fragment() -> anyhow::Result<()> {
        let layout = layout()?;
        let first = ensure_project_fragment(&layout, "flutter", "env")?;
        write(&first.path, "export FLUTTER_ROOT=\"$HOME/flutter\"\n")?;

        let second = ensure_project_fragment(&layout, "flutter", "env")?;
        assert!(!second.created);
        pretty_assertions::assert_eq!(
            read_to_string(&second.path)?,
            "export FLUTTER_ROOT=\"$HOME/flutter\"\n"
        );

        Ok(())
    }

    #[sealed_test]
    fn unknown_fragment_type_still_creates_file() -> anyhow::Result<()> {
        let layout = layout()?;
        let result = ensure_project_fragment(&layout, "rust", "completions")?;

        assert!(result.created);
        pretty_assertions::assert_eq!(read_to_string(&result.path)?, "# rust completions\n");

        Ok(())
    }

    #[test_case("", "aliases"; "empty project")]
    #[test_case("..", "aliases"; "parent project")]
    #[test_case("a/b", "aliases"; "nested project")]
    #[test_case("flutter", "../env"; "escaping fragment")]
    #[test]
    fn rejects_invalid_names(project: &str, fragment: &str) {
        let layout = Layout::new("/nonexistent/dotwaifu");
        let result = ensure_project_fragment(&layout, project, fragment);
        assert!(matches!(result, Err(Error::InvalidName(_))));
    }

    #[sealed_test]
    fn edit_target_scaffolds_core_when_missing() -> anyhow::Result<()> {
        let layout = layout()?;
        let path = resolve_edit_target(&layout, FragmentKind::Paths, None)?;

        pretty_assertions::assert_eq!(path, layout.core_fragment(FragmentKind::Paths));
        assert!(path.exists());
        assert!(layout.core_fragment(FragmentKind::Scripts).exists());

        Ok(())
    }

    #[sealed_test]
    fn edit_target_for_project() -> anyhow::Result<()> {
        let layout = layout()?;
        let path = resolve_edit_target(&layout, FragmentKind::Scripts, Some("flutter"))?;

        pretty_assertions::assert_eq!(path, layout.project_dir("flutter").join("scripts.sh"));
        assert!(!layout.core_dir().exists());

        Ok(())
    }
}
