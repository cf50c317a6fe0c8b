// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Setup and teardown flows.
//!
//! The init flow asks a few questions, saves the answers, scaffolds the
//! configuration tree, and integrates dotwaifu into the shell's startup file.
//! The uninstall flow walks that back. Both only talk to the user through a
//! [`Prompter`].

use crate::{
    config::{ConfigError, UserConfig},
    integrate::{self, IntegrationOutcome, RemovalOutcome, ShellIntegration},
    path::Layout,
    profile::ShellProfile,
    prompt::{PromptError, Prompter},
    scaffold::{self, ensure_examples, ensure_structure},
};

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Shell assumed when detection comes up empty.
pub const FALLBACK_SHELL: &str = "zsh";

/// Editor suggested when `$EDITOR` is not set.
pub const FALLBACK_EDITOR: &str = "code";

/// Answers collected by the init flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitAnswers {
    pub shell: String,
    pub editor: String,
    pub init_basic: bool,
    pub create_examples: bool,
}

impl From<InitAnswers> for UserConfig {
    fn from(answers: InitAnswers) -> Self {
        Self {
            detected_shell: answers.shell,
            preferred_editor: answers.editor,
            init_basic: answers.init_basic,
            create_examples: answers.create_examples,
        }
    }
}

/// Result of a finished init flow.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub config: UserConfig,
    pub profile: ShellProfile,
    pub outcome: IntegrationOutcome,
    pub created: Vec<PathBuf>,
}

/// Pick shell to configure from a detection result.
///
/// Falls back to [`FALLBACK_SHELL`] when nothing or "unknown" was detected.
pub fn choose_shell(detected: Option<String>) -> String {
    match detected {
        Some(shell) if shell != "unknown" => shell,
        _ => {
            warn!("unable to detect shell, defaulting to {FALLBACK_SHELL}");
            FALLBACK_SHELL.into()
        }
    }
}

/// Ask init questions.
///
/// # Errors
///
/// - Return [`PromptError`] if prompting fails or is cancelled.
pub fn ask_init_answers(
    prompter: &mut impl Prompter,
    detected_shell: Option<String>,
    default_editor: &str,
) -> Result<InitAnswers, PromptError> {
    let shell = choose_shell(detected_shell);
    info!("detected shell: {shell}");

    let editor = prompter.ask_input("What editor do you use for editing files?", default_editor)?;
    let init_basic = prompter.ask_confirm(
        "Create organized config files (paths.sh, aliases.sh, env.sh, scripts.sh)?",
        true,
    )?;
    let create_examples =
        prompter.ask_confirm("Include example files to help you get started?", true)?;

    Ok(InitAnswers {
        shell,
        editor: editor.trim().to_string(),
        init_basic,
        create_examples,
    })
}

/// Apply init answers.
///
/// Saves configuration, scaffolds what was asked for, and integrates into the
/// shell's startup file. Steps that already completed stay in place if a
/// later one fails.
///
/// # Errors
///
/// - Return [`WizardError::Config`] if configuration cannot be saved.
/// - Return [`WizardError::Scaffold`] if scaffolding fails.
/// - Return [`WizardError::Integrate`] if shell integration fails.
#[instrument(skip(layout, home), level = "debug")]
pub fn apply_init(layout: &Layout, home: &Path, answers: InitAnswers) -> Result<InitReport> {
    let config = UserConfig::from(answers);
    config.save(layout.config_path())?;

    let mut created = Vec::new();
    if config.init_basic {
        info!("creating config files");
        created.extend(ensure_structure(layout)?);
    }

    if config.create_examples {
        info!("creating example files");
        created.extend(ensure_examples(layout)?);
    }

    let profile = ShellProfile::resolve(config.detected_shell.as_str(), home);
    let outcome = ShellIntegration::new(profile.clone(), layout.core_dir()).integrate()?;

    Ok(InitReport {
        config,
        profile,
        outcome,
        created,
    })
}

/// Result of an uninstall flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    /// Configuration never recorded a shell.
    NotInstalled,

    /// User backed out.
    Cancelled,

    /// Integration removed.
    Removed {
        removal: RemovalOutcome,
        config_removed: bool,
    },
}

/// Remove shell integration, and optionally the configuration tree.
///
/// # Errors
///
/// - Return [`WizardError::Prompt`] if prompting fails.
/// - Return [`WizardError::Integrate`] if integration removal fails.
/// - Return [`WizardError::RemoveConfigRoot`] if configuration tree cannot be
///   deleted.
#[instrument(skip(prompter, layout, config, home), level = "debug")]
pub fn uninstall(
    prompter: &mut impl Prompter,
    layout: &Layout,
    config: &UserConfig,
    home: &Path,
) -> Result<UninstallOutcome> {
    let Some(shell) = config.shell() else {
        return Ok(UninstallOutcome::NotInstalled);
    };

    let confirmed = prompter.ask_confirm(
        "Are you sure you want to uninstall dotwaifu? This will remove the integration from your shell.",
        false,
    )?;
    if !confirmed {
        return Ok(UninstallOutcome::Cancelled);
    }

    info!("removing dotwaifu integration");
    let profile = ShellProfile::resolve(shell, home);
    let removal = ShellIntegration::new(profile, layout.core_dir()).remove()?;

    let remove_root = prompter.ask_confirm(
        &format!(
            "Do you want to remove the dotwaifu configuration directory ({})?",
            layout.root().display()
        ),
        false,
    )?;
    if remove_root {
        std::fs::remove_dir_all(layout.root()).map_err(|err| WizardError::RemoveConfigRoot {
            source: err,
            root_path: layout.root().to_path_buf(),
        })?;
        info!("configuration directory removed");
    }

    Ok(UninstallOutcome::Removed {
        removal,
        config_removed: remove_root,
    })
}

/// Setup and teardown error types.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scaffold(#[from] scaffold::Error),

    #[error(transparent)]
    Integrate(#[from] integrate::Error),

    /// Configuration tree cannot be deleted.
    #[error("failed to remove configuration directory at {:?}", root_path.display())]
    RemoveConfigRoot {
        #[source]
        source: std::io::Error,
        root_path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = WizardError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{integrate::is_integrated, prompt};
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::{collections::VecDeque, fs::read_to_string};

    #[derive(Debug, Default)]
    struct ScriptedPrompter {
        inputs: VecDeque<String>,
        confirms: VecDeque<bool>,
    }

    impl ScriptedPrompter {
        fn new(inputs: &[&str], confirms: &[bool]) -> Self {
            Self {
                inputs: inputs.iter().map(ToString::to_string).collect(),
                confirms: confirms.iter().copied().collect(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask_select(&mut self, message: &str, _options: &[&str]) -> prompt::Result<String> {
            Err(PromptError::NoAnswer(message.into()))
        }

        fn ask_confirm(&mut self, message: &str, _default: bool) -> prompt::Result<bool> {
            self.confirms
                .pop_front()
                .ok_or_else(|| PromptError::NoAnswer(message.into()))
        }

        fn ask_input(&mut self, message: &str, _default: &str) -> prompt::Result<String> {
            self.inputs
                .pop_front()
                .ok_or_else(|| PromptError::NoAnswer(message.into()))
        }
    }

    fn fixture() -> anyhow::Result<(Layout, PathBuf)> {
        let home = std::env::current_dir()?;
        Ok((Layout::new(home.join(".config/dotwaifu")), home))
    }

    #[test]
    fn unknown_shell_falls_back() {
        assert_eq!(choose_shell(None), "zsh");
        assert_eq!(choose_shell(Some("unknown".into())), "zsh");
        assert_eq!(choose_shell(Some("fish".into())), "fish");
    }

    #[test]
    fn ask_init_answers_collects_everything() -> anyhow::Result<()> {
        let mut prompter = ScriptedPrompter::new(&[" vim "], &[true, false]);
        let answers = ask_init_answers(&mut prompter, Some("bash".into()), "code")?;

        assert_eq!(
            answers,
            InitAnswers {
                shell: "bash".into(),
                editor: "vim".into(),
                init_basic: true,
                create_examples: false,
            }
        );

        Ok(())
    }

    #[sealed_test]
    fn apply_init_builds_everything() -> anyhow::Result<()> {
        let (layout, home) = fixture()?;
        let answers = InitAnswers {
            shell: "zsh".into(),
            editor: "vim".into(),
            init_basic: true,
            create_examples: true,
        };

        let report = apply_init(&layout, &home, answers)?;
        assert_eq!(report.outcome, IntegrationOutcome::Created);
        assert_eq!(report.created.len(), 8);
        assert_eq!(UserConfig::load(layout.config_path())?, report.config);
        assert!(is_integrated(&read_to_string(home.join(".zshrc"))?));

        let again = apply_init(
            &layout,
            &home,
            InitAnswers {
                shell: "zsh".into(),
                editor: "vim".into(),
                init_basic: true,
                create_examples: true,
            },
        )?;
        assert_eq!(again.outcome, IntegrationOutcome::AlreadyIntegrated);
        assert!(again.created.is_empty());

        Ok(())
    }

    #[sealed_test]
    fn apply_init_without_scaffolding_still_integrates() -> anyhow::Result<()> {
        let (layout, home) = fixture()?;
        let answers = InitAnswers {
            shell: "bash".into(),
            editor: "nano".into(),
            init_basic: false,
            create_examples: false,
        };

        let report = apply_init(&layout, &home, answers)?;
        assert_eq!(report.outcome, IntegrationOutcome::Created);
        assert!(!layout.core_dir().exists());
        assert!(layout.config_path().exists());

        Ok(())
    }

    #[sealed_test]
    fn uninstall_without_shell_is_not_installed() -> anyhow::Result<()> {
        let (layout, home) = fixture()?;
        let mut prompter = ScriptedPrompter::default();

        let outcome = uninstall(&mut prompter, &layout, &UserConfig::default(), &home)?;
        assert_eq!(outcome, UninstallOutcome::NotInstalled);

        Ok(())
    }

    #[sealed_test]
    fn uninstall_cancelled_changes_nothing() -> anyhow::Result<()> {
        let (layout, home) = fixture()?;
        std::fs::write(home.join(".bashrc"), "export X=1\n")?;
        let answers = InitAnswers {
            shell: "bash".into(),
            editor: "nano".into(),
            init_basic: true,
            create_examples: false,
        };
        let report = apply_init(&layout, &home, answers)?;
        let before = read_to_string(home.join(".bashrc"))?;

        let mut prompter = ScriptedPrompter::new(&[], &[false]);
        let outcome = uninstall(&mut prompter, &layout, &report.config, &home)?;

        assert_eq!(outcome, UninstallOutcome::Cancelled);
        assert_eq!(read_to_string(home.join(".bashrc"))?, before);

        Ok(())
    }

    #[sealed_test]
    fn uninstall_restores_and_removes_root() -> anyhow::Result<()> {
        let (layout, home) = fixture()?;
        std::fs::write(home.join(".bashrc"), "export X=1\n")?;
        let answers = InitAnswers {
            shell: "bash".into(),
            editor: "nano".into(),
            init_basic: true,
            create_examples: true,
        };
        let report = apply_init(&layout, &home, answers)?;

        let mut prompter = ScriptedPrompter::new(&[], &[true, true]);
        let outcome = uninstall(&mut prompter, &layout, &report.config, &home)?;

        assert_eq!(
            outcome,
            UninstallOutcome::Removed {
                removal: RemovalOutcome::Restored,
                config_removed: true,
            }
        );
        assert_eq!(read_to_string(home.join(".bashrc"))?, "export X=1\n");
        assert!(!layout.root().exists());

        Ok(())
    }
}
