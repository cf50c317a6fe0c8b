// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotwaifu::{
    config::UserConfig,
    export::write_export,
    integrate::{
        is_integrated, IntegrationOutcome, IntegrationState, RemovalOutcome, ShellIntegration,
    },
    path::Layout,
    profile::ShellProfile,
    project::{ensure_project_fragment, resolve_edit_target},
    prompt::{self, PromptError, Prompter},
    scaffold::FragmentKind,
    setup::{setup_from, SetupSource},
    sync::{ConfigRepo, DEFAULT_COMMIT_MESSAGE},
    wizard::{apply_init, ask_init_answers, uninstall, UninstallOutcome},
};

use anyhow::Result;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    collections::VecDeque,
    fs::{create_dir_all, read_to_string, write},
    path::PathBuf,
};

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

fn fixture() -> Result<(Layout, PathBuf)> {
    let home = std::env::current_dir()?;
    Ok((Layout::new(home.join(".config/dotwaifu")), home))
}

#[sealed_test]
fn init_edit_sync_uninstall_round_trip() -> Result<()> {
    let (layout, home) = fixture()?;
    let original = "export X=1\n";
    write(home.join(".bashrc"), original)?;

    let mut prompter = ScriptedPrompter::new(&["vim"], &[true, false]);
    let answers = ask_init_answers(&mut prompter, Some("bash".into()), "code")?;
    let report = apply_init(&layout, &home, answers)?;
    assert_eq!(report.outcome, IntegrationOutcome::Appended);
    assert_eq!(read_to_string(home.join(".bashrc_backup"))?, original);

    let rc = read_to_string(home.join(".bashrc"))?;
    assert!(rc.starts_with(original));
    assert!(is_integrated(&rc));

    // Second run leaves startup file alone.
    let profile = ShellProfile::resolve("bash", &home);
    let integration = ShellIntegration::new(profile.clone(), layout.core_dir());
    assert_eq!(integration.integrate()?, IntegrationOutcome::AlreadyIntegrated);
    assert_eq!(read_to_string(home.join(".bashrc"))?, rc);
    assert_eq!(integration.state()?, IntegrationState::RcIntegrated);

    let fragment = ensure_project_fragment(&layout, "flutter", "aliases")?;
    assert!(fragment.created);
    assert_eq!(
        resolve_edit_target(&layout, FragmentKind::Aliases, Some("flutter"))?,
        fragment.path
    );
    write(&fragment.path, "# flutter aliases\nalias fr=\"flutter run\"\n")?;

    let export = write_export(&layout, &profile, &home)?;
    let exported = read_to_string(export)?;
    assert!(exported.starts_with("#!/bin/bash\n"));
    assert!(exported.contains("# === flutter project ===\n"));
    assert!(exported.contains("alias fr=\"flutter run\""));

    let (repo, created) = ConfigRepo::open_or_init(layout.root())?;
    assert!(created);
    assert!(!repo.is_clean()?);
    repo.commit_all(DEFAULT_COMMIT_MESSAGE)?;
    assert!(repo.is_clean()?);

    let config = UserConfig::load(layout.config_path())?;
    let mut prompter = ScriptedPrompter::new(&[], &[true, false]);
    let outcome = uninstall(&mut prompter, &layout, &config, &home)?;
    assert_eq!(
        outcome,
        UninstallOutcome::Removed {
            removal: RemovalOutcome::Restored,
            config_removed: false,
        }
    );
    assert_eq!(read_to_string(home.join(".bashrc"))?, original);
    assert!(!home.join(".bashrc_backup").exists());
    assert!(layout.root().exists());

    Ok(())
}

#[sealed_test]
fn setup_from_local_copy_then_integrate() -> Result<()> {
    let (layout, home) = fixture()?;
    let machine = Layout::new(home.join("old-machine"));
    let mut prompter = ScriptedPrompter::new(&["nano"], &[true, false]);
    let answers = ask_init_answers(&mut prompter, Some("zsh".into()), "code")?;
    let old_home = home.join("old-home");
    create_dir_all(&old_home)?;
    apply_init(&machine, &old_home, answers)?;

    setup_from(&SetupSource::local(machine.root()), layout.root())?;
    let config = UserConfig::load(layout.config_path())?;
    assert_eq!(config.shell(), Some("zsh"));
    assert_eq!(config.editor(), Some("nano"));
    assert!(layout.core_fragment(FragmentKind::Env).exists());

    let profile = ShellProfile::resolve("zsh", &home);
    let integration = ShellIntegration::new(profile, layout.core_dir());
    assert_eq!(integration.state()?, IntegrationState::NoRc);
    assert_eq!(integration.integrate()?, IntegrationOutcome::Created);

    let mut prompter = ScriptedPrompter::new(&[], &[true, true]);
    let outcome = uninstall(&mut prompter, &layout, &config, &home)?;
    assert_eq!(
        outcome,
        UninstallOutcome::Removed {
            removal: RemovalOutcome::Deleted,
            config_removed: true,
        }
    );
    assert!(!home.join(".zshrc").exists());
    assert!(!layout.root().exists());

    Ok(())
}

#[sealed_test]
fn uninstall_without_shell_does_nothing() -> Result<()> {
    let (layout, home) = fixture()?;
    let mut prompter = ScriptedPrompter::default();
    let outcome = uninstall(&mut prompter, &layout, &UserConfig::default(), &home)?;
    assert_eq!(outcome, UninstallOutcome::NotInstalled);

    Ok(())
}
