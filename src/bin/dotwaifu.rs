// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use dotwaifu::{
    config::UserConfig,
    export::write_export,
    integrate::{IntegrationOutcome, RemovalOutcome, ShellIntegration},
    path::{home_dir, Layout},
    profile::{detect_shell_from_env, ShellProfile},
    project::resolve_edit_target,
    prompt::{Prompter, TerminalPrompter},
    scaffold::FragmentKind,
    setup::{setup_from, SetupSource},
    sync::{ConfigRepo, DEFAULT_COMMIT_MESSAGE},
    syscall::{open_in_editor, reload_shell},
    wizard::{
        apply_init, ask_init_answers, choose_shell, uninstall, UninstallOutcome, FALLBACK_EDITOR,
    },
};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    long_about = "Manage shell configuration as small modular fragments.\n\n\
                  Keeps paths, aliases, environment variables, and scripts in separate files,\n\
                  backs them up through git, and offers a clean exit strategy.",
    override_usage = "dotwaifu [options] <dotwaifu-command>",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        match self.command {
            Command::Init => run_init(),
            Command::Edit(opts) => run_edit(opts),
            Command::Export => run_export(),
            Command::Reload => run_reload(),
            Command::Sync(opts) => run_sync(opts),
            Command::Uninstall => run_uninstall(),
            Command::Setup(opts) => run_setup(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Interactive wizard to set up shell detection, fragments, and integration.
    #[command(override_usage = "dotwaifu init")]
    Init,

    /// Edit core or project fragment in preferred editor.
    #[command(override_usage = "dotwaifu edit [options] [type] [project]")]
    Edit(EditOptions),

    /// Export all fragments into one standalone startup file.
    #[command(override_usage = "dotwaifu export")]
    Export,

    /// Source shell startup file to check recent changes.
    #[command(override_usage = "dotwaifu reload")]
    Reload,

    /// Commit configuration changes to local git repository.
    #[command(override_usage = "dotwaifu sync [options]")]
    Sync(SyncOptions),

    /// Remove shell integration and restore backup.
    #[command(override_usage = "dotwaifu uninstall")]
    Uninstall,

    /// Set up from existing configuration in a repository or local directory.
    #[command(override_usage = "dotwaifu setup (--repo <url> | --local <path>)")]
    Setup(SetupOptions),
}

#[derive(Args, Clone, Debug)]
struct EditOptions {
    /// Fragment type to edit: paths, aliases, env, or scripts.
    #[arg(value_name = "type")]
    pub fragment: Option<String>,

    /// Project whose fragment to edit.
    #[arg(value_name = "project")]
    pub project: Option<String>,

    /// Project whose fragment to edit.
    #[arg(short, long = "project", value_name = "project", conflicts_with = "project")]
    pub project_flag: Option<String>,
}

#[derive(Args, Clone, Debug)]
struct SyncOptions {
    /// Commit message to use.
    #[arg(short, long, value_name = "message")]
    pub message: Option<String>,
}

#[derive(Args, Clone, Debug)]
#[group(required = true, multiple = false)]
struct SetupOptions {
    /// Git repository to clone, GitHub shorthand "owner/repo" or full URL.
    #[arg(short, long, value_name = "url")]
    pub repo: Option<String>,

    /// Local directory to copy configuration from.
    #[arg(short, long, value_name = "path")]
    pub local: Option<PathBuf>,
}

fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run() {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

fn run() -> Result<()> {
    Cli::parse().run()
}

fn run_init() -> Result<()> {
    info!("welcome to dotwaifu!");
    info!("dotwaifu organizes your shell configuration into separate, manageable files");

    let layout = Layout::open_default()?;
    let home = home_dir()?;
    let default_editor = std::env::var("EDITOR").unwrap_or_else(|_| FALLBACK_EDITOR.into());

    let mut prompter = TerminalPrompter::new();
    let answers = ask_init_answers(&mut prompter, detect_shell_from_env(), &default_editor)?;
    let report = apply_init(&layout, &home, answers)?;

    match report.outcome {
        IntegrationOutcome::Created => info!("created new {}", report.profile.rc_file_name()),
        IntegrationOutcome::Appended => info!(
            "added dotwaifu loader to {}, original kept at {:?}",
            report.profile.rc_file_name(),
            report.profile.backup_path().display()
        ),
        IntegrationOutcome::AlreadyIntegrated => info!(
            "your {} already has dotwaifu integration",
            report.profile.rc_file_name()
        ),
    }

    info!("setup complete!");
    info!("editor: {}", report.config.preferred_editor);
    info!("config files location: {:?}", layout.root().display());
    info!(
        "restart your shell or run: source {}",
        report.profile.rc_file_path().display()
    );

    if report.config.init_basic {
        info!("run 'dotwaifu edit aliases' to add command shortcuts");
        info!("run 'dotwaifu edit paths' to add directories to PATH");
        info!("run 'dotwaifu edit env' to set environment variables");
        if report.config.create_examples {
            info!(
                "check {:?} for inspiration",
                layout.examples_dir().display()
            );
        }
        info!("run 'dotwaifu sync' to save changes to git");
        info!("after editing, apply changes with 'dotwaifu reload' or restart your terminal");
    }

    Ok(())
}

fn run_edit(opts: EditOptions) -> Result<()> {
    let layout = Layout::open_default()?;
    let config = UserConfig::load(layout.config_path())?;
    let Some(editor) = config.editor() else {
        warn!("no editor configured, please run 'dotwaifu init' first");
        return Ok(());
    };

    let fragment = match opts.fragment {
        Some(fragment) => fragment,
        None => {
            let options = FragmentKind::ALL.map(|kind| kind.name());
            TerminalPrompter::new()
                .ask_select("Which configuration would you like to edit?", &options)?
        }
    };
    let kind: FragmentKind = fragment.parse()?;
    let project = opts.project.or(opts.project_flag);

    let path = resolve_edit_target(&layout, kind, project.as_deref())?;
    info!("opening {:?}", path.display());
    if let Err(err) = open_in_editor(editor, &path) {
        warn!("{err}");
        warn!("open {:?} manually to edit it", path.display());
    }

    Ok(())
}

fn run_export() -> Result<()> {
    let layout = Layout::open_default()?;
    let config = UserConfig::load(layout.config_path())?;
    let Some(shell) = config.shell() else {
        warn!("no shell detected, please run 'dotwaifu init' first");
        return Ok(());
    };

    let home = home_dir()?;
    let profile = ShellProfile::resolve(shell, &home);
    write_export(&layout, &profile, &home)?;
    info!(
        "copy it to {:?} to use it without dotwaifu",
        profile.rc_file_path().display()
    );

    Ok(())
}

fn run_reload() -> Result<()> {
    let layout = Layout::open_default()?;
    let config = UserConfig::load(layout.config_path())?;
    let Some(shell) = config.shell() else {
        warn!("no shell detected, please run 'dotwaifu init' first");
        return Ok(());
    };

    let profile = ShellProfile::resolve(shell, home_dir()?);
    let rc_path = profile.rc_file_path();
    if !rc_path.exists() {
        warn!("shell configuration file not found: {:?}", rc_path.display());
        warn!("run 'dotwaifu init' to set up your configuration");
        return Ok(());
    }

    info!("reloading shell configuration from {:?}", rc_path.display());
    match reload_shell(shell, rc_path) {
        Ok(output) => {
            if !output.is_empty() {
                info!("{output}");
            }
            info!("configuration reloaded, recent changes are active in new terminal sessions");
            info!("for this terminal, run: source {}", rc_path.display());
        }
        Err(err) => {
            warn!("{err}");
            warn!(
                "automatic reload failed, please run manually: source {}",
                rc_path.display()
            );
        }
    }

    Ok(())
}

fn run_sync(opts: SyncOptions) -> Result<()> {
    let layout = Layout::open_default()?;
    if !layout.root().exists() {
        warn!("nothing to sync yet, please run 'dotwaifu init' first");
        return Ok(());
    }

    let (repo, created) = ConfigRepo::open_or_init(layout.root())?;
    if created {
        info!("git repository initialized");
    }

    if repo.is_clean()? {
        info!("no changes to sync");
        return Ok(());
    }

    info!("committing changes");
    let message = opts.message.as_deref().unwrap_or(DEFAULT_COMMIT_MESSAGE);
    repo.commit_all(message)?;

    info!("changes committed successfully!");
    info!("to push to a remote repository, add a remote and push manually:");
    info!("  git remote add origin <your-repo-url>");
    info!("  git push -u origin main");

    Ok(())
}

fn run_uninstall() -> Result<()> {
    let layout = Layout::open_default()?;
    let config = UserConfig::load(layout.config_path())?;
    let home = home_dir()?;

    let mut prompter = TerminalPrompter::new();
    match uninstall(&mut prompter, &layout, &config, &home)? {
        UninstallOutcome::NotInstalled => info!("no shell detected, nothing to uninstall"),
        UninstallOutcome::Cancelled => info!("uninstall cancelled"),
        UninstallOutcome::Removed { removal, .. } => {
            let profile = ShellProfile::resolve(config.detected_shell.as_str(), &home);
            match removal {
                RemovalOutcome::Restored => info!(
                    "your {} has been restored from backup",
                    profile.rc_file_name()
                ),
                RemovalOutcome::Stripped => info!(
                    "dotwaifu integration stripped from {}",
                    profile.rc_file_name()
                ),
                RemovalOutcome::Deleted => info!(
                    "removed {} created by dotwaifu",
                    profile.rc_file_name()
                ),
                RemovalOutcome::NothingToRemove => info!(
                    "{} had no dotwaifu integration",
                    profile.rc_file_name()
                ),
            }
            info!("dotwaifu uninstalled successfully!");
            info!(
                "restart your shell or run: source {}",
                profile.rc_file_path().display()
            );
        }
    }

    Ok(())
}

fn run_setup(opts: SetupOptions) -> Result<()> {
    let source = match (opts.repo, opts.local) {
        (Some(repo), None) => SetupSource::remote(repo),
        (None, Some(local)) => SetupSource::local(local),
        _ => bail!("please specify either --repo or --local"),
    };

    let layout = Layout::open_default()?;
    setup_from(&source, layout.root())?;

    let mut config = UserConfig::load(layout.config_path())?;
    if config.shell().is_none() {
        config.detected_shell = choose_shell(detect_shell_from_env());
        config.save(layout.config_path())?;
    }

    let home = home_dir()?;
    let profile = ShellProfile::resolve(config.detected_shell.as_str(), &home);
    let integration = ShellIntegration::new(profile, layout.core_dir());
    if integration.integrate()? == IntegrationOutcome::AlreadyIntegrated {
        info!("shell already loads dotwaifu configuration");
    }

    info!("setup complete!");
    info!(
        "restart your shell or run: source {}",
        integration.profile().rc_file_path().display()
    );

    Ok(())
}
