// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Modular shell configuration manager.
//!
//! Dotwaifu splits shell configuration into small __fragments__: one file
//! each for PATH modifications, aliases, environment variables, and utility
//! scripts. Core fragments apply everywhere, project fragments group
//! settings for a single tool or project. All of it lives under
//! `$HOME/.config/dotwaifu`, which doubles as a Git repository for backup.
//!
//! The user's own startup file (`.zshrc`, `.bashrc`, ...) is touched exactly
//! once: a delimited loader block gets appended after the original file is
//! backed up. Uninstalling restores that backup, so leaving dotwaifu is
//! always clean.

pub mod config;
pub mod export;
pub mod integrate;
pub mod path;
pub mod profile;
pub mod project;
pub mod prompt;
pub mod scaffold;
pub mod setup;
pub mod sync;
pub mod syscall;
pub mod wizard;
