// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive prompting.
//!
//! Commands never talk to the terminal directly. They ask a [`Prompter`]
//! instead, so flows like the setup wizard can be driven by scripted answers
//! in tests.

use inquire::{Confirm, Select, Text};

/// Capability to ask the user questions.
pub trait Prompter {
    /// Ask user to pick one of several options.
    fn ask_select(&mut self, message: &str, options: &[&str]) -> Result<String>;

    /// Ask user a yes or no question.
    fn ask_confirm(&mut self, message: &str, default: bool) -> Result<bool>;

    /// Ask user for free-form text.
    fn ask_input(&mut self, message: &str, default: &str) -> Result<String>;
}

/// Prompter backed by the terminal through inquire.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Construct new terminal prompter.
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn ask_select(&mut self, message: &str, options: &[&str]) -> Result<String> {
        let choice = Select::new(message, options.to_vec()).prompt()?;
        Ok(choice.to_string())
    }

    fn ask_confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new(message).with_default(default).prompt()?)
    }

    fn ask_input(&mut self, message: &str, default: &str) -> Result<String> {
        Ok(Text::new(message).with_default(default).prompt()?)
    }
}

/// Prompting error types.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    /// Terminal prompt failed or was cancelled.
    #[error(transparent)]
    Inquire(#[from] inquire::InquireError),

    /// Prompter has no answer for question.
    #[error("no answer available for {0:?}")]
    NoAnswer(String),
}

/// Friendly result alias :3
pub type Result<T, E = PromptError> = std::result::Result<T, E>;
