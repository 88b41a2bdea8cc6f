//! Extension scripts.
//!
//! Extensions are line-oriented scripts over a fixed command set. They can
//! only do what a user could do through the shell's own actions:
//!
//! ```text
//! # comment
//! navigate <text>
//! back | forward | refresh
//! zoom in | zoom out
//! dark-mode on | dark-mode off
//! bookmark
//! note <text>
//! notify <text>
//! ```
//!
//! A script with any unknown or malformed line is rejected as a whole.

use common::{ShellError, ShellResult};

use crate::events::UserAction;

/// One parsed extension command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionCommand {
    Navigate(String),
    Back,
    Forward,
    Refresh,
    ZoomIn,
    ZoomOut,
    DarkMode(bool),
    Bookmark,
    Note(String),
    Notify(String),
}

impl ExtensionCommand {
    pub fn into_action(self) -> UserAction {
        match self {
            ExtensionCommand::Navigate(text) => UserAction::Navigate(text),
            ExtensionCommand::Back => UserAction::Back,
            ExtensionCommand::Forward => UserAction::Forward,
            ExtensionCommand::Refresh => UserAction::Refresh,
            ExtensionCommand::ZoomIn => UserAction::ZoomIn,
            ExtensionCommand::ZoomOut => UserAction::ZoomOut,
            ExtensionCommand::DarkMode(on) => UserAction::SetDarkMode(on),
            ExtensionCommand::Bookmark => UserAction::AddBookmark,
            ExtensionCommand::Note(text) => UserAction::AddNote(text),
            ExtensionCommand::Notify(text) => UserAction::ShowNotice(text),
        }
    }
}

/// Parse a whole script.
pub fn parse_script(source: &str) -> ShellResult<Vec<ExtensionCommand>> {
    let mut commands = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = parse_line(line).ok_or_else(|| {
            ShellError::user_input(format!("extension line {}: cannot run `{line}`", index + 1))
        })?;
        commands.push(command);
    }

    Ok(commands)
}

fn parse_line(line: &str) -> Option<ExtensionCommand> {
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word, rest) {
        ("navigate", target) if !target.is_empty() => ExtensionCommand::Navigate(target.to_string()),
        ("back", "") => ExtensionCommand::Back,
        ("forward", "") => ExtensionCommand::Forward,
        ("refresh", "") => ExtensionCommand::Refresh,
        ("zoom", "in") => ExtensionCommand::ZoomIn,
        ("zoom", "out") => ExtensionCommand::ZoomOut,
        ("dark-mode", "on") => ExtensionCommand::DarkMode(true),
        ("dark-mode", "off") => ExtensionCommand::DarkMode(false),
        ("bookmark", "") => ExtensionCommand::Bookmark,
        ("note", text) if !text.is_empty() => ExtensionCommand::Note(text.to_string()),
        ("notify", text) if !text.is_empty() => ExtensionCommand::Notify(text.to_string()),
        _ => return None,
    };
    Some(command)
}
