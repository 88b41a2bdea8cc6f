//! Events routed through the session dispatcher.
//!
//! Every state transition of the session starts from one of these values:
//! engine callbacks, user actions, or completions of background work.

use std::path::PathBuf;

use common::ShellResult;
use serde_json::Value;

use crate::engine::{HtmlPurpose, TextPurpose};
use crate::services::SpeechError;
use crate::settings::SettingsForm;
use crate::tab::TabId;
use crate::theme::Theme;

/// Input to [`Session::dispatch`](crate::Session::dispatch).
#[derive(Debug)]
pub enum ShellEvent {
    /// Callback from the engine view of a tab.
    Engine { tab: TabId, event: EngineEvent },
    /// User interaction.
    Action(UserAction),
    /// Completion of background work.
    Task(TaskOutcome),
}

impl From<UserAction> for ShellEvent {
    fn from(action: UserAction) -> Self {
        ShellEvent::Action(action)
    }
}

impl From<TaskOutcome> for ShellEvent {
    fn from(outcome: TaskOutcome) -> Self {
        ShellEvent::Task(outcome)
    }
}

/// Engine callbacks.
#[derive(Debug)]
pub enum EngineEvent {
    UrlChanged(String),
    TitleChanged(String),
    LoadProgress(i32),
    LoadFinished { ok: bool },
    PlainText { purpose: TextPurpose, text: String },
    Html { purpose: HtmlPurpose, html: String },
}

/// Sidebars that can be shown or hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sidebar {
    History,
    Bookmarks,
    Notes,
    News,
    Extensions,
}

/// User actions.
#[derive(Debug)]
pub enum UserAction {
    NewTab,
    OpenTab { url: String, title: String },
    CloseTab(TabId),
    CloseActiveTab,
    SwitchTab(TabId),
    /// Address bar submission.
    Navigate(String),
    Back,
    Forward,
    Refresh,
    ZoomIn,
    ZoomOut,
    FocusAddressBar,
    ToggleDarkMode,
    SetDarkMode(bool),
    /// `color` is the picked color for [`Theme::Custom`]; `None` means the
    /// picker was dismissed.
    SetTheme { theme: Theme, color: Option<String> },
    ToggleAdBlock,
    ToggleIncognito,
    ToggleFullscreen,
    SetUserAgent(String),
    AddBookmark,
    OpenBookmark(String),
    OpenHistoryEntry(String),
    /// Case-insensitive search over history URLs.
    SearchHistory(String),
    ClearHistory,
    AddNote(String),
    SaveSettings(SettingsForm),
    ReadAloud,
    Summarize,
    StartVoiceCommand,
    /// A phrase recognized outside the shell, dispatched as a voice command.
    VoicePhrase(String),
    UpscalePage,
    SavePage(PathBuf),
    ViewSource,
    ToggleSidebar(Sidebar),
    OpenChatbot,
    RunExtension(String),
    ShowNotice(String),
    KeyPress(KeyPress),
    RefreshWidgets,
}

impl UserAction {
    /// Display name, used as the title of notices raised by the action.
    pub fn name(&self) -> &'static str {
        match self {
            UserAction::NewTab | UserAction::OpenTab { .. } => "New Tab",
            UserAction::CloseTab(_) | UserAction::CloseActiveTab => "Close Tab",
            UserAction::SwitchTab(_) => "Switch Tab",
            UserAction::Navigate(_) => "Navigate",
            UserAction::Back => "Back",
            UserAction::Forward => "Forward",
            UserAction::Refresh => "Refresh",
            UserAction::ZoomIn => "Zoom In",
            UserAction::ZoomOut => "Zoom Out",
            UserAction::FocusAddressBar => "Address Bar",
            UserAction::ToggleDarkMode | UserAction::SetDarkMode(_) => "Dark Mode",
            UserAction::SetTheme { .. } => "Theme",
            UserAction::ToggleAdBlock => "Ad Block",
            UserAction::ToggleIncognito => "Incognito Mode",
            UserAction::ToggleFullscreen => "Fullscreen",
            UserAction::SetUserAgent(_) => "User Agent",
            UserAction::AddBookmark | UserAction::OpenBookmark(_) => "Bookmarks",
            UserAction::OpenHistoryEntry(_)
            | UserAction::SearchHistory(_)
            | UserAction::ClearHistory => "History",
            UserAction::AddNote(_) | UserAction::OpenChatbot => "Notes",
            UserAction::SaveSettings(_) => "Settings",
            UserAction::ReadAloud => "Read Aloud",
            UserAction::Summarize => "Summarize",
            UserAction::StartVoiceCommand | UserAction::VoicePhrase(_) => "Voice Command",
            UserAction::UpscalePage => "Upscale",
            UserAction::SavePage(_) => "Save Page",
            UserAction::ViewSource => "Page Source",
            UserAction::ToggleSidebar(_) => "Sidebar",
            UserAction::RunExtension(_) | UserAction::ShowNotice(_) => "Extension",
            UserAction::KeyPress(_) => "Shortcut",
            UserAction::RefreshWidgets => "Widgets",
        }
    }
}

/// Completions of background work.
#[derive(Debug)]
pub enum TaskOutcome {
    Utterance(Result<String, SpeechError>),
    SpeechPlayed { tab: TabId, result: ShellResult<()> },
    Summary { tab: TabId, result: ShellResult<String> },
    Weather(ShellResult<Value>),
    News(ShellResult<Value>),
    /// Page HTML written to this path.
    PageSaved(ShellResult<PathBuf>),
}

/// Keys the shell binds shortcuts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    F5,
    F11,
    Backspace,
    Plus,
    Minus,
    Char(char),
}

/// A key press with its modifier state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }
}

/// Keyboard shortcut.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardShortcut {
    Fullscreen,
    Reload,
    Back,
    FocusAddressBar,
    NewTab,
    CloseTab,
    ZoomIn,
    ZoomOut,
}

impl KeyboardShortcut {
    /// Look up the shortcut bound to a key press.
    pub fn from_key_press(press: KeyPress) -> Option<Self> {
        let shortcut = match (press.key, press.ctrl) {
            (Key::F11, false) => KeyboardShortcut::Fullscreen,
            (Key::F5, false) => KeyboardShortcut::Reload,
            (Key::Backspace, false) => KeyboardShortcut::Back,
            (Key::Char(c), true) => match c.to_ascii_lowercase() {
                'l' => KeyboardShortcut::FocusAddressBar,
                't' => KeyboardShortcut::NewTab,
                'w' => KeyboardShortcut::CloseTab,
                _ => return None,
            },
            (Key::Plus, true) => KeyboardShortcut::ZoomIn,
            (Key::Minus, true) => KeyboardShortcut::ZoomOut,
            _ => return None,
        };
        Some(shortcut)
    }

    /// The action the shortcut triggers.
    pub fn action(self) -> UserAction {
        match self {
            KeyboardShortcut::Fullscreen => UserAction::ToggleFullscreen,
            KeyboardShortcut::Reload => UserAction::Refresh,
            KeyboardShortcut::Back => UserAction::Back,
            KeyboardShortcut::FocusAddressBar => UserAction::FocusAddressBar,
            KeyboardShortcut::NewTab => UserAction::NewTab,
            KeyboardShortcut::CloseTab => UserAction::CloseActiveTab,
            KeyboardShortcut::ZoomIn => UserAction::ZoomIn,
            KeyboardShortcut::ZoomOut => UserAction::ZoomOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_bindings() {
        assert_eq!(
            KeyboardShortcut::from_key_press(KeyPress::plain(Key::F11)),
            Some(KeyboardShortcut::Fullscreen)
        );
        assert_eq!(
            KeyboardShortcut::from_key_press(KeyPress::ctrl(Key::Char('T'))),
            Some(KeyboardShortcut::NewTab)
        );
        assert_eq!(
            KeyboardShortcut::from_key_press(KeyPress::ctrl(Key::Minus)),
            Some(KeyboardShortcut::ZoomOut)
        );
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(KeyboardShortcut::from_key_press(KeyPress::plain(Key::Char('t'))), None);
        assert_eq!(KeyboardShortcut::from_key_press(KeyPress::ctrl(Key::F5)), None);
        assert_eq!(KeyboardShortcut::from_key_press(KeyPress::ctrl(Key::Char('q'))), None);
    }

    #[test]
    fn test_shortcut_actions() {
        assert!(matches!(KeyboardShortcut::CloseTab.action(), UserAction::CloseActiveTab));
        assert!(matches!(KeyboardShortcut::Reload.action(), UserAction::Refresh));
    }
}
