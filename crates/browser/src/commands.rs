//! Line commands of the terminal front-end.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use shell::events::{Key, KeyPress};
use shell::{SettingsForm, Sidebar, TabId, Theme, UserAction};

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  go <url or search>      navigate the active tab
  back | forward | reload
  tab [url]               open a tab (homepage by default)
  close [n]               close tab n (active tab by default)
  switch <n>              activate tab n
  zoom in | zoom out
  dark                    toggle dark mode
  theme <default|dark|blue|custom> [#rrggbb]
  adblock | incognito | fullscreen
  ua <user agent>
  bookmark | open-bookmark <url>
  history <url> | history-search <text> | clear-history
  note <text> | chatbot
  homepage <url> | apikey <key>
  encrypt <text> | decrypt <ciphertext>
  read | summarize | listen | say <phrase>
  upscale | save <path> | source
  sidebar <history|bookmarks|notes|news|extensions>
  ext <path>              run an extension script
  key [ctrl+]<key>        press a shortcut (f5, f11, backspace, plus, minus, a-z)
  widgets                 refresh weather and news
  status | help | quit";

/// A parsed input line.
#[derive(Debug)]
pub enum Command {
    Action(UserAction),
    /// Read an extension script from a file and run it.
    RunExtensionFile(PathBuf),
    /// Encrypt a credential with the session key.
    Encrypt(String),
    Decrypt(String),
    Status,
    Help,
    Quit,
    /// Blank line.
    Nothing,
}

impl From<UserAction> for Command {
    fn from(action: UserAction) -> Self {
        Command::Action(action)
    }
}

/// Parse one input line.
pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "" => Command::Nothing,
        "go" | "open" => UserAction::Navigate(required(rest, word)?).into(),
        "back" => UserAction::Back.into(),
        "forward" => UserAction::Forward.into(),
        "reload" | "refresh" => UserAction::Refresh.into(),
        "tab" if rest.is_empty() => UserAction::NewTab.into(),
        "tab" => UserAction::OpenTab {
            url: rest.to_string(),
            title: "New Tab".to_string(),
        }
        .into(),
        "close" if rest.is_empty() => UserAction::CloseActiveTab.into(),
        "close" => UserAction::CloseTab(tab_id(rest)?).into(),
        "switch" => UserAction::SwitchTab(tab_id(rest)?).into(),
        "zoom" => match rest {
            "in" => UserAction::ZoomIn.into(),
            "out" => UserAction::ZoomOut.into(),
            _ => bail!("usage: zoom in | zoom out"),
        },
        "dark" => UserAction::ToggleDarkMode.into(),
        "theme" => {
            let mut parts = rest.split_whitespace();
            let theme: Theme = parts.next().ok_or_else(|| anyhow!("usage: theme <name> [color]"))?.parse()?;
            UserAction::SetTheme {
                theme,
                color: parts.next().map(str::to_string),
            }
            .into()
        }
        "adblock" => UserAction::ToggleAdBlock.into(),
        "incognito" => UserAction::ToggleIncognito.into(),
        "fullscreen" => UserAction::ToggleFullscreen.into(),
        "ua" => UserAction::SetUserAgent(required(rest, word)?).into(),
        "bookmark" => UserAction::AddBookmark.into(),
        "open-bookmark" => UserAction::OpenBookmark(required(rest, word)?).into(),
        "history" => UserAction::OpenHistoryEntry(required(rest, word)?).into(),
        "history-search" => UserAction::SearchHistory(required(rest, word)?).into(),
        "clear-history" => UserAction::ClearHistory.into(),
        "note" => UserAction::AddNote(rest.to_string()).into(),
        "chatbot" => UserAction::OpenChatbot.into(),
        "homepage" => UserAction::SaveSettings(SettingsForm {
            homepage: rest.to_string(),
            api_key: String::new(),
        })
        .into(),
        "apikey" => UserAction::SaveSettings(SettingsForm {
            homepage: String::new(),
            api_key: rest.to_string(),
        })
        .into(),
        "encrypt" => Command::Encrypt(required(rest, word)?),
        "decrypt" => Command::Decrypt(required(rest, word)?),
        "read" => UserAction::ReadAloud.into(),
        "summarize" => UserAction::Summarize.into(),
        "listen" => UserAction::StartVoiceCommand.into(),
        "say" => UserAction::VoicePhrase(required(rest, word)?).into(),
        "upscale" => UserAction::UpscalePage.into(),
        "save" => UserAction::SavePage(PathBuf::from(required(rest, word)?)).into(),
        "source" => UserAction::ViewSource.into(),
        "sidebar" => UserAction::ToggleSidebar(sidebar(rest)?).into(),
        "ext" => Command::RunExtensionFile(PathBuf::from(required(rest, word)?)),
        "key" => UserAction::KeyPress(key_press(rest)?).into(),
        "widgets" => UserAction::RefreshWidgets.into(),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command `{other}`, try `help`"),
    };
    Ok(command)
}

fn required(rest: &str, word: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("`{word}` needs an argument");
    }
    Ok(rest.to_string())
}

fn tab_id(text: &str) -> Result<TabId> {
    let id = text
        .parse::<u64>()
        .map_err(|_| anyhow!("not a tab number: `{text}`"))?;
    Ok(TabId(id))
}

fn sidebar(name: &str) -> Result<Sidebar> {
    Ok(match name {
        "history" => Sidebar::History,
        "bookmarks" => Sidebar::Bookmarks,
        "notes" => Sidebar::Notes,
        "news" => Sidebar::News,
        "extensions" => Sidebar::Extensions,
        other => bail!("unknown sidebar `{other}`"),
    })
}

fn key_press(spec: &str) -> Result<KeyPress> {
    let spec = spec.to_ascii_lowercase();
    let (ctrl, name) = match spec.strip_prefix("ctrl+") {
        Some(name) => (true, name),
        None => (false, spec.as_str()),
    };

    let key = match name {
        "f5" => Key::F5,
        "f11" => Key::F11,
        "backspace" => Key::Backspace,
        "plus" | "+" => Key::Plus,
        "minus" | "-" => Key::Minus,
        single if single.chars().count() == 1 => Key::Char(single.chars().next().unwrap_or(' ')),
        other => bail!("unknown key `{other}`"),
    };
    Ok(KeyPress { key, ctrl })
}
