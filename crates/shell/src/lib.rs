//! Browser shell session controller.
//!
//! This crate keeps the shell's observers consistent while tabs load,
//! switch and close:
//! - Tab registry and per-tab navigation state
//! - Address bar, progress indicator and history
//! - Dark mode and window themes
//! - Bookmarks, notes and settings
//! - Ad blocking through the engine's request filter
//! - Voice commands, read aloud, summarize and extension scripts
//!
//! Rendering, speech and network access are collaborators behind the
//! [`Engine`], [`EngineView`] and [`services`] traits.

pub mod address_bar;
mod assistant;
pub mod bookmarks;
pub mod config;
pub mod content_filter;
pub mod engine;
pub mod events;
pub mod extension;
pub mod history;
pub mod navigation;
pub mod notes;
pub mod notice;
mod page_tools;
pub mod services;
pub mod session;
pub mod settings;
pub mod tab;
pub mod tasks;
pub mod theme;
mod url_list;
pub mod voice;
pub mod widgets;

#[cfg(test)]
pub(crate) mod testing;

pub use config::SessionConfig;
pub use engine::{CookiePolicy, Engine, EngineView, HtmlPurpose, PageScript, TextPurpose};
pub use events::{EngineEvent, Key, KeyPress, ShellEvent, Sidebar, TaskOutcome, UserAction};
pub use notice::{Notice, NoticeLevel};
pub use page_tools::{file_url, upscale, UPSCALE_FACTOR};
pub use services::{Audio, JsonFetcher, Services, SpeechError, SpeechRecognizer, SpeechSynthesizer, Summarizer};
pub use session::{Session, SessionFlags};
pub use settings::SettingsForm;
pub use tab::TabId;
pub use tasks::EventChannel;
pub use theme::Theme;
