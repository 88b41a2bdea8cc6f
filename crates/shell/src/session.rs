//! Session-state controller.

use std::collections::VecDeque;

use browser_security::{Blocklist, CredentialVault};
use common::{ShellError, ShellResult};
use tokio::sync::mpsc;

use crate::address_bar::AddressBar;
use crate::bookmarks::{BookmarkOutcome, BookmarkStore};
use crate::config::SessionConfig;
use crate::content_filter::ContentFilter;
use crate::engine::{CookiePolicy, Engine};
use crate::events::{EngineEvent, KeyboardShortcut, ShellEvent, Sidebar, UserAction};
use crate::extension;
use crate::history::HistoryStore;
use crate::navigation::ProgressIndicator;
use crate::notes::NoteStore;
use crate::notice::Notice;
use crate::services::Services;
use crate::settings::{SettingsForm, SettingsStore};
use crate::tab::{CloseOutcome, TabId, TabRegistry};
use crate::tasks::{EventChannel, TaskRunner};
use crate::theme::{AppearanceManager, Theme};
use crate::widgets::Widgets;

/// Snapshot of the session-wide flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionFlags {
    pub dark_mode: bool,
    pub ad_block: bool,
    pub incognito: bool,
    pub fullscreen: bool,
}

/// Sidebar visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sidebars {
    history: bool,
    bookmarks: bool,
    notes: bool,
    news: bool,
    extensions: bool,
}

impl Sidebars {
    fn slot(&mut self, sidebar: Sidebar) -> &mut bool {
        match sidebar {
            Sidebar::History => &mut self.history,
            Sidebar::Bookmarks => &mut self.bookmarks,
            Sidebar::Notes => &mut self.notes,
            Sidebar::News => &mut self.news,
            Sidebar::Extensions => &mut self.extensions,
        }
    }

    /// Check if a sidebar is shown.
    pub fn is_visible(&self, sidebar: Sidebar) -> bool {
        match sidebar {
            Sidebar::History => self.history,
            Sidebar::Bookmarks => self.bookmarks,
            Sidebar::Notes => self.notes,
            Sidebar::News => self.news,
            Sidebar::Extensions => self.extensions,
        }
    }

    /// Show or hide a sidebar. Returns the new visibility.
    pub fn toggle(&mut self, sidebar: Sidebar) -> bool {
        let slot = self.slot(sidebar);
        *slot = !*slot;
        *slot
    }

    pub fn show(&mut self, sidebar: Sidebar) {
        *self.slot(sidebar) = true;
    }
}

/// HTML source of a page, published by "view source".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSource {
    pub tab: TabId,
    pub html: String,
}

/// The browser shell session.
///
/// Owns every piece of session state and is the only place it changes.
/// All inputs go through [`Session::dispatch`]; background work reports
/// back through the event channel and is dispatched by
/// [`Session::process_next`].
pub struct Session {
    /// Configuration the session was started with.
    pub(crate) config: SessionConfig,
    /// Engine profile.
    pub(crate) engine: Box<dyn Engine>,
    /// Asynchronous collaborators.
    pub(crate) services: Services,
    /// Open tabs.
    pub(crate) tabs: TabRegistry,
    /// Address bar of the active tab.
    pub(crate) address_bar: AddressBar,
    /// Load progress of the active tab.
    pub(crate) progress: ProgressIndicator,
    pub(crate) history: HistoryStore,
    pub(crate) bookmarks: BookmarkStore,
    pub(crate) notes: NoteStore,
    pub(crate) settings: SettingsStore,
    /// Dark mode and window theme.
    pub(crate) appearance: AppearanceManager,
    /// Ad block.
    pub(crate) content_filter: ContentFilter,
    /// Ephemeral credential encryption.
    pub(crate) vault: CredentialVault,
    pub(crate) sidebars: Sidebars,
    /// Weather label and news list.
    pub(crate) widgets: Widgets,
    pub(crate) page_source: Option<PageSource>,
    pub(crate) incognito: bool,
    pub(crate) fullscreen: bool,
    /// Notices not yet shown.
    pub(crate) notices: VecDeque<Notice>,
    /// Background work.
    pub(crate) tasks: TaskRunner,
    receiver: mpsc::UnboundedReceiver<ShellEvent>,
}

impl Session {
    /// Create a session with one tab loading the homepage.
    pub fn new(
        config: SessionConfig,
        mut engine: Box<dyn Engine>,
        services: Services,
        channel: EventChannel,
    ) -> ShellResult<Self> {
        config.validate()?;
        let vault = CredentialVault::new().map_err(|e| ShellError::crypto(e.to_string()))?;
        let (sender, receiver) = channel.into_parts();

        engine.set_user_agent(&config.general.user_agent);
        let incognito = config.general.incognito;
        if incognito {
            engine.set_cookie_policy(CookiePolicy::Ephemeral);
        }

        let homepage = config.general.homepage.clone();
        let mut tabs = TabRegistry::new(engine.as_mut(), &homepage, "Home");
        tabs.active_tab_mut().view_mut().load_url(&homepage)?;

        let mut content_filter = ContentFilter::new(Blocklist::new(&config.privacy.blocklist));
        if config.privacy.ad_block_on_start {
            content_filter.enable(engine.as_mut());
        }

        let mut address_bar = AddressBar::new();
        address_bar.set_text(&homepage);

        let settings = SettingsStore::new(homepage, config.summarizer.api_key.clone());

        tracing::info!(homepage = settings.homepage(), incognito, "session started");

        Ok(Self {
            config,
            engine,
            services,
            tabs,
            address_bar,
            progress: ProgressIndicator::default(),
            history: HistoryStore::new(),
            bookmarks: BookmarkStore::new(),
            notes: NoteStore::new(),
            settings,
            appearance: AppearanceManager::new(),
            content_filter,
            vault,
            sidebars: Sidebars::default(),
            widgets: Widgets::default(),
            page_source: None,
            incognito,
            fullscreen: false,
            notices: VecDeque::new(),
            tasks: TaskRunner::new(sender),
            receiver,
        })
    }

    /// Handle one event. Failures become error notices.
    pub fn dispatch(&mut self, event: impl Into<ShellEvent>) {
        match event.into() {
            ShellEvent::Engine { tab, event } => self.on_engine_event(tab, event),
            ShellEvent::Action(action) => self.on_action(action),
            ShellEvent::Task(outcome) => self.on_task_outcome(outcome),
        }
    }

    /// Wait for the next event posted to the channel and dispatch it.
    ///
    /// Returns false once the channel is closed. The session holds a
    /// sender itself, so in practice this waits until something arrives.
    pub async fn process_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// Dispatch every event already waiting in the channel.
    pub fn try_process_pending(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.dispatch(event);
            count += 1;
        }
        count
    }

    /// Cancel all background work. Later background actions fail with a
    /// state error.
    pub fn shutdown(&mut self) {
        if self.tasks.is_shut_down() {
            return;
        }
        self.tasks.shutdown();
        tracing::info!("session shut down");
    }

    fn on_engine_event(&mut self, tab: TabId, event: EngineEvent) {
        if !self.tabs.contains(tab) {
            tracing::debug!(%tab, ?event, "dropping event for closed tab");
            return;
        }

        let result = match event {
            EngineEvent::UrlChanged(url) => {
                self.on_url_changed(tab, url);
                Ok(())
            }
            EngineEvent::TitleChanged(title) => {
                self.on_title_changed(tab, title);
                Ok(())
            }
            EngineEvent::LoadProgress(progress) => {
                self.on_load_progress(tab, progress);
                Ok(())
            }
            EngineEvent::LoadFinished { ok } => self.on_load_finished(tab, ok),
            EngineEvent::PlainText { purpose, text } => self.on_plain_text(tab, purpose, text),
            EngineEvent::Html { purpose, html } => self.on_html(tab, purpose, html),
        };

        if let Err(err) = result {
            self.report("Error", err);
        }
    }

    pub(crate) fn on_action(&mut self, action: UserAction) {
        let name = action.name();
        tracing::debug!(action = name, "user action");
        if let Err(err) = self.perform(action) {
            self.report(name, err);
        }
    }

    fn perform(&mut self, action: UserAction) -> ShellResult<()> {
        match action {
            UserAction::NewTab => {
                let homepage = self.settings.homepage().to_string();
                self.open_tab(&homepage, "New Tab")?;
            }
            UserAction::OpenTab { url, title } => {
                self.open_tab(&url, &title)?;
            }
            UserAction::CloseTab(id) => self.close_tab(id)?,
            UserAction::CloseActiveTab => self.close_tab(self.tabs.active_id())?,
            UserAction::SwitchTab(id) => self.switch_tab(id)?,
            UserAction::Navigate(text)
            | UserAction::OpenBookmark(text)
            | UserAction::OpenHistoryEntry(text) => {
                self.navigate_to_url(&text)?;
            }
            UserAction::Back => self.go_back(),
            UserAction::Forward => self.go_forward(),
            UserAction::Refresh => self.refresh(),
            UserAction::ZoomIn => {
                self.tabs.active_tab_mut().zoom_in();
            }
            UserAction::ZoomOut => {
                self.tabs.active_tab_mut().zoom_out();
            }
            UserAction::FocusAddressBar => self.address_bar.focus(),
            UserAction::ToggleDarkMode => self.set_dark_mode(!self.appearance.dark_mode())?,
            UserAction::SetDarkMode(enabled) => self.set_dark_mode(enabled)?,
            UserAction::SetTheme { theme, color } => self.set_theme(theme, color.as_deref())?,
            UserAction::ToggleAdBlock => self.toggle_ad_block(),
            UserAction::ToggleIncognito => self.toggle_incognito(),
            UserAction::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            UserAction::SetUserAgent(user_agent) => self.set_user_agent(&user_agent)?,
            UserAction::AddBookmark => self.add_bookmark(),
            UserAction::SearchHistory(query) => self.search_history(&query)?,
            UserAction::ClearHistory => self.clear_history(),
            UserAction::AddNote(text) => self.add_note(&text)?,
            UserAction::SaveSettings(form) => self.save_settings(&form),
            UserAction::ReadAloud => self.read_aloud(),
            UserAction::Summarize => self.summarize()?,
            UserAction::StartVoiceCommand => self.start_voice_command()?,
            UserAction::VoicePhrase(phrase) => self.run_voice_command(&phrase),
            UserAction::UpscalePage => self.upscale_page()?,
            UserAction::SavePage(path) => self.save_page(path),
            UserAction::ViewSource => self.view_source(),
            UserAction::ToggleSidebar(sidebar) => {
                self.sidebars.toggle(sidebar);
            }
            UserAction::OpenChatbot => self.sidebars.show(Sidebar::Notes),
            UserAction::RunExtension(source) => self.run_extension(&source)?,
            UserAction::ShowNotice(message) => self.notify("Extension", message),
            UserAction::KeyPress(press) => {
                if let Some(shortcut) = KeyboardShortcut::from_key_press(press) {
                    return self.perform(shortcut.action());
                }
            }
            UserAction::RefreshWidgets => self.refresh_widgets()?,
        }
        Ok(())
    }

    /// Open a tab loading `url` and make it active.
    pub fn open_tab(&mut self, url: &str, title: &str) -> ShellResult<TabId> {
        let id = self.tabs.open(self.engine.as_mut(), url, title);
        tracing::info!(tab = %id, url, "tab opened");

        if let Some(tab) = self.tabs.get_mut(id) {
            tab.view_mut().load_url(url)?;
        }
        self.sync_active_tab()?;
        Ok(id)
    }

    /// Close a tab and cancel its background work. The last tab is kept.
    pub fn close_tab(&mut self, id: TabId) -> ShellResult<()> {
        match self.tabs.close(id)? {
            CloseOutcome::KeptLastTab => {
                tracing::debug!(tab = %id, "not closing the last tab");
            }
            CloseOutcome::Closed { activated } => {
                self.tasks.cancel_tab(id);
                if self.page_source.as_ref().is_some_and(|s| s.tab == id) {
                    self.page_source = None;
                }
                tracing::info!(tab = %id, "tab closed");
                if activated.is_some() {
                    self.sync_active_tab()?;
                }
            }
        }
        Ok(())
    }

    /// Make a tab active.
    pub fn switch_tab(&mut self, id: TabId) -> ShellResult<()> {
        self.tabs.set_active(id)?;
        self.sync_active_tab()
    }

    /// Point the foreground observers at the active tab.
    fn sync_active_tab(&mut self) -> ShellResult<()> {
        let tab = self.tabs.active_tab();
        let id = tab.id();
        self.address_bar.set_text(tab.url());
        if tab.is_loading() {
            self.progress.update(tab.progress());
        } else {
            self.progress.hide();
        }

        if tab.dark_mode_applied() != self.appearance.dark_mode() {
            self.apply_dark_mode(id)?;
        }
        Ok(())
    }

    /// Write the current dark-mode state into a tab's page.
    pub(crate) fn apply_dark_mode(&mut self, id: TabId) -> ShellResult<()> {
        let Some(tab) = self.tabs.get_mut(id) else {
            return Ok(());
        };
        self.appearance.apply(tab.view_mut())?;
        tab.set_dark_mode_applied(self.appearance.dark_mode());
        Ok(())
    }

    fn set_dark_mode(&mut self, enabled: bool) -> ShellResult<()> {
        let tab = self.tabs.active_tab_mut();
        self.appearance.set_dark_mode(enabled, tab.view_mut())?;
        tab.set_dark_mode_applied(enabled);
        Ok(())
    }

    fn set_theme(&mut self, theme: Theme, color: Option<&str>) -> ShellResult<()> {
        let tab = self.tabs.active_tab_mut();
        let changed = self.appearance.set_theme(theme, color, tab.view_mut())?;
        if !changed {
            tracing::debug!(?theme, "theme selection dismissed");
            return Ok(());
        }
        if theme == Theme::Dark {
            tab.set_dark_mode_applied(self.appearance.dark_mode());
        }
        tracing::info!(?theme, background = ?self.appearance.window_background(), "theme changed");
        Ok(())
    }

    fn toggle_ad_block(&mut self) {
        let message = if self.content_filter.toggle(self.engine.as_mut()) {
            "Ad Block enabled."
        } else {
            "Ad Block disabled."
        };
        self.notify("Ad Block", message);
    }

    fn toggle_incognito(&mut self) {
        self.incognito = !self.incognito;
        let (policy, message) = if self.incognito {
            (CookiePolicy::Ephemeral, "Incognito mode enabled.")
        } else {
            (CookiePolicy::Persistent, "Incognito mode disabled.")
        };
        self.engine.set_cookie_policy(policy);
        tracing::info!(incognito = self.incognito, "incognito mode");
        self.notify("Incognito Mode", message);
    }

    fn set_user_agent(&mut self, user_agent: &str) -> ShellResult<()> {
        let user_agent = user_agent.trim();
        if user_agent.is_empty() {
            return Err(ShellError::user_input("user agent must not be empty"));
        }
        self.engine.set_user_agent(user_agent);
        self.notify("User Agent", format!("User agent changed to: {user_agent}"));
        Ok(())
    }

    fn add_bookmark(&mut self) {
        let url = self.tabs.active_tab().url().to_string();
        match self.bookmarks.add(&url) {
            BookmarkOutcome::Added => self.notify("Bookmark Added", format!("Bookmark added: {url}")),
            BookmarkOutcome::AlreadyExists => {
                self.notify("Bookmark Exists", "This bookmark already exists.")
            }
        }
    }

    fn search_history(&mut self, query: &str) -> ShellResult<()> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ShellError::user_input("search text is empty"));
        }
        let matches = self.history.search(query);
        let message = if matches.is_empty() {
            format!("No history entries match \"{query}\".")
        } else {
            matches.join("\n")
        };
        self.notify("History", message);
        Ok(())
    }

    fn clear_history(&mut self) {
        self.history.clear();
        self.notify("History Cleared", "Browsing history has been cleared.");
    }

    fn add_note(&mut self, text: &str) -> ShellResult<()> {
        let url = self.tabs.active_tab().url().to_string();
        self.notes.add(&url, text)?;
        tracing::debug!(%url, "note added");
        Ok(())
    }

    fn save_settings(&mut self, form: &SettingsForm) {
        let changes = self.settings.save(form);
        tracing::info!(homepage = changes.homepage, api_key = changes.api_key, "settings saved");
    }

    fn run_extension(&mut self, source: &str) -> ShellResult<()> {
        let commands = extension::parse_script(source)?;
        tracing::info!(commands = commands.len(), "running extension");
        for command in commands {
            self.on_action(command.into_action());
        }
        Ok(())
    }

    /// Encrypt a credential with this session's key.
    pub fn encrypt_credential(&self, plaintext: &str) -> ShellResult<String> {
        self.vault
            .encrypt(plaintext)
            .map_err(|e| ShellError::crypto(e.to_string()))
    }

    /// Decrypt a credential encrypted by this session.
    pub fn decrypt_credential(&self, ciphertext: &str) -> ShellResult<String> {
        self.vault
            .decrypt(ciphertext)
            .map_err(|e| ShellError::crypto(e.to_string()))
    }

    /// Queue an info notice.
    pub(crate) fn notify(&mut self, title: &str, message: impl Into<String>) {
        self.notices.push_back(Notice::info(title, message));
    }

    /// Queue an error notice for a failed operation.
    pub(crate) fn report(&mut self, title: &str, err: ShellError) {
        tracing::warn!(operation = title, %err, "operation failed");
        self.notices.push_back(Notice::from_error(title, &err));
    }

    /// Take the notices queued since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Get the session-wide flags.
    pub fn flags(&self) -> SessionFlags {
        SessionFlags {
            dark_mode: self.appearance.dark_mode(),
            ad_block: self.content_filter.is_enabled(),
            incognito: self.incognito,
            fullscreen: self.fullscreen,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the tabs.
    pub fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    /// Get the address bar.
    pub fn address_bar(&self) -> &AddressBar {
        &self.address_bar
    }

    /// Get the progress indicator.
    pub fn progress(&self) -> &ProgressIndicator {
        &self.progress
    }

    /// Get the history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Get the bookmarks.
    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    /// Get the notes.
    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    /// Get the settings.
    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Get the appearance state.
    pub fn appearance(&self) -> &AppearanceManager {
        &self.appearance
    }

    /// Get the content filter.
    pub fn content_filter(&self) -> &ContentFilter {
        &self.content_filter
    }

    /// Get sidebar visibility.
    pub fn sidebars(&self) -> &Sidebars {
        &self.sidebars
    }

    /// Get the widgets.
    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    /// Get the last page source requested.
    pub fn page_source(&self) -> Option<&PageSource> {
        self.page_source.as_ref()
    }
}
