//! Navigation and load-state handling.
//!
//! Engine callbacks arrive for every tab, but only the active tab may touch
//! foreground state: the address bar, the progress indicator and history.
//! Background tabs only update their own [`Tab`](crate::tab::Tab).

use common::{ShellError, ShellResult};

use crate::session::Session;
use crate::tab::TabId;

/// Schemes that make address-bar input a URL rather than a search query.
const EXPLICIT_SCHEMES: &[&str] = &["http://", "https://"];

/// Turn address-bar input into a URL.
///
/// Input starting with `http://` or `https://` passes through unchanged.
/// Anything else replaces `%s` in the search `template`. The query is
/// substituted verbatim, without percent-encoding, so input containing `&`,
/// `#` or spaces yields a malformed search URL. This is a known defect.
pub fn resolve_input(text: &str, template: &str) -> ShellResult<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ShellError::user_input("nothing to navigate to"));
    }

    if EXPLICIT_SCHEMES.iter().any(|scheme| text.starts_with(scheme)) {
        Ok(text.to_string())
    } else {
        Ok(template.replace("%s", text))
    }
}

/// Load progress indicator of the active tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressIndicator {
    value: u8,
    visible: bool,
}

impl ProgressIndicator {
    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show `value`; hidden once it reaches 100.
    pub fn update(&mut self, value: u8) {
        self.value = value.min(100);
        self.visible = self.value < 100;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }
}

impl Session {
    /// Navigate the active tab to address-bar input. Returns the URL loaded.
    pub fn navigate_to_url(&mut self, text: &str) -> ShellResult<String> {
        let url = resolve_input(text, &self.config.search.template)?;
        let tab = self.tabs.active_tab_mut();
        tracing::info!(tab = %tab.id(), %url, "navigate");
        tab.view_mut().load_url(&url)?;
        Ok(url)
    }

    pub fn go_back(&mut self) {
        self.tabs.active_tab_mut().view_mut().go_back();
    }

    pub fn go_forward(&mut self) {
        self.tabs.active_tab_mut().view_mut().go_forward();
    }

    pub fn refresh(&mut self) {
        self.tabs.active_tab_mut().view_mut().reload();
    }

    pub(crate) fn on_url_changed(&mut self, id: TabId, url: String) {
        let active = self.tabs.is_active(id);
        let Some(tab) = self.tabs.get_mut(id) else {
            tracing::debug!(tab = %id, "url change for closed tab");
            return;
        };
        tab.set_url(&url);

        if !active {
            tracing::debug!(tab = %id, %url, "background tab url changed");
            return;
        }

        self.address_bar.set_text(&url);
        if self.history.add_visit(&url) {
            tracing::debug!(%url, "history entry added");
        }
    }

    pub(crate) fn on_title_changed(&mut self, id: TabId, title: String) {
        if let Some(tab) = self.tabs.get_mut(id) {
            tab.set_title(title);
        }
    }

    pub(crate) fn on_load_progress(&mut self, id: TabId, progress: i32) {
        let active = self.tabs.is_active(id);
        let Some(tab) = self.tabs.get_mut(id) else {
            return;
        };
        let value = tab.set_progress(progress);
        if active {
            self.progress.update(value);
        }
    }

    pub(crate) fn on_load_finished(&mut self, id: TabId, ok: bool) -> ShellResult<()> {
        let active = self.tabs.is_active(id);
        let Some(tab) = self.tabs.get_mut(id) else {
            return Ok(());
        };
        tab.on_load_finished();
        // A finished load is a fresh document without injected styles.
        tab.set_dark_mode_applied(false);
        if !ok {
            tracing::warn!(tab = %id, url = tab.url(), "page failed to load");
        }

        if !active {
            return Ok(());
        }

        self.progress.hide();
        if self.appearance.dark_mode() {
            self.apply_dark_mode(id)?;
        }
        Ok(())
    }
}
