//! Browser tabs and the tab registry.

use std::fmt;

use common::{ShellError, ShellResult};

use crate::engine::{Engine, EngineView};

/// Zoom step applied by zoom in/out.
pub const ZOOM_STEP: f64 = 0.1;
/// Minimum zoom factor.
pub const MIN_ZOOM: f64 = 0.25;
/// Maximum zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

/// Tab identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Browser tab.
pub struct Tab {
    /// Tab ID.
    id: TabId,
    /// Engine view rendering this tab.
    view: Box<dyn EngineView>,
    /// Current URL.
    url: String,
    /// Page title.
    title: String,
    /// Load progress (0 - 100).
    progress: u8,
    /// Loading state.
    loading: bool,
    /// Zoom factor.
    zoom: f64,
    /// Dark-mode state last written into the current document.
    dark_mode_applied: bool,
}

impl Tab {
    /// Create a new tab.
    pub fn new(id: TabId, view: Box<dyn EngineView>, url: &str, title: &str) -> Self {
        Self {
            id,
            view,
            url: url.to_string(),
            title: title.to_string(),
            progress: 0,
            loading: false,
            zoom: 1.0,
            dark_mode_applied: false,
        }
    }

    /// Get the tab ID.
    pub fn id(&self) -> TabId {
        self.id
    }

    /// Get the current URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Set the current URL.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    /// Get the page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Set the page title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Get load progress.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Set load progress, clamped to 0 - 100.
    pub fn set_progress(&mut self, progress: i32) -> u8 {
        self.progress = progress.clamp(0, 100) as u8;
        self.loading = self.progress < 100;
        self.progress
    }

    /// Check if loading.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Called when the engine reports the load finished.
    pub fn on_load_finished(&mut self) {
        self.loading = false;
        self.progress = 100;
    }

    /// Get the zoom factor.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor and push it to the engine view.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.view.set_zoom(self.zoom);
        self.zoom
    }

    /// Zoom in.
    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    /// Zoom out.
    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    /// Dark-mode state last written into the current document.
    pub fn dark_mode_applied(&self) -> bool {
        self.dark_mode_applied
    }

    pub fn set_dark_mode_applied(&mut self, applied: bool) {
        self.dark_mode_applied = applied;
    }

    /// Get the engine view.
    pub fn view(&self) -> &dyn EngineView {
        self.view.as_ref()
    }

    /// Get the engine view mutably.
    pub fn view_mut(&mut self) -> &mut dyn EngineView {
        self.view.as_mut()
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("title", &self.title)
            .field("progress", &self.progress)
            .field("zoom", &self.zoom)
            .finish_non_exhaustive()
    }
}

/// Result of a close request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The tab was removed. `activated` is the tab that became active, if
    /// the closed tab was the active one.
    Closed { activated: Option<TabId> },
    /// The tab was the last one and was kept.
    KeptLastTab,
}

/// Ordered collection of tabs. Always holds at least one tab, and the
/// active tab always refers to a tab in the registry.
pub struct TabRegistry {
    tabs: Vec<Tab>,
    active: TabId,
    tab_counter: u64,
}

impl TabRegistry {
    /// Create a registry holding one initial, active tab.
    pub fn new(engine: &mut dyn Engine, url: &str, title: &str) -> Self {
        let id = TabId(1);
        let view = engine.create_view(id);
        Self {
            tabs: vec![Tab::new(id, view, url, title)],
            active: id,
            tab_counter: 1,
        }
    }

    /// Append a new tab and make it active.
    pub fn open(&mut self, engine: &mut dyn Engine, url: &str, title: &str) -> TabId {
        self.tab_counter += 1;
        let id = TabId(self.tab_counter);
        let view = engine.create_view(id);

        self.tabs.push(Tab::new(id, view, url, title));
        self.active = id;
        id
    }

    /// Close a tab. Closing the last remaining tab is a no-op.
    pub fn close(&mut self, id: TabId) -> ShellResult<CloseOutcome> {
        let index = self.index_of(id)?;
        if self.tabs.len() == 1 {
            return Ok(CloseOutcome::KeptLastTab);
        }

        self.tabs.remove(index);

        let activated = if self.active == id {
            // Prefer the tab that slid into the closed slot, else its left neighbour.
            let next = self.tabs[index.min(self.tabs.len() - 1)].id;
            self.active = next;
            Some(next)
        } else {
            None
        };

        Ok(CloseOutcome::Closed { activated })
    }

    /// Set the active tab.
    pub fn set_active(&mut self, id: TabId) -> ShellResult<()> {
        self.index_of(id)?;
        self.active = id;
        Ok(())
    }

    /// Get the active tab.
    pub fn active_tab(&self) -> &Tab {
        self.tabs
            .iter()
            .find(|t| t.id == self.active)
            .unwrap_or(&self.tabs[0])
    }

    /// Get the active tab mutably.
    pub fn active_tab_mut(&mut self) -> &mut Tab {
        let index = self
            .tabs
            .iter()
            .position(|t| t.id == self.active)
            .unwrap_or(0);
        &mut self.tabs[index]
    }

    /// Get the active tab ID.
    pub fn active_id(&self) -> TabId {
        self.active
    }

    /// Check if a tab is the active one.
    pub fn is_active(&self, id: TabId) -> bool {
        self.active == id
    }

    /// Get a tab.
    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Get a mutable tab.
    pub fn get_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    /// Check if a tab exists.
    pub fn contains(&self, id: TabId) -> bool {
        self.get(id).is_some()
    }

    /// Get all tabs in display order.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    /// Get the tab count.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    fn index_of(&self, id: TabId) -> ShellResult<usize> {
        self.tabs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ShellError::state(format!("no such tab: {id}")))
    }
}
