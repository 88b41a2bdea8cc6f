//! Toggleable request filter backed by a domain blocklist.

use std::sync::Arc;

use browser_security::{Blocklist, RequestFilter};

use crate::engine::Engine;

/// Ad-block state. The filter hook is installed on the engine profile at
/// most once at any time.
#[derive(Clone, Debug)]
pub struct ContentFilter {
    blocklist: Arc<Blocklist>,
    enabled: bool,
}

impl ContentFilter {
    pub fn new(blocklist: Blocklist) -> Self {
        Self {
            blocklist: Arc::new(blocklist),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    /// Install the hook. No-op if already enabled.
    pub fn enable(&mut self, engine: &mut dyn Engine) {
        if self.enabled {
            return;
        }
        let filter: Arc<dyn RequestFilter> = self.blocklist.clone();
        engine.set_request_filter(Some(filter));
        self.enabled = true;
        tracing::info!(domains = self.blocklist.len(), "ad block enabled");
    }

    /// Remove the hook. No-op if already disabled.
    pub fn disable(&mut self, engine: &mut dyn Engine) {
        if !self.enabled {
            return;
        }
        engine.set_request_filter(None);
        self.enabled = false;
        tracing::info!("ad block disabled");
    }

    /// Flip the state. Returns the new state.
    pub fn toggle(&mut self, engine: &mut dyn Engine) -> bool {
        if self.enabled {
            self.disable(engine);
        } else {
            self.enable(engine);
        }
        self.enabled
    }

    /// Check a request URL against the blocklist, regardless of state.
    pub fn should_block(&self, url: &str) -> bool {
        self.blocklist.should_block(url)
    }
}
