//! Address bar component.

/// Address bar.
#[derive(Clone, Debug, Default)]
pub struct AddressBar {
    /// Displayed text.
    text: String,
    /// Is focused.
    focused: bool,
}

impl AddressBar {
    /// Create a new address bar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the displayed text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the displayed text.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Focus the address bar.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Check if focused.
    pub fn is_focused(&self) -> bool {
        self.focused
    }
}
