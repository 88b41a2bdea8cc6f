//! User settings.

/// Values submitted from the settings form. Empty fields mean "unchanged".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub homepage: String,
    pub api_key: String,
}

/// Which fields a save actually changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettingsChanges {
    pub homepage: bool,
    pub api_key: bool,
}

/// Homepage URL and summarization API key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsStore {
    homepage: String,
    api_key: Option<String>,
}

impl SettingsStore {
    pub fn new(homepage: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            homepage: homepage.into(),
            api_key,
        }
    }

    pub fn homepage(&self) -> &str {
        &self.homepage
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Apply the non-empty fields of `form`. An empty field never clears a value.
    pub fn save(&mut self, form: &SettingsForm) -> SettingsChanges {
        let mut changes = SettingsChanges::default();

        if !form.homepage.is_empty() {
            self.homepage = form.homepage.clone();
            changes.homepage = true;
        }
        if !form.api_key.is_empty() {
            self.api_key = Some(form.api_key.clone());
            changes.api_key = true;
        }

        changes
    }
}
