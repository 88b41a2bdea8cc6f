//! Session configuration.

use browser_security::DEFAULT_AD_DOMAINS;
use common::{ShellError, ShellResult};
use serde::{Deserialize, Serialize};

/// Complete session configuration. Every section has defaults, so a partial
/// file only overrides what it names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub general: GeneralConfig,
    pub search: SearchConfig,
    pub privacy: PrivacyConfig,
    pub weather: WeatherConfig,
    pub news: NewsConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Start page and URL of new tabs.
    pub homepage: String,
    pub user_agent: String,
    /// Start in incognito mode.
    pub incognito: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            homepage: "https://www.google.com".to_string(),
            user_agent: "Octo Browse".to_string(),
            incognito: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search URL with a `%s` placeholder for the query.
    pub template: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            template: "https://www.google.com/search?q=%s".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    pub blocklist: Vec<String>,
    pub ad_block_on_start: bool,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            blocklist: DEFAULT_AD_DOMAINS.iter().map(|d| d.to_string()).collect(),
            ad_block_on_start: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub location: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.weatherapi.com/v1/current.json".to_string(),
            api_key: None,
            location: "London".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub country: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://newsapi.org/v2/top-headlines".to_string(),
            api_key: None,
            country: "us".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    /// Initial API key. The settings form may replace it at runtime.
    pub api_key: Option<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/completions".to_string(),
            model: "text-davinci-003".to_string(),
            max_tokens: 100,
            api_key: None,
        }
    }
}

impl SessionConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.general.user_agent = user_agent.into();
        self
    }

    pub fn with_ad_block(mut self, enabled: bool) -> Self {
        self.privacy.ad_block_on_start = enabled;
        self
    }

    pub fn with_incognito(mut self, enabled: bool) -> Self {
        self.general.incognito = enabled;
        self
    }

    /// Reject values a session cannot start with.
    pub fn validate(&self) -> ShellResult<()> {
        if self.general.homepage.trim().is_empty() {
            return Err(ShellError::config("general.homepage must not be empty"));
        }
        if self.general.user_agent.trim().is_empty() {
            return Err(ShellError::config("general.user_agent must not be empty"));
        }
        if !self.search.template.contains("%s") {
            return Err(ShellError::config(format!(
                "search.template has no %s placeholder: {}",
                self.search.template
            )));
        }
        Ok(())
    }
}
