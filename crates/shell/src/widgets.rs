//! Weather and news widgets.

use serde_json::Value;
use url::Url;

use crate::config::{NewsConfig, WeatherConfig};

pub const WEATHER_LOADING: &str = "Weather: Loading...";
pub const WEATHER_UNAVAILABLE: &str = "Weather: Unavailable";
pub const NEWS_UNAVAILABLE: &str = "News: Unavailable";
const NO_TITLE: &str = "No Title";

/// Weather request URL. `None` without an API key or with a bad endpoint.
pub fn weather_url(config: &WeatherConfig) -> Option<String> {
    let key = config.api_key.as_deref().filter(|k| !k.is_empty())?;
    let url = Url::parse_with_params(&config.endpoint, &[("key", key), ("q", config.location.as_str())]);
    match url {
        Ok(url) => Some(url.into()),
        Err(err) => {
            tracing::warn!(endpoint = %config.endpoint, %err, "invalid weather endpoint");
            None
        }
    }
}

/// News request URL. `None` without an API key or with a bad endpoint.
pub fn news_url(config: &NewsConfig) -> Option<String> {
    let key = config.api_key.as_deref().filter(|k| !k.is_empty())?;
    let url = Url::parse_with_params(&config.endpoint, &[("country", config.country.as_str()), ("apiKey", key)]);
    match url {
        Ok(url) => Some(url.into()),
        Err(err) => {
            tracing::warn!(endpoint = %config.endpoint, %err, "invalid news endpoint");
            None
        }
    }
}

/// Weather label text for a response body.
pub fn parse_weather(body: &Value) -> String {
    match body.pointer("/current/condition/text").and_then(Value::as_str) {
        Some(condition) => format!("Weather: {condition}"),
        None => WEATHER_UNAVAILABLE.to_string(),
    }
}

/// News sidebar entries for a response body.
pub fn parse_news(body: &Value) -> Vec<String> {
    match body.get("articles").and_then(Value::as_array) {
        Some(articles) => articles
            .iter()
            .map(|article| {
                article
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or(NO_TITLE)
                    .to_string()
            })
            .collect(),
        None => vec![NEWS_UNAVAILABLE.to_string()],
    }
}

/// What the widgets currently show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Widgets {
    pub weather: String,
    pub news: Vec<String>,
}

impl Default for Widgets {
    fn default() -> Self {
        Self {
            weather: WEATHER_LOADING.to_string(),
            news: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_urls_require_key() {
        assert_eq!(weather_url(&WeatherConfig::default()), None);

        let weather = WeatherConfig {
            api_key: Some("w-key".into()),
            location: "New York".into(),
            ..WeatherConfig::default()
        };
        assert_eq!(
            weather_url(&weather).unwrap(),
            "https://api.weatherapi.com/v1/current.json?key=w-key&q=New+York"
        );

        let news = NewsConfig {
            api_key: Some("n-key".into()),
            ..NewsConfig::default()
        };
        assert_eq!(
            news_url(&news).unwrap(),
            "https://newsapi.org/v2/top-headlines?country=us&apiKey=n-key"
        );
    }

    #[test]
    fn test_bad_endpoint() {
        let news = NewsConfig {
            endpoint: "not a url".into(),
            api_key: Some("k".into()),
            ..NewsConfig::default()
        };
        assert_eq!(news_url(&news), None);
    }

    #[test]
    fn test_parse_weather() {
        let body = json!({ "current": { "condition": { "text": "Partly cloudy" } } });
        assert_eq!(parse_weather(&body), "Weather: Partly cloudy");
        assert_eq!(parse_weather(&json!({ "error": "bad key" })), WEATHER_UNAVAILABLE);
    }

    #[test]
    fn test_parse_news() {
        let body = json!({ "articles": [{ "title": "First" }, { "url": "x" }] });
        assert_eq!(parse_news(&body), vec!["First", "No Title"]);
        assert_eq!(parse_news(&json!({})), vec![NEWS_UNAVAILABLE]);
    }
}
