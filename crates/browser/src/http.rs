//! HTTP-backed collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{ShellError, ShellResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shell::config::SummarizerConfig;
use shell::services::Unavailable;
use shell::{JsonFetcher, Services, SessionConfig, Summarizer};

/// Request timeout of collaborator calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn network_error(err: reqwest::Error) -> ShellError {
    ShellError::network(err.to_string())
}

/// Build an HTTP client. `cookie_store` keeps cookies for the client's lifetime.
pub fn build_client(user_agent: &str, cookie_store: bool) -> ShellResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .cookie_store(cookie_store)
        .timeout(REQUEST_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
        .map_err(network_error)
}

/// JSON fetcher for the weather and news widgets.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> ShellResult<Value> {
        tracing::debug!(url, "fetching json");
        self.client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(network_error)?
            .json::<Value>()
            .await
            .map_err(network_error)
    }
}

#[derive(Serialize, Debug)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
struct CompletionChoice {
    text: String,
}

/// Summarizer calling a text-completion endpoint.
#[derive(Clone, Debug)]
pub struct HttpSummarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
}

impl HttpSummarizer {
    pub fn new(client: reqwest::Client, config: SummarizerConfig) -> Self {
        Self { client, config }
    }
}

/// Prompt sent for `text`.
pub fn summary_prompt(text: &str) -> String {
    format!("Summarize the following text:\n\n{text}")
}

/// First completion of a response, trimmed.
fn first_completion(response: CompletionResponse) -> ShellResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.text.trim().to_string())
        .ok_or_else(|| ShellError::network("summarization returned no choices"))
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, text: &str, api_key: &str) -> ShellResult<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt: summary_prompt(text),
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShellError::network(format!("summarization failed ({status}): {body}")));
        }

        first_completion(response.json().await.map_err(network_error)?)
    }
}

/// Collaborators for a session. Speech input and output have no backend in
/// the terminal front-end.
pub fn services(config: &SessionConfig) -> ShellResult<Services> {
    let client = build_client(&config.general.user_agent, false)?;
    let unavailable = Arc::new(Unavailable);

    Ok(Services {
        speech: unavailable.clone(),
        tts: unavailable,
        summarizer: Arc::new(HttpSummarizer::new(client.clone(), config.summarizer.clone())),
        fetcher: Arc::new(HttpFetcher::new(client)),
    })
}
