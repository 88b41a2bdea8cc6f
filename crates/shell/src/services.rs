//! Asynchronous collaborators: speech, text-to-speech, summarization and
//! JSON fetches.
//!
//! All of these may block on audio or network I/O, so the session only ever
//! calls them from background tasks and receives their results as
//! [`TaskOutcome`](crate::events::TaskOutcome) events.

use std::sync::Arc;

use async_trait::async_trait;
use common::{ShellError, ShellResult};
use serde_json::Value;
use thiserror::Error;

/// Speech capture failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    #[error("could not understand audio")]
    NoMatch,

    #[error("speech recognition service failed: {0}")]
    ServiceUnavailable(String),
}

/// Synthesized audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Audio {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Capture one utterance and return the recognized text.
    async fn capture_utterance(&self) -> Result<String, SpeechError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> ShellResult<Audio>;

    async fn play(&self, audio: Audio) -> ShellResult<()>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize `text`. May fail with an auth or quota error.
    async fn summarize(&self, text: &str, api_key: &str) -> ShellResult<String>;
}

#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> ShellResult<Value>;
}

/// The set of asynchronous collaborators a session uses.
#[derive(Clone)]
pub struct Services {
    pub speech: Arc<dyn SpeechRecognizer>,
    pub tts: Arc<dyn SpeechSynthesizer>,
    pub summarizer: Arc<dyn Summarizer>,
    pub fetcher: Arc<dyn JsonFetcher>,
}

impl Services {
    /// Services that fail every call. Used where no backend is configured.
    pub fn unavailable() -> Self {
        let unavailable = Arc::new(Unavailable);
        Self {
            speech: unavailable.clone(),
            tts: unavailable.clone(),
            summarizer: unavailable.clone(),
            fetcher: unavailable,
        }
    }
}

/// Collaborator with no backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unavailable;

#[async_trait]
impl SpeechRecognizer for Unavailable {
    async fn capture_utterance(&self) -> Result<String, SpeechError> {
        Err(SpeechError::ServiceUnavailable("no speech backend configured".into()))
    }
}

#[async_trait]
impl SpeechSynthesizer for Unavailable {
    async fn synthesize(&self, _text: &str) -> ShellResult<Audio> {
        Err(ShellError::network("no text-to-speech backend configured"))
    }

    async fn play(&self, _audio: Audio) -> ShellResult<()> {
        Err(ShellError::network("no audio output configured"))
    }
}

#[async_trait]
impl Summarizer for Unavailable {
    async fn summarize(&self, _text: &str, _api_key: &str) -> ShellResult<String> {
        Err(ShellError::network("no summarization backend configured"))
    }
}

#[async_trait]
impl JsonFetcher for Unavailable {
    async fn fetch_json(&self, url: &str) -> ShellResult<Value> {
        Err(ShellError::network(format!("no fetch backend configured for {url}")))
    }
}
