//! Recording fakes for the engine and the async collaborators.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use browser_security::RequestFilter;
use common::{ShellError, ShellResult};
use image::{Rgba, RgbaImage};
use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use tokio::sync::Notify;

use crate::config::SessionConfig;
use crate::engine::{CookiePolicy, Engine, EngineView, HtmlPurpose, PageScript, TextPurpose};
use crate::services::{
    Audio, JsonFetcher, Services, SpeechError, SpeechRecognizer, SpeechSynthesizer, Summarizer,
};
use crate::session::Session;
use crate::tab::TabId;
use crate::tasks::EventChannel;

/// Everything one fake view was asked to do.
#[derive(Debug, Default)]
pub struct ViewLog {
    pub loads: Vec<String>,
    pub reloads: usize,
    pub backs: usize,
    pub forwards: usize,
    pub zoom: Option<f64>,
    /// Style elements of the current document, by element id.
    pub styles: BTreeMap<String, String>,
    /// Number of style nodes per element id in the current document.
    pub style_nodes: BTreeMap<String, usize>,
    pub scripts: usize,
    pub text_requests: Vec<TextPurpose>,
    pub html_requests: Vec<HtmlPurpose>,
}

/// Everything the fake engine was asked to do.
#[derive(Default)]
pub struct EngineLog {
    pub views: BTreeMap<TabId, ViewLog>,
    pub filter: Option<Arc<dyn RequestFilter>>,
    pub filter_installs: usize,
    pub filter_removals: usize,
    pub user_agent: Option<String>,
    pub cookie_policy: Option<CookiePolicy>,
    pub fail_scripts: bool,
    pub fail_capture: bool,
    pub capture: Option<RgbaImage>,
}

impl EngineLog {
    pub fn filter_installed(&self) -> bool {
        self.filter.is_some()
    }

    /// Whether the installed hook blocks `url`. False with no hook.
    pub fn blocks(&self, url: &str) -> bool {
        self.filter.as_ref().is_some_and(|f| f.should_block(url))
    }

    pub fn view(&self, tab: TabId) -> &ViewLog {
        &self.views[&tab]
    }
}

/// Fake engine profile. Clones share one log.
#[derive(Clone, Default)]
pub struct FakeEngine {
    log: Arc<Mutex<EngineLog>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> MutexGuard<'_, EngineLog> {
        self.log.lock()
    }

    /// A view recording into this engine's log.
    pub fn view(&self, tab: TabId) -> FakeView {
        self.log.lock().views.entry(tab).or_default();
        FakeView {
            tab,
            log: self.log.clone(),
        }
    }

    pub fn style(&self, tab: TabId, element_id: &str) -> Option<String> {
        self.log.lock().views.get(&tab)?.styles.get(element_id).cloned()
    }

    pub fn style_node_count(&self, tab: TabId, element_id: &str) -> usize {
        self.log
            .lock()
            .views
            .get(&tab)
            .and_then(|v| v.style_nodes.get(element_id).copied())
            .unwrap_or(0)
    }

    pub fn loads(&self, tab: TabId) -> Vec<String> {
        self.log.lock().views.get(&tab).map(|v| v.loads.clone()).unwrap_or_default()
    }
}

impl Engine for FakeEngine {
    fn create_view(&mut self, tab: TabId) -> Box<dyn EngineView> {
        Box::new(self.view(tab))
    }

    fn set_user_agent(&mut self, user_agent: &str) {
        self.log.lock().user_agent = Some(user_agent.to_string());
    }

    fn set_request_filter(&mut self, filter: Option<Arc<dyn RequestFilter>>) {
        let mut log = self.log.lock();
        match filter {
            Some(_) => log.filter_installs += 1,
            None => log.filter_removals += 1,
        }
        log.filter = filter;
    }

    fn set_cookie_policy(&mut self, policy: CookiePolicy) {
        self.log.lock().cookie_policy = Some(policy);
    }
}

/// Fake view of one tab.
pub struct FakeView {
    tab: TabId,
    log: Arc<Mutex<EngineLog>>,
}

impl FakeView {
    fn with<R>(&self, f: impl FnOnce(&mut ViewLog) -> R) -> R {
        let mut log = self.log.lock();
        f(log.views.entry(self.tab).or_default())
    }
}

impl EngineView for FakeView {
    fn load_url(&mut self, url: &str) -> ShellResult<()> {
        self.with(|v| {
            v.loads.push(url.to_string());
            // New document, no injected styles.
            v.styles.clear();
            v.style_nodes.clear();
        });
        Ok(())
    }

    fn reload(&mut self) {
        self.with(|v| v.reloads += 1);
    }

    fn go_back(&mut self) {
        self.with(|v| v.backs += 1);
    }

    fn go_forward(&mut self) {
        self.with(|v| v.forwards += 1);
    }

    fn set_zoom(&mut self, factor: f64) {
        self.with(|v| v.zoom = Some(factor));
    }

    fn run_script(&mut self, script: &PageScript) -> ShellResult<()> {
        if self.log.lock().fail_scripts {
            return Err(ShellError::engine("script execution failed"));
        }
        self.with(|v| {
            v.scripts += 1;
            match script {
                PageScript::UpsertStyle { element_id, css } => {
                    v.style_nodes.entry(element_id.clone()).or_insert(1);
                    v.styles.insert(element_id.clone(), css.clone());
                }
            }
        });
        Ok(())
    }

    fn extract_plain_text(&mut self, purpose: TextPurpose) {
        self.with(|v| v.text_requests.push(purpose));
    }

    fn extract_html(&mut self, purpose: HtmlPurpose) {
        self.with(|v| v.html_requests.push(purpose));
    }

    fn capture_image(&mut self) -> ShellResult<RgbaImage> {
        let log = self.log.lock();
        if log.fail_capture {
            return Err(ShellError::engine("capture failed"));
        }
        Ok(log
            .capture
            .clone()
            .unwrap_or_else(|| RgbaImage::from_pixel(2, 3, Rgba([200, 10, 10, 255]))))
    }
}

/// Speech recognizer replaying queued results. Empty queue means no match.
#[derive(Default)]
pub struct ScriptedSpeech {
    results: Mutex<VecDeque<Result<String, SpeechError>>>,
}

impl ScriptedSpeech {
    pub fn push(&self, result: Result<String, SpeechError>) {
        self.results.lock().push_back(result);
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedSpeech {
    async fn capture_utterance(&self) -> Result<String, SpeechError> {
        self.results.lock().pop_front().unwrap_or(Err(SpeechError::NoMatch))
    }
}

/// Text-to-speech recording what it spoke.
#[derive(Default)]
pub struct RecordingTts {
    pub synthesized: Mutex<Vec<String>>,
    pub played: Mutex<usize>,
}

#[async_trait]
impl SpeechSynthesizer for RecordingTts {
    async fn synthesize(&self, text: &str) -> ShellResult<Audio> {
        self.synthesized.lock().push(text.to_string());
        Ok(Audio {
            mime_type: "audio/mpeg".to_string(),
            bytes: text.as_bytes().to_vec(),
        })
    }

    async fn play(&self, _audio: Audio) -> ShellResult<()> {
        *self.played.lock() += 1;
        Ok(())
    }
}

/// Summarizer with a canned reply. A gated summarizer never answers.
#[derive(Default)]
pub struct FakeSummarizer {
    reply: Mutex<Option<Result<String, String>>>,
    gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeSummarizer {
    pub fn replying(reply: Result<String, String>) -> Self {
        Self {
            reply: Mutex::new(Some(reply)),
            ..Self::default()
        }
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Notify::new())),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, text: &str, api_key: &str) -> ShellResult<String> {
        self.calls.lock().push((text.to_string(), api_key.to_string()));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let reply = self.reply.lock().clone();
        match reply {
            Some(Ok(summary)) => Ok(summary),
            Some(Err(message)) => Err(ShellError::network(message)),
            None => Ok(format!("summary of {} chars", text.len())),
        }
    }
}

/// JSON fetcher answering by URL prefix. A held fetcher never answers.
#[derive(Default)]
pub struct MapFetcher {
    responses: Mutex<HashMap<String, Value>>,
    held: Mutex<bool>,
    pub requests: Mutex<Vec<String>>,
}

impl MapFetcher {
    pub fn respond(&self, url_prefix: &str, body: Value) {
        self.responses.lock().insert(url_prefix.to_string(), body);
    }

    pub fn hold(&self) {
        *self.held.lock() = true;
    }
}

#[async_trait]
impl JsonFetcher for MapFetcher {
    async fn fetch_json(&self, url: &str) -> ShellResult<Value> {
        self.requests.lock().push(url.to_string());
        let held = *self.held.lock();
        if held {
            std::future::pending::<()>().await;
        }
        self.responses
            .lock()
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| ShellError::network(format!("no route to {url}")))
    }
}

/// The set of fake collaborators behind one session.
#[derive(Clone)]
pub struct FakeServices {
    pub speech: Arc<ScriptedSpeech>,
    pub tts: Arc<RecordingTts>,
    pub summarizer: Arc<FakeSummarizer>,
    pub fetcher: Arc<MapFetcher>,
}

impl FakeServices {
    pub fn new() -> Self {
        Self::with_summarizer(FakeSummarizer::default())
    }

    pub fn with_summarizer(summarizer: FakeSummarizer) -> Self {
        Self {
            speech: Arc::new(ScriptedSpeech::default()),
            tts: Arc::new(RecordingTts::default()),
            summarizer: Arc::new(summarizer),
            fetcher: Arc::new(MapFetcher::default()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            speech: self.speech.clone(),
            tts: self.tts.clone(),
            summarizer: self.summarizer.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

/// Default configuration with the homepage `https://home.test`.
pub fn config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.general.homepage = "https://home.test".to_string();
    config
}

/// Session over fakes, built from [`config`].
pub fn session() -> (Session, FakeEngine, FakeServices) {
    session_with(config(), FakeServices::new())
}

pub fn session_with(config: SessionConfig, services: FakeServices) -> (Session, FakeEngine, FakeServices) {
    let engine = FakeEngine::new();
    let session = Session::new(
        config,
        Box::new(engine.clone()),
        services.services(),
        EventChannel::new(),
    )
    .expect("session");
    (session, engine, services)
}
