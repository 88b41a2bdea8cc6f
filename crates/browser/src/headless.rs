//! Headless engine.
//!
//! Fetches pages over HTTP (or from `file://` URLs) without rendering them,
//! and reports loads back to the session as engine events. Page scripts are
//! recorded rather than executed, and captures are blank canvases of the
//! viewport size.

use std::collections::BTreeMap;
use std::sync::Arc;

use browser_security::RequestFilter;
use common::{ShellError, ShellResult};
use image::{Rgba, RgbaImage};
use parking_lot::RwLock;
use shell::engine::{CookiePolicy, Engine, EngineView, HtmlPurpose, PageScript, TextPurpose};
use shell::{EngineEvent, ShellEvent, TabId};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::http::build_client;
use crate::page::{page_title, plain_text};

/// Capture size.
pub const VIEWPORT: (u32, u32) = (1280, 720);

/// State shared by every view of the profile.
struct Profile {
    client: reqwest::Client,
    user_agent: String,
    cookie_policy: CookiePolicy,
    filter: Option<Arc<dyn RequestFilter>>,
}

impl Profile {
    fn rebuild_client(&mut self) -> ShellResult<()> {
        let persistent = self.cookie_policy == CookiePolicy::Persistent;
        self.client = build_client(&self.user_agent, persistent)?;
        Ok(())
    }
}

/// Headless engine profile.
pub struct HeadlessEngine {
    profile: Arc<RwLock<Profile>>,
    events: UnboundedSender<ShellEvent>,
}

impl HeadlessEngine {
    pub fn new(events: UnboundedSender<ShellEvent>, user_agent: &str) -> ShellResult<Self> {
        let profile = Profile {
            client: build_client(user_agent, true)?,
            user_agent: user_agent.to_string(),
            cookie_policy: CookiePolicy::Persistent,
            filter: None,
        };

        Ok(Self {
            profile: Arc::new(RwLock::new(profile)),
            events,
        })
    }

    fn update(&mut self, f: impl FnOnce(&mut Profile)) {
        let mut profile = self.profile.write();
        f(&mut profile);
        if let Err(err) = profile.rebuild_client() {
            tracing::warn!(%err, "keeping previous http client");
        }
    }
}

impl Engine for HeadlessEngine {
    fn create_view(&mut self, tab: TabId) -> Box<dyn EngineView> {
        Box::new(HeadlessView {
            tab,
            profile: self.profile.clone(),
            events: self.events.clone(),
            history: Vec::new(),
            index: 0,
            document: Arc::new(RwLock::new(String::new())),
            load: CancellationToken::new(),
            styles: BTreeMap::new(),
        })
    }

    fn set_user_agent(&mut self, user_agent: &str) {
        self.update(|p| p.user_agent = user_agent.to_string());
    }

    fn set_request_filter(&mut self, filter: Option<Arc<dyn RequestFilter>>) {
        self.profile.write().filter = filter;
    }

    fn set_cookie_policy(&mut self, policy: CookiePolicy) {
        // Rebuilding the client drops the cookie jar either way.
        self.update(|p| p.cookie_policy = policy);
    }
}

/// View of one tab.
pub struct HeadlessView {
    tab: TabId,
    profile: Arc<RwLock<Profile>>,
    events: UnboundedSender<ShellEvent>,
    /// Session history of this view.
    history: Vec<String>,
    index: usize,
    /// HTML of the last loaded document.
    document: Arc<RwLock<String>>,
    /// Cancels the load in flight. A new load replaces it.
    load: CancellationToken,
    /// Injected style elements by id.
    styles: BTreeMap<String, String>,
}

impl HeadlessView {
    fn post(&self, event: EngineEvent) {
        let event = ShellEvent::Engine { tab: self.tab, event };
        if self.events.send(event).is_err() {
            tracing::debug!(tab = %self.tab, "session gone, dropping engine event");
        }
    }

    /// Start loading `url` in the background, superseding any load in flight.
    fn start_load(&mut self, url: &str) -> ShellResult<()> {
        let handle = Handle::try_current()
            .map_err(|_| ShellError::engine("headless engine requires a tokio runtime"))?;
        let url = Url::parse(url).map_err(|e| ShellError::user_input(format!("{url}: {e}")))?;

        {
            // A load that already holds the document finishes reporting first.
            let mut document = self.document.write();
            self.load.cancel();
            document.clear();
        }
        self.load = CancellationToken::new();
        self.styles.clear();

        let (client, blocked) = {
            let profile = self.profile.read();
            let blocked = profile.filter.as_ref().is_some_and(|f| f.should_block(url.as_str()));
            (profile.client.clone(), blocked)
        };

        self.post(EngineEvent::UrlChanged(url.to_string()));
        if blocked {
            tracing::info!(tab = %self.tab, %url, "request blocked");
            self.post(EngineEvent::LoadFinished { ok: false });
            return Ok(());
        }
        self.post(EngineEvent::LoadProgress(10));

        let tab = self.tab;
        let events = self.events.clone();
        let document = self.document.clone();
        let token = self.load.clone();
        handle.spawn(async move {
            let fetched = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(%tab, %url, "load superseded");
                    return;
                }
                fetched = fetch_document(&client, &url) => fetched,
            };

            let mut document = document.write();
            if token.is_cancelled() {
                tracing::debug!(%tab, %url, "load superseded");
                return;
            }
            let send = |event: EngineEvent| {
                let _ = events.send(ShellEvent::Engine { tab, event });
            };
            let ok = match fetched {
                Ok(html) => {
                    send(EngineEvent::LoadProgress(70));
                    send(EngineEvent::TitleChanged(page_title(&html, &url)));
                    *document = html;
                    true
                }
                Err(err) => {
                    tracing::warn!(%tab, %url, %err, "load failed");
                    false
                }
            };
            send(EngineEvent::LoadProgress(100));
            send(EngineEvent::LoadFinished { ok });
        });
        Ok(())
    }

    /// Style elements injected into the current document.
    pub fn styles(&self) -> &BTreeMap<String, String> {
        &self.styles
    }
}

impl EngineView for HeadlessView {
    fn load_url(&mut self, url: &str) -> ShellResult<()> {
        self.start_load(url)?;
        if !self.history.is_empty() {
            self.history.truncate(self.index + 1);
        }
        self.history.push(url.to_string());
        self.index = self.history.len() - 1;
        Ok(())
    }

    fn reload(&mut self) {
        if let Some(url) = self.history.get(self.index).cloned() {
            if let Err(err) = self.start_load(&url) {
                tracing::warn!(%err, "reload failed");
            }
        }
    }

    fn go_back(&mut self) {
        if self.index > 0 {
            self.index -= 1;
            self.reload();
        }
    }

    fn go_forward(&mut self) {
        if self.index + 1 < self.history.len() {
            self.index += 1;
            self.reload();
        }
    }

    fn set_zoom(&mut self, factor: f64) {
        tracing::debug!(tab = %self.tab, factor, "zoom");
    }

    fn run_script(&mut self, script: &PageScript) -> ShellResult<()> {
        tracing::trace!(tab = %self.tab, script = %script.to_javascript(), "page script");
        match script {
            PageScript::UpsertStyle { element_id, css } => {
                self.styles.insert(element_id.clone(), css.clone());
            }
        }
        Ok(())
    }

    fn extract_plain_text(&mut self, purpose: TextPurpose) {
        let text = plain_text(&self.document.read());
        self.post(EngineEvent::PlainText { purpose, text });
    }

    fn extract_html(&mut self, purpose: HtmlPurpose) {
        let html = self.document.read().clone();
        self.post(EngineEvent::Html { purpose, html });
    }

    fn capture_image(&mut self) -> ShellResult<RgbaImage> {
        let background = if self.styles.values().any(|css| !css.is_empty()) {
            Rgba([0x12, 0x12, 0x12, 0xff])
        } else {
            Rgba([0xff, 0xff, 0xff, 0xff])
        };
        Ok(RgbaImage::from_pixel(VIEWPORT.0, VIEWPORT.1, background))
    }
}

/// Fetch a document body as text.
async fn fetch_document(client: &reqwest::Client, url: &Url) -> ShellResult<String> {
    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| ShellError::user_input(format!("bad file url: {url}")))?;
            let bytes = tokio::fs::read(&path).await?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        "http" | "https" => client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ShellError::network(e.to_string()))?
            .text()
            .await
            .map_err(|e| ShellError::network(e.to_string())),
        other => Err(ShellError::user_input(format!("unsupported scheme: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use browser_security::{Blocklist, DEFAULT_AD_DOMAINS};
    use tokio::sync::mpsc;

    fn engine() -> (HeadlessEngine, mpsc::UnboundedReceiver<ShellEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (HeadlessEngine::new(sender, "Octo Browse").unwrap(), receiver)
    }

    async fn next_event(receiver: &mut mpsc::UnboundedReceiver<ShellEvent>) -> EngineEvent {
        let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            ShellEvent::Engine { event, .. } => event,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_load_reports_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<title>Local</title><p>Body text</p>").unwrap();
        let url = Url::from_file_path(&path).unwrap().to_string();
        let (mut engine, mut receiver) = engine();
        let mut view = engine.create_view(TabId(1));

        view.load_url(&url).unwrap();

        assert!(matches!(next_event(&mut receiver).await, EngineEvent::UrlChanged(ref u) if *u == url));
        assert!(matches!(next_event(&mut receiver).await, EngineEvent::LoadProgress(10)));
        assert!(matches!(next_event(&mut receiver).await, EngineEvent::LoadProgress(70)));
        assert!(matches!(next_event(&mut receiver).await, EngineEvent::TitleChanged(ref t) if t == "Local"));
        assert!(matches!(next_event(&mut receiver).await, EngineEvent::LoadProgress(100)));
        assert!(matches!(next_event(&mut receiver).await, EngineEvent::LoadFinished { ok: true }));

        view.extract_plain_text(TextPurpose::Summarize);
        match next_event(&mut receiver).await {
            EngineEvent::PlainText { purpose, text } => {
                assert_eq!(purpose, TextPurpose::Summarize);
                assert_eq!(text, "Local Body text");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_new_load_supersedes_slow_load() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let slow_url = format!("http://{}/slow", listener.local_addr().unwrap());
        let (accepted_tx, accepted_rx) = tokio::sync::oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let _ = accepted_tx.send(());
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            tokio::time::sleep(Duration::from_millis(300)).await;
            let body = "<title>SLOW OLD PAGE</title>old body";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.html");
        std::fs::write(&path, "<title>NEW PAGE</title><p>new body</p>").unwrap();
        let file_url = Url::from_file_path(&path).unwrap().to_string();
        let (mut engine, mut receiver) = engine();
        let mut view = engine.create_view(TabId(1));

        view.load_url(&slow_url).unwrap();
        tokio::time::timeout(Duration::from_secs(5), accepted_rx)
            .await
            .unwrap()
            .unwrap();
        view.load_url(&file_url).unwrap();

        let mut titles = Vec::new();
        let mut finished = Vec::new();
        let mut seen_new_url = false;
        loop {
            match next_event(&mut receiver).await {
                EngineEvent::UrlChanged(url) => seen_new_url |= url == file_url,
                EngineEvent::TitleChanged(title) => titles.push(title),
                EngineEvent::LoadFinished { ok } => {
                    finished.push(ok);
                    if seen_new_url {
                        break;
                    }
                }
                _ => {}
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(titles, vec!["NEW PAGE".to_string()]);
        assert_eq!(finished, vec![true]);
        assert!(receiver.try_recv().is_err());

        view.extract_plain_text(TextPurpose::ReadAloud);
        match next_event(&mut receiver).await {
            EngineEvent::PlainText { text, .. } => assert_eq!(text, "NEW PAGE new body"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blocked_request_fails_load() {
        let (mut engine, mut receiver) = engine();
        engine.set_request_filter(Some(Arc::new(Blocklist::new(DEFAULT_AD_DOMAINS.iter().copied()))));
        let mut view = engine.create_view(TabId(1));

        view.load_url("https://ads.doubleclick.net/x").unwrap();

        assert!(matches!(next_event(&mut receiver).await, EngineEvent::UrlChanged(_)));
        assert!(matches!(next_event(&mut receiver).await, EngineEvent::LoadFinished { ok: false }));
    }

    #[tokio::test]
    async fn test_missing_file_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("missing.html")).unwrap();
        let (mut engine, mut receiver) = engine();
        let mut view = engine.create_view(TabId(3));

        view.load_url(url.as_str()).unwrap();

        let mut last = next_event(&mut receiver).await;
        while !matches!(last, EngineEvent::LoadFinished { .. }) {
            last = next_event(&mut receiver).await;
        }
        assert!(matches!(last, EngineEvent::LoadFinished { ok: false }));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let (mut engine, _receiver) = engine();
        let mut view = engine.create_view(TabId(1));
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _guard = runtime.enter();

        let err = view.load_url("not a url").unwrap_err();

        assert_eq!(err.kind(), common::ErrorKind::UserInput);
    }

    #[test]
    fn test_capture_reflects_dark_style() {
        let (mut engine, _receiver) = engine();
        let mut view = engine.create_view(TabId(1));

        let light = view.capture_image().unwrap();
        view.run_script(&PageScript::UpsertStyle {
            element_id: "dark-mode-style".into(),
            css: "body {}".into(),
        })
        .unwrap();
        let dark = view.capture_image().unwrap();

        assert_eq!(light.dimensions(), VIEWPORT);
        assert_eq!(light.get_pixel(0, 0), &Rgba([0xff, 0xff, 0xff, 0xff]));
        assert_eq!(dark.get_pixel(0, 0), &Rgba([0x12, 0x12, 0x12, 0xff]));
    }
}
