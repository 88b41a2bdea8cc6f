//! Read aloud, summarize, voice commands and widgets.
//!
//! Each flow starts on the control thread, runs its collaborator call as
//! background work, and finishes when the matching [`TaskOutcome`] is
//! dispatched.

use common::{ShellError, ShellResult};

use crate::engine::TextPurpose;
use crate::events::{ShellEvent, TaskOutcome};
use crate::notice::Notice;
use crate::services::SpeechError;
use crate::session::Session;
use crate::tab::TabId;
use crate::tasks::TaskScope;
use crate::voice::VoiceCommand;
use crate::widgets::{self, NEWS_UNAVAILABLE, WEATHER_LOADING, WEATHER_UNAVAILABLE};

impl Session {
    /// Ask the active tab for its text to read aloud.
    pub(crate) fn read_aloud(&mut self) {
        self.tabs
            .active_tab_mut()
            .view_mut()
            .extract_plain_text(TextPurpose::ReadAloud);
    }

    /// Ask the active tab for its text to summarize. Needs an API key.
    pub(crate) fn summarize(&mut self) -> ShellResult<()> {
        if self.settings.api_key().is_none() {
            return Err(ShellError::user_input("OpenAI API key is required."));
        }
        self.tabs
            .active_tab_mut()
            .view_mut()
            .extract_plain_text(TextPurpose::Summarize);
        Ok(())
    }

    pub(crate) fn on_plain_text(
        &mut self,
        tab: TabId,
        purpose: TextPurpose,
        text: String,
    ) -> ShellResult<()> {
        match purpose {
            TextPurpose::ReadAloud => {
                let tts = self.services.tts.clone();
                self.tasks.spawn(TaskScope::Tab(tab), async move {
                    let result = match tts.synthesize(&text).await {
                        Ok(audio) => tts.play(audio).await,
                        Err(err) => Err(err),
                    };
                    ShellEvent::from(TaskOutcome::SpeechPlayed { tab, result })
                })
            }
            TextPurpose::Summarize => {
                let api_key = self
                    .settings
                    .api_key()
                    .ok_or_else(|| ShellError::user_input("OpenAI API key is required."))?
                    .to_string();
                let summarizer = self.services.summarizer.clone();
                self.tasks.spawn(TaskScope::Tab(tab), async move {
                    let result = summarizer.summarize(&text, &api_key).await;
                    ShellEvent::from(TaskOutcome::Summary { tab, result })
                })
            }
        }
    }

    /// Capture one utterance in the background.
    pub(crate) fn start_voice_command(&mut self) -> ShellResult<()> {
        let speech = self.services.speech.clone();
        self.tasks.spawn(TaskScope::Session, async move {
            ShellEvent::from(TaskOutcome::Utterance(speech.capture_utterance().await))
        })?;
        self.notify("Voice Command", "Listening...");
        Ok(())
    }

    /// Dispatch a recognized phrase.
    pub(crate) fn run_voice_command(&mut self, phrase: &str) {
        let command = VoiceCommand::parse(phrase);
        tracing::info!(phrase, ?command, "voice command");
        match command.action() {
            Some(action) => self.on_action(action),
            None => self.notify("Voice Command", "Command not recognized."),
        }
    }

    /// Fetch weather and news. Without an API key a widget shows its
    /// placeholder and nothing is requested.
    pub(crate) fn refresh_widgets(&mut self) -> ShellResult<()> {
        match widgets::weather_url(&self.config.weather) {
            Some(url) => {
                self.widgets.weather = WEATHER_LOADING.to_string();
                let fetcher = self.services.fetcher.clone();
                self.tasks.spawn(TaskScope::Session, async move {
                    ShellEvent::from(TaskOutcome::Weather(fetcher.fetch_json(&url).await))
                })?;
            }
            None => self.widgets.weather = WEATHER_UNAVAILABLE.to_string(),
        }

        match widgets::news_url(&self.config.news) {
            Some(url) => {
                let fetcher = self.services.fetcher.clone();
                self.tasks.spawn(TaskScope::Session, async move {
                    ShellEvent::from(TaskOutcome::News(fetcher.fetch_json(&url).await))
                })?;
            }
            None => self.widgets.news = vec![NEWS_UNAVAILABLE.to_string()],
        }
        Ok(())
    }

    pub(crate) fn on_task_outcome(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Utterance(Ok(phrase)) => {
                self.notify("Voice Command", format!("You said: {phrase}"));
                self.run_voice_command(&phrase);
            }
            TaskOutcome::Utterance(Err(err)) => {
                tracing::warn!(%err, "voice capture failed");
                let message = match err {
                    SpeechError::NoMatch => "Could not understand audio.",
                    SpeechError::ServiceUnavailable(_) => "Speech recognition service failed.",
                };
                self.notices.push_back(Notice::error("Voice Command", message));
            }
            TaskOutcome::SpeechPlayed { tab, result } => {
                if !self.tabs.contains(tab) {
                    tracing::debug!(%tab, "dropping speech result for closed tab");
                    return;
                }
                if let Err(err) = result {
                    self.report("Read Aloud", err);
                }
            }
            TaskOutcome::Summary { tab, result } => {
                if !self.tabs.contains(tab) {
                    tracing::debug!(%tab, "dropping summary for closed tab");
                    return;
                }
                match result {
                    Ok(summary) => self.notify("Summary", summary.trim()),
                    Err(err) => self.report("Summarize", err),
                }
            }
            TaskOutcome::Weather(result) => {
                self.widgets.weather = match result {
                    Ok(body) => widgets::parse_weather(&body),
                    Err(err) => {
                        tracing::warn!(%err, "weather fetch failed");
                        WEATHER_UNAVAILABLE.to_string()
                    }
                };
            }
            TaskOutcome::PageSaved(result) => self.on_page_saved(result),
            TaskOutcome::News(result) => {
                self.widgets.news = match result {
                    Ok(body) => widgets::parse_news(&body),
                    Err(err) => {
                        tracing::warn!(%err, "news fetch failed");
                        vec![NEWS_UNAVAILABLE.to_string()]
                    }
                };
            }
        }
    }
}
