//! Background work with cancellation.
//!
//! Blocking collaborator calls run as tokio tasks. Their results come back
//! to the control thread as [`ShellEvent`]s through the session's channel,
//! so shared state is only ever mutated by [`Session::dispatch`].
//!
//! [`Session::dispatch`]: crate::Session::dispatch

use std::collections::HashMap;
use std::future::Future;

use common::{ShellError, ShellResult};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::events::ShellEvent;
use crate::tab::TabId;

/// Channel carrying events into the session.
#[derive(Debug)]
pub struct EventChannel {
    sender: mpsc::UnboundedSender<ShellEvent>,
    receiver: mpsc::UnboundedReceiver<ShellEvent>,
}

impl EventChannel {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Sender for engines and front-ends that post events asynchronously.
    pub fn sender(&self) -> mpsc::UnboundedSender<ShellEvent> {
        self.sender.clone()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (mpsc::UnboundedSender<ShellEvent>, mpsc::UnboundedReceiver<ShellEvent>) {
        (self.sender, self.receiver)
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// What a background task is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskScope {
    /// Lives until session shutdown.
    Session,
    /// Cancelled when the tab closes.
    Tab(TabId),
}

/// Spawns background tasks and owns their cancellation tokens.
#[derive(Debug)]
pub struct TaskRunner {
    root: CancellationToken,
    tab_tokens: HashMap<TabId, CancellationToken>,
    sender: mpsc::UnboundedSender<ShellEvent>,
}

impl TaskRunner {
    pub fn new(sender: mpsc::UnboundedSender<ShellEvent>) -> Self {
        Self {
            root: CancellationToken::new(),
            tab_tokens: HashMap::new(),
            sender,
        }
    }

    /// Run `task` in the background and post its event when it completes.
    /// A cancelled task posts nothing.
    pub fn spawn<F>(&mut self, scope: TaskScope, task: F) -> ShellResult<()>
    where
        F: Future<Output = ShellEvent> + Send + 'static,
    {
        let handle = Handle::try_current()
            .map_err(|_| ShellError::state("background work requires a tokio runtime"))?;
        if self.root.is_cancelled() {
            return Err(ShellError::state("session is shut down"));
        }

        let token = self.token(scope);
        let sender = self.sender.clone();

        handle.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(?scope, "background task cancelled");
                }
                event = task => {
                    if sender.send(event).is_err() {
                        tracing::debug!(?scope, "session gone, dropping task result");
                    }
                }
            }
        });

        Ok(())
    }

    /// Cancel all in-flight work bound to a tab.
    pub fn cancel_tab(&mut self, tab: TabId) {
        if let Some(token) = self.tab_tokens.remove(&tab) {
            token.cancel();
            tracing::debug!(%tab, "cancelled tab tasks");
        }
    }

    /// Cancel everything.
    pub fn shutdown(&mut self) {
        self.root.cancel();
        self.tab_tokens.clear();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    fn token(&mut self, scope: TaskScope) -> CancellationToken {
        match scope {
            TaskScope::Session => self.root.child_token(),
            TaskScope::Tab(tab) => self
                .tab_tokens
                .entry(tab)
                .or_insert_with(|| self.root.child_token())
                .child_token(),
        }
    }
}
