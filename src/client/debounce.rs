//! Debounced preview refreshes for an editing surface.
//!
//! Every change to the block data restarts a quiet-period timer. Only when the
//! data has settled for the whole delay is a preview requested, and any
//! request still running for an older value is abandoned.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::application::preview::FAILURE_MESSAGE;

use super::transport::{ClientPreviewRequest, PreviewTransport};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
pub const LOADING_MESSAGE: &str = "Loading preview";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Loading,
    Ready(String),
    Failed(String),
}

impl PreviewState {
    /// Markup or message to show in place of the block.
    pub fn display(&self) -> &str {
        match self {
            PreviewState::Idle => "",
            PreviewState::Loading => LOADING_MESSAGE,
            PreviewState::Ready(markup) => markup,
            PreviewState::Failed(message) => message,
        }
    }
}

pub struct PreviewDebouncer {
    transport: Arc<dyn PreviewTransport>,
    delay: Duration,
    state: Arc<watch::Sender<PreviewState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl PreviewDebouncer {
    pub fn new(transport: Arc<dyn PreviewTransport>, delay: Duration) -> Self {
        let (state, _) = watch::channel(PreviewState::Idle);
        Self {
            transport,
            delay,
            state: Arc::new(state),
            pending: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    /// Record a new value of the block data. Must be called within a tokio runtime.
    pub fn observe(&self, request: ClientPreviewRequest) {
        let transport = Arc::clone(&self.transport);
        let state = Arc::clone(&self.state);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            state.send_replace(PreviewState::Loading);
            let next = match transport.fetch_preview(&request).await {
                Ok(markup) => PreviewState::Ready(markup),
                Err(err) => {
                    warn!(
                        target = "blockpreview::client::debounce",
                        page_id = request.page_id,
                        block_id = %request.block.id,
                        error = %err,
                        "Preview request failed"
                    );
                    PreviewState::Failed(FAILURE_MESSAGE.to_string())
                }
            };
            state.send_replace(next);
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(task) {
            if !previous.is_finished() {
                debug!(
                    target = "blockpreview::client::debounce",
                    "Superseding pending preview"
                );
            }
            previous.abort();
        }
    }

    /// Drop any scheduled or running preview without touching the current state.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

impl Drop for PreviewDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
