/// Resolution status shared by the safe content paths.
///
/// Every status change is logged and published on a broadcast channel as a
/// `ContentUpdate`. Subscribers that fall behind lose the oldest updates; the
/// current state is always available synchronously through `report()`.
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

const UPDATE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateStatus {
    #[default]
    Ready,
    Loading,
    Success,
    JsonFallback,
    HardcodedFallback,
    Error,
}

impl UpdateStatus {
    pub fn message(self) -> &'static str {
        match self {
            Self::Ready => "Ready to load",
            Self::Loading => "Loading content...",
            Self::Success => "Content loaded from markdown",
            Self::JsonFallback => "Using JSON fallback (markdown failed)",
            Self::HardcodedFallback => "Using hardcoded fallback (all sources failed)",
            Self::Error => "Error occurred, using fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContentUpdate {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub status: UpdateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatusReport {
    pub status: UpdateStatus,
    /// Time of the last markdown-tier success.
    pub last_update: Option<DateTime<Utc>>,
    pub message: String,
}

#[derive(Debug, Default)]
struct State {
    status: UpdateStatus,
    last_update: Option<DateTime<Utc>>,
}

pub struct StatusTracker {
    state: Mutex<State>,
    sender: broadcast::Sender<ContentUpdate>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(State::default()),
            sender,
        }
    }

    pub fn set(&self, status: UpdateStatus) {
        self.lock().status = status;
    }

    pub fn mark_updated(&self) {
        self.lock().last_update = Some(Utc::now());
    }

    pub fn current(&self) -> UpdateStatus {
        self.lock().status
    }

    /// Logs `message` and publishes it with the current status.
    pub fn publish(&self, message: impl Into<String>) {
        let message = message.into();
        let status = self.current();
        info!(status = status.message(), "{message}");
        // No receivers is not an error.
        let _ = self.sender.send(ContentUpdate {
            message,
            timestamp: Utc::now(),
            status,
        });
    }

    pub fn report(&self) -> StatusReport {
        let state = self.lock();
        StatusReport {
            status: state.status,
            last_update: state.last_update,
            message: state.status.message().to_string(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ContentUpdate> {
        self.sender.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}
