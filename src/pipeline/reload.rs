//! In-process live-reload channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

/// An artifact was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    /// Asset class (`styles`, `scripts`, `fonts`, ...)
    pub class: String,

    /// Written file
    pub path: PathBuf,
}

impl ReloadEvent {
    pub fn new(class: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ReloadEvent {
            class: class.into(),
            path: path.into(),
        }
    }
}

/// Fan-out of reload events to subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct ReloadHub {
    subscribers: Mutex<Vec<Sender<ReloadEvent>>>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new listener.
    pub fn subscribe(&self) -> Receiver<ReloadEvent> {
        let (tx, rx) = channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Publish an event to every listener.
    pub fn publish(&self, event: ReloadEvent) {
        tracing::trace!("reload: {} {}", event.class, event.path.display());
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    /// Publish a write, but only for stylesheets and scripts.
    pub fn publish_bundle(&self, class: &str, path: &Path) {
        let is_bundle = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("css") | Some("js")
        );
        if is_bundle {
            self.publish(ReloadEvent::new(class, path));
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}
