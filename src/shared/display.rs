//! The single shared slot of most-recently recognized text.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Observable single-value text store.
///
/// Written only by the analyzer's success path, read by the overlay. Each
/// publish overwrites the slot (never merges) and notifies every live
/// subscriber. Cloning shares the same slot.
#[derive(Clone, Default)]
pub struct DisplayState {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    text: RwLock<String>,
    subscribers: Mutex<Vec<Sender<String>>>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published text, empty before the first publish.
    pub fn text(&self) -> String {
        self.inner.text.read().clone()
    }

    /// Whether nothing (or only whitespace) has been recognized so far.
    pub fn is_blank(&self) -> bool {
        self.inner.text.read().trim().is_empty()
    }

    /// Overwrite the slot and notify subscribers. Subscribers whose receiver
    /// has been dropped are pruned.
    pub fn publish(&self, text: String) {
        *self.inner.text.write() = text.clone();
        self.inner
            .subscribers
            .lock()
            .retain(|tx| tx.send(text.clone()).is_ok());
    }

    /// Receive every subsequently published value.
    pub fn subscribe(&self) -> Receiver<String> {
        let (tx, rx) = unbounded();
        self.inner.subscribers.lock().push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_blank() {
        let display = DisplayState::new();
        assert_eq!(display.text(), "");
        assert!(display.is_blank());
    }

    #[test]
    fn test_publish_overwrites() {
        let display = DisplayState::new();
        display.publish("Stop".to_string());
        assert_eq!(display.text(), "Stop");
        assert!(!display.is_blank());

        display.publish("Exit 21".to_string());
        assert_eq!(display.text(), "Exit 21");
    }

    #[test]
    fn test_publish_identical_value_is_idempotent() {
        let display = DisplayState::new();
        display.publish("Stop".to_string());
        display.publish("Stop".to_string());
        assert_eq!(display.text(), "Stop");
    }

    #[test]
    fn test_subscribers_receive_each_publish() {
        let display = DisplayState::new();
        let rx = display.subscribe();

        display.publish("one".to_string());
        display.publish("two".to_string());

        assert_eq!(rx.try_recv().unwrap(), "one");
        assert_eq!(rx.try_recv().unwrap(), "two");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let display = DisplayState::new();
        drop(display.subscribe());
        // Must not fail or leak; the dead sender is dropped on publish.
        display.publish("still fine".to_string());
        assert_eq!(display.text(), "still fine");
    }

    #[test]
    fn test_clones_share_the_slot() {
        let display = DisplayState::new();
        let other = display.clone();
        other.publish("shared".to_string());
        assert_eq!(display.text(), "shared");
    }
}
