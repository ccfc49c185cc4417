use lib_common::ingestors::{LogObserver, SessionObserver};
use lib_common::sources::reddit::TopItemsSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Shared, read-only handles given to every listener and session.
///
/// The only mutable part is the connected-session counter, kept for logging.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TopItemsSource>,
    pub poll_interval: Duration,
    pub observer: Arc<dyn SessionObserver>,
    connected: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(source: Arc<dyn TopItemsSource>, poll_interval: Duration) -> Self {
        Self {
            source,
            poll_interval,
            observer: Arc::new(LogObserver),
            connected: Arc::new(AtomicUsize::new(0)),
        }
    }

    // Both return the count after the change
    pub fn session_opened(&self) -> usize {
        self.connected.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn session_closed(&self) -> usize {
        self.connected.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    pub fn connected(&self) -> usize {
        self.connected.load(Ordering::Relaxed)
    }
}
