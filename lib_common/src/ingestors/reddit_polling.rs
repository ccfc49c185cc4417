//! # Reddit Polling Session
//!
//! A self-scheduling ingestor bound to exactly one downstream connection.
//!
//! ## Key Design Principles:
//! - **One session, one client**: a [`ConnectionSession`] owns its sink and
//!   its ticker. Nothing is shared between sessions except the read-only
//!   upstream source, so a payload can only ever reach the client whose cycle
//!   produced it.
//! - **Immediate then periodic**: on activation the session runs one
//!   fetch-push cycle straight away, then one per period. Cycles run in a
//!   single loop, so they never overlap; ticks missed while a slow cycle is in
//!   flight are skipped rather than replayed.
//! - **Failures are reported, not raised**: every cycle ends in a
//!   [`CycleOutcome`] handed to the [`SessionObserver`]. A failed cycle leaves
//!   the session active and the next tick tries again.
//! - **Cancellation**: [`SessionHandle::disconnect`] cancels the session's
//!   token. The loop stops at its next await point, any in-flight cycle result
//!   is discarded, and the sink is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::sources::reddit::{BroadcastPayload, RedditError, TopItemsSource};

/// Period between cycles when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Why a payload could not be delivered to the client.
#[derive(Debug, Error)]
pub enum PushError {
    /// The connection is already gone.
    #[error("connection closed")]
    Closed,
    /// The transport refused the message.
    #[error("send failed: {0}")]
    Send(String),
}

/// Where a session delivers its serialized payloads.
#[async_trait]
pub trait PayloadSink: Send {
    /// Sends one JSON text message to the client.
    async fn push(&mut self, message: String) -> Result<(), PushError>;
}

/// Why a single fetch-push cycle failed.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Authentication or listing fetch failed.
    #[error(transparent)]
    Upstream(#[from] RedditError),
    /// The payload could not be serialized.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The payload could not be pushed.
    #[error("failed to push payload: {0}")]
    Push(#[from] PushError),
}

impl CycleError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Upstream(e) => e.kind(),
            CycleError::Serialize(_) => "serialize",
            CycleError::Push(_) => "push",
        }
    }
}

/// Result of one fetch-push cycle: the payload that was pushed, or why not.
pub type CycleOutcome = Result<BroadcastPayload, CycleError>;

/// Receives session lifecycle events.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
pub trait SessionObserver: Send + Sync {
    /// The session entered the active state.
    fn on_active(&self, _session_id: u64) {}
    /// A cycle finished, successfully or not.
    fn on_cycle(&self, _session_id: u64, _outcome: &CycleOutcome) {}
    /// The session closed and released its sink.
    fn on_closed(&self, _session_id: u64) {}
}

/// Observer writing session events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SessionObserver for LogObserver {
    fn on_active(&self, session_id: u64) {
        log::info!("Session {} active", session_id);
    }

    fn on_cycle(&self, session_id: u64, outcome: &CycleOutcome) {
        match outcome {
            Ok(payload) => log::info!(
                "Session {}: sent {} items, {} contributors",
                session_id,
                payload.top_items.len(),
                payload.top_contributors.len()
            ),
            Err(e) => log::error!("Session {}: cycle failed [{}]: {}", session_id, e.kind(), e),
        }
    }

    fn on_closed(&self, session_id: u64) {
        log::info!("Session {} closed", session_id);
    }
}

/// Lifecycle of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but not yet activated.
    Connecting,
    /// Polling and pushing.
    Active,
    /// Disconnected; no further cycles.
    Closed,
}

/// Fetches the listing and derives the payload, without pushing it.
pub async fn fetch_payload<S>(source: &S) -> Result<BroadcastPayload, RedditError>
where
    S: TopItemsSource + ?Sized,
{
    let credential = source.authenticate().await?;
    let top = source.fetch_top_items(&credential).await?;
    Ok(BroadcastPayload::from_items(top.items))
}

/// One full cycle: authenticate, fetch, rank, serialize, push.
pub async fn run_cycle<S, K>(source: &S, sink: &mut K) -> CycleOutcome
where
    S: TopItemsSource + ?Sized,
    K: PayloadSink + ?Sized,
{
    let payload = fetch_payload(source).await?;
    let message = serde_json::to_string(&payload)?;
    sink.push(message).await?;
    Ok(payload)
}

/// A not-yet-activated session for one client connection.
pub struct ConnectionSession<S: ?Sized, K> {
    id: u64,
    source: Arc<S>,
    sink: K,
    period: Duration,
    observer: Arc<dyn SessionObserver>,
}

impl<S, K> ConnectionSession<S, K>
where
    S: TopItemsSource + ?Sized + 'static,
    K: PayloadSink + 'static,
{
    /// A session polling `source` every [`DEFAULT_POLL_INTERVAL`] and
    /// reporting to a [`LogObserver`].
    pub fn new(id: u64, source: Arc<S>, sink: K) -> Self {
        Self {
            id,
            source,
            sink,
            period: DEFAULT_POLL_INTERVAL,
            observer: Arc::new(LogObserver),
        }
    }

    /// Overrides the polling period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Overrides the observer.
    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Always [`SessionState::Connecting`]; activation consumes the session.
    pub fn state(&self) -> SessionState {
        SessionState::Connecting
    }

    /// Starts polling on the current tokio runtime.
    pub fn activate(self) -> SessionHandle {
        let cancel = CancellationToken::new();
        let id = self.id;
        let task = tokio::spawn(self.run(cancel.clone()));

        SessionHandle {
            id,
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            closed: AtomicBool::new(false),
            task,
        }
    }

    async fn run(self, cancel: CancellationToken) {
        let ConnectionSession {
            id,
            source,
            mut sink,
            period,
            observer,
        } = self;

        observer.on_active(id);
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = run_cycle(source.as_ref(), &mut sink) => outcome,
            };
            observer.on_cycle(id, &outcome);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
        }

        drop(sink);
        observer.on_closed(id);
    }
}

/// Control handle for an activated session.
///
/// Dropping the handle cancels the session as well.
pub struct SessionHandle {
    id: u64,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
    closed: AtomicBool,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// The session id given at construction.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `Active` until [`disconnect`](Self::disconnect) is called, then `Closed`.
    pub fn state(&self) -> SessionState {
        if self.closed.load(Ordering::Acquire) {
            SessionState::Closed
        } else {
            SessionState::Active
        }
    }

    /// Moves the session to `Closed` and cancels its ticker. Returns `false`
    /// if it was already closed.
    pub fn disconnect(&self) -> bool {
        if self.closed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.cancel.cancel();
        true
    }

    /// Waits for the session task to finish releasing its sink.
    pub async fn join(self) -> Result<(), JoinError> {
        let SessionHandle {
            task,
            _cancel_on_drop,
            ..
        } = self;
        task.await
    }
}
