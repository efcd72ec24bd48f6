//! Lifecycle of the single websocket connection to the chat backend.
//!
//! [`ConnectionManager::open`] always closes the previous connection before
//! spawning a new one, so at most one connection is live. Every event is
//! tagged with the [`ConnectionId`] of the connection that produced it, which
//! lets consumers drop stragglers from a connection that was already replaced.

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type ConnectionId = u64;

const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Connecting,
    Open,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Closed => "offline",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "online",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Ready,
    Message(String),
    Retrying { attempt: u32, delay: Duration },
    Error(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    DroppedNotReady,
    Failed(String),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

#[derive(Debug)]
pub enum ConnectionError {
    /// Every connect attempt failed.
    Connect {
        endpoint: String,
        attempts: u32,
        source: tungstenite::Error,
    },

    /// The socket failed after it was established.
    Transport { source: tungstenite::Error },
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Connect {
                endpoint,
                attempts,
                source,
            } => write!(
                f,
                "Could not connect to {} after {} attempt(s): {}",
                endpoint, attempts, source
            ),
            ConnectionError::Transport { source } => write!(f, "Connection error: {}", source),
        }
    }
}

impl StdError for ConnectionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConnectionError::Connect { source, .. } => Some(source),
            ConnectionError::Transport { source } => Some(source),
        }
    }
}

/// Bounded exponential backoff applied to connect attempts only. Drops of an
/// established connection are reported, not retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

struct LiveConnection {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
    ready: Arc<AtomicBool>,
    /// Set by the task before it reports `Closed`.
    ended: Arc<AtomicBool>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LiveConnection {
    fn is_running(&self) -> bool {
        !self.ended.load(Ordering::SeqCst) && !self.task.is_finished()
    }
}

pub struct ConnectionManager {
    endpoint: String,
    retry: RetryPolicy,
    events: mpsc::UnboundedSender<(ConnectionEvent, ConnectionId)>,
    next_id: ConnectionId,
    live: Option<LiveConnection>,
    /// Cancelled tasks still sending their close frame.
    closing: Vec<JoinHandle<()>>,
}

impl ConnectionManager {
    pub fn new(
        endpoint: impl Into<String>,
        retry: RetryPolicy,
    ) -> (Self, mpsc::UnboundedReceiver<(ConnectionEvent, ConnectionId)>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                endpoint: endpoint.into(),
                retry,
                events,
                next_id: 1,
                live: None,
                closing: Vec::new(),
            },
            rx,
        )
    }

    /// Id of the connection still in play; `None` once it has closed,
    /// whichever side closed it.
    pub fn current_id(&self) -> Option<ConnectionId> {
        self.live
            .as_ref()
            .filter(|live| live.is_running())
            .map(|live| live.id)
    }

    pub fn is_ready(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.is_running() && live.ready.load(Ordering::SeqCst))
    }

    pub fn state(&self) -> ConnectionState {
        match &self.live {
            None => ConnectionState::Closed,
            Some(live) if !live.is_running() => ConnectionState::Closed,
            Some(live) if live.ready.load(Ordering::SeqCst) => ConnectionState::Open,
            Some(_) => ConnectionState::Connecting,
        }
    }

    /// Closes any live connection, then starts connecting a fresh one.
    pub fn open(&mut self) -> ConnectionId {
        self.close();

        let id = self.next_id;
        self.next_id += 1;

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let ready = Arc::new(AtomicBool::new(false));
        let ended = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        info!(connection_id = id, endpoint = %self.endpoint, "opening connection");
        let task = tokio::spawn(run_connection(ConnectionTask {
            endpoint: self.endpoint.clone(),
            retry: self.retry,
            id,
            events: self.events.clone(),
            outbound: outbound_rx,
            ready: ready.clone(),
            ended: ended.clone(),
            cancel: cancel.clone(),
        }));

        self.live = Some(LiveConnection {
            id,
            outbound,
            ready,
            ended,
            cancel,
            task,
        });
        id
    }

    /// Hands `text` to the connection. Nothing is queued while the
    /// connection is still opening.
    pub fn send(&self, text: String) -> SendOutcome {
        let Some(live) = &self.live else {
            return SendOutcome::DroppedNotReady;
        };
        if !live.ready.load(Ordering::SeqCst) {
            return SendOutcome::DroppedNotReady;
        }
        match live.outbound.send(text) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => SendOutcome::Failed("connection task has stopped".to_string()),
        }
    }

    /// Cancels the live connection. Its subscriptions end with it: the task
    /// emits nothing further once cancelled. The task is kept so
    /// [`ConnectionManager::shutdown`] can wait for its close frame.
    pub fn close(&mut self) {
        self.closing.retain(|task| !task.is_finished());
        if let Some(live) = self.live.take() {
            debug!(connection_id = live.id, "closing connection");
            live.ready.store(false, Ordering::SeqCst);
            live.cancel.cancel();
            self.closing.push(live.task);
        }
    }

    /// Closes the live connection and waits briefly for every cancelled
    /// connection to finish its close handshake.
    pub async fn shutdown(&mut self) {
        self.close();
        let pending = std::mem::take(&mut self.closing);
        if pending.is_empty() {
            return;
        }
        debug!(tasks = pending.len(), "waiting for connections to close");
        let _ = tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT * 2, join_all(pending)).await;
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

struct ConnectionTask {
    endpoint: String,
    retry: RetryPolicy,
    id: ConnectionId,
    events: mpsc::UnboundedSender<(ConnectionEvent, ConnectionId)>,
    outbound: mpsc::UnboundedReceiver<String>,
    ready: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl ConnectionTask {
    fn emit(&self, event: ConnectionEvent) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.events.send((event, self.id));
    }

    fn closed(&self) {
        self.ready.store(false, Ordering::SeqCst);
        self.ended.store(true, Ordering::SeqCst);
        self.emit(ConnectionEvent::Closed);
    }

    fn fail(&self, error: ConnectionError) {
        warn!(connection_id = self.id, "{error}");
        self.ready.store(false, Ordering::SeqCst);
        self.emit(ConnectionEvent::Error(error.to_string()));
        self.closed();
    }
}

async fn run_connection(mut task: ConnectionTask) {
    let mut attempt = 0u32;
    let socket = loop {
        let result = tokio::select! {
            _ = task.cancel.cancelled() => return,
            result = connect_async(task.endpoint.as_str()) => result,
        };

        match result {
            Ok((socket, _response)) => break socket,
            Err(source) if attempt >= task.retry.max_retries => {
                task.fail(ConnectionError::Connect {
                    endpoint: task.endpoint.clone(),
                    attempts: attempt + 1,
                    source,
                });
                return;
            }
            Err(err) => {
                attempt += 1;
                let delay = task.retry.delay_for(attempt);
                debug!(connection_id = task.id, attempt, ?delay, "connect failed: {err}");
                task.emit(ConnectionEvent::Retrying { attempt, delay });
                tokio::select! {
                    _ = task.cancel.cancelled() => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    };

    let (mut sink, mut stream) = socket.split();
    task.ready.store(true, Ordering::SeqCst);
    info!(connection_id = task.id, "connection ready");
    task.emit(ConnectionEvent::Ready);

    loop {
        tokio::select! {
            _ = task.cancel.cancelled() => {
                let _ = tokio::time::timeout(
                    CLOSE_HANDSHAKE_TIMEOUT,
                    sink.send(WsMessage::Close(None)),
                )
                .await;
                return;
            }
            outgoing = task.outbound.recv() => match outgoing {
                Some(text) => {
                    if let Err(source) = sink.send(WsMessage::Text(text)).await {
                        task.fail(ConnectionError::Transport { source });
                        return;
                    }
                }
                None => {
                    let _ = tokio::time::timeout(
                        CLOSE_HANDSHAKE_TIMEOUT,
                        sink.send(WsMessage::Close(None)),
                    )
                    .await;
                    return;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    task.emit(ConnectionEvent::Message(text));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    debug!(connection_id = task.id, ?frame, "peer closed connection");
                    task.closed();
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(source)) => {
                    task.fail(ConnectionError::Transport { source });
                    return;
                }
                None => {
                    task.closed();
                    return;
                }
            },
        }
    }
}
