//! Listener session: socket ownership, announce handshake and shutdown.
//!
//! A [`ListenerSession`] carries a typestate `S` that tracks setup
//! progress. New sessions start [`Idle`], must [`bind`](ListenerSession::bind)
//! to become [`Bound`], and must [`announce`](ListenerSession::announce)
//! themselves to the remote before they can receive. Starting an announced
//! session spawns the receive task and returns a [`ReceiverHandle`] that
//! drives the rest of the lifecycle:
//!
//! ```text
//! Idle -> Bound -> Announced -> Receiving -> ShuttingDown -> Closed
//! ```
//!
//! The runtime [`SessionState`] is published on a `watch` channel available
//! through `subscribe()` in every phase.

mod backoff;
mod config;
pub mod error;
mod handle;
mod receive;
mod socket;

use std::{
    fmt,
    future::Future,
    net::{SocketAddr, UdpSocket as StdUdpSocket},
    sync::Arc,
};

pub use backoff::BackoffConfig;
pub use config::{
    DEFAULT_LISTEN_PORT,
    DEFAULT_READ_DEADLINE,
    DEFAULT_REMOTE_PORT,
    MAX_UDP_PAYLOAD,
    SessionConfig,
};
pub use error::{Result, SessionError};
pub use handle::ReceiverHandle;
use log::warn;
pub use receive::{ReceiveOptions, ReceiveStats, receive_loop};
pub use socket::{ClosableSocket, DatagramSource};
use tokio::sync::{oneshot, watch};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::sink::RecordSink;

/// Content of the one-shot datagram that registers this endpoint with the
/// remote's routing table.
pub const ANNOUNCE_DATAGRAM: [u8; 1] = [0x01];

/// Lifecycle states of a listener session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Configured, no socket yet.
    Idle,
    /// Receive socket bound.
    Bound,
    /// Announce datagram sent.
    Announced,
    /// Receive task running.
    Receiving,
    /// Cancellation issued; waiting for the receive task.
    ShuttingDown,
    /// Receive task finished and socket closed.
    Closed,
}

impl SessionState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Bound => "bound",
            Self::Announced => "announced",
            Self::Receiving => "receiving",
            Self::ShuttingDown => "shutting_down",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Marker for a session that has not bound its socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Marker for a session with a bound receive socket.
#[derive(Debug, Clone)]
pub struct Bound {
    socket: Arc<ClosableSocket>,
}

/// Marker for a session that has announced itself to the remote.
#[derive(Debug, Clone)]
pub struct Announced {
    socket: Arc<ClosableSocket>,
}

/// Trait implemented by the setup markers to model session typestate.
pub trait SessionPhase: sealed::Sealed {}

mod sealed {
    //! Prevent external implementations of [`SessionPhase`].

    pub trait Sealed {}
    impl Sealed for super::Idle {}
    impl Sealed for super::Bound {}
    impl Sealed for super::Announced {}
}

impl SessionPhase for Idle {}
impl SessionPhase for Bound {}
impl SessionPhase for Announced {}

/// Listens for autopilot telemetry on one UDP socket.
///
/// # Examples
///
/// ```no_run
/// use mavsniff::{
///     message::Record,
///     session::{ListenerSession, SessionConfig},
/// };
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), mavsniff::session::SessionError> {
/// let session = ListenerSession::new(SessionConfig::default())
///     .bind()?
///     .announce()
///     .await?;
/// let stats = session.run(|record: Record| println!("{record}")).await;
/// println!("decoded {} records", stats.records);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ListenerSession<S: SessionPhase = Idle> {
    config: SessionConfig,
    state_tx: watch::Sender<SessionState>,
    phase: S,
}

impl ListenerSession<Idle> {
    /// Create an idle session. The configuration is normalised first.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            config: config.normalized(),
            state_tx,
            phase: Idle,
        }
    }

    /// Bind the receive socket to the configured listen address.
    ///
    /// # Errors
    /// Returns [`SessionError::Bind`] if the address cannot be bound.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn bind(self) -> Result<ListenerSession<Bound>> {
        let addr = self.config.listen_addr;
        let socket =
            StdUdpSocket::bind(addr).map_err(|source| SessionError::Bind { addr, source })?;
        self.bind_existing_socket(socket)
    }

    /// Adopt an already bound standard library socket.
    ///
    /// # Errors
    /// Returns [`SessionError::Bind`] if the socket cannot be registered with
    /// the runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn bind_existing_socket(self, socket: StdUdpSocket) -> Result<ListenerSession<Bound>> {
        let addr = socket.local_addr().unwrap_or(self.config.listen_addr);
        let socket =
            ClosableSocket::from_std(socket).map_err(|source| SessionError::Bind { addr, source })?;
        tracing::info!(%addr, "listener bound");
        Ok(self.transition(
            Bound {
                socket: Arc::new(socket),
            },
            SessionState::Bound,
        ))
    }
}

impl<S: SessionPhase> ListenerSession<S> {
    /// The normalised configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig { &self.config }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState { *self.state_tx.borrow() }

    /// Observe lifecycle transitions, including those made after the
    /// session is started.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> { self.state_tx.subscribe() }

    fn transition<N: SessionPhase>(self, phase: N, state: SessionState) -> ListenerSession<N> {
        publish(&self.state_tx, state);
        ListenerSession {
            config: self.config,
            state_tx: self.state_tx,
            phase,
        }
    }
}

impl ListenerSession<Bound> {
    /// Address the receive socket is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.phase.socket.local_addr().ok() }

    /// Send [`ANNOUNCE_DATAGRAM`] to the configured remote so it starts
    /// routing telemetry to this socket.
    ///
    /// # Errors
    /// Returns [`SessionError::Announce`] if the datagram cannot be sent.
    pub async fn announce(self) -> Result<ListenerSession<Announced>> {
        let remote = self.config.remote_addr;
        let socket = Arc::clone(&self.phase.socket);
        socket
            .send_to(&ANNOUNCE_DATAGRAM, remote)
            .await
            .map_err(|source| SessionError::Announce { remote, source })?;
        tracing::info!(%remote, "announced to remote");
        Ok(self.transition(Announced { socket }, SessionState::Announced))
    }
}

impl ListenerSession<Announced> {
    /// Address the receive socket is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.phase.socket.local_addr().ok() }

    /// Spawn the receive task, forwarding records to `sink`.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    #[must_use = "dropping the handle stops the receive task"]
    pub fn start<K: RecordSink>(self, sink: K) -> ReceiverHandle {
        let ListenerSession {
            config,
            state_tx,
            phase: Announced { socket },
        } = self;
        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();
        let (done_tx, done_rx) = oneshot::channel();
        let options = ReceiveOptions::from_config(&config, shutdown.clone());
        let source = Arc::clone(&socket);

        tracker.spawn(async move {
            let stats = receive_loop(&*source, sink, options).await;
            if done_tx.send(stats).is_err() {
                warn!("receive loop finished after its handle was dropped");
            }
        });
        publish(&state_tx, SessionState::Receiving);

        ReceiverHandle::new(shutdown, socket, tracker, done_rx, state_tx)
    }

    /// Receive until Ctrl+C or `SIGTERM`, then shut down cleanly.
    pub async fn run<K: RecordSink>(self, sink: K) -> ReceiveStats {
        self.run_with_shutdown(sink, shutdown_signal()).await
    }

    /// Receive until `shutdown` resolves, then cancel, close the socket and
    /// wait for the receive task to finish.
    pub async fn run_with_shutdown<K, F>(self, sink: K, shutdown: F) -> ReceiveStats
    where
        K: RecordSink,
        F: Future<Output = ()>,
    {
        let mut handle = self.start(sink);
        shutdown.await;
        handle.shutdown().await
    }
}

pub(crate) fn publish(state_tx: &watch::Sender<SessionState>, state: SessionState) {
    state_tx.send_replace(state);
    tracing::debug!(%state, "session state changed");
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(e) => warn!("failed to install SIGTERM handler: error={e}"),
        }
    }
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: error={e}");
    }
}
