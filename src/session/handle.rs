//! Control handle for a running receive task.

use std::{net::SocketAddr, sync::Arc};

use tokio::sync::{oneshot, watch};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::{ClosableSocket, ReceiveStats, SessionState, publish};

/// Drives a started [`ListenerSession`](super::ListenerSession) through
/// shutdown.
///
/// The three steps may be issued separately: [`cancel`](Self::cancel) asks
/// the receive task to stop at its next check, [`close_socket`](Self::close_socket)
/// wakes a pending receive, and [`wait`](Self::wait) blocks until the task
/// has signalled completion. [`shutdown`](Self::shutdown) performs all three.
///
/// Once [`wait`](Self::wait) returns, the handle has released its socket
/// and the listen port is free. Dropping the handle cancels the task and
/// closes the socket without waiting.
#[derive(Debug)]
pub struct ReceiverHandle {
    shutdown: CancellationToken,
    socket: Option<Arc<ClosableSocket>>,
    tracker: TaskTracker,
    done: Option<oneshot::Receiver<ReceiveStats>>,
    stats: Option<ReceiveStats>,
    state_tx: watch::Sender<SessionState>,
}

impl ReceiverHandle {
    pub(super) fn new(
        shutdown: CancellationToken,
        socket: Arc<ClosableSocket>,
        tracker: TaskTracker,
        done: oneshot::Receiver<ReceiveStats>,
        state_tx: watch::Sender<SessionState>,
    ) -> Self {
        Self {
            shutdown,
            socket: Some(socket),
            tracker,
            done: Some(done),
            stats: None,
            state_tx,
        }
    }

    /// Address the receive socket is bound to, until the session is closed.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|socket| socket.local_addr().ok())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState { *self.state_tx.borrow() }

    /// Observe lifecycle transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> { self.state_tx.subscribe() }

    /// Whether cancellation has been issued.
    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.shutdown.is_cancelled() }

    /// Ask the receive task to stop. Without [`close_socket`](Self::close_socket)
    /// the task notices within one read deadline.
    pub fn cancel(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        publish(&self.state_tx, SessionState::ShuttingDown);
        self.shutdown.cancel();
    }

    /// Close the socket, failing any pending receive.
    ///
    /// Pair with [`cancel`](Self::cancel): on its own the loop treats the
    /// closed socket as a transient error and keeps retrying.
    pub fn close_socket(&self) {
        if let Some(socket) = &self.socket {
            socket.close();
        }
    }

    /// Wait for the receive task to finish and report its counters.
    ///
    /// Waiting before [`cancel`](Self::cancel) blocks until some other
    /// holder cancels. Later calls return the same counters immediately.
    pub async fn wait(&mut self) -> ReceiveStats {
        if let Some(stats) = self.stats {
            return stats;
        }
        self.tracker.close();
        self.tracker.wait().await;
        let stats = match self.done.take() {
            Some(done) => done.await.unwrap_or_else(|_| {
                log::error!("receive task ended without reporting completion");
                ReceiveStats::default()
            }),
            None => ReceiveStats::default(),
        };
        if let Some(socket) = self.socket.take() {
            socket.close();
        }
        self.stats = Some(stats);
        publish(&self.state_tx, SessionState::Closed);
        tracing::info!(
            datagrams = stats.datagrams,
            records = stats.records,
            rejected = stats.rejected,
            "listener closed"
        );
        stats
    }

    /// Cancel, close the socket, and wait for completion.
    pub async fn shutdown(&mut self) -> ReceiveStats {
        self.cancel();
        self.close_socket();
        self.wait().await
    }
}

impl Drop for ReceiverHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
        self.close_socket();
    }
}
