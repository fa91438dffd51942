//! Errors raised by [`ListenerSession`](super::ListenerSession) setup.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Fatal session errors. Nothing after a successful announce can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The receive socket could not be bound or configured.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address the session tried to listen on.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
    /// The announce datagram could not be sent.
    #[error("failed to announce to {remote}: {source}")]
    Announce {
        /// Remote endpoint the announce was addressed to.
        remote: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },
}

/// Result alias for session setup.
pub type Result<T> = std::result::Result<T, SessionError>;
