//! Configuration for [`ListenerSession`](super::ListenerSession).

use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use super::BackoffConfig;
use crate::frame::{MAX_DATAGRAM_LEN, MIN_FRAME_LEN};

/// Port ground stations conventionally listen on.
pub const DEFAULT_LISTEN_PORT: u16 = 14550;
/// Port a PX4 SITL vehicle listens on for its ground-station link.
pub const DEFAULT_REMOTE_PORT: u16 = 14540;
/// Default bound on a single blocking receive.
pub const DEFAULT_READ_DEADLINE: Duration = Duration::from_secs(3);
/// Largest UDP payload a receive buffer needs to hold.
pub const MAX_UDP_PAYLOAD: usize = 65_535;

/// Settings for a listener session.
///
/// # Default Values
/// - `listen_addr`: `127.0.0.1:14550`
/// - `remote_addr`: `127.0.0.1:14540`
/// - `read_deadline`: 3 seconds
/// - `recv_buffer_len`: 2048 bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Local address the receive socket binds to.
    pub listen_addr: SocketAddr,
    /// Remote endpoint that receives the announce datagram.
    pub remote_addr: SocketAddr,
    /// Upper bound on one blocking receive. Expiry is a liveness poll used
    /// to re-check cancellation, so it also bounds shutdown latency.
    pub read_deadline: Duration,
    /// Size of the reusable receive buffer.
    pub recv_buffer_len: usize,
    /// Retry pacing after receive errors.
    pub backoff: BackoffConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_LISTEN_PORT)),
            remote_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_REMOTE_PORT)),
            read_deadline: DEFAULT_READ_DEADLINE,
            recv_buffer_len: MAX_DATAGRAM_LEN,
            backoff: BackoffConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Clamp values into ranges the receive loop can work with.
    ///
    /// The read deadline is at least 1 ms, the buffer can hold at least a
    /// minimal frame and at most one UDP payload, and retry delays never
    /// exceed the read deadline.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use mavsniff::session::SessionConfig;
    ///
    /// let cfg = SessionConfig {
    ///     read_deadline: Duration::ZERO,
    ///     recv_buffer_len: 1,
    ///     ..SessionConfig::default()
    /// }
    /// .normalized();
    /// assert_eq!(cfg.read_deadline, Duration::from_millis(1));
    /// assert_eq!(cfg.recv_buffer_len, 12);
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.read_deadline = self.read_deadline.max(Duration::from_millis(1));
        self.recv_buffer_len = self.recv_buffer_len.clamp(MIN_FRAME_LEN, MAX_UDP_PAYLOAD);
        self.backoff = self.backoff.capped_at(self.read_deadline);
        self
    }
}
