//! Datagram sources consumed by the receive loop.

use std::{
    io,
    net::{SocketAddr, UdpSocket as StdUdpSocket},
};

use async_trait::async_trait;
use tokio::{net::UdpSocket, select};
use tokio_util::sync::CancellationToken;

/// Something the receive loop can pull datagrams from.
///
/// Implementations must be cancellation-safe: the loop wraps every `recv` in
/// a read deadline and drops the future when it expires.
#[async_trait]
pub trait DatagramSource: Send + Sync {
    /// Receive one datagram into `buf`, returning its length.
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;
}

/// A UDP socket that another task can close while a receive is pending.
///
/// Closing does not wait for the reader. Any pending or later
/// [`recv`](DatagramSource::recv) fails with [`io::ErrorKind::NotConnected`],
/// and the file descriptor is released once the last owner drops it.
#[derive(Debug)]
pub struct ClosableSocket {
    socket: UdpSocket,
    closed: CancellationToken,
}

impl ClosableSocket {
    /// Wrap an already bound Tokio socket.
    #[must_use]
    pub fn new(socket: UdpSocket) -> Self {
        Self {
            socket,
            closed: CancellationToken::new(),
        }
    }

    /// Adopt a bound standard library socket.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if the socket cannot be switched to
    /// non-blocking mode or registered with the runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn from_std(socket: StdUdpSocket) -> io::Result<Self> {
        socket.set_nonblocking(true)?;
        Ok(Self::new(UdpSocket::from_std(socket)?))
    }

    /// Address the socket is bound to.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if the address cannot be queried.
    pub fn local_addr(&self) -> io::Result<SocketAddr> { self.socket.local_addr() }

    /// Send one datagram to `target`.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if the socket is closed or the send fails.
    pub async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        if self.is_closed() {
            return Err(closed_error());
        }
        self.socket.send_to(buf, target).await
    }

    /// Close the socket, waking any pending receive.
    pub fn close(&self) { self.closed.cancel(); }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed.is_cancelled() }
}

#[async_trait]
impl DatagramSource for ClosableSocket {
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        select! {
            biased;

            () = self.closed.cancelled() => Err(closed_error()),
            res = self.socket.recv_from(buf) => res.map(|(len, _)| len),
        }
    }
}

fn closed_error() -> io::Error { io::Error::new(io::ErrorKind::NotConnected, "socket closed") }
