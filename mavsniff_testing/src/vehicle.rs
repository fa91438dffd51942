//! The vehicle side of a loopback UDP link.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use rstest::fixture;
use tokio::{net::UdpSocket, time::timeout};

/// Loopback address with an ephemeral port.
#[must_use]
pub fn loopback_addr() -> SocketAddr { SocketAddr::from((Ipv4Addr::LOCALHOST, 0)) }

/// A UDP peer standing in for the autopilot.
#[derive(Debug)]
pub struct FakeVehicle {
    socket: UdpSocket,
}

impl FakeVehicle {
    /// Bind a vehicle socket on loopback.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if no loopback port is available.
    pub async fn bind() -> io::Result<Self> {
        Ok(Self {
            socket: UdpSocket::bind(loopback_addr()).await?,
        })
    }

    /// Address a session should announce to.
    ///
    /// # Panics
    /// Panics if the socket address cannot be read.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.socket
            .local_addr()
            .expect("vehicle socket has an address")
    }

    /// Wait for one datagram, returning its bytes and sender.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if nothing arrives within `limit`.
    pub async fn recv_within(&self, limit: Duration) -> io::Result<(Vec<u8>, SocketAddr)> {
        let mut buf = [0u8; 64];
        let (len, from) = timeout(limit, self.socket.recv_from(&mut buf))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no datagram received"))??;
        Ok((buf[..len].to_vec(), from))
    }

    /// Send one datagram to the listener.
    ///
    /// # Errors
    /// Returns an [`io::Error`] if the send fails.
    pub async fn send(&self, to: SocketAddr, datagram: &[u8]) -> io::Result<()> {
        self.socket.send_to(datagram, to).await.map(|_| ())
    }
}

/// Fixture yielding a bound [`FakeVehicle`].
///
/// # Panics
/// Panics if no loopback port is available.
#[fixture]
pub async fn fake_vehicle() -> FakeVehicle {
    FakeVehicle::bind()
        .await
        .expect("failed to bind vehicle socket")
}
