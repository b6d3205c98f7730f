//! Shared networking plumbing: buffer sizes, timeouts, error
//! classification, peer resolution, and local-address discovery.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use thiserror::Error;

/// Bound on a single TCP message read, both directions.
pub const TCP_CHUNK: usize = 1024;

/// Receive buffer bound for one UDP datagram.
pub const UDP_CHUNK: usize = 2048;

/// Connect/receive bound for one client exchange.
pub const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Well-known external address used only to learn our outbound source IP.
const PROBE_ADDR: &str = "8.8.8.8:80";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from one request/response exchange.
///
/// Every variant is per-exchange: the session loop reports it and the
/// operator decides whether to try again.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("timed out waiting for the server")]
    Timeout,
    #[error("connection refused (is the server running?)")]
    Refused,
    #[error("cannot resolve peer address: {0}")]
    Resolve(String),
    #[error("network error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for ExchangeError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            io::ErrorKind::ConnectionRefused => Self::Refused,
            _ => Self::Io(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Address helpers
// ---------------------------------------------------------------------------

/// Resolve a free-text host plus port to the first usable socket address.
pub fn resolve_peer(host: &str, port: u16) -> Result<SocketAddr, ExchangeError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| ExchangeError::Resolve(e.to_string()))?
        .next()
        .ok_or_else(|| ExchangeError::Resolve(format!("{host}:{port} has no addresses")))
}

/// Discover the local interface's outbound IP address.
///
/// "Connecting" a UDP socket sends nothing; the routing table alone picks
/// the source address we read back. The result is only displayed, so
/// failure falls back to loopback.
pub fn local_ip() -> IpAddr {
    match probe_local_ip() {
        Ok(ip) => ip,
        Err(e) => {
            log::warn!("[net] local address discovery failed ({e}); showing loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn probe_local_ip() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}
