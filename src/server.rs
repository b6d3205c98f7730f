//! Blocking scramble servers.
//!
//! Both servers bind an ephemeral port on all interfaces and serve one
//! exchange at a time until the shutdown flag is raised. Every blocking
//! wait is bounded so the flag is observed promptly; the sockets close by
//! drop on every exit path.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::net::{EXCHANGE_TIMEOUT, TCP_CHUNK, UDP_CHUNK};
use crate::scramble::scramble_text;

/// Longest a bounded wait lasts between shutdown-flag checks.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// TCP
// ---------------------------------------------------------------------------

/// Sequential TCP scramble server: one connection, one message, one reply.
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    /// Bind an ephemeral port on all interfaces.
    pub fn bind() -> io::Result<Self> {
        let listener = TcpListener::bind("0.0.0.0:0")?;
        listener.set_nonblocking(true)?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections in sequence until `shutdown` is set.
    ///
    /// Per-connection errors are logged and the loop keeps accepting; the
    /// next connection is not accepted before the current one closes.
    pub fn serve(&self, shutdown: &AtomicBool) -> io::Result<()> {
        while !shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    println!("\nConnected to {peer}");
                    if let Err(e) = handle_connection(stream, peer) {
                        log::warn!("[tcp] error handling {peer}: {e}");
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// One exchange: a single bounded read, scramble, a single write.
fn handle_connection(mut stream: TcpStream, peer: SocketAddr) -> io::Result<()> {
    // The listener is non-blocking; the accepted stream must not be
    // (inherited on some platforms).
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(EXCHANGE_TIMEOUT))?;
    stream.set_write_timeout(Some(EXCHANGE_TIMEOUT))?;

    let mut buf = [0u8; TCP_CHUNK];
    let n = stream.read(&mut buf)?;
    if n == 0 {
        // Peer closed without sending anything; no reply owed.
        return Ok(());
    }
    let message = std::str::from_utf8(&buf[..n])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    println!("Received from client ({peer}): {message}");

    let reply = scramble_text(message);
    stream.write_all(reply.as_bytes())?;
    println!("Sent back: {reply}");
    Ok(())
}

// ---------------------------------------------------------------------------
// UDP
// ---------------------------------------------------------------------------

/// Connectionless scramble server: one datagram in, one datagram back.
pub struct UdpServer {
    socket: UdpSocket,
}

impl UdpServer {
    /// Bind an ephemeral port on all interfaces.
    pub fn bind() -> io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        // Bounded so the serve loop can poll the shutdown flag.
        socket.set_read_timeout(Some(POLL_INTERVAL))?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Answer datagrams until `shutdown` is set.
    ///
    /// Per-datagram errors are logged and the loop continues; replies go
    /// back to the originating address from the same socket.
    pub fn serve(&self, shutdown: &AtomicBool) -> io::Result<()> {
        let mut buf = [0u8; UDP_CHUNK];
        while !shutdown.load(Ordering::Relaxed) {
            let (n, peer) = match self.socket.recv_from(&mut buf) {
                Ok(pair) => pair,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(e) => return Err(e),
            };
            if n == 0 {
                continue;
            }
            let message = match std::str::from_utf8(&buf[..n]) {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("[udp] ignoring non-UTF-8 datagram from {peer}: {e}");
                    continue;
                }
            };
            println!("\nReceived from client ({peer}): {message}");

            let reply = scramble_text(message);
            match self.socket.send_to(reply.as_bytes(), peer) {
                Ok(_) => println!("Sent back: {reply}"),
                Err(e) => log::warn!("[udp] failed to reply to {peer}: {e}"),
            }
        }
        Ok(())
    }
}
