//! Scramble clients: one fresh socket per exchange, explicit results.
//!
//! An exchange attempt returns `Result<String, ExchangeError>`; the
//! session loops own the retry decision, so no error ever unwinds through
//! the prompt flow.

use std::io::{self, BufRead, Read, Write};
use std::net::{TcpStream, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::net::{resolve_peer, ExchangeError, EXCHANGE_TIMEOUT, TCP_CHUNK, UDP_CHUNK};
use crate::prompt;

// ---------------------------------------------------------------------------
// Single exchanges
// ---------------------------------------------------------------------------

/// One TCP exchange: connect, send the message, read one bounded reply.
///
/// `timeout` bounds the connect and each read/write individually.
pub fn exchange_tcp(
    host: &str,
    port: u16,
    message: &str,
    timeout: Duration,
) -> Result<String, ExchangeError> {
    let peer = resolve_peer(host, port)?;
    let mut stream = TcpStream::connect_timeout(&peer, timeout)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    stream.write_all(message.as_bytes())?;

    let mut buf = [0u8; TCP_CHUNK];
    let n = stream.read(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

/// One UDP exchange: fresh ephemeral socket, one datagram out, one back.
pub fn exchange_udp(
    host: &str,
    port: u16,
    message: &str,
    timeout: Duration,
) -> Result<String, ExchangeError> {
    let peer = resolve_peer(host, port)?;
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_read_timeout(Some(timeout))?;

    socket.send_to(message.as_bytes(), peer)?;

    let mut buf = [0u8; UDP_CHUNK];
    let (n, _from) = socket.recv_from(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

// ---------------------------------------------------------------------------
// Interactive sessions
// ---------------------------------------------------------------------------

/// Interactive TCP session against `host:port`.
///
/// One line per exchange; `quit` (any casing) ends the session without
/// touching the network. A failed exchange asks the operator whether to
/// try again; declining or stdin EOF ends the session.
pub fn run_tcp_session(
    host: &str,
    port: u16,
    input: &mut impl BufRead,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    while !shutdown.load(Ordering::Relaxed) {
        let Some(message) = prompt::read_message(input)? else {
            break;
        };
        if prompt::is_quit(&message) {
            break;
        }
        match exchange_tcp(host, port, &message, EXCHANGE_TIMEOUT) {
            Ok(reply) => println!("Returned from server ({host}:{port}): {reply}"),
            Err(e) => {
                eprintln!("{e}");
                if !prompt::confirm("Try again? (y/n): ", input)? {
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Interactive UDP session against `host:port`.
///
/// Same prompt/quit loop; a failed exchange is reported and the loop goes
/// straight back to the input prompt.
pub fn run_udp_session(
    host: &str,
    port: u16,
    input: &mut impl BufRead,
    shutdown: &AtomicBool,
) -> io::Result<()> {
    while !shutdown.load(Ordering::Relaxed) {
        let Some(message) = prompt::read_message(input)? else {
            break;
        };
        if prompt::is_quit(&message) {
            break;
        }
        match exchange_udp(host, port, &message, EXCHANGE_TIMEOUT) {
            Ok(reply) => println!("Returned from server ({host}:{port}): {reply}"),
            Err(e) => eprintln!("{e}"),
        }
    }
    Ok(())
}
