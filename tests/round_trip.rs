//! Loopback integration tests: real sockets, a background server thread,
//! real client exchanges.

use std::io::{self, Cursor};
use std::net::{TcpListener, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use scramble_net::client::{exchange_tcp, exchange_udp, run_tcp_session};
use scramble_net::net::ExchangeError;
use scramble_net::server::{TcpServer, UdpServer};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Stops the background server and joins its thread on drop, so a failing
/// assertion can't leak a serve loop.
struct ServerGuard {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Run a TCP scramble server on an OS-chosen port in a background thread.
fn spawn_tcp_server() -> (u16, ServerGuard) {
    let server = TcpServer::bind().expect("bind TCP server");
    let port = server.local_addr().expect("server local addr").port();
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let handle = thread::spawn(move || server.serve(&flag).expect("TCP serve loop"));
    (
        port,
        ServerGuard {
            shutdown,
            handle: Some(handle),
        },
    )
}

/// Run a UDP scramble server on an OS-chosen port in a background thread.
fn spawn_udp_server() -> (u16, ServerGuard) {
    let server = UdpServer::bind().expect("bind UDP server");
    let port = server.local_addr().expect("server local addr").port();
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    let handle = thread::spawn(move || server.serve(&flag).expect("UDP serve loop"));
    (
        port,
        ServerGuard {
            shutdown,
            handle: Some(handle),
        },
    )
}

fn sorted(word: &str) -> Vec<char> {
    let mut chars: Vec<char> = word.chars().collect();
    chars.sort_unstable();
    chars
}

/// Assert `reply` is a word-by-word anagram of `original`.
fn assert_scrambled(reply: &str, original: &str) {
    let reply_words: Vec<&str> = reply.split(' ').collect();
    let original_words: Vec<&str> = original.split_whitespace().collect();
    assert_eq!(
        reply_words.len(),
        original_words.len(),
        "word count changed: {original:?} -> {reply:?}"
    );
    for (scrambled, word) in reply_words.iter().zip(&original_words) {
        assert_eq!(
            sorted(scrambled),
            sorted(word),
            "{scrambled:?} is not an anagram of {word:?}"
        );
    }
}

/// An ephemeral port with nothing listening behind it.
fn dead_tcp_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    listener.local_addr().expect("probe addr").port()
    // listener drops here; the port is free and refuses connections
}

fn dead_udp_port() -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind probe socket");
    socket.local_addr().expect("probe addr").port()
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

/// "hello world" over TCP comes back as two tokens, anagrams of the
/// originals.
#[test]
fn tcp_round_trip_scrambles_each_word() {
    let (port, _guard) = spawn_tcp_server();

    let reply = exchange_tcp("127.0.0.1", port, "hello world", Duration::from_secs(5))
        .expect("TCP exchange");
    assert_scrambled(&reply, "hello world");
}

/// Same property over UDP.
#[test]
fn udp_round_trip_scrambles_each_word() {
    let (port, _guard) = spawn_udp_server();

    let reply = exchange_udp("127.0.0.1", port, "hello world", Duration::from_secs(5))
        .expect("UDP exchange");
    assert_scrambled(&reply, "hello world");
}

/// The TCP server is sequential: exchange A completes fully before
/// exchange B is served, and both succeed on one server.
#[test]
fn tcp_serves_sequential_connections() {
    let (port, _guard) = spawn_tcp_server();

    let first = exchange_tcp("127.0.0.1", port, "first message", Duration::from_secs(5))
        .expect("first exchange");
    assert_scrambled(&first, "first message");

    let second = exchange_tcp("127.0.0.1", port, "second longer message", Duration::from_secs(5))
        .expect("second exchange");
    assert_scrambled(&second, "second longer message");
}

// ---------------------------------------------------------------------------
// Failure paths
// ---------------------------------------------------------------------------

/// A TCP exchange against a port nobody listens on fails within the
/// configured bound with a per-exchange (recoverable) error.
#[test]
fn tcp_exchange_against_dead_port_fails_within_bound() {
    let port = dead_tcp_port();

    let started = Instant::now();
    let err = exchange_tcp("127.0.0.1", port, "hello", Duration::from_secs(5))
        .expect_err("exchange must fail");
    assert!(
        matches!(err, ExchangeError::Refused | ExchangeError::Timeout),
        "unexpected error: {err}"
    );
    assert!(
        started.elapsed() < Duration::from_secs(6),
        "failure took longer than the configured bound"
    );
}

/// A UDP exchange with no server times out after roughly the passed bound.
#[test]
fn udp_exchange_against_dead_port_times_out() {
    let port = dead_udp_port();

    let started = Instant::now();
    let err = exchange_udp("127.0.0.1", port, "hello", Duration::from_millis(300))
        .expect_err("exchange must fail");
    assert!(
        matches!(err, ExchangeError::Timeout | ExchangeError::Refused),
        "unexpected error: {err}"
    );
    assert!(started.elapsed() < Duration::from_secs(2));
}

// ---------------------------------------------------------------------------
// Session behavior
// ---------------------------------------------------------------------------

/// `quit` (any casing) ends the session before any network activity: the
/// listener observes no connection attempt at all.
#[test]
fn quit_ends_session_without_any_exchange() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("listener addr").port();
    listener.set_nonblocking(true).expect("nonblocking listener");

    let mut input = Cursor::new(b"QuIt\n".to_vec());
    let shutdown = AtomicBool::new(false);
    run_tcp_session("127.0.0.1", port, &mut input, &shutdown).expect("session");

    match listener.accept() {
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        other => panic!("expected no connection attempt, got {other:?}"),
    }
}

/// After a failed exchange the session offers a retry; declining ends the
/// session cleanly.
#[test]
fn declining_retry_ends_tcp_session() {
    let port = dead_tcp_port();

    let mut input = Cursor::new(b"hello\nn\n".to_vec());
    let shutdown = AtomicBool::new(false);
    run_tcp_session("127.0.0.1", port, &mut input, &shutdown).expect("session ends cleanly");
}
