//! Entry point for `scramble-net`.
//!
//! Parses CLI arguments and dispatches into server or client mode, or
//! into the interactive menu when no subcommand is given. All socket work
//! lives in the library; `main.rs` owns process setup (logging, signal
//! handling, argument parsing) and the menu flow.

use std::io::{self, BufRead};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use scramble_net::client::{run_tcp_session, run_udp_session};
use scramble_net::net::local_ip;
use scramble_net::prompt;
use scramble_net::server::{TcpServer, UdpServer};

const BANNER_TITLE: &str = "Socket Scramble CLI";

/// Interactive TCP/UDP word-scramble server and client.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Run a scramble server, skipping the interactive menu.
    Serve {
        /// Transport protocol to serve on.
        #[arg(value_enum)]
        protocol: Protocol,
    },
    /// Run a scramble client, skipping the interactive menu.
    Connect {
        /// Transport protocol to use.
        #[arg(value_enum)]
        protocol: Protocol,
        /// Server host name or IP address.
        host: String,
        /// Server port number.
        port: u16,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    fn name(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Warnings (e.g. per-connection failures) should be visible without
    // RUST_LOG; set RUST_LOG to raise or lower verbosity.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&shutdown))
        .context("failed to register SIGINT handler")?;

    let cli = Cli::parse();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    match cli.mode {
        Some(Mode::Serve { protocol }) => run_server(protocol, &shutdown)?,
        Some(Mode::Connect {
            protocol,
            host,
            port,
        }) => run_client(protocol, &host, port, &mut input, &shutdown)?,
        None => run_menu(&shutdown, &mut input)?,
    }

    println!("\nThanks for using the scramble CLI. Goodbye!");
    Ok(())
}

/// Full interactive flow: protocol, role, and (for clients) peer details.
fn run_menu(shutdown: &AtomicBool, input: &mut impl BufRead) -> anyhow::Result<()> {
    prompt::banner(BANNER_TITLE);

    let Some(choice) = prompt::choose("What protocol would you like to use?", &["TCP", "UDP"], input)?
    else {
        return Ok(());
    };
    let protocol = if choice == 0 { Protocol::Tcp } else { Protocol::Udp };

    let question = format!(
        "Do you want to run as a {} server or client?",
        protocol.name()
    );
    let Some(role) = prompt::choose(&question, &["Server", "Client"], input)? else {
        return Ok(());
    };

    if role == 0 {
        run_server(protocol, shutdown)?;
    } else {
        println!("\nEnter the server details:");
        let Some(host) = prompt::read_host(input)? else {
            return Ok(());
        };
        let Some(port) = prompt::read_port(input)? else {
            return Ok(());
        };
        run_client(protocol, &host, port, input, shutdown)?;
    }
    Ok(())
}

/// Bind, announce the listening address, and serve until Ctrl+C.
fn run_server(protocol: Protocol, shutdown: &AtomicBool) -> anyhow::Result<()> {
    match protocol {
        Protocol::Tcp => {
            let server = TcpServer::bind().context("failed to bind TCP server")?;
            announce("TCP", server.local_addr()?.port(), "connections");
            server.serve(shutdown).context("TCP server failed")?;
        }
        Protocol::Udp => {
            let server = UdpServer::bind().context("failed to bind UDP server")?;
            announce("UDP", server.local_addr()?.port(), "messages");
            server.serve(shutdown).context("UDP server failed")?;
        }
    }
    println!("\nServer shutdown gracefully.");
    Ok(())
}

/// Print the details a client needs to connect.
fn announce(proto: &str, port: u16, waiting_for: &str) {
    prompt::banner(BANNER_TITLE);
    println!("\n{proto} server started");
    println!("Server IP: {}", local_ip());
    println!("Server port: {port}");
    println!("\nGive these details to the client to connect.");
    println!("\nWaiting for {waiting_for}... (press Ctrl+C to quit)");
}

/// Client session loop for the chosen protocol.
fn run_client(
    protocol: Protocol,
    host: &str,
    port: u16,
    input: &mut impl BufRead,
    shutdown: &AtomicBool,
) -> anyhow::Result<()> {
    prompt::banner(BANNER_TITLE);
    println!("\n{} client started", protocol.name());
    println!("Connecting to server at {host} on port {port}");
    println!("Type 'quit' to exit");

    match protocol {
        Protocol::Tcp => run_tcp_session(host, port, input, shutdown)?,
        Protocol::Udp => run_udp_session(host, port, input, shutdown)?,
    }
    Ok(())
}
