pub mod client;
pub mod net;
pub mod prompt;
pub mod scramble;
pub mod server;

pub use client::{exchange_tcp, exchange_udp};
pub use net::{local_ip, ExchangeError, EXCHANGE_TIMEOUT};
pub use scramble::scramble_text;
pub use server::{TcpServer, UdpServer};
