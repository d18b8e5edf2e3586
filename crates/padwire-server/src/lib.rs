//! Padwire cipher services.
//!
//! Production glue around [`padwire_core`]'s Sans-IO [`Session`]: a TCP
//! listener that hands every accepted connection to its own Tokio task, and
//! a driver that executes session actions against the stream.
//!
//! # Components
//!
//! - [`Server`]: bind, accept forever, spawn one task per connection
//! - [`serve_connection`]: drives one session over any async stream
//! - [`TcpTransport`]: TCP listener with an explicit accept backlog
//!
//! Sessions share no state. A failing session is logged inside its task and
//! never reaches the accept loop.
//!
//! [`Session`]: padwire_core::Session

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
mod connection;
mod error;
mod transport;

use std::{net::SocketAddr, time::Duration};

pub use connection::{SessionOutcome, serve_connection};
pub use error::ServerError;
use padwire_proto::Service;
pub use transport::TcpTransport;

/// Pending-connection queue length requested from the OS.
pub const DEFAULT_BACKLOG: u32 = 5;

/// First pause after a failed accept.
const ACCEPT_BACKOFF_MIN: Duration = Duration::from_millis(10);

/// Longest pause between failed accepts.
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Pause before retrying after `failures` consecutive accept errors.
///
/// Doubles from [`ACCEPT_BACKOFF_MIN`] up to [`ACCEPT_BACKOFF_MAX`], so a
/// persistent failure such as descriptor exhaustion does not spin the loop.
fn accept_backoff(failures: u32) -> Duration {
    ACCEPT_BACKOFF_MIN
        .saturating_mul(2u32.saturating_pow(failures.saturating_sub(1)))
        .min(ACCEPT_BACKOFF_MAX)
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:5000")
    pub bind_address: String,
    /// Which transform this server offers
    pub service: Service,
    /// Accept backlog passed to `listen`
    pub backlog: u32,
}

impl ServerRuntimeConfig {
    /// Listen on every IPv4 interface at `port`.
    pub fn for_port(service: Service, port: u16) -> Self {
        Self { bind_address: format!("0.0.0.0:{port}"), service, ..Self::default() }
    }
}

impl Default for ServerRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:0".to_string(),
            service: Service::Encode,
            backlog: DEFAULT_BACKLOG,
        }
    }
}

/// Production padwire server.
pub struct Server {
    transport: TcpTransport,
    service: Service,
}

impl Server {
    /// Create and bind a new server.
    ///
    /// # Errors
    ///
    /// `ServerError::Config` for an unparsable address, `ServerError::Transport`
    /// if the socket cannot be bound.
    pub fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let transport = TcpTransport::bind(&config.bind_address, config.backlog)?;
        Ok(Self { transport, service: config.service })
    }

    /// Run the server, accepting connections forever.
    ///
    /// Each connection runs in a detached task; the loop never waits on one.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("{} server starting on {}", self.service, self.transport.local_addr()?);

        let mut failures = 0u32;

        loop {
            match self.transport.accept().await {
                Ok((stream, peer)) => {
                    failures = 0;
                    let service = self.service;
                    tokio::spawn(async move {
                        handle_connection(stream, peer, service).await;
                    });
                },
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let pause = accept_backoff(failures);
                    tracing::error!("Accept error: {} (retrying in {:?})", e, pause);
                    tokio::time::sleep(pause).await;
                },
            }
        }
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.transport.local_addr()
    }
}

/// Serve one accepted TCP connection and log how it ended.
async fn handle_connection(stream: tokio::net::TcpStream, peer: SocketAddr, service: Service) {
    tracing::debug!("New connection from {}", peer);

    match serve_connection(stream, service).await {
        Ok(SessionOutcome::Completed { symbols }) => {
            tracing::debug!("Served {} symbols to {}", symbols, peer);
        },
        Ok(SessionOutcome::Rejected) => {
            tracing::debug!("Rejected handshake from {}", peer);
        },
        Err(e) if e.is_disconnect() => {
            tracing::debug!("Connection {} closed early: {}", peer, e);
        },
        Err(e) => {
            tracing::warn!("Session with {} failed: {}", peer, e);
        },
    }
}
