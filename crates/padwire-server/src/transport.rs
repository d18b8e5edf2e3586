//! TCP listener.
//!
//! Binds with an explicit accept backlog, which `TcpListener::bind` does not
//! expose. The backlog bounds connections waiting to be accepted, not the
//! number of live sessions.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpSocket, TcpStream};

use crate::error::ServerError;

/// Listening TCP socket.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Bind and listen on `address` with the given accept backlog.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(address: &str, backlog: u32) -> Result<Self, ServerError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid bind address '{address}': {e}")))?;

        let socket = if addr.is_ipv4() { TcpSocket::new_v4() } else { TcpSocket::new_v6() }
            .map_err(|e| ServerError::Transport(format!("failed to open socket: {e}")))?;

        socket
            .set_reuseaddr(true)
            .map_err(|e| ServerError::Transport(format!("failed to set SO_REUSEADDR: {e}")))?;

        socket
            .bind(addr)
            .map_err(|e| ServerError::Transport(format!("failed to bind {addr}: {e}")))?;

        let listener = socket
            .listen(backlog)
            .map_err(|e| ServerError::Transport(format!("failed to listen on {addr}: {e}")))?;

        tracing::info!("TCP transport bound to {} (backlog {})", addr, backlog);

        Ok(Self { listener })
    }

    /// Accept the next connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ServerError> {
        self.listener
            .accept()
            .await
            .map_err(|e| ServerError::Transport(format!("accept failed: {e}")))
    }

    /// Local address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::Transport(format!("failed to get local address: {e}")))
    }
}
