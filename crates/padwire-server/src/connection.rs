//! Per-connection driver.
//!
//! Executes a [`Session`]'s reads and actions against a real stream. All
//! protocol decisions live in the session; this module only moves bytes.

use padwire_core::{ReadRequest, Session, SessionAction, SessionError, SessionState, wire};
use padwire_proto::Service;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::ServerError;

/// How a served connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Credential mismatch; the reject tag was sent.
    Rejected,
    /// Result written; carries its length in symbols.
    Completed {
        /// Bytes written in the result
        symbols: usize,
    },
}

/// Serve one connection for `service` until the exchange ends.
///
/// The stream is shut down on a clean close and dropped on every path, so
/// the connection never outlives this call.
///
/// # Errors
///
/// - `ServerError::Wire` if the peer disconnects early or I/O fails
/// - `ServerError::Session` if the peer violates the protocol
///
/// Nothing is written to the peer after an error.
pub async fn serve_connection<S>(
    mut stream: S,
    service: Service,
) -> Result<SessionOutcome, ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = Session::new(service);

    while let Some(request) = session.next_read() {
        let read = match request {
            ReadRequest::Credential { max_len } => wire::read_segment(&mut stream, max_len).await,
            ReadRequest::Exact(len) => wire::read_exact_bytes(&mut stream, len).await,
        };

        let bytes = match read {
            Ok(bytes) => bytes,
            Err(e) => {
                session.close();
                return Err(e.into());
            },
        };

        let actions = session.receive(bytes)?;
        let responding = session.state() == SessionState::RespondingResult;
        let (sent, closed) = execute_actions(&mut stream, actions).await?;

        if closed {
            return Ok(SessionOutcome::Rejected);
        }

        if responding {
            execute_actions(&mut stream, session.on_result_sent()?).await?;
            return Ok(SessionOutcome::Completed { symbols: sent });
        }
    }

    // next_read only returns None once the session has closed or answered
    Err(SessionError::InvalidState { state: session.state(), operation: "read" }.into())
}

/// Execute actions in order. Returns bytes sent and whether a close ran.
async fn execute_actions<S>(
    stream: &mut S,
    actions: Vec<SessionAction>,
) -> Result<(usize, bool), ServerError>
where
    S: AsyncWrite + Unpin,
{
    let mut sent = 0;

    for action in actions {
        match action {
            SessionAction::Send(bytes) => {
                wire::write_raw(stream, &bytes).await?;
                sent += bytes.len();
            },
            SessionAction::Close { reason } => {
                tracing::debug!("Closing session: {}", reason);
                // Peer may already be gone; the stream is dropped either way
                let _ = stream.shutdown().await;
                return Ok((sent, true));
            },
        }
    }

    Ok((sent, false))
}
