//! Client side of one exchange.

use bytes::Bytes;
use padwire_core::wire;
use padwire_proto::{Frame, HandshakeReply, MAX_HANDSHAKE_REPLY_LEN, Service};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};

use crate::{error::ClientError, request::Request};

/// Sends requests to one service at one address.
#[derive(Debug, Clone)]
pub struct Requester {
    addr: String,
    service: Service,
}

impl Requester {
    /// Requester for `service` listening at `addr` (`host:port`).
    pub fn new(addr: impl Into<String>, service: Service) -> Self {
        Self { addr: addr.into(), service }
    }

    /// Connect over TCP and run one exchange.
    ///
    /// # Errors
    ///
    /// `ClientError::Connect` if the server cannot be reached, otherwise the
    /// errors of [`Requester::exchange_over`].
    pub async fn exchange(&self, request: &Request) -> Result<Bytes, ClientError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|source| ClientError::Connect { addr: self.addr.clone(), source })?;

        tracing::debug!("Connected to {} service at {}", self.service, self.addr);
        self.exchange_over(stream, request).await
    }

    /// Run one exchange over an already connected stream.
    ///
    /// Returns exactly `request.payload().len()` bytes.
    ///
    /// # Errors
    ///
    /// - `ClientError::HandshakeRejected` unless the reply is this service's
    ///   accept tag, exactly
    /// - `ClientError::Wire` if the stream fails or closes early
    pub async fn exchange_over<S>(
        &self,
        mut stream: S,
        request: &Request,
    ) -> Result<Bytes, ClientError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        wire::write_raw(&mut stream, self.service.credential()).await?;

        let reply = wire::read_segment(&mut stream, MAX_HANDSHAKE_REPLY_LEN).await?;
        if !HandshakeReply::parse(&reply).is_accepted_for(self.service) {
            return Err(ClientError::HandshakeRejected {
                reply: String::from_utf8_lossy(&reply).into_owned(),
            });
        }

        wire::write_frame(&mut stream, &Frame::new(request.key().clone())).await?;
        wire::write_frame(&mut stream, &Frame::new(request.payload().clone())).await?;

        let result = wire::read_exact_bytes(&mut stream, request.payload().len()).await?;
        tracing::debug!("Received {} symbols", result.len());

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex};

    use super::*;

    #[tokio::test]
    async fn sends_credential_then_frames() {
        let (client, mut server) = duplex(1024);
        let requester = Requester::new("unused:0", Service::Encode);
        let request = Request::new("BB", "ZA").unwrap();

        let peer = tokio::spawn(async move {
            let mut credential = [0u8; 4];
            server.read_exact(&mut credential).await.unwrap();
            assert_eq!(&credential, b"4321");
            server.write_all(b"enc").await.unwrap();

            let mut frames = [0u8; 12];
            server.read_exact(&mut frames).await.unwrap();
            assert_eq!(&frames, b"\0\0\0\x02BB\0\0\0\x02ZA");
            server.write_all(b" B").await.unwrap();
        });

        let result = requester.exchange_over(client, &request).await.unwrap();
        assert_eq!(&result[..], b" B");
        peer.await.unwrap();
    }

    #[tokio::test]
    async fn reject_tag_fails_handshake() {
        let (client, mut server) = duplex(1024);
        let requester = Requester::new("unused:0", Service::Decode);
        let request = Request::new("A", "A").unwrap();

        tokio::spawn(async move {
            let mut credential = [0u8; 4];
            server.read_exact(&mut credential).await.unwrap();
            server.write_all(b"reject").await.unwrap();
        });

        let err = requester.exchange_over(client, &request).await.unwrap_err();
        assert!(matches!(err, ClientError::HandshakeRejected { ref reply } if reply == "reject"));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn other_service_tag_fails_handshake() {
        let (client, mut server) = duplex(1024);
        let requester = Requester::new("unused:0", Service::Decode);
        let request = Request::new("A", "A").unwrap();

        tokio::spawn(async move {
            let mut credential = [0u8; 4];
            server.read_exact(&mut credential).await.unwrap();
            server.write_all(b"enc").await.unwrap();
        });

        let err = requester.exchange_over(client, &request).await.unwrap_err();
        assert!(matches!(err, ClientError::HandshakeRejected { .. }));
    }

    #[tokio::test]
    async fn short_result_is_transfer_error() {
        let (client, mut server) = duplex(1024);
        let requester = Requester::new("unused:0", Service::Encode);
        let request = Request::new("ABC", "ABC").unwrap();

        tokio::spawn(async move {
            let mut credential = [0u8; 4];
            server.read_exact(&mut credential).await.unwrap();
            server.write_all(b"enc").await.unwrap();
            let mut frames = [0u8; 14];
            server.read_exact(&mut frames).await.unwrap();
            server.write_all(b"A").await.unwrap();
        });

        let err = requester.exchange_over(client, &request).await.unwrap_err();
        assert!(matches!(err, ClientError::Wire(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_connect_error() {
        // Bind then drop to find a port with no listener
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let requester = Requester::new(addr.to_string(), Service::Encode);
        let err = requester.exchange(&Request::new("A", "A").unwrap()).await.unwrap_err();
        assert!(matches!(err, ClientError::Connect { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
