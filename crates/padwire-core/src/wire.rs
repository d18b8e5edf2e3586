//! Async stream helpers implementing the framing contract.
//!
//! TCP does not preserve message boundaries: a single write may arrive in
//! many reads, and a read may return fewer bytes than asked for. Readers
//! here loop until the declared count has arrived; writers loop until every
//! byte is accepted. A zero-byte read or write before the target is reached
//! means the peer closed the connection, which is always fatal.
//!
//! Generic over tokio's `AsyncRead`/`AsyncWrite` so the same code runs on
//! TCP streams, in-memory duplex pipes, and simulated networks.

use std::io;

use bytes::{Bytes, BytesMut};
use padwire_proto::Frame;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::WireError;

/// Fill `buf` completely, accumulating partial reads.
///
/// # Errors
///
/// - `WireError::PeerClosed` if a read returns zero bytes first
/// - `WireError::Io` for transport errors
pub async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<(), WireError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => return Err(WireError::PeerClosed { expected: buf.len(), received: filled }),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Read exactly `len` bytes into a fresh buffer.
///
/// # Errors
///
/// Same as [`read_full`].
pub async fn read_exact_bytes<R>(reader: &mut R, len: usize) -> Result<Bytes, WireError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::zeroed(len);
    read_full(reader, &mut buf).await?;
    Ok(buf.freeze())
}

/// One read of at most `max_len` bytes, for unframed handshake segments.
///
/// # Errors
///
/// - `WireError::PeerClosed` if the read returns zero bytes
/// - `WireError::Io` for transport errors
pub async fn read_segment<R>(reader: &mut R, max_len: usize) -> Result<Bytes, WireError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::zeroed(max_len);
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => return Err(WireError::PeerClosed { expected: 1, received: 0 }),
            Ok(n) => {
                buf.truncate(n);
                return Ok(buf.freeze());
            },
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write all of `bytes` unframed and flush.
///
/// # Errors
///
/// - `WireError::PeerClosed` if the stream stops accepting bytes
/// - `WireError::Io` for transport errors
pub async fn write_raw<W>(writer: &mut W, bytes: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let result = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    result.map_err(|e| match e.kind() {
        io::ErrorKind::WriteZero => WireError::PeerClosed { expected: bytes.len(), received: 0 },
        _ => e.into(),
    })
}

/// Write one length-prefixed frame.
///
/// # Errors
///
/// - `WireError::Protocol` if the frame cannot be encoded
/// - errors from [`write_raw`]
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = BytesMut::with_capacity(frame.wire_len());
    frame.encode(&mut buf)?;
    write_raw(writer, &buf).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::duplex;

    use super::*;

    #[tokio::test]
    async fn read_full_accumulates_small_chunks() {
        let (mut tx, mut rx) = duplex(2);

        let writer = tokio::spawn(async move {
            for chunk in b"ABCDEFG".chunks(2) {
                tx.write_all(chunk).await.unwrap();
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        });

        let bytes = read_exact_bytes(&mut rx, 7).await.unwrap();
        assert_eq!(&bytes[..], b"ABCDEFG");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn read_full_reports_premature_close() {
        let (mut tx, mut rx) = duplex(64);
        tx.write_all(b"ABC").await.unwrap();
        drop(tx);

        let err = read_exact_bytes(&mut rx, 5).await.unwrap_err();
        assert!(matches!(err, WireError::PeerClosed { expected: 5, received: 3 }));
    }

    #[tokio::test]
    async fn read_segment_returns_one_read() {
        let (mut tx, mut rx) = duplex(64);
        tx.write_all(b"4321").await.unwrap();

        let segment = read_segment(&mut rx, 9).await.unwrap();
        assert_eq!(&segment[..], b"4321");
    }

    #[tokio::test]
    async fn read_segment_is_bounded() {
        let (mut tx, mut rx) = duplex(64);
        tx.write_all(b"0123456789ABCDEF").await.unwrap();

        let segment = read_segment(&mut rx, 9).await.unwrap();
        assert_eq!(&segment[..], b"012345678");
    }

    #[tokio::test]
    async fn read_segment_on_closed_stream() {
        let (tx, mut rx) = duplex(64);
        drop(tx);
        assert!(read_segment(&mut rx, 9).await.unwrap_err().is_disconnect());
    }

    #[tokio::test]
    async fn frame_through_tiny_pipe() {
        let (mut tx, mut rx) = duplex(3);
        let payload = vec![b'Q'; 1000];
        let frame = Frame::new(payload.clone());

        let writer = tokio::spawn(async move { write_frame(&mut tx, &frame).await });

        let prefix = read_exact_bytes(&mut rx, 4).await.unwrap();
        assert_eq!(&prefix[..], &1000u32.to_be_bytes());
        let received = read_exact_bytes(&mut rx, 1000).await.unwrap();
        assert_eq!(&received[..], &payload[..]);
        writer.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn write_frame_rejects_empty_payload() {
        let (mut tx, mut rx) = duplex(64);

        let err = write_frame(&mut tx, &Frame::new(Vec::new())).await.unwrap_err();
        assert!(matches!(err, WireError::Protocol(_)));

        drop(tx);
        assert!(read_segment(&mut rx, 9).await.unwrap_err().is_disconnect(), "nothing written");
    }

    #[tokio::test]
    async fn write_to_closed_peer_fails() {
        let (mut tx, rx) = duplex(4);
        drop(rx);

        let err = write_raw(&mut tx, b"ABCDEFGH").await.unwrap_err();
        assert!(err.is_disconnect(), "unexpected error: {err}");
    }
}
