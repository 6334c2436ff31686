//! Length-prefixed framing on the comm stream (C2): a 4-byte big-endian
//! length followed by that many UTF-8 bytes of JSON. The data stream carries
//! raw bytes with no framing and is written to directly by the session.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FramingError, TransportError};

/// Frames larger than this are rejected rather than trusted blindly off the
/// wire; no real JSON-RPC request in this protocol approaches it.
pub const MAX_FRAME_LEN: u32 = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameReadError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Framing(#[from] FramingError),
}

/// Reads one framed message. Returns `Ok(None)` on a clean EOF at the frame
/// boundary (no bytes of a new size prefix were read); any other I/O error,
/// including a partial size prefix, is a [`TransportError`]. A short read of
/// the payload after a valid size prefix is a [`FramingError::ShortRead`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, FrameReadError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let mut filled = 0usize;

    while filled < len_buf.len() {
        let n = reader
            .read(&mut len_buf[filled..])
            .await
            .map_err(TransportError::Io)?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed mid size-prefix",
            ))
            .into());
        }
        filled += n;
    }

    let size = u32::from_be_bytes(len_buf);
    if size > MAX_FRAME_LEN {
        return Err(FramingError::OversizedFrame { size, max: MAX_FRAME_LEN }.into());
    }

    let mut body = vec![0u8; size as usize];
    reader
        .read_exact(&mut body)
        .await
        .map_err(|source| FramingError::ShortRead { expected: size, source })?;

    std::str::from_utf8(&body).map_err(FramingError::InvalidUtf8)?;

    Ok(Some(body))
}

/// Writes one framed message: the 4-byte big-endian length followed by
/// `body`. Callers on the comm stream must hold the session's comm-write
/// mutex across this call so responses and log notifications never
/// interleave.
pub async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    let len = u32::try_from(body.len()).expect("frame body fits in u32");
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}
