//! Length-prefixed framing for RPC messages.
//!
//! Each frame on the wire:
//!
//! ```text
//! [payload_len: 4 bytes BE][postcard payload]
//! ```
//!
//! A connection carries any number of frames back to back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::errors::{KeeperError, Result};

/// Upper bound on a single payload (16 MiB).
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Serialize a message into a postcard payload.
pub fn encode<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    postcard::to_stdvec(msg).map_err(|e| KeeperError::Protocol(format!("encode failed: {e}")))
}

/// Deserialize a postcard payload.
pub fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T> {
    postcard::from_bytes(payload).map_err(|e| KeeperError::Protocol(format!("decode failed: {e}")))
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_LEN {
        return Err(KeeperError::Protocol(format!(
            "frame of {} bytes exceeds the {MAX_FRAME_LEN} byte limit",
            payload.len()
        )));
    }
    // Bounded by MAX_FRAME_LEN above.
    let len = payload.len() as u32;

    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame.
///
/// Returns `Ok(None)` when the peer closed the connection cleanly
/// between frames.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_FRAME_LEN {
        return Err(KeeperError::Protocol(format!(
            "incoming frame of {len} bytes exceeds the {MAX_FRAME_LEN} byte limit"
        )));
    }

    // Grows as bytes arrive; a bare length header pins no memory.
    let mut payload = Vec::new();
    (&mut *reader).take(len as u64).read_to_end(&mut payload).await?;
    if payload.len() != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("frame truncated after {} of {len} bytes", payload.len()),
        )
        .into());
    }
    Ok(Some(payload))
}

/// Encode and write a message.
pub async fn send<W, T>(writer: &mut W, msg: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    write_frame(writer, &encode(msg)?).await
}

/// Read and decode a message. `Ok(None)` on clean close.
pub async fn recv<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    match read_frame(reader).await? {
        Some(payload) => decode(&payload).map(Some),
        None => Ok(None),
    }
}
