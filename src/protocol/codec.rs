//! Length-prefixed bincode framing.
//!
//! A frame is a 4-byte big-endian payload length followed by exactly that
//! many bytes of bincode. Payloads use varint integers, reject trailing
//! bytes and are bounded by the caller's maximum frame size.

use std::fmt;
use std::io;

use bincode::Options;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::Message;

/// Size of the length prefix.
pub const HEADER_LEN: usize = 4;

/// Errors raised while framing or parsing messages.
#[derive(Debug)]
pub enum ProtocolError {
    /// The message could not be serialized.
    Encode(bincode::Error),
    /// The payload is not a valid message (unknown variant, bad field, trailing bytes).
    Decode(bincode::Error),
    /// Declared or encoded payload length exceeds the configured maximum.
    FrameTooLarge { len: u32, max: u32 },
    /// The buffer does not hold exactly one frame of the declared length.
    LengthMismatch { declared: usize, available: usize },
    /// The underlying stream failed.
    Io(io::Error),
    /// The peer closed the stream at a frame boundary.
    Closed,
}

impl ProtocolError {
    /// Whether the frame boundary can still be trusted after this error.
    ///
    /// Only a bad payload inside a well-delimited frame is recoverable; the
    /// next frame can be read normally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ProtocolError::Decode(_))
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Encode(e) => write!(f, "Serialization error: {}", e),
            ProtocolError::Decode(e) => write!(f, "Deserialization error: {}", e),
            ProtocolError::FrameTooLarge { len, max } => {
                write!(f, "Message too large: {} bytes (max: {})", len, max)
            }
            ProtocolError::LengthMismatch {
                declared,
                available,
            } => write!(
                f,
                "Frame declares {} payload bytes but {} are available",
                declared, available
            ),
            ProtocolError::Io(e) => write!(f, "I/O error: {}", e),
            ProtocolError::Closed => write!(f, "Connection closed by peer"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Encode(e) | ProtocolError::Decode(e) => Some(&**e),
            ProtocolError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProtocolError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            ProtocolError::Closed
        } else {
            ProtocolError::Io(err)
        }
    }
}

fn options(max: u32) -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(max as u64)
        .reject_trailing_bytes()
}

/// Serialize `msg` into a payload no larger than `max` bytes.
pub fn encode_payload(msg: &Message, max: u32) -> Result<Vec<u8>, ProtocolError> {
    options(max).serialize(msg).map_err(|e| {
        if matches!(*e, bincode::ErrorKind::SizeLimit) {
            ProtocolError::FrameTooLarge {
                len: max.saturating_add(1),
                max,
            }
        } else {
            ProtocolError::Encode(e)
        }
    })
}

/// Parse a single payload (no length prefix).
pub fn decode_payload(payload: &[u8], max: u32) -> Result<Message, ProtocolError> {
    options(max)
        .deserialize(payload)
        .map_err(ProtocolError::Decode)
}

/// Encode `msg` as a complete frame: length prefix plus payload.
pub fn encode_frame(msg: &Message, max: u32) -> Result<Vec<u8>, ProtocolError> {
    let data = encode_payload(msg, max)?;
    let mut frame = Vec::with_capacity(HEADER_LEN + data.len());
    frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
    frame.extend_from_slice(&data);
    Ok(frame)
}

/// Decode a buffer holding exactly one frame.
pub fn decode_frame(buf: &[u8], max: u32) -> Result<Message, ProtocolError> {
    let header: [u8; HEADER_LEN] = buf
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(ProtocolError::LengthMismatch {
            declared: HEADER_LEN,
            available: buf.len(),
        })?;
    let len = u32::from_be_bytes(header);
    if len > max {
        return Err(ProtocolError::FrameTooLarge { len, max });
    }
    let payload = &buf[HEADER_LEN..];
    if payload.len() != len as usize {
        return Err(ProtocolError::LengthMismatch {
            declared: len as usize,
            available: payload.len(),
        });
    }
    decode_payload(payload, max)
}

/// Read one frame from `reader`.
///
/// A clean end of stream before the length prefix yields `Closed`; a stream
/// that ends inside a frame yields `Closed` as well since the frame is lost.
pub async fn read_message<R>(reader: &mut R, max: u32) -> Result<Message, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; HEADER_LEN];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);

    // Bounded read length check to prevent excessive memory allocation
    if len > max {
        return Err(ProtocolError::FrameTooLarge { len, max });
    }

    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    decode_payload(&buf, max)
}

/// Write one frame to `writer` and flush it.
pub async fn write_message<W>(writer: &mut W, msg: &Message, max: u32) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(msg, max)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}
