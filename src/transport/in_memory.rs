#![cfg(feature = "std")]

use tokio::io::{duplex, DuplexStream};

use crate::transport::stream::StreamTransport;

/// Bytes buffered in each direction of an in-memory pipe.
const PIPE_CAPACITY: usize = 64 * 1024;

/// A framed transport over an in-process byte pipe.
///
/// Messages go through the same length-prefixed codec as TCP, so tests using
/// it exercise the real wire format.
pub type InMemoryTransport = StreamTransport<DuplexStream>;

impl InMemoryTransport {
    /// Two transports connected to each other.
    pub fn pair() -> (Self, Self) {
        let (a, b) = duplex(PIPE_CAPACITY);
        (Self::new(a), Self::new(b))
    }
}

/// A raw server-side stream plus a framed client transport connected to it.
///
/// The stream end is what a session's peer link is spawned on.
pub fn pipe() -> (DuplexStream, InMemoryTransport) {
    let (server, client) = duplex(PIPE_CAPACITY);
    (server, StreamTransport::new(client))
}
