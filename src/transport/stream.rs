#![cfg(feature = "std")]

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::config::MAX_FRAME_SIZE;
use crate::protocol::{read_message, write_message, Message};
use crate::transport::Transport;

/// Default timeout for network operations (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `Transport` over any async byte stream using length-prefixed frames.
pub struct StreamTransport<S> {
    stream: S,
    timeout_duration: Option<Duration>,
    max_frame_size: u32,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            timeout_duration: Some(DEFAULT_TIMEOUT),
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// `None` waits indefinitely on both send and receive.
    pub fn with_timeout(stream: S, timeout_duration: Option<Duration>) -> Self {
        Self {
            stream,
            timeout_duration,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    pub fn with_config(stream: S, timeout_duration: Option<Duration>, max_frame_size: u32) -> Self {
        Self {
            stream,
            timeout_duration,
            max_frame_size,
        }
    }

    /// Give back the underlying stream, e.g. to write raw bytes in tests.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl StreamTransport<TcpStream> {
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

/// A `Transport` over a TCP connection.
pub type TcpTransport = StreamTransport<TcpStream>;

#[async_trait::async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let max = self.max_frame_size;
        let limit = self.timeout_duration;
        let op = write_message(&mut self.stream, &msg, max);
        match limit {
            Some(limit) => timeout(limit, op)
                .await
                .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", limit))?
                .map_err(anyhow::Error::from),
            None => op.await.map_err(anyhow::Error::from),
        }
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let max = self.max_frame_size;
        let limit = self.timeout_duration;
        let op = read_message(&mut self.stream, max);
        match limit {
            Some(limit) => timeout(limit, op)
                .await
                .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", limit))?
                .map_err(anyhow::Error::from),
            None => op.await.map_err(anyhow::Error::from),
        }
    }
}
