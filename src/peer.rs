#![cfg(feature = "std")]
//! Per-connection reader and writer tasks.
//!
//! A `PeerLink` is what a session holds for one connection: a receiver of
//! decoded inbound events and a sender of outbound messages. Each connection
//! gets a reader task (socket → events) and a writer task (messages →
//! socket), so the session never blocks on I/O and every peer has exactly
//! one writer.

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::SessionConfig;
use crate::protocol::{read_message, write_message, Message, ProtocolError};
use crate::registry::ConnectionId;

/// What the reader task reports to the session.
#[derive(Debug)]
pub enum PeerEvent {
    /// A well-formed message.
    Message(Message),
    /// A frame whose payload could not be decoded; the stream is still usable.
    Malformed(String),
    /// The connection is gone; no more events follow.
    Closed(String),
}

/// The session's handle on one connected peer.
pub struct PeerLink {
    id: ConnectionId,
    inbound: mpsc::Receiver<PeerEvent>,
    outbound: Option<mpsc::Sender<Message>>,
    reader: Option<JoinHandle<()>>,
}

impl PeerLink {
    /// Build a link from raw channels, for callers that bring their own I/O.
    pub fn from_channels(
        id: ConnectionId,
        inbound: mpsc::Receiver<PeerEvent>,
        outbound: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            id,
            inbound,
            outbound: Some(outbound),
            reader: None,
        }
    }

    /// Spawn reader and writer tasks for `stream` and return the link.
    ///
    /// Dropping the link (or calling [`PeerLink::close`]) stops the reader
    /// and ends the writer, which shuts down the stream once the queue drains.
    pub fn spawn<S>(id: ConnectionId, stream: S, config: &SessionConfig) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
        let (msg_tx, msg_rx) = mpsc::channel(config.channel_capacity);
        let reader = tokio::spawn(read_loop(id, reader, event_tx, config.max_frame_size));
        tokio::spawn(write_loop(id, writer, msg_rx, config.max_frame_size));
        let mut link = Self::from_channels(id, event_rx, msg_tx);
        link.reader = Some(reader);
        link
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue `msg` for this peer. Fails once the writer is gone.
    pub async fn send(&self, msg: Message) -> anyhow::Result<()> {
        let tx = self
            .outbound
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("link {} already closed", self.id))?;
        tx.send(msg)
            .await
            .map_err(|_| anyhow::anyhow!("peer {} writer has stopped", self.id))
    }

    /// Next inbound event. A closed channel reads as `Closed`.
    pub async fn recv(&mut self) -> PeerEvent {
        match self.inbound.recv().await {
            Some(event) => event,
            None => PeerEvent::Closed("reader stopped".into()),
        }
    }

    /// Stop both directions. The reader is aborted at once; the writer
    /// flushes what is queued and then closes the stream.
    pub fn close(&mut self) {
        self.outbound = None;
        self.inbound.close();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_none()
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

async fn read_loop<R>(id: ConnectionId, mut reader: R, events: mpsc::Sender<PeerEvent>, max: u32)
where
    R: AsyncRead + Unpin,
{
    loop {
        let event = match read_message(&mut reader, max).await {
            Ok(msg) => {
                debug!("{} -> {}", id, msg.kind());
                PeerEvent::Message(msg)
            }
            Err(e) if e.is_recoverable() => {
                warn!("{} sent a malformed frame: {}", id, e);
                PeerEvent::Malformed(e.to_string())
            }
            Err(ProtocolError::Closed) => {
                debug!("{} closed the connection", id);
                let _ = events.send(PeerEvent::Closed("connection closed".into())).await;
                return;
            }
            Err(e) => {
                warn!("{} read failed: {}", id, e);
                let _ = events.send(PeerEvent::Closed(e.to_string())).await;
                return;
            }
        };
        if events.send(event).await.is_err() {
            // session no longer listening
            return;
        }
    }
}

async fn write_loop<W>(id: ConnectionId, mut writer: W, mut messages: mpsc::Receiver<Message>, max: u32)
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = messages.recv().await {
        debug!("{} <- {}", id, msg.kind());
        if let Err(e) = write_message(&mut writer, &msg, max).await {
            warn!("{} write failed: {}", id, e);
            return;
        }
    }
    let _ = writer.shutdown().await;
}
