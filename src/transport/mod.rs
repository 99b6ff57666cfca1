use crate::protocol::Message;

/// A framed, message-level connection as seen by a client.
#[async_trait::async_trait]
pub trait Transport: Send {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

#[cfg(feature = "std")]
pub mod stream;
#[cfg(feature = "std")]
pub mod in_memory;
