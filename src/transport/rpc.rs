//! RPC-style transport.
//!
//! Some instruments are reached through an RPC layer (VXI-11/VISA) whose
//! calls already own message boundaries: a query either returns the complete
//! reply or fails, so no framing heuristic is needed. [`RpcTransport`]
//! adapts any [`RpcChannel`] to the common [`Transport`] contract; a concrete
//! hardware binding implements `RpcChannel` against its client library, and
//! tests drive the same code through [`MockRpcChannel`] or the higher-level
//! [`crate::transport::MockTransport`].

use async_trait::async_trait;

use crate::error::{Result, SweepError};
use crate::transport::Transport;

/// One RPC connection with call-level message boundaries.
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Write command text; no reply expected.
    async fn write(&mut self, text: &str) -> Result<()>;

    /// Write query text and block until the complete reply is available.
    async fn ask(&mut self, text: &str) -> Result<String>;

    /// Release the underlying connection.
    async fn close(&mut self) -> Result<()>;
}

/// [`Transport`] over an [`RpcChannel`].
pub struct RpcTransport {
    channel: Option<Box<dyn RpcChannel>>,
}

impl RpcTransport {
    /// Wrap an open channel.
    pub fn new(channel: Box<dyn RpcChannel>) -> Self {
        Self {
            channel: Some(channel),
        }
    }

    fn channel_mut(&mut self) -> Result<&mut Box<dyn RpcChannel>> {
        self.channel.as_mut().ok_or(SweepError::ConnectionClosed)
    }
}

#[async_trait]
impl Transport for RpcTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.channel_mut()?.write(text).await
    }

    async fn query(&mut self, text: &str) -> Result<String> {
        self.channel_mut()?.ask(text).await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut channel) = self.channel.take() {
            channel.close().await?;
        }
        Ok(())
    }
}

/// Scripted channel for tests: answers every query with one fixed reply.
pub struct MockRpcChannel {
    /// Reply returned for every `ask`.
    pub reply: String,
    /// Commands and queries seen so far.
    pub log: Vec<String>,
}

impl MockRpcChannel {
    /// Channel answering every query with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            log: Vec::new(),
        }
    }
}

#[async_trait]
impl RpcChannel for MockRpcChannel {
    async fn write(&mut self, text: &str) -> Result<()> {
        self.log.push(text.to_string());
        Ok(())
    }

    async fn ask(&mut self, text: &str) -> Result<String> {
        self.log.push(text.to_string());
        Ok(self.reply.clone())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_delegates_to_ask() {
        let mut transport = RpcTransport::new(Box::new(MockRpcChannel::new("E5071C")));
        let reply = transport.query("*IDN?\n").await.unwrap();
        assert_eq!(reply, "E5071C");
    }

    #[tokio::test]
    async fn operations_fail_after_close() {
        let mut transport = RpcTransport::new(Box::new(MockRpcChannel::new("")));
        transport.close().await.unwrap();

        assert!(matches!(
            transport.send("*RST\n").await,
            Err(SweepError::ConnectionClosed)
        ));
        assert!(matches!(
            transport.query("*IDN?\n").await,
            Err(SweepError::ConnectionClosed)
        ));
    }
}
