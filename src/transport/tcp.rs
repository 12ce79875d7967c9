//! Raw-socket SCPI transport.
//!
//! Instruments expose plain-text SCPI over a TCP stream on a fixed port
//! (conventionally 5025). The stream has no message boundaries, so queries
//! delegate reply reconstruction to the dual-timeout [`framer`]. Use
//! [`TcpTransport::query_framed`] when the caller needs the explicit
//! truncation flag; the plain [`Transport::query`] view degrades to the text
//! and logs a warning, preserving the legacy timeout-as-empty-string
//! behavior.
//!
//! [`framer`]: crate::transport::framer

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::error::{Result, SweepError};
use crate::transport::framer::{self, FramedReply};
use crate::transport::Transport;

/// Conventional SCPI-over-TCP port.
pub const DEFAULT_SCPI_PORT: u16 = 5025;

/// Exclusive TCP connection to one instrument.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    peer: String,
    reply_timeout: Duration,
    poll_interval: Duration,
}

impl TcpTransport {
    /// Connect to `host:port`.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let peer = format!("{host}:{port}");
        let stream = TcpStream::connect(&peer)
            .await
            .map_err(|e| SweepError::Connection(format!("failed to connect to {peer}: {e}")))?;
        debug!(%peer, "TCP transport connected");

        Ok(Self {
            stream: Some(stream),
            peer,
            reply_timeout: framer::DEFAULT_REPLY_TIMEOUT,
            poll_interval: framer::DEFAULT_POLL_INTERVAL,
        })
    }

    /// Set the framer's silence threshold `t` (hard ceiling is `2t`).
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Set the framer's poll granularity.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or(SweepError::ConnectionClosed)
    }

    /// Send query text and return the framed reply with its truncation flag.
    pub async fn query_framed(&mut self, text: &str) -> Result<FramedReply> {
        let reply_timeout = self.reply_timeout;
        let poll_interval = self.poll_interval;

        let stream = self.stream_mut()?;
        stream.write_all(text.as_bytes()).await?;

        framer::read_reply(stream, reply_timeout, poll_interval).await
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        let stream = self.stream_mut()?;
        stream.write_all(text.as_bytes()).await?;
        Ok(())
    }

    async fn query(&mut self, text: &str) -> Result<String> {
        let reply = self.query_framed(text).await?;
        if reply.truncated {
            warn!(
                peer = %self.peer,
                bytes = reply.text.len(),
                "reply possibly truncated (framing timeout)"
            );
        }
        Ok(reply.text)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
            debug!(peer = %self.peer, "TCP transport closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn connected_pair() -> (TcpTransport, TcpStream) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let transport = TcpTransport::connect(&addr.ip().to_string(), addr.port())
            .await
            .unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (transport, server)
    }

    #[tokio::test]
    async fn send_writes_command_text() {
        use tokio::io::AsyncReadExt;

        let (mut transport, mut server) = connected_pair().await;
        transport.send(":OUTPut 1\n").await.unwrap();

        let mut buf = [0u8; 32];
        let n = server.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b":OUTPut 1\n");
    }

    #[tokio::test]
    async fn query_round_trips_through_framer() {
        use tokio::io::AsyncReadExt;

        let (mut transport, mut server) = connected_pair().await;
        let transport_task = tokio::spawn(async move {
            let mut transport = transport
                .with_reply_timeout(Duration::from_millis(100))
                .with_poll_interval(Duration::from_millis(20));
            transport.query("*IDN?\n").await
        });

        let mut buf = [0u8; 32];
        let n = server.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"*IDN?\n");
        server.write_all(b"ACME,VNA,0,1.0\r\n").await.unwrap();

        let reply = transport_task.await.unwrap().unwrap();
        assert_eq!(reply, "ACME,VNA,0,1.0");
    }

    #[tokio::test]
    async fn operations_fail_after_close() {
        let (mut transport, _server) = connected_pair().await;
        transport.close().await.unwrap();

        assert!(matches!(
            transport.send("*RST\n").await,
            Err(SweepError::ConnectionClosed)
        ));
        assert!(matches!(
            transport.query("*IDN?\n").await,
            Err(SweepError::ConnectionClosed)
        ));
        // A second close is a no-op, not an error.
        assert!(transport.close().await.is_ok());
    }
}
