//! Instrument transports.
//!
//! A [`Transport`] owns one exclusive connection to an instrument and moves
//! SCPI text across it. Two bindings are provided:
//!
//! - [`rpc::RpcTransport`]: RPC-style transport where the underlying call
//!   owns message boundaries (`query` returns the complete reply or fails).
//! - [`tcp::TcpTransport`]: raw TCP socket with no inherent message
//!   boundaries; replies are reconstructed by the dual-timeout
//!   [`framer`].
//!
//! [`mock::MockTransport`] is a scripted in-process transport used by tests
//! and offline development.

pub mod framer;
pub mod mock;
pub mod rpc;
pub mod tcp;

pub use framer::FramedReply;
pub use mock::MockTransport;
pub use rpc::{RpcChannel, RpcTransport};
pub use tcp::TcpTransport;

use async_trait::async_trait;

use crate::error::Result;

/// One exclusive instrument connection.
///
/// The connection is created on construction and released by [`close`];
/// there is no implicit reconnect. After `close`, `send` and `query` fail
/// with [`crate::SweepError::ConnectionClosed`] rather than silently
/// no-opping. Concurrent use of one transport by two owners is not
/// supported; callers serialize access.
///
/// [`close`]: Transport::close
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fire-and-forget write of already-terminated command text.
    async fn send(&mut self, text: &str) -> Result<()>;

    /// Send query text and return the full textual reply.
    async fn query(&mut self, text: &str) -> Result<String>;

    /// Release the connection. Subsequent operations fail.
    async fn close(&mut self) -> Result<()>;
}
