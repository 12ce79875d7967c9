//! Dual-timeout reply framing for streams without message boundaries.
//!
//! TCP delivers an instrument reply as arbitrary chunks with no length prefix
//! and no terminator guaranteed to align with chunk boundaries, so completion
//! has to be inferred from silence:
//!
//! 1. Read with a short poll granularity, appending whatever arrives and
//!    restamping "last progress" on every chunk.
//! 2. Stop once the accumulator is non-empty and more than `reply_timeout`
//!    has passed since the last byte (the instrument went quiet).
//! 3. Stop unconditionally after `2 × reply_timeout` (hard ceiling, guards
//!    against a stream that trickles forever or never starts).
//!
//! This is inherently heuristic: a reply that pauses for longer than the
//! timeout mid-transmission is indistinguishable from a finished one and will
//! be returned short. A stream that stays silent for the whole ceiling yields
//! an *empty* reply, not an error; [`FramedReply::truncated`] is how callers
//! tell a timed-out read from a genuinely empty one.

use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::{timeout, Instant};

use crate::error::Result;

/// Fixed trailing terminator length stripped from every reply.
pub const TERMINATOR_LEN: usize = 2;

/// Poll granularity while waiting for more data.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default silence threshold after which a non-empty reply is complete.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// A reassembled reply with explicit truncation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedReply {
    /// Reply text with the trailing terminator stripped.
    pub text: String,
    /// True when the hard ceiling fired or nothing arrived at all. The text
    /// may be partial; an empty truncated reply means the instrument never
    /// answered.
    pub truncated: bool,
}

/// Accumulate one reply from `stream` using the dual-timeout heuristic.
///
/// Returns the decoded text minus the [`TERMINATOR_LEN`]-byte trailing
/// terminator. Absence of data degrades to an empty or partial reply rather
/// than an error; genuine I/O errors propagate.
pub async fn read_reply<R>(
    stream: &mut R,
    reply_timeout: Duration,
    poll_interval: Duration,
) -> Result<FramedReply>
where
    R: AsyncRead + Unpin,
{
    let hard_ceiling = reply_timeout * 2;
    let begin = Instant::now();
    let mut last_progress = Instant::now();
    let mut accumulated = BytesMut::with_capacity(8192);
    let mut buf = [0u8; 8192];
    let mut truncated = false;

    loop {
        // Quiet for longer than the timeout with data in hand: reply complete.
        if !accumulated.is_empty() && last_progress.elapsed() > reply_timeout {
            break;
        }
        // Hard ceiling, data or not.
        if begin.elapsed() > hard_ceiling {
            truncated = true;
            break;
        }

        match timeout(poll_interval, stream.read(&mut buf)).await {
            Ok(Ok(0)) => {
                // Stream closed; nothing more will arrive. Let the silence
                // conditions above terminate the loop.
                tokio::time::sleep(poll_interval).await;
            }
            Ok(Ok(n)) => {
                accumulated.extend_from_slice(&buf[..n]);
                last_progress = Instant::now();
            }
            Ok(Err(e)) => return Err(e.into()),
            // No data within this poll interval.
            Err(_) => {}
        }
    }

    if accumulated.is_empty() {
        truncated = true;
    }

    let body_len = accumulated.len().saturating_sub(TERMINATOR_LEN);
    accumulated.truncate(body_len);
    let text = String::from_utf8_lossy(&accumulated).into_owned();

    Ok(FramedReply { text, truncated })
}
