//! Scripted transport for tests and offline development.
//!
//! Replies are keyed by the trimmed wire text. `with_reply` installs a fixed
//! reply; `push_reply` queues one-shot replies consumed in FIFO order before
//! the fixed map is consulted (useful for status registers that change
//! between polls). Every command and query is recorded in order, which is
//! what the acquisition-ordering tests assert against.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::error::{Result, SweepError};
use crate::transport::Transport;

/// In-process transport with canned replies and a recorded call log.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: HashMap<String, String>,
    queued: HashMap<String, VecDeque<String>>,
    log: Vec<String>,
    default_reply: String,
    closed: bool,
}

impl MockTransport {
    /// Transport answering unknown queries with `"0"`.
    pub fn new() -> Self {
        Self {
            default_reply: "0".to_string(),
            ..Self::default()
        }
    }

    /// Install a fixed reply for the given trimmed query text.
    pub fn with_reply(mut self, query: &str, reply: &str) -> Self {
        self.replies.insert(query.to_string(), reply.to_string());
        self
    }

    /// Queue a one-shot reply; consumed before any fixed reply for the key.
    pub fn push_reply(&mut self, query: &str, reply: &str) {
        self.queued
            .entry(query.to_string())
            .or_default()
            .push_back(reply.to_string());
    }

    /// Everything sent or queried so far, trimmed, in order.
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Index of the first log entry starting with `prefix`, if any.
    pub fn first_index_of(&self, prefix: &str) -> Option<usize> {
        self.log.iter().position(|line| line.starts_with(prefix))
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(SweepError::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    fn lookup(&mut self, key: &str) -> String {
        if let Some(queue) = self.queued.get_mut(key) {
            if let Some(reply) = queue.pop_front() {
                return reply;
            }
        }
        self.replies
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, text: &str) -> Result<()> {
        self.check_open()?;
        self.log.push(text.trim_end().to_string());
        Ok(())
    }

    async fn query(&mut self, text: &str) -> Result<String> {
        self.check_open()?;
        let key = text.trim_end().to_string();
        self.log.push(key.clone());
        Ok(self.lookup(&key))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
