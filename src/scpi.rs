//! SCPI command/query codec.
//!
//! Builds the wire text for SCPI commands and queries and enforces the
//! command-only / query-only call discipline. One line per message,
//! `\n`-terminated; the query form appends `?` before the terminator.
//!
//! The dominant accessor convention is [`ScpiClient::command_or_query`]: the
//! query sentinel reads the parameter back, anything else writes it. Misusing
//! a command-only or query-only parameter is a programming error and fails
//! fast with [`SweepError::ProtocolMisuse`]; it is never retried.

use std::fmt;

use crate::error::{Result, SweepError};
use crate::transport::Transport;

/// Argument to a parameter access: the query sentinel or a formatted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Read the parameter back (`?`).
    Query,
    /// Write the formatted value.
    Value(String),
}

impl Arg {
    /// Format any displayable value as a command argument.
    pub fn value(v: impl fmt::Display) -> Self {
        Arg::Value(v.to_string())
    }

    /// True for the query sentinel.
    pub fn is_query(&self) -> bool {
        matches!(self, Arg::Query)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::value(v)
    }
}

impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        Arg::value(v)
    }
}

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg::Value(v.to_string())
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg::Value(v)
    }
}

/// Switch states format as SCPI `1`/`0`.
impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        Arg::Value(if v { "1" } else { "0" }.to_string())
    }
}

/// SCPI codec over an exclusive [`Transport`].
pub struct ScpiClient<T: Transport> {
    transport: T,
}

impl<T: Transport> ScpiClient<T> {
    /// Take ownership of the transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Emit `"<path> <arg>\n"`.
    pub async fn command(&mut self, path: &str, arg: &str) -> Result<()> {
        self.transport.send(&format!("{path} {arg}\n")).await
    }

    /// Emit `"<path>?\n"` and return the reply.
    pub async fn query(&mut self, path: &str) -> Result<String> {
        self.transport.query(&format!("{path}?\n")).await
    }

    /// Send pre-formed query text (for commands carrying their own `?`,
    /// e.g. `CALC:DATA? FDATA`) and return the reply.
    pub async fn query_raw(&mut self, text: &str) -> Result<String> {
        self.transport.query(&format!("{text}\n")).await
    }

    /// Command that must never be queried.
    pub async fn command_only(&mut self, path: &str, arg: Arg) -> Result<()> {
        match arg {
            Arg::Query => Err(SweepError::ProtocolMisuse(format!(
                "'{path}' is command-only, queries are not allowed"
            ))),
            Arg::Value(v) => self.command(path, &v).await,
        }
    }

    /// Query that must never take an argument.
    pub async fn query_only(&mut self, path: &str, arg: Arg) -> Result<String> {
        match arg {
            Arg::Query => self.query(path).await,
            Arg::Value(v) => Err(SweepError::ProtocolMisuse(format!(
                "'{path}' is query-only, argument '{v}' is not allowed"
            ))),
        }
    }

    /// Query on the sentinel, command otherwise.
    pub async fn command_or_query(&mut self, path: &str, arg: Arg) -> Result<Option<String>> {
        match arg {
            Arg::Query => Ok(Some(self.query(path).await?)),
            Arg::Value(v) => {
                self.command(path, &v).await?;
                Ok(None)
            }
        }
    }

    /// Release the underlying connection.
    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[tokio::test]
    async fn command_emits_path_space_arg_newline() {
        let mut scpi = ScpiClient::new(MockTransport::new());
        scpi.command(":SENSe:FREQuency:STARt", "1000000").await.unwrap();
        // The mock trims the terminator before logging.
        assert_eq!(
            scpi.transport_mut().log(),
            [":SENSe:FREQuency:STARt 1000000"]
        );
    }

    #[tokio::test]
    async fn query_appends_question_mark() {
        let mut scpi =
            ScpiClient::new(MockTransport::new().with_reply(":OUTPut?", "1"));
        let reply = scpi.query(":OUTPut").await.unwrap();
        assert_eq!(reply, "1");
        assert_eq!(scpi.transport_mut().log(), [":OUTPut?"]);
    }

    #[tokio::test]
    async fn command_only_rejects_query_sentinel() {
        let mut scpi = ScpiClient::new(MockTransport::new());
        let err = scpi
            .command_only(":SENSe:AVERage:CLEar", Arg::Query)
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::ProtocolMisuse(_)));
        assert!(scpi.transport_mut().log().is_empty());
    }

    #[tokio::test]
    async fn query_only_rejects_value_argument() {
        let mut scpi = ScpiClient::new(MockTransport::new());
        let err = scpi
            .query_only(":FREQuency:STEP", Arg::from(100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, SweepError::ProtocolMisuse(_)));
        assert!(scpi.transport_mut().log().is_empty());
    }

    #[tokio::test]
    async fn command_or_query_dispatches_on_sentinel() {
        let mut scpi =
            ScpiClient::new(MockTransport::new().with_reply(":POWer?", "-50"));

        let read = scpi.command_or_query(":POWer", Arg::Query).await.unwrap();
        assert_eq!(read.as_deref(), Some("-50"));

        let written = scpi
            .command_or_query(":POWer", Arg::from(-30.0))
            .await
            .unwrap();
        assert!(written.is_none());
        assert_eq!(scpi.transport_mut().log(), [":POWer?", ":POWer -30"]);
    }

    #[tokio::test]
    async fn bool_arg_formats_as_scpi_switch() {
        assert_eq!(Arg::from(true), Arg::Value("1".into()));
        assert_eq!(Arg::from(false), Arg::Value("0".into()));
    }
}
