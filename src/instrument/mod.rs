//! Instrument facades over the SCPI codec.
//!
//! Device-specific parameter sets are declarative tables of [`ParamSpec`]
//! entries (name, SCPI path, argument domain) instead of per-device method
//! duplication. A facade owns its transport exclusively
//! and is built explicitly by the caller; there is no process-wide default
//! instance.
//!
//! Facades are thin: an accessor looks its parameter up in the table,
//! enforces the argument domain, and delegates to the codec. The real
//! protocol and state-machine work lives in [`crate::acquisition`].

pub mod siggen;
pub mod vna;

pub use siggen::SignalGenerator;
pub use vna::NetworkAnalyzer;

use crate::error::{Result, SweepError};
use crate::scpi::{Arg, ScpiClient};
use crate::transport::Transport;

/// Argument domain of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Accepts values only; the query sentinel is rejected.
    CommandOnly,
    /// Accepts the query sentinel only; values are rejected.
    QueryOnly,
    /// Accepts both (the dominant case).
    CommandQuery,
}

/// One entry in a device's parameter table.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// Stable accessor name (`"power"`, `"freq_start"`, ...).
    pub name: &'static str,
    /// SCPI path the parameter maps to.
    pub path: &'static str,
    /// Argument domain enforced before anything touches the wire.
    pub access: Access,
}

impl ParamSpec {
    /// Dispatch an access through the codec, enforcing the argument domain.
    pub(crate) async fn apply<T: Transport>(
        &self,
        scpi: &mut ScpiClient<T>,
        arg: Arg,
    ) -> Result<Option<String>> {
        match self.access {
            Access::CommandOnly => {
                scpi.command_only(self.path, arg).await?;
                Ok(None)
            }
            Access::QueryOnly => Ok(Some(scpi.query_only(self.path, arg).await?)),
            Access::CommandQuery => scpi.command_or_query(self.path, arg).await,
        }
    }
}

/// Look a parameter up by name in a device table.
pub(crate) fn find_param(table: &'static [ParamSpec], name: &str) -> Result<&'static ParamSpec> {
    table
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| SweepError::UnknownParameter(name.to_string()))
}

/// Parse a comma-separated list of floats from an instrument reply.
pub(crate) fn parse_float_list(reply: &str) -> Result<Vec<f64>> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Err(SweepError::Parse(
            "empty reply where numeric data was expected (possible framing timeout)".to_string(),
        ));
    }
    trimmed
        .split(',')
        .map(|field| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| SweepError::Parse(format!("bad numeric field '{field}': {e}")))
        })
        .collect()
}
