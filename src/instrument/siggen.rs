//! RF signal generator facade.
//!
//! Covers the CW and step-sweep subset this crate drives: output switching,
//! frequency and power, sweep bounds, and the trigger subsystem
//! (`:INITiate` / `:ABORt`, command-only). The step-size queries are
//! query-only; the instrument derives them from the sweep bounds.

use crate::error::Result;
use crate::instrument::{find_param, Access, ParamSpec};
use crate::scpi::{Arg, ScpiClient};
use crate::transport::Transport;

/// Parameter table for the generator family this crate targets.
pub const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "output",
        path: ":OUTPut",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "output_blanking",
        path: ":OUTPut:BLANking",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "frequency",
        path: ":FREQuency",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "frequency_mode",
        path: ":FREQuency:MODE",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_start",
        path: ":FREQuency:STARt",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_stop",
        path: ":FREQuency:STOP",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_step",
        path: ":FREQuency:STEP",
        access: Access::QueryOnly,
    },
    ParamSpec {
        name: "freq_step_log",
        path: ":FREQuency:STEP:LOGarithmic",
        access: Access::QueryOnly,
    },
    ParamSpec {
        name: "power",
        path: ":POWer",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "initiate",
        path: ":INITiate",
        access: Access::CommandOnly,
    },
    ParamSpec {
        name: "initiate_continuous",
        path: ":INITiate:CONTinuous",
        access: Access::CommandOnly,
    },
    ParamSpec {
        name: "abort",
        path: ":ABORt",
        access: Access::CommandOnly,
    },
];

/// Facade over one signal generator connection.
pub struct SignalGenerator<T: Transport> {
    scpi: ScpiClient<T>,
}

impl<T: Transport> SignalGenerator<T> {
    /// Take exclusive ownership of the transport.
    pub fn new(transport: T) -> Self {
        Self {
            scpi: ScpiClient::new(transport),
        }
    }

    /// Access a table parameter by name, enforcing its argument domain.
    pub async fn apply(&mut self, name: &str, arg: Arg) -> Result<Option<String>> {
        let spec = find_param(PARAMS, name)?;
        spec.apply(&mut self.scpi, arg).await
    }

    /// `*IDN?`
    pub async fn identify(&mut self) -> Result<String> {
        self.scpi.query("*IDN").await
    }

    /// Set the CW output frequency in Hz.
    pub async fn set_frequency(&mut self, hz: f64) -> Result<()> {
        self.apply("frequency", hz.into()).await.map(|_| ())
    }

    /// Set the output power in dBm.
    pub async fn set_power(&mut self, dbm: f64) -> Result<()> {
        self.apply("power", dbm.into()).await.map(|_| ())
    }

    /// Turn the RF output on or off.
    pub async fn set_output(&mut self, on: bool) -> Result<()> {
        self.apply("output", on.into()).await.map(|_| ())
    }

    /// Arm the trigger system.
    pub async fn initiate(&mut self) -> Result<()> {
        self.apply("initiate", Arg::Value(String::new()))
            .await
            .map(|_| ())
    }

    /// Continuously rearm the trigger after each sweep.
    pub async fn set_initiate_continuous(&mut self, on: bool) -> Result<()> {
        self.apply("initiate_continuous", on.into()).await.map(|_| ())
    }

    /// Abort a sweep in progress.
    pub async fn abort(&mut self) -> Result<()> {
        self.apply("abort", Arg::Value(String::new()))
            .await
            .map(|_| ())
    }

    /// Linear step size in Hz (instrument-derived, query-only).
    pub async fn frequency_step(&mut self) -> Result<String> {
        Ok(self
            .apply("freq_step", Arg::Query)
            .await?
            .unwrap_or_default())
    }

    /// Release the connection; subsequent accesses fail.
    pub async fn close(&mut self) -> Result<()> {
        self.scpi.close().await
    }

    /// Escape hatch to the raw transport, for inspection and direct I/O.
    pub fn transport_mut(&mut self) -> &mut T {
        self.scpi.transport_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweepError;
    use crate::transport::MockTransport;

    #[tokio::test]
    async fn initiate_and_abort_reject_queries() {
        let mut gen = SignalGenerator::new(MockTransport::new());
        for name in ["initiate", "initiate_continuous", "abort"] {
            let err = gen.apply(name, Arg::Query).await.unwrap_err();
            assert!(matches!(err, SweepError::ProtocolMisuse(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn step_size_rejects_arguments() {
        let mut gen = SignalGenerator::new(MockTransport::new());
        let err = gen.apply("freq_step", Arg::from(1e6)).await.unwrap_err();
        assert!(matches!(err, SweepError::ProtocolMisuse(_)));
    }

    #[tokio::test]
    async fn cw_setup_emits_expected_commands() {
        let mut gen = SignalGenerator::new(MockTransport::new());
        gen.set_frequency(5e9).await.unwrap();
        gen.set_power(-20.0).await.unwrap();
        gen.set_output(true).await.unwrap();
        assert_eq!(
            gen.transport_mut().log(),
            [":FREQuency 5000000000", ":POWer -20", ":OUTPut 1"]
        );
    }
}
