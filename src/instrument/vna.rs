//! Vector network analyzer facade.
//!
//! Protocol overview:
//! - SCPI over either transport; sweep setup under `:SENSe`, source power
//!   under `:SOURce`, readback under `CALC`.
//! - Averaging completion is a bit-encoded condition register
//!   (`STAT:OPER:AVER<n>:COND?`).
//! - Trace readback selects a named measurement first (`CALC:PAR:SEL`), then
//!   reads the frequency axis (`CALC:X?`) and formatted data
//!   (`CALC:DATA? FDATA`) as comma-separated floats.

use tracing::debug;

use crate::error::Result;
use crate::instrument::{find_param, parse_float_list, Access, ParamSpec};
use crate::scpi::{Arg, ScpiClient};
use crate::transport::Transport;

/// Parameter table for the analyzer family this crate targets.
pub const PARAMS: &[ParamSpec] = &[
    ParamSpec {
        name: "if_bandwidth",
        path: ":SENSe:BANDwidth:RESolution",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "sweep_points",
        path: ":SENSe:SWEep:POINts",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_start",
        path: ":SENSe:FREQuency:STARt",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_stop",
        path: ":SENSe:FREQuency:STOP",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_center",
        path: ":SENSe:FREQuency:CENTer",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "freq_span",
        path: ":SENSe:FREQuency:SPAN",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "power",
        path: ":SOURce:POWer:LEVel:IMMediate:AMPLitude",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "output",
        path: ":OUTPut",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "average_count",
        path: ":SENSe:AVERage:COUNt",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "average_state",
        path: ":SENSe:AVERage:STATe",
        access: Access::CommandQuery,
    },
    ParamSpec {
        name: "average_clear",
        path: ":SENSe:AVERage:CLEar",
        access: Access::CommandOnly,
    },
];

/// Facade over one network analyzer connection.
pub struct NetworkAnalyzer<T: Transport> {
    scpi: ScpiClient<T>,
    channel: u32,
    measurement: String,
    s_parameter: String,
}

impl<T: Transport> NetworkAnalyzer<T> {
    /// Take exclusive ownership of the transport.
    pub fn new(transport: T) -> Self {
        Self {
            scpi: ScpiClient::new(transport),
            channel: 1,
            measurement: "sweep_daq".to_string(),
            s_parameter: "S21".to_string(),
        }
    }

    /// Select the instrument channel used for averaging status and readback.
    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    /// Name and S-parameter of the measurement trace created for readback.
    pub fn with_measurement(mut self, name: impl Into<String>, s_parameter: impl Into<String>) -> Self {
        self.measurement = name.into();
        self.s_parameter = s_parameter.into();
        self
    }

    /// Access a table parameter by name, enforcing its argument domain.
    pub async fn apply(&mut self, name: &str, arg: Arg) -> Result<Option<String>> {
        let spec = find_param(PARAMS, name)?;
        spec.apply(&mut self.scpi, arg).await
    }

    /// Read a table parameter back.
    pub async fn read_param(&mut self, name: &str) -> Result<String> {
        // CommandQuery and QueryOnly parameters both accept the sentinel.
        Ok(self.apply(name, Arg::Query).await?.unwrap_or_default())
    }

    /// `*IDN?`
    pub async fn identify(&mut self) -> Result<String> {
        self.scpi.query("*IDN").await
    }

    // Sweep setup (thin pass-throughs into the codec).

    /// Set the IF bandwidth in Hz.
    pub async fn set_if_bandwidth(&mut self, hz: f64) -> Result<()> {
        self.apply("if_bandwidth", hz.into()).await.map(|_| ())
    }

    /// Set the number of sweep points.
    pub async fn set_sweep_points(&mut self, points: u32) -> Result<()> {
        self.apply("sweep_points", points.into()).await.map(|_| ())
    }

    /// Set the sweep start frequency in Hz.
    pub async fn set_freq_start(&mut self, hz: f64) -> Result<()> {
        self.apply("freq_start", hz.into()).await.map(|_| ())
    }

    /// Set the sweep stop frequency in Hz.
    pub async fn set_freq_stop(&mut self, hz: f64) -> Result<()> {
        self.apply("freq_stop", hz.into()).await.map(|_| ())
    }

    /// Set the source power in dBm.
    pub async fn set_power(&mut self, dbm: f64) -> Result<()> {
        self.apply("power", dbm.into()).await.map(|_| ())
    }

    /// Enable or disable trace averaging.
    pub async fn set_average_enabled(&mut self, enabled: bool) -> Result<()> {
        self.apply("average_state", enabled.into()).await.map(|_| ())
    }

    /// Set the averaging count.
    pub async fn set_average_count(&mut self, count: u32) -> Result<()> {
        self.apply("average_count", count.into()).await.map(|_| ())
    }

    /// Clear the averaging accumulator.
    pub async fn average_reset(&mut self) -> Result<()> {
        self.apply("average_clear", Arg::Value(String::new()))
            .await
            .map(|_| ())
    }

    /// Turn the RF output on or off.
    pub async fn set_output(&mut self, on: bool) -> Result<()> {
        self.apply("output", on.into()).await.map(|_| ())
    }

    /// Query the averaging condition register and test the completion bit.
    pub async fn average_completed(&mut self) -> Result<bool> {
        let path = format!("STAT:OPER:AVER{}:COND", self.channel);
        let reply = self.scpi.query(&path).await?;
        let status: u64 = reply.trim().parse().map_err(|e| {
            crate::error::SweepError::Parse(format!(
                "bad averaging status register '{}': {e}",
                reply.trim()
            ))
        })?;
        Ok(crate::acquisition::averaging_complete(status))
    }

    /// Create the named measurement trace for the configured S-parameter.
    pub async fn define_measurement(&mut self) -> Result<()> {
        let path = format!("CALC{}:PAR:EXT", self.channel);
        let arg = format!("'{}', '{}'", self.measurement, self.s_parameter);
        self.scpi.command(&path, &arg).await
    }

    /// Make the named measurement trace active for readback.
    pub async fn select_measurement(&mut self) -> Result<()> {
        let arg = format!("'{}'", self.measurement);
        self.scpi.command("CALC:PAR:SEL", &arg).await
    }

    /// Read the frequency axis of the active measurement.
    pub async fn read_frequency_axis(&mut self) -> Result<Vec<f64>> {
        let reply = self.scpi.query("CALC:X").await?;
        let axis = parse_float_list(&reply)?;
        debug!(points = axis.len(), "frequency axis read");
        Ok(axis)
    }

    /// Read the formatted trace data of the active measurement.
    pub async fn read_trace_data(&mut self) -> Result<Vec<f64>> {
        let reply = self.scpi.query_raw("CALC:DATA? FDATA").await?;
        let data = parse_float_list(&reply)?;
        debug!(points = data.len(), "trace data read");
        Ok(data)
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

    fn analyzer(transport: MockTransport) -> NetworkAnalyzer<MockTransport> {
        NetworkAnalyzer::new(transport).with_measurement("cavity", "S21")
    }

    #[tokio::test]
    async fn average_clear_rejects_query() {
        let mut vna = analyzer(MockTransport::new());
        let err = vna.apply("average_clear", Arg::Query).await.unwrap_err();
        assert!(matches!(err, SweepError::ProtocolMisuse(_)));
    }

    #[tokio::test]
    async fn unknown_parameter_is_an_error() {
        let mut vna = analyzer(MockTransport::new());
        let err = vna.apply("wavelength", Arg::Query).await.unwrap_err();
        assert!(matches!(err, SweepError::UnknownParameter(_)));
    }

    #[tokio::test]
    async fn average_completed_tests_bit_one() {
        let transport = MockTransport::new().with_reply("STAT:OPER:AVER1:COND?", "2");
        let mut vna = analyzer(transport);
        assert!(vna.average_completed().await.unwrap());

        let transport = MockTransport::new().with_reply("STAT:OPER:AVER1:COND?", "1");
        let mut vna = analyzer(transport);
        assert!(!vna.average_completed().await.unwrap());
    }

    #[tokio::test]
    async fn measurement_selection_quotes_name() {
        let mut vna = analyzer(MockTransport::new());
        vna.define_measurement().await.unwrap();
        vna.select_measurement().await.unwrap();
        assert_eq!(
            vna.transport_mut().log(),
            ["CALC1:PAR:EXT 'cavity', 'S21'", "CALC:PAR:SEL 'cavity'"]
        );
    }

    #[tokio::test]
    async fn readback_parses_float_lists() {
        let transport = MockTransport::new()
            .with_reply("CALC:X?", "1e9,2e9,3e9")
            .with_reply("CALC:DATA? FDATA", "-1.5,-2.5,-3.5");
        let mut vna = analyzer(transport);
        assert_eq!(vna.read_frequency_axis().await.unwrap(), vec![1e9, 2e9, 3e9]);
        assert_eq!(
            vna.read_trace_data().await.unwrap(),
            vec![-1.5, -2.5, -3.5]
        );
    }
}
