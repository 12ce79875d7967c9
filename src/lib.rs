//! Instrument communication and sweep acquisition for bench RF instruments.
//!
//! The crate is layered bottom-up:
//!
//! - [`transport`]: byte transports (raw TCP with a dual-timeout reply
//!   framer, an RPC channel seam, a scriptable mock) behind one async trait.
//! - [`scpi`]: the SCPI command/query codec and its call discipline.
//! - [`instrument`]: device facades (network analyzer, signal generator)
//!   built from declarative parameter tables.
//! - [`acquisition`]: the sweep orchestrator, multi-segment scans, and
//!   background correction.
//!
//! A minimal session:
//!
//! ```no_run
//! use sweep_daq::{
//!     acquisition::{collect_single, SweepConfig, WaitPolicy},
//!     instrument::NetworkAnalyzer,
//!     transport::TcpTransport,
//! };
//!
//! # async fn run() -> sweep_daq::Result<()> {
//! let transport = TcpTransport::connect("192.168.0.40", 5025).await?;
//! let mut vna = NetworkAnalyzer::new(transport);
//! let config = SweepConfig::new(4e9, 8e9).with_averages(100);
//! let trace = collect_single(&mut vna, &config, &WaitPolicy::poll()).await?;
//! println!("{} points", trace.len());
//! # Ok(())
//! # }
//! ```

pub mod acquisition;
pub mod config;
pub mod error;
pub mod instrument;
pub mod scpi;
pub mod telemetry;
pub mod trace;
pub mod transport;

pub use acquisition::{
    collect_corrected, collect_scan, collect_scan_corrected, collect_single, CorrectionSettings,
    ScanSettings, Segment, SweepConfig, WaitPolicy,
};
pub use config::Settings;
pub use error::{Result, SweepError};
pub use instrument::{NetworkAnalyzer, SignalGenerator};
pub use scpi::{Arg, ScpiClient};
pub use trace::Trace;
pub use transport::{MockTransport, TcpTransport, Transport};
