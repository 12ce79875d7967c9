//! Command-line sweep runner.
//!
//! Connects to a network analyzer over SCPI-TCP and either identifies it or
//! runs one sweep acquisition, printing the trace as `frequency,magnitude`
//! lines on stdout.
//!
//! ```bash
//! sweep_daq identify
//! sweep_daq sweep --start 4e9 --stop 8e9 --points 801 --averages 100
//! SWEEP_DAQ_INSTRUMENT__ADDRESS=192.168.0.40 sweep_daq sweep --start 1e9 --stop 2e9
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use sweep_daq::acquisition::{collect_single, SweepConfig, WaitPolicy};
use sweep_daq::config::Settings;
use sweep_daq::instrument::NetworkAnalyzer;
use sweep_daq::transport::TcpTransport;

#[derive(Parser)]
#[command(name = "sweep_daq")]
#[command(about = "SCPI sweep acquisition for bench RF instruments", long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults to ./sweep_daq.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Query the instrument identification string.
    Identify,
    /// Run one sweep and print the trace.
    Sweep {
        /// Start frequency in Hz.
        #[arg(long)]
        start: f64,
        /// Stop frequency in Hz.
        #[arg(long)]
        stop: f64,
        /// Number of sweep points.
        #[arg(long, default_value_t = 1601)]
        points: u32,
        /// Source power in dBm.
        #[arg(long, default_value_t = -50.0, allow_negative_numbers = true)]
        power: f64,
        /// IF bandwidth in Hz.
        #[arg(long, default_value_t = 1e3)]
        bandwidth: f64,
        /// Averaging count (0 disables averaging).
        #[arg(long, default_value_t = 999)]
        averages: u32,
        /// Fixed wait in seconds instead of polling for completion.
        #[arg(long)]
        delay: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load configuration")?;

    sweep_daq::telemetry::init_from_settings(&settings)?;

    let transport = TcpTransport::connect(&settings.instrument.address, settings.instrument.port)
        .await
        .with_context(|| {
            format!(
                "failed to connect to {}:{}",
                settings.instrument.address, settings.instrument.port
            )
        })?
        .with_reply_timeout(settings.timeouts.reply_timeout)
        .with_poll_interval(settings.timeouts.poll_interval);

    let mut vna = NetworkAnalyzer::new(transport)
        .with_channel(settings.instrument.channel)
        .with_measurement(
            settings.instrument.measurement.clone(),
            settings.instrument.s_parameter.clone(),
        );

    match cli.command {
        Command::Identify => {
            let idn = vna.identify().await?;
            println!("{idn}");
        }
        Command::Sweep {
            start,
            stop,
            points,
            power,
            bandwidth,
            averages,
            delay,
        } => {
            let config = SweepConfig {
                start_hz: start,
                stop_hz: stop,
                points,
                power_dbm: power,
                if_bandwidth_hz: bandwidth,
                averages,
            };
            let wait = match delay {
                Some(seconds) => WaitPolicy::FixedDelay(Duration::from_secs_f64(seconds)),
                None => WaitPolicy::PollAveraging {
                    interval: settings.timeouts.completion_poll_interval,
                    max_polls: settings.timeouts.completion_max_polls,
                },
            };

            let trace = collect_single(&mut vna, &config, &wait).await?;
            info!(points = trace.len(), "sweep complete");
            for (f, m) in trace.frequency.iter().zip(&trace.magnitude) {
                println!("{f},{m}");
            }
        }
    }

    vna.close().await?;
    Ok(())
}
