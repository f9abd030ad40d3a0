//! mapshim - headless host driving the map engine bridge
//!
//! Simulates a game server's fixed-step tick loop and feeds it through the
//! bridge into a standalone engine, logging the estimated tick rate.

mod config;
mod headless;
mod standalone;

use anyhow::{Context, Result};
use clap::Parser;
use config::{ServiceConfig, DEFAULT_CONFIG_PATH};
use headless::HeadlessConfig;
use mapshim_bridge::MapPlugin;
use mapshim_core::SystemClock;
use mapshim_testkit::{
    BridgeMetrics, ExecutionMetrics, MetricsReportBuilder, MetricsSink, TestResult,
};
use standalone::{SimulatedHost, StandaloneEngine};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the map engine bridge from a simulated server tick loop", long_about = None)]
struct Args {
    /// Path to the service configuration
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Stop after this many ticks (runs until killed when omitted)
    #[arg(long)]
    ticks: Option<u64>,
    /// Log the tick rate every N ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    tps_report_every: u64,
    /// Write a JSON metrics report here when the run ends
    #[arg(long)]
    metrics: Option<PathBuf>,
    /// Write every tick sample as JSON lines here
    #[arg(long)]
    tick_log: Option<PathBuf>,
    /// Write the effective configuration back to --config before starting
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    // Initialize tracing with INFO level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting mapshim v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = ServiceConfig::load_from_path(&args.config);
    if args.write_config {
        config
            .save_to_path(&args.config)
            .with_context(|| format!("failed to write {}", args.config.display()))?;
    }

    let host = SimulatedHost::new(config.host.clone());
    let engine = StandaloneEngine::new(config.engine.clone(), args.tps_report_every);
    let mut plugin = MapPlugin::new(engine, config.plugin.clone(), SystemClock::new());

    if !plugin.on_server_start(&host)? {
        anyhow::bail!("map engine refused to start");
    }

    let summary = headless::run(
        &mut plugin,
        HeadlessConfig {
            nominal_tick: Duration::from_nanos(config.plugin.tick.nominal_tick_nanos()),
            max_ticks: args.ticks,
            tick_log: args.tick_log.clone(),
        },
    )?;

    let bridge = BridgeMetrics {
        worlds: plugin.worlds().len(),
        biomes: plugin.biomes().len(),
        budget_ms: config.engine.max_tick_use_ms,
    };
    plugin.on_server_stop();

    info!(
        ticks = summary.tick_rate.ticks,
        final_tps = summary.tick_rate.final_tps,
        slow_ticks = summary.tick_rate.slow_ticks,
        chunk_units = summary.chunk_units_spent,
        "Run finished"
    );

    let result = run_result(args.ticks, summary.tick_rate.ticks);
    if result == TestResult::Fail {
        tracing::warn!("Run ended before the requested tick count");
    }

    if let Some(path) = &args.metrics {
        let report = MetricsReportBuilder::new("mapshim_headless")
            .result(result)
            .tick_rate(summary.tick_rate)
            .bridge(bridge)
            .execution(ExecutionMetrics {
                duration_seconds: summary.duration.as_secs_f64(),
                validations_passed: None,
            })
            .build();
        MetricsSink::create(path)?.write(&report)?;
        info!(path = %path.display(), "Wrote metrics report");
    }

    Ok(())
}

/// Outcome of a run: skipped when no ticks were requested, failed when the
/// loop ended early (an unbounded run only ends when the plugin stops).
fn run_result(requested: Option<u64>, observed: u64) -> TestResult {
    match requested {
        Some(0) => TestResult::Skip,
        Some(n) if observed >= n => TestResult::Pass,
        _ => TestResult::Fail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_result_reflects_tick_count() {
        assert_eq!(run_result(Some(0), 0), TestResult::Skip);
        assert_eq!(run_result(Some(10), 10), TestResult::Pass);
        assert_eq!(run_result(Some(10), 4), TestResult::Fail);
        assert_eq!(run_result(None, 250), TestResult::Fail);
    }
}
