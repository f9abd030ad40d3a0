//! Tick-rate metrics collection and reporting.
//!
//! Runs of the headless host and long-running tests export a `metrics.json`
//! summarizing how the tick estimator behaved, for regression checks in CI.

use anyhow::Result;
use mapshim_tick::TickSample;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Run identifier
    pub run_name: String,

    /// Timestamp when metrics were collected (ISO 8601)
    pub timestamp: String,

    /// Overall result
    pub result: TestResult,

    /// Tick estimator metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_rate: Option<TickRateMetrics>,

    /// Engine bridge metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge: Option<BridgeMetrics>,

    /// Execution metrics
    pub execution: ExecutionMetrics,
}

/// Overall result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// Run passed all validations
    Pass,
    /// Run failed
    Fail,
    /// Run was skipped
    Skip,
}

/// Tick estimator behaviour over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickRateMetrics {
    /// Ticks observed
    pub ticks: u64,

    /// Lowest TPS estimate seen
    pub min_tps: f64,

    /// Highest TPS estimate seen
    pub max_tps: f64,

    /// TPS estimate after the last tick
    pub final_tps: f64,

    /// Mean raw interval between ticks (milliseconds)
    pub mean_interval_ms: f64,

    /// Longest interval between ticks (milliseconds)
    pub max_interval_ms: f64,

    /// Intervals longer than twice the nominal tick
    pub slow_ticks: u64,
}

/// Host/engine translation state at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMetrics {
    /// Worlds registered with the engine
    pub worlds: usize,

    /// Biomes known to the engine after reconciliation
    pub biomes: usize,

    /// Per-tick background work ceiling (milliseconds)
    pub budget_ms: u64,
}

/// Execution and infrastructure metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Total wall-clock duration (seconds)
    pub duration_seconds: f64,

    /// Number of validations passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Accumulates [`TickSample`]s into [`TickRateMetrics`].
#[derive(Debug, Clone)]
pub struct TickRateCollector {
    nominal_tick_nanos: u64,
    metrics: TickRateMetrics,
    total_interval_nanos: u128,
}

impl TickRateCollector {
    /// Collector flagging ticks slower than twice `nominal_tick_nanos`.
    pub fn new(nominal_tick_nanos: u64) -> Self {
        Self {
            nominal_tick_nanos,
            metrics: TickRateMetrics {
                min_tps: f64::INFINITY,
                max_tps: 0.0,
                ..TickRateMetrics::default()
            },
            total_interval_nanos: 0,
        }
    }

    /// Fold one sample in.
    pub fn record(&mut self, sample: &TickSample) {
        let m = &mut self.metrics;
        m.ticks += 1;
        m.min_tps = m.min_tps.min(sample.tps);
        m.max_tps = m.max_tps.max(sample.tps);
        m.final_tps = sample.tps;
        m.max_interval_ms = m.max_interval_ms.max(nanos_to_ms(sample.elapsed_nanos));
        if sample.elapsed_nanos > self.nominal_tick_nanos.saturating_mul(2) {
            m.slow_ticks += 1;
        }
        self.total_interval_nanos += u128::from(sample.elapsed_nanos);
    }

    /// Metrics so far.
    pub fn finish(&self) -> TickRateMetrics {
        let mut metrics = self.metrics.clone();
        if metrics.ticks == 0 {
            metrics.min_tps = 0.0;
            return metrics;
        }
        metrics.mean_interval_ms =
            self.total_interval_nanos as f64 / metrics.ticks as f64 / 1_000_000.0;
        metrics
    }
}

fn nanos_to_ms(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000.0
}

/// Builder for constructing metrics reports
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Create a new builder with run name
    pub fn new(run_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                run_name: run_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                result: TestResult::Pass,
                tick_rate: None,
                bridge: None,
                execution: ExecutionMetrics::default(),
            },
        }
    }

    /// Set result
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set tick estimator metrics
    pub fn tick_rate(mut self, metrics: TickRateMetrics) -> Self {
        self.report.tick_rate = Some(metrics);
        self
    }

    /// Set bridge metrics
    pub fn bridge(mut self, metrics: BridgeMetrics) -> Self {
        self.report.bridge = Some(metrics);
        self
    }

    /// Set execution metrics
    pub fn execution(mut self, metrics: ExecutionMetrics) -> Self {
        self.report.execution = metrics;
        self
    }

    /// Build the metrics report
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Sink for writing metrics reports to JSON files
pub struct MetricsSink {
    path: std::path::PathBuf,
}

impl MetricsSink {
    /// Create a new metrics sink at the specified path
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self { path })
    }

    /// Write metrics report to file
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}
