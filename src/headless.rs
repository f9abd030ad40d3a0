use anyhow::{Context, Result};
use mapshim_bridge::{MapEngine, MapPlugin};
use mapshim_core::MonotonicClock;
use mapshim_testkit::{JsonlSink, TickRateCollector, TickRateMetrics};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct HeadlessConfig {
    pub nominal_tick: Duration,
    pub max_ticks: Option<u64>,
    pub tick_log: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub tick_rate: TickRateMetrics,
    pub chunk_units_spent: u64,
    pub duration: Duration,
}

/// Drive `plugin` from a fixed-step loop until `max_ticks` (or forever).
///
/// Each tick spends the engine's chunk allowance while the work budget lasts,
/// then sleeps to the next tick boundary. A loop that falls behind resyncs to
/// the current time instead of bursting to catch up.
pub fn run<E, C>(plugin: &mut MapPlugin<E, C>, cfg: HeadlessConfig) -> Result<RunSummary>
where
    E: MapEngine,
    C: MonotonicClock,
{
    let mut sink = match &cfg.tick_log {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("failed to create tick log {}", path.display()))?,
        ),
        None => None,
    };

    let nominal_nanos = u64::try_from(cfg.nominal_tick.as_nanos()).unwrap_or(u64::MAX);
    let mut collector = TickRateCollector::new(nominal_nanos);
    let mut summary = RunSummary::default();
    let started = Instant::now();
    let mut deadline = started + cfg.nominal_tick;
    let mut ticks = 0u64;

    loop {
        if cfg.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }

        let Some(sample) = plugin.process_tick() else {
            warn!("Plugin stopped ticking");
            break;
        };
        ticks += 1;
        collector.record(&sample);
        if let Some(sink) = sink.as_mut() {
            sink.write(&sample)?;
        }
        summary.chunk_units_spent += u64::from(spend_allowance(plugin));

        let now = Instant::now();
        if now < deadline {
            thread::sleep(deadline - now);
            deadline += cfg.nominal_tick;
        } else {
            debug!(
                tick = sample.tick.0,
                behind_ms = (now - deadline).as_millis() as u64,
                "Tick overran its slot"
            );
            deadline = now + cfg.nominal_tick;
        }
    }

    if let Some(sink) = sink.as_mut() {
        sink.flush()?;
    }
    summary.tick_rate = collector.finish();
    summary.duration = started.elapsed();
    Ok(summary)
}

/// Consume per-tick units while budget remains, the way a chunk loader would.
fn spend_allowance<E, C>(plugin: &mut MapPlugin<E, C>) -> u32
where
    E: MapEngine,
    C: MonotonicClock,
{
    let Some(clock) = plugin.tick_clock_mut() else {
        return 0;
    };
    let budget = clock.budget();
    let mut spent = 0;
    while !budget.is_exhausted(clock.elapsed_this_tick()) && clock.try_consume_units(1) {
        spent += 1;
    }
    spent
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapshim_bridge::PluginConfig;
    use mapshim_core::SystemClock;
    use mapshim_testkit::{RecordingEngine, StaticHost};

    #[test]
    fn runs_requested_number_of_ticks() {
        let engine = RecordingEngine {
            max_chunk_loads_per_tick: 4,
            ..RecordingEngine::default()
        };
        let mut plugin = MapPlugin::new(engine, PluginConfig::default(), SystemClock::new());
        plugin
            .on_server_start(&StaticHost::new("1.8.9"))
            .expect("start");

        let summary = run(
            &mut plugin,
            HeadlessConfig {
                nominal_tick: Duration::from_millis(1),
                max_ticks: Some(5),
                tick_log: None,
            },
        )
        .expect("run");

        assert_eq!(summary.tick_rate.ticks, 5);
        assert_eq!(plugin.engine().tick_rates.len(), 5);
        assert!(summary.chunk_units_spent <= 20);
    }

    #[test]
    fn zero_budget_spends_no_allowance() {
        let engine = RecordingEngine {
            max_tick_use_ms: 0,
            max_chunk_loads_per_tick: 16,
            ..RecordingEngine::default()
        };
        let mut plugin = MapPlugin::new(engine, PluginConfig::default(), SystemClock::new());
        plugin
            .on_server_start(&StaticHost::new("1.8.9"))
            .expect("start");

        let summary = run(
            &mut plugin,
            HeadlessConfig {
                nominal_tick: Duration::from_millis(1),
                max_ticks: Some(3),
                tick_log: None,
            },
        )
        .expect("run");

        assert_eq!(summary.tick_rate.ticks, 3);
        assert_eq!(summary.chunk_units_spent, 0);
    }

    #[test]
    fn stops_when_plugin_is_not_running() {
        let mut plugin = MapPlugin::new(
            RecordingEngine::default(),
            PluginConfig::default(),
            SystemClock::new(),
        );
        let summary = run(
            &mut plugin,
            HeadlessConfig {
                nominal_tick: Duration::from_millis(1),
                max_ticks: None,
                tick_log: None,
            },
        )
        .expect("run");
        assert_eq!(summary.tick_rate.ticks, 0);
    }
}
