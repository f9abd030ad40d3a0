//! End-to-end lifecycle of the map plugin against a recording engine.

use mapshim_bridge::{HostBiome, HostWorld, MapPlugin, PluginConfig, PluginState};
use mapshim_core::{DimensionId, SimTick};
use mapshim_testkit::{ManualClock, RecordingEngine, StaticHost};

const NOMINAL: u64 = 50_000_000;

fn modded_host() -> StaticHost {
    let mut host = StaticHost::new("1.8.9");
    host.platform = "Sponge".to_string();
    host.biomes = (0..40)
        .map(|_| HostBiome {
            id: None,
            temperature: 0.5,
            humidity: 0.5,
        })
        .collect();
    host.biomes.push(HostBiome {
        id: Some("modded:ashen_wastes".to_string()),
        temperature: 2.0,
        humidity: 0.0,
    });
    host.worlds
        .push(HostWorld::new("world_nether").with_dimension(DimensionId::Nether));
    host
}

#[test]
fn start_tick_stop() {
    let time = ManualClock::new();
    let mut plugin = MapPlugin::new(
        RecordingEngine::default(),
        PluginConfig::default(),
        time.clone(),
    );
    assert!(plugin.process_tick().is_none());

    let started = plugin.on_server_start(&modded_host()).expect("start");
    assert!(started);
    assert_eq!(plugin.state(), PluginState::Running);

    let setup = plugin.engine().setup.clone().expect("engine saw setup");
    assert_eq!(setup.platform, "Sponge");
    assert_eq!(setup.minecraft_version, "1.8.9");
    assert_eq!(setup.biome_names.len(), 41);
    assert_eq!(setup.biome_names[40], "modded:ashen_wastes");
    assert_eq!(setup.block_names, vec!["air", "stone"]);
    assert_eq!(setup.block_materials, vec!["air", "rock"]);
    assert_eq!(
        plugin.engine().lifecycle,
        vec!["enable_core", "api_initialized"]
    );

    assert_eq!(plugin.worlds().len(), 2);
    assert_eq!(plugin.biomes().by_id(1).map(|b| b.temperature), Some(0.5));
    assert_eq!(
        plugin.tick_clock().map(|c| c.budget().ceiling_nanos()),
        Some(50 * 1_000_000)
    );

    time.advance_nanos(NOMINAL);
    let first = plugin.process_tick().expect("running");
    assert_eq!(first.tick, SimTick(1));
    assert_eq!(first.average_tick_nanos, NOMINAL);

    time.advance_nanos(2 * NOMINAL);
    let second = plugin.process_tick().expect("running");
    assert_eq!(second.average_tick_nanos, 50_500_000);

    assert_eq!(plugin.engine().tick_rates.len(), 2);
    assert_eq!(plugin.engine().tick_rates[0], 20.0);
    assert!(plugin.engine().tick_rates[1] < 20.0);

    let shared = plugin.shared_rate().expect("running");
    assert_eq!(shared.snapshot().tick, SimTick(2));

    plugin.on_server_stop();
    assert_eq!(plugin.state(), PluginState::Stopped);
    assert_eq!(
        plugin.engine().lifecycle,
        vec!["enable_core", "api_initialized", "api_terminated", "disable_core"]
    );
    assert!(plugin.process_tick().is_none());
    assert!(plugin.shared_rate().is_none());

    // Stopping twice and restarting are both rejected without side effects.
    plugin.on_server_stop();
    assert!(plugin.on_server_start(&modded_host()).is_err());
}

#[test]
fn chunk_allowance_comes_from_engine_each_tick() {
    let time = ManualClock::new();
    let engine = RecordingEngine {
        max_chunk_loads_per_tick: 3,
        ..RecordingEngine::default()
    };
    let mut plugin = MapPlugin::new(engine, PluginConfig::default(), time.clone());
    plugin
        .on_server_start(&StaticHost::new("1.8"))
        .expect("start");

    time.advance_nanos(NOMINAL);
    plugin.process_tick();
    let clock = plugin.tick_clock_mut().expect("running");
    assert!(clock.try_consume_units(3));
    assert!(!clock.try_consume_units(1));

    time.advance_nanos(NOMINAL);
    plugin.process_tick();
    assert_eq!(plugin.tick_clock().map(|c| c.units_this_tick()), Some(3));
}

#[test]
fn declined_engine_is_never_ticked() {
    let engine = RecordingEngine {
        accept_enable: false,
        ..RecordingEngine::default()
    };
    let mut plugin = MapPlugin::new(engine, PluginConfig::default(), ManualClock::new());
    let started = plugin
        .on_server_start(&StaticHost::new("1.8.9"))
        .expect("start");
    assert!(!started);
    assert!(plugin.process_tick().is_none());
    assert!(plugin.engine().tick_rates.is_empty());
    assert!(plugin.engine().setup.is_some());
    assert_eq!(plugin.engine().lifecycle, vec!["enable_core"]);

    plugin.on_server_stop();
    assert_eq!(plugin.engine().lifecycle, vec!["enable_core"]);
}

#[test]
fn world_events_maintain_registry() {
    let mut plugin = MapPlugin::new(
        RecordingEngine::default(),
        PluginConfig::default(),
        ManualClock::new(),
    );
    plugin
        .on_server_start(&StaticHost::new("1.8.9"))
        .expect("start");

    plugin.on_world_load(&HostWorld::new("world_the_end").with_dimension(DimensionId::End));
    assert_eq!(plugin.worlds().len(), 2);

    plugin.on_world_unload("world_the_end");
    plugin.on_world_unload("never_loaded");
    let end = plugin.worlds().world_by_name("world_the_end").expect("kept");
    assert!(!end.loaded);
    assert_eq!(end.dimension, DimensionId::End);
    assert_eq!(plugin.core_version(), "recording-engine");
}
