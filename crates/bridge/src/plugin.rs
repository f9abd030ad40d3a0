//! Adapter lifecycle: server start, per-tick forwarding, server stop.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use mapshim_core::MonotonicClock;
use mapshim_tick::{SharedTickRate, TickBudget, TickClock, TickConfig, TickSample};

use crate::{
    BiomeMap, CoreSetup, HostServer, HostWorld, MapEngine, MinecraftVersion, WorldRegistry,
};

/// Adapter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Directory handed to the engine for its configuration and tiles.
    pub data_folder: PathBuf,
    /// Host tick timing.
    pub tick: TickConfig,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("dynmap"),
            tick: TickConfig::default(),
        }
    }
}

/// Where the adapter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Constructed, engine not enabled yet (or it declined).
    Created,
    /// Engine enabled and receiving ticks.
    Running,
    /// Engine shut down; the adapter cannot be restarted.
    Stopped,
}

/// Owns the translation state between one host and one engine.
pub struct MapPlugin<E, C> {
    engine: E,
    config: PluginConfig,
    state: PluginState,
    clock: Option<C>,
    tick_clock: Option<TickClock<C>>,
    worlds: WorldRegistry,
    biomes: BiomeMap,
}

impl<E: MapEngine, C: MonotonicClock> MapPlugin<E, C> {
    /// Adapter for `engine`, timing ticks with `clock`.
    pub fn new(engine: E, config: PluginConfig, clock: C) -> Self {
        Self {
            engine,
            config,
            state: PluginState::Created,
            clock: Some(clock),
            tick_clock: None,
            worlds: WorldRegistry::new(),
            biomes: BiomeMap::new(),
        }
    }

    /// Enable the engine against `host`.
    ///
    /// Returns `Ok(false)` when the engine declines to start; the adapter then
    /// stays [`PluginState::Created`] and ignores ticks.
    #[instrument(skip_all, fields(platform = host.platform_name()))]
    pub fn on_server_start(&mut self, host: &dyn HostServer) -> Result<bool> {
        if self.state != PluginState::Created {
            bail!("map plugin cannot start from state {:?}", self.state);
        }
        self.config
            .tick
            .validate()
            .context("Invalid tick configuration")?;

        let mc_version = host.minecraft_version().to_string();
        let version = MinecraftVersion::parse(&mc_version)
            .with_context(|| format!("Host reported unusable version {mc_version:?}"))?;
        self.load_biomes(&version, host);

        let setup = CoreSetup {
            plugin_version: env!("CARGO_PKG_VERSION").to_string(),
            platform: host.platform_name().to_string(),
            minecraft_version: mc_version,
            data_folder: self.config.data_folder.clone(),
            block_names: host.block_names(),
            block_materials: host.block_materials(),
            biome_names: self.biomes.names(),
        };
        if !self.engine.enable_core(&setup) {
            warn!("Map engine declined to enable; not ticking");
            return Ok(false);
        }

        for world in host.worlds() {
            self.worlds.get_world(&world);
        }

        let Some(clock) = self.clock.take() else {
            bail!("map plugin clock already consumed");
        };
        let budget = TickBudget::from_millis(self.engine.max_tick_use_ms());
        let tick_clock = TickClock::from_config(&self.config.tick, budget, clock)
            .context("Failed to start tick clock")?;

        info!(
            engine = self.engine.version(),
            budget_ms = budget.ceiling().as_millis() as u64,
            stall_policy = ?tick_clock.stall_policy(),
            worlds = self.worlds.len(),
            "Enabled"
        );
        self.tick_clock = Some(tick_clock);
        self.state = PluginState::Running;
        self.engine.api_initialized();
        Ok(true)
    }

    fn load_biomes(&mut self, version: &MinecraftVersion, host: &dyn HostServer) {
        self.biomes = BiomeMap::well_known(version);
        self.biomes.reconcile(&host.biomes());
    }

    /// Per-tick callback from the host scheduler.
    ///
    /// Returns `None` unless the adapter is running.
    pub fn process_tick(&mut self) -> Option<TickSample> {
        let tick_clock = self.tick_clock.as_mut()?;
        let sample = tick_clock.on_tick(self.engine.max_chunk_loads_per_tick());
        self.engine.server_tick(sample.tps);
        Some(sample)
    }

    /// Host loaded a world after startup.
    pub fn on_world_load(&mut self, world: &HostWorld) {
        self.worlds.get_world(world);
    }

    /// Host unloaded a world.
    pub fn on_world_unload(&mut self, name: &str) {
        if !self.worlds.mark_unloaded(name) {
            warn!(world = name, "Unload for unknown world");
        }
    }

    /// Shut the engine down. Does nothing unless running.
    #[instrument(skip_all)]
    pub fn on_server_stop(&mut self) {
        if self.state != PluginState::Running {
            return;
        }
        self.engine.api_terminated();
        self.engine.disable_core();
        let ticks = self.tick_clock.take().map(|clock| clock.tick_count().0);
        self.state = PluginState::Stopped;
        info!(ticks, "Disabled");
    }

    /// Lifecycle state.
    pub fn state(&self) -> PluginState {
        self.state
    }

    /// Tick estimator, while running.
    pub fn tick_clock(&self) -> Option<&TickClock<C>> {
        self.tick_clock.as_ref()
    }

    /// Mutable tick estimator, for consumers spending the per-tick allowance.
    pub fn tick_clock_mut(&mut self) -> Option<&mut TickClock<C>> {
        self.tick_clock.as_mut()
    }

    /// Cross-thread rate handle, while running.
    pub fn shared_rate(&self) -> Option<SharedTickRate> {
        self.tick_clock.as_ref().map(TickClock::shared_rate)
    }

    /// Known worlds.
    pub fn worlds(&self) -> &WorldRegistry {
        &self.worlds
    }

    /// Reconciled biome registry.
    pub fn biomes(&self) -> &BiomeMap {
        &self.biomes
    }

    /// The driven engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Version of the driven engine.
    pub fn core_version(&self) -> &str {
        self.engine.version()
    }
}
