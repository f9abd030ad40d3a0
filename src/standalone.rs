//! In-process engine and host used when no game server is attached.

use mapshim_bridge::{
    BiomeMap, CoreSetup, HostBiome, HostServer, HostWorld, MapEngine, MinecraftVersion,
};
use tracing::{info, warn};

use crate::config::{EngineConfig, HostConfig};

/// Engine that does no rendering and only reports the rate it is fed.
pub struct StandaloneEngine {
    config: EngineConfig,
    report_every: u64,
    ticks: u64,
    last_tps: f64,
}

impl StandaloneEngine {
    pub fn new(config: EngineConfig, report_every: u64) -> Self {
        Self {
            config,
            report_every,
            ticks: 0,
            last_tps: 0.0,
        }
    }

    pub fn last_tps(&self) -> f64 {
        self.last_tps
    }
}

impl MapEngine for StandaloneEngine {
    fn version(&self) -> &str {
        concat!("standalone-", env!("CARGO_PKG_VERSION"))
    }

    fn enable_core(&mut self, setup: &CoreSetup) -> bool {
        info!(
            platform = %setup.platform,
            version = %setup.minecraft_version,
            data_folder = %setup.data_folder.display(),
            blocks = setup.block_names.len(),
            biomes = setup.biome_names.iter().filter(|name| !name.is_empty()).count(),
            "Standalone engine enabled"
        );
        true
    }

    fn api_initialized(&mut self) {
        info!("Standalone engine API ready");
    }

    fn api_terminated(&mut self) {
        info!("Standalone engine API shutting down");
    }

    fn disable_core(&mut self) {
        info!(ticks = self.ticks, last_tps = self.last_tps, "Standalone engine disabled");
    }

    fn max_tick_use_ms(&self) -> u64 {
        self.config.max_tick_use_ms
    }

    fn max_chunk_loads_per_tick(&self) -> u32 {
        self.config.max_chunk_loads_per_tick
    }

    fn server_tick(&mut self, tps: f64) {
        self.ticks += 1;
        self.last_tps = tps;
        if self.report_every > 0 && self.ticks % self.report_every == 0 {
            info!(tick = self.ticks, tps = format_args!("{tps:.2}"), "Server tick rate");
        }
    }
}

/// Vanilla block names and their materials, by block id.
const BLOCKS: [(&str, &str); 8] = [
    ("air", "air"),
    ("stone", "rock"),
    ("grass", "grass"),
    ("dirt", "ground"),
    ("cobblestone", "rock"),
    ("planks", "wood"),
    ("sapling", "plants"),
    ("bedrock", "rock"),
];

/// Host whose contents come straight from configuration.
pub struct SimulatedHost {
    config: HostConfig,
}

impl SimulatedHost {
    pub fn new(config: HostConfig) -> Self {
        Self { config }
    }
}

impl HostServer for SimulatedHost {
    fn platform_name(&self) -> &str {
        &self.config.platform
    }

    fn minecraft_version(&self) -> &str {
        &self.config.minecraft_version
    }

    /// Vanilla biomes for the configured version followed by the configured extras.
    fn biomes(&self) -> Vec<HostBiome> {
        let vanilla = match MinecraftVersion::parse(&self.config.minecraft_version) {
            Ok(version) => BiomeMap::well_known(&version),
            Err(err) => {
                warn!("{err}; simulating a host without vanilla biomes");
                BiomeMap::new()
            }
        };
        vanilla
            .iter()
            .map(|entry| HostBiome {
                id: Some(format!("minecraft:{}", entry.key.to_lowercase())),
                temperature: entry.temperature,
                humidity: entry.rainfall,
            })
            .chain(self.config.extra_biomes.iter().cloned())
            .collect()
    }

    fn block_names(&self) -> Vec<String> {
        BLOCKS
            .iter()
            .map(|(name, _)| format!("minecraft:{name}"))
            .collect()
    }

    fn block_materials(&self) -> Vec<String> {
        BLOCKS
            .iter()
            .map(|(_, material)| material.to_string())
            .collect()
    }

    fn worlds(&self) -> Vec<HostWorld> {
        self.config.worlds.clone()
    }
}
