//! Engine and host stand-ins for exercising the bridge without a game server.

use mapshim_bridge::{CoreSetup, HostBiome, HostServer, HostWorld, MapEngine};

/// Engine that records every call it receives.
#[derive(Debug, Clone)]
pub struct RecordingEngine {
    /// Value returned from [`MapEngine::enable_core`].
    pub accept_enable: bool,
    /// Value returned from [`MapEngine::max_tick_use_ms`].
    pub max_tick_use_ms: u64,
    /// Value returned from [`MapEngine::max_chunk_loads_per_tick`].
    pub max_chunk_loads_per_tick: u32,
    /// Setup passed to the last `enable_core`.
    pub setup: Option<CoreSetup>,
    /// Lifecycle calls (`enable_core`, `api_initialized`, `api_terminated`,
    /// `disable_core`), in call order.
    pub lifecycle: Vec<&'static str>,
    /// Rates passed to `server_tick`, in call order.
    pub tick_rates: Vec<f64>,
}

impl Default for RecordingEngine {
    fn default() -> Self {
        Self {
            accept_enable: true,
            max_tick_use_ms: 50,
            max_chunk_loads_per_tick: 200,
            setup: None,
            lifecycle: Vec::new(),
            tick_rates: Vec::new(),
        }
    }
}

impl MapEngine for RecordingEngine {
    fn version(&self) -> &str {
        "recording-engine"
    }

    fn enable_core(&mut self, setup: &CoreSetup) -> bool {
        self.lifecycle.push("enable_core");
        self.setup = Some(setup.clone());
        self.accept_enable
    }

    fn api_initialized(&mut self) {
        self.lifecycle.push("api_initialized");
    }

    fn api_terminated(&mut self) {
        self.lifecycle.push("api_terminated");
    }

    fn disable_core(&mut self) {
        self.lifecycle.push("disable_core");
    }

    fn max_tick_use_ms(&self) -> u64 {
        self.max_tick_use_ms
    }

    fn max_chunk_loads_per_tick(&self) -> u32 {
        self.max_chunk_loads_per_tick
    }

    fn server_tick(&mut self, tps: f64) {
        self.tick_rates.push(tps);
    }
}

/// Host with fixed, caller-supplied contents.
#[derive(Debug, Clone)]
pub struct StaticHost {
    /// Platform name.
    pub platform: String,
    /// Game version.
    pub version: String,
    /// Biome list.
    pub biomes: Vec<HostBiome>,
    /// Block names.
    pub blocks: Vec<String>,
    /// Block materials, parallel to `blocks`.
    pub materials: Vec<String>,
    /// Worlds loaded at startup.
    pub worlds: Vec<HostWorld>,
}

impl StaticHost {
    /// Host on `version` with one overworld named `world` and no biomes.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            platform: "Static".to_string(),
            version: version.into(),
            biomes: Vec::new(),
            blocks: vec!["air".to_string(), "stone".to_string()],
            materials: vec!["air".to_string(), "rock".to_string()],
            worlds: vec![HostWorld::new("world")],
        }
    }
}

impl HostServer for StaticHost {
    fn platform_name(&self) -> &str {
        &self.platform
    }

    fn minecraft_version(&self) -> &str {
        &self.version
    }

    fn biomes(&self) -> Vec<HostBiome> {
        self.biomes.clone()
    }

    fn block_names(&self) -> Vec<String> {
        self.blocks.clone()
    }

    fn block_materials(&self) -> Vec<String> {
        self.materials.clone()
    }

    fn worlds(&self) -> Vec<HostWorld> {
        self.worlds.clone()
    }
}
