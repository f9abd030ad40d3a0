use std::path::PathBuf;

/// Everything the engine needs to know about the host before enabling.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSetup {
    /// Version of this adapter.
    pub plugin_version: String,
    /// Host platform name (e.g. `Sponge`).
    pub platform: String,
    /// Game version reported by the host.
    pub minecraft_version: String,
    /// Directory the engine keeps its configuration and tiles in.
    pub data_folder: PathBuf,
    /// Block names indexed by numeric block id.
    pub block_names: Vec<String>,
    /// Material names indexed by numeric block id.
    pub block_materials: Vec<String>,
    /// Biome names indexed by numeric biome id (empty for unknown ids).
    pub biome_names: Vec<String>,
}

/// The external map engine this adapter drives.
///
/// Rendering, tile caching and web serving all live behind this trait.
pub trait MapEngine {
    /// Engine version string.
    fn version(&self) -> &str;

    /// Bring the engine up. Returning `false` means the engine declined
    /// (bad configuration, missing data folder) and must not be ticked.
    fn enable_core(&mut self, setup: &CoreSetup) -> bool;

    /// Called once the engine is enabled and the adapter's API surface is ready.
    fn api_initialized(&mut self);

    /// Called before `disable_core`, while the API surface is still usable.
    fn api_terminated(&mut self);

    /// Shut the engine down.
    fn disable_core(&mut self);

    /// Maximum milliseconds of background work per tick.
    fn max_tick_use_ms(&self) -> u64;

    /// Chunk loads the engine may perform in the coming tick.
    fn max_chunk_loads_per_tick(&self) -> u32;

    /// Per-tick notification carrying the current ticks-per-second estimate.
    fn server_tick(&mut self, tps: f64);
}
