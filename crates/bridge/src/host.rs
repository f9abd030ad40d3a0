use mapshim_core::DimensionId;
use serde::{Deserialize, Serialize};

/// Biome as described by the host, indexed by its position in the host's biome list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostBiome {
    /// Registry id string, when the host exposes one.
    pub id: Option<String>,
    /// Base temperature.
    pub temperature: f32,
    /// Base humidity (rainfall).
    pub humidity: f32,
}

/// World as described by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostWorld {
    /// Unique world name.
    pub name: String,
    /// Simulated dimension.
    #[serde(default)]
    pub dimension: DimensionId,
    /// Sea level in blocks.
    #[serde(default = "default_sea_level")]
    pub sea_level: i32,
}

fn default_sea_level() -> i32 {
    63
}

impl HostWorld {
    /// Overworld-style world with the default sea level.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dimension: DimensionId::DEFAULT,
            sea_level: default_sea_level(),
        }
    }

    /// Same world in another dimension.
    pub fn with_dimension(mut self, dimension: DimensionId) -> Self {
        self.dimension = dimension;
        self
    }
}

/// The game server hosting the adapter.
pub trait HostServer {
    /// Platform name handed to the engine.
    fn platform_name(&self) -> &str;

    /// Game version string, e.g. `1.8.9`.
    fn minecraft_version(&self) -> &str;

    /// Host biome list; position is the numeric biome id.
    fn biomes(&self) -> Vec<HostBiome>;

    /// Block names indexed by numeric block id.
    fn block_names(&self) -> Vec<String>;

    /// Material names indexed by numeric block id, parallel to `block_names`.
    fn block_materials(&self) -> Vec<String>;

    /// Worlds loaded at startup.
    fn worlds(&self) -> Vec<HostWorld>;
}
