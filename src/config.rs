use anyhow::Result;
use mapshim_bridge::{HostBiome, HostWorld, PluginConfig};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/mapshim.toml";

/// Everything the headless host reads from `config/mapshim.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub plugin: PluginConfig,
    pub engine: EngineConfig,
    pub host: HostConfig,
}

/// Settings the standalone engine reports back to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Milliseconds of background work allowed per tick.
    pub max_tick_use_ms: u64,
    /// Chunk loads allowed per tick.
    pub max_chunk_loads_per_tick: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tick_use_ms: 50,
            max_chunk_loads_per_tick: 200,
        }
    }
}

/// Description of the simulated game server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    pub platform: String,
    pub minecraft_version: String,
    pub worlds: Vec<HostWorld>,
    /// Modded biomes appended after the vanilla list.
    pub extra_biomes: Vec<HostBiome>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            platform: "Sponge".to_string(),
            minecraft_version: "1.8.9".to_string(),
            worlds: vec![HostWorld::new("world")],
            extra_biomes: Vec::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<ServiceConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    ServiceConfig::default()
                }
            },
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    warn!("Config not found at {}. Using defaults", path.display());
                } else {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                ServiceConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapshim_core::DimensionId;
    use mapshim_tick::StallPolicy;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("mapshim_config_{timestamp}"))
            .join(name)
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = ServiceConfig::load_from_path(&temp_path("absent.toml"));
        assert_eq!(cfg, ServiceConfig::default());
        assert_eq!(cfg.plugin.tick.nominal_tick_ms, 50);
        assert_eq!(cfg.engine.max_tick_use_ms, 50);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let path = temp_path("partial.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"
[plugin.tick]
stall_policy = { max_multiple = 10 }

[host]
minecraft_version = "1.7.10"

[[host.worlds]]
name = "DIM-1"
dimension = "nether"

[[host.extra_biomes]]
id = "modded:crystal_fields"
temperature = 0.4
humidity = 0.7
"#,
        )
        .unwrap();

        let cfg = ServiceConfig::load_from_path(&path);
        assert_eq!(cfg.plugin.tick.nominal_tick_ms, 50);
        assert_eq!(cfg.plugin.tick.stall_policy, StallPolicy::MaxMultiple(10));
        assert_eq!(cfg.host.platform, "Sponge");
        assert_eq!(cfg.host.minecraft_version, "1.7.10");
        assert_eq!(cfg.host.worlds.len(), 1);
        assert_eq!(cfg.host.worlds[0].dimension, DimensionId::Nether);
        assert_eq!(cfg.host.worlds[0].sea_level, 63);
        assert_eq!(cfg.host.extra_biomes.len(), 1);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn invalid_file_uses_defaults() {
        let path = temp_path("broken.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "engine = 12").unwrap();
        assert_eq!(ServiceConfig::load_from_path(&path), ServiceConfig::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn saved_config_loads_back() {
        let path = temp_path("saved.toml");
        let mut cfg = ServiceConfig::default();
        cfg.engine.max_chunk_loads_per_tick = 12;
        cfg.save_to_path(&path).expect("save");
        assert_eq!(ServiceConfig::load_from_path(&path), cfg);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
