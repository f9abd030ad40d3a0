//! Engine-side biome registry and its reconciliation with host biomes.
//!
//! The engine ships with the vanilla biome table. Modded hosts register extra
//! biomes at ids the table does not know, and may retune vanilla temperature
//! and rainfall; [`BiomeMap::reconcile`] folds both into the registry so biome
//! shading matches what the host actually generates.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::{HostBiome, MinecraftVersion};

/// Number of biome ids the engine tracks; host biomes past this are ignored.
pub const BIOME_SLOTS: u32 = 1024;

/// First version carrying the 1.7 biome overhaul (ids 23 through 39).
const BIOME_OVERHAUL: MinecraftVersion = MinecraftVersion::new(1, 7, 0);

/// `(id, key, temperature, rainfall)` for biomes present in every version.
const CLASSIC_BIOMES: &[(u32, &str, f32, f32)] = &[
    (0, "OCEAN", 0.5, 0.5),
    (1, "PLAINS", 0.8, 0.4),
    (2, "DESERT", 2.0, 0.0),
    (3, "EXTREME_HILLS", 0.2, 0.3),
    (4, "FOREST", 0.7, 0.8),
    (5, "TAIGA", 0.25, 0.8),
    (6, "SWAMPLAND", 0.8, 0.9),
    (7, "RIVER", 0.5, 0.5),
    (8, "HELL", 2.0, 0.0),
    (9, "SKY", 0.5, 0.5),
    (10, "FROZEN_OCEAN", 0.0, 0.5),
    (11, "FROZEN_RIVER", 0.0, 0.5),
    (12, "ICE_PLAINS", 0.0, 0.5),
    (13, "ICE_MOUNTAINS", 0.0, 0.5),
    (14, "MUSHROOM_ISLAND", 0.9, 1.0),
    (15, "MUSHROOM_SHORE", 0.9, 1.0),
    (16, "BEACH", 0.8, 0.4),
    (17, "DESERT_HILLS", 2.0, 0.0),
    (18, "FOREST_HILLS", 0.7, 0.8),
    (19, "TAIGA_HILLS", 0.25, 0.8),
    (20, "SMALL_MOUNTAINS", 0.2, 0.3),
    (21, "JUNGLE", 0.95, 0.9),
    (22, "JUNGLE_HILLS", 0.95, 0.9),
];

const OVERHAUL_BIOMES: &[(u32, &str, f32, f32)] = &[
    (23, "JUNGLE_EDGE", 0.95, 0.8),
    (24, "DEEP_OCEAN", 0.5, 0.5),
    (25, "STONE_BEACH", 0.2, 0.3),
    (26, "COLD_BEACH", 0.05, 0.3),
    (27, "BIRCH_FOREST", 0.6, 0.6),
    (28, "BIRCH_FOREST_HILLS", 0.6, 0.6),
    (29, "ROOFED_FOREST", 0.7, 0.8),
    (30, "COLD_TAIGA", -0.5, 0.4),
    (31, "COLD_TAIGA_HILLS", -0.5, 0.4),
    (32, "MEGA_TAIGA", 0.3, 0.8),
    (33, "MEGA_TAIGA_HILLS", 0.3, 0.8),
    (34, "EXTREME_HILLS_PLUS", 0.2, 0.3),
    (35, "SAVANNA", 1.2, 0.0),
    (36, "SAVANNA_PLATEAU", 1.0, 0.0),
    (37, "MESA", 2.0, 0.0),
    (38, "MESA_PLATEAU_FOREST", 2.0, 0.0),
    (39, "MESA_PLATEAU", 2.0, 0.0),
];

/// Biome entry known to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeEntry {
    /// Numeric biome id.
    pub id: u32,
    /// Stable key used in engine configuration (e.g. `PLAINS`).
    pub key: String,
    /// Temperature used for grass/foliage shading.
    pub temperature: f32,
    /// Rainfall used for grass/foliage shading.
    pub rainfall: f32,
}

impl BiomeEntry {
    fn new(id: u32, key: impl Into<String>, temperature: f32, rainfall: f32) -> Self {
        Self {
            id,
            key: key.into(),
            temperature,
            rainfall,
        }
    }
}

/// Outcome of [`BiomeMap::reconcile`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Host biomes registered at previously unknown ids.
    pub added: usize,
    /// Known biomes whose climate was overwritten by host values.
    pub updated: usize,
}

/// Biome registry keyed by numeric id. Ids with no entry are "default" slots.
#[derive(Debug, Clone, Default)]
pub struct BiomeMap {
    entries: BTreeMap<u32, BiomeEntry>,
}

impl BiomeMap {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Vanilla biomes for `version`.
    pub fn well_known(version: &MinecraftVersion) -> Self {
        let mut map = Self::new();
        let overhaul: &[(u32, &str, f32, f32)] = if *version >= BIOME_OVERHAUL {
            OVERHAUL_BIOMES
        } else {
            &[]
        };
        for &(id, key, temperature, rainfall) in CLASSIC_BIOMES.iter().chain(overhaul) {
            map.insert(BiomeEntry::new(id, key, temperature, rainfall));
        }
        map
    }

    fn insert(&mut self, entry: BiomeEntry) {
        debug_assert!(entry.id < BIOME_SLOTS);
        self.entries.insert(entry.id, entry);
    }

    /// Entry at `id`, or `None` for a default slot.
    pub fn by_id(&self, id: u32) -> Option<&BiomeEntry> {
        self.entries.get(&id)
    }

    /// Number of known biomes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no biome is known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BiomeEntry> {
        self.entries.values()
    }

    /// Biome keys indexed by id, with empty strings for default slots.
    pub fn names(&self) -> Vec<String> {
        let Some(max_id) = self.entries.keys().next_back() else {
            return Vec::new();
        };
        let mut names = vec![String::new(); *max_id as usize + 1];
        for entry in self.entries.values() {
            names[entry.id as usize] = entry.key.clone();
        }
        names
    }

    /// Merge the host's biome list into the registry.
    ///
    /// The host biome at position `i` either fills default slot `i` (keyed by
    /// its registry id, or `BIOME_<i>` when it has none) or retunes the climate
    /// of the biome already registered there. Positions at or past
    /// [`BIOME_SLOTS`] are dropped with a warning.
    pub fn reconcile(&mut self, host_biomes: &[HostBiome]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if host_biomes.len() > BIOME_SLOTS as usize {
            warn!(
                host_biomes = host_biomes.len(),
                slots = BIOME_SLOTS,
                "Ignoring host biomes past the last biome slot"
            );
        }

        for (id, host) in (0..BIOME_SLOTS).zip(host_biomes) {
            match self.entries.get_mut(&id) {
                Some(entry) => {
                    entry.temperature = host.temperature;
                    entry.rainfall = host.humidity;
                    report.updated += 1;
                }
                None => {
                    let key = host
                        .id
                        .clone()
                        .unwrap_or_else(|| format!("BIOME_{id}"));
                    let entry = BiomeEntry::new(id, key, host.temperature, host.humidity);
                    debug!(
                        id,
                        key = %entry.key,
                        temperature = entry.temperature,
                        rainfall = entry.rainfall,
                        "Add custom biome"
                    );
                    self.insert(entry);
                    report.added += 1;
                }
            }
        }

        if report.added > 0 {
            info!("Added {} custom biome mappings", report.added);
        }
        report
    }
}
