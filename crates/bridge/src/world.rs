//! Host worlds as seen by the map engine.

use std::collections::HashMap;

use mapshim_core::DimensionId;
use tracing::debug;

use crate::HostWorld;

/// Map-side record of a host world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapWorld {
    /// Unique world name.
    pub name: String,
    /// Simulated dimension.
    pub dimension: DimensionId,
    /// Sea level in blocks.
    pub sea_level: i32,
    /// Whether the host currently has the world loaded.
    pub loaded: bool,
}

impl MapWorld {
    fn from_host(world: &HostWorld) -> Self {
        Self {
            name: world.name.clone(),
            dimension: world.dimension,
            sea_level: world.sea_level,
            loaded: true,
        }
    }
}

/// Worlds known to the engine, keyed by name.
///
/// Unloaded worlds keep their entry so the engine can still serve their maps.
/// Event handlers tend to resolve the same world many times in a row, so the
/// slot of the most recently resolved world is checked before the name index.
#[derive(Debug, Default)]
pub struct WorldRegistry {
    worlds: Vec<MapWorld>,
    by_name: HashMap<String, usize>,
    last: Option<usize>,
}

impl WorldRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a host world, registering it on first sight and marking a
    /// previously unloaded entry loaded again.
    pub fn get_world(&mut self, world: &HostWorld) -> &MapWorld {
        let index = match self.cached(&world.name) {
            Some(index) => index,
            None => self.index_or_register(world),
        };
        self.last = Some(index);

        let entry = &mut self.worlds[index];
        if !entry.loaded {
            debug!(world = %world.name, "World loaded again");
            entry.loaded = true;
        }
        entry
    }

    /// World by name, loaded or not.
    pub fn world_by_name(&self, name: &str) -> Option<&MapWorld> {
        let index = match self.cached(name) {
            Some(index) => index,
            None => *self.by_name.get(name)?,
        };
        self.worlds.get(index)
    }

    fn cached(&self, name: &str) -> Option<usize> {
        self.last
            .filter(|&index| self.worlds.get(index).is_some_and(|w| w.name == name))
    }

    fn index_or_register(&mut self, world: &HostWorld) -> usize {
        if let Some(&index) = self.by_name.get(&world.name) {
            return index;
        }
        debug!(
            world = %world.name,
            dimension = world.dimension.as_str(),
            "Registered world"
        );
        let index = self.worlds.len();
        self.worlds.push(MapWorld::from_host(world));
        self.by_name.insert(world.name.clone(), index);
        index
    }

    /// Flag a world as unloaded. Returns `false` for unknown worlds.
    pub fn mark_unloaded(&mut self, name: &str) -> bool {
        let Some(&index) = self.by_name.get(name) else {
            return false;
        };
        self.worlds[index].loaded = false;
        true
    }

    /// Number of known worlds.
    pub fn len(&self) -> usize {
        self.worlds.len()
    }

    /// Whether no world is known.
    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }

    /// All known worlds, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &MapWorld> {
        self.worlds.iter()
    }
}
