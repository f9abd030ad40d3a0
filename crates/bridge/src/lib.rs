#![warn(missing_docs)]
//! Adapter between a game server host and an external map engine.
//!
//! The host side ([`HostServer`]) describes worlds, biomes and blocks; the
//! engine side ([`MapEngine`]) renders and serves maps. [`MapPlugin`] owns the
//! translation state and forwards lifecycle and per-tick events between them.

pub mod biome;
mod engine;
mod host;
pub mod plugin;
mod version;
pub mod world;

pub use biome::{BiomeEntry, BiomeMap, ReconcileReport, BIOME_SLOTS};
pub use engine::{CoreSetup, MapEngine};
pub use host::{HostBiome, HostServer, HostWorld};
pub use plugin::{MapPlugin, PluginConfig, PluginState};
pub use version::{MinecraftVersion, VersionError};
pub use world::{MapWorld, WorldRegistry};
