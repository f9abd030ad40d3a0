use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an invalid [`MinecraftVersion`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid game version {input:?}")]
pub struct VersionError {
    input: String,
}

/// Dotted game version, compared component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MinecraftVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component (0 when absent).
    pub patch: u32,
}

impl MinecraftVersion {
    /// Build a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `major[.minor[.patch]]`, ignoring any `-suffix` (e.g. `1.8-pre1`).
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let err = || VersionError {
            input: input.to_string(),
        };
        let core = input.trim().split('-').next().unwrap_or_default();
        if core.is_empty() {
            return Err(err());
        }

        let mut parts = [0u32; 3];
        for (i, part) in core.split('.').enumerate() {
            if i >= parts.len() {
                return Err(err());
            }
            parts[i] = part.parse().map_err(|_| err())?;
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for MinecraftVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for MinecraftVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
