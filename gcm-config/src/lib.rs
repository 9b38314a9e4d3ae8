//! Loads the static fleet topology a deployment needs before it can
//! build a `ZoneMap` or start exchanging anything: which rank owns
//! each zone, how many zones exist, whether collision coupling runs
//! at all, and an optional log-level override.

use gcm_mesh::ZoneId;
use serde::Deserialize;

/// The on-disk shape of a fleet-topology file.
///
/// ```toml
/// zone_ranks = [0, 0, 1, 1]
/// collision_coupling = true
/// log_level = "debug"
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct FleetConfig {
    /// `zone_ranks[z]` is the rank that owns zone `z`.
    pub zone_ranks: Vec<u32>,
    #[serde(default = "default_collision_coupling")]
    pub collision_coupling: bool,
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_collision_coupling() -> bool {
    true
}

impl FleetConfig {
    pub fn from_str(toml_text: &str) -> gcm_base::Result<Self> {
        let config: FleetConfig = toml::from_str(toml_text)?;
        if config.zone_ranks.is_empty() {
            return Err(gcm_base::err("fleet config names no zones"));
        }
        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> gcm_base::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    pub fn zone_count(&self) -> usize {
        self.zone_ranks.len()
    }

    /// The number of distinct ranks this topology spreads zones over.
    pub fn world_size(&self) -> usize {
        self.zone_ranks.iter().copied().max().map_or(0, |m| m as usize + 1)
    }

    /// Builds the `ZoneMap` this topology describes.
    pub fn zone_map(&self) -> gcm_exchange::ZoneMap {
        gcm_exchange::ZoneMap::new(self.zone_ranks.iter().map(|&r| gcm_net::Rank(r)).collect())
    }

    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        (0..self.zone_ranks.len() as u32).map(ZoneId)
    }
}
