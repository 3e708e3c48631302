//! Galaxy: the root of a universe, with aggregate statistics.

use serde::{Deserialize, Serialize};

use crate::params::ZoneDistribution;

/// Aggregate counts the server maintains for a galaxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyStatistics {
    pub total_sectors: u32,
    pub discovered_sectors: u32,
    pub port_count: u32,
    pub planet_count: u32,
    pub warp_tunnel_count: u32,
    pub player_count: u32,
    pub team_count: u32,
    pub genesis_count: u32,
}

fn pct(part: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32 * 100.0
    }
}

impl GalaxyStatistics {
    /// Discovered share of all sectors, in percent.
    pub fn discovered_pct(&self) -> f32 {
        pct(self.discovered_sectors, self.total_sectors)
    }

    pub fn port_pct(&self) -> f32 {
        pct(self.port_count, self.total_sectors)
    }

    pub fn planet_pct(&self) -> f32 {
        pct(self.planet_count, self.total_sectors)
    }
}

/// Densities as the server reports them after generation; may be fractional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservedDensity {
    pub port_density: f32,
    pub planet_density: f32,
    pub one_way_warp_percentage: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Galaxy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub region_distribution: ZoneDistribution,
    #[serde(default)]
    pub statistics: GalaxyStatistics,
    #[serde(default)]
    pub density: ObservedDensity,
    #[serde(default)]
    pub max_sectors: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Galaxy {
    pub fn exploration_pct(&self) -> f32 {
        self.statistics.discovered_pct()
    }
}
