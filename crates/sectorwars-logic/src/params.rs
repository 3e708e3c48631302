//! Galaxy generation parameters.
//!
//! Before a universe reset, the operator fills in a generation form. This
//! module is the data model for that form, independent of any UI: one closed
//! variant per generation mode, each with a fully typed field set.
//!
//! # Generation Modes
//!
//! | Mode | Shape |
//! |------|-------|
//! | `Flat` | One galaxy of 100 to 2000 sectors split into federation/border/frontier by percentage |
//! | `HubAndTerritories` | A fixed 5000-sector hub (the Expanse) plus a fixed 300-sector territory split by percentage |
//!
//! ```
//! use sectorwars_logic::params::{FlatGalaxyConfig, GalaxyConfig};
//! use sectorwars_logic::validation::validate_config;
//!
//! let mut flat = FlatGalaxyConfig::default();
//! flat.total_sectors = 300;
//! let config = GalaxyConfig::Flat(flat);
//! assert!(validate_config(&config).is_empty());
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{density, sectors};
use crate::universe::zone::ZoneType;

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

/// An inclusive `min..=max` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Band<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Both ends lie inside `lo..=hi`.
    pub fn within(&self, lo: T, hi: T) -> bool {
        self.min >= lo && self.min <= hi && self.max >= lo && self.max <= hi
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Percentage split of sectors across the three security tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    pub federation: u8,
    pub border: u8,
    pub frontier: u8,
}

impl ZoneDistribution {
    pub fn sum(&self) -> u16 {
        self.federation as u16 + self.border as u16 + self.frontier as u16
    }

    pub fn share(&self, zone: ZoneType) -> u8 {
        match zone {
            ZoneType::Federation => self.federation,
            ZoneType::Border => self.border,
            ZoneType::Frontier => self.frontier,
            ZoneType::Expanse => 0,
        }
    }
}

impl Default for ZoneDistribution {
    fn default() -> Self {
        Self {
            federation: 25,
            border: 35,
            frontier: 40,
        }
    }
}

/// How densely the generator populates sectors, all in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityConfig {
    /// Share of sectors hosting a port (5 to 15).
    pub port_density: u8,
    /// Share of sectors hosting a planet (2 to 25).
    pub planet_density: u8,
    /// Share of warp tunnels that are one-way (2 to 8).
    pub one_way_warp_percentage: u8,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            port_density: 10,
            planet_density: 3,
            one_way_warp_percentage: 5,
        }
    }
}

/// Warp tunnel policy applied per region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WarpTunnelConfig {
    pub min_per_region: u32,
    pub max_per_region: u32,
    /// Stability percentage range for generated tunnels.
    pub stability: Band<f32>,
}

impl Default for WarpTunnelConfig {
    fn default() -> Self {
        Self {
            min_per_region: 2,
            max_per_region: 6,
            stability: Band::new(70.0, 100.0),
        }
    }
}

/// Resource richness (0 to 100) and hazard (0 to 10) bands for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBands {
    pub resource_richness: Band<u8>,
    pub hazard_level: Band<u8>,
}

impl ZoneBands {
    pub fn new(resource: (u8, u8), hazard: (u8, u8)) -> Self {
        Self {
            resource_richness: Band::new(resource.0, resource.1),
            hazard_level: Band::new(hazard.0, hazard.1),
        }
    }

    /// Default bands for a zone tier. Safer zones are poorer but calmer.
    pub fn default_for(zone: ZoneType) -> Self {
        match zone {
            ZoneType::Federation => Self::new((20, 50), (0, 2)),
            ZoneType::Border => Self::new((40, 70), (2, 5)),
            ZoneType::Frontier => Self::new((60, 100), (5, 10)),
            ZoneType::Expanse => Self::new((30, 80), (0, 6)),
        }
    }
}

/// Per-tier bands for the three security zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneProfiles {
    pub federation: ZoneBands,
    pub border: ZoneBands,
    pub frontier: ZoneBands,
}

impl ZoneProfiles {
    pub fn get(&self, zone: ZoneType) -> Option<&ZoneBands> {
        match zone {
            ZoneType::Federation => Some(&self.federation),
            ZoneType::Border => Some(&self.border),
            ZoneType::Frontier => Some(&self.frontier),
            ZoneType::Expanse => None,
        }
    }
}

impl Default for ZoneProfiles {
    fn default() -> Self {
        Self {
            federation: ZoneBands::default_for(ZoneType::Federation),
            border: ZoneBands::default_for(ZoneType::Border),
            frontier: ZoneBands::default_for(ZoneType::Frontier),
        }
    }
}

// ============================================================================
// MODES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    Flat,
    HubAndTerritories,
}

impl GenerationMode {
    /// Inclusive bounds on the total sector count for this mode.
    pub fn sector_bounds(&self) -> (u32, u32) {
        match self {
            Self::Flat => (sectors::FLAT_MIN, sectors::FLAT_MAX),
            Self::HubAndTerritories => {
                let fixed = sectors::HUB_SECTORS + sectors::TERRITORY_SECTORS;
                (fixed, fixed)
            }
        }
    }

    /// Largest total incremental sector batches may reach.
    pub fn expansion_limit(&self) -> u32 {
        match self {
            Self::Flat => sectors::FLAT_MAX,
            Self::HubAndTerritories => sectors::HUB_EXPANSION_MAX,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::HubAndTerritories => "hub_and_territories",
        }
    }
}

/// Flat percentage-based galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatGalaxyConfig {
    pub name: String,
    pub total_sectors: u32,
    pub zone_distribution: ZoneDistribution,
    pub density: DensityConfig,
    pub warp_tunnels: WarpTunnelConfig,
    pub zones: ZoneProfiles,
    /// Generation seed (None = server picks).
    pub seed: Option<u64>,
}

impl Default for FlatGalaxyConfig {
    fn default() -> Self {
        Self {
            name: "Milky Way".to_string(),
            total_sectors: sectors::FLAT_DEFAULT,
            zone_distribution: ZoneDistribution::default(),
            density: DensityConfig::default(),
            warp_tunnels: WarpTunnelConfig::default(),
            zones: ZoneProfiles::default(),
            seed: None,
        }
    }
}

/// Central hub plus a territory ring, both with fixed sector counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubTerritoryConfig {
    pub name: String,
    pub hub_sectors: u32,
    pub territory_sectors: u32,
    /// Split of the territory sectors across the three tiers.
    pub territory_distribution: ZoneDistribution,
    pub density: DensityConfig,
    pub warp_tunnels: WarpTunnelConfig,
    /// Bands for the hub (Expanse) zone.
    pub hub_zone: ZoneBands,
    pub zones: ZoneProfiles,
    pub seed: Option<u64>,
}

impl Default for HubTerritoryConfig {
    fn default() -> Self {
        Self {
            name: "Central Nexus".to_string(),
            hub_sectors: sectors::HUB_SECTORS,
            territory_sectors: sectors::TERRITORY_SECTORS,
            territory_distribution: ZoneDistribution::default(),
            density: DensityConfig::default(),
            warp_tunnels: WarpTunnelConfig::default(),
            hub_zone: ZoneBands::default_for(ZoneType::Expanse),
            zones: ZoneProfiles::default(),
            seed: None,
        }
    }
}

/// A galaxy generation request before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GalaxyConfig {
    Flat(FlatGalaxyConfig),
    HubAndTerritories(HubTerritoryConfig),
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        Self::Flat(FlatGalaxyConfig::default())
    }
}

impl GalaxyConfig {
    pub fn mode(&self) -> GenerationMode {
        match self {
            Self::Flat(_) => GenerationMode::Flat,
            Self::HubAndTerritories(_) => GenerationMode::HubAndTerritories,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Flat(c) => &c.name,
            Self::HubAndTerritories(c) => &c.name,
        }
    }

    /// Every sector the generator will create, hub included.
    pub fn total_sectors(&self) -> u32 {
        match self {
            Self::Flat(c) => c.total_sectors,
            Self::HubAndTerritories(c) => c.hub_sectors.saturating_add(c.territory_sectors),
        }
    }

    /// Sectors split by the zone distribution (the territory in hub mode).
    pub fn distributed_sectors(&self) -> u32 {
        match self {
            Self::Flat(c) => c.total_sectors,
            Self::HubAndTerritories(c) => c.territory_sectors,
        }
    }

    pub fn zone_distribution(&self) -> &ZoneDistribution {
        match self {
            Self::Flat(c) => &c.zone_distribution,
            Self::HubAndTerritories(c) => &c.territory_distribution,
        }
    }

    pub fn density(&self) -> &DensityConfig {
        match self {
            Self::Flat(c) => &c.density,
            Self::HubAndTerritories(c) => &c.density,
        }
    }

    pub fn warp_tunnels(&self) -> &WarpTunnelConfig {
        match self {
            Self::Flat(c) => &c.warp_tunnels,
            Self::HubAndTerritories(c) => &c.warp_tunnels,
        }
    }

    pub fn zones(&self) -> &ZoneProfiles {
        match self {
            Self::Flat(c) => &c.zones,
            Self::HubAndTerritories(c) => &c.zones,
        }
    }

    /// Bands for a zone tier, including the hub zone in hub mode.
    pub fn bands_for(&self, zone: ZoneType) -> Option<&ZoneBands> {
        match (self, zone) {
            (Self::HubAndTerritories(c), ZoneType::Expanse) => Some(&c.hub_zone),
            _ => self.zones().get(zone),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        match self {
            Self::Flat(c) => c.seed,
            Self::HubAndTerritories(c) => c.seed,
        }
    }
}

/// Random band `min..=max` with `lo <= min <= max <= hi`.
fn random_band(rng: &mut StdRng, lo: u8, hi: u8) -> Band<u8> {
    let a = rng.gen_range(lo..=hi);
    let b = rng.gen_range(lo..=hi);
    Band::new(a.min(b), a.max(b))
}

/// Build a random but always-valid flat configuration.
pub fn randomize_config(seed: u64) -> GalaxyConfig {
    let mut rng = StdRng::seed_from_u64(seed);

    let federation = rng.gen_range(15..=35u8);
    let border = rng.gen_range(25..=45u8);
    let frontier = 100 - federation - border;

    let min_per_region = rng.gen_range(1..=4u32);
    let max_per_region = min_per_region + rng.gen_range(0..=4u32);
    let stability_min = rng.gen_range(40..=90u8) as f32;

    let mut zones = ZoneProfiles::default();
    for bands in [&mut zones.federation, &mut zones.border, &mut zones.frontier] {
        bands.resource_richness = random_band(&mut rng, 0, 100);
        bands.hazard_level = random_band(&mut rng, 0, 10);
    }

    GalaxyConfig::Flat(FlatGalaxyConfig {
        name: format!("Galaxy {}", seed % 10_000),
        total_sectors: rng.gen_range(sectors::FLAT_MIN..=sectors::FLAT_MAX),
        zone_distribution: ZoneDistribution {
            federation,
            border,
            frontier,
        },
        density: DensityConfig {
            port_density: rng.gen_range(density::PORT_MIN..=density::PORT_MAX),
            planet_density: rng.gen_range(density::PLANET_MIN..=density::PLANET_MAX),
            one_way_warp_percentage: rng
                .gen_range(density::ONE_WAY_WARP_MIN..=density::ONE_WAY_WARP_MAX),
        },
        warp_tunnels: WarpTunnelConfig {
            min_per_region,
            max_per_region,
            stability: Band::new(stability_min, 100.0),
        },
        zones,
        seed: Some(seed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_distribution_sums_to_100() {
        assert_eq!(ZoneDistribution::default().sum(), 100);
    }

    #[test]
    fn band_ordering_and_range() {
        let band = Band::new(2u8, 7u8);
        assert!(band.is_ordered());
        assert!(band.within(0, 10));
        assert!(!band.within(3, 10));
        assert!(band.contains(7));
        assert!(!band.contains(8));
        assert!(!Band::new(9u8, 3u8).is_ordered());
    }

    #[test]
    fn hub_mode_total_includes_hub() {
        let config = GalaxyConfig::HubAndTerritories(HubTerritoryConfig::default());
        assert_eq!(config.total_sectors(), 5300);
        assert_eq!(config.distributed_sectors(), 300);
        assert_eq!(config.mode().sector_bounds(), (5300, 5300));
    }

    #[test]
    fn expanse_bands_only_in_hub_mode() {
        let flat = GalaxyConfig::default();
        assert!(flat.bands_for(ZoneType::Expanse).is_none());
        let hub = GalaxyConfig::HubAndTerritories(HubTerritoryConfig::default());
        assert!(hub.bands_for(ZoneType::Expanse).is_some());
        assert!(hub.bands_for(ZoneType::Border).is_some());
    }

    #[test]
    fn config_serializes_with_mode_tag() {
        let json = serde_json::to_value(GalaxyConfig::default()).unwrap();
        assert_eq!(json["mode"], "flat");
        assert_eq!(json["total_sectors"], 500);
    }

    #[test]
    fn randomize_is_deterministic() {
        assert_eq!(randomize_config(7), randomize_config(7));
    }
}
