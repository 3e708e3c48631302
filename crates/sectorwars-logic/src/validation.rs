//! Configuration and mutation validation.
//!
//! Every rule is checked independently and all violations are returned
//! together so the operator sees the whole list at once. Values outside their
//! ranges are rejected, never clamped. Validation is pure: identical input
//! always gives identical output.
//!
//! ```
//! use sectorwars_logic::params::{FlatGalaxyConfig, GalaxyConfig};
//! use sectorwars_logic::validation::{validate_config, ConfigError};
//!
//! let mut flat = FlatGalaxyConfig::default();
//! flat.zone_distribution.frontier = 41;
//! let errors = validate_config(&GalaxyConfig::Flat(flat));
//! assert_eq!(errors, vec![ConfigError::ZoneSumInvalid(101)]);
//! ```

use std::fmt;

use crate::constants::{bands, density, sectors, warp};
use crate::params::{Band, GalaxyConfig, GenerationMode, ZoneBands};
use crate::protocol::{AddSectorsRequest, CreateWarpTunnelRequest};
use crate::universe::warp::{AccessPolicy, WarpNetwork};
use crate::universe::zone::ZoneType;

/// Which min/max pair a band error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandField {
    Resource(ZoneType),
    Hazard(ZoneType),
    TunnelStability,
}

impl fmt::Display for BandField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(zone) => write!(f, "{} resource richness", zone.label()),
            Self::Hazard(zone) => write!(f, "{} hazard level", zone.label()),
            Self::TunnelStability => write!(f, "warp tunnel stability"),
        }
    }
}

/// A violated configuration or mutation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Galaxy name empty or whitespace.
    EmptyName,
    /// Flat galaxy size outside the mode's bounds.
    SectorCountOutOfRange {
        mode: GenerationMode,
        value: u32,
        min: u32,
        max: u32,
    },
    /// Hub mode requires exactly 5000 hub sectors.
    HubSectorsFixed(u32),
    /// Hub mode requires exactly 300 territory sectors.
    TerritorySectorsFixed(u32),
    /// Zone percentages do not add up to 100.
    ZoneSumInvalid(u16),
    PortDensityOutOfRange(u8),
    PlanetDensityOutOfRange(u8),
    OneWayWarpOutOfRange(u8),
    /// A band with min > max.
    BandInverted { field: BandField, min: f32, max: f32 },
    /// A band reaching outside its global range.
    BandOutOfRange { field: BandField, min: f32, max: f32 },
    TunnelsPerRegionInverted { min: u32, max: u32 },
    /// More tunnels per region than the generator places.
    TunnelsPerRegionTooHigh(u32),
    /// Tunnel stability outside 0 to 100.
    StabilityOutOfRange(f32),
    /// Tunnel turn cost outside 1 to 3.
    TurnCostOutOfRange(u8),
    /// A tunnel from a sector to itself.
    SelfLoopTunnel(u32),
    /// Toll access without a positive toll.
    TollWithoutAmount,
    /// A tunnel already connects these sectors in either direction.
    DuplicateTunnel { source: u32, target: u32 },
    /// A tunnel endpoint that is not a known sector.
    UnknownSector(u32),
    /// Adding zero sectors.
    EmptySectorBatch,
    /// The batch would push the galaxy past its size limit.
    SectorBatchTooLarge { current: u32, adding: u32, max: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "galaxy name must not be empty"),
            Self::SectorCountOutOfRange {
                mode,
                value,
                min,
                max,
            } => write!(
                f,
                "{} galaxies need {} to {} sectors, got {}",
                mode.as_str(),
                min,
                max,
                value
            ),
            Self::HubSectorsFixed(v) => write!(
                f,
                "hub must have exactly {} sectors, got {}",
                sectors::HUB_SECTORS,
                v
            ),
            Self::TerritorySectorsFixed(v) => write!(
                f,
                "territory must have exactly {} sectors, got {}",
                sectors::TERRITORY_SECTORS,
                v
            ),
            Self::ZoneSumInvalid(sum) => {
                write!(f, "zone percentages must sum to 100, got {}", sum)
            }
            Self::PortDensityOutOfRange(v) => write!(
                f,
                "port density must be {} to {}%, got {}%",
                density::PORT_MIN,
                density::PORT_MAX,
                v
            ),
            Self::PlanetDensityOutOfRange(v) => write!(
                f,
                "planet density must be {} to {}%, got {}%",
                density::PLANET_MIN,
                density::PLANET_MAX,
                v
            ),
            Self::OneWayWarpOutOfRange(v) => write!(
                f,
                "one-way warp percentage must be {} to {}%, got {}%",
                density::ONE_WAY_WARP_MIN,
                density::ONE_WAY_WARP_MAX,
                v
            ),
            Self::BandInverted { field, min, max } => {
                write!(f, "{}: min {} exceeds max {}", field, min, max)
            }
            Self::BandOutOfRange { field, min, max } => {
                write!(f, "{}: {} to {} is outside the allowed range", field, min, max)
            }
            Self::TunnelsPerRegionInverted { min, max } => write!(
                f,
                "minimum tunnels per region ({}) exceeds maximum ({})",
                min, max
            ),
            Self::TunnelsPerRegionTooHigh(v) => write!(
                f,
                "at most {} tunnels per region are allowed, got {}",
                warp::MAX_TUNNELS_PER_REGION,
                v
            ),
            Self::StabilityOutOfRange(v) => {
                write!(f, "tunnel stability must be 0 to 100, got {}", v)
            }
            Self::TurnCostOutOfRange(v) => write!(
                f,
                "tunnel turn cost must be {} to {}, got {}",
                warp::TURN_COST_MIN,
                warp::TURN_COST_MAX,
                v
            ),
            Self::SelfLoopTunnel(s) => write!(f, "sector {} cannot tunnel to itself", s),
            Self::TollWithoutAmount => write!(f, "toll tunnels need a positive toll"),
            Self::DuplicateTunnel { source, target } => write!(
                f,
                "a warp tunnel already connects sectors {} and {}",
                source, target
            ),
            Self::UnknownSector(s) => write!(f, "sector {} does not exist", s),
            Self::EmptySectorBatch => write!(f, "must add at least one sector"),
            Self::SectorBatchTooLarge {
                current,
                adding,
                max,
            } => write!(
                f,
                "adding {} sectors to {} exceeds the limit of {}",
                adding, current, max
            ),
        }
    }
}

/// A configuration that passed [`validate_config`].
///
/// The protocol layer only serializes this type, so invalid configurations
/// never reach the network.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(GalaxyConfig);

impl ValidatedConfig {
    pub fn new(config: GalaxyConfig) -> Result<Self, Vec<ConfigError>> {
        let errors = validate_config(&config);
        if errors.is_empty() {
            Ok(Self(config))
        } else {
            Err(errors)
        }
    }

    pub fn config(&self) -> &GalaxyConfig {
        &self.0
    }

    pub fn into_inner(self) -> GalaxyConfig {
        self.0
    }
}

fn check_band_u8(
    band: &Band<u8>,
    field: BandField,
    limit: u8,
    errors: &mut Vec<ConfigError>,
) {
    if !band.is_ordered() {
        errors.push(ConfigError::BandInverted {
            field,
            min: band.min as f32,
            max: band.max as f32,
        });
    }
    if !band.within(0, limit) {
        errors.push(ConfigError::BandOutOfRange {
            field,
            min: band.min as f32,
            max: band.max as f32,
        });
    }
}

fn check_zone_bands(zone: ZoneType, bands: &ZoneBands, errors: &mut Vec<ConfigError>) {
    check_band_u8(
        &bands.resource_richness,
        BandField::Resource(zone),
        bands::RESOURCE_MAX,
        errors,
    );
    check_band_u8(
        &bands.hazard_level,
        BandField::Hazard(zone),
        bands::HAZARD_MAX,
        errors,
    );
}

/// Validate a galaxy configuration, returning all errors found.
pub fn validate_config(config: &GalaxyConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if config.name().trim().is_empty() {
        errors.push(ConfigError::EmptyName);
    }

    match config {
        GalaxyConfig::Flat(flat) => {
            let (min, max) = GenerationMode::Flat.sector_bounds();
            if !(min..=max).contains(&flat.total_sectors) {
                errors.push(ConfigError::SectorCountOutOfRange {
                    mode: GenerationMode::Flat,
                    value: flat.total_sectors,
                    min,
                    max,
                });
            }
        }
        GalaxyConfig::HubAndTerritories(hub) => {
            if hub.hub_sectors != sectors::HUB_SECTORS {
                errors.push(ConfigError::HubSectorsFixed(hub.hub_sectors));
            }
            if hub.territory_sectors != sectors::TERRITORY_SECTORS {
                errors.push(ConfigError::TerritorySectorsFixed(hub.territory_sectors));
            }
        }
    }

    let sum = config.zone_distribution().sum();
    if sum != 100 {
        errors.push(ConfigError::ZoneSumInvalid(sum));
    }

    let d = config.density();
    if !(density::PORT_MIN..=density::PORT_MAX).contains(&d.port_density) {
        errors.push(ConfigError::PortDensityOutOfRange(d.port_density));
    }
    if !(density::PLANET_MIN..=density::PLANET_MAX).contains(&d.planet_density) {
        errors.push(ConfigError::PlanetDensityOutOfRange(d.planet_density));
    }
    if !(density::ONE_WAY_WARP_MIN..=density::ONE_WAY_WARP_MAX)
        .contains(&d.one_way_warp_percentage)
    {
        errors.push(ConfigError::OneWayWarpOutOfRange(d.one_way_warp_percentage));
    }

    let tunnels = config.warp_tunnels();
    if tunnels.min_per_region > tunnels.max_per_region {
        errors.push(ConfigError::TunnelsPerRegionInverted {
            min: tunnels.min_per_region,
            max: tunnels.max_per_region,
        });
    }
    if tunnels.max_per_region > warp::MAX_TUNNELS_PER_REGION {
        errors.push(ConfigError::TunnelsPerRegionTooHigh(tunnels.max_per_region));
    }
    let stability = &tunnels.stability;
    if !stability.is_ordered() {
        errors.push(ConfigError::BandInverted {
            field: BandField::TunnelStability,
            min: stability.min,
            max: stability.max,
        });
    }
    if !stability.within(warp::STABILITY_MIN, warp::STABILITY_MAX) {
        errors.push(ConfigError::BandOutOfRange {
            field: BandField::TunnelStability,
            min: stability.min,
            max: stability.max,
        });
    }

    for zone in ZoneType::ALL {
        if let Some(bands) = config.bands_for(zone) {
            check_zone_bands(zone, bands, &mut errors);
        }
    }

    errors
}

/// Validate a new warp tunnel against the same bounds generation uses.
pub fn validate_new_tunnel(request: &CreateWarpTunnelRequest) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    // NaN fails both comparisons, so test the accepted range instead.
    if !(warp::STABILITY_MIN..=warp::STABILITY_MAX).contains(&request.stability) {
        errors.push(ConfigError::StabilityOutOfRange(request.stability));
    }
    if !(warp::TURN_COST_MIN..=warp::TURN_COST_MAX).contains(&request.turn_cost) {
        errors.push(ConfigError::TurnCostOutOfRange(request.turn_cost));
    }
    if request.source_sector_id == request.target_sector_id {
        errors.push(ConfigError::SelfLoopTunnel(request.source_sector_id));
    }
    if let AccessPolicy::Toll { amount } = request.access {
        if amount == 0 {
            errors.push(ConfigError::TollWithoutAmount);
        }
    }

    errors
}

/// [`validate_new_tunnel`] plus checks against the current network.
pub fn validate_tunnel_against(
    request: &CreateWarpTunnelRequest,
    network: &WarpNetwork,
    known_sectors: &[u32],
) -> Vec<ConfigError> {
    let mut errors = validate_new_tunnel(request);

    for id in [request.source_sector_id, request.target_sector_id] {
        if !known_sectors.contains(&id) {
            errors.push(ConfigError::UnknownSector(id));
        }
    }
    if network.connects(request.source_sector_id, request.target_sector_id)
        || network.connects(request.target_sector_id, request.source_sector_id)
    {
        errors.push(ConfigError::DuplicateTunnel {
            source: request.source_sector_id,
            target: request.target_sector_id,
        });
    }

    errors
}

/// Validate a bulk sector addition to an existing galaxy.
pub fn validate_sector_batch(
    request: &AddSectorsRequest,
    current_total: u32,
    mode: GenerationMode,
) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if request.num_sectors == 0 {
        errors.push(ConfigError::EmptySectorBatch);
    }
    let max = mode.expansion_limit();
    if current_total.saturating_add(request.num_sectors) > max {
        errors.push(ConfigError::SectorBatchTooLarge {
            current: current_total,
            adding: request.num_sectors,
            max,
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FlatGalaxyConfig, HubTerritoryConfig};

    fn flat() -> FlatGalaxyConfig {
        FlatGalaxyConfig {
            total_sectors: 300,
            ..FlatGalaxyConfig::default()
        }
    }

    fn tunnel(stability: f32) -> CreateWarpTunnelRequest {
        CreateWarpTunnelRequest {
            source_sector_id: 1,
            target_sector_id: 2,
            stability,
            turn_cost: 1,
            is_bidirectional: true,
            access: AccessPolicy::Public,
        }
    }

    #[test]
    fn default_configs_are_valid() {
        assert!(validate_config(&GalaxyConfig::default()).is_empty());
        let hub = GalaxyConfig::HubAndTerritories(HubTerritoryConfig::default());
        assert!(validate_config(&hub).is_empty());
    }

    #[test]
    fn scenario_sum_101_is_single_error() {
        let mut config = flat();
        assert!(validate_config(&GalaxyConfig::Flat(config.clone())).is_empty());
        config.zone_distribution.frontier = 41;
        let errors = validate_config(&GalaxyConfig::Flat(config));
        assert_eq!(errors, vec![ConfigError::ZoneSumInvalid(101)]);
    }

    #[test]
    fn empty_name_rejected() {
        let mut config = flat();
        config.name = "   ".to_string();
        assert!(validate_config(&GalaxyConfig::Flat(config)).contains(&ConfigError::EmptyName));
    }

    #[test]
    fn sector_bounds_per_mode() {
        let mut config = flat();
        config.total_sectors = 99;
        let errors = validate_config(&GalaxyConfig::Flat(config.clone()));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::SectorCountOutOfRange { value: 99, .. })));
        config.total_sectors = 2001;
        assert!(!validate_config(&GalaxyConfig::Flat(config)).is_empty());

        let hub = HubTerritoryConfig {
            hub_sectors: 4000,
            ..HubTerritoryConfig::default()
        };
        let errors = validate_config(&GalaxyConfig::HubAndTerritories(hub));
        assert_eq!(errors, vec![ConfigError::HubSectorsFixed(4000)]);
    }

    #[test]
    fn densities_rejected_not_clamped() {
        let mut config = flat();
        config.density.port_density = 16;
        config.density.planet_density = 1;
        config.density.one_way_warp_percentage = 9;
        let errors = validate_config(&GalaxyConfig::Flat(config));
        assert!(errors.contains(&ConfigError::PortDensityOutOfRange(16)));
        assert!(errors.contains(&ConfigError::PlanetDensityOutOfRange(1)));
        assert!(errors.contains(&ConfigError::OneWayWarpOutOfRange(9)));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn all_violations_collected() {
        let mut config = flat();
        config.name.clear();
        config.zone_distribution.border = 0;
        config.warp_tunnels.min_per_region = 9;
        config.warp_tunnels.max_per_region = 3;
        config.zones.frontier.hazard_level = Band::new(8, 4);
        let errors = validate_config(&GalaxyConfig::Flat(config));
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn band_out_of_global_range() {
        let mut config = flat();
        config.zones.border.hazard_level = Band::new(3, 11);
        config.zones.federation.resource_richness = Band::new(10, 101);
        let errors = validate_config(&GalaxyConfig::Flat(config));
        assert!(errors.contains(&ConfigError::BandOutOfRange {
            field: BandField::Hazard(ZoneType::Border),
            min: 3.0,
            max: 11.0,
        }));
        assert!(errors.contains(&ConfigError::BandOutOfRange {
            field: BandField::Resource(ZoneType::Federation),
            min: 10.0,
            max: 101.0,
        }));
    }

    #[test]
    fn stability_band_checked() {
        let mut config = flat();
        config.warp_tunnels.stability = Band::new(90.0, 60.0);
        let errors = validate_config(&GalaxyConfig::Flat(config));
        assert_eq!(
            errors,
            vec![ConfigError::BandInverted {
                field: BandField::TunnelStability,
                min: 90.0,
                max: 60.0,
            }]
        );
    }

    #[test]
    fn validated_config_gate() {
        assert!(ValidatedConfig::new(GalaxyConfig::default()).is_ok());
        let mut config = flat();
        config.total_sectors = 5;
        assert!(ValidatedConfig::new(GalaxyConfig::Flat(config)).is_err());
    }

    #[test]
    fn unstable_tunnel_still_valid() {
        assert!(validate_new_tunnel(&tunnel(65.0)).is_empty());
    }

    #[test]
    fn stability_outside_range_rejected() {
        assert_eq!(
            validate_new_tunnel(&tunnel(-5.0)),
            vec![ConfigError::StabilityOutOfRange(-5.0)]
        );
        assert_eq!(
            validate_new_tunnel(&tunnel(105.0)),
            vec![ConfigError::StabilityOutOfRange(105.0)]
        );
        assert!(!validate_new_tunnel(&tunnel(f32::NAN)).is_empty());
    }

    #[test]
    fn turn_cost_self_loop_and_toll() {
        let mut req = tunnel(80.0);
        req.turn_cost = 4;
        req.target_sector_id = 1;
        req.access = AccessPolicy::Toll { amount: 0 };
        let errors = validate_new_tunnel(&req);
        assert!(errors.contains(&ConfigError::TurnCostOutOfRange(4)));
        assert!(errors.contains(&ConfigError::SelfLoopTunnel(1)));
        assert!(errors.contains(&ConfigError::TollWithoutAmount));
    }

    #[test]
    fn duplicate_tunnel_detected_in_either_direction() {
        let existing = crate::universe::warp::WarpTunnel::new(2, 1, 90.0, 1);
        let network = WarpNetwork::build(&[existing]);
        let errors = validate_tunnel_against(&tunnel(80.0), &network, &[1, 2]);
        assert_eq!(
            errors,
            vec![ConfigError::DuplicateTunnel {
                source: 1,
                target: 2
            }]
        );
        let errors = validate_tunnel_against(&tunnel(80.0), &WarpNetwork::default(), &[1]);
        assert_eq!(errors, vec![ConfigError::UnknownSector(2)]);
    }

    #[test]
    fn sector_batch_limits() {
        let req = AddSectorsRequest { num_sectors: 0 };
        assert!(validate_sector_batch(&req, 500, GenerationMode::Flat)
            .contains(&ConfigError::EmptySectorBatch));
        let req = AddSectorsRequest { num_sectors: 100 };
        assert!(validate_sector_batch(&req, 500, GenerationMode::Flat).is_empty());
        assert_eq!(
            validate_sector_batch(&req, 1950, GenerationMode::Flat),
            vec![ConfigError::SectorBatchTooLarge {
                current: 1950,
                adding: 100,
                max: 2000
            }]
        );
    }

    #[test]
    fn hub_batches_grow_toward_expansion_limit() {
        let req = AddSectorsRequest { num_sectors: 200 };
        let hub = GenerationMode::HubAndTerritories;
        assert!(validate_sector_batch(&req, 5300, hub).is_empty());
        assert_eq!(
            validate_sector_batch(&req, 10_500, hub),
            vec![ConfigError::SectorBatchTooLarge {
                current: 10_500,
                adding: 200,
                max: 10_600
            }]
        );
    }

    #[test]
    fn tunnels_per_region_capped() {
        let mut config = flat();
        config.warp_tunnels.min_per_region = 300_000_000;
        config.warp_tunnels.max_per_region = 300_000_000;
        assert_eq!(
            validate_config(&GalaxyConfig::Flat(config.clone())),
            vec![ConfigError::TunnelsPerRegionTooHigh(300_000_000)]
        );
        config.warp_tunnels.min_per_region = warp::MAX_TUNNELS_PER_REGION;
        config.warp_tunnels.max_per_region = warp::MAX_TUNNELS_PER_REGION;
        assert!(validate_config(&GalaxyConfig::Flat(config)).is_empty());
    }

    #[test]
    fn errors_describe_rule() {
        assert_eq!(
            ConfigError::ZoneSumInvalid(101).to_string(),
            "zone percentages must sum to 100, got 101"
        );
        assert_eq!(
            ConfigError::PortDensityOutOfRange(20).to_string(),
            "port density must be 5 to 15%, got 20%"
        );
        assert_eq!(
            ConfigError::StabilityOutOfRange(105.0).to_string(),
            "tunnel stability must be 0 to 100, got 105"
        );
        let messages = [
            ConfigError::SectorCountOutOfRange {
                mode: GenerationMode::Flat,
                value: 50,
                min: 100,
                max: 2000,
            },
            ConfigError::TurnCostOutOfRange(4),
            ConfigError::TunnelsPerRegionTooHigh(60),
        ];
        for error in messages {
            let text = error.to_string();
            assert!(text.is_ascii(), "{}", text);
        }
    }
}
