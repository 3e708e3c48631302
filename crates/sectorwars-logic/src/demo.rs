//! Deterministic demo universe.
//!
//! When the game server is unreachable, read views fall back to a universe
//! built locally from the configuration being edited. The same configuration
//! always produces the same universe: every random choice comes from one
//! `StdRng` seeded with the configuration's seed (or [`DEFAULT_SEED`]).
//!
//! The demo honours the configuration the way the generator does. Zone sizes
//! follow [`zone_sector_counts`], exactly [`expected_ports`] sectors get a
//! port and exactly [`expected_planets`] other sectors get a planet, sector
//! hazards and resources stay inside each zone's bands, and each region gets
//! between `min_per_region` and `max_per_region` warp tunnels, fewer only
//! when the region has too few sector pairs to hold them. A backbone of
//! bidirectional tunnels links one gateway sector per region so every region
//! is reachable from every other.
//!
//! ```
//! use sectorwars_logic::demo::demo_universe;
//! use sectorwars_logic::params::GalaxyConfig;
//! use sectorwars_logic::universe::validate_universe;
//!
//! let universe = demo_universe(&GalaxyConfig::default());
//! assert_eq!(universe.sectors.len(), 500);
//! assert!(validate_universe(&universe).is_empty());
//! ```

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::constants::{bands, planet as planet_limits, port as port_limits, sectors, warp};
use crate::estimate::{
    expected_planets, expected_ports, region_tunnel_bounds, zone_sector_counts, ZoneSectorCounts,
    LAYOUT_ORDER,
};
use crate::params::{Band, GalaxyConfig, ZoneBands};
use crate::universe::galaxy::{Galaxy, GalaxyStatistics, ObservedDensity};
use crate::universe::planet::{Planet, PlanetType, ResourceTrack};
use crate::universe::port::{Port, PortClass};
use crate::universe::sector::{Coordinates, Sector, SectorSpecialType};
use crate::universe::warp::{AccessPolicy, WarpTunnel};
use crate::universe::zone::{Zone, ZoneType};
use crate::universe::Universe;

/// Seed used when the configuration leaves the seed to the server.
pub const DEFAULT_SEED: u64 = 0x5EC7_0A25;

pub const DEMO_GALAXY_ID: &str = "demo-galaxy";

/// Sectors per demo cluster.
const CLUSTER_SIZE: u32 = 25;

const SPECIALS: [SectorSpecialType; 4] = [
    SectorSpecialType::Nebula,
    SectorSpecialType::AsteroidField,
    SectorSpecialType::RadiationZone,
    SectorSpecialType::WarpStorm,
];

fn slug(zone: ZoneType) -> &'static str {
    match zone {
        ZoneType::Federation => "federation",
        ZoneType::Border => "border",
        ZoneType::Frontier => "frontier",
        ZoneType::Expanse => "expanse",
    }
}

/// Share of sectors already charted, per zone.
fn discovery_chance(zone: ZoneType) -> f64 {
    match zone {
        ZoneType::Federation => 0.6,
        ZoneType::Border => 0.3,
        ZoneType::Frontier => 0.1,
        ZoneType::Expanse => 0.2,
    }
}

/// Ordered, clamped copy of a band so sampling never panics.
fn sane_u8(band: Band<u8>, max: u8) -> (u8, u8) {
    let lo = band.min.min(band.max).min(max);
    let hi = band.min.max(band.max).min(max);
    (lo, hi)
}

fn sane_f32(band: Band<f32>, lo_limit: f32, hi_limit: f32) -> (f32, f32) {
    let clamp = |v: f32| {
        if v.is_nan() {
            lo_limit
        } else {
            v.clamp(lo_limit, hi_limit)
        }
    };
    let (a, b) = (clamp(band.min), clamp(band.max));
    (a.min(b), a.max(b))
}

/// Zone sizes, held to the galaxy sizes generation accepts so an
/// unvalidated draft still lays out.
fn bounded_counts(config: &GalaxyConfig) -> ZoneSectorCounts {
    match config {
        GalaxyConfig::Flat(flat) => zone_sector_counts(
            flat.total_sectors.clamp(sectors::FLAT_MIN, sectors::FLAT_MAX),
            config.zone_distribution(),
        ),
        GalaxyConfig::HubAndTerritories(_) => {
            let mut counts =
                zone_sector_counts(sectors::TERRITORY_SECTORS, config.zone_distribution());
            counts.expanse = sectors::HUB_SECTORS;
            counts
        }
    }
}

fn layout_zones(config: &GalaxyConfig) -> Vec<Zone> {
    let counts = bounded_counts(config);

    let mut zones = Vec::new();
    let mut next_sector = 1u32;
    for zone_type in LAYOUT_ORDER {
        let count = counts.get(zone_type);
        if count == 0 {
            continue;
        }
        let zone_bands = config
            .bands_for(zone_type)
            .copied()
            .unwrap_or_else(|| ZoneBands::default_for(zone_type));
        zones.push(Zone {
            id: format!("demo-zone-{}", slug(zone_type)),
            galaxy_id: DEMO_GALAXY_ID.to_string(),
            name: zone_type.default_name().to_string(),
            zone_type,
            start_sector: next_sector,
            end_sector: next_sector + count - 1,
            resource_richness: zone_bands.resource_richness,
            hazard_level: zone_bands.hazard_level,
        });
        next_sector += count;
    }
    zones
}

fn demo_sector(rng: &mut StdRng, zone: &Zone, sector_id: u32) -> Sector {
    let coordinates = Coordinates {
        x: rng.gen_range(-500..=500),
        y: rng.gen_range(-500..=500),
        z: rng.gen_range(-50..=50),
    };
    let mut sector = Sector::new(sector_id, zone.id.clone(), coordinates);
    let cluster = (sector_id - zone.start_sector) / CLUSTER_SIZE;
    sector.cluster_id = Some(format!("{}-c{}", zone.id, cluster));

    let (hazard_lo, hazard_hi) = sane_u8(zone.hazard_level, bands::HAZARD_MAX);
    sector.hazard_level = rng.gen_range(hazard_lo as f32..=hazard_hi as f32);
    sector.is_discovered = rng.gen_bool(discovery_chance(zone.zone_type));

    if rng.gen_bool(0.08) {
        sector.special_type = SPECIALS[rng.gen_range(0..SPECIALS.len())];
    }

    let (rich_lo, rich_hi) = sane_u8(zone.resource_richness, bands::RESOURCE_MAX);
    let richness = rng.gen_range(rich_lo..=rich_hi);
    let asteroid_field = sector.special_type == SectorSpecialType::AsteroidField;
    if asteroid_field || rng.gen_bool(richness as f64 / 200.0) {
        let ceiling = (richness / 10).clamp(1, bands::YIELD_MAX);
        sector.resources.has_asteroids = true;
        sector.resources.asteroid_yield.ore = rng.gen_range(0..=ceiling);
        sector.resources.asteroid_yield.precious_metals = rng.gen_range(0..=ceiling);
        sector.resources.asteroid_yield.radioactives = rng.gen_range(0..=ceiling);
    }

    sector
}

fn demo_port(rng: &mut StdRng, sector_id: u32) -> Port {
    let level = rng.gen_range(port_limits::CLASS_MIN..=port_limits::CLASS_MAX);
    let class = PortClass::from_u8(level).unwrap_or(PortClass::Class1);
    let mut port = Port::new(format!("demo-port-{}", sector_id), sector_id, class);
    let tenths = rng.gen_range(
        (port_limits::TAX_MIN * 10.0) as u32..=(port_limits::TAX_MAX * 10.0) as u32,
    );
    port.tax_rate = tenths as f32 / 10.0;
    port.defenses.defense_drones = rng.gen_range(0..=class.max_defense_drones());
    port.defenses.has_turrets = class.allows_turrets() && rng.gen_bool(0.5);
    port.defenses.has_defense_grid = class.allows_defense_grid() && rng.gen_bool(0.5);
    port
}

fn demo_planet(rng: &mut StdRng, sector_id: u32) -> Planet {
    let planet_type = PlanetType::ALL[rng.gen_range(0..PlanetType::ALL.len())];
    let mut planet = Planet::new(format!("demo-planet-{}", sector_id), sector_id, planet_type);
    for track in ResourceTrack::ALL {
        let capacity = planet.tracks.get(track).capacity;
        planet = planet.with_colonists(track, rng.gen_range(0..=capacity / 2));
    }
    planet.defenses.citadel_level = rng.gen_range(0..=planet_limits::CITADEL_MAX);
    planet.defenses.shield_level = rng.gen_range(0..=planet_limits::SHIELD_MAX);
    planet.defenses.defense_drones = rng.gen_range(0..=200);
    planet
}

/// Unordered endpoint pair, so a tunnel blocks both directions.
fn pair(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

fn random_tunnel(rng: &mut StdRng, source: u32, target: u32, stability: (f32, f32)) -> WarpTunnel {
    let mut t = WarpTunnel::new(
        source,
        target,
        rng.gen_range(stability.0..=stability.1),
        rng.gen_range(warp::TURN_COST_MIN..=warp::TURN_COST_MAX),
    );
    if rng.gen_bool(0.1) {
        t.access = AccessPolicy::Toll {
            amount: rng.gen_range(50..=500),
        };
    }
    t
}

/// Place `wanted` tunnels between distinct, unused sector pairs of `zone`.
/// `wanted` must not exceed the zone's free pairs.
fn place_in_region(
    rng: &mut StdRng,
    zone: &Zone,
    wanted: u32,
    stability: (f32, f32),
    taken: &mut HashSet<(u32, u32)>,
    tunnels: &mut Vec<WarpTunnel>,
) {
    let mut placed = 0;
    let mut attempts = 0u32;
    let budget = wanted.saturating_mul(20);
    while placed < wanted && attempts < budget {
        attempts += 1;
        let source = rng.gen_range(zone.start_sector..=zone.end_sector);
        let target = rng.gen_range(zone.start_sector..=zone.end_sector);
        if source == target || !taken.insert(pair(source, target)) {
            continue;
        }
        tunnels.push(random_tunnel(rng, source, target, stability));
        placed += 1;
    }

    // Nearly full regions: sweep the remaining pairs in order.
    for source in zone.start_sector..zone.end_sector {
        for target in source + 1..=zone.end_sector {
            if placed >= wanted {
                return;
            }
            if taken.insert(pair(source, target)) {
                tunnels.push(random_tunnel(rng, source, target, stability));
                placed += 1;
            }
        }
    }
}

fn demo_tunnels(rng: &mut StdRng, config: &GalaxyConfig, zones: &[Zone]) -> Vec<WarpTunnel> {
    let policy = config.warp_tunnels();
    let stability = sane_f32(policy.stability, warp::STABILITY_MIN, warp::STABILITY_MAX);
    let cap = |n: u32| n.min(warp::MAX_TUNNELS_PER_REGION);
    let (min_per, max_per) = (
        cap(policy.min_per_region.min(policy.max_per_region)),
        cap(policy.min_per_region.max(policy.max_per_region)),
    );

    let mut tunnels = Vec::new();
    let mut taken = HashSet::new();
    let mut extras_start = 0;

    // Backbone: each region's gateway links to the next region's gateway.
    for window in zones.windows(2) {
        let (from, to) = (window[0].start_sector, window[1].start_sector);
        taken.insert(pair(from, to));
        tunnels.push(random_tunnel(rng, from, to, stability));
        extras_start += 1;
    }

    for (index, zone) in zones.iter().enumerate() {
        let gateway = index > 0;
        let (lo, hi) = region_tunnel_bounds(zone.sector_count(), gateway, min_per, max_per);
        let quota = rng.gen_range(lo..=hi);
        // The backbone tunnel into this region counts towards its quota.
        let wanted = if gateway { quota.saturating_sub(1) } else { quota };
        place_in_region(rng, zone, wanted, stability, &mut taken, &mut tunnels);
    }

    // One-way share applies to the extras; the backbone stays bidirectional.
    let one_way_pct = config.density().one_way_warp_percentage as u64;
    let one_way = (tunnels.len() as u64 * one_way_pct / 100) as usize;
    let mut extra_indices: Vec<usize> = (extras_start..tunnels.len()).collect();
    extra_indices.shuffle(rng);
    for &i in extra_indices.iter().take(one_way) {
        tunnels[i].is_bidirectional = false;
    }

    tunnels
}

/// Build the demo universe for a configuration. Sizes and tunnel quotas are
/// held to what validation accepts, so any draft produces a universe.
pub fn demo_universe(config: &GalaxyConfig) -> Universe {
    let mut rng = StdRng::seed_from_u64(config.seed().unwrap_or(DEFAULT_SEED));
    let zones = layout_zones(config);

    let mut sectors: Vec<Sector> = zones
        .iter()
        .flat_map(|zone| (zone.start_sector..=zone.end_sector).map(move |id| (zone, id)))
        .map(|(zone, id)| demo_sector(&mut rng, zone, id))
        .collect();

    let total = sectors.len() as u32;
    let density = config.density();
    let ports = expected_ports(total, density.port_density) as usize;
    let planets = expected_planets(total, density.planet_density) as usize;

    let mut order: Vec<usize> = (0..sectors.len()).collect();
    order.shuffle(&mut rng);
    let ports = ports.min(order.len());
    let planets = planets.min(order.len() - ports);
    for &i in &order[..ports] {
        let id = sectors[i].sector_id;
        sectors[i].port = Some(demo_port(&mut rng, id));
    }
    for &i in &order[ports..ports + planets] {
        let id = sectors[i].sector_id;
        sectors[i].planet = Some(demo_planet(&mut rng, id));
    }

    let tunnels = demo_tunnels(&mut rng, config, &zones);

    let galaxy = Galaxy {
        id: DEMO_GALAXY_ID.to_string(),
        name: config.name().to_string(),
        created_at: None,
        last_updated: None,
        region_distribution: *config.zone_distribution(),
        statistics: GalaxyStatistics::default(),
        density: ObservedDensity {
            port_density: density.port_density as f32,
            planet_density: density.planet_density as f32,
            one_way_warp_percentage: density.one_way_warp_percentage as f32,
        },
        max_sectors: Some(config.mode().expansion_limit()),
        description: Some("Demo data; the game server is unavailable".to_string()),
    };

    Universe {
        galaxy,
        zones,
        sectors,
        tunnels,
    }
    .with_recomputed_statistics()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::estimate_summary;
    use crate::params::{FlatGalaxyConfig, HubTerritoryConfig};
    use crate::universe::validate_universe;

    fn flat(total: u32, seed: u64) -> GalaxyConfig {
        GalaxyConfig::Flat(FlatGalaxyConfig {
            total_sectors: total,
            seed: Some(seed),
            ..FlatGalaxyConfig::default()
        })
    }

    #[test]
    fn same_config_same_universe() {
        let config = flat(300, 11);
        assert_eq!(demo_universe(&config), demo_universe(&config));
        assert_ne!(demo_universe(&config), demo_universe(&flat(300, 12)));
    }

    #[test]
    fn counts_match_estimates_exactly() {
        let config = flat(500, 3);
        let universe = demo_universe(&config);
        let summary = estimate_summary(&config);
        let stats = universe.galaxy.statistics;
        assert_eq!(stats.total_sectors, 500);
        assert_eq!(stats.port_count, summary.expected_ports);
        assert_eq!(stats.planet_count, summary.expected_planets);
        assert!(universe
            .sectors
            .iter()
            .all(|s| !(s.has_port() && s.has_planet())));
    }

    #[test]
    fn zones_follow_distribution() {
        let universe = demo_universe(&flat(301, 1));
        let sizes: Vec<u32> = universe.zones.iter().map(Zone::sector_count).collect();
        assert_eq!(sizes, vec![75, 105, 121]);
    }

    #[test]
    fn sectors_stay_inside_zone_bands() {
        let universe = demo_universe(&flat(400, 8));
        for sector in &universe.sectors {
            let zone = universe
                .zones
                .iter()
                .find(|z| z.id == sector.zone_id)
                .unwrap();
            assert!(sector.hazard_level >= zone.hazard_level.min as f32);
            assert!(sector.hazard_level <= zone.hazard_level.max as f32);
        }
    }

    #[test]
    fn tunnels_respect_policy() {
        let config = flat(800, 5);
        let universe = demo_universe(&config);
        let policy = config.warp_tunnels();
        assert!(universe.tunnels.iter().all(|t| policy.stability.contains(t.stability)));

        let (lo, hi) = estimate_summary(&config).tunnel_range;
        let count = universe.tunnels.len() as u32;
        assert!(count >= lo && count <= hi, "{} not in {}..={}", count, lo, hi);

        let one_way = universe.tunnels.iter().filter(|t| !t.is_bidirectional).count();
        let expected = universe.tunnels.len() * config.density().one_way_warp_percentage as usize
            / 100;
        assert_eq!(one_way, expected);
    }

    #[test]
    fn regions_linked_by_backbone() {
        let universe = demo_universe(&flat(600, 9));
        let network = universe.network();
        let gateways: Vec<u32> = universe.zones.iter().map(|z| z.start_sector).collect();
        let reach = network.reachable_from(gateways[0]);
        assert!(gateways.iter().all(|g| reach.contains(g)));
    }

    #[test]
    fn demo_universes_validate() {
        for seed in 0..5 {
            let universe = demo_universe(&flat(100 + seed as u32 * 350, seed));
            assert_eq!(validate_universe(&universe), vec![], "seed {}", seed);
        }
    }

    #[test]
    fn hub_mode_has_expanse_first() {
        let config = GalaxyConfig::HubAndTerritories(HubTerritoryConfig::default());
        let universe = demo_universe(&config);
        assert_eq!(universe.sectors.len(), 5300);
        assert_eq!(universe.zones[0].zone_type, ZoneType::Expanse);
        assert_eq!(universe.zones[0].sector_count(), 5000);
        assert!(validate_universe(&universe).is_empty());
    }

    #[test]
    fn oversized_drafts_are_held_to_generation_bounds() {
        let mut config = FlatGalaxyConfig {
            total_sectors: u32::MAX,
            ..FlatGalaxyConfig::default()
        };
        config.zone_distribution.frontier = 41;
        let universe = demo_universe(&GalaxyConfig::Flat(config));
        assert_eq!(universe.sectors.len(), 2000);
        assert_eq!(validate_universe(&universe), vec![]);

        let hub = HubTerritoryConfig {
            hub_sectors: u32::MAX,
            territory_sectors: u32::MAX,
            ..HubTerritoryConfig::default()
        };
        let universe = demo_universe(&GalaxyConfig::HubAndTerritories(hub));
        assert_eq!(universe.sectors.len(), 5300);
    }

    #[test]
    fn huge_tunnel_quota_is_bounded() {
        let mut config = FlatGalaxyConfig {
            total_sectors: 100,
            seed: Some(4),
            ..FlatGalaxyConfig::default()
        };
        config.warp_tunnels.min_per_region = 300_000_000;
        config.warp_tunnels.max_per_region = 300_000_000;
        let universe = demo_universe(&GalaxyConfig::Flat(config));
        let cap = warp::MAX_TUNNELS_PER_REGION as usize;
        assert_eq!(universe.tunnels.len(), 3 * cap);
        assert_eq!(validate_universe(&universe), vec![]);
    }

    #[test]
    fn small_regions_hold_what_fits() {
        let mut config = FlatGalaxyConfig {
            total_sectors: 100,
            seed: Some(2),
            ..FlatGalaxyConfig::default()
        };
        config.zone_distribution.federation = 1;
        config.zone_distribution.frontier = 64;
        let config = GalaxyConfig::Flat(config);
        let (lo, hi) = estimate_summary(&config).tunnel_range;
        let count = demo_universe(&config).tunnels.len() as u32;
        assert!(count >= lo && count <= hi, "{} not in {}..={}", count, lo, hi);

        let mut dense = FlatGalaxyConfig {
            total_sectors: 100,
            seed: Some(2),
            ..FlatGalaxyConfig::default()
        };
        dense.zone_distribution.federation = 3;
        dense.zone_distribution.frontier = 62;
        dense.warp_tunnels.min_per_region = 50;
        dense.warp_tunnels.max_per_region = 50;
        let dense = GalaxyConfig::Flat(dense);
        let universe = demo_universe(&dense);
        // Three federation sectors hold exactly three tunnels.
        let federation = &universe.zones[0];
        let inside = universe
            .tunnels
            .iter()
            .filter(|t| {
                federation.contains_sector(t.source_sector_id)
                    && federation.contains_sector(t.target_sector_id)
            })
            .count();
        assert_eq!(inside, 3);
        assert_eq!(universe.tunnels.len() as u32, estimate_summary(&dense).tunnel_range.0);
        assert_eq!(validate_universe(&universe), vec![]);
    }
}
