//! Universe entity model.
//!
//! A `Universe` is an immutable snapshot of one galaxy: its zones, its
//! sectors (with any hosted port or planet) and the warp tunnels between
//! them. Accessors never mutate; editing produces a new value.
//!
//! # Entities
//!
//! | Module | Entity |
//! |--------|--------|
//! | [`galaxy`] | Galaxy root and aggregate statistics |
//! | [`zone`] | Security zones owning sector ranges |
//! | [`sector`] | Sectors, coordinates, resources |
//! | [`port`] | Trading ports and class gates |
//! | [`planet`] | Planets, colonist tracks, defenses |
//! | [`warp`] | Warp tunnels and the directed network |

pub mod galaxy;
pub mod planet;
pub mod port;
pub mod sector;
pub mod warp;
pub mod zone;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use self::galaxy::{Galaxy, GalaxyStatistics};
use self::planet::ResourceTrack;
use self::port::{Commodity, PortService};
use self::sector::Sector;
use self::warp::{WarpNetwork, WarpTunnel};
use self::zone::Zone;

/// A violated entity or cross-entity invariant.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityError {
    // Zones
    InvalidSectorRange { zone: String, start: u32, end: u32 },
    ZoneBandInvalid { zone: String, field: &'static str },
    // Ports
    TaxRateOutOfRange(f32),
    TooManyDrones { drones: u32, max: u32 },
    ServiceNotAllowed { service: PortService, class: u8 },
    TurretsNotAllowed(u8),
    DefenseGridNotAllowed(u8),
    MissingCommodity(Commodity),
    // Planets
    ColonistsOverCapacity {
        track: ResourceTrack,
        colonists: u32,
        capacity: u32,
    },
    CitadelOutOfRange(u8),
    ShieldOutOfRange(u8),
    // Sectors
    HazardOutOfRange { sector: u32, hazard: f32 },
    YieldOutOfRange(u32),
    YieldWithoutAsteroids(u32),
    MisplacedPort { sector: u32, port_sector: u32 },
    MisplacedPlanet { sector: u32, planet_sector: u32 },
    // Tunnels
    StabilityOutOfRange(f32),
    TurnCostOutOfRange(u8),
    SelfLoop(u32),
    // Cross-entity
    DuplicateSectorId(u32),
    UnknownZone { sector: u32, zone_id: String },
    SectorOutsideZone { sector: u32, zone: String },
    ForeignZone(String),
    DanglingTunnel { source: u32, target: u32, missing: u32 },
    ZoneSharesMismatch { zoned: u32, sectors: u32 },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSectorRange { zone, start, end } => {
                write!(f, "zone {} has invalid sector range {}..={}", zone, start, end)
            }
            Self::ZoneBandInvalid { zone, field } => {
                write!(f, "zone {} has an invalid {} band", zone, field)
            }
            Self::TaxRateOutOfRange(v) => write!(f, "port tax rate {}% is outside 0.5 to 5%", v),
            Self::TooManyDrones { drones, max } => {
                write!(f, "{} defense drones exceed the class maximum of {}", drones, max)
            }
            Self::ServiceNotAllowed { service, class } => {
                write!(f, "class {} ports cannot offer {:?}", class, service)
            }
            Self::TurretsNotAllowed(class) => write!(f, "class {} ports cannot have turrets", class),
            Self::DefenseGridNotAllowed(class) => {
                write!(f, "class {} ports cannot have a defense grid", class)
            }
            Self::MissingCommodity(c) => write!(f, "port does not list {:?}", c),
            Self::ColonistsOverCapacity {
                track,
                colonists,
                capacity,
            } => write!(
                f,
                "{:?} track has {} colonists but capacity {}",
                track, colonists, capacity
            ),
            Self::CitadelOutOfRange(v) => write!(f, "citadel level {} is outside 0 to 5", v),
            Self::ShieldOutOfRange(v) => write!(f, "shield level {} is outside 0 to 3", v),
            Self::HazardOutOfRange { sector, hazard } => {
                write!(f, "sector {} hazard {} is outside 0 to 10", sector, hazard)
            }
            Self::YieldOutOfRange(s) => write!(f, "sector {} has an asteroid yield above 10", s),
            Self::YieldWithoutAsteroids(s) => {
                write!(f, "sector {} has yields but no asteroids", s)
            }
            Self::MisplacedPort {
                sector,
                port_sector,
            } => write!(f, "sector {} hosts a port of sector {}", sector, port_sector),
            Self::MisplacedPlanet {
                sector,
                planet_sector,
            } => write!(
                f,
                "sector {} hosts a planet of sector {}",
                sector, planet_sector
            ),
            Self::StabilityOutOfRange(v) => write!(f, "tunnel stability {} is outside 0 to 100", v),
            Self::TurnCostOutOfRange(v) => write!(f, "tunnel turn cost {} is outside 1 to 3", v),
            Self::SelfLoop(s) => write!(f, "tunnel loops from sector {} to itself", s),
            Self::DuplicateSectorId(s) => write!(f, "sector id {} appears more than once", s),
            Self::UnknownZone { sector, zone_id } => {
                write!(f, "sector {} references unknown zone {}", sector, zone_id)
            }
            Self::SectorOutsideZone { sector, zone } => {
                write!(f, "sector {} lies outside the range of zone {}", sector, zone)
            }
            Self::ForeignZone(zone) => write!(f, "zone {} belongs to another galaxy", zone),
            Self::DanglingTunnel {
                source,
                target,
                missing,
            } => write!(
                f,
                "tunnel {} -> {} references missing sector {}",
                source, target, missing
            ),
            Self::ZoneSharesMismatch { zoned, sectors } => write!(
                f,
                "zones cover {} sectors but the galaxy has {}",
                zoned, sectors
            ),
        }
    }
}

/// One galaxy and everything in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub galaxy: Galaxy,
    pub zones: Vec<Zone>,
    pub sectors: Vec<Sector>,
    pub tunnels: Vec<WarpTunnel>,
}

impl Universe {
    pub fn network(&self) -> WarpNetwork {
        WarpNetwork::build(&self.tunnels)
    }

    pub fn sector(&self, sector_id: u32) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.sector_id == sector_id)
    }

    pub fn sector_ids(&self) -> Vec<u32> {
        self.sectors.iter().map(|s| s.sector_id).collect()
    }

    /// Statistics recounted from the entities.
    ///
    /// Player, team and genesis counts are not derivable from the map and
    /// are carried over from the galaxy record.
    pub fn compute_statistics(&self) -> GalaxyStatistics {
        let carried = self.galaxy.statistics;
        GalaxyStatistics {
            total_sectors: self.sectors.len() as u32,
            discovered_sectors: self.sectors.iter().filter(|s| s.is_discovered).count() as u32,
            port_count: self.sectors.iter().filter(|s| s.has_port()).count() as u32,
            planet_count: self.sectors.iter().filter(|s| s.has_planet()).count() as u32,
            warp_tunnel_count: self.tunnels.len() as u32,
            player_count: carried.player_count,
            team_count: carried.team_count,
            genesis_count: carried.genesis_count,
        }
    }

    /// The same universe with freshly computed statistics.
    pub fn with_recomputed_statistics(&self) -> Universe {
        let mut next = self.clone();
        next.galaxy.statistics = self.compute_statistics();
        next
    }
}

/// Check every entity and every cross-entity invariant, returning all errors.
pub fn validate_universe(universe: &Universe) -> Vec<EntityError> {
    let mut errors = Vec::new();

    let zones: HashMap<&str, &Zone> = universe.zones.iter().map(|z| (z.id.as_str(), z)).collect();
    for zone in &universe.zones {
        if zone.galaxy_id != universe.galaxy.id {
            errors.push(EntityError::ForeignZone(zone.id.clone()));
        }
        errors.extend(zone::validate_zone(zone));
    }

    let mut seen = HashSet::new();
    for s in &universe.sectors {
        if !seen.insert(s.sector_id) {
            errors.push(EntityError::DuplicateSectorId(s.sector_id));
        }
        match zones.get(s.zone_id.as_str()) {
            None => errors.push(EntityError::UnknownZone {
                sector: s.sector_id,
                zone_id: s.zone_id.clone(),
            }),
            Some(zone) if !zone.contains_sector(s.sector_id) => {
                errors.push(EntityError::SectorOutsideZone {
                    sector: s.sector_id,
                    zone: zone.id.clone(),
                })
            }
            Some(_) => {}
        }
        errors.extend(sector::validate_sector(s));
    }

    for t in &universe.tunnels {
        for endpoint in [t.source_sector_id, t.target_sector_id] {
            if !seen.contains(&endpoint) {
                errors.push(EntityError::DanglingTunnel {
                    source: t.source_sector_id,
                    target: t.target_sector_id,
                    missing: endpoint,
                });
            }
        }
        errors.extend(warp::validate_tunnel(t));
    }

    let zoned: u32 = universe.zones.iter().map(Zone::sector_count).sum();
    let total = universe.sectors.len() as u32;
    if zoned != total {
        errors.push(EntityError::ZoneSharesMismatch {
            zoned,
            sectors: total,
        });
    }

    errors
}
