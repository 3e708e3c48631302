//! Sectors, the atomic nodes of the universe graph.

use serde::{Deserialize, Serialize};

use super::planet::Planet;
use super::port::Port;
use super::warp::WarpNetwork;
use super::EntityError;
use crate::constants::bands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectorSpecialType {
    #[default]
    Normal,
    Nebula,
    AsteroidField,
    RadiationZone,
    WarpStorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Asteroid mining yields, each 0 to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AsteroidYield {
    pub ore: u8,
    pub precious_metals: u8,
    pub radioactives: u8,
}

impl AsteroidYield {
    pub fn is_zero(&self) -> bool {
        self.ore == 0 && self.precious_metals == 0 && self.radioactives == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorResources {
    pub has_asteroids: bool,
    pub asteroid_yield: AsteroidYield,
}

impl SectorResources {
    /// Yields only count when the sector actually has asteroids.
    pub fn effective_yield(&self) -> Option<AsteroidYield> {
        self.has_asteroids.then_some(self.asteroid_yield)
    }
}

/// Which features a sector carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectorFeatures {
    pub has_port: bool,
    pub has_planet: bool,
    pub has_warp_tunnel: bool,
}

impl SectorFeatures {
    pub fn has_any(&self) -> bool {
        self.has_port || self.has_planet || self.has_warp_tunnel
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    /// Unique within the galaxy.
    pub sector_id: u32,
    pub name: String,
    pub zone_id: String,
    #[serde(default)]
    pub cluster_id: Option<String>,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub special_type: SectorSpecialType,
    /// Navigation hazard, continuous 0 to 10.
    pub hazard_level: f32,
    pub is_discovered: bool,
    pub is_navigable: bool,
    pub is_explorable: bool,
    #[serde(default)]
    pub resources: SectorResources,
    #[serde(default)]
    pub port: Option<Port>,
    #[serde(default)]
    pub planet: Option<Planet>,
}

impl Sector {
    pub fn new(sector_id: u32, zone_id: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            sector_id,
            name: format!("Sector {}", sector_id),
            zone_id: zone_id.into(),
            cluster_id: None,
            coordinates,
            special_type: SectorSpecialType::Normal,
            hazard_level: 0.0,
            is_discovered: false,
            is_navigable: true,
            is_explorable: true,
            resources: SectorResources::default(),
            port: None,
            planet: None,
        }
    }

    pub fn has_port(&self) -> bool {
        self.port.is_some()
    }

    pub fn has_planet(&self) -> bool {
        self.planet.is_some()
    }

    /// Feature flags; warp connectivity comes from the network, not the sector.
    pub fn features(&self, network: &WarpNetwork) -> SectorFeatures {
        SectorFeatures {
            has_port: self.has_port(),
            has_planet: self.has_planet(),
            has_warp_tunnel: network.has_tunnel(self.sector_id),
        }
    }
}

pub fn validate_sector(s: &Sector) -> Vec<EntityError> {
    let mut errors = Vec::new();
    let hazard_max = bands::HAZARD_MAX as f32;

    if !(0.0..=hazard_max).contains(&s.hazard_level) {
        errors.push(EntityError::HazardOutOfRange {
            sector: s.sector_id,
            hazard: s.hazard_level,
        });
    }
    let y = s.resources.asteroid_yield;
    if [y.ore, y.precious_metals, y.radioactives]
        .iter()
        .any(|&v| v > bands::YIELD_MAX)
    {
        errors.push(EntityError::YieldOutOfRange(s.sector_id));
    }
    if !s.resources.has_asteroids && !y.is_zero() {
        errors.push(EntityError::YieldWithoutAsteroids(s.sector_id));
    }
    if let Some(port) = &s.port {
        if port.sector_id != s.sector_id {
            errors.push(EntityError::MisplacedPort {
                sector: s.sector_id,
                port_sector: port.sector_id,
            });
        }
        errors.extend(super::port::validate_port(port));
    }
    if let Some(planet) = &s.planet {
        if planet.sector_id != s.sector_id {
            errors.push(EntityError::MisplacedPlanet {
                sector: s.sector_id,
                planet_sector: planet.sector_id,
            });
        }
        errors.extend(super::planet::validate_planet(planet));
    }

    errors
}
