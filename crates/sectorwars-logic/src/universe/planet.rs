//! Planets: colonizable bodies hosted by a sector.
//!
//! Each planet type carries baseline production and breeding rates for the
//! three resource tracks. Colonists are assigned per track and can never
//! exceed that track's capacity.

use serde::{Deserialize, Serialize};

use super::EntityError;
use crate::constants::planet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanetType {
    Terran,
    Oceanic,
    Desert,
    Ice,
    Volcanic,
    GasGiant,
    Barren,
    Jungle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceTrack {
    Fuel,
    Organics,
    Equipment,
}

impl ResourceTrack {
    pub const ALL: [ResourceTrack; 3] = [
        ResourceTrack::Fuel,
        ResourceTrack::Organics,
        ResourceTrack::Equipment,
    ];
}

/// Per-colonist production and breeding rates for one track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackRates {
    pub production: f32,
    pub breeding: f32,
}

impl PlanetType {
    pub const ALL: [PlanetType; 8] = [
        PlanetType::Terran,
        PlanetType::Oceanic,
        PlanetType::Desert,
        PlanetType::Ice,
        PlanetType::Volcanic,
        PlanetType::GasGiant,
        PlanetType::Barren,
        PlanetType::Jungle,
    ];

    /// Baseline rates for a track on this planet type.
    pub fn baseline(&self, track: ResourceTrack) -> TrackRates {
        use ResourceTrack::*;
        let (production, breeding) = match (self, track) {
            (Self::Terran, Fuel) => (1.0, 0.05),
            (Self::Terran, Organics) => (1.5, 0.08),
            (Self::Terran, Equipment) => (1.0, 0.05),
            (Self::Oceanic, Fuel) => (0.6, 0.04),
            (Self::Oceanic, Organics) => (1.8, 0.07),
            (Self::Oceanic, Equipment) => (0.7, 0.03),
            (Self::Desert, Fuel) => (1.2, 0.02),
            (Self::Desert, Organics) => (0.4, 0.02),
            (Self::Desert, Equipment) => (1.3, 0.03),
            (Self::Ice, Fuel) => (0.9, 0.02),
            (Self::Ice, Organics) => (0.3, 0.01),
            (Self::Ice, Equipment) => (0.8, 0.02),
            (Self::Volcanic, Fuel) => (1.8, 0.01),
            (Self::Volcanic, Organics) => (0.2, 0.01),
            (Self::Volcanic, Equipment) => (1.4, 0.02),
            (Self::GasGiant, Fuel) => (2.0, 0.0),
            (Self::GasGiant, Organics) => (0.0, 0.0),
            (Self::GasGiant, Equipment) => (0.2, 0.0),
            (Self::Barren, Fuel) => (0.8, 0.01),
            (Self::Barren, Organics) => (0.1, 0.01),
            (Self::Barren, Equipment) => (1.1, 0.01),
            (Self::Jungle, Fuel) => (0.7, 0.06),
            (Self::Jungle, Organics) => (2.0, 0.09),
            (Self::Jungle, Equipment) => (0.6, 0.04),
        };
        TrackRates {
            production,
            breeding,
        }
    }

    /// Default colonist capacity per track.
    pub fn track_capacity(&self) -> u32 {
        match self {
            Self::Terran => 100_000,
            Self::Oceanic => 80_000,
            Self::Jungle => 70_000,
            Self::Desert => 50_000,
            Self::Ice => 30_000,
            Self::Volcanic => 20_000,
            Self::Barren => 10_000,
            Self::GasGiant => 5_000,
        }
    }
}

/// Production multipliers applied on top of the baseline rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    Agricultural,
    Industrial,
    Military,
    Research,
    #[default]
    Balanced,
}

impl Specialization {
    pub fn multiplier(&self, track: ResourceTrack) -> f32 {
        use ResourceTrack::*;
        match (self, track) {
            (Self::Agricultural, Fuel) => 0.8,
            (Self::Agricultural, Organics) => 1.5,
            (Self::Agricultural, Equipment) => 0.8,
            (Self::Industrial, Fuel) => 0.9,
            (Self::Industrial, Organics) => 0.8,
            (Self::Industrial, Equipment) => 1.5,
            (Self::Military, Fuel) => 0.9,
            (Self::Military, Organics) => 0.9,
            (Self::Military, Equipment) => 1.1,
            (Self::Research, Fuel) => 0.8,
            (Self::Research, Organics) => 0.8,
            (Self::Research, Equipment) => 0.9,
            (Self::Balanced, _) => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackState {
    pub colonists: u32,
    pub capacity: u32,
    pub production_rate: f32,
    pub breeding_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetTracks {
    pub fuel: TrackState,
    pub organics: TrackState,
    pub equipment: TrackState,
}

impl PlanetTracks {
    pub fn get(&self, track: ResourceTrack) -> &TrackState {
        match track {
            ResourceTrack::Fuel => &self.fuel,
            ResourceTrack::Organics => &self.organics,
            ResourceTrack::Equipment => &self.equipment,
        }
    }

    pub fn get_mut(&mut self, track: ResourceTrack) -> &mut TrackState {
        match track {
            ResourceTrack::Fuel => &mut self.fuel,
            ResourceTrack::Organics => &mut self.organics,
            ResourceTrack::Equipment => &mut self.equipment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanetDefenses {
    /// 0 to 5.
    pub citadel_level: u8,
    /// 0 to 3.
    pub shield_level: u8,
    pub defense_drones: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: String,
    pub sector_id: u32,
    pub name: String,
    pub planet_type: PlanetType,
    #[serde(default)]
    pub specialization: Specialization,
    pub tracks: PlanetTracks,
    pub defenses: PlanetDefenses,
}

impl Planet {
    /// An uncolonized planet with its type's default rates and capacities.
    pub fn new(id: impl Into<String>, sector_id: u32, planet_type: PlanetType) -> Self {
        let track = |t: ResourceTrack| {
            let rates = planet_type.baseline(t);
            TrackState {
                colonists: 0,
                capacity: planet_type.track_capacity(),
                production_rate: rates.production,
                breeding_rate: rates.breeding,
            }
        };
        Self {
            id: id.into(),
            sector_id,
            name: format!("Planet {}", sector_id),
            planet_type,
            specialization: Specialization::Balanced,
            tracks: PlanetTracks {
                fuel: track(ResourceTrack::Fuel),
                organics: track(ResourceTrack::Organics),
                equipment: track(ResourceTrack::Equipment),
            },
            defenses: PlanetDefenses::default(),
        }
    }

    /// The same planet with `colonists` assigned to `track`, capped at capacity.
    pub fn with_colonists(&self, track: ResourceTrack, colonists: u32) -> Planet {
        let mut next = self.clone();
        let state = next.tracks.get_mut(track);
        state.colonists = colonists.min(state.capacity);
        next
    }

    pub fn total_colonists(&self) -> u64 {
        ResourceTrack::ALL
            .iter()
            .map(|&t| self.tracks.get(t).colonists as u64)
            .sum()
    }

    /// Units produced per day on one track.
    pub fn daily_production(&self, track: ResourceTrack) -> f32 {
        let state = self.tracks.get(track);
        state.colonists as f32 * state.production_rate * self.specialization.multiplier(track)
    }
}

pub fn validate_planet(p: &Planet) -> Vec<EntityError> {
    let mut errors = Vec::new();

    for track in ResourceTrack::ALL {
        let state = p.tracks.get(track);
        if state.colonists > state.capacity {
            errors.push(EntityError::ColonistsOverCapacity {
                track,
                colonists: state.colonists,
                capacity: state.capacity,
            });
        }
    }
    if p.defenses.citadel_level > planet::CITADEL_MAX {
        errors.push(EntityError::CitadelOutOfRange(p.defenses.citadel_level));
    }
    if p.defenses.shield_level > planet::SHIELD_MAX {
        errors.push(EntityError::ShieldOutOfRange(p.defenses.shield_level));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_planets_are_valid() {
        for t in PlanetType::ALL {
            assert!(validate_planet(&Planet::new("p", 1, t)).is_empty());
        }
    }

    #[test]
    fn colonists_clamped_to_capacity() {
        let p = Planet::new("p", 4, PlanetType::Barren);
        let crowded = p.with_colonists(ResourceTrack::Organics, 1_000_000);
        assert_eq!(crowded.tracks.organics.colonists, 10_000);
        assert!(validate_planet(&crowded).is_empty());
        assert_eq!(p.tracks.organics.colonists, 0);
    }

    #[test]
    fn over_capacity_reported() {
        let mut p = Planet::new("p", 4, PlanetType::Ice);
        p.tracks.fuel.colonists = 30_001;
        p.defenses.citadel_level = 6;
        p.defenses.shield_level = 4;
        let errors = validate_planet(&p);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&EntityError::ColonistsOverCapacity {
            track: ResourceTrack::Fuel,
            colonists: 30_001,
            capacity: 30_000,
        }));
    }

    #[test]
    fn specialization_scales_production() {
        let base =
            Planet::new("p", 1, PlanetType::Terran).with_colonists(ResourceTrack::Organics, 1000);
        let mut farm = base.clone();
        farm.specialization = Specialization::Agricultural;
        let organics = ResourceTrack::Organics;
        assert!(farm.daily_production(organics) > base.daily_production(organics));
        assert_eq!(base.daily_production(ResourceTrack::Fuel), 0.0);
    }

    #[test]
    fn gas_giants_cannot_breed() {
        for track in ResourceTrack::ALL {
            assert_eq!(PlanetType::GasGiant.baseline(track).breeding, 0.0);
        }
    }
}
