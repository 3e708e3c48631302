//! Zones: security tiers partitioning a galaxy's sectors.
//!
//! Flat galaxies have three zones (federation, border, frontier). Hub mode
//! adds the Expanse, one large zone covering the whole hub. Each zone owns a
//! contiguous, inclusive range of sector numbers.

use serde::{Deserialize, Serialize};

use super::EntityError;
use crate::constants::bands;
use crate::params::Band;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneType {
    /// High security, well policed core.
    Federation,
    /// Medium security.
    Border,
    /// Low security, lawless edge.
    Frontier,
    /// The hub zone of hub+territories galaxies.
    Expanse,
}

impl ZoneType {
    pub const ALL: [ZoneType; 4] = [
        ZoneType::Federation,
        ZoneType::Border,
        ZoneType::Frontier,
        ZoneType::Expanse,
    ];

    /// The three percentage-distributed tiers.
    pub const TIERS: [ZoneType; 3] = [ZoneType::Federation, ZoneType::Border, ZoneType::Frontier];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Federation => "Federation",
            Self::Border => "Border",
            Self::Frontier => "Frontier",
            Self::Expanse => "Expanse",
        }
    }

    pub fn default_name(&self) -> &'static str {
        match self {
            Self::Federation => "Federation Space",
            Self::Border => "Border Regions",
            Self::Frontier => "Frontier",
            Self::Expanse => "The Expanse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub galaxy_id: String,
    pub name: String,
    pub zone_type: ZoneType,
    /// First sector number in this zone (inclusive, ≥ 1).
    pub start_sector: u32,
    /// Last sector number in this zone (inclusive).
    pub end_sector: u32,
    pub resource_richness: Band<u8>,
    pub hazard_level: Band<u8>,
}

impl Zone {
    pub fn sector_count(&self) -> u32 {
        if self.end_sector < self.start_sector {
            0
        } else {
            self.end_sector - self.start_sector + 1
        }
    }

    pub fn contains_sector(&self, sector_id: u32) -> bool {
        self.start_sector <= sector_id && sector_id <= self.end_sector
    }

    /// This zone's share of `total_sectors` in percent (0 for an empty galaxy).
    pub fn share_pct(&self, total_sectors: u32) -> f32 {
        if total_sectors == 0 {
            return 0.0;
        }
        self.sector_count() as f32 / total_sectors as f32 * 100.0
    }
}

pub fn validate_zone(zone: &Zone) -> Vec<EntityError> {
    let mut errors = Vec::new();

    if zone.start_sector == 0 || zone.end_sector < zone.start_sector {
        errors.push(EntityError::InvalidSectorRange {
            zone: zone.id.clone(),
            start: zone.start_sector,
            end: zone.end_sector,
        });
    }
    if !zone.resource_richness.is_ordered()
        || !zone.resource_richness.within(0, bands::RESOURCE_MAX)
    {
        errors.push(EntityError::ZoneBandInvalid {
            zone: zone.id.clone(),
            field: "resource_richness",
        });
    }
    if !zone.hazard_level.is_ordered() || !zone.hazard_level.within(0, bands::HAZARD_MAX) {
        errors.push(EntityError::ZoneBandInvalid {
            zone: zone.id.clone(),
            field: "hazard_level",
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(start: u32, end: u32) -> Zone {
        Zone {
            id: "z1".into(),
            galaxy_id: "g1".into(),
            name: "Border Regions".into(),
            zone_type: ZoneType::Border,
            start_sector: start,
            end_sector: end,
            resource_richness: Band::new(40, 70),
            hazard_level: Band::new(2, 5),
        }
    }

    #[test]
    fn sector_range_accessors() {
        let z = zone(76, 180);
        assert_eq!(z.sector_count(), 105);
        assert!(z.contains_sector(76));
        assert!(z.contains_sector(180));
        assert!(!z.contains_sector(181));
        assert!((z.share_pct(300) - 35.0).abs() < 1e-4);
        assert_eq!(z.share_pct(0), 0.0);
    }

    #[test]
    fn inverted_range_rejected() {
        let z = zone(10, 5);
        assert_eq!(z.sector_count(), 0);
        assert_eq!(validate_zone(&z).len(), 1);
    }

    #[test]
    fn bands_checked() {
        let mut z = zone(1, 10);
        z.hazard_level = Band::new(4, 12);
        let errors = validate_zone(&z);
        assert_eq!(
            errors,
            vec![EntityError::ZoneBandInvalid {
                zone: "z1".into(),
                field: "hazard_level"
            }]
        );
    }

    #[test]
    fn zone_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ZoneType::Federation).unwrap(),
            "\"FEDERATION\""
        );
    }
}
