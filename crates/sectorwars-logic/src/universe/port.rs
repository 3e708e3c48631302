//! Space ports: trading stations hosted by a sector.
//!
//! A port's class (1 to 5) sets its price and defense tier. The class gates
//! which services may be offered, how many defense drones it may field, and
//! whether turrets or a defense grid are available.
//!
//! # Class Gates
//!
//! | Class | Max drones | Services unlocked | Defenses |
//! |-------|-----------|-------------------|----------|
//! | 1 | 50 | repair, maintenance | none |
//! | 2 | 100 | + insurance | none |
//! | 3 | 250 | + ship dealer, drone shop | none |
//! | 4 | 500 | + mine dealer, diplomatic services | turrets |
//! | 5 | 1000 | + genesis dealer | turrets, defense grid |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::EntityError;
use crate::constants::port;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum PortClass {
    Class1 = 1,
    Class2 = 2,
    Class3 = 3,
    Class4 = 4,
    Class5 = 5,
}

impl PortClass {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            1 => Some(Self::Class1),
            2 => Some(Self::Class2),
            3 => Some(Self::Class3),
            4 => Some(Self::Class4),
            5 => Some(Self::Class5),
            _ => None,
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Ceiling on defense drones; non-decreasing with class.
    pub fn max_defense_drones(&self) -> u32 {
        match self {
            Self::Class1 => 50,
            Self::Class2 => 100,
            Self::Class3 => 250,
            Self::Class4 => 500,
            Self::Class5 => 1000,
        }
    }

    pub fn allows(&self, service: PortService) -> bool {
        self.level() >= service.min_class()
    }

    pub fn allows_turrets(&self) -> bool {
        self.level() >= port::TURRET_MIN_CLASS
    }

    pub fn allows_defense_grid(&self) -> bool {
        self.level() >= port::DEFENSE_GRID_MIN_CLASS
    }
}

impl TryFrom<u8> for PortClass {
    type Error = String;

    fn try_from(val: u8) -> Result<Self, Self::Error> {
        Self::from_u8(val).ok_or_else(|| format!("port class must be 1 to 5, got {}", val))
    }
}

impl From<PortClass> for u8 {
    fn from(class: PortClass) -> u8 {
        class as u8
    }
}

/// The six traded commodities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    Ore,
    Organics,
    Equipment,
    Fuel,
    LuxuryGoods,
    Technology,
}

impl Commodity {
    pub const ALL: [Commodity; 6] = [
        Commodity::Ore,
        Commodity::Organics,
        Commodity::Equipment,
        Commodity::Fuel,
        Commodity::LuxuryGoods,
        Commodity::Technology,
    ];

    /// Baseline unit price before class markup.
    pub fn base_price(&self) -> u32 {
        match self {
            Self::Ore => 20,
            Self::Organics => 30,
            Self::Equipment => 50,
            Self::Fuel => 25,
            Self::LuxuryGoods => 120,
            Self::Technology => 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityStock {
    pub quantity: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortService {
    ShipDealer,
    Repair,
    Maintenance,
    Insurance,
    DroneShop,
    GenesisDealer,
    MineDealer,
    DiplomaticServices,
}

impl PortService {
    pub const ALL: [PortService; 8] = [
        PortService::ShipDealer,
        PortService::Repair,
        PortService::Maintenance,
        PortService::Insurance,
        PortService::DroneShop,
        PortService::GenesisDealer,
        PortService::MineDealer,
        PortService::DiplomaticServices,
    ];

    /// Lowest port class that may offer this service.
    pub fn min_class(&self) -> u8 {
        match self {
            Self::Repair | Self::Maintenance => 1,
            Self::Insurance => 2,
            Self::ShipDealer | Self::DroneShop => 3,
            Self::MineDealer | Self::DiplomaticServices => 4,
            Self::GenesisDealer => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortDefenses {
    pub defense_drones: u32,
    pub has_turrets: bool,
    pub has_defense_grid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub sector_id: u32,
    pub name: String,
    pub class: PortClass,
    /// Trade tax in percent (0.5 to 5).
    pub tax_rate: f32,
    pub commodities: BTreeMap<Commodity, CommodityStock>,
    pub services: BTreeSet<PortService>,
    pub defenses: PortDefenses,
}

impl Port {
    /// A port stocked at baseline prices with every service its class allows.
    pub fn new(id: impl Into<String>, sector_id: u32, class: PortClass) -> Self {
        let markup = 100 + (class.level() as u32 - 1) * 10;
        let commodities = Commodity::ALL
            .iter()
            .map(|&c| {
                (
                    c,
                    CommodityStock {
                        quantity: 1000,
                        price: c.base_price() * markup / 100,
                    },
                )
            })
            .collect();
        let services = PortService::ALL
            .iter()
            .copied()
            .filter(|&s| class.allows(s))
            .collect();

        Self {
            id: id.into(),
            sector_id,
            name: format!("Port {}", sector_id),
            class,
            tax_rate: 2.0,
            commodities,
            services,
            defenses: PortDefenses::default(),
        }
    }

    pub fn max_defense_drones(&self) -> u32 {
        self.class.max_defense_drones()
    }

    pub fn offers(&self, service: PortService) -> bool {
        self.services.contains(&service)
    }

    /// The same port at a different class.
    ///
    /// Drones are clamped to the new maximum, and services or defenses the new
    /// class does not allow are removed. Upgrades leave everything in place.
    pub fn with_class(&self, class: PortClass) -> Port {
        let mut next = self.clone();
        next.class = class;
        next.defenses.defense_drones = next
            .defenses
            .defense_drones
            .min(class.max_defense_drones());
        next.services.retain(|&s| class.allows(s));
        next.defenses.has_turrets &= class.allows_turrets();
        next.defenses.has_defense_grid &= class.allows_defense_grid();
        next
    }
}

pub fn validate_port(p: &Port) -> Vec<EntityError> {
    let mut errors = Vec::new();

    if !(port::TAX_MIN..=port::TAX_MAX).contains(&p.tax_rate) {
        errors.push(EntityError::TaxRateOutOfRange(p.tax_rate));
    }
    if p.defenses.defense_drones > p.max_defense_drones() {
        errors.push(EntityError::TooManyDrones {
            drones: p.defenses.defense_drones,
            max: p.max_defense_drones(),
        });
    }
    for &service in &p.services {
        if !p.class.allows(service) {
            errors.push(EntityError::ServiceNotAllowed {
                service,
                class: p.class.level(),
            });
        }
    }
    if p.defenses.has_turrets && !p.class.allows_turrets() {
        errors.push(EntityError::TurretsNotAllowed(p.class.level()));
    }
    if p.defenses.has_defense_grid && !p.class.allows_defense_grid() {
        errors.push(EntityError::DefenseGridNotAllowed(p.class.level()));
    }
    for commodity in Commodity::ALL {
        if !p.commodities.contains_key(&commodity) {
            errors.push(EntityError::MissingCommodity(commodity));
        }
    }

    errors
}
