//! Galaxy constants: sector bounds, density ranges and entity limits.
//!
//! Plain numeric constants grouped by concern. The validator, the estimator
//! and the demo universe all read from here so a bound changes in one place.

pub mod sectors {
    /// Smallest flat galaxy the generator accepts.
    pub const FLAT_MIN: u32 = 100;
    /// Largest flat galaxy the generator accepts.
    pub const FLAT_MAX: u32 = 2000;
    /// Sector count of the central hub in hub+territories mode.
    pub const HUB_SECTORS: u32 = 5000;
    /// Sector count of the territory ring in hub+territories mode.
    pub const TERRITORY_SECTORS: u32 = 300;
    /// Default flat galaxy size.
    pub const FLAT_DEFAULT: u32 = 500;
    /// Hub galaxies may grow to twice their generated size.
    pub const HUB_EXPANSION_MAX: u32 = 2 * (HUB_SECTORS + TERRITORY_SECTORS);
}

pub mod density {
    pub const PORT_MIN: u8 = 5;
    pub const PORT_MAX: u8 = 15;
    pub const PLANET_MIN: u8 = 2;
    pub const PLANET_MAX: u8 = 25;
    pub const ONE_WAY_WARP_MIN: u8 = 2;
    pub const ONE_WAY_WARP_MAX: u8 = 8;
}

pub mod bands {
    /// Resource richness is a percentage.
    pub const RESOURCE_MAX: u8 = 100;
    /// Hazard levels run 0 to 10.
    pub const HAZARD_MAX: u8 = 10;
    /// Asteroid yields run 0 to 10.
    pub const YIELD_MAX: u8 = 10;
}

pub mod warp {
    pub const STABILITY_MIN: f32 = 0.0;
    pub const STABILITY_MAX: f32 = 100.0;
    /// Tunnels below this stability are shown as unstable.
    pub const UNSTABLE_BELOW: f32 = 70.0;
    pub const TURN_COST_MIN: u8 = 1;
    pub const TURN_COST_MAX: u8 = 3;
    /// Upper limit for `max_per_region`.
    pub const MAX_TUNNELS_PER_REGION: u32 = 50;
}

pub mod port {
    pub const CLASS_MIN: u8 = 1;
    pub const CLASS_MAX: u8 = 5;
    /// Tax rate bounds, in percent.
    pub const TAX_MIN: f32 = 0.5;
    pub const TAX_MAX: f32 = 5.0;
    /// Turrets require at least this class.
    pub const TURRET_MIN_CLASS: u8 = 4;
    /// The defense grid requires at least this class.
    pub const DEFENSE_GRID_MIN_CLASS: u8 = 5;
}

pub mod planet {
    pub const CITADEL_MAX: u8 = 5;
    pub const SHIELD_MAX: u8 = 3;
}

/// Default interval between background statistics refreshes.
pub const STATS_REFRESH_SECS: u64 = 30;
