//! Expected counts derived from a configuration.
//!
//! All arithmetic is integer floor division done in `u64`, so every input the
//! validator accepts (and most it rejects) is computed without overflow.
//!
//! ```
//! use sectorwars_logic::estimate::expected_ports;
//!
//! assert_eq!(expected_ports(500, 10), 50);
//! assert_eq!(expected_ports(101, 5), 5);
//! ```

use std::fmt;

use crate::params::{GalaxyConfig, GenerationMode, ZoneDistribution};
use crate::universe::galaxy::GalaxyStatistics;
use crate::universe::zone::ZoneType;

fn share_of(total: u32, pct: u8) -> u32 {
    (total as u64 * pct as u64 / 100) as u32
}

/// `floor(total × density / 100)`.
pub fn expected_ports(total_sectors: u32, port_density: u8) -> u32 {
    share_of(total_sectors, port_density)
}

/// `floor(total × density / 100)`.
pub fn expected_planets(total_sectors: u32, planet_density: u8) -> u32 {
    share_of(total_sectors, planet_density)
}

/// Sector counts per zone tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneSectorCounts {
    pub federation: u32,
    pub border: u32,
    pub frontier: u32,
    /// Hub sectors; zero in flat mode.
    pub expanse: u32,
}

impl ZoneSectorCounts {
    pub fn get(&self, zone: ZoneType) -> u32 {
        match zone {
            ZoneType::Federation => self.federation,
            ZoneType::Border => self.border,
            ZoneType::Frontier => self.frontier,
            ZoneType::Expanse => self.expanse,
        }
    }

    pub fn total(&self) -> u32 {
        self.federation + self.border + self.frontier + self.expanse
    }
}

/// Split `total` across the tiers. Federation and border are floored and
/// frontier takes the remainder, so the counts always add up to `total`.
pub fn zone_sector_counts(total: u32, distribution: &ZoneDistribution) -> ZoneSectorCounts {
    let federation = share_of(total, distribution.federation).min(total);
    let border = share_of(total, distribution.border).min(total - federation);
    ZoneSectorCounts {
        federation,
        border,
        frontier: total - federation - border,
        expanse: 0,
    }
}

/// Zones in sector-number order: the hub first, then the three tiers.
pub const LAYOUT_ORDER: [ZoneType; 4] = [
    ZoneType::Expanse,
    ZoneType::Federation,
    ZoneType::Border,
    ZoneType::Frontier,
];

/// Distinct unordered sector pairs inside a region.
pub fn region_pair_capacity(sectors: u32) -> u64 {
    let n = sectors as u64;
    n * n.saturating_sub(1) / 2
}

/// Bounds on the tunnels one region ends up with, given the configured
/// per-region quota. Tunnels inside the region never exceed its pair
/// capacity. With `gateway` set, the region also holds the tunnel linking it
/// to the previous region, which counts towards the quota.
pub fn region_tunnel_bounds(sectors: u32, gateway: bool, min: u32, max: u32) -> (u32, u32) {
    let capacity = region_pair_capacity(sectors).min(u32::MAX as u64) as u32;
    let bound = |quota: u32| {
        if gateway {
            1 + quota.saturating_sub(1).min(capacity)
        } else {
            quota.min(capacity)
        }
    };
    (bound(min), bound(max))
}

/// Everything the generator is expected to produce for a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSummary {
    pub mode: GenerationMode,
    pub name: String,
    pub total_sectors: u32,
    pub zone_counts: ZoneSectorCounts,
    pub expected_ports: u32,
    pub expected_planets: u32,
    /// Lower and upper bound on generated tunnels.
    pub tunnel_range: (u32, u32),
    pub one_way_warp_percentage: u8,
}

pub fn estimate_summary(config: &GalaxyConfig) -> ConfigSummary {
    let total = config.total_sectors();
    let density = config.density();

    let mut zone_counts =
        zone_sector_counts(config.distributed_sectors(), config.zone_distribution());
    if let GalaxyConfig::HubAndTerritories(hub) = config {
        zone_counts.expanse = hub.hub_sectors;
    }
    let tunnels = config.warp_tunnels();
    let tunnel_range = LAYOUT_ORDER
        .iter()
        .map(|&z| zone_counts.get(z))
        .filter(|&n| n > 0)
        .enumerate()
        .map(|(index, n)| {
            region_tunnel_bounds(n, index > 0, tunnels.min_per_region, tunnels.max_per_region)
        })
        .fold((0u32, 0u32), |(lo, hi), (a, b)| {
            (lo.saturating_add(a), hi.saturating_add(b))
        });

    ConfigSummary {
        mode: config.mode(),
        name: config.name().to_string(),
        total_sectors: total,
        zone_counts,
        expected_ports: expected_ports(total, density.port_density),
        expected_planets: expected_planets(total, density.planet_density),
        tunnel_range,
        one_way_warp_percentage: density.one_way_warp_percentage,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalSectors,
    Ports,
    Planets,
    WarpTunnels,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TotalSectors => "total sectors",
            Self::Ports => "ports",
            Self::Planets => "planets",
            Self::WarpTunnels => "warp tunnels",
        };
        f.write_str(label)
    }
}

/// A server-reported count that strays from its estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateDeviation {
    pub metric: Metric,
    pub expected: u32,
    pub actual: u32,
}

impl fmt::Display for EstimateDeviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected about {} {}, server reports {}",
            self.expected, self.metric, self.actual
        )
    }
}

fn outside_tolerance(expected: u32, actual: u32, tolerance_pct: f32) -> bool {
    let allowed = expected as f32 * tolerance_pct.max(0.0) / 100.0;
    (actual as f32 - expected as f32).abs() > allowed
}

/// Compare server statistics with the estimate.
///
/// The sector total must match exactly. Port and planet counts may differ by
/// `tolerance_pct` percent of the estimate. Tunnel counts must fall inside the
/// estimated range; the nearest bound is reported as expected.
pub fn compare_with_statistics(
    summary: &ConfigSummary,
    stats: &GalaxyStatistics,
    tolerance_pct: f32,
) -> Vec<EstimateDeviation> {
    let mut deviations = Vec::new();

    if stats.total_sectors != summary.total_sectors {
        deviations.push(EstimateDeviation {
            metric: Metric::TotalSectors,
            expected: summary.total_sectors,
            actual: stats.total_sectors,
        });
    }
    for (metric, expected, actual) in [
        (Metric::Ports, summary.expected_ports, stats.port_count),
        (Metric::Planets, summary.expected_planets, stats.planet_count),
    ] {
        if outside_tolerance(expected, actual, tolerance_pct) {
            deviations.push(EstimateDeviation {
                metric,
                expected,
                actual,
            });
        }
    }
    let (lo, hi) = summary.tunnel_range;
    let tunnels = stats.warp_tunnel_count;
    if tunnels < lo || tunnels > hi {
        deviations.push(EstimateDeviation {
            metric: Metric::WarpTunnels,
            expected: tunnels.clamp(lo, hi),
            actual: tunnels,
        });
    }

    deviations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FlatGalaxyConfig, HubTerritoryConfig};

    #[test]
    fn ports_and_planets_floor() {
        assert_eq!(expected_ports(500, 10), 50);
        assert_eq!(expected_planets(500, 3), 15);
        assert_eq!(expected_planets(333, 3), 9);
        assert_eq!(expected_ports(u32::MAX, 15), (u32::MAX as u64 * 15 / 100) as u32);
    }

    #[test]
    fn estimates_are_monotonic_in_sectors() {
        let mut last = (0, 0);
        for total in 100..=2000 {
            let now = (expected_ports(total, 10), expected_planets(total, 3));
            assert!(now.0 >= last.0 && now.1 >= last.1);
            last = now;
        }
    }

    #[test]
    fn zone_split_gives_remainder_to_frontier() {
        let counts = zone_sector_counts(301, &ZoneDistribution::default());
        assert_eq!(counts.federation, 75);
        assert_eq!(counts.border, 105);
        assert_eq!(counts.frontier, 121);
        assert_eq!(counts.total(), 301);
    }

    #[test]
    fn summary_is_idempotent() {
        let config = GalaxyConfig::default();
        assert_eq!(estimate_summary(&config), estimate_summary(&config));
    }

    #[test]
    fn flat_summary() {
        let summary = estimate_summary(&GalaxyConfig::Flat(FlatGalaxyConfig::default()));
        assert_eq!(summary.total_sectors, 500);
        assert_eq!(summary.expected_ports, 50);
        assert_eq!(summary.expected_planets, 15);
        assert_eq!(summary.zone_counts.expanse, 0);
        assert_eq!(summary.tunnel_range, (6, 18));
    }

    #[test]
    fn hub_summary_counts_expanse() {
        let config = GalaxyConfig::HubAndTerritories(HubTerritoryConfig::default());
        let summary = estimate_summary(&config);
        assert_eq!(summary.total_sectors, 5300);
        assert_eq!(summary.zone_counts.expanse, 5000);
        assert_eq!(summary.zone_counts.total(), 5300);
        assert_eq!(summary.expected_ports, 530);
        assert_eq!(summary.tunnel_range, (8, 24));
    }

    #[test]
    fn tiny_region_caps_tunnel_range() {
        let mut flat = FlatGalaxyConfig {
            total_sectors: 100,
            ..FlatGalaxyConfig::default()
        };
        flat.zone_distribution = ZoneDistribution {
            federation: 1,
            border: 35,
            frontier: 64,
        };
        let summary = estimate_summary(&GalaxyConfig::Flat(flat.clone()));
        // A one-sector federation holds no tunnels; the others keep 2..=6.
        assert_eq!(summary.tunnel_range, (4, 12));

        flat.zone_distribution.federation = 3;
        flat.zone_distribution.frontier = 62;
        flat.warp_tunnels.min_per_region = 50;
        flat.warp_tunnels.max_per_region = 50;
        let summary = estimate_summary(&GalaxyConfig::Flat(flat));
        assert_eq!(summary.tunnel_range, (103, 103));
    }

    #[test]
    fn region_bounds() {
        assert_eq!(region_pair_capacity(0), 0);
        assert_eq!(region_pair_capacity(1), 0);
        assert_eq!(region_pair_capacity(4), 6);
        assert_eq!(region_tunnel_bounds(4, false, 2, 10), (2, 6));
        assert_eq!(region_tunnel_bounds(1, true, 2, 10), (1, 1));
        assert_eq!(region_tunnel_bounds(500, true, 0, 6), (1, 6));
    }

    #[test]
    fn deviations_reported() {
        let summary = estimate_summary(&GalaxyConfig::default());
        let good = GalaxyStatistics {
            total_sectors: 500,
            port_count: 52,
            planet_count: 15,
            warp_tunnel_count: 10,
            ..GalaxyStatistics::default()
        };
        assert!(compare_with_statistics(&summary, &good, 10.0).is_empty());

        let bad = GalaxyStatistics {
            port_count: 80,
            warp_tunnel_count: 40,
            ..good
        };
        let deviations = compare_with_statistics(&summary, &bad, 10.0);
        assert_eq!(
            deviations,
            vec![
                EstimateDeviation {
                    metric: Metric::Ports,
                    expected: 50,
                    actual: 80
                },
                EstimateDeviation {
                    metric: Metric::WarpTunnels,
                    expected: 18,
                    actual: 40
                },
            ]
        );
    }
}
