//! Wire shapes for the game-server galaxy API.
//!
//! Requests are built from typed values and responses parse into typed
//! values. A generation request can only be built from a
//! [`ValidatedConfig`], so the server never sees a configuration the
//! validator rejected. Failures are sorted into [`FailureKind`]s that drive
//! the regeneration flow and the read fallback policy.
//!
//! # Endpoints
//!
//! | Operation | Method | Path | Fallback |
//! |-----------|--------|------|----------|
//! | `GenerateGalaxy` | POST | `/generate-galaxy` | never |
//! | `ClearGalaxy` | POST | `/clear-galaxy` | never |
//! | `GetGalaxy` | GET | `/galaxy` | cached or demo |
//! | `ListRegions` | GET | `/regions` | cached or demo |
//! | `ListSectors` | GET | `/sectors` | cached or demo |
//! | `CreateWarpTunnel` | POST | `/warp-tunnels` | never |
//! | `AddSectors` | POST | `/sectors` | never |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::bands;
use crate::params::{
    Band, DensityConfig, FlatGalaxyConfig, GalaxyConfig, GenerationMode, HubTerritoryConfig,
    WarpTunnelConfig, ZoneBands, ZoneDistribution, ZoneProfiles,
};
use crate::universe::galaxy::{Galaxy, GalaxyStatistics};
use crate::universe::sector::{Sector, SectorFeatures, SectorSpecialType};
use crate::universe::warp::{AccessPolicy, WarpNetwork};
use crate::universe::zone::{Zone, ZoneType};
use crate::validation::ValidatedConfig;

// ============================================================================
// GENERATION
// ============================================================================

/// Options carried in the nested `config` block of a generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub port_density: u8,
    pub planet_density: u8,
    pub one_way_warp_percentage: u8,
    pub warp_tunnels: WarpTunnelConfig,
    pub zones: ZoneProfiles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationOptions {
    fn from_parts(
        density: &DensityConfig,
        warp_tunnels: &WarpTunnelConfig,
        zones: &ZoneProfiles,
        seed: Option<u64>,
    ) -> Self {
        Self {
            port_density: density.port_density,
            planet_density: density.planet_density,
            one_way_warp_percentage: density.one_way_warp_percentage,
            warp_tunnels: *warp_tunnels,
            zones: *zones,
            seed,
        }
    }

    fn density(&self) -> DensityConfig {
        DensityConfig {
            port_density: self.port_density,
            planet_density: self.planet_density,
            one_way_warp_percentage: self.one_way_warp_percentage,
        }
    }
}

/// Body of `POST /generate-galaxy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GenerateGalaxyRequest {
    Flat {
        name: String,
        num_sectors: u32,
        federation_percentage: u8,
        border_percentage: u8,
        frontier_percentage: u8,
        config: GenerationOptions,
    },
    HubAndTerritories {
        name: String,
        hub_sectors: u32,
        territory_sectors: u32,
        federation_percentage: u8,
        border_percentage: u8,
        frontier_percentage: u8,
        hub_zone: ZoneBands,
        config: GenerationOptions,
    },
}

impl GenerateGalaxyRequest {
    pub fn from_config(validated: &ValidatedConfig) -> Self {
        match validated.config() {
            GalaxyConfig::Flat(c) => Self::Flat {
                name: c.name.clone(),
                num_sectors: c.total_sectors,
                federation_percentage: c.zone_distribution.federation,
                border_percentage: c.zone_distribution.border,
                frontier_percentage: c.zone_distribution.frontier,
                config: GenerationOptions::from_parts(
                    &c.density,
                    &c.warp_tunnels,
                    &c.zones,
                    c.seed,
                ),
            },
            GalaxyConfig::HubAndTerritories(c) => Self::HubAndTerritories {
                name: c.name.clone(),
                hub_sectors: c.hub_sectors,
                territory_sectors: c.territory_sectors,
                federation_percentage: c.territory_distribution.federation,
                border_percentage: c.territory_distribution.border,
                frontier_percentage: c.territory_distribution.frontier,
                hub_zone: c.hub_zone,
                config: GenerationOptions::from_parts(
                    &c.density,
                    &c.warp_tunnels,
                    &c.zones,
                    c.seed,
                ),
            },
        }
    }

    /// The configuration this request was built from.
    pub fn into_config(self) -> GalaxyConfig {
        match self {
            Self::Flat {
                name,
                num_sectors,
                federation_percentage,
                border_percentage,
                frontier_percentage,
                config,
            } => GalaxyConfig::Flat(FlatGalaxyConfig {
                name,
                total_sectors: num_sectors,
                zone_distribution: ZoneDistribution {
                    federation: federation_percentage,
                    border: border_percentage,
                    frontier: frontier_percentage,
                },
                density: config.density(),
                warp_tunnels: config.warp_tunnels,
                zones: config.zones,
                seed: config.seed,
            }),
            Self::HubAndTerritories {
                name,
                hub_sectors,
                territory_sectors,
                federation_percentage,
                border_percentage,
                frontier_percentage,
                hub_zone,
                config,
            } => GalaxyConfig::HubAndTerritories(HubTerritoryConfig {
                name,
                hub_sectors,
                territory_sectors,
                territory_distribution: ZoneDistribution {
                    federation: federation_percentage,
                    border: border_percentage,
                    frontier: frontier_percentage,
                },
                density: config.density(),
                warp_tunnels: config.warp_tunnels,
                hub_zone,
                zones: config.zones,
                seed: config.seed,
            }),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Flat { name, .. } | Self::HubAndTerritories { name, .. } => name,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        match self {
            Self::Flat { .. } => GenerationMode::Flat,
            Self::HubAndTerritories { .. } => GenerationMode::HubAndTerritories,
        }
    }
}

/// Galaxy returned by a successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxySummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    pub region_distribution: ZoneDistribution,
    #[serde(default)]
    pub statistics: GalaxyStatistics,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<&Galaxy> for GalaxySummary {
    fn from(galaxy: &Galaxy) -> Self {
        Self {
            id: galaxy.id.clone(),
            name: galaxy.name.clone(),
            created_at: galaxy.created_at.clone(),
            region_distribution: galaxy.region_distribution,
            statistics: galaxy.statistics,
            message: None,
        }
    }
}

/// Parse a `GET /galaxy` body.
///
/// The server answers `{"galaxy": null}` when nothing has been generated and
/// the bare galaxy object otherwise. A `{"galaxy": {...}}` wrapper is also
/// accepted.
pub fn parse_galaxy_info(body: &str) -> Result<Option<Galaxy>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    let inner = match value {
        Value::Null => return Ok(None),
        Value::Object(mut map) if map.len() == 1 && map.contains_key("galaxy") => {
            map.remove("galaxy").unwrap_or(Value::Null)
        }
        other => other,
    };
    if inner.is_null() {
        return Ok(None);
    }
    serde_json::from_value(inner).map(Some)
}

/// Body of `POST /clear-galaxy`, `POST /sectors` and similar acknowledgements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// LISTINGS
// ============================================================================

/// Raw `GET /regions` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionList {
    pub regions: Vec<RegionRow>,
}

/// One region as the server reports it. Rows carry sizes but no sector
/// ranges, and richness and security as JSON scores or legacy floats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    pub id: String,
    #[serde(default)]
    pub galaxy_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub zone_type: ZoneType,
    #[serde(default)]
    pub total_sectors: u32,
    /// Older servers only fill this one.
    #[serde(default)]
    pub sector_count: u32,
    #[serde(default)]
    pub start_sector: Option<u32>,
    #[serde(default)]
    pub end_sector: Option<u32>,
    #[serde(default)]
    pub security: Value,
    #[serde(default)]
    pub resources: Value,
    /// Legacy scale 0.0 to 2.0.
    #[serde(default)]
    pub resource_richness: Option<f64>,
    /// Legacy scale 0.0 to 1.0.
    #[serde(default)]
    pub security_level: Option<f64>,
}

impl RegionRow {
    pub fn sectors(&self) -> u32 {
        if self.total_sectors > 0 {
            self.total_sectors
        } else {
            self.sector_count
        }
    }

    /// Resource score 0..=100 from `resources.overall_abundance` or the legacy float.
    pub fn richness(&self) -> u8 {
        let score = score_field(&self.resources, "overall_abundance")
            .or_else(|| self.resource_richness.map(|r| r * 50.0))
            .unwrap_or(50.0);
        score.round().clamp(0.0, bands::RESOURCE_MAX as f64) as u8
    }

    /// Hazard 0..=10, the inverse of `security.overall_level` or the legacy float.
    pub fn hazard(&self) -> u8 {
        let security = score_field(&self.security, "overall_level")
            .or_else(|| self.security_level.map(|s| s * 100.0))
            .unwrap_or(50.0);
        ((100.0 - security) / 10.0)
            .round()
            .clamp(0.0, bands::HAZARD_MAX as f64) as u8
    }

    /// `first_sector` is used when the row has no explicit range.
    pub fn into_zone(self, first_sector: u32) -> Zone {
        let start = self.start_sector.unwrap_or(first_sector);
        let end = self
            .end_sector
            .unwrap_or_else(|| start.saturating_add(self.sectors()).saturating_sub(1));
        let richness = self.richness();
        let hazard = self.hazard();
        Zone {
            id: self.id,
            galaxy_id: self.galaxy_id,
            name: self.name,
            zone_type: self.zone_type,
            start_sector: start,
            end_sector: end,
            resource_richness: Band::new(richness, richness),
            hazard_level: Band::new(hazard, hazard),
        }
    }
}

fn score_field(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

impl RegionList {
    /// Zones in server order, laid out back to back from sector 1.
    pub fn into_zones(self) -> Vec<Zone> {
        let mut next = 1u32;
        self.regions
            .into_iter()
            .map(|row| {
                let zone = row.into_zone(next);
                next = zone.end_sector.saturating_add(1);
                zone
            })
            .collect()
    }
}

/// Filters and paging for `GET /sectors`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectorQuery {
    pub limit: u32,
    pub offset: u32,
    pub region_id: Option<String>,
    pub cluster_id: Option<String>,
    pub has_port: Option<bool>,
    pub has_planet: Option<bool>,
    pub discovered: Option<bool>,
    pub search: Option<String>,
}

impl Default for SectorQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            region_id: None,
            cluster_id: None,
            has_port: None,
            has_planet: None,
            discovered: None,
            search: None,
        }
    }
}

impl SectorQuery {
    /// Query-string pairs; unset filters are omitted.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        let strings = [
            ("region_id", &self.region_id),
            ("cluster_id", &self.cluster_id),
            ("search", &self.search),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                pairs.push((key, v.clone()));
            }
        }
        let flags = [
            ("has_port", self.has_port),
            ("has_planet", self.has_planet),
            ("discovered", self.discovered),
        ];
        for (key, value) in flags {
            if let Some(v) = value {
                pairs.push((key, v.to_string()));
            }
        }
        pairs
    }

    /// The query for the page after this one.
    pub fn next_page(&self) -> SectorQuery {
        SectorQuery {
            offset: self.offset.saturating_add(self.limit),
            ..self.clone()
        }
    }

    /// Apply the filters to a local sector list (used for cached and demo reads).
    pub fn apply(&self, sectors: &[Sector], network: &WarpNetwork) -> Page<SectorListing> {
        let search = self.search.as_ref().map(|s| s.to_lowercase());
        let matching: Vec<&Sector> = sectors
            .iter()
            .filter(|s| self.region_id.as_ref().map_or(true, |r| &s.zone_id == r))
            .filter(|s| self.cluster_id.is_none() || s.cluster_id == self.cluster_id)
            .filter(|s| self.has_port.map_or(true, |want| s.has_port() == want))
            .filter(|s| self.has_planet.map_or(true, |want| s.has_planet() == want))
            .filter(|s| self.discovered.map_or(true, |want| s.is_discovered == want))
            .filter(|s| {
                search.as_ref().map_or(true, |needle| {
                    s.name.to_lowercase().contains(needle.as_str())
                        || s.sector_id.to_string() == *needle
                })
            })
            .collect();
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .map(|s| SectorListing::from_sector(s, network))
            .collect();
        Page::new(items, Some(total), self)
    }
}

/// One row of `GET /sectors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorListing {
    #[serde(default)]
    pub id: Option<String>,
    pub sector_id: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub special_type: SectorSpecialType,
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub x_coord: i32,
    #[serde(default)]
    pub y_coord: i32,
    #[serde(default)]
    pub z_coord: i32,
    #[serde(default)]
    pub hazard_level: f32,
    #[serde(default)]
    pub is_discovered: bool,
    #[serde(default)]
    pub has_port: bool,
    #[serde(default)]
    pub has_planet: bool,
    #[serde(default)]
    pub has_warp_tunnel: bool,
}

impl SectorListing {
    pub fn from_sector(sector: &Sector, network: &WarpNetwork) -> Self {
        let features = sector.features(network);
        Self {
            id: None,
            sector_id: sector.sector_id,
            name: sector.name.clone(),
            special_type: sector.special_type,
            cluster_id: sector.cluster_id.clone(),
            x_coord: sector.coordinates.x,
            y_coord: sector.coordinates.y,
            z_coord: sector.coordinates.z,
            hazard_level: sector.hazard_level,
            is_discovered: sector.is_discovered,
            has_port: features.has_port,
            has_planet: features.has_planet,
            has_warp_tunnel: features.has_warp_tunnel,
        }
    }

    pub fn features(&self) -> SectorFeatures {
        SectorFeatures {
            has_port: self.has_port,
            has_planet: self.has_planet,
            has_warp_tunnel: self.has_warp_tunnel,
        }
    }
}

/// Raw `GET /sectors` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorPage {
    pub sectors: Vec<SectorListing>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// A page of results with paging state.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matches when the server reports it.
    pub total: Option<u64>,
    pub offset: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: Option<u64>, query: &SectorQuery) -> Self {
        Self {
            items,
            total,
            offset: query.offset,
            limit: query.limit,
        }
    }

    /// More results exist: known from the total, or guessed from a full page.
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => (self.offset as u64 + self.items.len() as u64) < total,
            None => self.limit > 0 && self.items.len() as u32 >= self.limit,
        }
    }
}

impl SectorPage {
    pub fn into_page(self, query: &SectorQuery) -> Page<SectorListing> {
        Page::new(self.sectors, self.total, query)
    }
}

// ============================================================================
// INCREMENTAL MUTATIONS
// ============================================================================

/// Body of `POST /warp-tunnels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWarpTunnelRequest {
    pub source_sector_id: u32,
    pub target_sector_id: u32,
    /// Percentage 0 to 100.
    pub stability: f32,
    pub turn_cost: u8,
    pub is_bidirectional: bool,
    #[serde(default)]
    pub access: AccessPolicy,
}

impl CreateWarpTunnelRequest {
    /// A public, bidirectional, single-turn tunnel.
    pub fn new(source: u32, target: u32, stability: f32) -> Self {
        Self {
            source_sector_id: source,
            target_sector_id: target,
            stability,
            turn_cost: 1,
            is_bidirectional: true,
            access: AccessPolicy::Public,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWarpTunnelResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub source_sector_id: u32,
    pub target_sector_id: u32,
    pub stability: f32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /sectors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSectorsRequest {
    pub num_sectors: u32,
}

// ============================================================================
// OPERATIONS & FAILURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GenerateGalaxy,
    ClearGalaxy,
    GetGalaxy,
    ListRegions,
    ListSectors,
    CreateWarpTunnel,
    AddSectors,
}

impl Operation {
    pub fn method(&self) -> HttpMethod {
        match self {
            Self::GetGalaxy | Self::ListRegions | Self::ListSectors => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::GenerateGalaxy => "/generate-galaxy",
            Self::ClearGalaxy => "/clear-galaxy",
            Self::GetGalaxy => "/galaxy",
            Self::ListRegions => "/regions",
            Self::ListSectors | Self::AddSectors => "/sectors",
            Self::CreateWarpTunnel => "/warp-tunnels",
        }
    }

    /// Reads may show cached or demo data when the server is down.
    pub fn allows_fallback(&self) -> bool {
        self.method() == HttpMethod::Get
    }

    pub fn is_destructive(&self) -> bool {
        !self.allows_fallback()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method() {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        };
        write!(f, "{} {}", method, self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A galaxy already exists; clear it first.
    ConflictExists,
    /// Worth retrying later.
    TransientFailure,
    /// The server could not be reached or its gateway is down.
    ServiceUnavailable,
    /// The server refused the request; the detail says why.
    ValidationRejected,
}

impl FailureKind {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure)
    }
}

/// A classified failure with the server's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    /// None for transport failures.
    pub status: Option<u16>,
    pub detail: String,
}

impl Failure {
    /// The request never got an HTTP response.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ServiceUnavailable,
            status: None,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} ({}): {}", self.kind, status, self.detail),
            None => write!(f, "{:?}: {}", self.kind, self.detail),
        }
    }
}

/// The message inside a FastAPI error body, or the raw body.
///
/// `{"detail": "..."}` yields the string; a validation-error list yields its
/// `msg` fields joined with `"; "`.
pub fn extract_detail(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    match parsed.as_ref().and_then(|v| v.get("detail")) {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                body.trim().to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => body.trim().to_string(),
    }
}

/// Classify a non-success HTTP response.
pub fn classify_failure(operation: Operation, status: u16, body: &str) -> Failure {
    let detail = extract_detail(body);
    let generating = operation == Operation::GenerateGalaxy;

    let kind = match status {
        409 if generating => FailureKind::ConflictExists,
        400 if generating && detail.to_lowercase().contains("already exists") => {
            FailureKind::ConflictExists
        }
        408 | 429 => FailureKind::TransientFailure,
        502..=504 => FailureKind::ServiceUnavailable,
        500..=599 => FailureKind::TransientFailure,
        400..=499 => FailureKind::ValidationRejected,
        _ => FailureKind::ServiceUnavailable,
    };

    Failure {
        kind,
        status: Some(status),
        detail,
    }
}
