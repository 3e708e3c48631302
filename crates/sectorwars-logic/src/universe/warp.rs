//! Warp tunnels and the directed network they form.
//!
//! A tunnel record joins two sectors. A one-way tunnel is a single directed
//! edge; a bidirectional tunnel is two directed edges sharing one stability
//! and cost record. `WarpNetwork` indexes tunnels into a directed adjacency
//! list for connectivity queries.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::EntityError;
use crate::constants::warp;

/// Who may traverse a tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessPolicy {
    #[default]
    Public,
    TeamOnly {
        #[serde(default)]
        team_id: Option<String>,
    },
    Toll {
        amount: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpTunnel {
    #[serde(default)]
    pub id: Option<String>,
    pub source_sector_id: u32,
    pub target_sector_id: u32,
    pub is_bidirectional: bool,
    /// Percentage 0 to 100.
    pub stability: f32,
    /// Turns to traverse, 1 to 3.
    pub turn_cost: u8,
    #[serde(default)]
    pub access: AccessPolicy,
}

impl WarpTunnel {
    /// A public, bidirectional tunnel.
    pub fn new(source: u32, target: u32, stability: f32, turn_cost: u8) -> Self {
        Self {
            id: None,
            source_sector_id: source,
            target_sector_id: target,
            is_bidirectional: true,
            stability,
            turn_cost,
            access: AccessPolicy::Public,
        }
    }

    pub fn one_way(source: u32, target: u32, stability: f32, turn_cost: u8) -> Self {
        Self {
            is_bidirectional: false,
            ..Self::new(source, target, stability, turn_cost)
        }
    }

    /// Below the stability threshold; still traversable, shown as a warning.
    pub fn is_unstable(&self) -> bool {
        self.stability < warp::UNSTABLE_BELOW
    }

    /// The directed edges this record stands for.
    pub fn directed_edges(&self) -> Vec<(u32, u32)> {
        let forward = (self.source_sector_id, self.target_sector_id);
        if self.is_bidirectional {
            vec![forward, (self.target_sector_id, self.source_sector_id)]
        } else {
            vec![forward]
        }
    }

    pub fn touches(&self, sector_id: u32) -> bool {
        self.source_sector_id == sector_id || self.target_sector_id == sector_id
    }
}

pub fn validate_tunnel(t: &WarpTunnel) -> Vec<EntityError> {
    let mut errors = Vec::new();

    if !(warp::STABILITY_MIN..=warp::STABILITY_MAX).contains(&t.stability) {
        errors.push(EntityError::StabilityOutOfRange(t.stability));
    }
    if !(warp::TURN_COST_MIN..=warp::TURN_COST_MAX).contains(&t.turn_cost) {
        errors.push(EntityError::TurnCostOutOfRange(t.turn_cost));
    }
    if t.source_sector_id == t.target_sector_id {
        errors.push(EntityError::SelfLoop(t.source_sector_id));
    }

    errors
}

/// Directed adjacency over warp tunnels.
#[derive(Debug, Clone, Default)]
pub struct WarpNetwork {
    /// sector → outgoing neighbors
    outgoing: HashMap<u32, Vec<u32>>,
    /// sectors that appear on any tunnel
    touched: HashSet<u32>,
    tunnel_count: usize,
    one_way_count: usize,
}

impl WarpNetwork {
    pub fn build(tunnels: &[WarpTunnel]) -> Self {
        let mut network = Self::default();
        for tunnel in tunnels {
            for (from, to) in tunnel.directed_edges() {
                network.outgoing.entry(from).or_default().push(to);
            }
            network.touched.insert(tunnel.source_sector_id);
            network.touched.insert(tunnel.target_sector_id);
            network.tunnel_count += 1;
            if !tunnel.is_bidirectional {
                network.one_way_count += 1;
            }
        }
        network
    }

    pub fn outgoing(&self, sector_id: u32) -> &[u32] {
        self.outgoing
            .get(&sector_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The sector is an endpoint of at least one tunnel, either direction.
    pub fn has_tunnel(&self, sector_id: u32) -> bool {
        self.touched.contains(&sector_id)
    }

    /// A directed edge `from → to` exists.
    pub fn connects(&self, from: u32, to: u32) -> bool {
        self.outgoing(from).contains(&to)
    }

    pub fn tunnel_count(&self) -> usize {
        self.tunnel_count
    }

    pub fn directed_edge_count(&self) -> usize {
        self.outgoing.values().map(Vec::len).sum()
    }

    /// Share of tunnel records that are one-way, in percent.
    pub fn one_way_percentage(&self) -> f32 {
        if self.tunnel_count == 0 {
            return 0.0;
        }
        self.one_way_count as f32 / self.tunnel_count as f32 * 100.0
    }

    /// Every sector reachable from `start` following directed edges.
    pub fn reachable_from(&self, start: u32) -> HashSet<u32> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for &next in self.outgoing(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidirectional_is_two_edges() {
        let t = WarpTunnel::new(1, 2, 80.0, 2);
        assert_eq!(t.directed_edges(), vec![(1, 2), (2, 1)]);
        let o = WarpTunnel::one_way(1, 2, 80.0, 2);
        assert_eq!(o.directed_edges(), vec![(1, 2)]);
    }

    #[test]
    fn stability_threshold() {
        assert!(WarpTunnel::new(1, 2, 65.0, 1).is_unstable());
        assert!(!WarpTunnel::new(1, 2, 70.0, 1).is_unstable());
        assert!(validate_tunnel(&WarpTunnel::new(1, 2, 65.0, 1)).is_empty());
    }

    #[test]
    fn invalid_tunnel_fields() {
        let t = WarpTunnel {
            turn_cost: 0,
            ..WarpTunnel::new(4, 4, 105.0, 1)
        };
        assert_eq!(
            validate_tunnel(&t),
            vec![
                EntityError::StabilityOutOfRange(105.0),
                EntityError::TurnCostOutOfRange(0),
                EntityError::SelfLoop(4),
            ]
        );
    }

    #[test]
    fn network_direction_and_reachability() {
        let network = WarpNetwork::build(&[
            WarpTunnel::new(1, 2, 90.0, 1),
            WarpTunnel::one_way(2, 3, 90.0, 1),
            WarpTunnel::new(4, 5, 90.0, 1),
        ]);
        assert!(network.connects(2, 3));
        assert!(!network.connects(3, 2));
        assert!(network.has_tunnel(3));
        assert!(!network.has_tunnel(6));
        assert_eq!(network.tunnel_count(), 3);
        assert_eq!(network.directed_edge_count(), 5);
        assert!((network.one_way_percentage() - 33.333).abs() < 0.01);

        let from_one = network.reachable_from(1);
        assert_eq!(from_one, HashSet::from([1, 2, 3]));
        assert_eq!(network.reachable_from(3), HashSet::from([3]));
    }

    #[test]
    fn access_policy_wire_format() {
        let toll = serde_json::to_value(AccessPolicy::Toll { amount: 250 }).unwrap();
        assert_eq!(toll["type"], "toll");
        assert_eq!(toll["amount"], 250);
        let team: AccessPolicy = serde_json::from_str(r#"{"type":"team_only"}"#).unwrap();
        assert_eq!(team, AccessPolicy::TeamOnly { team_id: None });
    }

    #[test]
    fn empty_network_percentage_is_zero() {
        assert_eq!(WarpNetwork::default().one_way_percentage(), 0.0);
    }
}
