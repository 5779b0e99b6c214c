//! Orient the candidate tree away from the generator.
//!
//! Starting at the root, every arc touching the current node is claimed once:
//! it is flipped if needed so that `start` is the root-ward endpoint, its far
//! node receives marginal and cumulative distances, and the walk continues
//! from that node. Nodes whose cumulative distance exceeds the maximum reach
//! have their connecting arc disabled up front.
//!
//! Any arc left unclaimed, or any arc leading back into an already reached
//! node, means the input is not a single tree rooted at the generator and the
//! run is aborted.

use mgo_core::{ArcId, Meters, MgoError, MgoResult, Network, NodeId};
use tracing::debug;

/// Outcome of orienting a network.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectionSummary {
    /// Arcs oriented (all of them on success)
    pub directed_arcs: usize,
    /// Arcs disabled because their far node lies beyond the maximum reach
    pub beyond_reach: usize,
    /// Largest cumulative distance of any node
    pub max_distance: Meters,
}

/// Orient every arc root-outward and annotate node distances.
///
/// Fails with [`MgoError::Validation`] on a negative or NaN reach or an
/// already-directed network, and with [`MgoError::Structure`] when the arcs
/// do not form one tree spanning all nodes from the generator.
pub fn direct_network(network: &mut Network, max_reach: Meters) -> MgoResult<DirectionSummary> {
    if max_reach.value().is_nan() || max_reach.value() < 0.0 {
        return Err(MgoError::Validation(format!(
            "maximum reach must be non-negative, got {}",
            max_reach.value()
        )));
    }
    if network.is_directed() {
        return Err(MgoError::Validation("network is already directed".into()));
    }

    let touching = incident_by_location(network)?;
    let mut summary = DirectionSummary::default();
    let mut reached = vec![false; network.nodes.len()];
    reached[NodeId::ROOT.value()] = true;
    let mut stack = vec![NodeId::ROOT];

    while let Some(current) = stack.pop() {
        let here = network.node(current).position.location_key();
        let base = network.node(current).cumulative_distance;

        for &arc_id in &touching[current.value()] {
            if network.arc(arc_id).is_directed() {
                continue;
            }

            let arc = network.arc_mut(arc_id);
            if arc.start.location_key() != here {
                arc.reverse();
            }
            let far_end = arc.end;
            let length = arc.length;

            let child = network.node_at(&far_end).ok_or_else(|| {
                MgoError::Structure(format!("{arc_id} ends at {far_end}, which is no node"))
            })?;
            if reached[child.value()] {
                return Err(MgoError::Structure(format!(
                    "{arc_id} leads back to {child}, closing a cycle"
                )));
            }

            let cumulative = base + length;
            let within_reach = cumulative <= max_reach;
            network.arc_mut(arc_id).orient(current, child, within_reach);
            if !within_reach {
                summary.beyond_reach += 1;
                debug!(
                    arc = arc_id.value(),
                    node = child.value(),
                    distance = cumulative.value(),
                    "arc disabled beyond maximum reach"
                );
            }

            let node = network.node_mut(child);
            node.marginal_distance = length;
            node.cumulative_distance = cumulative;
            if cumulative > summary.max_distance {
                summary.max_distance = cumulative;
            }

            summary.directed_arcs += 1;
            reached[child.value()] = true;
            stack.push(child);
        }
    }

    if let Some(arc) = network.arcs.iter().find(|a| !a.is_directed()) {
        return Err(MgoError::Structure(format!(
            "{} is not reachable from the generator",
            arc.id
        )));
    }
    if let Some(unreached) = reached.iter().position(|r| !r) {
        return Err(MgoError::Structure(format!(
            "{} is not reachable from the generator",
            NodeId::new(unreached)
        )));
    }

    for index in 0..network.arcs.len() {
        let arc_id = ArcId::new(index);
        if let Some(direction) = network.arc(arc_id).direction {
            network.node_mut(direction.from).arcs.push(arc_id);
            network.node_mut(direction.to).arcs.push(arc_id);
        }
    }

    network.mark_directed();
    Ok(summary)
}

/// Arcs touching each node, matched on endpoint coordinates, in arc order.
fn incident_by_location(network: &Network) -> MgoResult<Vec<Vec<ArcId>>> {
    let mut touching = vec![Vec::new(); network.nodes.len()];
    for arc in &network.arcs {
        let start = network.node_at(&arc.start);
        let end = network.node_at(&arc.end);
        match (start, end) {
            (Some(a), Some(b)) if a == b => {
                return Err(MgoError::Structure(format!(
                    "{} starts and ends at {a}",
                    arc.id
                )));
            }
            (Some(a), Some(b)) => {
                touching[a.value()].push(arc.id);
                touching[b.value()].push(arc.id);
            }
            _ => {
                return Err(MgoError::Structure(format!(
                    "{} has an endpoint that matches no node",
                    arc.id
                )));
            }
        }
    }
    Ok(touching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mgo_core::{ArcState, NetworkBuilder, Point, Segment, SquareMeters};

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// generator - 100 m - b1 - 50 m - b2, with the second segment stored backwards.
    fn chain() -> Network {
        NetworkBuilder::new(p(0.0, 0.0))
            .building(p(100.0, 0.0), SquareMeters(40.0))
            .building(p(150.0, 0.0), SquareMeters(60.0))
            .segment(Segment::new(p(0.0, 0.0), p(100.0, 0.0)))
            .segment(Segment::new(p(150.0, 0.0), p(100.0, 0.0)))
            .build()
            .unwrap()
    }

    #[test]
    fn test_directs_chain_and_flips_reversed_arc() {
        let mut network = chain();
        let summary = direct_network(&mut network, Meters(1_000.0)).unwrap();

        assert_eq!(summary.directed_arcs, 2);
        assert_eq!(summary.beyond_reach, 0);
        assert_eq!(summary.max_distance, Meters(150.0));
        assert!(network.is_directed());

        let second = network.arc(ArcId::new(1));
        assert_eq!(second.start, p(100.0, 0.0));
        assert_eq!(second.from_node(), Some(NodeId::new(1)));
        assert_eq!(second.to_node(), Some(NodeId::new(2)));

        assert_eq!(network.nodes[2].marginal_distance, Meters(50.0));
        assert_eq!(network.nodes[2].cumulative_distance, Meters(150.0));
        assert_eq!(network.nodes[1].arcs, vec![ArcId::new(0), ArcId::new(1)]);
        assert_eq!(network.root().arcs, vec![ArcId::new(0)]);
    }

    #[test]
    fn test_reach_disables_far_arcs() {
        let mut network = chain();
        let summary = direct_network(&mut network, Meters(120.0)).unwrap();

        assert_eq!(summary.beyond_reach, 1);
        assert_eq!(network.arc(ArcId::new(0)).state, ArcState::Enabled);
        assert_eq!(network.arc(ArcId::new(1)).state, ArcState::Disabled);
        // Distances are still annotated past the cutoff.
        assert_eq!(network.nodes[2].cumulative_distance, Meters(150.0));
    }

    #[test]
    fn test_single_point_network() {
        let mut network = Network::new(p(3.0, 4.0));
        let summary = direct_network(&mut network, Meters(10.0)).unwrap();
        assert_eq!(summary, DirectionSummary::default());
        assert!(network.is_directed());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut network = NetworkBuilder::new(p(0.0, 0.0))
            .building(p(10.0, 0.0), SquareMeters(10.0))
            .building(p(0.0, 10.0), SquareMeters(10.0))
            .segment(Segment::new(p(0.0, 0.0), p(10.0, 0.0)))
            .segment(Segment::new(p(10.0, 0.0), p(0.0, 10.0)))
            .segment(Segment::new(p(0.0, 10.0), p(0.0, 0.0)))
            .build()
            .unwrap();

        let err = direct_network(&mut network, Meters(1_000.0)).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_disconnected_fragment_is_rejected() {
        let mut network = NetworkBuilder::new(p(0.0, 0.0))
            .building(p(10.0, 0.0), SquareMeters(10.0))
            .building(p(50.0, 0.0), SquareMeters(10.0))
            .building(p(60.0, 0.0), SquareMeters(10.0))
            .segment(Segment::new(p(0.0, 0.0), p(10.0, 0.0)))
            .segment(Segment::new(p(50.0, 0.0), p(60.0, 0.0)))
            .build()
            .unwrap();

        let err = direct_network(&mut network, Meters(1_000.0)).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("Arc#1"));
    }

    #[test]
    fn test_isolated_building_is_rejected() {
        let mut network = NetworkBuilder::new(p(0.0, 0.0))
            .building(p(10.0, 0.0), SquareMeters(10.0))
            .build()
            .unwrap();

        let err = direct_network(&mut network, Meters(1_000.0)).unwrap_err();
        assert!(err.to_string().contains("Node#1"));
    }

    #[test]
    fn test_directing_twice_is_rejected() {
        let mut network = chain();
        direct_network(&mut network, Meters(1_000.0)).unwrap();
        let err = direct_network(&mut network, Meters(1_000.0)).unwrap_err();
        assert!(matches!(err, MgoError::Validation(_)));
    }

    #[test]
    fn test_negative_reach_is_rejected() {
        let mut network = chain();
        assert!(direct_network(&mut network, Meters(-1.0)).is_err());
        assert!(!network.is_directed());
    }
}
