//! End-to-end planning runs.
//!
//! ```text
//! points ──► spanning tree ──► NetworkBuilder ──► direct_network
//!                                                     │
//!            Report ◄── build_report ◄── resolve_connectivity ◄── optimize
//! ```

use crate::director::direct_network;
use crate::economics::EconomicConfig;
use crate::optimizer::{optimize, OptimizationOutcome, OptimizerConfig};
use crate::resolver::{build_report, resolve_connectivity, Report};
use crate::spanning::euclidean_spanning_tree;
use mgo_core::{Meters, MgoResult, Network, NetworkBuilder, Point, SquareMeters};
use serde::Serialize;
use tracing::info;

/// Build and direct a network over the generator and buildings, using the
/// Euclidean spanning tree as the candidate topology.
pub fn create_network(
    generator: Point,
    buildings: &[(Point, SquareMeters)],
    max_reach: Meters,
) -> MgoResult<Network> {
    let mut points = Vec::with_capacity(buildings.len() + 1);
    points.push(generator);
    points.extend(buildings.iter().map(|(position, _)| *position));

    let mut network = NetworkBuilder::new(generator)
        .buildings(buildings.iter().copied())
        .segments(euclidean_spanning_tree(&points))
        .build()?;
    let summary = direct_network(&mut network, max_reach)?;
    info!(
        buildings = network.building_count(),
        arcs = summary.directed_arcs,
        beyond_reach = summary.beyond_reach,
        "network directed"
    );
    Ok(network)
}

/// Everything a planning run produces besides the mutated network.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRun {
    pub outcome: OptimizationOutcome,
    /// Arcs disabled by the reachability pass rather than by a cut
    pub stranded_arcs: usize,
    pub report: Report,
}

/// Prune a directed network, resolve connectivity and report.
pub fn run_model(
    network: &mut Network,
    economics: &EconomicConfig,
    config: &OptimizerConfig,
) -> MgoResult<ModelRun> {
    let outcome = optimize(network, economics, config)?;
    let stranded_arcs = resolve_connectivity(network);
    let report = build_report(network, economics);
    info!(
        connected = report.connected,
        length = report.length,
        npv = report.npv,
        "model run complete"
    );
    Ok(ModelRun {
        outcome,
        stranded_arcs,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_network_spans_all_buildings() {
        let buildings = [
            (Point::new(10.0, 0.0), SquareMeters(30.0)),
            (Point::new(20.0, 5.0), SquareMeters(30.0)),
            (Point::new(-15.0, 0.0), SquareMeters(30.0)),
        ];
        let network = create_network(Point::new(0.0, 0.0), &buildings, Meters(500.0)).unwrap();
        assert!(network.is_directed());
        assert_eq!(network.arcs.len(), 3);
        assert_eq!(network.enabled_arc_count(), 3);
        assert!(network.nodes.iter().skip(1).all(|n| n.marginal_distance.value() > 0.0));
    }

    #[test]
    fn test_generator_only_run() {
        let mut network = create_network(Point::new(0.0, 0.0), &[], Meters(500.0)).unwrap();
        let run = run_model(
            &mut network,
            &EconomicConfig::default(),
            &OptimizerConfig::default(),
        )
        .unwrap();
        assert_eq!(run.report.connected, 0);
        assert_eq!(run.report.length, 0);
        assert!(run.outcome.cuts.is_empty());
        assert_eq!(run.stranded_arcs, 0);
    }
}
