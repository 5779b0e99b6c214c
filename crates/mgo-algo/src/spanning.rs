//! Candidate tree construction.
//!
//! The optimiser only prunes a tree it is handed. This module produces that
//! tree for callers without their own graph builder: the Euclidean minimum
//! spanning tree over the generator and building points.

use mgo_core::{Point, Segment};
use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::UnGraph;

/// Minimum spanning tree over the complete Euclidean graph of `points`.
///
/// Segments come back in Kruskal order (shortest first). Fewer than two points
/// yield no segments. The complete graph has n(n-1)/2 edges, which is fine at
/// village scale.
pub fn euclidean_spanning_tree(points: &[Point]) -> Vec<Segment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let n = points.len();
    let mut graph: UnGraph<Point, f64> = UnGraph::with_capacity(n, n * (n - 1) / 2);
    let indices: Vec<_> = points.iter().map(|&p| graph.add_node(p)).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            let weight = points[i].distance_to(&points[j]).value();
            graph.add_edge(indices[i], indices[j], weight);
        }
    }

    min_spanning_tree(&graph)
        .filter_map(|element| match element {
            Element::Edge { source, target, .. } => {
                Some(Segment::new(points[source], points[target]))
            }
            Element::Node { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fewer_than_two_points() {
        assert!(euclidean_spanning_tree(&[]).is_empty());
        assert!(euclidean_spanning_tree(&[Point::new(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_tree_has_n_minus_one_segments() {
        let points: Vec<Point> = (0..6)
            .map(|i| Point::new((i * 17 % 11) as f64 * 10.0, (i * 7 % 5) as f64 * 10.0))
            .collect();
        assert_eq!(euclidean_spanning_tree(&points).len(), 5);
    }

    #[test]
    fn test_collinear_points_chain_up() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(10.0, 0.0),
        ];
        let tree = euclidean_spanning_tree(&points);
        let total: f64 = tree
            .iter()
            .map(|s| s.start.distance_to(&s.end).value())
            .sum();
        assert_eq!(tree.len(), 2);
        assert!((total - 30.0).abs() < 1e-9);
    }
}
