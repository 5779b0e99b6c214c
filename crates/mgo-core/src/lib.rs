//! # mgo-core: Minigrid Network Model
//!
//! Data structures for planning a village minigrid: one generation point, a set
//! of buildings, and a candidate spanning tree of wiring runs between them.
//!
//! ## Design Philosophy
//!
//! The network is an **index-addressed arena**:
//! - **Nodes**: the generator at index 0, then one node per building
//! - **Arcs**: candidate wiring segments of the spanning tree
//!
//! Nothing is ever removed from either collection. Pruning a wiring run flips
//! its [`ArcState`] to `Disabled`, so node and arc ids stay stable from
//! construction through optimisation and export.
//!
//! ## Quick Start
//!
//! ```rust
//! use mgo_core::*;
//!
//! let network = NetworkBuilder::new(Point::new(0.0, 0.0))
//!     .building(Point::new(100.0, 0.0), SquareMeters(40.0))
//!     .building(Point::new(150.0, 0.0), SquareMeters(60.0))
//!     .segment(Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
//!     .segment(Segment::new(Point::new(150.0, 0.0), Point::new(100.0, 0.0)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(network.building_count(), 2);
//! assert_eq!(network.arcs.len(), 2);
//! assert!(!network.is_directed());
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - Issues collected during import and validation
//! - [`error`] - [`MgoError`] and [`MgoResult`]
//! - [`graph_utils`] - Network statistics and Graphviz rendering
//! - [`units`] - Unit newtypes for lengths, areas and ratings
//!
//! Orientation, economics and pruning live in the `mgo-algo` crate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, ImportDiagnostics, ImportStats, Severity};
pub use error::{MgoError, MgoResult};
pub use graph_utils::*;
pub use units::{Kilowatts, Meters, SquareMeters};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcId(usize);

impl NodeId {
    /// The generator node.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn new(value: usize) -> Self {
        NodeId(value)
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl ArcId {
    #[inline]
    pub fn new(value: usize) -> Self {
        ArcId(value)
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node#{}", self.0)
    }
}

impl std::fmt::Display for ArcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Arc#{}", self.0)
    }
}

/// Planar position in the equal-area projection (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Snap to whole metres, truncating toward zero.
    pub fn truncated(self) -> Self {
        Self {
            x: self.x.trunc(),
            y: self.y.trunc(),
        }
    }

    pub fn distance_to(&self, other: &Point) -> Meters {
        Meters(((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt())
    }

    /// Integer key used for exact endpoint matching.
    pub fn location_key(&self) -> (i64, i64) {
        (self.x.trunc() as i64, self.y.trunc() as i64)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An undirected tree segment as produced by the spanning-tree builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// A building, or the generator at index 0.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    /// Floor area; zero for the generator
    pub area: SquareMeters,
    /// Length of the arc from this node's parent (zero for the root)
    pub marginal_distance: Meters,
    /// Wire length from the root along the tree (zero for the root)
    pub cumulative_distance: Meters,
    /// Reachable from the root through enabled arcs
    pub connected: bool,
    /// Arcs touching this node, filled in once the tree is directed
    pub arcs: Vec<ArcId>,
}

impl Node {
    fn new(id: NodeId, position: Point, area: SquareMeters) -> Self {
        Self {
            id,
            position,
            area,
            marginal_distance: Meters::ZERO,
            cumulative_distance: Meters::ZERO,
            connected: false,
            arcs: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }
}

/// Lifecycle of a candidate arc.
///
/// Arcs start `Pending` until the director orients them, then stay `Enabled`
/// until a pruning or reachability pass switches them to `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcState {
    Pending,
    Enabled,
    Disabled,
}

/// Parent/child linkage of a directed arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direction {
    /// Root-ward endpoint
    pub from: NodeId,
    pub to: NodeId,
}

/// A candidate wiring run.
#[derive(Debug, Clone, Serialize)]
pub struct Arc {
    pub id: ArcId,
    /// Once directed, always the root-ward endpoint
    pub start: Point,
    pub end: Point,
    pub length: Meters,
    pub direction: Option<Direction>,
    pub state: ArcState,
}

impl Arc {
    fn new(id: ArcId, segment: Segment) -> Self {
        Self {
            id,
            start: segment.start,
            end: segment.end,
            length: segment.start.distance_to(&segment.end),
            direction: None,
            state: ArcState::Pending,
        }
    }

    pub fn is_directed(&self) -> bool {
        self.direction.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.state == ArcState::Enabled
    }

    /// Swap the stored endpoints so `start` becomes the former `end`.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
    }

    /// Record parent/child linkage and the initial enabled state.
    pub fn orient(&mut self, from: NodeId, to: NodeId, enabled: bool) {
        self.direction = Some(Direction { from, to });
        self.state = if enabled {
            ArcState::Enabled
        } else {
            ArcState::Disabled
        };
    }

    pub fn disable(&mut self) {
        self.state = ArcState::Disabled;
    }

    pub fn from_node(&self) -> Option<NodeId> {
        self.direction.map(|d| d.from)
    }

    pub fn to_node(&self) -> Option<NodeId> {
        self.direction.map(|d| d.to)
    }

    /// True when this arc is directed away from `node`.
    pub fn leaves(&self, node: NodeId) -> bool {
        self.from_node() == Some(node)
    }
}

/// The minigrid arena: generator, buildings and candidate arcs.
#[derive(Debug, Clone, Serialize)]
pub struct Network {
    pub nodes: Vec<Node>,
    pub arcs: Vec<Arc>,
    directed: bool,
    #[serde(skip)]
    locations: HashMap<(i64, i64), NodeId>,
}

impl Network {
    /// A network holding only the generator.
    pub fn new(generator: Point) -> Self {
        let generator = generator.truncated();
        let mut locations = HashMap::new();
        locations.insert(generator.location_key(), NodeId::ROOT);
        Self {
            nodes: vec![Node::new(NodeId::ROOT, generator, SquareMeters::ZERO)],
            arcs: Vec::new(),
            directed: false,
            locations,
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.value()]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.value()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.value()]
    }

    pub fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id.value()]
    }

    pub fn arc_mut(&mut self, id: ArcId) -> &mut Arc {
        &mut self.arcs[id.value()]
    }

    /// Node sitting at the given position, matched on whole metres.
    pub fn node_at(&self, position: &Point) -> Option<NodeId> {
        self.locations.get(&position.location_key()).copied()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Called by the director once every arc carries a direction.
    pub fn mark_directed(&mut self) {
        self.directed = true;
    }

    /// Number of buildings (every node except the generator).
    pub fn building_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn enabled_arc_count(&self) -> usize {
        self.arcs.iter().filter(|a| a.is_enabled()).count()
    }

    pub fn enabled_length(&self) -> Meters {
        self.arcs
            .iter()
            .filter(|a| a.is_enabled())
            .map(|a| a.length)
            .sum()
    }

    /// Connected buildings, excluding the generator.
    pub fn connected_buildings(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.connected && !n.is_root())
            .count()
    }

    /// Fraction of candidate arcs still enabled, `None` for an empty tree.
    pub fn coverage(&self) -> Option<f64> {
        if self.arcs.is_empty() {
            None
        } else {
            Some(self.enabled_arc_count() as f64 / self.arcs.len() as f64)
        }
    }

    /// Enabled arcs directed away from `node`.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Arc> + '_ {
        self.node(node)
            .arcs
            .iter()
            .map(move |&id| self.arc(id))
            .filter(move |arc| arc.is_enabled() && arc.leaves(node))
    }

    /// Check the input for issues that would make the optimisation meaningless.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        if self.building_count() == 0 {
            diag.add_warning(
                "structure",
                "Network has no buildings besides the generator",
            );
            return;
        }

        if self.arcs.len() + 1 != self.nodes.len() {
            diag.add_error(
                "structure",
                &format!(
                    "{} arcs cannot span {} nodes as a tree",
                    self.arcs.len(),
                    self.nodes.len()
                ),
            );
        }

        for node in self.nodes.iter().filter(|n| !n.is_root()) {
            if node.area.value() <= 0.0 {
                diag.add_warning_with_entity(
                    "validation",
                    "Building has no floor area and earns no income",
                    &node.id.to_string(),
                );
            }
        }
    }
}

/// Assembles a [`Network`] from a generator point, buildings and tree segments.
///
/// All coordinates are truncated to whole metres so that segment endpoints
/// match building positions exactly.
pub struct NetworkBuilder {
    generator: Point,
    buildings: Vec<(Point, SquareMeters)>,
    segments: Vec<Segment>,
}

impl NetworkBuilder {
    pub fn new(generator: Point) -> Self {
        Self {
            generator,
            buildings: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn building(mut self, position: Point, area: SquareMeters) -> Self {
        self.buildings.push((position, area));
        self
    }

    pub fn buildings(mut self, buildings: impl IntoIterator<Item = (Point, SquareMeters)>) -> Self {
        self.buildings.extend(buildings);
        self
    }

    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn segments(mut self, segments: impl IntoIterator<Item = Segment>) -> Self {
        self.segments.extend(segments);
        self
    }

    pub fn build(self) -> MgoResult<Network> {
        if !(self.generator.x.is_finite() && self.generator.y.is_finite()) {
            return Err(MgoError::Validation(format!(
                "generator position {} is not finite",
                self.generator
            )));
        }

        let mut network = Network::new(self.generator);

        for (position, area) in self.buildings {
            let id = NodeId::new(network.nodes.len());
            if !(position.x.is_finite() && position.y.is_finite()) {
                return Err(MgoError::Validation(format!(
                    "{id} position {position} is not finite"
                )));
            }
            if !area.is_finite() || area.value() < 0.0 {
                return Err(MgoError::Validation(format!(
                    "{id} has invalid floor area {}",
                    area.value()
                )));
            }

            let position = position.truncated();
            if let Some(existing) = network.locations.insert(position.location_key(), id) {
                return Err(MgoError::Structure(format!(
                    "{id} shares location {position} with {existing}"
                )));
            }
            network.nodes.push(Node::new(id, position, area));
        }

        for segment in self.segments {
            let id = ArcId::new(network.arcs.len());
            for endpoint in [segment.start, segment.end] {
                if !(endpoint.x.is_finite() && endpoint.y.is_finite()) {
                    return Err(MgoError::Validation(format!(
                        "{id} endpoint {endpoint} is not finite"
                    )));
                }
            }
            let segment = Segment::new(segment.start.truncated(), segment.end.truncated());
            for endpoint in [segment.start, segment.end] {
                if network.node_at(&endpoint).is_none() {
                    return Err(MgoError::Structure(format!(
                        "{id} endpoint {endpoint} matches no building or generator"
                    )));
                }
            }
            network.arcs.push(Arc::new(id, segment));
        }

        Ok(network)
    }
}
