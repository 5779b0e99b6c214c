//! GeoJSON export of an optimised network.
//!
//! Produces a single `FeatureCollection` holding one `LineString` per wiring
//! run and one `Point` per building. Coordinates stay in the planar metre
//! frame of the scenario.

use anyhow::{Context, Result};
use mgo_core::{Arc, MgoError, Network, Node};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Which features to include and how to label them.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Also emit pruned or out-of-reach wiring runs
    pub include_disabled_arcs: bool,
    /// Also emit buildings left without power
    pub include_unconnected_buildings: bool,
    /// Optional label per node index, written as an `id` property
    pub labels: Vec<Option<String>>,
}

impl ExportOptions {
    pub fn everything() -> Self {
        Self {
            include_disabled_arcs: true,
            include_unconnected_buildings: true,
            labels: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: Vec<Option<String>>) -> Self {
        self.labels = labels;
        self
    }
}

/// Convert the network into a GeoJSON `FeatureCollection`.
///
/// By default only enabled arcs and connected buildings are emitted, which is
/// the built layout once connectivity has been resolved.
pub fn network_to_geojson(network: &Network, options: &ExportOptions) -> Value {
    let arcs = network
        .arcs
        .iter()
        .filter(|arc| options.include_disabled_arcs || arc.is_enabled())
        .map(arc_feature);

    let buildings = network
        .nodes
        .iter()
        .filter(|node| !node.is_root())
        .filter(|node| options.include_unconnected_buildings || node.connected)
        .map(|node| building_feature(node, options));

    let features: Vec<Value> = arcs.chain(buildings).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Write the GeoJSON rendering of the network to `path`.
pub fn write_geojson(
    path: impl AsRef<Path>,
    network: &Network,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(&network_to_geojson(network, options))
        .map_err(MgoError::from)?;
    fs::write(path, text)
        .map_err(MgoError::from)
        .with_context(|| format!("writing GeoJSON file '{}'", path.display()))
}

fn arc_feature(arc: &Arc) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": [[arc.start.x, arc.start.y], [arc.end.x, arc.end.y]],
        },
        "properties": {
            "idx": arc.id.value(),
            "node_start": arc.from_node().map(|n| n.value()),
            "node_end": arc.to_node().map(|n| n.value()),
            "length": arc.length.value(),
            "enabled": u8::from(arc.is_enabled()),
        },
    })
}

fn building_feature(node: &Node, options: &ExportOptions) -> Value {
    let mut feature = json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [node.position.x, node.position.y],
        },
        "properties": {
            "index": node.id.value(),
            "area": node.area.value(),
            "marg_dist": node.marginal_distance.value(),
            "tot_dist": node.cumulative_distance.value(),
            "connected": u8::from(node.connected),
        },
    });

    if let Some(Some(label)) = options.labels.get(node.id.value()) {
        feature["properties"]["id"] = Value::String(label.clone());
    }
    feature
}
