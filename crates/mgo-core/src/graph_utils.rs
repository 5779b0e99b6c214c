use crate::{ArcState, Meters, Network};

/// Summary statistics for a minigrid network at any point of its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkStats {
    pub node_count: usize,
    pub arc_count: usize,
    pub enabled_arcs: usize,
    pub disabled_arcs: usize,
    pub connected_buildings: usize,
    pub enabled_length: Meters,
    pub max_degree: usize,
    /// Enabled fraction of all candidate arcs (1.0 for an empty tree)
    pub coverage: f64,
}

/// Counts arcs by state, connected buildings, and the busiest junction.
pub fn network_stats(network: &Network) -> NetworkStats {
    let mut degrees = vec![0usize; network.nodes.len()];
    for arc in &network.arcs {
        for position in [arc.start, arc.end] {
            if let Some(node) = network.node_at(&position) {
                degrees[node.value()] += 1;
            }
        }
    }

    let disabled_arcs = network
        .arcs
        .iter()
        .filter(|a| a.state == ArcState::Disabled)
        .count();

    NetworkStats {
        node_count: network.nodes.len(),
        arc_count: network.arcs.len(),
        enabled_arcs: network.enabled_arc_count(),
        disabled_arcs,
        connected_buildings: network.connected_buildings(),
        enabled_length: network.enabled_length(),
        max_degree: degrees.into_iter().max().unwrap_or(0),
        coverage: network.coverage().unwrap_or(1.0),
    }
}

/// Export the network to a DOT string (Graphviz) for quick visual checks.
///
/// Directed arcs are drawn root-outward; disabled arcs are dashed and
/// disconnected buildings greyed out.
pub fn render_dot(network: &Network) -> String {
    let mut buffer = String::new();
    buffer.push_str("digraph minigrid {\n");
    for node in &network.nodes {
        let label = if node.is_root() {
            "generator".to_string()
        } else {
            format!("{} ({:.0} m²)", node.id.value(), node.area.value())
        };
        let style = if node.connected || node.is_root() {
            ""
        } else {
            ", color=grey"
        };
        buffer.push_str(&format!(
            "  n{} [label=\"{}\"{}];\n",
            node.id.value(),
            label,
            style
        ));
    }
    for arc in &network.arcs {
        let (source, target) = match arc.direction {
            Some(direction) => (direction.from.value(), direction.to.value()),
            None => match (network.node_at(&arc.start), network.node_at(&arc.end)) {
                (Some(a), Some(b)) => (a.value(), b.value()),
                _ => continue,
            },
        };
        let style = match arc.state {
            ArcState::Enabled => "",
            ArcState::Disabled => ", style=dashed",
            ArcState::Pending => ", dir=none",
        };
        buffer.push_str(&format!(
            "  n{source} -> n{target} [label=\"{:.0} m\"{style}];\n",
            arc.length.value()
        ));
    }
    buffer.push('}');
    buffer
}
