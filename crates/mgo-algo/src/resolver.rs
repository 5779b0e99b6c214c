//! Final reachability pass and the village report.

use crate::economics::EconomicConfig;
use mgo_core::{ArcId, Kilowatts, Network, NodeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mark every node reachable from the generator through enabled arcs as
/// connected, then disable every arc touching a node that is not.
///
/// Returns the number of stranded arcs disabled by this call. Running it again
/// without changes in between disables nothing and leaves all flags as they
/// were.
pub fn resolve_connectivity(network: &mut Network) -> usize {
    for node in network.nodes.iter_mut() {
        node.connected = false;
    }

    let mut stack = vec![NodeId::ROOT];
    while let Some(id) = stack.pop() {
        network.node_mut(id).connected = true;
        let children: Vec<NodeId> = network
            .outgoing(id)
            .filter_map(|arc| arc.to_node())
            .collect();
        stack.extend(children);
    }

    let stranded: Vec<ArcId> = network
        .nodes
        .iter()
        .filter(|node| !node.connected)
        .flat_map(|node| node.arcs.iter().copied())
        .filter(|&arc| network.arc(arc).is_enabled())
        .collect();

    let mut disabled = 0;
    for arc in stranded {
        // An arc between two stranded nodes shows up twice.
        if network.arc(arc).is_enabled() {
            network.arc_mut(arc).disable();
            disabled += 1;
        }
    }

    if disabled > 0 {
        debug!(stranded = disabled, "disabled arcs cut off from the generator");
    }
    disabled
}

/// Summary figures for the optimised village.
///
/// Monetary and size figures are whole units, truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Connected households (generator excluded)
    pub connected: usize,
    /// Generator size in kW
    pub gen_size: i64,
    /// Enabled wiring length in metres
    pub length: i64,
    pub capex: i64,
    pub opex: i64,
    /// Annual income
    pub income: i64,
    pub npv: i64,
}

impl Report {
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Minigrid Summary\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Connected households: {}\n", self.connected));
        s.push_str(&format!("Generator size: {} kW\n", self.gen_size));
        s.push_str(&format!("Wiring length: {} m\n", self.length));
        s.push_str(&format!("CAPEX: ${}\n", self.capex));
        s.push_str(&format!("OPEX: ${}/yr\n", self.opex));
        s.push_str(&format!("Income: ${}/yr\n", self.income));
        s.push_str(&format!("NPV: ${}\n", self.npv));
        s
    }
}

/// Compute the report over the current connected flags and enabled arcs.
///
/// Run [`resolve_connectivity`] first so the flags reflect the final state.
pub fn build_report(network: &Network, economics: &EconomicConfig) -> Report {
    let mut connected = 0usize;
    let mut monthly_income = 0.0;
    let mut generator = Kilowatts::ZERO;
    for node in network.nodes.iter().filter(|n| n.connected && !n.is_root()) {
        connected += 1;
        monthly_income += economics.monthly_income(node.area);
        generator += economics.generator_size(node.area);
    }

    let length = network.enabled_length();
    let capex = generator.value() * economics.gen_cost_per_kw
        + economics.connection_cost * connected as f64
        + economics.wire_cost_per_m * length.value();
    let fin = economics.cash_flows(generator, capex, monthly_income * 12.0);

    Report {
        connected,
        gen_size: fin.generator.value() as i64,
        length: length.value() as i64,
        capex: fin.capex as i64,
        opex: fin.opex as i64,
        income: fin.income as i64,
        npv: fin.npv as i64,
    }
}
