//! Economic evaluation of a (possibly pruned) minigrid.
//!
//! Turns the population and wiring reachable from the generator into capital
//! cost, operating cost, income and a discounted-cash-flow NPV.
//!
//! ```text
//! population      = floor_area × PEOPLE_PER_M2
//! peak_kw/person  = demand_kwh_per_person_month / (4 × 30)
//! generator_kw    = population × peak_kw/person
//! capex           = generator_kw × gen_cost_per_kw
//!                 + wire_cost_per_m × wire_length
//!                 + connection_cost × connections
//! opex            = opex_ratio × capex
//! income          = 12 × population × demand × tariff
//! NPV             = Σ_{t=0..years-1} flow_t / (1 + rate)^t
//!                   flow_0 = -capex, flow_t = income - opex
//! ```
//!
//! Evaluation never mutates the network: a hypothetical cut is passed in as
//! the arc to skip, which drops that arc's whole downstream subtree from the
//! totals.

use mgo_core::{ArcId, Kilowatts, Meters, MgoError, MgoResult, Network, NodeId, SquareMeters};
use serde::{Deserialize, Deserializer, Serialize};

/// Occupancy heuristic: roughly 4 people in a 40 m² house, less circulation space.
pub const PEOPLE_PER_M2: f64 = 0.15;

/// Converts monthly per-person energy demand into a peak kW figure.
pub const PEAK_DEMAND_DIVISOR: f64 = 4.0 * 30.0;

/// Economic parameters supplied by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicConfig {
    /// Energy demand in kWh per person per month
    pub demand_kwh_per_person_month: f64,
    /// Tariff in currency per kWh
    pub tariff_per_kwh: f64,
    /// Generator cost in currency per kW installed
    pub gen_cost_per_kw: f64,
    /// Wire cost in currency per metre
    pub wire_cost_per_m: f64,
    /// Cost per household connection
    pub connection_cost: f64,
    /// Annual opex as a fraction of capex
    pub opex_ratio: f64,
    /// Project horizon in years
    pub years: u32,
    /// Annual discount rate (fraction)
    pub discount_rate: f64,
    /// Target fraction of candidate arcs to keep; `None` maximises NPV instead.
    /// A legacy value of `-1` also selects NPV mode.
    #[serde(deserialize_with = "coverage_or_sentinel")]
    pub target_coverage: Option<f64>,
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            demand_kwh_per_person_month: 6.0,
            tariff_per_kwh: 0.5,
            gen_cost_per_kw: 4_000.0,
            wire_cost_per_m: 10.0,
            connection_cost: 100.0,
            opex_ratio: 0.02,
            years: 20,
            discount_rate: 0.06,
            target_coverage: None,
        }
    }
}

fn coverage_or_sentinel<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| *v != -1.0))
}

impl EconomicConfig {
    pub fn with_demand(mut self, kwh_per_person_month: f64) -> Self {
        self.demand_kwh_per_person_month = kwh_per_person_month;
        self
    }

    pub fn with_tariff(mut self, tariff_per_kwh: f64) -> Self {
        self.tariff_per_kwh = tariff_per_kwh;
        self
    }

    pub fn with_costs(mut self, gen_cost_per_kw: f64, wire_cost_per_m: f64, connection_cost: f64) -> Self {
        self.gen_cost_per_kw = gen_cost_per_kw;
        self.wire_cost_per_m = wire_cost_per_m;
        self.connection_cost = connection_cost;
        self
    }

    pub fn with_opex_ratio(mut self, opex_ratio: f64) -> Self {
        self.opex_ratio = opex_ratio;
        self
    }

    pub fn with_horizon(mut self, years: u32, discount_rate: f64) -> Self {
        self.years = years;
        self.discount_rate = discount_rate;
        self
    }

    pub fn with_target_coverage(mut self, target: f64) -> Self {
        self.target_coverage = Some(target);
        self
    }

    /// Reject non-physical parameters before any optimisation pass runs.
    pub fn validate(&self) -> MgoResult<()> {
        let non_negative = [
            ("demand", self.demand_kwh_per_person_month),
            ("tariff", self.tariff_per_kwh),
            ("generator cost", self.gen_cost_per_kw),
            ("wire cost", self.wire_cost_per_m),
            ("connection cost", self.connection_cost),
            ("opex ratio", self.opex_ratio),
            ("discount rate", self.discount_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MgoError::Validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.years == 0 {
            return Err(MgoError::Validation(
                "project horizon must be at least one year".into(),
            ));
        }

        if let Some(target) = self.target_coverage {
            if !(target > 0.0 && target <= 1.0) {
                return Err(MgoError::Validation(format!(
                    "target coverage must lie in (0, 1], got {target}"
                )));
            }
        }

        Ok(())
    }

    /// Peak demand per person in kW.
    pub fn peak_kw_per_person(&self) -> f64 {
        self.demand_kwh_per_person_month / PEAK_DEMAND_DIVISOR
    }

    /// Monthly income earned from a building of the given floor area.
    pub fn monthly_income(&self, area: SquareMeters) -> f64 {
        area.value() * PEOPLE_PER_M2 * self.demand_kwh_per_person_month * self.tariff_per_kwh
    }

    /// Generator rating needed to serve the given floor area.
    pub fn generator_size(&self, area: SquareMeters) -> Kilowatts {
        Kilowatts(area.value() * PEOPLE_PER_M2 * self.peak_kw_per_person())
    }

    /// Financial figures for the subtree described by `totals`.
    pub fn financials(&self, totals: &SubtreeTotals) -> Financials {
        let generator = self.generator_size(totals.floor_area);
        let wiring_cost = self.wire_cost_per_m * totals.wire_length.value()
            + self.connection_cost * totals.connections as f64;
        let capex = generator.value() * self.gen_cost_per_kw + wiring_cost;
        self.cash_flows(generator, capex, self.monthly_income(totals.floor_area) * 12.0)
    }

    /// Assemble opex and NPV from capex and annual income.
    pub fn cash_flows(&self, generator: Kilowatts, capex: f64, income: f64) -> Financials {
        let opex = self.opex_ratio * capex;
        let npv = discounted_npv(self.discount_rate, self.years, capex, income - opex);
        Financials {
            generator,
            capex,
            opex,
            income,
            npv,
        }
    }

    /// NPV of the network with `excluded` treated as disabled.
    pub fn npv_without(&self, network: &Network, excluded: Option<ArcId>) -> f64 {
        self.financials(&evaluate_subtree(network, excluded)).npv
    }
}

/// Aggregates over the part of the tree reachable from the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubtreeTotals {
    /// Reached buildings, generator excluded
    pub connections: usize,
    /// Sum of marginal distances of reached nodes
    pub wire_length: Meters,
    pub floor_area: SquareMeters,
}

/// Money and sizing for one network configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Financials {
    pub generator: Kilowatts,
    pub capex: f64,
    pub opex: f64,
    /// Annual income
    pub income: f64,
    pub npv: f64,
}

/// Walk the tree from the generator through enabled, outgoing arcs, skipping
/// `excluded` as if it were disabled.
///
/// Each node is reached through its single parent arc, so every node and arc
/// is counted at most once.
pub fn evaluate_subtree(network: &Network, excluded: Option<ArcId>) -> SubtreeTotals {
    let mut totals = SubtreeTotals::default();
    let mut stack = vec![NodeId::ROOT];

    while let Some(id) = stack.pop() {
        let node = network.node(id);
        if !node.is_root() {
            totals.connections += 1;
        }
        totals.wire_length += node.marginal_distance;
        totals.floor_area += node.area;

        for arc in network.outgoing(id) {
            if Some(arc.id) == excluded {
                continue;
            }
            if let Some(child) = arc.to_node() {
                stack.push(child);
            }
        }
    }

    totals
}

/// Σ flow_t / (1 + rate)^t with flow_0 = -capex and a flat annual flow after.
pub fn discounted_npv(rate: f64, years: u32, capex: f64, annual_flow: f64) -> f64 {
    (0..years)
        .map(|t| {
            let flow = if t == 0 { -capex } else { annual_flow };
            flow / (1.0 + rate).powi(t as i32)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_divisor_is_reproduced() {
        let config = EconomicConfig::default().with_demand(12.0);
        assert!((config.peak_kw_per_person() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_discounted_npv_matches_manual_sum() {
        // -100 + 50/1.1 + 50/1.21
        let npv = discounted_npv(0.1, 3, 100.0, 50.0);
        let expected = -100.0 + 50.0 / 1.1 + 50.0 / 1.21;
        assert!((npv - expected).abs() < 1e-9);
    }

    #[test]
    fn test_single_year_npv_is_negative_capex() {
        assert_eq!(discounted_npv(0.07, 1, 250.0, 1_000.0), -250.0);
    }

    #[test]
    fn test_zero_rate_is_plain_sum() {
        assert!((discounted_npv(0.0, 5, 100.0, 30.0) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_financials_formula() {
        let config = EconomicConfig::default()
            .with_demand(12.0)
            .with_tariff(0.5)
            .with_costs(1_000.0, 2.0, 50.0)
            .with_opex_ratio(0.1)
            .with_horizon(2, 0.0);
        let totals = SubtreeTotals {
            connections: 2,
            wire_length: Meters(100.0),
            floor_area: SquareMeters(200.0),
        };

        let fin = config.financials(&totals);
        // 200 m² × 0.15 = 30 people × 0.1 kW = 3 kW
        assert!((fin.generator.value() - 3.0).abs() < 1e-12);
        // 3 kW × 1000 + 2 × 100 + 50 × 2
        assert!((fin.capex - 3_300.0).abs() < 1e-9);
        assert!((fin.opex - 330.0).abs() < 1e-9);
        // 30 people × 12 kWh × 0.5 × 12 months
        assert!((fin.income - 2_160.0).abs() < 1e-9);
        assert!((fin.npv - (-3_300.0 + 2_160.0 - 330.0)).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_non_physical_values() {
        assert!(EconomicConfig::default().validate().is_ok());
        assert!(EconomicConfig::default().with_tariff(-0.1).validate().is_err());
        assert!(EconomicConfig::default().with_horizon(0, 0.05).validate().is_err());
        assert!(EconomicConfig::default().with_horizon(10, -0.01).validate().is_err());
        assert!(EconomicConfig::default()
            .with_costs(f64::NAN, 1.0, 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_coverage_bounds() {
        assert!(EconomicConfig::default().with_target_coverage(1.0).validate().is_ok());
        assert!(EconomicConfig::default().with_target_coverage(0.25).validate().is_ok());
        assert!(EconomicConfig::default().with_target_coverage(0.0).validate().is_err());
        assert!(EconomicConfig::default().with_target_coverage(1.5).validate().is_err());
    }

    #[test]
    fn test_legacy_coverage_sentinel() {
        let config: EconomicConfig =
            serde_json::from_str(r#"{"tariff_per_kwh": 0.3, "target_coverage": -1}"#).unwrap();
        assert_eq!(config.target_coverage, None);
        assert_eq!(config.tariff_per_kwh, 0.3);

        let config: EconomicConfig = serde_json::from_str(r#"{"target_coverage": 0.8}"#).unwrap();
        assert_eq!(config.target_coverage, Some(0.8));

        let config: EconomicConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EconomicConfig::default());
    }
}
