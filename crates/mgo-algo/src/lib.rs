//! # mgo-algo: Minigrid Layout Optimisation
//!
//! Decides which branches of a candidate wiring tree are worth building for a
//! village minigrid fed from a single generator.
//!
//! ## Pipeline
//!
//! | Stage | Entry point | Effect |
//! |-------|-------------|--------|
//! | Tree | [`spanning::euclidean_spanning_tree`] | Candidate segments over all points |
//! | Direction | [`director::direct_network`] | Orients arcs root-outward, annotates distances, applies max reach |
//! | Economics | [`economics::EconomicConfig`] | Capex, opex, income and NPV of a (hypothetically pruned) tree |
//! | Pruning | [`optimizer::optimize`] | Greedy NPV-maximising or coverage-targeted cuts |
//! | Resolution | [`resolver::resolve_connectivity`] | Connected flags, stranded arcs disabled |
//! | Report | [`resolver::build_report`] | Whole-unit summary figures |
//!
//! [`workflow::run_model`] chains pruning, resolution and reporting.
//!
//! ## Example
//!
//! ```
//! use mgo_algo::{create_network, run_model, EconomicConfig, OptimizerConfig};
//! use mgo_core::{Meters, Point, SquareMeters};
//!
//! let buildings = [
//!     (Point::new(30.0, 0.0), SquareMeters(60.0)),
//!     (Point::new(60.0, 10.0), SquareMeters(45.0)),
//! ];
//! let mut network = create_network(Point::new(0.0, 0.0), &buildings, Meters(1_000.0))?;
//!
//! let economics = EconomicConfig::default().with_tariff(0.8);
//! let run = run_model(&mut network, &economics, &OptimizerConfig::default())?;
//! println!("{}", run.report.summary());
//! # Ok::<(), mgo_core::MgoError>(())
//! ```
//!
//! The engine is single-threaded apart from optional parallel candidate
//! scoring (`parallel` feature) and assumes exclusive ownership of the
//! network for the duration of a run.

pub mod director;
pub mod economics;
pub mod optimizer;
pub mod resolver;
pub mod spanning;
pub mod workflow;

pub use director::{direct_network, DirectionSummary};
pub use economics::{
    discounted_npv, evaluate_subtree, EconomicConfig, Financials, SubtreeTotals,
    PEAK_DEMAND_DIVISOR, PEOPLE_PER_M2,
};
pub use optimizer::{
    best_cut, optimize, Cut, OptimizationMode, OptimizationOutcome, OptimizerConfig,
};
pub use resolver::{build_report, resolve_connectivity, Report};
pub use spanning::euclidean_spanning_tree;
pub use workflow::{create_network, run_model, ModelRun};
