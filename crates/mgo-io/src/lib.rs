//! # mgo-io: Scenario Input & GeoJSON Output
//!
//! Loads a village scenario from JSON, turns it into a directed candidate
//! network, and writes the optimised layout back out as GeoJSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mgo_algo::OptimizerConfig;
//! use mgo_io::{load_scenario, write_geojson, ExportOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let scenario = load_scenario("village.json")?;
//!     let planned = scenario.plan(&OptimizerConfig::default())?;
//!
//!     println!("{}", planned.import.diagnostics.summary());
//!     println!("{}", planned.run.report.summary());
//!
//!     let options = ExportOptions::default().with_labels(planned.import.labels.clone());
//!     write_geojson("village.geojson", &planned.import.network, &options)?;
//!     Ok(())
//! }
//! ```
//!
//! Errors at file boundaries are `anyhow` errors carrying the path; engine
//! failures surface as [`mgo_core::MgoError`] underneath that context.

pub mod geojson;
pub mod scenario;

pub use geojson::{network_to_geojson, write_geojson, ExportOptions};
pub use scenario::{
    load_scenario, parse_scenario, BuildingRecord, ImportResult, PlannedScenario, Scenario,
    ScenarioError,
};
