//! Scenario files: building points, a generator and the economics of one village.
//!
//! ```json
//! {
//!   "generator": { "x": 0.0, "y": 0.0 },
//!   "buildings": [ { "x": 25.0, "y": 10.0, "area_m2": 48.0, "id": "b-17" } ],
//!   "max_reach_m": 1500.0,
//!   "min_area_m2": 12.0,
//!   "economics": { "tariff_per_kwh": 0.4, "target_coverage": -1 }
//! }
//! ```
//!
//! Coordinates are planar metres. Without explicit `segments` the candidate
//! tree is the Euclidean spanning tree over the generator and every building
//! that survives filtering.

use anyhow::{Context, Result};
use mgo_algo::{
    direct_network, euclidean_spanning_tree, run_model, EconomicConfig, ModelRun, OptimizerConfig,
};
use mgo_core::{
    ImportDiagnostics, Meters, MgoError, MgoResult, Network, NetworkBuilder, Point, Segment,
    SquareMeters,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Problems with a scenario that make it unusable before any network is built.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("maximum reach must be a non-negative number of metres, got {0}")]
    InvalidReach(f64),
    #[error("minimum building area must be a non-negative number, got {0}")]
    InvalidMinArea(f64),
    #[error("building id '{0}' appears more than once")]
    DuplicateId(String),
}

/// One building as stored in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRecord {
    pub x: f64,
    pub y: f64,
    pub area_m2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl BuildingRecord {
    fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A village to plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub generator: Point,
    pub buildings: Vec<BuildingRecord>,
    /// Longest cable run from the generator to any connected building
    pub max_reach_m: f64,
    /// Buildings with an area at or below this are not considered households
    #[serde(default)]
    pub min_area_m2: f64,
    /// Candidate tree; the spanning tree is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
    #[serde(default)]
    pub economics: EconomicConfig,
}

/// A directed network ready for optimisation.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub network: Network,
    pub diagnostics: ImportDiagnostics,
    /// Scenario ids indexed by node; the generator has none
    pub labels: Vec<Option<String>>,
}

/// A scenario taken through the whole planning pipeline.
#[derive(Debug, Clone)]
pub struct PlannedScenario {
    pub import: ImportResult,
    pub run: ModelRun,
}

/// Parse a scenario from JSON text.
pub fn parse_scenario(text: &str) -> MgoResult<Scenario> {
    Ok(serde_json::from_str(text)?)
}

/// Read a scenario from a JSON file.
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(MgoError::from)
        .with_context(|| format!("reading scenario file '{}'", path.display()))?;
    parse_scenario(&text).with_context(|| format!("parsing scenario file '{}'", path.display()))
}

impl Scenario {
    pub fn new(generator: Point, max_reach_m: f64) -> Self {
        Self {
            generator,
            buildings: Vec::new(),
            max_reach_m,
            min_area_m2: 0.0,
            segments: None,
            economics: EconomicConfig::default(),
        }
    }

    pub fn with_building(mut self, x: f64, y: f64, area_m2: f64) -> Self {
        self.buildings.push(BuildingRecord {
            x,
            y,
            area_m2,
            id: None,
        });
        self
    }

    pub fn with_min_area(mut self, min_area_m2: f64) -> Self {
        self.min_area_m2 = min_area_m2;
        self
    }

    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = Some(segments);
        self
    }

    pub fn with_economics(mut self, economics: EconomicConfig) -> Self {
        self.economics = economics;
        self
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if !self.max_reach_m.is_finite() || self.max_reach_m < 0.0 {
            return Err(ScenarioError::InvalidReach(self.max_reach_m));
        }
        if !self.min_area_m2.is_finite() || self.min_area_m2 < 0.0 {
            return Err(ScenarioError::InvalidMinArea(self.min_area_m2));
        }
        let mut seen = HashSet::new();
        for id in self.buildings.iter().filter_map(|b| b.id.as_deref()) {
            if !seen.insert(id) {
                return Err(ScenarioError::DuplicateId(id.to_string()));
            }
        }
        Ok(())
    }

    /// Filter buildings, build the candidate tree and direct it.
    ///
    /// Buildings at or below the minimum area are dropped. A building landing
    /// on the same whole-metre location as one already kept is skipped with a
    /// warning rather than failing the import.
    pub fn prepare(&self) -> Result<ImportResult> {
        self.validate()?;
        self.economics
            .validate()
            .context("validating scenario economics")?;

        let mut diagnostics = ImportDiagnostics::new();
        diagnostics.stats.buildings = self.buildings.len();

        let mut occupied = HashMap::new();
        occupied.insert(self.generator.location_key(), "the generator".to_string());
        let mut kept: Vec<(Point, SquareMeters)> = Vec::new();
        let mut labels = vec![None];

        for (index, record) in self.buildings.iter().enumerate() {
            let name = record
                .id
                .clone()
                .unwrap_or_else(|| format!("building {index}"));
            if record.area_m2 <= self.min_area_m2 {
                diagnostics.stats.filtered_buildings += 1;
                debug!(building = %name, area = record.area_m2, "below minimum area");
                continue;
            }
            let key = record.position().location_key();
            if let Some(owner) = occupied.get(&key) {
                warn!(building = %name, shared_with = %owner, "duplicate location skipped");
                diagnostics.diagnostics.add_warning_with_entity(
                    "import",
                    &format!("Shares its location with {owner}; skipped"),
                    &name,
                );
                continue;
            }
            occupied.insert(key, name);
            kept.push((record.position(), SquareMeters(record.area_m2)));
            labels.push(record.id.clone());
        }

        if diagnostics.stats.filtered_buildings > 0 {
            warn!(
                filtered = diagnostics.stats.filtered_buildings,
                min_area = self.min_area_m2,
                "buildings at or below the minimum area dropped"
            );
        }

        let segments = match &self.segments {
            Some(segments) => segments.clone(),
            None => {
                let mut points = Vec::with_capacity(kept.len() + 1);
                points.push(self.generator);
                points.extend(kept.iter().map(|(position, _)| *position));
                euclidean_spanning_tree(&points)
            }
        };
        diagnostics.stats.segments = segments.len();

        let mut network = NetworkBuilder::new(self.generator)
            .buildings(kept)
            .segments(segments)
            .build()
            .context("building candidate network")?;
        network.validate_into(&mut diagnostics.diagnostics);

        let summary = direct_network(&mut network, Meters(self.max_reach_m))
            .context("directing candidate network")?;
        if summary.beyond_reach > 0 {
            diagnostics.diagnostics.add_warning(
                "reach",
                &format!(
                    "{} wiring runs lead beyond the {} m maximum reach and were disabled",
                    summary.beyond_reach, self.max_reach_m
                ),
            );
        }

        for issue in &diagnostics.diagnostics.issues {
            debug!(%issue, "import diagnostic");
        }
        if diagnostics.has_errors() {
            warn!(summary = %diagnostics.summary(), "scenario imported with errors");
        } else {
            debug!(summary = %diagnostics.summary(), "scenario imported");
        }

        Ok(ImportResult {
            network,
            diagnostics,
            labels,
        })
    }

    /// Prepare the network, then prune, resolve and report on it.
    pub fn plan(&self, optimizer: &OptimizerConfig) -> Result<PlannedScenario> {
        let mut import = self.prepare()?;
        let run = run_model(&mut import.network, &self.economics, optimizer)
            .context("optimising network")?;
        Ok(PlannedScenario { import, run })
    }
}
