//! Greedy branch pruning.
//!
//! Every round scores each enabled arc by the NPV the network would have
//! without it, then commits the best cut. Two stopping rules are supported:
//!
//! | Mode | Stops when |
//! |------|------------|
//! | [`OptimizationMode::MaximizeNpv`] | no cut beats the best NPV seen so far |
//! | [`OptimizationMode::TargetCoverage`] | enabled arcs / all arcs ≤ target |
//!
//! Each round re-evaluates the whole tree once per candidate, O(arcs²) in the
//! worst case. That is fine for villages of tens to a few hundred buildings
//! and is kept deliberately: scores are always recomputed from scratch, so
//! tie-breaking never depends on incremental bookkeeping.
//!
//! With the `parallel` feature the candidates of a round are scored on the
//! rayon pool. The winning cut is chosen after all scores are in, highest NPV
//! first and lowest arc id on ties, so the result is identical to a serial run.

use crate::economics::EconomicConfig;
use mgo_core::{ArcId, MgoError, MgoResult, Network};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

/// Stopping rule for the pruning loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum OptimizationMode {
    /// Keep cutting while a cut raises NPV
    MaximizeNpv,
    /// Keep cutting the least profitable branch until coverage falls to the target
    TargetCoverage(f64),
}

impl OptimizationMode {
    pub fn from_config(config: &EconomicConfig) -> Self {
        match config.target_coverage {
            Some(target) => OptimizationMode::TargetCoverage(target),
            None => OptimizationMode::MaximizeNpv,
        }
    }
}

/// Knobs that do not change the economics.
#[derive(Debug, Clone, Default)]
pub struct OptimizerConfig {
    /// Abort after this many rounds. Both loops are already bounded by the
    /// arc count, so this only matters for callers wanting a tighter bound.
    pub max_rounds: Option<usize>,
}

impl OptimizerConfig {
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }
}

/// A committed cut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cut {
    pub arc: ArcId,
    /// NPV of the network right after this cut
    pub npv: f64,
}

/// What the pruning loop did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    pub mode: OptimizationMode,
    /// Rounds that scored at least one candidate, including a final
    /// non-improving one
    pub rounds: usize,
    /// Cuts in the order they were committed
    pub cuts: Vec<Cut>,
    /// NPV before any cut
    pub initial_npv: f64,
    /// NPV of the configuration left behind
    pub final_npv: f64,
    /// True when `max_rounds` stopped the loop
    pub capped: bool,
}

impl OptimizationOutcome {
    fn new(mode: OptimizationMode, initial_npv: f64) -> Self {
        Self {
            mode,
            rounds: 0,
            cuts: Vec::new(),
            initial_npv,
            final_npv: initial_npv,
            capped: false,
        }
    }

    fn commit(&mut self, network: &mut Network, cut: Cut) {
        network.arc_mut(cut.arc).disable();
        debug!(
            round = self.rounds,
            arc = cut.arc.value(),
            npv = cut.npv,
            "arc pruned"
        );
        self.final_npv = cut.npv;
        self.cuts.push(cut);
    }
}

/// Prune the directed network in place according to the configured mode.
///
/// The economic configuration is validated first; a network that has not been
/// through the director is rejected.
pub fn optimize(
    network: &mut Network,
    economics: &EconomicConfig,
    config: &OptimizerConfig,
) -> MgoResult<OptimizationOutcome> {
    economics.validate()?;
    if !network.is_directed() {
        return Err(MgoError::Structure(
            "network must be directed before optimisation".into(),
        ));
    }

    let mode = OptimizationMode::from_config(economics);
    let outcome = match mode {
        OptimizationMode::MaximizeNpv => maximize_npv(network, economics, config),
        OptimizationMode::TargetCoverage(target) => {
            target_coverage(network, economics, config, target)
        }
    };

    info!(
        mode = ?outcome.mode,
        rounds = outcome.rounds,
        cuts = outcome.cuts.len(),
        initial_npv = outcome.initial_npv,
        final_npv = outcome.final_npv,
        "optimisation finished"
    );
    Ok(outcome)
}

fn maximize_npv(
    network: &mut Network,
    economics: &EconomicConfig,
    config: &OptimizerConfig,
) -> OptimizationOutcome {
    let baseline = economics.npv_without(network, None);
    let mut outcome = OptimizationOutcome::new(OptimizationMode::MaximizeNpv, baseline);
    let mut best_npv = baseline;

    loop {
        if round_limit_hit(&mut outcome, config) {
            break;
        }
        let Some(cut) = best_cut(network, economics) else {
            break;
        };
        outcome.rounds += 1;

        if cut.npv > best_npv {
            best_npv = cut.npv;
            outcome.commit(network, cut);
        } else {
            break;
        }
    }

    outcome
}

fn target_coverage(
    network: &mut Network,
    economics: &EconomicConfig,
    config: &OptimizerConfig,
    target: f64,
) -> OptimizationOutcome {
    let baseline = economics.npv_without(network, None);
    let mut outcome = OptimizationOutcome::new(OptimizationMode::TargetCoverage(target), baseline);

    while network.coverage().is_some_and(|coverage| coverage > target) {
        if round_limit_hit(&mut outcome, config) {
            break;
        }
        // Coverage is the hard constraint: the best cut is taken even when it
        // lowers NPV.
        let Some(cut) = best_cut(network, economics) else {
            break;
        };
        outcome.rounds += 1;
        outcome.commit(network, cut);
    }

    outcome
}

fn round_limit_hit(outcome: &mut OptimizationOutcome, config: &OptimizerConfig) -> bool {
    let hit = config
        .max_rounds
        .is_some_and(|limit| outcome.rounds >= limit);
    outcome.capped |= hit;
    hit
}

/// Score every enabled arc and return the most profitable cut, or `None`
/// when no arc is enabled.
pub fn best_cut(network: &Network, economics: &EconomicConfig) -> Option<Cut> {
    let candidates: Vec<ArcId> = network
        .arcs
        .iter()
        .filter(|arc| arc.is_enabled())
        .map(|arc| arc.id)
        .collect();

    let scores = score_candidates(network, economics, &candidates);

    let mut best: Option<Cut> = None;
    for cut in scores {
        if best.map_or(true, |b| cut.npv > b.npv) {
            best = Some(cut);
        }
    }
    best
}

#[cfg(feature = "parallel")]
fn score_candidates(network: &Network, economics: &EconomicConfig, candidates: &[ArcId]) -> Vec<Cut> {
    candidates
        .par_iter()
        .map(|&arc| Cut {
            arc,
            npv: economics.npv_without(network, Some(arc)),
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_candidates(network: &Network, economics: &EconomicConfig, candidates: &[ArcId]) -> Vec<Cut> {
    candidates
        .iter()
        .map(|&arc| Cut {
            arc,
            npv: economics.npv_without(network, Some(arc)),
        })
        .collect()
}
