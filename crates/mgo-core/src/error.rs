//! Unified error types for the minigrid optimiser
//!
//! Every fallible engine operation returns [`MgoResult`]. Precondition
//! violations are reported before any arc is touched; structural failures of
//! the input tree abort the run instead of being silently skipped.
//!
//! # Example
//!
//! ```ignore
//! use mgo_core::{MgoError, MgoResult};
//!
//! fn plan(network: &mut Network, economics: &EconomicConfig) -> MgoResult<Report> {
//!     economics.validate()?;
//!     direct_network(network, Meters(1_000.0))?;
//!     Ok(run_model(network, economics, &OptimizerConfig::default())?.report)
//! }
//! ```

use thiserror::Error;

/// Unified error type for all minigrid operations.
#[derive(Error, Debug)]
pub enum MgoError {
    /// I/O errors (scenario files, exports)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Caller-supplied data or configuration that is not physical
    #[error("Validation error: {0}")]
    Validation(String),

    /// The candidate tree violates a structural invariant (cycle, unreachable arc, ...)
    #[error("Structural inconsistency: {0}")]
    Structure(String),
}

/// Convenience type alias for Results using MgoError.
pub type MgoResult<T> = Result<T, MgoError>;

impl MgoError {
    /// True for errors caused by a malformed spanning tree.
    pub fn is_structural(&self) -> bool {
        matches!(self, MgoError::Structure(_))
    }
}

impl From<serde_json::Error> for MgoError {
    fn from(err: serde_json::Error) -> Self {
        MgoError::Parse(err.to_string())
    }
}
