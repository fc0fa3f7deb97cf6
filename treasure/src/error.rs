//! Errors raised by the knapsack solvers and the path collector.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    /// The algorithm selector is not one of the recognized names.
    #[error("unknown knapsack algorithm {0:?}, expected \"recursive\" or \"dynamic\"")]
    InvalidConfiguration(String),

    /// Treasure data that cannot be turned into a knapsack item.
    #[error("treasure at {location} has negative data (weight {weight}, value {value})")]
    InvalidInput {
        location: String,
        weight: i64,
        value: i64,
    },

    /// A running total of treasure values no longer fits its integer type.
    #[error("treasure value total overflows at {0}")]
    ValueOverflow(String),

    /// The entrance has no neighbour that can be reached without crossing a wall.
    #[error("no accessible cell from entrance {0}")]
    NoAccessibleStart(String),

    /// The traversal ran out of cells before getting next to the exit.
    #[error("exit {exit} cannot be reached from {start}")]
    ExitUnreachable { start: String, exit: String },

    /// Backtracking from the exit hit a cell that was never reached.
    #[error("path reconstruction stopped at {at}, which has no recorded parent")]
    IncompletePath { at: String },

    #[error("failed to write artifact: {0}")]
    Artifact(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
