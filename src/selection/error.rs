use thiserror::Error;

use crate::results::GroupKey;

/// Data-integrity violations detected while selecting the best solution.
///
/// An empty input is not an error; these variants only describe result tables
/// that break the row invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error(
        "Solution {solution} of cluster {cluster} reports differing overall errors ({first} vs {second})"
    )]
    InconsistentOverallError {
        cluster: GroupKey,
        solution: GroupKey,
        first: f64,
        second: f64,
    },
    #[error("Variable '{variable}' appears more than once in solution {solution} of cluster {cluster}")]
    DuplicateVariable {
        cluster: GroupKey,
        solution: GroupKey,
        variable: String,
    },
    #[error("Invalid relative error {value} for variable '{variable}' in cluster {cluster}")]
    InvalidRelativeError {
        cluster: GroupKey,
        variable: String,
        value: f64,
    },
}
