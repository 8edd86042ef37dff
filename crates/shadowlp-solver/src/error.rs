use thiserror::Error;

use crate::simplex::Phase;

/// Reasons a problem is rejected before the solver touches it.
///
/// Constraint indices are 1-based, matching how constraints are numbered in
/// rendered output.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProblemError {
    #[error("Variable count must be at least 1")]
    NoVariables,
    #[error("Objective has {found} coefficients, expected {expected}")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {index} has {found} coefficients, expected {expected}")]
    ConstraintLength {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Non-finite value in {0}")]
    NonFinite(String),
}

/// Failures of the simplex iteration itself. These never carry a partial solution.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Iteration limit of {limit} reached in {phase}")]
    IterationLimit { phase: Phase, limit: usize },
    #[error("Numerical breakdown in {phase}: {reason}")]
    Numerical { phase: Phase, reason: String },
}
