use log::debug;

use crate::problem::Constraint;

/// Result of the structural pre-check run before re-solving a perturbed problem.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeasibilityReport {
    /// True when no constraint was flagged
    pub feasible: bool,
    /// 1-based indices of flagged constraints, in order
    pub violating: Vec<usize>,
}

/// Flag every constraint whose plain coefficient sum exceeds its rhs.
///
/// This is the product's documented pre-filter, not an LP feasibility test:
/// it ignores the relation, variable values and interaction between rows.
/// `x1 + x2 <= 1` is flagged even though `x = 0` satisfies it.
pub fn check_feasibility(constraints: &[Constraint]) -> FeasibilityReport {
    let violating: Vec<usize> = constraints
        .iter()
        .enumerate()
        .filter(|(_, c)| c.coefficients.iter().sum::<f64>() > c.rhs)
        .map(|(i, _)| i + 1)
        .collect();

    if !violating.is_empty() {
        debug!("feasibility pre-check flagged constraints {:?}", violating);
    }

    FeasibilityReport {
        feasible: violating.is_empty(),
        violating,
    }
}
