use crate::duals::ShadowPrices;
use crate::error::{ProblemError, SolverError};
use crate::sensitivity::RhsRange;

/// Every terminal outcome of a solve. Callers have to match on all of them.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    /// An optimal solution was found
    Optimal(Solution),
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The problem was rejected before solving
    InvalidInput(ProblemError),
    /// Solver gave up (iteration limit or numerical trouble)
    SolverError(SolverError),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
    InvalidInput,
    Error,
}

/// The result of solving an LP problem to optimality
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Optimal values for each variable
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Dual value of each constraint, index-aligned with the constraints
    pub shadow_prices: ShadowPrices,
    /// Detailed analysis
    pub analysis: Analysis,
}

/// Detailed analysis of the optimal solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Reduced costs for each variable
    pub reduced_costs: Vec<ReducedCost>,

    /// Slack (`<=`) or surplus (`>=`) of each constraint at the optimum
    pub slacks: Vec<f64>,

    /// Whether each constraint holds with equality at the optimum
    pub binding: Vec<bool>,

    /// Range of each right-hand side over which the optimal basis is unchanged
    pub rhs_ranges: Vec<RhsRange>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedCost {
    /// Zero-based variable index
    pub variable: usize,
    /// Current value in solution
    pub value: f64,
    /// Reduced cost; how much the objective coefficient must rise before the
    /// variable becomes worth producing
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl SolveResult {
    pub fn status(&self) -> SolutionStatus {
        match self {
            SolveResult::Optimal(_) => SolutionStatus::Optimal,
            SolveResult::Infeasible => SolutionStatus::Infeasible,
            SolveResult::Unbounded => SolutionStatus::Unbounded,
            SolveResult::InvalidInput(_) => SolutionStatus::InvalidInput,
            SolveResult::SolverError(_) => SolutionStatus::Error,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveResult::Optimal(_))
    }

    pub fn optimal(&self) -> Option<&Solution> {
        match self {
            SolveResult::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_optimal(self) -> Option<Solution> {
        match self {
            SolveResult::Optimal(solution) => Some(solution),
            _ => None,
        }
    }
}

impl Analysis {
    /// 1-based indices of the binding constraints.
    pub fn binding_constraints(&self) -> Vec<usize> {
        self.binding
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| i + 1)
            .collect()
    }
}
