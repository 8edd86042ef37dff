mod duals;
mod error;
mod feasibility;
mod problem;
mod render;
mod sensitivity;
mod simplex;
mod solution;
mod standard_form;

pub use duals::{extract_shadow_prices, ShadowPrices};
pub use error::{ProblemError, SolverError};
pub use feasibility::{check_feasibility, FeasibilityReport};
pub use problem::{Constraint, ConstraintOp, LpProblem};
pub use render::{format_terms, variable_name};
pub use sensitivity::{compare_shadow_prices, rhs_ranges, LimitChange, RhsRange, SensitivityVerdict};
pub use simplex::{Phase, Solver};
pub use solution::{Analysis, ReducedCost, Solution, SolutionStatus, SolveResult};
pub use standard_form::{ColumnLayout, Tableau};

/// Solve `max c·x` subject to `constraints` and `x >= 0` with a default [`Solver`].
///
/// Input is validated first; dimension problems come back as
/// [`SolveResult::InvalidInput`] without any pivoting.
pub fn solve(variable_count: usize, objective: Vec<f64>, constraints: Vec<Constraint>) -> SolveResult {
    Solver::new().solve_parts(variable_count, objective, constraints)
}
