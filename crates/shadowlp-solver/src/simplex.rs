use std::fmt;

use log::{debug, trace};

use crate::duals::{extract_shadow_prices, snap_to_zero};
use crate::error::SolverError;
use crate::problem::{Constraint, LpProblem};
use crate::sensitivity::rhs_ranges;
use crate::solution::{Analysis, ReducedCost, Solution, SolveResult};
use crate::standard_form::Tableau;

/// Pivots allowed per tableau row plus column before giving up.
const ITERATIONS_PER_DIMENSION: usize = 50;

/// Simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per phase; derived from the tableau size when unset
    max_iterations: Option<usize>,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Consecutive degenerate pivots tolerated before switching to Bland's rule
    degenerate_streak: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: None,
            tolerance: 1e-9,
            degenerate_streak: 10,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Driving the artificial variables to zero
    One,
    /// Optimizing the real objective
    Two,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::One => write!(f, "phase 1"),
            Phase::Two => write!(f, "phase 2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Phase1,
    Phase2,
    Optimal,
    Unbounded,
    Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotRule {
    /// Most negative reduced cost, lowest index on ties
    Dantzig,
    /// First negative reduced cost; ratio ties go to the lowest basic index
    Bland,
}

enum PhaseEnd {
    Optimal,
    Unbounded,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_degenerate_streak(mut self, streak: usize) -> Self {
        self.degenerate_streak = streak;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Validate the parts into an [`LpProblem`] and solve it.
    pub fn solve_parts(
        &self,
        variable_count: usize,
        objective: Vec<f64>,
        constraints: Vec<Constraint>,
    ) -> SolveResult {
        match LpProblem::new(variable_count, objective, constraints) {
            Ok(problem) => self.solve(&problem),
            Err(e) => {
                debug!("rejected problem: {}", e);
                SolveResult::InvalidInput(e)
            }
        }
    }

    /// Solve the LP problem using the two-phase simplex method
    pub fn solve(&self, problem: &LpProblem) -> SolveResult {
        let mut tableau = Tableau::from_problem(problem);

        match self.run(&mut tableau, problem) {
            // Read results off a refactored tableau so equal bases give
            // bit-identical prices whatever pivots led there
            Ok(State::Optimal) => match Tableau::with_basis(problem, tableau.basis(), self.tolerance) {
                Some(canonical) => SolveResult::Optimal(self.extract_solution(&canonical, problem)),
                None => SolveResult::SolverError(SolverError::Numerical {
                    phase: Phase::Two,
                    reason: "optimal basis is singular".to_string(),
                }),
            },
            Ok(State::Unbounded) => SolveResult::Unbounded,
            Ok(State::Infeasible) => SolveResult::Infeasible,
            Ok(state) => SolveResult::SolverError(SolverError::Numerical {
                phase: Phase::Two,
                reason: format!("stopped in non-terminal state {:?}", state),
            }),
            Err(e) => {
                debug!("solver failed: {}", e);
                SolveResult::SolverError(e)
            }
        }
    }

    fn run(&self, tableau: &mut Tableau, problem: &LpProblem) -> Result<State, SolverError> {
        let mut state = if tableau.layout().has_artificial() {
            State::Phase1
        } else {
            State::Phase2
        };

        loop {
            state = match state {
                State::Phase1 => self.phase1(tableau)?,
                State::Phase2 => self.phase2(tableau, problem)?,
                terminal => {
                    debug!("simplex finished: {:?}", terminal);
                    return Ok(terminal);
                }
            };
        }
    }

    fn iteration_limit(&self, tableau: &Tableau) -> usize {
        self.max_iterations.unwrap_or_else(|| {
            ITERATIONS_PER_DIMENSION * (tableau.rows() + tableau.layout().width())
        })
    }

    fn phase1(&self, tableau: &mut Tableau) -> Result<State, SolverError> {
        debug!(
            "phase 1: {} artificial variables",
            tableau.layout().artificial_count()
        );
        tableau.load_phase_one_objective();

        // Artificials may enter here; the phase 1 objective is bounded by 0
        let price_end = tableau.layout().rhs_column();
        if let PhaseEnd::Unbounded = self.iterate(tableau, Phase::One, price_end)? {
            return Err(SolverError::Numerical {
                phase: Phase::One,
                reason: "auxiliary objective reported unbounded".to_string(),
            });
        }

        let artificial_sum = -tableau.objective_value();
        if artificial_sum > self.tolerance {
            debug!("phase 1 optimum leaves artificial sum {}", artificial_sum);
            return Ok(State::Infeasible);
        }

        self.drive_out_artificials(tableau);
        Ok(State::Phase2)
    }

    /// Pivot zero-level artificials out of the basis. A row with no usable
    /// column is redundant; its artificial stays basic at zero.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.layout().artificial_start();

        for row in 0..tableau.rows() {
            if !tableau.layout().is_artificial(tableau.basis()[row]) {
                continue;
            }
            let replacement =
                (0..art_start).find(|&col| tableau.value(row, col).abs() > self.tolerance);
            match replacement {
                Some(col) => {
                    trace!("driving artificial out of row {} via column {}", row, col);
                    tableau.pivot(row, col);
                }
                None => debug!("row {} is redundant, artificial stays basic at zero", row),
            }
        }
    }

    fn phase2(&self, tableau: &mut Tableau, problem: &LpProblem) -> Result<State, SolverError> {
        debug!("phase 2");
        tableau.load_objective(problem.objective());

        // Artificial columns never re-enter
        let price_end = tableau.layout().artificial_start();
        match self.iterate(tableau, Phase::Two, price_end)? {
            PhaseEnd::Optimal => Ok(State::Optimal),
            PhaseEnd::Unbounded => Ok(State::Unbounded),
        }
    }

    /// Pivot until no column below `price_end` has a negative reduced cost.
    fn iterate(&self, tableau: &mut Tableau, phase: Phase, price_end: usize) -> Result<PhaseEnd, SolverError> {
        let limit = self.iteration_limit(tableau);
        let mut rule = PivotRule::Dantzig;
        let mut degenerate = 0;

        let mut iteration = 0;
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, price_end, rule) else {
                debug!("{} optimal after {} pivots", phase, iteration);
                return Ok(PhaseEnd::Optimal);
            };
            let Some((pivot_row, ratio)) = self.find_pivot_row(tableau, pivot_col, rule) else {
                debug!("{}: column {} has no leaving row", phase, pivot_col);
                return Ok(PhaseEnd::Unbounded);
            };
            if iteration >= limit {
                return Err(SolverError::IterationLimit { phase, limit });
            }

            if ratio <= self.tolerance {
                degenerate += 1;
                if rule == PivotRule::Dantzig && degenerate >= self.degenerate_streak {
                    debug!(
                        "{}: {} degenerate pivots in a row, switching to Bland's rule",
                        phase, degenerate
                    );
                    rule = PivotRule::Bland;
                }
            } else {
                degenerate = 0;
            }

            trace!(
                "{} pivot {}: row {} col {} (ratio {})",
                phase, iteration, pivot_row, pivot_col, ratio
            );
            tableau.pivot(pivot_row, pivot_col);
            iteration += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, price_end: usize, rule: PivotRule) -> Option<usize> {
        let obj = &tableau.objective_row()[..price_end];

        match rule {
            PivotRule::Dantzig => {
                let mut min_val = -self.tolerance;
                let mut min_col = None;
                for (j, &v) in obj.iter().enumerate() {
                    if v < min_val {
                        min_val = v;
                        min_col = Some(j);
                    }
                }
                min_col
            }
            PivotRule::Bland => obj.iter().position(|&v| v < -self.tolerance),
        }
    }

    /// Minimum ratio test. Returns the leaving row and its ratio.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize, rule: PivotRule) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for i in 0..tableau.rows() {
            let val = tableau.value(i, col);
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.rhs(i).max(0.0) / val;

            best = match best {
                None => Some((i, ratio)),
                Some((_, min_ratio)) if ratio < min_ratio - self.tolerance => Some((i, ratio)),
                Some((row, min_ratio))
                    if rule == PivotRule::Bland
                        && ratio <= min_ratio + self.tolerance
                        && tableau.basis()[i] < tableau.basis()[row] =>
                {
                    Some((i, ratio))
                }
                keep => keep,
            };
        }

        best
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &LpProblem) -> Solution {
        let n_vars = problem.variable_count();

        let mut values = vec![0.0; n_vars];
        for (row, &basic) in tableau.basis().iter().enumerate() {
            if basic < n_vars {
                values[basic] = snap_to_zero(tableau.rhs(row), self.tolerance);
            }
        }

        let objective_value = problem.evaluate(&values);
        let shadow_prices = extract_shadow_prices(tableau, self.tolerance);
        let analysis = self.analyze(tableau, problem, &values);

        Solution {
            values,
            objective_value,
            shadow_prices,
            analysis,
        }
    }

    fn analyze(&self, tableau: &Tableau, problem: &LpProblem, values: &[f64]) -> Analysis {
        let obj = tableau.objective_row();

        let reduced_costs = values
            .iter()
            .enumerate()
            .map(|(j, &value)| {
                let is_basic = tableau.is_basic(j);
                let reduced_cost = if is_basic {
                    0.0
                } else {
                    snap_to_zero(obj[j], self.tolerance)
                };
                ReducedCost {
                    variable: j,
                    value,
                    reduced_cost,
                    is_basic,
                }
            })
            .collect();

        let slacks: Vec<f64> = problem
            .constraints()
            .iter()
            .map(|c| snap_to_zero(c.slack(values), self.tolerance.sqrt()))
            .collect();
        let binding = slacks.iter().map(|&s| s == 0.0).collect();

        Analysis {
            reduced_costs,
            slacks,
            binding,
            rhs_ranges: rhs_ranges(tableau, problem, self.tolerance),
        }
    }
}
