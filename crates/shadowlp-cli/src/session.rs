use log::info;
use shadowlp_solver::{
    check_feasibility, compare_shadow_prices, FeasibilityReport, LpProblem, ProblemError,
    SensitivityVerdict, ShadowPrices, SolveResult, Solver,
};

/// Frontend state for one interactive session.
///
/// Holds the shadow prices of the most recent optimal solve. The engine is
/// stateless; this cache is the only thing that survives between calls.
pub struct Session {
    solver: Solver,
    previous: Option<ShadowPrices>,
}

/// What happened when a perturbed problem was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Perturbation {
    /// The pre-check flagged constraints; nothing was solved
    Flagged(FeasibilityReport),
    /// The perturbed problem was re-solved. `verdict` is present only when
    /// the re-solve reached an optimum.
    Solved {
        problem: LpProblem,
        result: SolveResult,
        verdict: Option<SensitivityVerdict>,
    },
}

impl Session {
    pub fn new(solver: Solver) -> Self {
        Self {
            solver,
            previous: None,
        }
    }

    pub fn previous(&self) -> Option<&ShadowPrices> {
        self.previous.as_ref()
    }

    /// Solve and, if optimal, replace the cached shadow prices.
    pub fn solve(&mut self, problem: &LpProblem) -> SolveResult {
        let result = self.solver.solve(problem);
        if let SolveResult::Optimal(solution) = &result {
            info!("caching {} shadow prices", solution.shadow_prices.len());
            self.previous = Some(solution.shadow_prices.clone());
        }
        result
    }

    /// Apply rhs `deltas`, run the feasibility pre-check, and re-solve when it
    /// passes. The cached baseline is compared against but never replaced.
    pub fn perturb(&self, problem: &LpProblem, deltas: &[f64]) -> Result<Perturbation, ProblemError> {
        let perturbed = problem.with_rhs_deltas(deltas)?;

        let report = check_feasibility(perturbed.constraints());
        if !report.feasible {
            info!("perturbation flagged by pre-check: {:?}", report.violating);
            return Ok(Perturbation::Flagged(report));
        }

        let result = self.solver.solve(&perturbed);
        let verdict = result
            .optimal()
            .map(|solution| compare_shadow_prices(self.previous(), &solution.shadow_prices, deltas));

        Ok(Perturbation::Solved {
            problem: perturbed,
            result,
            verdict,
        })
    }
}
