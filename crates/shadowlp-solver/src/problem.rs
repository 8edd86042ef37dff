use crate::error::ProblemError;

/// A validated linear program: maximize `objective · x` subject to
/// `constraints` and `x >= 0`.
///
/// Construction goes through [`LpProblem::new`], so every instance has at
/// least one variable and consistent dimensions. Perturbations produce new
/// problems; nothing mutates a problem after it is built.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawProblem")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    variable_count: usize,
    objective: Vec<f64>,
    constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(alias = "<="))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(alias = ">="))]
    Ge,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) -> Self {
        Self { coefficients, op, rhs }
    }

    pub fn le(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintOp::Le, rhs)
    }

    pub fn ge(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self::new(coefficients, ConstraintOp::Ge, rhs)
    }

    /// Copy of this constraint with a different right-hand side.
    pub fn with_rhs(&self, rhs: f64) -> Self {
        Self {
            coefficients: self.coefficients.clone(),
            op: self.op,
            rhs,
        }
    }

    /// Left-hand side evaluated at `values`.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients.iter().zip(values).map(|(a, x)| a * x).sum()
    }

    /// Slack for `<=`, surplus for `>=`. Negative when `values` violate the constraint.
    pub fn slack(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs(values);
        match self.op {
            ConstraintOp::Le => self.rhs - lhs,
            ConstraintOp::Ge => lhs - self.rhs,
        }
    }
}

impl LpProblem {
    pub fn new(
        variable_count: usize,
        objective: Vec<f64>,
        constraints: Vec<Constraint>,
    ) -> Result<Self, ProblemError> {
        if variable_count < 1 {
            return Err(ProblemError::NoVariables);
        }
        if objective.len() != variable_count {
            return Err(ProblemError::ObjectiveLength {
                expected: variable_count,
                found: objective.len(),
            });
        }
        if objective.iter().any(|c| !c.is_finite()) {
            return Err(ProblemError::NonFinite("objective".to_string()));
        }

        for (i, c) in constraints.iter().enumerate() {
            if c.coefficients.len() != variable_count {
                return Err(ProblemError::ConstraintLength {
                    index: i + 1,
                    expected: variable_count,
                    found: c.coefficients.len(),
                });
            }
            if !c.rhs.is_finite() || c.coefficients.iter().any(|a| !a.is_finite()) {
                return Err(ProblemError::NonFinite(format!("constraint {}", i + 1)));
            }
        }

        Ok(Self {
            variable_count,
            objective,
            constraints,
        })
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value at `values`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// New problem with `deltas[i]` added to the right-hand side of constraint `i`.
    /// Constraints without a matching delta keep their right-hand side.
    pub fn with_rhs_deltas(&self, deltas: &[f64]) -> Result<Self, ProblemError> {
        let constraints = self
            .constraints
            .iter()
            .enumerate()
            .map(|(i, c)| c.with_rhs(c.rhs + deltas.get(i).copied().unwrap_or(0.0)))
            .collect();
        Self::new(self.variable_count, self.objective.clone(), constraints)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawProblem {
    variable_count: usize,
    objective: Vec<f64>,
    #[serde(default)]
    constraints: Vec<Constraint>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawProblem> for LpProblem {
    type Error = ProblemError;

    fn try_from(raw: RawProblem) -> Result<Self, Self::Error> {
        LpProblem::new(raw.variable_count, raw.objective, raw.constraints)
    }
}
