use log::debug;
use shadowlp_solver::{Constraint, ConstraintOp, LpProblem, ProblemError};
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

/// Highest variable index a problem may use. Coefficient rows are dense, so
/// the index sizes every allocation.
pub const MAX_VARIABLES: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Invalid variable X{0}: variables are numbered from X1")]
    InvalidVariable(usize),
    #[error("Constant term {0} on the left-hand side; move it to the right-hand side")]
    ConstantTerm(f64),
    #[error("Problem mentions no variables")]
    NoVariables,
    #[error("Variable X{found} exceeds the limit of {max} variables")]
    TooManyVariables { found: usize, max: usize },
    #[error("Invalid problem: {0}")]
    Problem(#[from] ProblemError),
}

/// Compiler for converting a parsed [`Program`] into an [`LpProblem`].
///
/// The variable count is the highest `Xk` mentioned anywhere, including the
/// non-negativity line, unless fixed with [`Compiler::with_variable_count`].
#[derive(Debug, Default, Clone)]
pub struct Compiler {
    variable_count: Option<usize>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable_count(mut self, n: usize) -> Self {
        self.variable_count = Some(n);
        self
    }

    /// Parse and compile in one step.
    pub fn compile_source(&self, source: &str) -> Result<LpProblem, CompileError> {
        let program = Parser::parse(source)?;
        self.compile(&program)
    }

    pub fn compile(&self, program: &Program) -> Result<LpProblem, CompileError> {
        let n = match self.variable_count {
            Some(n) => n,
            None => highest_variable(program)?,
        };
        if n == 0 {
            return Err(CompileError::NoVariables);
        }
        if n > MAX_VARIABLES {
            return Err(CompileError::TooManyVariables {
                found: n,
                max: MAX_VARIABLES,
            });
        }

        let objective = collect_terms(&program.objective.terms, n)?;

        let constraints = program
            .constraints
            .iter()
            .map(|stmt| {
                let coefficients = collect_terms(&stmt.terms, n)?;
                let op = match stmt.relation {
                    Relation::Le => ConstraintOp::Le,
                    Relation::Ge => ConstraintOp::Ge,
                };
                Ok(Constraint::new(coefficients, op, stmt.rhs))
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        debug!(
            "compiled problem with {} variables and {} constraints",
            n,
            constraints.len()
        );

        Ok(LpProblem::new(n, objective, constraints)?)
    }
}

fn highest_variable(program: &Program) -> Result<usize, CompileError> {
    let from_terms = std::iter::once(&program.objective.terms)
        .chain(program.constraints.iter().map(|c| &c.terms))
        .flatten()
        .filter_map(|t| t.variable.as_ref());
    let from_bounds = program
        .non_negativity
        .iter()
        .flat_map(|nn| nn.variables.iter());

    let mut highest = 0;
    for var in from_terms.chain(from_bounds) {
        if var.number == 0 {
            return Err(CompileError::InvalidVariable(0));
        }
        highest = highest.max(var.number);
    }
    Ok(highest)
}

/// Dense coefficient vector of length `n`; repeated variables are summed.
fn collect_terms(terms: &[Term], n: usize) -> Result<Vec<f64>, CompileError> {
    let mut coefficients = vec![0.0; n];

    for term in terms {
        match &term.variable {
            Some(var) => {
                if var.number == 0 || var.number > n {
                    return Err(CompileError::InvalidVariable(var.number));
                }
                coefficients[var.number - 1] += term.coefficient;
            }
            None if term.coefficient == 0.0 => {}
            None => return Err(CompileError::ConstantTerm(term.coefficient)),
        }
    }

    Ok(coefficients)
}
