use std::fmt;

use crate::problem::{Constraint, ConstraintOp, LpProblem};

/// Display name of the zero-based variable `index`: `X1`, `X2`, ...
pub fn variable_name(index: usize) -> String {
    format!("X{}", index + 1)
}

/// Render `a1 X1 + a2 X2 ...`. Unit coefficients print as the bare variable,
/// negative ones as subtraction. Zero terms are dropped unless `keep_zero`;
/// an expression with no terms renders as `0`.
pub fn format_terms(coefficients: &[f64], keep_zero: bool) -> String {
    let mut out = String::new();

    for (j, &coef) in coefficients.iter().enumerate() {
        if coef == 0.0 && !keep_zero {
            continue;
        }

        let negative = coef < 0.0;
        if out.is_empty() {
            if negative {
                out.push('-');
            }
        } else {
            out.push_str(if negative { " - " } else { " + " });
        }

        let magnitude = coef.abs();
        if magnitude != 1.0 {
            out.push_str(&format!("{} ", magnitude));
        }
        out.push_str(&variable_name(j));
    }

    if out.is_empty() {
        out.push('0');
    }
    out
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintOp::Le => write!(f, "<="),
            ConstraintOp::Ge => write!(f, ">="),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", format_terms(&self.coefficients, false), self.op, self.rhs)
    }
}

impl fmt::Display for LpProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Max Z = {}", format_terms(self.objective(), true))?;

        for constraint in self.constraints() {
            writeln!(f, "{}", constraint)?;
        }

        let names: Vec<String> = (0..self.variable_count()).map(variable_name).collect();
        write!(f, "{} >= 0", names.join(", "))
    }
}
