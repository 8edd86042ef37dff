use std::fmt;

use crate::duals::ShadowPrices;
use crate::problem::LpProblem;
use crate::standard_form::Tableau;

/// Outcome of comparing shadow prices before and after a rhs perturbation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SensitivityVerdict {
    /// Same optimal basis; one entry per constraint describing its applied delta
    BasisUnchanged { limits: Vec<LimitChange> },
    /// The basis moved; cached shadow prices no longer apply. Holds the
    /// 1-based indices of the constraints whose price changed.
    BasisChanged { differing: Vec<usize> },
    /// Nothing cached to compare against
    NoBaseline,
}

/// How one constraint's limit moved under a perturbation that kept the basis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LimitChange {
    Increase(f64),
    Decrease(f64),
    Keep,
}

impl LimitChange {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            LimitChange::Increase(delta)
        } else if delta < 0.0 {
            LimitChange::Decrease(-delta)
        } else {
            LimitChange::Keep
        }
    }

    pub fn amount(&self) -> f64 {
        match *self {
            LimitChange::Increase(d) | LimitChange::Decrease(d) => d,
            LimitChange::Keep => 0.0,
        }
    }
}

impl fmt::Display for LimitChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            LimitChange::Increase(_) => "increase",
            LimitChange::Decrease(_) => "decrease",
            LimitChange::Keep => "keep",
        };
        write!(
            f,
            "could {} the limit by {} without changing shadow prices",
            verb,
            self.amount()
        )
    }
}

/// Decide whether a perturbed problem kept the cached optimal basis.
///
/// Shadow prices depend only on the basis, so the comparison is exact. The
/// solver reads them off [`Tableau::with_basis`], which repeats the same pivot
/// arithmetic for the same basis whatever path the simplex took.
/// A missing or empty `before` means no baseline. `deltas` shorter than the
/// constraint list count as zero for the remaining constraints.
pub fn compare_shadow_prices(
    before: Option<&ShadowPrices>,
    after: &ShadowPrices,
    deltas: &[f64],
) -> SensitivityVerdict {
    let Some(before) = before.filter(|b| !b.is_empty()) else {
        return SensitivityVerdict::NoBaseline;
    };

    if before.len() != after.len() {
        let longest = before.len().max(after.len());
        return SensitivityVerdict::BasisChanged {
            differing: (1..=longest).collect(),
        };
    }

    let differing: Vec<usize> = before
        .iter()
        .zip(after.iter())
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(i, _)| i + 1)
        .collect();

    if !differing.is_empty() {
        return SensitivityVerdict::BasisChanged { differing };
    }

    let limits = (0..after.len())
        .map(|i| LimitChange::from_delta(deltas.get(i).copied().unwrap_or(0.0)))
        .collect();

    SensitivityVerdict::BasisUnchanged { limits }
}

/// Right-hand-side interval over which the current basis stays optimal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RhsRange {
    /// 1-based constraint index
    pub constraint: usize,
    /// Current value
    pub current: f64,
    /// Lower bound of range where solution structure stays same
    pub lower_bound: f64,
    /// Upper bound of range where solution structure stays same
    pub upper_bound: f64,
}

impl RhsRange {
    pub fn contains(&self, rhs: f64) -> bool {
        rhs >= self.lower_bound && rhs <= self.upper_bound
    }
}

/// Ranging from an optimal tableau.
///
/// Moving `b_i` by `t` moves the basic values along `sign_i * column(aux_i)`;
/// the basis survives while every basic value stays non-negative.
pub fn rhs_ranges(tableau: &Tableau, problem: &LpProblem, tolerance: f64) -> Vec<RhsRange> {
    problem
        .constraints()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let col = tableau.layout().aux_column(i);
            let sign = tableau.aux_sign(i);

            let mut allowable_increase = f64::INFINITY;
            let mut allowable_decrease = f64::INFINITY;

            for row in 0..tableau.rows() {
                let direction = sign * tableau.value(row, col);
                let level = tableau.rhs(row).max(0.0);
                if direction > tolerance {
                    allowable_decrease = allowable_decrease.min(level / direction);
                } else if direction < -tolerance {
                    allowable_increase = allowable_increase.min(level / -direction);
                }
            }

            RhsRange {
                constraint: i + 1,
                current: c.rhs,
                lower_bound: c.rhs - allowable_decrease,
                upper_bound: c.rhs + allowable_increase,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Constraint;

    fn prices(values: &[f64]) -> ShadowPrices {
        ShadowPrices::from(values.to_vec())
    }

    #[test]
    fn test_no_baseline() {
        let after = prices(&[0.0, 1.5, 1.0]);
        assert_eq!(
            compare_shadow_prices(None, &after, &[]),
            SensitivityVerdict::NoBaseline
        );
        assert_eq!(
            compare_shadow_prices(Some(&prices(&[])), &after, &[]),
            SensitivityVerdict::NoBaseline
        );
    }

    #[test]
    fn test_unchanged_reports_direction_per_constraint() {
        let before = prices(&[0.0, 1.5, 1.0]);
        let after = prices(&[0.0, 1.5, 1.0]);

        let verdict = compare_shadow_prices(Some(&before), &after, &[2.0, -0.5]);
        assert_eq!(
            verdict,
            SensitivityVerdict::BasisUnchanged {
                limits: vec![
                    LimitChange::Increase(2.0),
                    LimitChange::Decrease(0.5),
                    LimitChange::Keep,
                ]
            }
        );
    }

    #[test]
    fn test_changed_lists_differing_constraints() {
        let before = prices(&[0.0, 1.5, 1.0]);
        let after = prices(&[3.0, 2.5, 0.0]);

        let verdict = compare_shadow_prices(Some(&before), &after, &[0.0, 0.0, 30.0]);
        assert_eq!(verdict, SensitivityVerdict::BasisChanged { differing: vec![1, 2, 3] });
    }

    #[test]
    fn test_length_mismatch_is_a_change() {
        let verdict = compare_shadow_prices(Some(&prices(&[1.0])), &prices(&[1.0, 0.0]), &[]);
        assert!(matches!(verdict, SensitivityVerdict::BasisChanged { .. }));
    }

    #[test]
    fn test_limit_change_display() {
        assert_eq!(
            LimitChange::from_delta(-3.0).to_string(),
            "could decrease the limit by 3 without changing shadow prices"
        );
        assert_eq!(LimitChange::from_delta(0.0).amount(), 0.0);
    }

    #[test]
    fn test_textbook_rhs_ranges() {
        let problem = LpProblem::new(
            2,
            vec![3.0, 5.0],
            vec![
                Constraint::le(vec![1.0, 0.0], 4.0),
                Constraint::le(vec![0.0, 2.0], 12.0),
                Constraint::le(vec![3.0, 2.0], 18.0),
            ],
        )
        .unwrap();

        let mut tableau = Tableau::from_problem(&problem);
        tableau.load_objective(problem.objective());
        tableau.pivot(1, 1);
        tableau.pivot(2, 0);

        let ranges = rhs_ranges(&tableau, &problem, 1e-9);

        assert!((ranges[0].lower_bound - 2.0).abs() < 1e-9);
        assert_eq!(ranges[0].upper_bound, f64::INFINITY);
        assert!((ranges[1].lower_bound - 6.0).abs() < 1e-9);
        assert!((ranges[1].upper_bound - 18.0).abs() < 1e-9);
        assert!((ranges[2].lower_bound - 12.0).abs() < 1e-9);
        assert!((ranges[2].upper_bound - 24.0).abs() < 1e-9);
        assert!(ranges[2].contains(18.0));
        assert!(!ranges[2].contains(48.0));
    }
}
