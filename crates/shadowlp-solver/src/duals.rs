use crate::standard_form::Tableau;

/// One shadow price per constraint, index-aligned with the problem's constraints.
///
/// Values within the solver tolerance of zero are stored as exactly `0.0`, so
/// two vectors from the same optimal basis compare equal.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShadowPrices(Vec<f64>);

impl ShadowPrices {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<f64>> for ShadowPrices {
    fn from(prices: Vec<f64>) -> Self {
        Self(prices)
    }
}

/// Read the dual values off a final Phase 2 tableau.
///
/// The objective row entry under a slack column is the marginal value of its
/// constraint's rhs; under a surplus column it is the negation. A basic
/// slack/surplus means the constraint is non-binding, which forces a price of
/// exactly zero.
pub fn extract_shadow_prices(tableau: &Tableau, tolerance: f64) -> ShadowPrices {
    let obj = tableau.objective_row();

    let prices = (0..tableau.rows())
        .map(|row| {
            let col = tableau.layout().aux_column(row);
            if tableau.is_basic(col) {
                0.0
            } else {
                snap_to_zero(tableau.aux_sign(row) * obj[col], tolerance)
            }
        })
        .collect();

    ShadowPrices(prices)
}

/// `0.0` for anything within `tolerance` of zero (including `-0.0`).
pub(crate) fn snap_to_zero(value: f64, tolerance: f64) -> f64 {
    if value.abs() < tolerance {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Constraint, LpProblem};

    #[test]
    fn test_snap_to_zero() {
        assert_eq!(snap_to_zero(1e-12, 1e-9), 0.0);
        assert!(snap_to_zero(-0.0, 1e-9).is_sign_positive());
        assert_eq!(snap_to_zero(-2.5, 1e-9), -2.5);
    }

    #[test]
    fn test_prices_from_hand_pivoted_tableau() {
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

        let prices = extract_shadow_prices(&tableau, 1e-9);
        assert_eq!(prices.len(), 3);
        assert_eq!(prices.get(0), Some(0.0));
        assert!((prices.as_slice()[1] - 1.5).abs() < 1e-12);
        assert!((prices.as_slice()[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_surplus_price_is_sign_adjusted() {
        // Maximize -x subject to x >= 2: each unit of rhs costs one unit of objective
        let problem = LpProblem::new(1, vec![-1.0], vec![Constraint::ge(vec![1.0], 2.0)]).unwrap();
        let mut tableau = Tableau::from_problem(&problem);
        tableau.pivot(0, 0);
        tableau.load_objective(problem.objective());

        let prices = extract_shadow_prices(&tableau, 1e-9);
        assert_eq!(prices.as_slice(), &[-1.0]);
    }
}
