use log::trace;

use crate::problem::{ConstraintOp, LpProblem};

/// Column bookkeeping for a [`Tableau`].
///
/// Columns are laid out as `[structural | one slack/surplus per constraint |
/// artificials | rhs]`, so the slack or surplus of constraint `i` always lives
/// at `structural + i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Number of decision variables
    pub structural: usize,
    /// Number of constraint rows
    pub constraints: usize,
    /// Constraint row seeded by each artificial column, in column order
    pub artificial_rows: Vec<usize>,
}

impl ColumnLayout {
    /// Slack (`<=`) or surplus (`>=`) column of constraint `row`.
    pub fn aux_column(&self, row: usize) -> usize {
        self.structural + row
    }

    pub fn artificial_start(&self) -> usize {
        self.structural + self.constraints
    }

    pub fn artificial_count(&self) -> usize {
        self.artificial_rows.len()
    }

    pub fn has_artificial(&self) -> bool {
        !self.artificial_rows.is_empty()
    }

    pub fn is_artificial(&self, col: usize) -> bool {
        col >= self.artificial_start() && col < self.rhs_column()
    }

    pub fn rhs_column(&self) -> usize {
        self.artificial_start() + self.artificial_count()
    }

    /// Total column count including the rhs column.
    pub fn width(&self) -> usize {
        self.rhs_column() + 1
    }
}

/// Dense simplex tableau in canonical form.
///
/// Rows `0..m` are constraints, row `m` is the active objective row holding
/// reduced costs (`z_j - c_j`) with the current objective value in the rhs
/// cell. `basis[i]` is the column basic in row `i`; that column is 1 in row
/// `i` and 0 in every other row.
#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basis: Vec<usize>,
    layout: ColumnLayout,
    aux_signs: Vec<f64>,
}

impl From<&LpProblem> for Tableau {
    fn from(problem: &LpProblem) -> Self {
        Tableau::from_problem(problem)
    }
}

impl Tableau {
    /// Standard-form conversion.
    ///
    /// Rows with a negative rhs are multiplied by -1 first. A `<=` row then
    /// gets its slack as the initial basic variable; a `>=` row (or a `<=`
    /// row that was flipped) gets a surplus plus an artificial that seeds the
    /// basis. The slack/surplus column keeps its meaning with respect to the
    /// original constraint, so the flip only changes its sign in the row.
    pub fn from_problem(problem: &LpProblem) -> Self {
        let n_vars = problem.variable_count();
        let n_constraints = problem.num_constraints();

        let mut row_signs = Vec::with_capacity(n_constraints);
        let mut aux_signs = Vec::with_capacity(n_constraints);
        let mut artificial_rows = Vec::new();

        for (i, c) in problem.constraints().iter().enumerate() {
            let row_sign = if c.rhs < 0.0 { -1.0 } else { 1.0 };
            let aux_sign = match c.op {
                ConstraintOp::Le => 1.0,
                ConstraintOp::Ge => -1.0,
            };
            // Only a +1 identity column can seed the basis
            if row_sign * aux_sign < 0.0 {
                artificial_rows.push(i);
            }
            row_signs.push(row_sign);
            aux_signs.push(aux_sign);
        }

        let layout = ColumnLayout {
            structural: n_vars,
            constraints: n_constraints,
            artificial_rows,
        };
        let rhs_col = layout.rhs_column();

        let mut data = vec![vec![0.0; layout.width()]; n_constraints + 1];
        let mut basis = vec![0; n_constraints];

        for (i, c) in problem.constraints().iter().enumerate() {
            let sign = row_signs[i];
            for (j, &coef) in c.coefficients.iter().enumerate() {
                data[i][j] = sign * coef;
            }
            data[i][rhs_col] = sign * c.rhs;

            let aux = layout.aux_column(i);
            data[i][aux] = sign * aux_signs[i];
            basis[i] = aux;
        }

        for (k, &row) in layout.artificial_rows.iter().enumerate() {
            let col = layout.artificial_start() + k;
            data[row][col] = 1.0;
            basis[row] = col;
        }

        trace!(
            "standard form: {} rows, {} columns, {} artificial",
            n_constraints,
            layout.width(),
            layout.artificial_count()
        );

        Self {
            data,
            basis,
            layout,
            aux_signs,
        }
    }

    /// Fresh tableau for `problem` with `basic` pivoted in under the real objective.
    ///
    /// Columns go in ascending order, each on the unassigned row with the
    /// largest entry (lowest row on ties). The result depends only on the set
    /// of basic columns and the constraint matrix, never on the pivot path
    /// that found them. `None` if the columns are numerically singular.
    pub fn with_basis(problem: &LpProblem, basic: &[usize], tolerance: f64) -> Option<Self> {
        let mut tableau = Tableau::from_problem(problem);
        tableau.load_objective(problem.objective());

        let mut columns = basic.to_vec();
        columns.sort_unstable();
        columns.dedup();
        if columns.len() != tableau.rows() {
            return None;
        }

        let mut assigned = vec![false; tableau.rows()];
        for col in columns {
            let mut best: Option<(usize, f64)> = None;
            for (row, _) in assigned.iter().enumerate().filter(|(_, done)| !**done) {
                let magnitude = tableau.value(row, col).abs();
                if magnitude > tolerance && best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((row, magnitude));
                }
            }
            let (row, _) = best?;
            assigned[row] = true;
            tableau.pivot(row, col);
        }

        trace!("refactored tableau on basis {:?}", tableau.basis);
        Some(tableau)
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn is_basic(&self, col: usize) -> bool {
        self.basis.contains(&col)
    }

    /// Number of constraint rows.
    pub fn rows(&self) -> usize {
        self.layout.constraints
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self.data[row][self.layout.rhs_column()]
    }

    pub fn objective_row(&self) -> &[f64] {
        &self.data[self.layout.constraints]
    }

    /// Value of the active objective.
    pub fn objective_value(&self) -> f64 {
        self.rhs(self.layout.constraints)
    }

    /// +1 if constraint `row` owns a slack, -1 if it owns a surplus.
    pub fn aux_sign(&self, row: usize) -> f64 {
        self.aux_signs[row]
    }

    /// Install the Phase 1 objective: maximize the negated sum of artificials.
    pub(crate) fn load_phase_one_objective(&mut self) {
        let start = self.layout.artificial_start();
        let end = self.layout.rhs_column();
        let obj = &mut self.data[self.layout.constraints];
        obj.fill(0.0);
        for v in &mut obj[start..end] {
            *v = 1.0;
        }
        self.canonicalize_objective();
    }

    /// Install the true objective `max costs · x` over the structural columns.
    pub(crate) fn load_objective(&mut self, costs: &[f64]) {
        let obj = &mut self.data[self.layout.constraints];
        obj.fill(0.0);
        for (v, &c) in obj.iter_mut().zip(costs) {
            *v = -c;
        }
        self.canonicalize_objective();
    }

    /// Eliminate basic columns from the objective row.
    fn canonicalize_objective(&mut self) {
        let (rows, obj) = self.data.split_at_mut(self.layout.constraints);
        let obj = &mut obj[0];
        for (row, &basic) in rows.iter().zip(&self.basis) {
            let factor = obj[basic];
            if factor == 0.0 {
                continue;
            }
            for (v, r) in obj.iter_mut().zip(row) {
                *v -= factor * r;
            }
            obj[basic] = 0.0;
        }
    }

    /// Gauss-Jordan pivot on `(row, col)`; `col` becomes basic in `row`.
    pub(crate) fn pivot(&mut self, row: usize, col: usize) {
        let mut pivot_row = std::mem::take(&mut self.data[row]);
        let pivot_val = pivot_row[col];
        for v in pivot_row.iter_mut() {
            *v /= pivot_val;
        }
        pivot_row[col] = 1.0;

        for (i, other) in self.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = other[col];
            if factor == 0.0 {
                continue;
            }
            for (v, p) in other.iter_mut().zip(&pivot_row) {
                *v -= factor * p;
            }
            other[col] = 0.0;
        }

        self.data[row] = pivot_row;
        self.basis[row] = col;
    }
}
