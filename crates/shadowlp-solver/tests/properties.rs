use shadowlp_solver::*;

const EPS: f64 = 1e-6;

fn textbook() -> LpProblem {
    // Max Z = 3 X1 + 5 X2
    LpProblem::new(
        2,
        vec![3.0, 5.0],
        vec![
            Constraint::le(vec![1.0, 0.0], 4.0),
            Constraint::le(vec![0.0, 2.0], 12.0),
            Constraint::le(vec![3.0, 2.0], 18.0),
        ],
    )
    .unwrap()
}

fn assert_optimal<'a>(result: &'a SolveResult, expected_obj: f64, expected_x: &[f64]) -> &'a Solution {
    match result {
        SolveResult::Optimal(sol) => {
            assert!(
                (sol.objective_value - expected_obj).abs() < EPS,
                "obj: {}, expected: {}",
                sol.objective_value,
                expected_obj
            );
            assert_eq!(sol.values.len(), expected_x.len());
            for (x1, x2) in sol.values.iter().zip(expected_x) {
                assert!((x1 - x2).abs() < EPS, "x_i: {}, expected: {}", x1, x2);
            }
            sol
        }
        _ => panic!("not optimal: {:?}", result),
    }
}

#[test]
fn textbook_solution_and_shadow_prices() {
    let result = Solver::new().solve(&textbook());
    let sol = assert_optimal(&result, 36.0, &[2.0, 6.0]);

    let expected = [0.0, 1.5, 1.0];
    for (p, e) in sol.shadow_prices.iter().zip(expected) {
        assert!((p - e).abs() < EPS, "price: {}, expected: {}", p, e);
    }
}

#[test]
fn free_function_entry_point() {
    let result = solve(
        2,
        vec![3.0, 5.0],
        vec![
            Constraint::le(vec![1.0, 0.0], 4.0),
            Constraint::le(vec![0.0, 2.0], 12.0),
            Constraint::le(vec![3.0, 2.0], 18.0),
        ],
    );
    assert_optimal(&result, 36.0, &[2.0, 6.0]);
}

#[test]
fn solving_twice_is_bit_identical() {
    let solver = Solver::new();
    let first = solver.solve(&textbook());
    let second = solver.solve(&textbook());

    let (a, b) = (first.optimal().unwrap(), second.optimal().unwrap());
    assert_eq!(a.objective_value.to_bits(), b.objective_value.to_bits());
    for (x, y) in a.values.iter().zip(&b.values) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
    for (x, y) in a.shadow_prices.iter().zip(b.shadow_prices.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
    assert_eq!(first, second);
}

#[test]
fn non_binding_constraints_have_zero_price() {
    let problems = vec![
        textbook(),
        LpProblem::new(
            3,
            vec![2.0, 3.0, 1.0],
            vec![
                Constraint::le(vec![1.0, 1.0, 1.0], 10.0),
                Constraint::le(vec![0.0, 1.0, 0.0], 4.0),
                Constraint::le(vec![1.0, 0.0, 0.0], 100.0),
                Constraint::ge(vec![0.0, 0.0, 1.0], 1.0),
            ],
        )
        .unwrap(),
    ];

    for problem in problems {
        let result = Solver::new().solve(&problem);
        let sol = result.optimal().unwrap();
        for (i, c) in problem.constraints().iter().enumerate() {
            if c.op == ConstraintOp::Le && c.slack(&sol.values) > EPS {
                assert_eq!(sol.shadow_prices.get(i), Some(0.0), "constraint {}", i + 1);
                assert!(!sol.analysis.binding[i]);
            }
        }
    }
}

#[test]
fn perturbing_non_binding_constraint_keeps_basis() {
    let solver = Solver::new();
    let baseline = solver.solve(&textbook()).into_optimal().unwrap();

    // X1 <= 4 has slack 2 at the optimum
    let deltas = [0.5, 0.0, 0.0];
    let perturbed = textbook().with_rhs_deltas(&deltas).unwrap();
    assert!(check_feasibility(perturbed.constraints()).feasible);

    let after = solver.solve(&perturbed).into_optimal().unwrap();
    let verdict = compare_shadow_prices(Some(&baseline.shadow_prices), &after.shadow_prices, &deltas);

    assert_eq!(
        verdict,
        SensitivityVerdict::BasisUnchanged {
            limits: vec![LimitChange::Increase(0.5), LimitChange::Keep, LimitChange::Keep]
        }
    );
    assert!((after.objective_value - baseline.objective_value).abs() < EPS);
}

#[test]
fn non_binding_perturbation_with_different_pivot_path() {
    // The perturbed X1 bound flips the first ratio test from row 1 to row 2,
    // yet both solves end on the basis {X1, X2, slack 1}
    let problem = LpProblem::new(
        2,
        vec![1.3, 1.1],
        vec![
            Constraint::le(vec![1.0, 0.0], 1.1611),
            Constraint::le(vec![2.7, 1.0], 3.3),
            Constraint::le(vec![0.0, 1.0], 0.9),
        ],
    )
    .unwrap();
    let solver = Solver::new();
    let baseline = solver.solve(&problem).into_optimal().unwrap();
    assert_eq!(baseline.analysis.binding, vec![false, true, true]);

    let deltas = [0.1222];
    let perturbed = problem.with_rhs_deltas(&deltas).unwrap();
    let after = solver.solve(&perturbed).into_optimal().unwrap();
    assert_eq!(after.analysis.binding, vec![false, true, true]);

    assert_eq!(baseline.shadow_prices, after.shadow_prices);
    assert_eq!(
        compare_shadow_prices(Some(&baseline.shadow_prices), &after.shadow_prices, &deltas),
        SensitivityVerdict::BasisUnchanged {
            limits: vec![LimitChange::Increase(0.1222), LimitChange::Keep, LimitChange::Keep]
        }
    );
    assert!((after.shadow_prices.as_slice()[1] - 1.3 / 2.7).abs() < EPS);
}

#[test]
fn perturbing_binding_constraint_changes_basis() {
    let solver = Solver::new();
    let baseline = solver.solve(&textbook()).into_optimal().unwrap();

    // 3 X1 + 2 X2 <= 48 leaves X1 <= 4 and 2 X2 <= 12 binding instead
    let deltas = [0.0, 0.0, 30.0];
    let perturbed = textbook().with_rhs_deltas(&deltas).unwrap();
    let result = solver.solve(&perturbed);
    let after = assert_optimal(&result, 42.0, &[4.0, 6.0]);

    let verdict = compare_shadow_prices(Some(&baseline.shadow_prices), &after.shadow_prices, &deltas);
    assert!(matches!(verdict, SensitivityVerdict::BasisChanged { .. }));
    assert!((after.objective_value - baseline.objective_value).abs() > EPS);
}

#[test]
fn rhs_range_agrees_with_verdict() {
    let solver = Solver::new();
    let baseline = solver.solve(&textbook()).into_optimal().unwrap();
    let range = &baseline.analysis.rhs_ranges[2];

    for delta in [-5.0, 5.0, 30.0] {
        let perturbed = textbook().with_rhs_deltas(&[0.0, 0.0, delta]).unwrap();
        let after = solver.solve(&perturbed).into_optimal().unwrap();
        let unchanged = matches!(
            compare_shadow_prices(Some(&baseline.shadow_prices), &after.shadow_prices, &[0.0, 0.0, delta]),
            SensitivityVerdict::BasisUnchanged { .. }
        );
        assert_eq!(unchanged, range.contains(18.0 + delta), "delta {}", delta);
    }
}

#[test]
fn heuristic_flags_satisfiable_constraint() {
    // x = 0 satisfies X1 + X2 <= 1, but 1 + 1 > 1 so the pre-check flags it
    let report = check_feasibility(&[Constraint::le(vec![1.0, 1.0], 1.0)]);
    assert_eq!(
        report,
        FeasibilityReport {
            feasible: false,
            violating: vec![1]
        }
    );

    let result = solve(2, vec![1.0, 1.0], vec![Constraint::le(vec![1.0, 1.0], 1.0)]);
    assert!(result.is_optimal());
}

#[test]
fn invalid_input_is_reported_before_solving() {
    assert_eq!(
        solve(0, vec![], vec![]),
        SolveResult::InvalidInput(ProblemError::NoVariables)
    );
    assert_eq!(
        solve(2, vec![1.0, 2.0], vec![Constraint::le(vec![1.0, 2.0, 3.0], 1.0)]).status(),
        SolutionStatus::InvalidInput
    );
    assert_eq!(
        solve(2, vec![1.0], vec![]).status(),
        SolutionStatus::InvalidInput
    );
}

#[test]
fn unbounded_direction_of_improvement() {
    assert_eq!(solve(1, vec![1.0], vec![]), SolveResult::Unbounded);
    assert_eq!(
        solve(1, vec![1.0], vec![Constraint::ge(vec![1.0], 0.0)]),
        SolveResult::Unbounded
    );
    assert_eq!(
        solve(
            2,
            vec![1.0, 1.0],
            vec![Constraint::le(vec![1.0, -1.0], 2.0)]
        ),
        SolveResult::Unbounded
    );
}

#[test]
fn infeasible_ge_and_le() {
    let result = solve(
        2,
        vec![1.0, 1.0],
        vec![
            Constraint::ge(vec![1.0, 1.0], 10.0),
            Constraint::le(vec![1.0, 0.0], 3.0),
            Constraint::le(vec![0.0, 1.0], 3.0),
        ],
    );
    assert_eq!(result, SolveResult::Infeasible);
}

#[test]
fn engine_is_not_limited_to_four_variables() {
    // Max sum of x_i with x_i <= i for twelve variables
    let n = 12;
    let constraints = (0..n)
        .map(|i| {
            let mut row = vec![0.0; n];
            row[i] = 1.0;
            Constraint::le(row, (i + 1) as f64)
        })
        .collect();
    let result = solve(n, vec![1.0; n], constraints);
    let expected: Vec<f64> = (1..=n).map(|i| i as f64).collect();
    let sol = assert_optimal(&result, 78.0, &expected);
    assert!(sol.shadow_prices.iter().all(|p| (p - 1.0).abs() < EPS));
}

#[cfg(feature = "serde")]
#[test]
fn json_problem_is_validated() {
    let json = r#"{
        "variable_count": 2,
        "objective": [3, 5],
        "constraints": [
            {"coefficients": [1, 0], "op": "le", "rhs": 4},
            {"coefficients": [0, 2], "op": "<=", "rhs": 12},
            {"coefficients": [3, 2], "op": "le", "rhs": 18}
        ]
    }"#;
    let problem: LpProblem = serde_json::from_str(json).unwrap();
    assert_eq!(problem, textbook());

    let bad = r#"{"variable_count": 3, "objective": [3, 5]}"#;
    assert!(serde_json::from_str::<LpProblem>(bad).is_err());
}
