//! Property-based tests on random expressions over at most 4 variables.
//!
//! Every derived form is compared with the original expression on its full truth table.

use bolex::*;
use proptest::prelude::*;

fn variables() -> Vec<Variable> {
    "ABCD".chars().filter_map(Variable::from_letter).collect()
}

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        4 => prop::sample::select(variables()).prop_map(Expr::Variable),
        1 => any::<bool>().prop_map(Expr::Constant),
    ]
}

fn expression() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::negate(e)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expr::and(l, r)),
            (inner.clone(), inner).prop_map(|(l, r)| Expr::or(l, r)),
        ]
    })
}

fn outputs(function: &impl LogicFunction, variables: &[Variable]) -> Vec<bool> {
    TruthTable::build(function, variables).unwrap().outputs()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_table_partitions_rows(expr in expression()) {
        let parsed = ParsedExpression::from_expr(expr);
        let table = TruthTable::from_parsed(&parsed).unwrap();
        let size = 1usize << parsed.variable_count();
        prop_assert_eq!(table.len(), size);

        let mut indices: Vec<usize> = table.minterms().iter().chain(table.maxterms()).copied().collect();
        indices.sort_unstable();
        prop_assert_eq!(indices, (0..size).collect::<Vec<_>>());
        for row in table.rows() {
            prop_assert_eq!(row.output, table.minterms().contains(&row.index));
        }
    }

    #[test]
    fn prop_canonical_text_reparses(expr in expression()) {
        let vars = variables();
        let parsed = ParsedExpression::parse(&expr.to_string()).unwrap();
        prop_assert_eq!(outputs(parsed.ast(), &vars), outputs(&expr, &vars));
    }

    #[test]
    fn prop_minimization_preserves_the_function(expr in expression()) {
        let vars = variables();
        let expected = outputs(&expr, &vars);
        let parsed = ParsedExpression::from_expr(expr);
        let report = minimize(&parsed, &MinimizeOptions::default()).unwrap();
        prop_assert!(report.failures().is_empty());
        prop_assert_eq!(report.results().len(), 3);
        for result in report.results() {
            prop_assert_eq!(outputs(result.expression(), &vars), expected.clone(), "{}", result.algorithm());
        }
    }

    #[test]
    fn prop_simplification_preserves_the_function(expr in expression()) {
        let vars = variables();
        let expected = outputs(&expr, &vars);
        let parsed = ParsedExpression::from_expr(expr);
        for method in [SimplifyMethod::Auto, SimplifyMethod::Basic, SimplifyMethod::DeMorgan] {
            let result = simplify(&parsed, &SimplifyOptions::with_method(method)).unwrap();
            prop_assert_eq!(outputs(result.simplified(), &vars), expected.clone());
            if method == SimplifyMethod::Auto {
                prop_assert!(result.simplified().text_len() <= parsed.ast().text_len());
            }
        }
    }

    #[test]
    fn prop_karnaugh_groups_are_sound(expr in expression()) {
        let vars = variables();
        let map = KarnaughMap::build_with(&expr, &vars, &KarnaughOptions::default()).unwrap();
        let (rows, cols) = map.dimensions();
        for group in map.groups() {
            prop_assert!(group.size.is_power_of_two());
            prop_assert_eq!(group.size, group.cells.len());
            for r in 0..rows {
                for c in 0..cols {
                    let cell = map.cell(r, c);
                    let state = State::from_assignment(&cell.inputs);
                    let claimed = group.cells.contains(&(r, c));
                    prop_assert_eq!(group.literal.eval(&state), claimed);
                    if claimed {
                        prop_assert!(cell.value);
                    }
                }
            }
        }

        let expected = outputs(&expr, &vars);
        prop_assert_eq!(outputs(map.simplified_sop(), &vars), expected.clone());
        if let Some(pos) = map.simplified_pos() {
            prop_assert_eq!(outputs(pos, &vars), expected);
        }
    }

    #[test]
    fn prop_dpll_agrees_with_brute_force(expr in expression()) {
        let parsed = ParsedExpression::from_expr(expr);
        let dpll = solve(&parsed, &SatOptions::with_method(SatMethod::Dpll).find_all()).unwrap();
        let brute = solve(&parsed, &SatOptions::with_method(SatMethod::BruteForce).find_all()).unwrap();
        prop_assert_eq!(dpll.satisfiable(), brute.satisfiable());
        // DPLL tries true first, brute force enumerates rows in increasing order
        let mut reversed = dpll.solutions().to_vec();
        reversed.reverse();
        prop_assert_eq!(reversed.as_slice(), brute.solutions());

        let table = TruthTable::from_parsed(&parsed).unwrap();
        prop_assert_eq!(dpll.solutions().len(), table.minterms().len());
        for solution in dpll.solutions() {
            prop_assert!(parsed.eval(&State::from_assignment(solution)));
        }
    }

    #[test]
    fn prop_conversions_preserve_the_function(expr in expression()) {
        let vars = variables();
        let expected = outputs(&expr, &vars);
        let parsed = ParsedExpression::from_expr(expr);
        for form in [TargetForm::Sop, TargetForm::Pos] {
            let result = convert(&parsed, form).unwrap();
            prop_assert_eq!(outputs(result.canonical(), &vars), expected.clone());
            prop_assert_eq!(outputs(result.minimized(), &vars), expected.clone());
        }
    }

    #[test]
    fn prop_circuits_simulate_the_expression(expr in expression()) {
        let vars = variables();
        let parsed = ParsedExpression::from_expr(expr.clone());
        let circuit = Circuit::build(&parsed, &CircuitOptions::default()).unwrap();
        prop_assert_eq!(outputs(&circuit, &vars), outputs(&expr, &vars));
        for gate in circuit.gates() {
            prop_assert!(gate.inputs.iter().all(|i| *i < gate.id));
        }
    }
}
