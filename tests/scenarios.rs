//! End to end scenarios on small expressions

use bolex::*;

use test_log::test;

fn parse(text: &str) -> ParsedExpression {
    ParsedExpression::parse(text).unwrap()
}

#[test]
fn complement_law() -> Result<(), BolexError> {
    let result = simplify(&parse("A + A'"), &SimplifyOptions::default())?;
    assert_eq!(result.simplified().to_string(), "1");
    assert!(result.steps().iter().any(|s| s.law == Law::Complement));
    Ok(())
}

#[test]
fn absorption_law() -> Result<(), BolexError> {
    let options = SimplifyOptions::with_method(SimplifyMethod::Basic);
    let result = simplify(&parse("A + AB"), &options)?;
    assert_eq!(result.simplified().to_string(), "A");
    assert_eq!(result.steps().len(), 1);
    assert_eq!(result.steps()[0].law, Law::Absorption);
    assert_eq!(result.steps()[0].law.to_string(), "Absorption Law");
    Ok(())
}

#[test]
fn canonical_forms_and_quine_mccluskey() -> Result<(), BolexError> {
    let parsed = parse("AB + AB'");
    assert_eq!(parsed.variable_names(), "AB");

    let table = TruthTable::from_parsed(&parsed)?;
    assert_eq!(table.minterms(), [2, 3]);
    assert_eq!(table.canonical_sop().to_string(), "AB' + AB");

    let options = MinimizeOptions::with_algorithms(&["quine-mccluskey"]);
    let report = minimize(&parsed, &options)?;
    let qm = report.get(Algorithm::QuineMcCluskey).map(|r| r.expression().to_string());
    assert_eq!(qm.as_deref(), Some("A"));
    Ok(())
}

#[test]
fn karnaugh_diagonal() -> Result<(), BolexError> {
    let map = KarnaughMap::build(&parse("AB+A'B'"), &KarnaughOptions::default())?;
    assert_eq!(map.dimensions(), (2, 2));
    assert_eq!(map.groups().len(), 2);
    assert!(map.groups().iter().all(|g| g.size == 1));
    assert_eq!(map.simplified_sop().to_string(), "AB + A'B'");
    Ok(())
}

#[test]
fn satisfiable_product() -> Result<(), BolexError> {
    let parsed = parse("AB'");
    let result = solve(&parsed, &SatOptions::default().find_all())?;
    assert!(result.satisfiable());
    assert_eq!(result.solutions().len(), 1);

    let a = Variable::try_from('A')?;
    let b = Variable::try_from('B')?;
    let solution = &result.solutions()[0];
    assert_eq!(solution.get(&a), Some(&true));
    assert_eq!(solution.get(&b), Some(&false));
    Ok(())
}

#[test]
fn de_morgan_equivalence() -> Result<(), BolexError> {
    let result = equivalent(&parse("(AB)'"), &parse("A' + B'"))?;
    assert!(result.equivalent);
    assert_eq!(result.checked, 4);
    assert!(result.counterexamples.is_empty());
    Ok(())
}

#[test]
fn minimal_expressions_stay_minimal() -> Result<(), BolexError> {
    for text in ["A + B", "AB + A'C", "A'B'C + D"] {
        let parsed = parse(text);
        let report = minimize(&parsed, &MinimizeOptions::default())?;
        for result in report.results() {
            assert!(result.expression().text_len() <= parsed.ast().text_len());
        }
    }
    Ok(())
}

#[test]
fn syntax_errors_abort() {
    for text in ["", "A + + B", "(A + B", "A + B)", "()", "A +", "A $ B", "+A"] {
        match ParsedExpression::parse(text) {
            Err(BolexError::Syntax { expression, .. }) => assert_eq!(expression, text),
            other => panic!("'{}' should be rejected, got {:?}", text, other),
        }
    }

    let results = analyze_batch(&["A + + B", "A + B"], &EngineConfig::default());
    assert!(results[0].is_err());
    assert!(results[1].is_ok());
}

#[test]
fn capacity_errors() {
    let parsed = parse("ABCDEFGHIJK");
    assert!(matches!(
        TruthTable::from_parsed(&parsed),
        Err(BolexError::Capacity { limit: 10, .. })
    ));
    assert!(matches!(
        KarnaughMap::build(&parsed, &KarnaughOptions::default()),
        Err(BolexError::UnsupportedSize(11))
    ));
    assert!(matches!(
        minimize(&parsed, &MinimizeOptions::default()),
        Err(BolexError::Capacity { .. })
    ));
    assert!(matches!(
        solve(&parsed, &SatOptions::with_method(SatMethod::BruteForce)),
        Err(BolexError::Capacity { .. })
    ));
}

#[test]
fn serialized_records() -> Result<(), BolexError> {
    let parsed = parse("AB + AB'");
    let table = serde_json::to_value(TruthTable::from_parsed(&parsed)?).unwrap();
    assert_eq!(table["minterms"], serde_json::json!([2, 3]));
    assert_eq!(table["rows"][2]["assignment"]["A"], serde_json::json!(true));

    let map = KarnaughMap::build(&parsed, &KarnaughOptions::default())?;
    let map = serde_json::to_value(map).unwrap();
    assert_eq!(map["simplifiedSOP"], serde_json::json!("A"));

    let sat = serde_json::to_value(solve(&parsed, &SatOptions::default())?).unwrap();
    assert_eq!(sat["metadata"]["method"], serde_json::json!("dpll"));

    let circuit = Circuit::build(&parsed, &CircuitOptions::default())?;
    let circuit = serde_json::to_value(circuit).unwrap();
    assert_eq!(circuit["gates"][0]["kind"], serde_json::json!("INPUT"));
    assert_eq!(circuit["connections"][0]["toGate"], serde_json::json!(2));
    Ok(())
}
