//! Full analysis pipeline for single expressions and batches.
//!
//! A syntax error aborts the analysis of an expression. The failure of any later stage is
//! recorded in the analysis and does not prevent the other stages from running.
//! Batches are processed in parallel, each expression independently.
//!
//! ```
//! use bolex::{analyze_batch, EngineConfig};
//!
//! let results = analyze_batch(&["A + AB", "A + (B", "AB'"], &EngineConfig::default());
//! assert_eq!(results.len(), 3);
//! assert!(results[1].is_err());
//!
//! let analysis = results[0].as_ref().unwrap();
//! let simplified = analysis.simplification.as_ref().map(|s| s.simplified().to_string());
//! assert_eq!(simplified.as_deref(), Some("A"));
//! ```

use crate::circuit::{Circuit, CircuitOptions};
use crate::convert::{convert, ConversionResult, TargetForm};
use crate::karnaugh::{KarnaughMap, KarnaughOptions};
use crate::minimize::{minimize, MinimizationReport, MinimizeOptions};
use crate::sat::{solve, SatOptions, SatResult};
use crate::simplify::{simplify, SimplificationResult, SimplifyOptions};
use crate::*;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Selection of the stages of the pipeline, all enabled by default
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stages {
    pub truth_table: bool,
    pub simplify: bool,
    pub minimize: bool,
    pub karnaugh: bool,
    pub sat: bool,
    pub conversion: bool,
    pub circuit: bool,
}

/// Settings of all stages
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stages: Stages,
    pub simplify: SimplifyOptions,
    pub minimize: MinimizeOptions,
    pub karnaugh: KarnaughOptions,
    pub sat: SatOptions,
    pub circuit: CircuitOptions,
}

/// A stage which could not produce its result
#[derive(Clone, Debug, Serialize)]
pub struct StageFailure {
    pub stage: &'static str,
    pub error: BolexError,
}

/// The results of all enabled stages for one expression
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub parsed: ParsedExpression,
    pub truth_table: Option<TruthTable>,
    pub simplification: Option<SimplificationResult>,
    pub minimization: Option<MinimizationReport>,
    pub karnaugh: Option<KarnaughMap>,
    pub sat: Option<SatResult>,
    pub sop: Option<ConversionResult>,
    pub pos: Option<ConversionResult>,
    pub circuit: Option<Circuit>,
    pub failures: Vec<StageFailure>,
}

impl Default for Stages {
    fn default() -> Self {
        Self {
            truth_table: true,
            simplify: true,
            minimize: true,
            karnaugh: true,
            sat: true,
            conversion: true,
            circuit: true,
        }
    }
}

impl Stages {
    /// Disable all stages
    pub fn none() -> Self {
        Self {
            truth_table: false,
            simplify: false,
            minimize: false,
            karnaugh: false,
            sat: false,
            conversion: false,
            circuit: false,
        }
    }
}

impl EngineConfig {
    pub fn with_stages(stages: Stages) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }
}

struct StageRunner<'a> {
    parsed: &'a ParsedExpression,
    failures: Vec<StageFailure>,
}

impl<'a> StageRunner<'a> {
    fn run<T>(
        &mut self,
        stage: &'static str,
        enabled: bool,
        f: impl FnOnce(&ParsedExpression) -> Result<T, BolexError>,
    ) -> Option<T> {
        if !enabled {
            return None;
        }
        match f(self.parsed) {
            Ok(result) => Some(result),
            Err(error) => {
                warn!("{} of '{}' failed: {}", stage, self.parsed.ast(), error);
                self.failures.push(StageFailure { stage, error });
                None
            }
        }
    }
}

/// Parse an expression and run all enabled stages on it
pub fn analyze(text: &str, config: &EngineConfig) -> Result<Analysis, BolexError> {
    let parsed = ParsedExpression::parse(text)?;
    debug!("analyzing '{}' over {} variables", parsed.ast(), parsed.variable_count());
    let stages = &config.stages;
    let mut runner = StageRunner {
        parsed: &parsed,
        failures: vec![],
    };

    let truth_table = runner.run("truth table", stages.truth_table, TruthTable::from_parsed);
    let simplification = runner.run("simplification", stages.simplify, |p| {
        simplify(p, &config.simplify)
    });
    let minimization = runner.run("minimization", stages.minimize, |p| {
        minimize(p, &config.minimize)
    });
    let karnaugh = runner.run("karnaugh map", stages.karnaugh, |p| {
        KarnaughMap::build(p, &config.karnaugh)
    });
    let sat = runner.run("satisfiability", stages.sat, |p| solve(p, &config.sat));
    let sop = runner.run("sum of products", stages.conversion, |p| {
        convert(p, TargetForm::Sop)
    });
    let pos = runner.run("product of sums", stages.conversion, |p| {
        convert(p, TargetForm::Pos)
    });
    let circuit = runner.run("circuit", stages.circuit, |p| {
        Circuit::build(p, &config.circuit)
    });
    let failures = runner.failures;

    Ok(Analysis {
        parsed,
        truth_table,
        simplification,
        minimization,
        karnaugh,
        sat,
        sop,
        pos,
        circuit,
        failures,
    })
}

/// Analyze a list of expressions in parallel.
///
/// The results are in the order of the input, each one independent of the others.
pub fn analyze_batch<S: AsRef<str> + Sync>(
    texts: &[S],
    config: &EngineConfig,
) -> Vec<Result<Analysis, BolexError>> {
    debug!("analyzing a batch of {} expressions", texts.len());
    texts
        .par_iter()
        .map(|text| analyze(text.as_ref(), config))
        .collect()
}

impl Analysis {
    /// Names of the failed stages
    pub fn failed_stages(&self) -> Vec<&'static str> {
        self.failures.iter().map(|f| f.stage).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::*;

    use test_log::test;

    #[test]
    fn full_pipeline() -> Result<(), BolexError> {
        let analysis = analyze("AB + AB'", &EngineConfig::default())?;
        assert!(analysis.failures.is_empty());

        let table = analysis.truth_table.as_ref().map(|t| t.minterms().to_vec());
        assert_eq!(table, Some(vec![2, 3]));

        let text = |e: Option<&Expr>| e.map(|e| e.to_string());
        assert_eq!(
            text(analysis.simplification.as_ref().map(|s| s.simplified())),
            Some("A".into())
        );
        assert_eq!(
            text(
                analysis
                    .minimization
                    .as_ref()
                    .and_then(|m| m.best())
                    .map(|r| r.expression())
            ),
            Some("A".into())
        );
        assert_eq!(
            text(analysis.karnaugh.as_ref().map(|k| k.simplified_sop())),
            Some("A".into())
        );
        assert_eq!(
            text(analysis.pos.as_ref().map(|c| c.minimized())),
            Some("A".into())
        );
        assert_eq!(analysis.sat.as_ref().map(|s| s.satisfiable()), Some(true));
        assert_eq!(
            analysis.circuit.as_ref().map(|c| c.stats().logic_gates),
            Some(4)
        );
        Ok(())
    }

    #[test]
    fn stage_failures_are_isolated() -> Result<(), BolexError> {
        let analysis = analyze("ABCDEFGHIJK", &EngineConfig::default())?;
        let failed = analysis.failed_stages();
        for stage in ["truth table", "minimization", "karnaugh map", "sum of products"] {
            assert!(failed.contains(&stage), "{} should fail", stage);
        }
        assert!(analysis.simplification.is_some());
        assert!(analysis.circuit.is_some());
        assert_eq!(analysis.sat.as_ref().map(|s| s.satisfiable()), Some(true));

        let analysis = analyze("ABCDEFG", &EngineConfig::default())?;
        assert_eq!(analysis.failed_stages(), ["karnaugh map"]);
        assert!(matches!(
            analysis.failures[0].error,
            BolexError::UnsupportedSize(7)
        ));
        Ok(())
    }

    #[test]
    fn selected_stages() -> Result<(), BolexError> {
        let mut stages = Stages::none();
        stages.sat = true;
        let analysis = analyze("A + B", &EngineConfig::with_stages(stages))?;
        assert!(analysis.truth_table.is_none());
        assert!(analysis.circuit.is_none());
        assert!(analysis.sat.is_some());
        Ok(())
    }

    #[test]
    fn batch_keeps_order() {
        let texts = ["A + A'", "A +", "AB", "(A"];
        let results = analyze_batch(&texts, &EngineConfig::default());
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(BolexError::Syntax { .. })));
        assert!(matches!(results[3], Err(BolexError::Syntax { .. })));
        let parsed = results[2].as_ref().map(|a| a.parsed.ast().to_string());
        assert_eq!(parsed.ok(), Some("AB".to_string()));
    }

    #[test]
    fn deep_expressions_in_batches() {
        let chain = vec!["A"; 5000].join("+");
        let negations = format!("A{}", "'".repeat(9000));
        let texts = [chain.as_str(), negations.as_str(), "AB"];
        let results = analyze_batch(&texts, &EngineConfig::default());
        assert_eq!(results.len(), 3);

        let analysis = results[0].as_ref().unwrap();
        let simplified = analysis.simplification.as_ref().map(|s| s.simplified().to_string());
        assert_eq!(simplified.as_deref(), Some("A"));
        assert!(analysis.circuit.is_some());

        assert!(matches!(
            results[1],
            Err(BolexError::TooComplex { what: "expression depth", .. })
        ));
        assert!(results[2].as_ref().map(|a| a.failures.is_empty()).unwrap_or(false));
    }

    #[test]
    fn configuration_records() {
        let json = r#"{
            "stages": {"circuit": false},
            "simplify": {"method": "basic"},
            "minimize": {"algorithms": ["espresso"]},
            "sat": {"method": "brute-force", "findAll": true},
            "circuit": {"layout": "leveled", "moduleName": "top"}
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert!(!config.stages.circuit);
        assert!(config.stages.karnaugh);
        assert_eq!(config.minimize.algorithms, ["espresso"]);
        assert!(config.sat.find_all);
        assert_eq!(config.sat.max_flips, 10_000);
        assert_eq!(config.circuit.module_name, "top");
    }
}
