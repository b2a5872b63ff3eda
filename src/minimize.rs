//! Two-level minimization from truth tables.
//!
//! All algorithms start from the minterms of the function and produce a list of implicants
//! whose sum is equivalent to the original expression:
//!
//! * Quine-McCluskey: prime implicants, essential primes and a greedy cover
//! * Petrick: the per-minterm covering sums of the prime chart, resolved with a greedy heuristic
//! * Espresso: expand and reduce passes on unit cubes
//!
//! ```
//! use bolex::{minimize, MinimizeOptions, ParsedExpression};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("AB + AB'")?;
//! let report = minimize(&parsed, &MinimizeOptions::default())?;
//! assert_eq!(report.results().len(), 3);
//! for result in report.results() {
//!     assert_eq!(result.expression().to_string(), "A");
//! }
//! # Ok(())
//! # }
//! ```

use crate::implicants::{sort_for_display, sum_of_products};
use crate::*;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Above this duration, the speed factor of the score decreases
const SPEED_THRESHOLD_SECS: f64 = 10.0;

/// Reference length for the length factor of the score
const LENGTH_REFERENCE: f64 = 100.0;

/// Available minimization algorithms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Algorithm {
    #[serde(rename = "quine-mccluskey")]
    QuineMcCluskey,
    #[serde(rename = "petrick")]
    Petrick,
    #[serde(rename = "espresso")]
    Espresso,
}

/// Minimization settings
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MinimizeOptions {
    /// Names of the algorithms to run, in order
    pub algorithms: Vec<String>,
}

/// The output of a single algorithm
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimizationResult {
    algorithm: Algorithm,
    expression: Expr,
    implicants: Vec<Implicant>,
    prime_count: usize,
    gate_count: usize,
    depth: usize,
    reduction: f64,
    elapsed_ms: f64,
    score: f64,
}

/// An algorithm which could not run
#[derive(Clone, Debug, Serialize)]
pub struct AlgorithmFailure {
    pub algorithm: String,
    pub error: BolexError,
}

/// The results of all requested algorithms, ranked by decreasing score
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MinimizationReport {
    original: Expr,
    variables: Vec<Variable>,
    results: Vec<MinimizationResult>,
    failures: Vec<AlgorithmFailure>,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::QuineMcCluskey,
        Algorithm::Petrick,
        Algorithm::Espresso,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::QuineMcCluskey => "quine-mccluskey",
            Algorithm::Petrick => "petrick",
            Algorithm::Espresso => "espresso",
        }
    }

    /// Select the implicants covering the given minterms.
    ///
    /// Also return the number of prime implicants found by the algorithm.
    pub fn cover(&self, minterms: &[usize], width: usize) -> (Vec<Implicant>, usize) {
        match self {
            Algorithm::QuineMcCluskey => {
                let chart = PrimeChart::from_minterms(minterms, width);
                (chart.select(&chart.greedy_cover()), chart.primes().len())
            }
            Algorithm::Petrick => {
                let chart = PrimeChart::from_minterms(minterms, width);
                (chart.select(&chart.petrick_cover()), chart.primes().len())
            }
            Algorithm::Espresso => {
                let cubes = espresso(minterms, width);
                let count = cubes.len();
                (cubes, count)
            }
        }
    }
}

impl FromStr for Algorithm {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quine-mccluskey" | "quine_mccluskey" | "quinemccluskey" | "qm" => {
                Ok(Algorithm::QuineMcCluskey)
            }
            "petrick" => Ok(Algorithm::Petrick),
            "espresso" => Ok(Algorithm::Espresso),
            _ => Err(BolexError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::ALL.iter().map(|a| a.name().to_string()).collect(),
        }
    }
}

impl MinimizeOptions {
    pub fn with_algorithms<S: ToString>(algorithms: &[S]) -> Self {
        Self {
            algorithms: algorithms.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Espresso-style heuristic minimization.
///
/// Each minterm starts as a unit cube. The EXPAND pass frees the fixed positions of each cube,
/// in variable order, as long as the cube only covers minterms of the on-set. The REDUCE pass
/// removes the cubes which are covered by the union of the others. Both passes are repeated
/// until the number of cubes is stable.
pub fn espresso(minterms: &[usize], width: usize) -> Vec<Implicant> {
    let on_set: bit_set::BitSet = minterms.iter().copied().collect();
    let mut cubes: Vec<Implicant> = on_set
        .iter()
        .map(|m| Implicant::minterm(m, width))
        .collect();

    let mut iteration = 0;
    loop {
        iteration += 1;
        let before = cubes.len();

        // EXPAND
        let mut expanded: Vec<Implicant> = vec![];
        for cube in &cubes {
            let mut cube = *cube;
            for position in 0..width {
                if !cube.is_fixed(position) {
                    continue;
                }
                let candidate = cube.expand(position);
                if candidate
                    .covered_minterms()
                    .iter()
                    .all(|m| on_set.contains(*m))
                {
                    cube = candidate;
                }
            }
            if !expanded.iter().any(|c| c.contains(&cube)) {
                expanded.retain(|c| !cube.contains(c));
                expanded.push(cube);
            }
        }
        cubes = expanded;

        // REDUCE
        let mut idx = 0;
        while idx < cubes.len() {
            let redundant = cubes[idx].covered_minterms().iter().all(|m| {
                cubes
                    .iter()
                    .enumerate()
                    .any(|(other, c)| other != idx && c.covers(*m))
            });
            if redundant {
                cubes.remove(idx);
            } else {
                idx += 1;
            }
        }

        debug!("espresso iteration {}: {} cubes", iteration, cubes.len());
        if cubes.len() == before {
            break;
        }
    }
    cubes
}

/// Run the requested minimization algorithms on the truth table of an expression.
///
/// The truth table is shared by all algorithms: a capacity error aborts the whole process.
/// An unknown algorithm name is reported as a failure and the other algorithms still run.
/// Constant functions give ```0``` or ```1``` without running any algorithm.
pub fn minimize(
    parsed: &ParsedExpression,
    options: &MinimizeOptions,
) -> Result<MinimizationReport, BolexError> {
    let table = TruthTable::from_parsed(parsed)?;
    let variables = table.variables().to_vec();
    let original_len = parsed.original_text().chars().count();

    let mut results = vec![];
    let mut failures = vec![];
    for name in &options.algorithms {
        let algorithm = match name.parse::<Algorithm>() {
            Ok(algorithm) => algorithm,
            Err(error) => {
                warn!("skipping minimization: {}", error);
                failures.push(AlgorithmFailure {
                    algorithm: name.clone(),
                    error,
                });
                continue;
            }
        };

        let start = Instant::now();
        let (mut implicants, prime_count) = if table.is_contradiction() {
            (vec![], 0)
        } else if table.is_tautology() {
            (vec![Implicant::free(variables.len())], 1)
        } else {
            algorithm.cover(table.minterms(), variables.len())
        };
        sort_for_display(&mut implicants, &variables);
        let expression = sum_of_products(&implicants, &variables);
        let elapsed = start.elapsed().as_secs_f64();

        let metrics = expression.metrics();
        let new_len = expression.text_len();
        let reduction = match original_len {
            0 => 0.0,
            _ => (original_len as f64 - new_len as f64) / original_len as f64,
        };
        let result = MinimizationResult {
            algorithm,
            gate_count: metrics.operator_count,
            depth: metrics.depth,
            reduction: 100.0 * reduction,
            elapsed_ms: 1000.0 * elapsed,
            score: score(reduction, elapsed, new_len),
            prime_count,
            implicants,
            expression,
        };
        info!(
            "{} minimized '{}' into '{}' (score {:.1})",
            algorithm, parsed.ast(), result.expression, result.score
        );
        results.push(result);
    }

    // stable sort: equal scores keep the requested order
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    Ok(MinimizationReport {
        original: parsed.ast().clone(),
        variables,
        results,
        failures,
    })
}

/// Performance score: ```50·reduction + 30·speed + 20·length```.
///
/// * reduction is the relative shrink of the text (negative growth counts as 0)
/// * speed is 1 up to 10 seconds, then decreases as ```10/seconds```
/// * length is ```1 - length/100``` (at least 0)
pub fn score(reduction: f64, seconds: f64, length: usize) -> f64 {
    let reduction_factor = reduction.max(0.0);
    let speed_factor = match seconds <= SPEED_THRESHOLD_SECS {
        true => 1.0,
        false => SPEED_THRESHOLD_SECS / seconds,
    };
    let length_factor = (1.0 - length as f64 / LENGTH_REFERENCE).max(0.0);
    50.0 * reduction_factor + 30.0 * speed_factor + 20.0 * length_factor
}

impl MinimizationResult {
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn expression(&self) -> &Expr {
        &self.expression
    }

    pub fn implicants(&self) -> &[Implicant] {
        &self.implicants
    }

    pub fn prime_count(&self) -> usize {
        self.prime_count
    }

    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Relative shrink compared to the text of the original expression, in percent
    pub fn reduction(&self) -> f64 {
        self.reduction
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

impl MinimizationReport {
    pub fn original(&self) -> &Expr {
        &self.original
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// The results, best score first
    pub fn results(&self) -> &[MinimizationResult] {
        &self.results
    }

    pub fn failures(&self) -> &[AlgorithmFailure] {
        &self.failures
    }

    pub fn best(&self) -> Option<&MinimizationResult> {
        self.results.first()
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&MinimizationResult> {
        self.results.iter().find(|r| r.algorithm == algorithm)
    }
}

#[cfg(test)]
mod tests {
    use crate::minimize::*;

    use test_log::test;

    fn check_equivalent(text: &str, report: &MinimizationReport) -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse(text)?;
        let expected = TruthTable::from_parsed(&parsed)?;
        for result in report.results() {
            let table = TruthTable::build(result.expression(), expected.variables())?;
            assert_eq!(
                table.outputs(),
                expected.outputs(),
                "{} changed the function of '{}'",
                result.algorithm(),
                text
            );
        }
        Ok(())
    }

    #[test]
    fn algorithm_names() -> Result<(), BolexError> {
        assert_eq!("qm".parse::<Algorithm>()?, Algorithm::QuineMcCluskey);
        assert_eq!("Quine-McCluskey".parse::<Algorithm>()?, Algorithm::QuineMcCluskey);
        assert_eq!("espresso".parse::<Algorithm>()?, Algorithm::Espresso);
        assert_eq!(
            "genetic".parse::<Algorithm>(),
            Err(BolexError::UnsupportedAlgorithm("genetic".to_string()))
        );
        Ok(())
    }

    #[test]
    fn all_algorithms_preserve_the_function() -> Result<(), BolexError> {
        let texts = [
            "AB + AB'",
            "A'B'C' + A'B'C + AB'C + ABC + ABC' + A'BC'",
            "(A + B)(A' + C)(B + C')",
            "AB' + A'B",
            "AB'D + A'C + BCD' + A'B'C'D'",
        ];
        for text in texts {
            let parsed = ParsedExpression::parse(text)?;
            let report = minimize(&parsed, &MinimizeOptions::default())?;
            assert_eq!(report.results().len(), 3);
            check_equivalent(text, &report)?;
        }
        Ok(())
    }

    #[test]
    fn constant_functions() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("A + A'")?;
        let report = minimize(&parsed, &MinimizeOptions::default())?;
        for result in report.results() {
            assert_eq!(result.expression().to_string(), "1");
        }
        let parsed = ParsedExpression::parse("AA'B")?;
        let report = minimize(&parsed, &MinimizeOptions::default())?;
        for result in report.results() {
            assert_eq!(result.expression().to_string(), "0");
            assert!(result.implicants().is_empty());
        }
        Ok(())
    }

    #[test]
    fn unknown_algorithm_is_isolated() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("AB + AC")?;
        let options = MinimizeOptions::with_algorithms(&["espresso", "magic", "qm"]);
        let report = minimize(&parsed, &options)?;
        assert_eq!(report.results().len(), 2);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].algorithm, "magic");
        assert!(report.get(Algorithm::Petrick).is_none());
        Ok(())
    }

    #[test]
    fn espresso_cubes() {
        // A'B' + AC
        let cubes = espresso(&[0, 1, 5, 7], 3);
        let names: Vec<String> = cubes.iter().map(|c| c.to_string()).collect();
        assert_eq!(cubes.len(), 2);
        assert!(names.contains(&"00-".to_string()));
        assert!(names.contains(&"1-1".to_string()));
    }

    #[test]
    fn scores_and_ranking() -> Result<(), BolexError> {
        assert_eq!(score(0.0, 0.0, 100), 30.0);
        assert_eq!(score(1.0, 20.0, 0), 50.0 + 15.0 + 20.0);
        assert_eq!(score(-0.5, 0.0, 200), 30.0);

        let parsed = ParsedExpression::parse("A'B'C' + A'B'C + AB'C + ABC + ABC' + A'BC'")?;
        let report = minimize(&parsed, &MinimizeOptions::default())?;
        let scores: Vec<f64> = report.results().iter().map(|r| r.score()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        let best = report.best().unwrap();
        assert!(best.reduction() > 0.0);
        assert!(best.prime_count() >= best.implicants().len());
        Ok(())
    }

    #[test]
    fn reduction_from_the_written_text() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("A AND B")?;
        let report = minimize(&parsed, &MinimizeOptions::default())?;
        for result in report.results() {
            assert_eq!(result.expression().to_string(), "AB");
            assert!((result.reduction() - 500.0 / 7.0).abs() < 1e-9);
        }

        let parsed = ParsedExpression::parse("AB")?;
        let report = minimize(&parsed, &MinimizeOptions::default())?;
        assert!(report.results().iter().all(|r| r.reduction() == 0.0));
        Ok(())
    }
}
