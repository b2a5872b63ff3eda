//! Law-based rewriting of expressions.
//!
//! The basic pass applies a catalog of Boolean laws bottom-up until no law fires anymore.
//! Associative chains are flattened first so that a law can relate any two operands of a chain.
//! The De Morgan pass pushes negations towards the variables before a second basic pass.
//! The Quine-McCluskey candidate is the minimal sum of products of the truth table.
//! The shortest candidate is selected.
//!
//! ```
//! use bolex::{simplify, ParsedExpression, SimplifyOptions};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("A + AB")?;
//! let result = simplify(&parsed, &SimplifyOptions::default())?;
//! assert_eq!(result.simplified().to_string(), "A");
//! # Ok(())
//! # }
//! ```

use crate::minimize::Algorithm;
use crate::truth_table::MAX_TABLE_VARIABLES;
use crate::implicants::{sort_for_display, sum_of_products};
use crate::*;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Safety bound on the number of rewriting passes
const MAX_PASSES: usize = 100;

/// The Boolean laws used by the rewriting passes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Law {
    /// ```A+0 = A``` and ```A·1 = A```
    Identity,
    /// ```A+1 = 1``` and ```A·0 = 0```
    Null,
    /// ```A+A = A``` and ```A·A = A```
    Idempotent,
    /// ```A+A' = 1``` and ```A·A' = 0```
    Complement,
    /// ```A'' = A```
    DoubleNegation,
    /// ```A+AB = A``` and ```A(A+B) = A```
    Absorption,
    /// ```0' = 1``` and ```1' = 0```
    ConstantNegation,
    /// ```(AB)' = A'+B'``` and ```(A+B)' = A'B'```
    DeMorgan,
}

/// A single rewriting step
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Step {
    pub law: Law,
    pub before: Expr,
    pub after: Expr,
}

/// Selection of the simplification method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimplifyMethod {
    /// Try all methods and keep the shortest result
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "demorgan")]
    DeMorgan,
    #[serde(rename = "quine-mccluskey")]
    QuineMcCluskey,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimplifyOptions {
    pub method: SimplifyMethod,
}

/// The outcome of one method, or the reason why it was skipped
#[derive(Clone, Debug, Serialize)]
pub struct Candidate {
    pub method: SimplifyMethod,
    pub expression: Option<Expr>,
    pub steps: Vec<Step>,
    pub skipped: Option<BolexError>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplificationResult {
    original: Expr,
    simplified: Expr,
    method: SimplifyMethod,
    steps: Vec<Step>,
    candidates: Vec<Candidate>,
}

impl Law {
    pub fn name(&self) -> &'static str {
        match self {
            Law::Identity => "Identity Law",
            Law::Null => "Null Law",
            Law::Idempotent => "Idempotent Law",
            Law::Complement => "Complement Law",
            Law::DoubleNegation => "Double Negation Law",
            Law::Absorption => "Absorption Law",
            Law::ConstantNegation => "Constant Negation",
            Law::DeMorgan => "De Morgan's Law",
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Law {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl SimplifyMethod {
    pub fn name(&self) -> &'static str {
        match self {
            SimplifyMethod::Auto => "auto",
            SimplifyMethod::Basic => "basic",
            SimplifyMethod::DeMorgan => "demorgan",
            SimplifyMethod::QuineMcCluskey => "quine-mccluskey",
        }
    }
}

impl FromStr for SimplifyMethod {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SimplifyMethod::Auto),
            "basic" => Ok(SimplifyMethod::Basic),
            "demorgan" | "de-morgan" => Ok(SimplifyMethod::DeMorgan),
            "quine-mccluskey" | "qm" => Ok(SimplifyMethod::QuineMcCluskey),
            _ => Err(BolexError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for SimplifyMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            method: SimplifyMethod::Auto,
        }
    }
}

impl SimplifyOptions {
    pub fn with_method(method: SimplifyMethod) -> Self {
        Self { method }
    }
}

/// Apply the catalog of laws to a fixpoint and record all steps
pub fn apply_laws(expr: &Expr) -> (Expr, Vec<Step>) {
    let mut steps = vec![];
    let mut current = expr.clone();
    for pass in 1..=MAX_PASSES {
        let next = match rewrite(&current, &mut steps) {
            Cow::Borrowed(_) => break,
            Cow::Owned(e) => e,
        };
        trace!("law pass {}: {}", pass, next);
        current = next;
    }
    (current, steps)
}

/// Push negations inwards with De Morgan's laws and remove double negations
pub fn push_negations(expr: &Expr) -> (Expr, Vec<Step>) {
    let mut steps = vec![];
    let result = demorgan(expr, &mut steps).into_owned();
    (result, steps)
}

fn demorgan<'a>(expr: &'a Expr, steps: &mut Vec<Step>) -> Cow<'a, Expr> {
    match expr {
        Expr::Variable(_) | Expr::Constant(_) => Cow::Borrowed(expr),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::And(l, r) => demorgan_negated(expr, Operator::Or, l, r, steps),
            Expr::Or(l, r) => demorgan_negated(expr, Operator::And, l, r, steps),
            Expr::Not(e) => {
                record(steps, Law::DoubleNegation, expr, e);
                Cow::Owned(demorgan(e, steps).into_owned())
            }
            _ => Cow::Borrowed(expr),
        },
        Expr::And(l, r) => demorgan_operation(expr, Operator::And, l, r, steps),
        Expr::Or(l, r) => demorgan_operation(expr, Operator::Or, l, r, steps),
    }
}

fn demorgan_negated<'a>(
    expr: &'a Expr,
    dual: Operator,
    l: &Arc<Expr>,
    r: &Arc<Expr>,
    steps: &mut Vec<Step>,
) -> Cow<'a, Expr> {
    let pushed = dual.apply(Expr::negate(l.clone()), Expr::negate(r.clone()));
    record(steps, Law::DeMorgan, expr, &pushed);
    Cow::Owned(demorgan(&pushed, steps).into_owned())
}

fn demorgan_operation<'a>(
    expr: &'a Expr,
    op: Operator,
    l: &'a Expr,
    r: &'a Expr,
    steps: &mut Vec<Step>,
) -> Cow<'a, Expr> {
    let c0 = demorgan(l, steps);
    let c1 = demorgan(r, steps);
    if matches!((&c0, &c1), (Cow::Borrowed(_), Cow::Borrowed(_))) {
        return Cow::Borrowed(expr);
    }
    Cow::Owned(op.apply(c0.into_owned(), c1.into_owned()))
}

fn record(steps: &mut Vec<Step>, law: Law, before: &Expr, after: &Expr) {
    trace!("{}: {} => {}", law, before, after);
    steps.push(Step {
        law,
        before: before.clone(),
        after: after.clone(),
    });
}

/// One bottom-up rewriting pass. Return a borrowed expression if no law fired.
fn rewrite<'a>(expr: &'a Expr, steps: &mut Vec<Step>) -> Cow<'a, Expr> {
    match expr {
        Expr::Variable(_) | Expr::Constant(_) => Cow::Borrowed(expr),
        Expr::Not(inner) => {
            let child = rewrite(inner, steps);
            let current = match &child {
                Cow::Borrowed(_) => Cow::Borrowed(expr),
                Cow::Owned(c) => Cow::Owned(Expr::negate(c.clone())),
            };
            match child.as_ref() {
                Expr::Constant(b) => {
                    let after = Expr::Constant(!b);
                    record(steps, Law::ConstantNegation, &current, &after);
                    Cow::Owned(after)
                }
                Expr::Not(e) => {
                    let after = e.as_ref().clone();
                    record(steps, Law::DoubleNegation, &current, &after);
                    Cow::Owned(after)
                }
                _ => current,
            }
        }
        Expr::And(_, _) => rewrite_operation(expr, Operator::And, steps),
        Expr::Or(_, _) => rewrite_operation(expr, Operator::Or, steps),
    }
}

fn rewrite_operation<'a>(expr: &'a Expr, op: Operator, steps: &mut Vec<Step>) -> Cow<'a, Expr> {
    let mut changed = false;
    let mut operands = vec![];
    for operand in expr.operands(op) {
        match rewrite(operand, steps) {
            Cow::Borrowed(e) => operands.push(e.clone()),
            Cow::Owned(e) => {
                changed = true;
                operands.extend(e.operands(op).into_iter().cloned());
            }
        }
    }
    match rewrite_chain(op, &operands, steps) {
        Some(e) => Cow::Owned(e),
        None if changed => Cow::Owned(Expr::join(op, operands)),
        None => Cow::Borrowed(expr),
    }
}

/// Apply the laws on the flattened operands of an associative chain.
///
/// Return None if no law fired.
fn rewrite_chain(op: Operator, chain: &[Expr], steps: &mut Vec<Step>) -> Option<Expr> {
    let original = Expr::join(op, chain.iter().cloned());
    let mut operands = chain.to_vec();
    let mut fired = false;

    // Null law
    let annihilator = Expr::Constant(op.annihilator());
    if operands.contains(&annihilator) {
        record(steps, Law::Null, &original, &annihilator);
        return Some(annihilator);
    }

    // Identity law
    let identity = Expr::Constant(op.identity());
    if operands.contains(&identity) {
        let before = Expr::join(op, operands.clone());
        operands.retain(|e| e != &identity);
        let after = Expr::join(op, operands.clone());
        record(steps, Law::Identity, &before, &after);
        fired = true;
    }

    // Idempotent law
    let mut unique: Vec<Expr> = Vec::with_capacity(operands.len());
    for e in &operands {
        if !unique.contains(e) {
            unique.push(e.clone());
        }
    }
    if unique.len() < operands.len() {
        let before = Expr::join(op, operands.clone());
        let after = Expr::join(op, unique.clone());
        record(steps, Law::Idempotent, &before, &after);
        operands = unique;
        fired = true;
    }

    // Complement law
    let complemented = operands
        .iter()
        .enumerate()
        .any(|(i, a)| operands[i + 1..].iter().any(|b| a.is_negation_of(b)));
    if complemented {
        let before = Expr::join(op, operands.clone());
        record(steps, Law::Complement, &before, &annihilator);
        return Some(annihilator);
    }

    // Absorption law: an operand is removed if its parts include all parts of another operand.
    // Among operands with the same parts, the first one is kept.
    let inner = op.dual();
    let parts: Vec<Vec<&Expr>> = operands.iter().map(|e| e.operands(inner)).collect();
    let absorbed: Vec<bool> = (0..operands.len())
        .map(|t| {
            (0..operands.len()).any(|s| {
                s != t
                    && included(&parts[s], &parts[t])
                    && (s < t || !included(&parts[t], &parts[s]))
            })
        })
        .collect();
    if absorbed.contains(&true) {
        let before = Expr::join(op, operands.clone());
        let kept: Vec<Expr> = operands
            .iter()
            .zip(&absorbed)
            .filter(|(_, a)| !**a)
            .map(|(e, _)| e.clone())
            .collect();
        let after = Expr::join(op, kept.clone());
        record(steps, Law::Absorption, &before, &after);
        operands = kept;
        fired = true;
    }

    match fired {
        true => Some(Expr::join(op, operands)),
        false => None,
    }
}

fn included(a: &[&Expr], b: &[&Expr]) -> bool {
    a.iter().all(|part| b.contains(part))
}

/// Minimal sum of products of an expression with the Quine-McCluskey algorithm
pub fn quine_mccluskey(parsed: &ParsedExpression) -> Result<Expr, BolexError> {
    let table = TruthTable::from_parsed(parsed)?;
    let variables = table.variables();
    if table.is_tautology() {
        return Ok(Expr::Constant(true));
    }
    let (mut implicants, _) = Algorithm::QuineMcCluskey.cover(table.minterms(), variables.len());
    sort_for_display(&mut implicants, variables);
    Ok(sum_of_products(&implicants, variables))
}

fn candidate(method: SimplifyMethod, parsed: &ParsedExpression, basic: Option<&(Expr, Vec<Step>)>) -> Candidate {
    let outcome = match method {
        SimplifyMethod::Basic => Ok(apply_laws(parsed.ast())),
        SimplifyMethod::DeMorgan => {
            let (start, mut steps) = match basic {
                Some((e, s)) => (e.clone(), s.clone()),
                None => apply_laws(parsed.ast()),
            };
            let (pushed, mut pushed_steps) = push_negations(&start);
            let (result, mut final_steps) = apply_laws(&pushed);
            steps.append(&mut pushed_steps);
            steps.append(&mut final_steps);
            Ok((result, steps))
        }
        SimplifyMethod::QuineMcCluskey | SimplifyMethod::Auto => {
            quine_mccluskey(parsed).map(|e| (e, vec![]))
        }
    };
    match outcome {
        Ok((expression, steps)) => Candidate {
            method,
            expression: Some(expression),
            steps,
            skipped: None,
        },
        Err(error) => Candidate {
            method,
            expression: None,
            steps: vec![],
            skipped: Some(error),
        },
    }
}

/// Simplify an expression with the selected method.
///
/// With the automatic method, all methods are tried and the shortest result in canonical
/// notation is selected (the earliest one on ties). A Quine-McCluskey candidate above the
/// capacity of truth tables is skipped. An explicit request for this method fails instead.
pub fn simplify(
    parsed: &ParsedExpression,
    options: &SimplifyOptions,
) -> Result<SimplificationResult, BolexError> {
    let candidates = match options.method {
        SimplifyMethod::Auto => {
            let basic = candidate(SimplifyMethod::Basic, parsed, None);
            let start = basic.expression.clone().map(|e| (e, basic.steps.clone()));
            let demorgan = candidate(SimplifyMethod::DeMorgan, parsed, start.as_ref());
            let qm = candidate(SimplifyMethod::QuineMcCluskey, parsed, None);
            if let Some(error) = &qm.skipped {
                warn!("skipping the Quine-McCluskey candidate: {}", error);
            }
            vec![basic, demorgan, qm]
        }
        SimplifyMethod::QuineMcCluskey => {
            BolexError::check_capacity(
                "Quine-McCluskey simplification",
                parsed.variable_count(),
                MAX_TABLE_VARIABLES,
            )?;
            vec![candidate(SimplifyMethod::QuineMcCluskey, parsed, None)]
        }
        method => vec![candidate(method, parsed, None)],
    };

    let mut best: Option<(&Candidate, &Expr)> = None;
    for c in &candidates {
        if let Some(e) = &c.expression {
            let better = match best {
                None => true,
                Some((_, b)) => e.text_len() < b.text_len(),
            };
            if better {
                best = Some((c, e));
            }
        }
    }
    let (method, simplified, steps) = match best {
        Some((c, e)) => (c.method, e.clone(), c.steps.clone()),
        None => (options.method, parsed.ast().clone(), vec![]),
    };
    debug!("simplified '{}' into '{}' with {}", parsed.ast(), simplified, method);

    Ok(SimplificationResult {
        original: parsed.ast().clone(),
        simplified,
        method,
        steps,
        candidates,
    })
}

impl SimplificationResult {
    pub fn original(&self) -> &Expr {
        &self.original
    }

    pub fn simplified(&self) -> &Expr {
        &self.simplified
    }

    /// The method which produced the selected expression
    pub fn method(&self) -> SimplifyMethod {
        self.method
    }

    /// The steps of the selected method
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

#[cfg(test)]
mod tests {
    use crate::simplify::*;

    use test_log::test;

    fn basic(text: &str) -> Result<(String, Vec<Law>), BolexError> {
        let e: Expr = text.parse()?;
        let (result, steps) = apply_laws(&e);
        Ok((result.to_string(), steps.iter().map(|s| s.law).collect()))
    }

    #[test]
    fn single_laws() -> Result<(), BolexError> {
        assert_eq!(basic("A + 0")?, ("A".to_string(), vec![Law::Identity]));
        assert_eq!(basic("A1")?, ("A".to_string(), vec![Law::Identity]));
        assert_eq!(basic("A + 1")?, ("1".to_string(), vec![Law::Null]));
        assert_eq!(basic("A0B")?, ("0".to_string(), vec![Law::Null]));
        assert_eq!(basic("A + A")?, ("A".to_string(), vec![Law::Idempotent]));
        assert_eq!(basic("A + A'")?, ("1".to_string(), vec![Law::Complement]));
        assert_eq!(basic("AA'")?, ("0".to_string(), vec![Law::Complement]));
        assert_eq!(basic("A''")?, ("A".to_string(), vec![Law::DoubleNegation]));
        assert_eq!(basic("A + AB")?, ("A".to_string(), vec![Law::Absorption]));
        assert_eq!(basic("A(A + B)")?, ("A".to_string(), vec![Law::Absorption]));
        assert_eq!(basic("0'")?, ("1".to_string(), vec![Law::ConstantNegation]));
        Ok(())
    }

    #[test]
    fn chains_and_fixpoint() -> Result<(), BolexError> {
        let (result, _) = basic("A + B + A'")?;
        assert_eq!(result, "1");
        let (result, laws) = basic("(A + 0)(A + 0)' + B")?;
        assert_eq!(result, "B");
        assert!(laws.contains(&Law::Complement));
        let (result, laws) = basic("AB + C")?;
        assert_eq!(result, "AB + C");
        assert!(laws.is_empty());
        Ok(())
    }

    #[test]
    fn demorgan_pass() -> Result<(), BolexError> {
        let e: Expr = "(AB)' + (C + D')'".parse()?;
        let (pushed, steps) = push_negations(&e);
        assert_eq!(pushed.to_string(), "A' + B' + C'D");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].law, Law::DeMorgan);
        assert_eq!(steps[2].law, Law::DoubleNegation);
        Ok(())
    }

    #[test]
    fn scenarios() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("A + A'")?;
        let result = simplify(&parsed, &SimplifyOptions::default())?;
        assert_eq!(result.simplified().to_string(), "1");
        assert_eq!(result.method(), SimplifyMethod::Basic);
        assert_eq!(result.steps()[0].law, Law::Complement);

        let parsed = ParsedExpression::parse("A + AB")?;
        let result = simplify(&parsed, &SimplifyOptions::default())?;
        assert_eq!(result.simplified().to_string(), "A");
        assert_eq!(result.candidates().len(), 3);
        Ok(())
    }

    #[test]
    fn quine_mccluskey_candidate() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("AB + AB'")?;
        let result = simplify(&parsed, &SimplifyOptions::with_method(SimplifyMethod::QuineMcCluskey))?;
        assert_eq!(result.simplified().to_string(), "A");

        let parsed = ParsedExpression::parse("AB + CD + EF + GH + IJ + K")?;
        assert!(matches!(
            simplify(&parsed, &SimplifyOptions::with_method(SimplifyMethod::QuineMcCluskey)),
            Err(BolexError::Capacity { .. })
        ));
        let result = simplify(&parsed, &SimplifyOptions::default())?;
        assert!(result.candidates()[2].skipped.is_some());
        assert_eq!(result.simplified(), parsed.ast());
        Ok(())
    }

    #[test]
    fn method_names() -> Result<(), BolexError> {
        assert_eq!("demorgan".parse::<SimplifyMethod>()?, SimplifyMethod::DeMorgan);
        assert!(matches!(
            "fancy".parse::<SimplifyMethod>(),
            Err(BolexError::UnsupportedMethod(_))
        ));
        Ok(())
    }
}
