//! Conversion to sums of products and products of sums.
//!
//! The canonical forms come from the truth table. The minimized forms distribute the expression
//! into a list of terms, then remove contradictory, duplicate and absorbed terms.
//!
//! ```
//! use bolex::{convert, ParsedExpression, TargetForm};
//! # use bolex::BolexError;
//! # fn main() -> Result<(), BolexError> {
//!
//! let parsed = ParsedExpression::parse("A(B + C)")?;
//! let sop = convert(&parsed, TargetForm::Sop)?;
//! assert_eq!(sop.minimized().to_string(), "AB + AC");
//!
//! let pos = convert(&parsed, TargetForm::Pos)?;
//! assert_eq!(pos.minimized().to_string(), "A(B + C)");
//! # Ok(())
//! # }
//! ```

use crate::*;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest number of terms produced by the distribution of an expression
pub const MAX_DISTRIBUTED_TERMS: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetForm {
    /// Sum of products
    Sop,
    /// Product of sums
    Pos,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionStep {
    pub description: String,
    pub expression: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub variable_count: usize,
    pub canonical_terms: usize,
    pub distributed_terms: usize,
    pub minimized_terms: usize,
    pub literal_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    form: TargetForm,
    original: Expr,
    canonical: Expr,
    minimized: Expr,
    steps: Vec<ConversionStep>,
    metadata: ConversionMetadata,
}

/// The terms obtained by distributing AND over OR.
///
/// Each pattern is a product term, or a clause once the products of the complement are
/// negated. Terms may contain conflicts until they are removed.
#[derive(Clone, Debug)]
struct Distribution {
    patterns: Vec<Pattern>,
    operation: &'static str,
}

impl Distribution {
    /// Expand an expression, or its negation if ```positive``` is false
    fn from_expr(expr: &Expr, positive: bool, operation: &'static str) -> Result<Self, BolexError> {
        let mut result = Self {
            patterns: vec![Pattern::default()],
            operation,
        };
        result.expand(expr, positive)?;
        Ok(result)
    }

    fn restrict(&mut self, var: Variable, value: bool) {
        for p in &mut self.patterns {
            p.set_ignoring_conflicts(var, value);
        }
    }

    fn expand(&mut self, expr: &Expr, positive: bool) -> Result<(), BolexError> {
        match expr {
            Expr::Variable(v) => self.restrict(*v, positive),
            Expr::Not(e) => self.expand(e, !positive)?,
            Expr::Constant(b) => {
                if *b != positive {
                    self.patterns.clear();
                }
            }
            Expr::And(l, r) if positive => self.expand_and(l, r, positive)?,
            Expr::Or(l, r) if !positive => self.expand_and(l, r, positive)?,
            Expr::And(l, r) | Expr::Or(l, r) => self.expand_or(l, r, positive)?,
        }
        Ok(())
    }

    fn expand_and(&mut self, left: &Expr, right: &Expr, positive: bool) -> Result<(), BolexError> {
        self.expand(left, positive)?;
        self.expand(right, positive)
    }

    fn expand_or(&mut self, left: &Expr, right: &Expr, positive: bool) -> Result<(), BolexError> {
        let mut other = self.clone();
        self.expand(left, positive)?;
        other.expand(right, positive)?;
        self.patterns.append(&mut other.patterns);
        if self.patterns.len() > MAX_DISTRIBUTED_TERMS {
            return Err(BolexError::TooManyTerms {
                operation: self.operation,
                limit: MAX_DISTRIBUTED_TERMS,
            });
        }
        Ok(())
    }

    /// Remove the products fixing a variable to both values, return the number of removed terms
    fn remove_conflicts(&mut self) -> usize {
        let before = self.patterns.len();
        self.patterns.retain(|p| !p.has_conflict());
        before - self.patterns.len()
    }

    fn remove_duplicates(&mut self) -> usize {
        let before = self.patterns.len();
        let mut unique: Vec<Pattern> = Vec::with_capacity(before);
        for p in self.patterns.drain(..) {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        self.patterns = unique;
        before - self.patterns.len()
    }

    /// Remove all terms containing the literals of another term, until no term is removed
    fn absorb(&mut self) -> usize {
        let before = self.patterns.len();
        loop {
            let absorbed = (0..self.patterns.len()).find(|t| {
                self.patterns.iter().enumerate().any(|(s, p)| {
                    s != *t && p.contains(&self.patterns[*t]) && p != &self.patterns[*t]
                })
            });
            match absorbed {
                Some(t) => {
                    trace!("absorbing {}", self.patterns[t]);
                    self.patterns.remove(t);
                }
                None => break,
            }
        }
        before - self.patterns.len()
    }

    fn sort(&mut self) {
        self.patterns.sort_by(|a, b| {
            a.literal_count()
                .cmp(&b.literal_count())
                .then_with(|| a.display_order(b))
        });
    }

    /// Turn the products of the complement into the clauses of the function
    fn negate(&mut self) {
        for p in &mut self.patterns {
            p.negate_all_variables();
        }
    }

    /// Read the terms as products of a sum
    fn to_sop(&self) -> Expr {
        Expr::join(Operator::Or, self.patterns.iter().map(Pattern::to_product))
    }

    /// Read the terms as clauses of a product
    fn to_pos(&self) -> Expr {
        Expr::join(Operator::And, self.patterns.iter().map(Pattern::to_sum))
    }
}

impl TargetForm {
    pub fn name(&self) -> &'static str {
        match self {
            TargetForm::Sop => "sop",
            TargetForm::Pos => "pos",
        }
    }

    fn term_name(&self) -> &'static str {
        match self {
            TargetForm::Sop => "product",
            TargetForm::Pos => "clause",
        }
    }
}

impl FromStr for TargetForm {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sop" | "sum-of-products" => Ok(TargetForm::Sop),
            "pos" | "product-of-sums" => Ok(TargetForm::Pos),
            _ => Err(BolexError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for TargetForm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Convert an expression to a sum of products or a product of sums.
///
/// The canonical form requires the truth table and shares its variable limit.
/// The minimized form fails if the distribution exceeds [MAX_DISTRIBUTED_TERMS] terms.
pub fn convert(parsed: &ParsedExpression, form: TargetForm) -> Result<ConversionResult, BolexError> {
    let table = TruthTable::from_parsed(parsed)?;
    let (canonical, canonical_terms) = match form {
        TargetForm::Sop => (table.canonical_sop(), table.minterms().len()),
        TargetForm::Pos => (table.canonical_pos(), table.maxterms().len()),
    };
    let term = form.term_name();

    let mut steps = vec![ConversionStep {
        description: format!("Canonical form with {} {}s", canonical_terms, term),
        expression: canonical.clone(),
    }];

    let mut distribution = match form {
        TargetForm::Sop => Distribution::from_expr(parsed.ast(), true, "SOP expansion")?,
        TargetForm::Pos => {
            let mut complement = Distribution::from_expr(parsed.ast(), false, "POS expansion")?;
            complement.negate();
            complement
        }
    };
    let read = |d: &Distribution| match form {
        TargetForm::Sop => d.to_sop(),
        TargetForm::Pos => d.to_pos(),
    };
    let distributed_terms = distribution.patterns.len();
    steps.push(ConversionStep {
        description: format!("Distributed form with {} {}s", distributed_terms, term),
        expression: read(&distribution),
    });

    let invalid = match form {
        TargetForm::Sop => "contradictory",
        TargetForm::Pos => "tautological",
    };
    let removals: [(fn(&mut Distribution) -> usize, &str); 3] = [
        (Distribution::remove_conflicts, invalid),
        (Distribution::remove_duplicates, "duplicate"),
        (Distribution::absorb, "absorbed"),
    ];
    for (remove, kind) in removals {
        let count = remove(&mut distribution);
        if count > 0 {
            distribution.sort();
            steps.push(ConversionStep {
                description: format!("Removed {} {} {}s", count, kind, term),
                expression: read(&distribution),
            });
        }
    }
    distribution.sort();
    let minimized = read(&distribution);
    debug!(
        "{} of '{}': {} distributed {}s reduced to {}",
        form,
        parsed.ast(),
        distributed_terms,
        term,
        distribution.patterns.len()
    );

    Ok(ConversionResult {
        form,
        original: parsed.ast().clone(),
        metadata: ConversionMetadata {
            variable_count: parsed.variable_count(),
            canonical_terms,
            distributed_terms,
            minimized_terms: distribution.patterns.len(),
            literal_count: minimized.literal_count(),
        },
        canonical,
        minimized,
        steps,
    })
}

impl ConversionResult {
    pub fn form(&self) -> TargetForm {
        self.form
    }

    pub fn original(&self) -> &Expr {
        &self.original
    }

    pub fn canonical(&self) -> &Expr {
        &self.canonical
    }

    pub fn minimized(&self) -> &Expr {
        &self.minimized
    }

    pub fn steps(&self) -> &[ConversionStep] {
        &self.steps
    }

    pub fn metadata(&self) -> &ConversionMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::*;

    use test_log::test;

    fn minimized(text: &str, form: TargetForm) -> Result<String, BolexError> {
        let parsed = ParsedExpression::parse(text)?;
        Ok(convert(&parsed, form)?.minimized().to_string())
    }

    #[test]
    fn sum_of_products() -> Result<(), BolexError> {
        assert_eq!(minimized("A + AB", TargetForm::Sop)?, "A");
        assert_eq!(minimized("(A + B)(A + C)", TargetForm::Sop)?, "A + BC");
        assert_eq!(minimized("AA' + B", TargetForm::Sop)?, "B");
        assert_eq!(minimized("AA'", TargetForm::Sop)?, "0");
        assert_eq!(minimized("A + 1", TargetForm::Sop)?, "1");
        Ok(())
    }

    #[test]
    fn product_of_sums() -> Result<(), BolexError> {
        assert_eq!(minimized("AB + C", TargetForm::Pos)?, "(A + C)(B + C)");
        assert_eq!(minimized("AB + AC'", TargetForm::Pos)?, "A(B + C')");
        assert_eq!(minimized("A + A'", TargetForm::Pos)?, "1");
        assert_eq!(minimized("AA'", TargetForm::Pos)?, "AA'");
        assert_eq!(minimized("A(A + B)", TargetForm::Pos)?, "A");
        Ok(())
    }

    #[test]
    fn canonical_and_steps() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("AB + AB'")?;
        let result = convert(&parsed, TargetForm::Sop)?;
        assert_eq!(result.canonical().to_string(), "AB' + AB");
        assert_eq!(result.minimized().to_string(), "AB + AB'");
        assert_eq!(result.steps().len(), 2);
        assert_eq!(result.metadata().canonical_terms, 2);

        let parsed = ParsedExpression::parse("A + AB + A")?;
        let result = convert(&parsed, TargetForm::Sop)?;
        assert_eq!(result.minimized().to_string(), "A");
        let descriptions: Vec<&str> = result.steps().iter().map(|s| s.description.as_str()).collect();
        assert_eq!(
            descriptions,
            [
                "Canonical form with 2 products",
                "Distributed form with 3 products",
                "Removed 1 duplicate products",
                "Removed 1 absorbed products",
            ]
        );
        Ok(())
    }

    #[test]
    fn conversions_are_equivalent() -> Result<(), BolexError> {
        for text in ["(A + B')(C + D) + A'", "(AB)' + C(D + A')", "(A + B)'C"] {
            let parsed = ParsedExpression::parse(text)?;
            let table = TruthTable::from_parsed(&parsed)?;
            for form in [TargetForm::Sop, TargetForm::Pos] {
                let result = convert(&parsed, form)?;
                for expr in [result.canonical(), result.minimized()] {
                    let converted = TruthTable::build(expr, parsed.variables())?;
                    assert_eq!(converted.outputs(), table.outputs(), "{} of {}", form, text);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn expansion_limit() -> Result<(), BolexError> {
        let text = (0..13)
            .map(|i| {
                let a = (b'A' + i) as char;
                let b = (b'a' + i) as char;
                format!("({} + {})", a, b)
            })
            .collect::<String>();
        let parsed = ParsedExpression::parse(&text)?;
        let distributed = Distribution::from_expr(parsed.ast(), true, "SOP expansion");
        assert!(matches!(distributed, Err(BolexError::TooManyTerms { .. })));
        Ok(())
    }

    #[test]
    fn form_names() {
        assert_eq!("SOP".parse::<TargetForm>().ok(), Some(TargetForm::Sop));
        assert_eq!("pos".parse::<TargetForm>().ok(), Some(TargetForm::Pos));
        assert!(matches!(
            "cnf".parse::<TargetForm>(),
            Err(BolexError::UnsupportedMethod(_))
        ));
    }
}
