//! Exhaustive evaluation of Boolean functions

use crate::*;

use log::debug;
use serde::Serialize;

/// Largest number of variables accepted by exhaustive enumerations
pub const MAX_TABLE_VARIABLES: usize = 10;

/// A row of a truth table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TruthRow {
    /// Position of the row in binary counting order
    pub index: usize,
    pub assignment: Assignment,
    pub output: bool,
}

/// The value of a Boolean function for every assignment of an ordered list of variables.
///
/// The rows follow the binary counting order where the first variable is the most significant bit.
/// The minterms (indices where the function is true) and the maxterms (the others) partition
/// the range of row indices.
///
/// ```
/// use bolex::{ParsedExpression, TruthTable};
/// # use bolex::BolexError;
/// # fn main() -> Result<(), BolexError> {
///
/// let parsed = ParsedExpression::parse("AB + AB'")?;
/// let table = TruthTable::from_parsed(&parsed)?;
/// assert_eq!(table.minterms(), [2, 3]);
/// assert_eq!(table.maxterms(), [0, 1]);
/// assert_eq!(table.canonical_sop().to_string(), "AB' + AB");
/// assert_eq!(table.canonical_pos().to_string(), "(A + B)(A + B')");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruthTable {
    variables: Vec<Variable>,
    rows: Vec<TruthRow>,
    minterms: Vec<usize>,
    maxterms: Vec<usize>,
}

impl TruthTable {
    /// Evaluate a function on all assignments of the given variables.
    ///
    /// Fails with a capacity error above [MAX_TABLE_VARIABLES] variables.
    pub fn build(function: &impl LogicFunction, variables: &[Variable]) -> Result<Self, BolexError> {
        BolexError::check_capacity("Truth table", variables.len(), MAX_TABLE_VARIABLES)?;
        let size = 1usize << variables.len();
        debug!("evaluating {} rows over {} variables", size, variables.len());

        let mut rows = Vec::with_capacity(size);
        let mut minterms = vec![];
        let mut maxterms = vec![];
        for index in 0..size {
            let state = State::from_index(index, variables);
            let output = function.eval(&state);
            match output {
                true => minterms.push(index),
                false => maxterms.push(index),
            }
            rows.push(TruthRow {
                index,
                assignment: state.assignment(variables),
                output,
            });
        }

        Ok(Self {
            variables: variables.to_vec(),
            rows,
            minterms,
            maxterms,
        })
    }

    /// Truth table of a parsed expression over its own variables
    pub fn from_parsed(parsed: &ParsedExpression) -> Result<Self, BolexError> {
        Self::build(parsed.ast(), parsed.variables())
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn rows(&self) -> &[TruthRow] {
        &self.rows
    }

    pub fn minterms(&self) -> &[usize] {
        &self.minterms
    }

    pub fn maxterms(&self) -> &[usize] {
        &self.maxterms
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The output column
    pub fn outputs(&self) -> Vec<bool> {
        self.rows.iter().map(|r| r.output).collect()
    }

    /// Test if the function is true for all rows
    pub fn is_tautology(&self) -> bool {
        self.maxterms.is_empty()
    }

    /// Test if the function is false for all rows
    pub fn is_contradiction(&self) -> bool {
        self.minterms.is_empty()
    }

    /// The product term matching a single row
    pub fn minterm_pattern(&self, index: usize) -> Pattern {
        let mut p = Pattern::default();
        let n = self.variables.len();
        for (position, var) in self.variables.iter().enumerate() {
            p.set(*var, tools::variable_bit(index, position, n));
        }
        p
    }

    /// The clause excluding a single row
    pub fn maxterm_pattern(&self, index: usize) -> Pattern {
        let mut p = self.minterm_pattern(index);
        p.negate_all_variables();
        p
    }

    /// Canonical sum of products: the OR of all minterm products, ```0``` without minterm
    pub fn canonical_sop(&self) -> Expr {
        Expr::join(
            Operator::Or,
            self.minterms
                .iter()
                .map(|m| self.minterm_pattern(*m).to_product()),
        )
    }

    /// Canonical product of sums: the AND of all maxterm sums, ```1``` without maxterm
    pub fn canonical_pos(&self) -> Expr {
        Expr::join(
            Operator::And,
            self.maxterms
                .iter()
                .map(|m| self.maxterm_pattern(*m).to_sum()),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::variable::parse_variable_list;
    use crate::*;

    use test_log::test;

    #[test]
    fn partition_of_rows() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("A(B + C') + D")?;
        let table = TruthTable::from_parsed(&parsed)?;
        assert_eq!(table.len(), 16);
        let mut all: Vec<usize> = table.minterms().to_vec();
        all.extend(table.maxterms());
        all.sort_unstable();
        assert_eq!(all, (0..16).collect::<Vec<_>>());
        for row in table.rows() {
            assert_eq!(row.assignment.len(), 4);
            assert_eq!(State::from_assignment(&row.assignment).to_index(table.variables()), row.index);
        }
        Ok(())
    }

    #[test]
    fn first_variable_is_most_significant() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("AB'")?;
        let table = TruthTable::from_parsed(&parsed)?;
        assert_eq!(table.minterms(), [2]);
        let a = parsed.variables()[0];
        assert_eq!(table.rows()[2].assignment[&a], true);
        Ok(())
    }

    #[test]
    fn canonical_forms_are_equivalent() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("A + B'C")?;
        let table = TruthTable::from_parsed(&parsed)?;
        let vars = table.variables().to_vec();
        let sop = TruthTable::build(&table.canonical_sop(), &vars)?;
        let pos = TruthTable::build(&table.canonical_pos(), &vars)?;
        assert_eq!(sop.outputs(), table.outputs());
        assert_eq!(pos.outputs(), table.outputs());
        Ok(())
    }

    #[test]
    fn constant_functions() -> Result<(), BolexError> {
        let vars = parse_variable_list("AB")?;
        let table = TruthTable::build(&Expr::from(false), &vars)?;
        assert!(table.is_contradiction());
        assert_eq!(table.canonical_sop().to_string(), "0");
        let table = TruthTable::build(&Expr::from(true), &vars)?;
        assert!(table.is_tautology());
        assert_eq!(table.canonical_pos().to_string(), "1");
        Ok(())
    }

    #[test]
    fn capacity() -> Result<(), BolexError> {
        let parsed = ParsedExpression::parse("ABCDEFGHIJK")?;
        assert!(matches!(
            TruthTable::from_parsed(&parsed),
            Err(BolexError::Capacity { variables: 11, limit: 10, .. })
        ));
        Ok(())
    }
}
