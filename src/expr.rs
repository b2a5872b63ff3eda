//! Boolean functions defined as expression trees

use core::ops::BitAnd;
use core::ops::BitOr;
use core::ops::Not;
use std::borrow::Cow;
use std::cmp::max;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::efmt::{ExprFormatter, InfixFormatter};
use crate::*;

/// A Boolean expression tree.
///
/// Represents a Boolean function as a tree where internal nodes are the classical Boolean operations
/// and leaves are individual variables or fixed Boolean values.
/// Trees are persistent: children are shared behind [Arc] pointers and every rewrite
/// builds new parent nodes instead of mutating existing ones.
///
/// Expressions overload the ```&```, ```|```, and ```!``` operators to facilitate their definition
/// as readable rust statements. Unlike parsed text, these operators build the tree as written,
/// without any simplification.
///
/// ```
/// use bolex::{Expr, LogicFunction, State, Variable};
///
/// let a = Variable::try_from('A').unwrap();
/// let b = Variable::try_from('B').unwrap();
///
/// let expr = a & !b;
/// assert_eq!(expr.to_string(), "AB'");
///
/// let mut state = State::default();
/// state.activate(a);
/// assert!(expr.eval(&state));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Expr {
    /// A single variable
    Variable(Variable),

    /// A fixed Boolean value
    Constant(bool),

    /// Negation of a sub-expression
    Not(Arc<Expr>),

    /// Conjunction: both children need to be true
    And(Arc<Expr>, Arc<Expr>),

    /// Disjunction: at least one child needs to be true
    Or(Arc<Expr>, Arc<Expr>),
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
/// Binary operators of expression trees
pub enum Operator {
    /// AND operator: both children need to be true
    And,
    /// OR operator: at least one child needs to be true
    Or,
}

/// Size metrics of an expression tree
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExprMetrics {
    /// Number of nodes in the tree
    pub complexity: usize,
    /// Number of NOT, AND and OR nodes
    pub operator_count: usize,
    /// Height of the tree, a leaf has a depth of 1
    pub depth: usize,
}

impl Expr {
    pub fn and(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::And(Arc::new(left.into()), Arc::new(right.into()))
    }

    pub fn or(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Or(Arc::new(left.into()), Arc::new(right.into()))
    }

    pub fn negate(e: impl Into<Expr>) -> Self {
        Expr::Not(Arc::new(e.into()))
    }

    /// A variable or its negation
    pub fn literal(var: Variable, value: bool) -> Self {
        match value {
            true => Expr::Variable(var),
            false => Expr::negate(var),
        }
    }

    /// Join a list of operands into a balanced chain.
    ///
    /// The first half of the operands goes to the left child, so that short chains are
    /// left-associative and long chains grow in logarithmic depth.
    /// An empty list gives the identity element of the operator.
    pub fn join(op: Operator, operands: impl IntoIterator<Item = Expr>) -> Self {
        let operands: Vec<Expr> = operands.into_iter().collect();
        Self::join_slice(op, &operands).unwrap_or(Expr::Constant(op.identity()))
    }

    fn join_slice(op: Operator, operands: &[Expr]) -> Option<Self> {
        match operands {
            [] => None,
            [e] => Some(e.clone()),
            _ => {
                let (left, right) = operands.split_at((operands.len() + 1) / 2);
                Some(op.apply(Self::join_slice(op, left)?, Self::join_slice(op, right)?))
            }
        }
    }

    /// Depth added by [Expr::join] on top of its deepest operand
    pub(crate) fn join_depth(operands: usize) -> usize {
        match operands {
            0 => 0,
            n => (usize::BITS - (n - 1).leading_zeros()) as usize,
        }
    }

    /// The binary operator at the root of this tree, if any
    pub fn operator(&self) -> Option<Operator> {
        match self {
            Expr::And(_, _) => Some(Operator::And),
            Expr::Or(_, _) => Some(Operator::Or),
            _ => None,
        }
    }

    /// The two children of a binary node
    pub fn children(&self) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::And(l, r) | Expr::Or(l, r) => Some((l, r)),
            _ => None,
        }
    }

    /// Flatten a chain of identical operators into the list of its operands.
    ///
    /// An expression with another root is its own single operand.
    pub fn operands(&self, op: Operator) -> Vec<&Expr> {
        let mut result = vec![];
        self.collect_operands(op, &mut result);
        result
    }

    fn collect_operands<'a>(&'a self, op: Operator, result: &mut Vec<&'a Expr>) {
        match self.children() {
            Some((l, r)) if self.operator() == Some(op) => {
                l.collect_operands(op, result);
                r.collect_operands(op, result);
            }
            _ => result.push(self),
        }
    }

    /// The variable and its sign if this expression is a literal
    pub fn as_literal(&self) -> Option<(Variable, bool)> {
        match self {
            Expr::Variable(v) => Some((*v, true)),
            Expr::Not(e) => match e.as_ref() {
                Expr::Variable(v) => Some((*v, false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the fixed value associated to this expression, or none if it is not fixed
    pub fn get_fixed(&self) -> Option<bool> {
        match self {
            Expr::Constant(b) => Some(*b),
            _ => None,
        }
    }

    /// Test if this expression is the negation of another one
    pub fn is_negation_of(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Not(e), _) if e.as_ref() == other => true,
            (_, Expr::Not(e)) if e.as_ref() == self => true,
            _ => false,
        }
    }

    /// Number of characters in the canonical notation.
    ///
    /// This is the length used to compare alternative forms of the same function.
    pub fn text_len(&self) -> usize {
        self.to_string().chars().count()
    }

    /// Compute the size metrics of the tree
    pub fn metrics(&self) -> ExprMetrics {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => ExprMetrics {
                complexity: 1,
                operator_count: 0,
                depth: 1,
            },
            Expr::Not(e) => e.metrics().wrap(None),
            Expr::And(l, r) | Expr::Or(l, r) => l.metrics().wrap(Some(&r.metrics())),
        }
    }

    /// Number of literal occurrences in the tree
    pub fn literal_count(&self) -> usize {
        match self {
            Expr::Variable(_) => 1,
            Expr::Constant(_) => 0,
            Expr::Not(e) => e.literal_count(),
            Expr::And(l, r) | Expr::Or(l, r) => l.literal_count() + r.literal_count(),
        }
    }

    pub(crate) fn fmt_with(&self, f: &mut dyn ExprFormatter) -> fmt::Result {
        self._fmt_expr(f, None)
    }

    fn _fmt_expr(&self, f: &mut dyn ExprFormatter, parent: Option<Operator>) -> fmt::Result {
        match self {
            Expr::Constant(b) => f.write_bool(*b),
            Expr::Variable(var) => f.write_variable(*var, true),
            Expr::Not(e) => match e.as_ref() {
                Expr::Variable(var) => f.write_variable(*var, false),
                inner => {
                    let atomic = matches!(inner, Expr::Constant(_) | Expr::Not(_));
                    f.start_negation(atomic)?;
                    inner._fmt_expr(f, None)?;
                    f.end_negation(atomic)
                }
            },
            Expr::And(l, r) => Self::_fmt_operation(f, Operator::And, l, r, parent),
            Expr::Or(l, r) => Self::_fmt_operation(f, Operator::Or, l, r, parent),
        }
    }

    fn _fmt_operation(
        f: &mut dyn ExprFormatter,
        op: Operator,
        l: &Expr,
        r: &Expr,
        parent: Option<Operator>,
    ) -> fmt::Result {
        f.start_operation(op, parent)?;
        l._fmt_expr(f, Some(op))?;
        f.sep_operation(op)?;
        r._fmt_expr(f, Some(op))?;
        f.end_operation(op, parent)
    }

    /// Propagate negations down the expression tree to obtain an equivalent NNF expression
    ///
    /// An expression is a NNF (Negation Normal Form) if all negations are on variables and not on operations.
    /// Negated constants are folded and double negations are removed.
    ///
    /// Return a Cow object: borrow the existing expression if it is already a NNF.
    pub fn nnf(&self) -> Cow<Self> {
        self.build_nnf(true)
    }

    fn build_nnf(&self, positive: bool) -> Cow<Self> {
        match self {
            Expr::Variable(_) => match positive {
                true => Cow::Borrowed(self),
                false => Cow::Owned(!self),
            },
            Expr::Constant(b) => match positive {
                true => Cow::Borrowed(self),
                false => Cow::Owned(Expr::Constant(!b)),
            },
            Expr::Not(e) => Cow::Owned(e.build_nnf(!positive).into_owned()),
            Expr::And(l, r) => self.build_nnf_operation(Operator::And, l, r, positive),
            Expr::Or(l, r) => self.build_nnf_operation(Operator::Or, l, r, positive),
        }
    }

    fn build_nnf_operation<'a>(
        &'a self,
        op: Operator,
        l: &'a Expr,
        r: &'a Expr,
        positive: bool,
    ) -> Cow<'a, Self> {
        let c0 = l.build_nnf(positive);
        let c1 = r.build_nnf(positive);
        if positive && matches!((&c0, &c1), (Cow::Borrowed(_), Cow::Borrowed(_))) {
            return Cow::Borrowed(self);
        }
        let op = match positive {
            true => op,
            false => op.dual(),
        };
        Cow::Owned(op.apply(c0.into_owned(), c1.into_owned()))
    }

    /// Compute the dual of this expression.
    ///
    /// The dual expression swaps:
    /// *  true and false
    /// * AND and OR
    pub fn dual(&self) -> Expr {
        match self {
            Expr::Constant(b) => Expr::Constant(!b),
            Expr::Variable(_) => self.clone(),
            Expr::Not(e) => Expr::negate(e.dual()),
            Expr::And(l, r) => Expr::or(l.dual(), r.dual()),
            Expr::Or(l, r) => Expr::and(l.dual(), r.dual()),
        }
    }
}

impl ExprMetrics {
    fn wrap(mut self, other: Option<&ExprMetrics>) -> Self {
        if let Some(o) = other {
            self.complexity += o.complexity;
            self.operator_count += o.operator_count;
            self.depth = max(self.depth, o.depth);
        }
        self.complexity += 1;
        self.operator_count += 1;
        self.depth += 1;
        self
    }
}

impl Operator {
    /// Define the priority of operators
    ///
    /// This priority controls the addition of necessary parenthesis when formatting expressions.
    pub fn priority(self) -> u8 {
        match self {
            Operator::And => 2,
            Operator::Or => 1,
        }
    }

    pub fn dual(self) -> Self {
        match self {
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
        }
    }

    /// The neutral constant: ```A·1 = A``` and ```A+0 = A```
    pub fn identity(self) -> bool {
        match self {
            Operator::And => true,
            Operator::Or => false,
        }
    }

    /// The absorbing constant: ```A·0 = 0``` and ```A+1 = 1```
    pub fn annihilator(self) -> bool {
        !self.identity()
    }

    /// Build the node joining two operands with this operator
    pub fn apply(self, e1: impl Into<Expr>, e2: impl Into<Expr>) -> Expr {
        match self {
            Operator::And => Expr::and(e1, e2),
            Operator::Or => Expr::or(e1, e2),
        }
    }
}

impl FromStr for Expr {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedExpression::parse(s).map(ParsedExpression::into_ast)
    }
}

impl From<&Expr> for Expr {
    fn from(e: &Expr) -> Self {
        e.clone()
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Constant(b)
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Expr::Variable(var)
    }
}

impl From<&Variable> for Expr {
    fn from(var: &Variable) -> Self {
        Expr::Variable(*var)
    }
}

impl From<Arc<Expr>> for Expr {
    fn from(r: Arc<Expr>) -> Self {
        Arc::try_unwrap(r).unwrap_or_else(|r| Expr::clone(&r))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operator::And => write!(f, "·"),
            Operator::Or => write!(f, "+"),
        }
    }
}

impl LogicFunction for Expr {
    /// Both operands of a binary node are always evaluated
    fn eval(&self, state: &State) -> bool {
        match self {
            Expr::Constant(b) => *b,
            Expr::Variable(var) => state.is_active(*var),
            Expr::Not(e) => !e.eval(state),
            Expr::And(l, r) => {
                let (b1, b2) = (l.eval(state), r.eval(state));
                b1 & b2
            }
            Expr::Or(l, r) => {
                let (b1, b2) = (l.eval(state), r.eval(state));
                b1 | b2
            }
        }
    }

    fn collect_variables(&self, variables: &mut VarSet) {
        match self {
            Expr::Constant(_) => (),
            Expr::Variable(var) => variables.insert(*var),
            Expr::Not(e) => e.collect_variables(variables),
            Expr::And(l, r) | Expr::Or(l, r) => {
                l.collect_variables(variables);
                r.collect_variables(variables);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ef = InfixFormatter::new(f);
        self.fmt_with(&mut ef)
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/* ************************************************************************************* */
/* ******************************   Operator overloading  ****************************** */
/* ************************************************************************************* */

impl Not for Expr {
    type Output = Self;
    fn not(self) -> Self::Output {
        Expr::negate(self)
    }
}

impl Not for &Expr {
    type Output = Expr;
    fn not(self) -> Self::Output {
        Expr::negate(self.clone())
    }
}

impl Not for Variable {
    type Output = Expr;
    fn not(self) -> Self::Output {
        Expr::negate(self)
    }
}

impl<T: Into<Expr>> BitAnd<T> for Expr {
    type Output = Expr;
    fn bitand(self, rhs: T) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl<T: Into<Expr>> BitAnd<T> for &Expr {
    type Output = Expr;
    fn bitand(self, rhs: T) -> Self::Output {
        Expr::and(self.clone(), rhs)
    }
}

impl<T: Into<Expr>> BitAnd<T> for Variable {
    type Output = Expr;
    fn bitand(self, rhs: T) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl<T: Into<Expr>> BitOr<T> for Expr {
    type Output = Self;
    fn bitor(self, rhs: T) -> Self::Output {
        Expr::or(self, rhs)
    }
}

impl<T: Into<Expr>> BitOr<T> for &Expr {
    type Output = Expr;
    fn bitor(self, rhs: T) -> Self::Output {
        Expr::or(self.clone(), rhs)
    }
}

impl<T: Into<Expr>> BitOr<T> for Variable {
    type Output = Expr;
    fn bitor(self, rhs: T) -> Self::Output {
        Expr::or(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use crate::variable::parse_variable_list;
    use crate::*;

    #[test]
    fn construct_and_display() -> Result<(), BolexError> {
        let vars = parse_variable_list("ABC")?;
        let (a, b, c) = (vars[0], vars[1], vars[2]);

        let expr = !(a | b);
        assert_eq!(expr.to_string(), "(A + B)'");

        let e = a | (b & true);
        assert_eq!(e.to_string(), "A + B1");

        let e = (a | c) & !b & false;
        assert_eq!(e.to_string(), "(A + C)B'0");

        let e: Expr = "A(B + C')".parse()?;
        assert_eq!(e, a & (b | !c));
        Ok(())
    }

    #[test]
    fn eval() -> Result<(), BolexError> {
        let vars = parse_variable_list("ABCDE")?;
        let e: Expr = "AB + C(D + E')".parse()?;

        assert!(e.eval(&State::from_index(0b11000, &vars)));
        assert!(e.eval(&State::from_index(0b00100, &vars)));
        assert!(!e.eval(&State::from_index(0b00101, &vars)));
        assert!(e.eval(&State::from_index(0b00111, &vars)));
        // absent variables are false
        assert!(!e.eval(&State::default()));
        Ok(())
    }

    #[test]
    fn metrics() -> Result<(), BolexError> {
        let e: Expr = "A + B'C".parse()?;
        let m = e.metrics();
        assert_eq!(m.complexity, 6);
        assert_eq!(m.operator_count, 3);
        assert_eq!(m.depth, 4);
        assert_eq!(e.literal_count(), 3);
        Ok(())
    }

    #[test]
    fn flatten_and_join() -> Result<(), BolexError> {
        let e: Expr = "A + (B + C) + DE".parse()?;
        let ops = e.operands(Operator::Or);
        assert_eq!(ops.len(), 4);
        let rebuilt = Expr::join(Operator::Or, ops.into_iter().cloned());
        assert_eq!(rebuilt.to_string(), "A + B + C + DE");
        assert_eq!(Expr::join(Operator::And, vec![]), Expr::Constant(true));

        let a = Expr::from(Variable::try_from('A')?);
        let chain = Expr::join(Operator::Or, vec![a; 1000]);
        assert_eq!(chain.operands(Operator::Or).len(), 1000);
        assert_eq!(chain.metrics().depth, 1 + Expr::join_depth(1000));
        assert_eq!(Expr::join_depth(1000), 10);
        assert_eq!(Expr::join_depth(3), 2);
        assert_eq!(Expr::join_depth(1), 0);
        Ok(())
    }

    #[test]
    fn nnf_and_dual() -> Result<(), BolexError> {
        let e: Expr = "(A(B + C'))'".parse()?;
        assert_eq!(e.nnf().to_string(), "A' + B'C");

        let e: Expr = "AB + C".parse()?;
        assert!(matches!(e.nnf(), std::borrow::Cow::Borrowed(_)));
        assert_eq!(e.dual().to_string(), "(A + B)C");
        Ok(())
    }
}
