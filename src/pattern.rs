use crate::*;

use std::fmt;

/// A conjunction of literals defined by sets of true and false variables, the others are free.
///
/// They are represented as a pair of [VarSet] to store positive and negative variables.
/// In a well-formed pattern, a variable should not be constrained to both values,
/// i.e. the intersection of both bitsets should be empty. Distributing a product over
/// a sum can create such conflicts: a conflicting pattern is a contradiction.
///
/// A pattern is read as a product term (```AB'```) in sums of products, and the same
/// literal sets are read as a sum (```A + B'```) for the clauses of a product of sums.
///
/// A Pattern can be parsed from strings where the position in the string defines the
/// variable in a given list and the character defines the restriction: - for free, 0 for false, 1 for true.
///
/// ```
/// use bolex::Pattern;
/// use bolex::variable::parse_variable_list;
///
/// let vars = parse_variable_list("ABC").unwrap();
/// let p = Pattern::parse_with_variables("1-0", &vars).unwrap();
/// assert_eq!(p.to_string(), "AC'");
/// assert_eq!(p.to_sum().to_string(), "A + C'");
/// ```
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Pattern {
    pub(crate) positive: VarSet,
    pub(crate) negative: VarSet,
}

impl Pattern {
    /// Create a pattern from the two inner sets of fixed variables
    pub fn with(positive: VarSet, negative: VarSet) -> Self {
        Self { positive, negative }
    }

    /// Create a pattern with a single literal
    pub fn literal(var: Variable, value: bool) -> Self {
        let mut p = Pattern::default();
        p.set(var, value);
        p
    }

    /// Parse a pattern using the specified variables
    pub fn parse_with_variables(descr: &str, variables: &[Variable]) -> Result<Self, BolexError> {
        let mut p = Pattern::default();
        let mut vars = variables.iter();
        for c in descr.chars() {
            match c {
                ' ' | '\t' => (),
                '-' => {
                    vars.next();
                }
                '0' | '1' => {
                    let var = vars
                        .next()
                        .ok_or_else(|| BolexError::InvalidName(descr.to_string()))?;
                    p.set(*var, c == '1');
                }
                _ => return Err(BolexError::InvalidName(descr.to_string())),
            };
        }
        Ok(p)
    }

    /// Fix a variable to a specific value.
    ///
    /// If it was fixed to the opposite value, the existing restriction is replaced by the new one.
    pub fn set(&mut self, var: Variable, value: bool) {
        if value {
            self.negative.remove(var);
            self.positive.insert(var);
        } else {
            self.positive.remove(var);
            self.negative.insert(var);
        }
    }

    /// Fix a variable to a specific value, even if it is already fixed at another.
    ///
    /// If it was fixed to the opposite value, a conflict is introduced
    pub fn set_ignoring_conflicts(&mut self, var: Variable, value: bool) {
        if value {
            self.positive.insert(var);
        } else {
            self.negative.insert(var);
        }
    }

    /// Test if a variable is fixed at a specific value in this pattern
    pub fn has_restriction(&self, var: Variable, value: bool) -> bool {
        if value {
            self.positive.contains(var)
        } else {
            self.negative.contains(var)
        }
    }

    /// Test if some variable is fixed to both values
    pub fn has_conflict(&self) -> bool {
        !self.positive.is_disjoint(&self.negative)
    }

    /// Test if no variable is fixed
    pub fn is_free_pattern(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }

    /// Combine the restrictions of two patterns (the product of two terms).
    ///
    /// The result can contain conflicts.
    pub fn conjoin(&self, other: &Pattern) -> Pattern {
        let mut positive = self.positive.clone();
        positive.union_with(&other.positive);
        let mut negative = self.negative.clone();
        negative.union_with(&other.negative);
        Pattern::with(positive, negative)
    }

    /// Check if a state is contained in this pattern
    pub fn contains_state(&self, state: &State) -> bool {
        state.active.contains_all(&self.positive) && state.active.is_disjoint(&self.negative)
    }

    /// Check if this pattern shares at least one state with another pattern
    pub fn overlaps(&self, other: &Pattern) -> bool {
        self.positive.is_disjoint(&other.negative) && self.negative.is_disjoint(&other.positive)
    }

    /// Test if this pattern contains the given pattern.
    ///
    /// This is the case when all literals of this pattern are also literals of the other one.
    pub fn contains(&self, p: &Pattern) -> bool {
        p.positive.contains_all(&self.positive) && p.negative.contains_all(&self.negative)
    }

    /// Number of fixed variables
    pub fn literal_count(&self) -> usize {
        self.positive.len() + self.negative.len()
    }

    /// Iterate over the fixed variables and their values, in variable order
    pub fn iter_literals(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        let mut all = self.positive.clone();
        all.union_with(&self.negative);
        all.to_vec().into_iter().flat_map(move |v| {
            let pos = self.positive.contains(v).then_some((v, true));
            let neg = self.negative.contains(v).then_some((v, false));
            pos.into_iter().chain(neg)
        })
    }

    /// Product of the literals, ```1``` for the free pattern
    pub fn to_product(&self) -> Expr {
        Expr::join(
            Operator::And,
            self.iter_literals().map(|(v, b)| Expr::literal(v, b)),
        )
    }

    /// Sum of the literals, ```0``` for the free pattern
    pub fn to_sum(&self) -> Expr {
        Expr::join(
            Operator::Or,
            self.iter_literals().map(|(v, b)| Expr::literal(v, b)),
        )
    }

    /// Negate all literals
    pub fn negate_all_variables(&mut self) {
        std::mem::swap(&mut self.positive, &mut self.negative);
    }

    /// Order terms variable by variable: a positive literal comes before a complemented one,
    /// which comes before a free variable
    pub(crate) fn display_order(&self, other: &Pattern) -> std::cmp::Ordering {
        let mut all = self.positive.clone();
        all.union_with(&self.negative);
        all.union_with(&other.positive);
        all.union_with(&other.negative);
        let key = |p: &Pattern| {
            all.iter()
                .map(|v| match (p.positive.contains(v), p.negative.contains(v)) {
                    (true, _) => 0,
                    (false, true) => 1,
                    (false, false) => 2,
                })
                .collect::<Vec<u8>>()
        };
        key(self).cmp(&key(other))
    }
}

impl LogicFunction for Pattern {
    fn eval(&self, state: &State) -> bool {
        self.contains_state(state)
    }

    fn collect_variables(&self, variables: &mut VarSet) {
        variables.union_with(&self.positive);
        variables.union_with(&self.negative);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_product())
    }
}

impl From<Variable> for Pattern {
    fn from(var: Variable) -> Self {
        Pattern::literal(var, true)
    }
}

#[cfg(test)]
mod tests {
    use crate::variable::parse_variable_list;
    use crate::*;

    #[test]
    fn construct_and_display() -> Result<(), BolexError> {
        let vars = parse_variable_list("ABCD")?;
        let p = Pattern::parse_with_variables("-01-", &vars)?;
        assert_eq!(p.to_string(), "B'C");
        assert_eq!(p.literal_count(), 2);
        assert_eq!(Pattern::default().to_string(), "1");
        assert_eq!(Pattern::default().to_sum().to_string(), "0");
        Ok(())
    }

    #[test]
    fn conflicts() -> Result<(), BolexError> {
        let vars = parse_variable_list("AB")?;
        let p1 = Pattern::parse_with_variables("1-", &vars)?;
        let p2 = Pattern::parse_with_variables("01", &vars)?;
        assert!(!p1.overlaps(&p2));
        let product = p1.conjoin(&p2);
        assert!(product.has_conflict());
        assert_eq!(product.to_string(), "AA'B");
        Ok(())
    }

    #[test]
    fn contained() -> Result<(), BolexError> {
        let vars = parse_variable_list("ABC")?;
        let a = Pattern::parse_with_variables("1--", &vars)?;
        let ab = Pattern::parse_with_variables("11-", &vars)?;
        assert!(a.contains(&ab));
        assert!(!ab.contains(&a));
        assert!(a.eval(&State::from_index(0b100, &vars)));
        assert!(!ab.eval(&State::from_index(0b100, &vars)));
        Ok(())
    }

    #[test]
    fn ordering() -> Result<(), BolexError> {
        let vars = parse_variable_list("AB")?;
        let ab = Pattern::parse_with_variables("11", &vars)?;
        let nanb = Pattern::parse_with_variables("00", &vars)?;
        let anb = Pattern::parse_with_variables("10", &vars)?;
        assert_eq!(ab.display_order(&nanb), std::cmp::Ordering::Less);
        assert_eq!(ab.display_order(&anb), std::cmp::Ordering::Less);
        assert_eq!(anb.display_order(&nanb), std::cmp::Ordering::Less);
        Ok(())
    }
}
