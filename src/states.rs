use crate::variable::Iter;
use crate::{VarSet, Variable};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::FromIterator;

/// An explicit assignment, as reported in output records: each listed variable with its value.
pub type Assignment = BTreeMap<Variable, bool>;

/// A state defined by the set of true variables, the others are implicitly false.
///
/// This is the evaluation context of every Boolean function in the engine: a variable which is
/// not part of the state evaluates to ```false```.
///
/// States are usually derived from the index of a row in a truth table, where the first variable
/// of the ordered list is the most significant bit.
///
/// ```
/// use bolex::{State, Variable};
/// use bolex::variable::parse_variable_list;
///
/// let vars = parse_variable_list("ABC").unwrap();
/// let state = State::from_index(0b101, &vars);
///
/// assert!(state.is_active(vars[0]));
/// assert!(!state.is_active(vars[1]));
/// assert!(state.is_active(vars[2]));
/// assert_eq!(state.to_index(&vars), 0b101);
/// ```
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct State {
    pub(crate) active: VarSet,
}

impl State {
    /// Build the state associated to a row index over an ordered list of variables
    pub fn from_index(index: usize, variables: &[Variable]) -> Self {
        let n = variables.len();
        variables
            .iter()
            .enumerate()
            .filter(|(i, _)| (index >> (n - 1 - i)) & 1 == 1)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Build a state from an explicit assignment, keeping the variables set to true
    pub fn from_assignment(assignment: &Assignment) -> Self {
        assignment
            .iter()
            .filter(|(_, b)| **b)
            .map(|(v, _)| *v)
            .collect()
    }

    /// Compute the row index of this state over an ordered list of variables
    pub fn to_index(&self, variables: &[Variable]) -> usize {
        variables
            .iter()
            .fold(0, |idx, v| (idx << 1) | self.is_active(*v) as usize)
    }

    /// Make the given variable true in this state
    pub fn activate(&mut self, var: Variable) {
        self.active.insert(var);
    }

    /// Make the given variable false in this state
    pub fn disable(&mut self, var: Variable) {
        self.active.remove(var);
    }

    /// Set the value of a variable
    pub fn set(&mut self, var: Variable, value: bool) {
        match value {
            true => self.activate(var),
            false => self.disable(var),
        }
    }

    /// Flip the value of a variable
    pub fn flip(&mut self, var: Variable) {
        self.set(var, !self.is_active(var));
    }

    /// Test if a specific variable is true in this state
    pub fn is_active(&self, var: Variable) -> bool {
        self.active.contains(var)
    }

    pub fn active(&self) -> &VarSet {
        &self.active
    }

    /// Iterate over the set of true variables
    pub fn iter_active(&self) -> Iter {
        self.active.iter()
    }

    /// Explicit assignment of the listed variables
    pub fn assignment(&self, variables: &[Variable]) -> Assignment {
        variables.iter().map(|v| (*v, self.is_active(*v))).collect()
    }
}

impl From<VarSet> for State {
    fn from(active: VarSet) -> Self {
        Self { active }
    }
}

impl FromIterator<Variable> for State {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        Self::from(VarSet::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = Variable;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.active.iter()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.active)
    }
}

#[cfg(test)]
mod tests {
    use crate::variable::parse_variable_list;
    use crate::*;

    #[test]
    fn index_roundtrip() {
        let vars = parse_variable_list("ABCD").unwrap();
        for idx in 0..16 {
            let state = State::from_index(idx, &vars);
            assert_eq!(state.to_index(&vars), idx);
        }
        let state = State::from_index(0b1000, &vars);
        assert_eq!(format!("{}", state), "{A}");
    }

    #[test]
    fn assignment_keeps_false_values() {
        let vars = parse_variable_list("AB").unwrap();
        let mut state = State::default();
        state.activate(vars[1]);
        let assignment = state.assignment(&vars);
        assert_eq!(assignment.get(&vars[0]), Some(&false));
        assert_eq!(assignment.get(&vars[1]), Some(&true));
        assert_eq!(State::from_assignment(&assignment), state);

        state.flip(vars[0]);
        state.flip(vars[1]);
        assert!(state.is_active(vars[0]));
        assert!(!state.is_active(vars[1]));
    }
}
