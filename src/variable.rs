//! Implementation for variables and sets of variables

use crate::BolexError;

use bit_set::BitSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// Number of distinct variables: the 26 upper-case then the 26 lower-case ASCII letters.
pub const MAX_VARIABLES: usize = 52;

/// A single Boolean variable named by an ASCII letter.
///
/// Internally the variable is a small integer UID: ```A..Z``` map to ```0..26``` and
/// ```a..z``` to ```26..52```. The natural order of variables is thus the order of their letters,
/// upper-case first, which is the order used for truth tables and Karnaugh maps.
///
/// ```
/// use bolex::Variable;
///
/// let a = Variable::try_from('A').unwrap();
/// let z = Variable::try_from('z').unwrap();
/// assert!(a < z);
/// assert_eq!(z.letter(), 'z');
/// assert!(Variable::try_from('3').is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Variable(pub(crate) u8);

impl Variable {
    /// Create the variable associated to a letter, if it is a valid name
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'A'..='Z' => Some(Self(c as u8 - b'A')),
            'a'..='z' => Some(Self(c as u8 - b'a' + 26)),
            _ => None,
        }
    }

    /// Return the internal integer UID
    pub fn uid(&self) -> usize {
        self.0 as usize
    }

    /// Return the letter naming this variable
    pub fn letter(&self) -> char {
        match self.0 {
            0..=25 => (b'A' + self.0) as char,
            _ => (b'a' + self.0 - 26) as char,
        }
    }

    fn from_uid(uid: usize) -> Self {
        debug_assert!(uid < MAX_VARIABLES);
        Self(uid as u8)
    }
}

impl TryFrom<char> for Variable {
    type Error = BolexError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Variable::from_letter(c).ok_or_else(|| BolexError::InvalidName(c.to_string()))
    }
}

impl FromStr for Variable {
    type Err = BolexError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Variable::try_from(c),
            _ => Err(BolexError::InvalidName(name.to_string())),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.letter())
    }
}

impl<'de> Deserialize<'de> for Variable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let c = char::deserialize(deserializer)?;
        Variable::from_letter(c)
            .ok_or_else(|| serde::de::Error::custom(format!("'{}' is not a variable name", c)))
    }
}

/// A set of selected variables with efficient bitwise operations.
///
/// A VarSet is an abstraction over [BitSet], providing a similar API.
/// Iteration follows the natural order of variables, so collecting a VarSet gives the
/// sorted and deduplicated list of variables used by the engine.
///
/// ```
/// use bolex::{Variable, VarSet};
///
/// let mut vs = VarSet::default();
/// vs.insert(Variable::try_from('C').unwrap());
/// vs.insert(Variable::try_from('A').unwrap());
/// vs.insert(Variable::try_from('C').unwrap());
///
/// let names: String = vs.iter().map(|v| v.letter()).collect();
/// assert_eq!(names, "AC");
/// ```
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct VarSet {
    pub(crate) variables: BitSet,
}

impl VarSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an iterator over the contained variables
    pub fn iter(&self) -> Iter {
        self.into_iter()
    }

    /// Add a variable to this set
    pub fn insert(&mut self, var: Variable) {
        self.variables.insert(var.uid());
    }

    /// Remove a variable from this set
    pub fn remove(&mut self, var: Variable) {
        self.variables.remove(var.uid());
    }

    /// Test if a specific variable is part of this set
    pub fn contains(&self, var: Variable) -> bool {
        self.variables.contains(var.uid())
    }

    /// Remove all variables from the other set
    pub fn difference_with(&mut self, vars: &Self) {
        self.variables.difference_with(&vars.variables);
    }

    /// Retain only the variables also included in the other set
    pub fn intersect_with(&mut self, vars: &Self) {
        self.variables.intersect_with(&vars.variables);
    }

    /// Add all variables from the other set
    pub fn union_with(&mut self, vars: &Self) {
        self.variables.union_with(&vars.variables);
    }

    /// Return true if this set contains all variables of the other set
    pub fn contains_all(&self, other: &Self) -> bool {
        self.variables.is_superset(&other.variables)
    }

    /// Return true if the two sets have no common variable
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.variables.is_disjoint(&other.variables)
    }

    /// Return the number of variables in this set
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// The ordered list of variables in this set
    pub fn to_vec(&self) -> Vec<Variable> {
        self.iter().collect()
    }
}

/// Iterator over the variables of a [VarSet], in natural order
pub struct Iter<'a> {
    inner: bit_set::Iter<'a, u32>,
}

impl Iterator for Iter<'_> {
    type Item = Variable;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Variable::from_uid)
    }
}

impl<'a> IntoIterator for &'a VarSet {
    type Item = Variable;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            inner: self.variables.iter(),
        }
    }
}

impl FromIterator<Variable> for VarSet {
    fn from_iter<I: IntoIterator<Item = Variable>>(iter: I) -> Self {
        let mut vs = VarSet::default();
        vs.extend(iter);
        vs
    }
}

impl<'a> FromIterator<&'a Variable> for VarSet {
    fn from_iter<I: IntoIterator<Item = &'a Variable>>(iter: I) -> Self {
        iter.into_iter().copied().collect()
    }
}

impl Extend<Variable> for VarSet {
    fn extend<T: IntoIterator<Item = Variable>>(&mut self, iter: T) {
        for v in iter {
            self.insert(v);
        }
    }
}

impl fmt::Display for VarSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for v in self {
            match first {
                true => first = false,
                false => write!(f, ", ")?,
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for VarSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Parse a list of variable names separated by spaces, commas or semicolons, or glued together
///
/// ```
/// use bolex::variable::parse_variable_list;
///
/// let vars = parse_variable_list("A, C;B").unwrap();
/// assert_eq!(vars.len(), 3);
/// assert_eq!(vars[2].letter(), 'B');
/// ```
pub fn parse_variable_list(s: &str) -> Result<Vec<Variable>, BolexError> {
    s.chars()
        .filter(|c| !matches!(c, ' ' | ',' | ';' | '\t'))
        .map(Variable::try_from)
        .collect()
}
