//! Implicants as pairs of bit masks over an ordered list of variables.

use crate::tools::variable_mask;
use crate::*;

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Widest implicant: the value and care masks are stored in 32 bits
pub const MAX_IMPLICANT_WIDTH: usize = 32;

/// A product term over an ordered list of variables, stored as two bit masks.
///
/// The care mask selects the fixed positions, the value gives their fixed values (it is always
/// included in the care mask). As for truth table rows, the first variable is the most
/// significant bit. An implicant covers all row indices matching its value on the care mask.
///
/// Implicants are displayed as strings with one character per variable: 0 or 1 for fixed
/// positions and - for free ones.
///
/// ```
/// use bolex::Implicant;
///
/// let a: Implicant = "10".parse().unwrap();
/// let b: Implicant = "11".parse().unwrap();
/// let merged = a.merge(&b).unwrap();
/// assert_eq!(merged.to_string(), "1-");
/// assert_eq!(merged.covered_minterms(), [2, 3]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Implicant {
    value: u32,
    care: u32,
    width: u8,
}

impl Implicant {
    /// The implicant covering a single row
    pub fn minterm(index: usize, width: usize) -> Self {
        let care = Self::full_mask(width);
        Self {
            value: index as u32 & care,
            care,
            width: width as u8,
        }
    }

    /// The implicant covering all rows
    pub fn free(width: usize) -> Self {
        Self {
            value: 0,
            care: 0,
            width: width as u8,
        }
    }

    fn full_mask(width: usize) -> u32 {
        match width {
            0 => 0,
            _ => u32::MAX >> (32 - width),
        }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn care(&self) -> u32 {
        self.care
    }

    /// Number of fixed positions
    pub fn literal_count(&self) -> usize {
        self.care.count_ones() as usize
    }

    /// Number of positive literals, used to group implicants in the Quine-McCluskey tables
    pub fn ones(&self) -> usize {
        self.value.count_ones() as usize
    }

    /// Test if a row index is covered
    pub fn covers(&self, index: usize) -> bool {
        (index as u32 & self.care) == self.value
    }

    /// Test if all rows covered by another implicant are covered by this one
    pub fn contains(&self, other: &Implicant) -> bool {
        (other.care & self.care) == self.care && (other.value & self.care) == self.value
    }

    /// Combine two implicants with the same free positions which differ on a single fixed position.
    ///
    /// The differing position becomes free in the result.
    pub fn merge(&self, other: &Implicant) -> Option<Implicant> {
        if self.care != other.care || self.width != other.width {
            return None;
        }
        let diff = self.value ^ other.value;
        if diff.count_ones() != 1 {
            return None;
        }
        Some(Implicant {
            value: self.value & !diff,
            care: self.care & !diff,
            width: self.width,
        })
    }

    /// Free one fixed position, given as a variable position
    pub fn expand(&self, position: usize) -> Implicant {
        let mask = variable_mask(position, self.width());
        Implicant {
            value: self.value & !mask,
            care: self.care & !mask,
            width: self.width,
        }
    }

    /// Test if a variable position is fixed
    pub fn is_fixed(&self, position: usize) -> bool {
        self.care & variable_mask(position, self.width()) != 0
    }

    /// All covered row indices, in increasing order
    pub fn covered_minterms(&self) -> Vec<usize> {
        (0..1usize << self.width)
            .filter(|i| self.covers(*i))
            .collect()
    }

    /// The equivalent pattern over the given variables
    pub fn to_pattern(&self, variables: &[Variable]) -> Pattern {
        let mut p = Pattern::default();
        let width = self.width();
        for (position, var) in variables.iter().enumerate().take(width) {
            let mask = variable_mask(position, width);
            if self.care & mask != 0 {
                p.set(*var, self.value & mask != 0);
            }
        }
        p
    }

    /// The product of fixed literals, ```1``` if no position is fixed
    pub fn to_product(&self, variables: &[Variable]) -> Expr {
        self.to_pattern(variables).to_product()
    }

    /// The sum of fixed literals, ```0``` if no position is fixed
    pub fn to_sum(&self, variables: &[Variable]) -> Expr {
        self.to_pattern(variables).to_sum()
    }
}

/// Sum of products of a list of implicants, ```0``` for the empty list
pub fn sum_of_products(implicants: &[Implicant], variables: &[Variable]) -> Expr {
    Expr::join(
        Operator::Or,
        implicants.iter().map(|i| i.to_product(variables)),
    )
}

/// Sort implicants for display: larger cubes first, then by the order of literals
pub(crate) fn sort_for_display(implicants: &mut [Implicant], variables: &[Variable]) {
    implicants.sort_by(|a, b| {
        a.literal_count().cmp(&b.literal_count()).then_with(|| {
            a.to_pattern(variables)
                .display_order(&b.to_pattern(variables))
        })
    });
}

impl fmt::Display for Implicant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self.width();
        for position in 0..width {
            let mask = variable_mask(position, width);
            let c = match (self.care & mask != 0, self.value & mask != 0) {
                (false, _) => '-',
                (true, true) => '1',
                (true, false) => '0',
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl FromStr for Implicant {
    type Err = BolexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() > MAX_IMPLICANT_WIDTH {
            return Err(BolexError::TooComplex {
                what: "implicant width",
                found: chars.len(),
                limit: MAX_IMPLICANT_WIDTH,
            });
        }
        let width = chars.len();
        let mut result = Implicant::free(width);
        for (position, c) in chars.into_iter().enumerate() {
            let mask = variable_mask(position, width);
            match c {
                '-' => (),
                '0' => result.care |= mask,
                '1' => {
                    result.care |= mask;
                    result.value |= mask;
                }
                _ => return Err(BolexError::InvalidName(s.to_string())),
            }
        }
        Ok(result)
    }
}

impl Serialize for Implicant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::implicants::sum_of_products;
    use crate::variable::parse_variable_list;
    use crate::*;

    #[test]
    fn parse_and_display() -> Result<(), BolexError> {
        let i: Implicant = "1-0".parse()?;
        assert_eq!(i.to_string(), "1-0");
        assert_eq!(i.literal_count(), 2);
        assert_eq!(i.covered_minterms(), [4, 6]);
        assert!("1x0".parse::<Implicant>().is_err());
        assert_eq!(Implicant::minterm(5, 3).to_string(), "101");
        Ok(())
    }

    #[test]
    fn merge_rules() -> Result<(), BolexError> {
        let a: Implicant = "1-0".parse()?;
        let b: Implicant = "1-1".parse()?;
        let c: Implicant = "0-1".parse()?;
        let d: Implicant = "10-".parse()?;
        assert_eq!(a.merge(&b), Some("1--".parse()?));
        // two differing positions
        assert_eq!(a.merge(&c), None);
        // different free positions
        assert_eq!(a.merge(&d), None);
        Ok(())
    }

    #[test]
    fn containment_and_expansion() -> Result<(), BolexError> {
        let wide: Implicant = "1--".parse()?;
        let narrow: Implicant = "1-0".parse()?;
        assert!(wide.contains(&narrow));
        assert!(!narrow.contains(&wide));
        assert_eq!(narrow.expand(2), wide);
        assert!(narrow.is_fixed(0));
        assert!(!narrow.is_fixed(1));
        Ok(())
    }

    #[test]
    fn to_expressions() -> Result<(), BolexError> {
        let vars = parse_variable_list("ABC")?;
        let i: Implicant = "1-0".parse()?;
        assert_eq!(i.to_product(&vars).to_string(), "AC'");
        assert_eq!(i.to_sum(&vars).to_string(), "A + C'");
        assert_eq!(Implicant::free(3).to_product(&vars).to_string(), "1");

        let sop = sum_of_products(&["1-0".parse()?, "-11".parse()?], &vars);
        assert_eq!(sop.to_string(), "AC' + BC");
        assert_eq!(sum_of_products(&[], &vars).to_string(), "0");
        Ok(())
    }
}
