//! Some helper functions

use crate::BolexError;

/// Widest reflected Gray code generated by [gray_code]
pub const MAX_GRAY_BITS: usize = 8;

/// Standard reflected Gray code on ```bits``` bits, as strings of 0 and 1.
///
/// ```code(1) = ["0", "1"]``` and ```code(k)``` is ```"0" + code(k-1)``` followed by the
/// reversed ```"1" + code(k-1)```. Consecutive entries, including the last and first ones,
/// differ in exactly one bit.
///
/// ```
/// # use bolex::tools::gray_code;
/// assert_eq!(gray_code(2).unwrap(), ["00", "01", "11", "10"]);
/// ```
///
/// The recursion depth is the number of bits, which is bounded by [MAX_GRAY_BITS].
pub fn gray_code(bits: usize) -> Result<Vec<String>, BolexError> {
    if bits > MAX_GRAY_BITS {
        return Err(BolexError::TooComplex {
            what: "Gray code width",
            found: bits,
            limit: MAX_GRAY_BITS,
        });
    }
    Ok(reflected(bits))
}

fn reflected(bits: usize) -> Vec<String> {
    match bits {
        0 => vec![String::new()],
        1 => vec!["0".to_string(), "1".to_string()],
        _ => {
            let previous = reflected(bits - 1);
            let low = previous.iter().map(|c| format!("0{}", c));
            let high = previous.iter().rev().map(|c| format!("1{}", c));
            low.chain(high).collect()
        }
    }
}

/// Value of the bit associated to the variable at ```position``` in an index over ```width``` variables.
///
/// The first variable is the most significant bit.
pub fn variable_bit(index: usize, position: usize, width: usize) -> bool {
    (index >> (width - 1 - position)) & 1 == 1
}

/// Mask selecting the bit of the variable at ```position``` among ```width``` variables
pub fn variable_mask(position: usize, width: usize) -> u32 {
    1 << (width - 1 - position)
}

/// Decreasing powers of two, from the largest one not above ```n``` down to 1
pub fn powers_of_two_down_from(n: usize) -> impl Iterator<Item = usize> {
    let top = match n {
        0 => 0,
        _ => usize::BITS - 1 - n.leading_zeros(),
    };
    (0..=top).rev().map(|p| 1usize << p).filter(move |_| n > 0)
}

#[cfg(test)]
mod tests {
    use crate::tools::*;

    #[test]
    fn reflected_gray_code() {
        assert_eq!(gray_code(1).unwrap(), ["0", "1"]);
        let code = gray_code(3).unwrap();
        assert_eq!(
            code,
            ["000", "001", "011", "010", "110", "111", "101", "100"]
        );
        for i in 0..code.len() {
            let a = usize::from_str_radix(&code[i], 2).unwrap();
            let b = usize::from_str_radix(&code[(i + 1) % code.len()], 2).unwrap();
            assert_eq!((a ^ b).count_ones(), 1);
        }
        assert!(gray_code(MAX_GRAY_BITS + 1).is_err());
    }

    #[test]
    fn bits() {
        assert!(variable_bit(0b100, 0, 3));
        assert!(!variable_bit(0b100, 2, 3));
        assert_eq!(variable_mask(0, 3), 0b100);
        assert_eq!(powers_of_two_down_from(12).collect::<Vec<_>>(), [8, 4, 2, 1]);
        assert_eq!(powers_of_two_down_from(0).count(), 0);
    }
}
