use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TruthTableError {
    #[error("Truth table length {0} is not a power of two")]
    InvalidLength(usize),
    #[error("Invalid character '{0}' in truth table, expected '0' or '1'")]
    InvalidCharacter(char),
}

/// A completely specified single-output Boolean function.
///
/// Bit `i` holds the function value for the input assignment whose binary encoding is `i`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TruthTable {
    num_vars: usize,
    bits: Vec<bool>,
}

impl TruthTable {
    /// Parses a binary string with the most significant bit (highest input index) first.
    pub fn from_binary_string(s: &str) -> Result<Self, TruthTableError> {
        let len = s.chars().count();
        if len == 0 || !len.is_power_of_two() {
            return Err(TruthTableError::InvalidLength(len));
        }
        let bits = s
            .chars()
            .rev()
            .map(|ch| match ch {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(TruthTableError::InvalidCharacter(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            num_vars: len.trailing_zeros() as usize,
            bits,
        })
    }

    fn from_fn(num_vars: usize, f: impl Fn(usize) -> bool) -> Self {
        Self {
            num_vars,
            bits: (0..1usize << num_vars).map(f).collect(),
        }
    }

    pub fn identity() -> Self {
        Self::from_fn(1, |i| i == 1)
    }

    pub fn not() -> Self {
        Self::from_fn(1, |i| i == 0)
    }

    pub fn and() -> Self {
        Self::from_fn(2, |i| i == 3)
    }

    pub fn or() -> Self {
        Self::from_fn(2, |i| i != 0)
    }

    pub fn nand() -> Self {
        Self::from_fn(2, |i| i != 3)
    }

    pub fn nor() -> Self {
        Self::from_fn(2, |i| i == 0)
    }

    pub fn xor() -> Self {
        Self::from_fn(2, |i| i == 1 || i == 2)
    }

    pub fn xnor() -> Self {
        Self::from_fn(2, |i| i == 0 || i == 3)
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    /// Returns the function value at `index`, or `None` past the end of the table.
    pub fn bit(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }
}

impl FromStr for TruthTable {
    type Err = TruthTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_binary_string(s.trim())
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits.iter().rev() {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_string_is_read_most_significant_bit_first() {
        let tt: TruthTable = "1000".parse().unwrap();
        assert_eq!(tt.num_vars(), 2);
        assert_eq!(tt.bit(3), Some(true));
        assert_eq!(tt.bit(0), Some(false));
        assert_eq!(tt, TruthTable::and());
    }

    #[test]
    fn generators_render_as_expected_strings() {
        assert_eq!(TruthTable::identity().to_string(), "10");
        assert_eq!(TruthTable::not().to_string(), "01");
        assert_eq!(TruthTable::or().to_string(), "1110");
        assert_eq!(TruthTable::nand().to_string(), "0111");
        assert_eq!(TruthTable::nor().to_string(), "0001");
        assert_eq!(TruthTable::xor().to_string(), "0110");
        assert_eq!(TruthTable::xnor().to_string(), "1001");
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert_eq!(
            TruthTable::from_binary_string("101"),
            Err(TruthTableError::InvalidLength(3))
        );
        assert_eq!(
            TruthTable::from_binary_string("10x1"),
            Err(TruthTableError::InvalidCharacter('x'))
        );
        assert_eq!(
            TruthTable::from_binary_string(""),
            Err(TruthTableError::InvalidLength(0))
        );
    }

    #[test]
    fn bit_past_end_is_none() {
        assert_eq!(TruthTable::identity().bit(2), None);
    }
}
