use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellRole {
    #[default]
    Normal,
    Input,
    Output,
    Empty,
}

/// Charge carried by a dangling bond, in units of the elementary charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChargeState {
    Negative,
    Neutral,
    Positive,
}

impl ChargeState {
    #[inline]
    pub fn sign(self) -> i8 {
        match self {
            ChargeState::Negative => -1,
            ChargeState::Neutral => 0,
            ChargeState::Positive => 1,
        }
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        f64::from(self.sign())
    }

    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign {
            -1 => Some(ChargeState::Negative),
            0 => Some(ChargeState::Neutral),
            1 => Some(ChargeState::Positive),
            _ => None,
        }
    }

    /// Digit of this state in a charge index (`sign + 1`).
    #[inline]
    pub fn digit(self) -> u64 {
        (self.sign() + 1) as u64
    }

    pub fn from_digit(digit: u64) -> Option<Self> {
        match digit {
            0 => Some(ChargeState::Negative),
            1 => Some(ChargeState::Neutral),
            2 => Some(ChargeState::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for ChargeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ChargeState::Negative => "-",
            ChargeState::Neutral => "0",
            ChargeState::Positive => "+",
        };
        f.write_str(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_follow_sign_offset_by_one() {
        for state in [
            ChargeState::Negative,
            ChargeState::Neutral,
            ChargeState::Positive,
        ] {
            assert_eq!(ChargeState::from_digit(state.digit()), Some(state));
            assert_eq!(ChargeState::from_sign(state.sign()), Some(state));
        }
        assert_eq!(ChargeState::Negative.digit(), 0);
        assert_eq!(ChargeState::Positive.digit(), 2);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert_eq!(ChargeState::from_digit(3), None);
        assert_eq!(ChargeState::from_sign(-2), None);
    }
}
