//! One-time password code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpCodeError {
    /// The input is not exactly six characters long.
    #[error("otp code must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("otp code must contain only ASCII digits")]
    NonDigit,
}

/// A six-digit, zero-padded one-time password code.
///
/// Comparison is an exact full-string match, so `PartialEq` is the
/// verification primitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const DIGITS: usize = 6;

    /// Parse an `OtpCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.len() != Self::DIGITS {
            return Err(OtpCodeError::WrongLength {
                expected: Self::DIGITS,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build a zero-padded code from a numeric value below 1,000,000.
    ///
    /// # Panics
    ///
    /// Debug-asserts that the value fits in six digits.
    #[must_use]
    pub fn from_number(n: u32) -> Self {
        debug_assert!(n < 1_000_000);
        Self(format!("{n:06}"))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OtpCode {
    type Err = OtpCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(OtpCode::parse("123456").is_ok());
        assert!(OtpCode::parse("000000").is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            OtpCode::parse("12345"),
            Err(OtpCodeError::WrongLength { .. })
        ));
        assert!(matches!(
            OtpCode::parse("1234567"),
            Err(OtpCodeError::WrongLength { .. })
        ));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            OtpCode::parse("12a456"),
            Err(OtpCodeError::NonDigit)
        ));
    }

    #[test]
    fn test_from_number_zero_pads() {
        assert_eq!(OtpCode::from_number(7).as_str(), "000007");
        assert_eq!(OtpCode::from_number(123_456).as_str(), "123456");
    }

    #[test]
    fn test_exact_match_comparison() {
        let stored = OtpCode::parse("123456").unwrap();
        assert_eq!(stored, OtpCode::parse("123456").unwrap());
        assert_ne!(stored, OtpCode::parse("000000").unwrap());
    }
}
