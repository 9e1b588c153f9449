use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seedwork::{DomainError, DomainResult};

const LENGTH: usize = 10;

/// Iranian national identification code (10 digits, last one is a check digit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NationalCode(String);

impl NationalCode {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let code: String = value
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, '-' | ' '))
            .collect();

        if code.len() != LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!("National code must be {LENGTH} digits")));
        }

        let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();

        if digits.iter().all(|d| *d == digits[0]) {
            return Err(DomainError::validation("National code cannot be a single repeated digit"));
        }

        if !has_valid_check_digit(&digits) {
            return Err(DomainError::validation("National code check digit does not match"));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn has_valid_check_digit(digits: &[u32]) -> bool {
    let sum: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum();
    let remainder = sum % 11;
    let check = digits[9];

    if remainder < 2 {
        check == remainder
    } else {
        check == 11 - remainder
    }
}

impl TryFrom<String> for NationalCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NationalCode> for String {
    fn from(code: NationalCode) -> Self {
        code.0
    }
}

impl fmt::Display for NationalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes() {
        // remainder 2 -> check digit 9
        assert_eq!(NationalCode::new("0012345679").unwrap().as_str(), "0012345679");
        // remainder 1 -> check digit equals the remainder
        assert!(NationalCode::new("1234567891").is_ok());
        assert_eq!(NationalCode::new("001-234567-9").unwrap().as_str(), "0012345679");
    }

    #[test]
    fn test_invalid_codes() {
        for input in ["", "123", "00123456790", "001234567X", "0012345678", "1111111111", "0000000000"] {
            assert!(
                matches!(NationalCode::new(input), Err(DomainError::Validation(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
