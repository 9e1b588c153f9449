use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seedwork::{DomainError, DomainResult};

/// Iranian phone number in national format: 11 digits starting with `0`.
///
/// Separators are dropped and the international prefixes `+98`, `0098` and
/// `98` are rewritten to the trunk prefix `0`, so `+98 912 345 6789` and
/// `09123456789` are the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

const NATIONAL_LENGTH: usize = 11;
const TEHRAN_PREFIX: &str = "021";
const MOBILE_PREFIX: &str = "09";

impl PhoneNumber {
    pub fn new(value: impl AsRef<str>) -> DomainResult<Self> {
        let raw = value.as_ref().trim();
        if raw.is_empty() {
            return Err(DomainError::validation("Phone number is required"));
        }

        let mut digits: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();

        if let Some(rest) = digits.strip_prefix('+') {
            digits = rest.to_string();
            if !digits.starts_with("98") {
                return Err(DomainError::validation(format!(
                    "'{raw}' is not an Iranian phone number"
                )));
            }
        }

        let national = if let Some(rest) = digits.strip_prefix("0098") {
            format!("0{rest}")
        } else if let Some(rest) = digits.strip_prefix("98").filter(|rest| rest.len() == NATIONAL_LENGTH - 1) {
            format!("0{rest}")
        } else {
            digits
        };

        if national.len() != NATIONAL_LENGTH
            || !national.starts_with('0')
            || !national.chars().all(|c| c.is_ascii_digit())
        {
            return Err(DomainError::validation(format!("'{raw}' is not a valid phone number")));
        }

        Ok(Self(national))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_mobile(&self) -> bool {
        self.0.starts_with(MOBILE_PREFIX)
    }

    pub fn is_tehran_number(&self) -> bool {
        self.0.starts_with(TEHRAN_PREFIX)
    }

    /// Three-digit area code of a landline; mobiles have none
    pub fn area_code(&self) -> Option<&str> {
        if self.is_mobile() {
            None
        } else {
            Some(&self.0[..3])
        }
    }

    /// E.164 form, e.g. `+989123456789`
    pub fn international(&self) -> String {
        format!("+98{}", &self.0[1..])
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_international_forms() {
        for input in ["09123456789", "+98 912 345 6789", "0098-912-345-6789", "989123456789", "(0912) 345.6789"] {
            assert_eq!(PhoneNumber::new(input).unwrap().as_str(), "09123456789", "{input}");
        }
    }

    #[test]
    fn test_rejects_invalid_numbers() {
        for input in ["", "12345", "0912345678", "091234567890", "+1 212 555 0100", "0912abc6789", "19123456789"] {
            assert!(
                matches!(PhoneNumber::new(input), Err(DomainError::Validation(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_mobile_and_landline_classification() {
        let mobile = PhoneNumber::new("09351234567").unwrap();
        assert!(mobile.is_mobile());
        assert!(!mobile.is_tehran_number());
        assert_eq!(mobile.area_code(), None);
        assert_eq!(mobile.international(), "+989351234567");

        let tehran = PhoneNumber::new("021-88776655").unwrap();
        assert!(!tehran.is_mobile());
        assert!(tehran.is_tehran_number());
        assert_eq!(tehran.area_code(), Some("021"));

        let isfahan = PhoneNumber::new("03132223344").unwrap();
        assert!(!isfahan.is_tehran_number());
        assert_eq!(isfahan.area_code(), Some("031"));
    }

    #[test]
    fn test_serde_uses_validating_constructor() {
        let phone: PhoneNumber = serde_json::from_str("\"+989121112233\"").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"09121112233\"");
        assert!(serde_json::from_str::<PhoneNumber>("\"123\"").is_err());
    }
}
