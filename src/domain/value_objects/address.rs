use serde::{Deserialize, Serialize};
use std::fmt;

use crate::seedwork::{DomainError, DomainResult};

const POSTAL_CODE_LENGTH: usize = 10;
const TEHRAN: &str = "tehran";

/// Postal address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AddressParts")]
pub struct Address {
    street: String,
    city: String,
    province: String,
    postal_code: String,
    country: String,
}

/// Unvalidated input; goes through `Address::new` on deserialization
#[derive(Debug, Clone, Deserialize)]
pub struct AddressParts {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub province: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        province: impl Into<String>,
        postal_code: impl AsRef<str>,
        country: impl Into<String>,
    ) -> DomainResult<Self> {
        let street = required("Street", street.into())?;
        let city = required("City", city.into())?;
        let country = required("Country", country.into())?;
        let province = province.into().trim().to_string();

        let postal_code: String = postal_code
            .as_ref()
            .chars()
            .filter(|c| !matches!(c, '-' | ' '))
            .collect();
        if postal_code.len() != POSTAL_CODE_LENGTH || !postal_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "Postal code must be {POSTAL_CODE_LENGTH} digits"
            )));
        }

        Ok(Self {
            street,
            city,
            province,
            postal_code,
            country,
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn full_address(&self) -> String {
        let mut parts = vec![self.street.as_str(), self.city.as_str()];
        if !self.province.is_empty() && !self.province.eq_ignore_ascii_case(&self.city) {
            parts.push(self.province.as_str());
        }
        parts.push(self.postal_code.as_str());
        parts.push(self.country.as_str());
        parts.join(", ")
    }

    pub fn is_in_city(&self, city: &str) -> bool {
        self.city.eq_ignore_ascii_case(city.trim())
    }

    pub fn is_in_tehran(&self) -> bool {
        self.is_in_city(TEHRAN)
    }
}

fn required(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

impl TryFrom<AddressParts> for Address {
    type Error = DomainError;

    fn try_from(parts: AddressParts) -> Result<Self, Self::Error> {
        Self::new(parts.street, parts.city, parts.province, parts.postal_code, parts.country)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_address())
    }
}
