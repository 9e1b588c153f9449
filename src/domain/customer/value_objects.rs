use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Customer Value Objects
// ============================================================================
//
// Contact/identity value objects (Email, PhoneNumber, ...) are shared with
// other aggregates and live in domain::value_objects.
//
// ============================================================================

/// Customer lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerStatus {
    Pending,
    Active,
    Inactive,
    Suspended,
    Blocked,
    Verified,
    Premium,
    Regular,
    Deleted,
}

impl CustomerStatus {
    /// Statuses in which the customer may use the service
    pub fn is_active(self) -> bool {
        matches!(
            self,
            CustomerStatus::Active | CustomerStatus::Verified | CustomerStatus::Premium | CustomerStatus::Regular
        )
    }

    /// Verified, or beyond (premium requires verification)
    pub fn is_verified(self) -> bool {
        matches!(self, CustomerStatus::Verified | CustomerStatus::Premium)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerStatus::Pending => "Pending",
            CustomerStatus::Active => "Active",
            CustomerStatus::Inactive => "Inactive",
            CustomerStatus::Suspended => "Suspended",
            CustomerStatus::Blocked => "Blocked",
            CustomerStatus::Verified => "Verified",
            CustomerStatus::Premium => "Premium",
            CustomerStatus::Regular => "Regular",
            CustomerStatus::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        let active: Vec<_> = [
            CustomerStatus::Pending,
            CustomerStatus::Active,
            CustomerStatus::Inactive,
            CustomerStatus::Suspended,
            CustomerStatus::Blocked,
            CustomerStatus::Verified,
            CustomerStatus::Premium,
            CustomerStatus::Regular,
            CustomerStatus::Deleted,
        ]
        .into_iter()
        .filter(|s| s.is_active())
        .collect();

        assert_eq!(
            active,
            vec![
                CustomerStatus::Active,
                CustomerStatus::Verified,
                CustomerStatus::Premium,
                CustomerStatus::Regular
            ]
        );
    }
}
