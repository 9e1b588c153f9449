use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Address, Email, NationalCode, PhoneNumber};
use crate::seedwork::DomainEvent;
use super::value_objects::CustomerStatus;

// ============================================================================
// Customer Domain Events
// ============================================================================

/// Union type for all customer events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CustomerEvent {
    Registered(CustomerRegistered),
    StatusChanged(CustomerStatusChanged),
    ContactInfoUpdated(CustomerContactInfoUpdated),
    AddressChanged(CustomerAddressChanged),
    ProfileUpdated(CustomerProfileUpdated),
}

impl CustomerEvent {
    pub fn performed_by(&self) -> &str {
        match self {
            CustomerEvent::Registered(e) => &e.performed_by,
            CustomerEvent::StatusChanged(e) => &e.performed_by,
            CustomerEvent::ContactInfoUpdated(e) => &e.performed_by,
            CustomerEvent::AddressChanged(e) => &e.performed_by,
            CustomerEvent::ProfileUpdated(e) => &e.performed_by,
        }
    }
}

impl DomainEvent for CustomerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CustomerEvent::Registered(_) => "CustomerRegistered",
            CustomerEvent::StatusChanged(_) => "CustomerStatusChanged",
            CustomerEvent::ContactInfoUpdated(_) => "CustomerContactInfoUpdated",
            CustomerEvent::AddressChanged(_) => "CustomerAddressChanged",
            CustomerEvent::ProfileUpdated(_) => "CustomerProfileUpdated",
        }
    }

    fn aggregate_id(&self) -> Uuid {
        match self {
            CustomerEvent::Registered(e) => e.customer_id,
            CustomerEvent::StatusChanged(e) => e.customer_id,
            CustomerEvent::ContactInfoUpdated(e) => e.customer_id,
            CustomerEvent::AddressChanged(e) => e.customer_id,
            CustomerEvent::ProfileUpdated(e) => e.customer_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CustomerEvent::Registered(e) => e.occurred_at,
            CustomerEvent::StatusChanged(e) => e.occurred_at,
            CustomerEvent::ContactInfoUpdated(e) => e.occurred_at,
            CustomerEvent::AddressChanged(e) => e.occurred_at,
            CustomerEvent::ProfileUpdated(e) => e.occurred_at,
        }
    }
}

// Individual event types

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRegistered {
    pub customer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: Option<PhoneNumber>,
    pub mobile_number: Option<PhoneNumber>,
    pub national_code: Option<NationalCode>,
    pub date_of_birth: Option<NaiveDate>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

/// Raised by every lifecycle transition, including deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStatusChanged {
    pub customer_id: Uuid,
    pub new_status: CustomerStatus,
    pub previous_status: CustomerStatus,
    pub reason: Option<String>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerContactInfoUpdated {
    pub customer_id: Uuid,
    pub email: Email,
    pub phone_number: Option<PhoneNumber>,
    pub mobile_number: Option<PhoneNumber>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAddressChanged {
    pub customer_id: Uuid,
    /// `None` clears the address
    pub address: Option<Address>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfileUpdated {
    pub customer_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub national_code: Option<NationalCode>,
    pub performed_by: String,
    pub occurred_at: DateTime<Utc>,
}
