// ============================================================================
// Shared Value Objects
// ============================================================================
//
// Immutable, compared structurally, validated at construction.
// Deserialization goes through the same constructors, so an invalid value
// cannot be smuggled in through a stored snapshot either.
//
// ============================================================================

pub mod address;
pub mod audit_info;
pub mod email;
pub mod national_code;
pub mod phone_number;

pub use address::{Address, AddressParts};
pub use audit_info::{AuditInfo, AuditInfoParts};
pub use email::Email;
pub use national_code::NationalCode;
pub use phone_number::PhoneNumber;
