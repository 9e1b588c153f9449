use chrono::NaiveDate;

use crate::domain::value_objects::{Address, Email, NationalCode, PhoneNumber};
use crate::seedwork::DomainCommand;

// ============================================================================
// Customer Domain Commands
// ============================================================================

/// Input for `Customer::register`
#[derive(Debug, Clone)]
pub struct RegisterCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone_number: Option<PhoneNumber>,
    pub mobile_number: Option<PhoneNumber>,
    pub national_code: Option<NationalCode>,
    pub date_of_birth: Option<NaiveDate>,
    pub registered_by: String,
}

#[derive(Debug, Clone)]
pub enum CustomerCommand {
    Activate {
        performed_by: String,
    },
    Deactivate {
        reason: Option<String>,
        performed_by: String,
    },
    Verify {
        performed_by: String,
    },
    UpgradeToPremium {
        performed_by: String,
    },
    Suspend {
        reason: String,
        performed_by: String,
    },
    Block {
        reason: String,
        performed_by: String,
    },
    Delete {
        performed_by: String,
    },
    UpdateContactInfo {
        email: Email,
        phone_number: Option<PhoneNumber>,
        mobile_number: Option<PhoneNumber>,
        performed_by: String,
    },
    ChangeAddress {
        address: Option<Address>,
        performed_by: String,
    },
    UpdateProfile {
        first_name: String,
        last_name: String,
        date_of_birth: Option<NaiveDate>,
        national_code: Option<NationalCode>,
        performed_by: String,
    },
}

impl CustomerCommand {
    pub fn performed_by(&self) -> &str {
        match self {
            CustomerCommand::Activate { performed_by }
            | CustomerCommand::Deactivate { performed_by, .. }
            | CustomerCommand::Verify { performed_by }
            | CustomerCommand::UpgradeToPremium { performed_by }
            | CustomerCommand::Suspend { performed_by, .. }
            | CustomerCommand::Block { performed_by, .. }
            | CustomerCommand::Delete { performed_by }
            | CustomerCommand::UpdateContactInfo { performed_by, .. }
            | CustomerCommand::ChangeAddress { performed_by, .. }
            | CustomerCommand::UpdateProfile { performed_by, .. } => performed_by,
        }
    }
}

impl DomainCommand for CustomerCommand {
    fn name(&self) -> &'static str {
        match self {
            CustomerCommand::Activate { .. } => "activate",
            CustomerCommand::Deactivate { .. } => "deactivate",
            CustomerCommand::Verify { .. } => "verify",
            CustomerCommand::UpgradeToPremium { .. } => "upgrade_to_premium",
            CustomerCommand::Suspend { .. } => "suspend",
            CustomerCommand::Block { .. } => "block",
            CustomerCommand::Delete { .. } => "delete",
            CustomerCommand::UpdateContactInfo { .. } => "update_contact_info",
            CustomerCommand::ChangeAddress { .. } => "change_address",
            CustomerCommand::UpdateProfile { .. } => "update_profile",
        }
    }
}
