use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::PhoneNumber;
use crate::seedwork::DomainCommand;
use super::value_objects::MfaType;

// ============================================================================
// MFA Domain Commands
// ============================================================================
//
// Random material is produced by the caller. Commands that touch the lock
// or usage timestamps carry their own clock reading.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreateMfaMethod {
    pub user_id: Uuid,
    pub mfa_type: MfaType,
    pub created_by: String,
}

#[derive(Debug, Clone)]
pub enum MfaCommand {
    SetTotpSecret { secret: String },
    SetPhoneNumber { phone_number: PhoneNumber },
    ReplaceBackupCodes { codes: Vec<String> },
    Enable { at: DateTime<Utc> },
    Disable { at: DateTime<Utc> },
    RecordFailedAttempt { at: DateTime<Utc> },
    RecordSuccessfulAttempt { at: DateTime<Utc> },
    UseBackupCode { code: String, at: DateTime<Utc> },
    Remove { removed_by: String, at: DateTime<Utc> },
}

impl DomainCommand for MfaCommand {
    fn name(&self) -> &'static str {
        match self {
            MfaCommand::SetTotpSecret { .. } => "set_totp_secret",
            MfaCommand::SetPhoneNumber { .. } => "set_phone_number",
            MfaCommand::ReplaceBackupCodes { .. } => "replace_backup_codes",
            MfaCommand::Enable { .. } => "enable",
            MfaCommand::Disable { .. } => "disable",
            MfaCommand::RecordFailedAttempt { .. } => "record_failed_attempt",
            MfaCommand::RecordSuccessfulAttempt { .. } => "record_successful_attempt",
            MfaCommand::UseBackupCode { .. } => "use_backup_code",
            MfaCommand::Remove { .. } => "remove",
        }
    }
}
