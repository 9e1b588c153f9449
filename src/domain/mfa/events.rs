use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::PhoneNumber;
use crate::seedwork::DomainEvent;
use super::value_objects::MfaType;

// ============================================================================
// MFA Domain Events
// ============================================================================
//
// Secret material (TOTP secret, backup codes) is carried in memory so the
// aggregate can apply it, but never serialized into published envelopes.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum MfaEvent {
    Created(MfaMethodCreated),
    TotpSecretGenerated(MfaTotpSecretGenerated),
    PhoneNumberSet(MfaPhoneNumberSet),
    BackupCodesGenerated(MfaBackupCodesGenerated),
    Enabled(MfaMethodEnabled),
    Disabled(MfaMethodDisabled),
    AttemptFailed(MfaAttemptFailed),
    AttemptSucceeded(MfaAttemptSucceeded),
    BackupCodeUsed(MfaBackupCodeUsed),
    Removed(MfaMethodRemoved),
}

impl DomainEvent for MfaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            MfaEvent::Created(_) => "MfaMethodCreated",
            MfaEvent::TotpSecretGenerated(_) => "MfaTotpSecretGenerated",
            MfaEvent::PhoneNumberSet(_) => "MfaPhoneNumberSet",
            MfaEvent::BackupCodesGenerated(_) => "MfaBackupCodesGenerated",
            MfaEvent::Enabled(_) => "MfaMethodEnabled",
            MfaEvent::Disabled(_) => "MfaMethodDisabled",
            MfaEvent::AttemptFailed(_) => "MfaAttemptFailed",
            MfaEvent::AttemptSucceeded(_) => "MfaAttemptSucceeded",
            MfaEvent::BackupCodeUsed(_) => "MfaBackupCodeUsed",
            MfaEvent::Removed(_) => "MfaMethodRemoved",
        }
    }

    fn aggregate_id(&self) -> Uuid {
        match self {
            MfaEvent::Created(e) => e.mfa_method_id,
            MfaEvent::TotpSecretGenerated(e) => e.mfa_method_id,
            MfaEvent::PhoneNumberSet(e) => e.mfa_method_id,
            MfaEvent::BackupCodesGenerated(e) => e.mfa_method_id,
            MfaEvent::Enabled(e) => e.mfa_method_id,
            MfaEvent::Disabled(e) => e.mfa_method_id,
            MfaEvent::AttemptFailed(e) => e.mfa_method_id,
            MfaEvent::AttemptSucceeded(e) => e.mfa_method_id,
            MfaEvent::BackupCodeUsed(e) => e.mfa_method_id,
            MfaEvent::Removed(e) => e.mfa_method_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MfaEvent::Created(e) => e.occurred_at,
            MfaEvent::TotpSecretGenerated(e) => e.occurred_at,
            MfaEvent::PhoneNumberSet(e) => e.occurred_at,
            MfaEvent::BackupCodesGenerated(e) => e.occurred_at,
            MfaEvent::Enabled(e) => e.occurred_at,
            MfaEvent::Disabled(e) => e.occurred_at,
            MfaEvent::AttemptFailed(e) => e.occurred_at,
            MfaEvent::AttemptSucceeded(e) => e.occurred_at,
            MfaEvent::BackupCodeUsed(e) => e.occurred_at,
            MfaEvent::Removed(e) => e.occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaMethodCreated {
    pub mfa_method_id: Uuid,
    pub user_id: Uuid,
    pub mfa_type: MfaType,
    pub created_by: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaTotpSecretGenerated {
    pub mfa_method_id: Uuid,
    #[serde(skip)]
    pub secret: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaPhoneNumberSet {
    pub mfa_method_id: Uuid,
    pub phone_number: PhoneNumber,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaBackupCodesGenerated {
    pub mfa_method_id: Uuid,
    #[serde(skip)]
    pub codes: Vec<String>,
    pub count: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaMethodEnabled {
    pub mfa_method_id: Uuid,
    pub user_id: Uuid,
    pub mfa_type: MfaType,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaMethodDisabled {
    pub mfa_method_id: Uuid,
    pub user_id: Uuid,
    pub mfa_type: MfaType,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaAttemptFailed {
    pub mfa_method_id: Uuid,
    pub failed_attempts: u32,
    /// Set when this failure (re-)armed the lock
    pub locked_until: Option<DateTime<Utc>>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaAttemptSucceeded {
    pub mfa_method_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaBackupCodeUsed {
    pub mfa_method_id: Uuid,
    #[serde(skip)]
    pub code: String,
    pub remaining: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaMethodRemoved {
    pub mfa_method_id: Uuid,
    pub removed_by: String,
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_never_serialized() {
        let event = MfaEvent::BackupCodesGenerated(MfaBackupCodesGenerated {
            mfa_method_id: Uuid::now_v7(),
            codes: vec!["ABCD2345".to_string()],
            count: 1,
            occurred_at: Utc::now(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("ABCD2345"));
        assert!(json.contains("\"count\":1"));

        let restored: MfaEvent = serde_json::from_str(&json).unwrap();
        match restored {
            MfaEvent::BackupCodesGenerated(e) => assert!(e.codes.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
