use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::PhoneNumber;
use crate::seedwork::{AggregateRoot, DomainError, DomainResult, Entity, EntityMetadata, FieldValue, Queryable};
use super::commands::{CreateMfaMethod, MfaCommand};
use super::events::*;
use super::value_objects::MfaType;

// ============================================================================
// MFA Method Aggregate
// ============================================================================
//
// Lifecycle:
//   created (disabled) -> type-specific setup -> enable <-> disable
//
// Attempt tracking:
//   MAX_FAILED_ATTEMPTS consecutive failures lock the method for LOCKOUT.
//   The lock is never lifted explicitly; it expires by clock comparison.
//   A successful attempt resets the counter and clears the lock.
//
// ============================================================================

pub const MAX_FAILED_ATTEMPTS: u32 = 5;
pub const LOCKOUT_MINUTES: i64 = 15;
pub const TOTP_SECRET_LENGTH: usize = 32;
pub const BACKUP_CODE_LENGTH: usize = 8;
pub const DEFAULT_BACKUP_CODES: usize = 10;

const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
// No 0/O or 1/I, codes are read off paper
const BACKUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn random_string(alphabet: &[u8], length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Trimmed upper-case pool; every code is BACKUP_CODE_LENGTH characters of
/// the backup alphabet and appears once
fn normalize_backup_codes(codes: &[String]) -> DomainResult<Vec<String>> {
    if codes.is_empty() {
        return Err(DomainError::validation("At least one backup code is required"));
    }

    let mut normalized: Vec<String> = Vec::with_capacity(codes.len());
    for code in codes {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != BACKUP_CODE_LENGTH || !code.bytes().all(|b| BACKUP_CODE_ALPHABET.contains(&b)) {
            return Err(DomainError::validation(format!(
                "Backup codes must be {BACKUP_CODE_LENGTH} characters from the backup code alphabet, got '{code}'"
            )));
        }
        if normalized.contains(&code) {
            return Err(DomainError::validation(format!("Duplicate backup code '{code}'")));
        }
        normalized.push(code);
    }
    Ok(normalized)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MfaMethod {
    meta: EntityMetadata,
    user_id: Uuid,
    mfa_type: MfaType,
    is_enabled: bool,
    totp_secret: Option<String>,
    phone_number: Option<PhoneNumber>,
    backup_codes: Vec<String>,
    failed_attempts: u32,
    locked_until: Option<DateTime<Utc>>,
    last_used_at: Option<DateTime<Utc>>,
    enabled_at: Option<DateTime<Utc>>,
    created_by: String,
}

impl MfaMethod {
    /// New, disabled method; returns the creation event
    pub fn create(input: CreateMfaMethod) -> DomainResult<(Self, Vec<MfaEvent>)> {
        if input.created_by.trim().is_empty() {
            return Err(DomainError::validation("CreatedBy is required"));
        }
        if input.user_id.is_nil() {
            return Err(DomainError::validation("UserId is required"));
        }

        let now = Utc::now();
        let created = MfaMethodCreated {
            mfa_method_id: Uuid::now_v7(),
            user_id: input.user_id,
            mfa_type: input.mfa_type,
            created_by: input.created_by.trim().to_string(),
            occurred_at: now,
        };

        let mut method = Self {
            meta: EntityMetadata::new(created.mfa_method_id, now),
            user_id: created.user_id,
            mfa_type: created.mfa_type,
            is_enabled: false,
            totp_secret: None,
            phone_number: None,
            backup_codes: Vec::new(),
            failed_attempts: 0,
            locked_until: None,
            last_used_at: None,
            enabled_at: None,
            created_by: created.created_by.clone(),
        };
        let event = MfaEvent::Created(created);
        method.apply(&event);

        tracing::debug!(
            mfa_method_id = %method.id(),
            mfa_type = %method.mfa_type,
            "MFA method created"
        );
        Ok((method, vec![event]))
    }

    // ========================================================================
    // Facts
    // ========================================================================

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn mfa_type(&self) -> MfaType {
        self.mfa_type
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn totp_secret(&self) -> Option<&str> {
        self.totp_secret.as_deref()
    }

    pub fn phone_number(&self) -> Option<&PhoneNumber> {
        self.phone_number.as_ref()
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn locked_until(&self) -> Option<DateTime<Utc>> {
        self.locked_until
    }

    pub fn last_used_at(&self) -> Option<DateTime<Utc>> {
        self.last_used_at
    }

    pub fn enabled_at(&self) -> Option<DateTime<Utc>> {
        self.enabled_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn remaining_backup_codes(&self) -> usize {
        self.backup_codes.len()
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Utc::now())
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Whether the type-specific setup needed to enable has been done
    pub fn is_set_up(&self) -> bool {
        match self.mfa_type {
            MfaType::Totp => self.totp_secret.is_some(),
            MfaType::Sms => self.phone_number.is_some(),
            MfaType::BackupCodes => !self.backup_codes.is_empty(),
            MfaType::Email | MfaType::HardwareKey => true,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Generate and store a fresh base32 TOTP secret
    pub fn generate_totp_secret(&mut self) -> DomainResult<(String, Vec<MfaEvent>)> {
        let secret = random_string(BASE32_ALPHABET, TOTP_SECRET_LENGTH);
        let events = self.execute(&MfaCommand::SetTotpSecret { secret: secret.clone() })?;
        Ok((secret, events))
    }

    pub fn set_phone_number(&mut self, phone_number: PhoneNumber) -> DomainResult<Vec<MfaEvent>> {
        self.execute(&MfaCommand::SetPhoneNumber { phone_number })
    }

    /// Replace the pool with `count` fresh codes and return them
    pub fn generate_backup_codes(&mut self, count: usize) -> DomainResult<(Vec<String>, Vec<MfaEvent>)> {
        let mut codes: Vec<String> = Vec::with_capacity(count);
        while codes.len() < count {
            let code = random_string(BACKUP_CODE_ALPHABET, BACKUP_CODE_LENGTH);
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        let events = self.execute(&MfaCommand::ReplaceBackupCodes { codes: codes.clone() })?;
        Ok((codes, events))
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn enable(&mut self) -> DomainResult<Vec<MfaEvent>> {
        self.execute(&MfaCommand::Enable { at: Utc::now() })
    }

    pub fn disable(&mut self) -> DomainResult<Vec<MfaEvent>> {
        self.execute(&MfaCommand::Disable { at: Utc::now() })
    }

    pub fn remove(&mut self, by: &str) -> DomainResult<Vec<MfaEvent>> {
        self.execute(&MfaCommand::Remove { removed_by: by.to_string(), at: Utc::now() })
    }

    // ========================================================================
    // Attempts
    // ========================================================================

    pub fn record_failed_attempt(&mut self) -> DomainResult<Vec<MfaEvent>> {
        self.record_failed_attempt_at(Utc::now())
    }

    pub fn record_failed_attempt_at(&mut self, at: DateTime<Utc>) -> DomainResult<Vec<MfaEvent>> {
        self.execute(&MfaCommand::RecordFailedAttempt { at })
    }

    pub fn record_successful_attempt(&mut self) -> DomainResult<Vec<MfaEvent>> {
        self.record_successful_attempt_at(Utc::now())
    }

    pub fn record_successful_attempt_at(&mut self, at: DateTime<Utc>) -> DomainResult<Vec<MfaEvent>> {
        self.execute(&MfaCommand::RecordSuccessfulAttempt { at })
    }

    /// Consume `code` if it is in the pool. A wrong code changes nothing.
    pub fn validate_backup_code(&mut self, code: &str) -> DomainResult<(bool, Vec<MfaEvent>)> {
        let events = self.execute(&MfaCommand::UseBackupCode {
            code: code.to_string(),
            at: Utc::now(),
        })?;
        Ok((!events.is_empty(), events))
    }

    // ========================================================================
    // Guards
    // ========================================================================

    fn ensure_not_removed(&self) -> DomainResult<()> {
        if self.meta.is_deleted() {
            return Err(DomainError::invalid_operation(format!(
                "MFA method {} has been removed",
                self.id()
            )));
        }
        Ok(())
    }

    fn ensure_type(&self, expected: MfaType, action: &str) -> DomainResult<()> {
        if self.mfa_type != expected {
            return Err(DomainError::invalid_operation(format!(
                "Cannot {action} on a {} method",
                self.mfa_type
            )));
        }
        Ok(())
    }

    fn ensure_enabled(&self, action: &str) -> DomainResult<()> {
        if !self.is_enabled {
            return Err(DomainError::invalid_operation(format!(
                "Cannot {action}: MFA method {} is not enabled",
                self.id()
            )));
        }
        Ok(())
    }
}

impl Entity for MfaMethod {
    fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }
}

impl AggregateRoot for MfaMethod {
    type Event = MfaEvent;
    type Command = MfaCommand;

    const AGGREGATE_TYPE: &'static str = "MfaMethod";

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.meta
    }

    fn handle_command(&self, command: &MfaCommand) -> DomainResult<Vec<MfaEvent>> {
        self.ensure_not_removed()?;
        let id = self.id();

        match command {
            MfaCommand::SetTotpSecret { secret } => {
                self.ensure_type(MfaType::Totp, "set a TOTP secret")?;
                if secret.len() != TOTP_SECRET_LENGTH || !secret.bytes().all(|b| BASE32_ALPHABET.contains(&b)) {
                    return Err(DomainError::validation("TOTP secret must be 32 base32 characters"));
                }
                Ok(vec![MfaEvent::TotpSecretGenerated(MfaTotpSecretGenerated {
                    mfa_method_id: id,
                    secret: secret.clone(),
                    occurred_at: Utc::now(),
                })])
            }

            MfaCommand::SetPhoneNumber { phone_number } => {
                self.ensure_type(MfaType::Sms, "set a phone number")?;
                if !phone_number.is_mobile() {
                    return Err(DomainError::validation(format!(
                        "SMS codes require a mobile number, got {phone_number}"
                    )));
                }
                Ok(vec![MfaEvent::PhoneNumberSet(MfaPhoneNumberSet {
                    mfa_method_id: id,
                    phone_number: phone_number.clone(),
                    occurred_at: Utc::now(),
                })])
            }

            MfaCommand::ReplaceBackupCodes { codes } => {
                self.ensure_type(MfaType::BackupCodes, "generate backup codes")?;
                let codes = normalize_backup_codes(codes)?;
                Ok(vec![MfaEvent::BackupCodesGenerated(MfaBackupCodesGenerated {
                    mfa_method_id: id,
                    count: codes.len(),
                    codes,
                    occurred_at: Utc::now(),
                })])
            }

            MfaCommand::Enable { at } => {
                if self.is_enabled {
                    return Err(DomainError::invalid_operation(format!("MFA method {id} is already enabled")));
                }
                if !self.is_set_up() {
                    return Err(DomainError::invalid_operation(format!(
                        "MFA method {id} must be set up before it is enabled ({})",
                        self.mfa_type
                    )));
                }
                Ok(vec![MfaEvent::Enabled(MfaMethodEnabled {
                    mfa_method_id: id,
                    user_id: self.user_id,
                    mfa_type: self.mfa_type,
                    occurred_at: *at,
                })])
            }

            MfaCommand::Disable { at } => {
                if !self.is_enabled {
                    return Err(DomainError::invalid_operation(format!("MFA method {id} is not enabled")));
                }
                Ok(vec![MfaEvent::Disabled(MfaMethodDisabled {
                    mfa_method_id: id,
                    user_id: self.user_id,
                    mfa_type: self.mfa_type,
                    occurred_at: *at,
                })])
            }

            MfaCommand::RecordFailedAttempt { at } => {
                self.ensure_enabled("record a failed attempt")?;
                let failed_attempts = self.failed_attempts.saturating_add(1);
                let locked_until =
                    (failed_attempts >= MAX_FAILED_ATTEMPTS).then(|| *at + Duration::minutes(LOCKOUT_MINUTES));
                Ok(vec![MfaEvent::AttemptFailed(MfaAttemptFailed {
                    mfa_method_id: id,
                    failed_attempts,
                    locked_until,
                    occurred_at: *at,
                })])
            }

            MfaCommand::RecordSuccessfulAttempt { at } => {
                self.ensure_enabled("record a successful attempt")?;
                Ok(vec![MfaEvent::AttemptSucceeded(MfaAttemptSucceeded {
                    mfa_method_id: id,
                    occurred_at: *at,
                })])
            }

            MfaCommand::UseBackupCode { code, at } => {
                self.ensure_type(MfaType::BackupCodes, "use a backup code")?;
                self.ensure_enabled("use a backup code")?;
                let normalized = code.trim().to_ascii_uppercase();
                if !self.backup_codes.contains(&normalized) {
                    return Ok(Vec::new());
                }
                Ok(vec![MfaEvent::BackupCodeUsed(MfaBackupCodeUsed {
                    mfa_method_id: id,
                    code: normalized,
                    remaining: self.backup_codes.len() - 1,
                    occurred_at: *at,
                })])
            }

            MfaCommand::Remove { removed_by, at } => {
                if removed_by.trim().is_empty() {
                    return Err(DomainError::validation("RemovedBy is required"));
                }
                Ok(vec![MfaEvent::Removed(MfaMethodRemoved {
                    mfa_method_id: id,
                    removed_by: removed_by.clone(),
                    occurred_at: *at,
                })])
            }
        }
    }

    fn apply_event(&mut self, event: &MfaEvent) {
        match event {
            MfaEvent::Created(_) => {}
            MfaEvent::TotpSecretGenerated(e) => {
                self.totp_secret = Some(e.secret.clone());
            }
            MfaEvent::PhoneNumberSet(e) => {
                self.phone_number = Some(e.phone_number.clone());
            }
            MfaEvent::BackupCodesGenerated(e) => {
                self.backup_codes = e.codes.clone();
            }
            MfaEvent::Enabled(e) => {
                self.is_enabled = true;
                self.enabled_at = Some(e.occurred_at);
            }
            MfaEvent::Disabled(_) => {
                self.is_enabled = false;
            }
            MfaEvent::AttemptFailed(e) => {
                self.failed_attempts = e.failed_attempts;
                if e.locked_until.is_some() {
                    self.locked_until = e.locked_until;
                }
            }
            MfaEvent::AttemptSucceeded(e) => {
                self.failed_attempts = 0;
                self.locked_until = None;
                self.last_used_at = Some(e.occurred_at);
            }
            MfaEvent::BackupCodeUsed(e) => {
                if let Some(index) = self.backup_codes.iter().position(|c| *c == e.code) {
                    self.backup_codes.remove(index);
                }
                self.last_used_at = Some(e.occurred_at);
            }
            MfaEvent::Removed(e) => {
                self.is_enabled = false;
                self.meta.mark_deleted(e.removed_by.clone(), e.occurred_at);
            }
        }
    }
}

impl Queryable for MfaMethod {
    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => self.id().into(),
            "user_id" => self.user_id.into(),
            "mfa_type" => self.mfa_type.as_str().into(),
            "is_enabled" => self.is_enabled.into(),
            "is_deleted" => self.is_deleted().into(),
            "failed_attempts" => self.failed_attempts.into(),
            "locked_until" => self.locked_until.into(),
            "last_used_at" => self.last_used_at.into(),
            "created_at" => self.meta.created_at().into(),
            "version" => self.version().into(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(mfa_type: MfaType) -> MfaMethod {
        MfaMethod::create(CreateMfaMethod {
            user_id: Uuid::now_v7(),
            mfa_type,
            created_by: "user".to_string(),
        })
        .unwrap()
        .0
    }

    fn enabled_totp() -> MfaMethod {
        let mut method = create(MfaType::Totp);
        method.generate_totp_secret().unwrap();
        method.enable().unwrap();
        method
    }

    #[test]
    fn test_created_disabled_at_version_one() {
        let (method, events) = MfaMethod::create(CreateMfaMethod {
            user_id: Uuid::now_v7(),
            mfa_type: MfaType::Sms,
            created_by: "user".to_string(),
        })
        .unwrap();

        assert!(!method.is_enabled());
        assert_eq!(method.version(), 1);
        assert_eq!(events.len(), 1);
        assert!(!method.is_set_up());
    }

    #[test]
    fn test_totp_secret_is_base32() {
        let mut method = create(MfaType::Totp);
        let (secret, events) = method.generate_totp_secret().unwrap();

        assert_eq!(secret.len(), 32);
        assert!(secret.bytes().all(|b| BASE32_ALPHABET.contains(&b)));
        assert_eq!(method.totp_secret(), Some(secret.as_str()));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_setup_must_match_type() {
        let mut sms = create(MfaType::Sms);
        assert!(matches!(sms.generate_totp_secret(), Err(DomainError::InvalidOperation(_))));
        assert!(matches!(sms.generate_backup_codes(5), Err(DomainError::InvalidOperation(_))));

        let landline = PhoneNumber::new("02188776655").unwrap();
        assert!(matches!(sms.set_phone_number(landline), Err(DomainError::Validation(_))));

        sms.set_phone_number(PhoneNumber::new("09121234567").unwrap()).unwrap();
        assert!(sms.is_set_up());
    }

    #[test]
    fn test_enable_requires_setup() {
        let mut method = create(MfaType::Totp);
        assert!(matches!(method.enable(), Err(DomainError::InvalidOperation(_))));

        method.generate_totp_secret().unwrap();
        method.enable().unwrap();
        assert!(method.is_enabled());
        assert!(method.enabled_at().is_some());
    }

    #[test]
    fn test_double_enable_fails() {
        let mut method = enabled_totp();
        let version = method.version();

        assert!(matches!(method.enable(), Err(DomainError::InvalidOperation(_))));
        assert_eq!(method.version(), version);
    }

    #[test]
    fn test_disable_never_enabled_fails() {
        let mut method = create(MfaType::Email);
        assert!(matches!(method.disable(), Err(DomainError::InvalidOperation(_))));

        method.enable().unwrap();
        method.disable().unwrap();
        assert!(!method.is_enabled());
        assert!(matches!(method.disable(), Err(DomainError::InvalidOperation(_))));
    }

    #[test]
    fn test_lock_boundary_with_simulated_time() {
        let mut method = enabled_totp();
        let start = Utc::now();

        for i in 0..4 {
            method.record_failed_attempt_at(start + Duration::seconds(i)).unwrap();
            assert!(!method.is_locked_at(start + Duration::seconds(i)));
        }

        let fifth = start + Duration::seconds(4);
        method.record_failed_attempt_at(fifth).unwrap();
        assert_eq!(method.failed_attempts(), 5);
        assert_eq!(method.locked_until(), Some(fifth + Duration::minutes(15)));

        assert!(method.is_locked_at(fifth + Duration::minutes(15) - Duration::seconds(1)));
        // Expires by comparison alone
        assert!(!method.is_locked_at(fifth + Duration::minutes(15)));
        assert_eq!(method.failed_attempts(), 5);
    }

    #[test]
    fn test_failures_past_threshold_rearm_lock() {
        let mut method = enabled_totp();
        let start = Utc::now();
        for _ in 0..5 {
            method.record_failed_attempt_at(start).unwrap();
        }

        let later = start + Duration::minutes(20);
        let events = method.record_failed_attempt_at(later).unwrap();
        match &events[0] {
            MfaEvent::AttemptFailed(e) => {
                assert_eq!(e.failed_attempts, 6);
                assert_eq!(e.locked_until, Some(later + Duration::minutes(15)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(method.is_locked_at(later + Duration::minutes(10)));
    }

    #[test]
    fn test_success_resets_counter_and_lock() {
        let mut method = enabled_totp();
        let start = Utc::now();
        for _ in 0..5 {
            method.record_failed_attempt_at(start).unwrap();
        }
        assert!(method.is_locked_at(start));

        method.record_successful_attempt_at(start + Duration::minutes(1)).unwrap();
        assert_eq!(method.failed_attempts(), 0);
        assert!(method.locked_until().is_none());
        assert!(!method.is_locked_at(start + Duration::minutes(1)));
        assert_eq!(method.last_used_at(), Some(start + Duration::minutes(1)));
    }

    #[test]
    fn test_backup_codes_are_single_use() {
        let mut method = create(MfaType::BackupCodes);
        let (codes, _) = method.generate_backup_codes(DEFAULT_BACKUP_CODES).unwrap();
        assert_eq!(codes.len(), 10);
        assert!(codes.iter().all(|c| c.len() == 8));
        method.enable().unwrap();

        let version = method.version();
        let (valid, events) = method.validate_backup_code("WRONG123").unwrap();
        assert!(!valid);
        assert!(events.is_empty());
        assert_eq!(method.version(), version);
        assert_eq!(method.remaining_backup_codes(), 10);

        let (valid, _) = method.validate_backup_code(&codes[0].to_lowercase()).unwrap();
        assert!(valid);
        assert_eq!(method.remaining_backup_codes(), 9);

        let (again, _) = method.validate_backup_code(&codes[0]).unwrap();
        assert!(!again);
    }

    #[test]
    fn test_regenerating_backup_codes_replaces_pool() {
        let mut method = create(MfaType::BackupCodes);
        let (first, _) = method.generate_backup_codes(3).unwrap();
        let (second, _) = method.generate_backup_codes(5).unwrap();
        method.enable().unwrap();

        assert_eq!(method.remaining_backup_codes(), 5);
        if !second.contains(&first[0]) {
            assert!(!method.validate_backup_code(&first[0]).unwrap().0);
        }
    }

    #[test]
    fn test_supplied_backup_codes_are_normalized() {
        let mut method = create(MfaType::BackupCodes);
        let codes = vec![" abcd2345 ".to_string(), "WXYZ6789".to_string()];
        method.execute(&MfaCommand::ReplaceBackupCodes { codes }).unwrap();
        method.enable().unwrap();

        let (valid, events) = method.validate_backup_code("ABCD2345").unwrap();
        assert!(valid);
        match &events[0] {
            MfaEvent::BackupCodeUsed(e) => assert_eq!(e.remaining, 1),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(method.remaining_backup_codes(), 1);
    }

    #[test]
    fn test_invalid_backup_code_pools_are_rejected() {
        let mut method = create(MfaType::BackupCodes);
        let pools = [
            vec!["DUPL2345".to_string(), "dupl2345".to_string()],
            vec!["x".to_string()],
            vec!["ABCD0123".to_string()],
            Vec::new(),
        ];

        for codes in pools {
            let result = method.execute(&MfaCommand::ReplaceBackupCodes { codes });
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }
        assert_eq!(method.version(), 1);
        assert_eq!(method.remaining_backup_codes(), 0);
    }

    #[test]
    fn test_removed_method_rejects_mutations() {
        let mut method = enabled_totp();
        method.remove("admin").unwrap();

        assert!(method.is_deleted());
        assert!(!method.is_enabled());
        assert!(matches!(method.disable(), Err(DomainError::InvalidOperation(_))));
        assert!(matches!(method.record_failed_attempt(), Err(DomainError::InvalidOperation(_))));
        assert!(matches!(method.remove("admin"), Err(DomainError::InvalidOperation(_))));
    }

    #[test]
    fn test_snapshot_keeps_secret_material() {
        let method = enabled_totp();
        let json = serde_json::to_string(&method).unwrap();
        let restored: MfaMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.totp_secret(), method.totp_secret());
        assert_eq!(restored.field("mfa_type"), Some(FieldValue::Text("Totp".into())));
    }
}
