use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Address, AuditInfo, Email, NationalCode, PhoneNumber};
use crate::seedwork::{
    AggregateRoot, BusinessRule, BusinessRuleValidator, DomainError, DomainEvent, DomainResult, Entity,
    EntityMetadata, FieldValue, Queryable,
};
use super::commands::{CustomerCommand, RegisterCustomer};
use super::events::*;
use super::rules::{
    CustomerMustBeActiveRule, CustomerMustHaveValidContactInfoRule, CustomerMustNotBeBlockedRule,
    CustomerMustNotBeDeletedRule,
};
use super::rules_factory::CustomerBusinessRulesFactory;
use super::value_objects::CustomerStatus;

// ============================================================================
// Customer Aggregate - Business Logic
// ============================================================================
//
// Every mutation goes through `execute`:
//   handle_command -> business rules -> events -> apply (version + 1 each)
//
// Rules are evaluated before any state check, so a deleted customer always
// reports CustomerMustNotBeDeleted first.
//
// ============================================================================

const ADULT_AGE: u32 = 18;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    meta: EntityMetadata,
    first_name: String,
    last_name: String,
    email: Email,
    phone_number: Option<PhoneNumber>,
    mobile_number: Option<PhoneNumber>,
    address: Option<Address>,
    national_code: Option<NationalCode>,
    date_of_birth: Option<NaiveDate>,
    status: CustomerStatus,
    status_reason: Option<String>,
    audit: AuditInfo,
}

impl Customer {
    /// Create a Pending customer; returns the registration event
    pub fn register(input: RegisterCustomer) -> DomainResult<(Self, Vec<CustomerEvent>)> {
        Self::register_at(input, Utc::now())
    }

    pub fn register_at(input: RegisterCustomer, now: DateTime<Utc>) -> DomainResult<(Self, Vec<CustomerEvent>)> {
        let first_name = required_name("First name", &input.first_name)?;
        let last_name = required_name("Last name", &input.last_name)?;
        validate_birth_date(input.date_of_birth, now)?;
        let audit = AuditInfo::new_at(&input.registered_by, now)?;

        let registered = CustomerRegistered {
            customer_id: Uuid::now_v7(),
            first_name,
            last_name,
            email: input.email,
            phone_number: input.phone_number,
            mobile_number: input.mobile_number,
            national_code: input.national_code,
            date_of_birth: input.date_of_birth,
            performed_by: audit.created_by().to_string(),
            occurred_at: now,
        };

        let mut customer = Self {
            meta: EntityMetadata::new(registered.customer_id, now),
            first_name: registered.first_name.clone(),
            last_name: registered.last_name.clone(),
            email: registered.email.clone(),
            phone_number: None,
            mobile_number: None,
            address: None,
            national_code: None,
            date_of_birth: None,
            status: CustomerStatus::Pending,
            status_reason: None,
            audit,
        };
        let event = CustomerEvent::Registered(registered);
        customer.apply(&event);

        tracing::debug!(customer_id = %customer.id(), "Customer registered");
        Ok((customer, vec![event]))
    }

    // ========================================================================
    // Facts
    // ========================================================================

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn phone_number(&self) -> Option<&PhoneNumber> {
        self.phone_number.as_ref()
    }

    pub fn mobile_number(&self) -> Option<&PhoneNumber> {
        self.mobile_number.as_ref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn national_code(&self) -> Option<&NationalCode> {
        self.national_code.as_ref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn status(&self) -> CustomerStatus {
        self.status
    }

    /// Reason given for the last status change, if any
    pub fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Soft-deleted, or in the terminal Deleted status
    pub fn is_removed(&self) -> bool {
        self.meta.is_deleted() || self.status == CustomerStatus::Deleted
    }

    pub fn has_valid_contact_info(&self) -> bool {
        self.phone_number.is_some() || self.mobile_number.is_some()
    }

    /// Completed years on `date`; `None` when the date of birth is unknown
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        let born = self.date_of_birth?;
        let mut years = date.year() - born.year();
        if (date.month(), date.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    pub fn age(&self) -> Option<u32> {
        self.age_on(Utc::now().date_naive())
    }

    pub fn is_adult_on(&self, date: NaiveDate) -> bool {
        self.age_on(date).is_some_and(|age| age >= ADULT_AGE)
    }

    pub fn is_adult(&self) -> bool {
        self.is_adult_on(Utc::now().date_naive())
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub fn activate(&mut self, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::Activate { performed_by: by.to_string() })
    }

    pub fn deactivate(&mut self, reason: Option<String>, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::Deactivate { reason, performed_by: by.to_string() })
    }

    pub fn verify(&mut self, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::Verify { performed_by: by.to_string() })
    }

    pub fn upgrade_to_premium(&mut self, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::UpgradeToPremium { performed_by: by.to_string() })
    }

    pub fn suspend(&mut self, reason: impl Into<String>, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::Suspend { reason: reason.into(), performed_by: by.to_string() })
    }

    pub fn block(&mut self, reason: impl Into<String>, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::Block { reason: reason.into(), performed_by: by.to_string() })
    }

    pub fn delete(&mut self, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::Delete { performed_by: by.to_string() })
    }

    pub fn update_contact_info(
        &mut self,
        email: Email,
        phone_number: Option<PhoneNumber>,
        mobile_number: Option<PhoneNumber>,
        by: &str,
    ) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::UpdateContactInfo {
            email,
            phone_number,
            mobile_number,
            performed_by: by.to_string(),
        })
    }

    pub fn change_address(&mut self, address: Option<Address>, by: &str) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::ChangeAddress { address, performed_by: by.to_string() })
    }

    pub fn update_profile(
        &mut self,
        first_name: &str,
        last_name: &str,
        date_of_birth: Option<NaiveDate>,
        national_code: Option<NationalCode>,
        by: &str,
    ) -> DomainResult<Vec<CustomerEvent>> {
        self.execute(&CustomerCommand::UpdateProfile {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            date_of_birth,
            national_code,
            performed_by: by.to_string(),
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn status_change(
        &self,
        new_status: CustomerStatus,
        reason: Option<String>,
        performed_by: &str,
    ) -> Vec<CustomerEvent> {
        vec![CustomerEvent::StatusChanged(CustomerStatusChanged {
            customer_id: self.id(),
            new_status,
            previous_status: self.status,
            reason,
            performed_by: performed_by.to_string(),
            occurred_at: Utc::now(),
        })]
    }

    fn ensure_not_in(&self, status: CustomerStatus, action: &str) -> DomainResult<()> {
        if self.status == status {
            return Err(DomainError::invalid_operation(format!(
                "Cannot {action}: customer {} is already {status}",
                self.id()
            )));
        }
        Ok(())
    }
}

fn required_name(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn validate_birth_date(date_of_birth: Option<NaiveDate>, now: DateTime<Utc>) -> DomainResult<()> {
    match date_of_birth {
        Some(born) if born > now.date_naive() => {
            Err(DomainError::validation("Date of birth cannot be in the future"))
        }
        _ => Ok(()),
    }
}

fn validate_rules<'a>(rules: impl IntoIterator<Item = Box<dyn BusinessRule + 'a>>) -> DomainResult<()> {
    BusinessRuleValidator::validate(rules)?;
    Ok(())
}

impl Entity for Customer {
    fn metadata(&self) -> &EntityMetadata {
        &self.meta
    }
}

impl AggregateRoot for Customer {
    type Event = CustomerEvent;
    type Command = CustomerCommand;

    const AGGREGATE_TYPE: &'static str = "Customer";

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.meta
    }

    fn handle_command(&self, command: &CustomerCommand) -> DomainResult<Vec<CustomerEvent>> {
        let by = command.performed_by();
        if by.trim().is_empty() {
            return Err(DomainError::validation("PerformedBy is required"));
        }

        let not_deleted = || Box::new(CustomerMustNotBeDeletedRule::new(self)) as Box<dyn BusinessRule + '_>;
        let not_blocked = || Box::new(CustomerMustNotBeBlockedRule::new(self)) as Box<dyn BusinessRule + '_>;
        let must_be_active = || Box::new(CustomerMustBeActiveRule::new(self)) as Box<dyn BusinessRule + '_>;

        match command {
            CustomerCommand::Activate { performed_by } => {
                validate_rules([not_deleted(), not_blocked()])?;
                self.ensure_not_in(CustomerStatus::Active, "activate")?;
                Ok(self.status_change(CustomerStatus::Active, None, performed_by))
            }

            CustomerCommand::Deactivate { reason, performed_by } => {
                validate_rules([not_deleted(), must_be_active()])?;
                Ok(self.status_change(CustomerStatus::Inactive, reason.clone(), performed_by))
            }

            CustomerCommand::Verify { performed_by } => {
                validate_rules([
                    not_deleted(),
                    not_blocked(),
                    Box::new(CustomerMustHaveValidContactInfoRule::new(self)) as Box<dyn BusinessRule + '_>,
                ])?;
                if self.status.is_verified() {
                    return Err(DomainError::invalid_operation(format!(
                        "Cannot verify: customer {} is already {}",
                        self.id(),
                        self.status
                    )));
                }
                Ok(self.status_change(CustomerStatus::Verified, None, performed_by))
            }

            CustomerCommand::UpgradeToPremium { performed_by } => {
                let factory = CustomerBusinessRulesFactory::new();
                validate_rules(factory.premium_upgrade_rules(self))?;
                self.ensure_not_in(CustomerStatus::Premium, "upgrade to premium")?;
                Ok(self.status_change(CustomerStatus::Premium, None, performed_by))
            }

            CustomerCommand::Suspend { reason, performed_by } => {
                validate_rules([not_deleted(), must_be_active()])?;
                Ok(self.status_change(CustomerStatus::Suspended, Some(reason.clone()), performed_by))
            }

            CustomerCommand::Block { reason, performed_by } => {
                validate_rules([not_deleted()])?;
                self.ensure_not_in(CustomerStatus::Blocked, "block")?;
                Ok(self.status_change(CustomerStatus::Blocked, Some(reason.clone()), performed_by))
            }

            CustomerCommand::Delete { performed_by } => {
                validate_rules([not_deleted()])?;
                Ok(self.status_change(CustomerStatus::Deleted, None, performed_by))
            }

            CustomerCommand::UpdateContactInfo { email, phone_number, mobile_number, performed_by } => {
                validate_rules([not_deleted(), not_blocked()])?;
                Ok(vec![CustomerEvent::ContactInfoUpdated(CustomerContactInfoUpdated {
                    customer_id: self.id(),
                    email: email.clone(),
                    phone_number: phone_number.clone(),
                    mobile_number: mobile_number.clone(),
                    performed_by: performed_by.clone(),
                    occurred_at: Utc::now(),
                })])
            }

            CustomerCommand::ChangeAddress { address, performed_by } => {
                validate_rules([not_deleted()])?;
                Ok(vec![CustomerEvent::AddressChanged(CustomerAddressChanged {
                    customer_id: self.id(),
                    address: address.clone(),
                    performed_by: performed_by.clone(),
                    occurred_at: Utc::now(),
                })])
            }

            CustomerCommand::UpdateProfile { first_name, last_name, date_of_birth, national_code, performed_by } => {
                validate_rules([not_deleted()])?;
                let now = Utc::now();
                let first_name = required_name("First name", first_name)?;
                let last_name = required_name("Last name", last_name)?;
                validate_birth_date(*date_of_birth, now)?;

                Ok(vec![CustomerEvent::ProfileUpdated(CustomerProfileUpdated {
                    customer_id: self.id(),
                    first_name,
                    last_name,
                    date_of_birth: *date_of_birth,
                    national_code: national_code.clone(),
                    performed_by: performed_by.clone(),
                    occurred_at: now,
                })])
            }
        }
    }

    fn apply_event(&mut self, event: &CustomerEvent) {
        match event {
            CustomerEvent::Registered(e) => {
                self.first_name = e.first_name.clone();
                self.last_name = e.last_name.clone();
                self.email = e.email.clone();
                self.phone_number = e.phone_number.clone();
                self.mobile_number = e.mobile_number.clone();
                self.national_code = e.national_code.clone();
                self.date_of_birth = e.date_of_birth;
                self.status = CustomerStatus::Pending;
                // Creation audit is already stamped
                return;
            }
            CustomerEvent::StatusChanged(e) => {
                self.status = e.new_status;
                self.status_reason = e.reason.clone();
                if e.new_status == CustomerStatus::Deleted {
                    self.meta.mark_deleted(e.performed_by.clone(), e.occurred_at);
                }
            }
            CustomerEvent::ContactInfoUpdated(e) => {
                self.email = e.email.clone();
                self.phone_number = e.phone_number.clone();
                self.mobile_number = e.mobile_number.clone();
            }
            CustomerEvent::AddressChanged(e) => {
                self.address = e.address.clone();
            }
            CustomerEvent::ProfileUpdated(e) => {
                self.first_name = e.first_name.clone();
                self.last_name = e.last_name.clone();
                self.date_of_birth = e.date_of_birth;
                self.national_code = e.national_code.clone();
            }
        }

        // performed_by is validated in handle_command
        if let Ok(audit) = self.audit.update_modified_at(event.performed_by(), event.occurred_at()) {
            self.audit = audit;
        }
    }
}

impl Queryable for Customer {
    fn field(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            "id" => self.id().into(),
            "first_name" => self.first_name.clone().into(),
            "last_name" => self.last_name.clone().into(),
            "full_name" => self.full_name().into(),
            "email" => self.email.as_str().into(),
            "email_domain" => self.email.domain().into(),
            "mobile_number" => self.mobile_number.as_ref().map(|m| m.as_str().to_string()).into(),
            "national_code" => self.national_code.as_ref().map(|c| c.as_str().to_string()).into(),
            "city" => self.address.as_ref().map(|a| a.city().to_string()).into(),
            "date_of_birth" => self.date_of_birth.into(),
            "status" => self.status.as_str().into(),
            "is_active" => self.is_active().into(),
            "is_deleted" => self.is_removed().into(),
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
    use crate::domain::customer::test_support::{active_customer, adult_customer, registration};

    #[test]
    fn test_registration_starts_pending_at_version_one() {
        let (customer, events) = adult_customer();

        assert_eq!(customer.status(), CustomerStatus::Pending);
        assert_eq!(customer.version(), 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "CustomerRegistered");
        assert_eq!(events[0].aggregate_id(), customer.id());
        assert_eq!(customer.audit().created_by(), "registrar");
        assert!(customer.has_valid_contact_info());
    }

    #[test]
    fn test_registration_validates_input() {
        let mut blank = registration();
        blank.first_name = "  ".to_string();
        assert!(matches!(Customer::register(blank), Err(DomainError::Validation(_))));

        let mut unborn = registration();
        unborn.date_of_birth = Some(Utc::now().date_naive() + chrono::Duration::days(2));
        assert!(matches!(Customer::register(unborn), Err(DomainError::Validation(_))));

        let mut anonymous = registration();
        anonymous.registered_by = String::new();
        assert!(Customer::register(anonymous).is_err());
    }

    #[test]
    fn test_each_transition_bumps_version_once_with_one_event() {
        let (mut customer, _) = adult_customer();

        let steps: Vec<(&str, Box<dyn Fn(&mut Customer) -> DomainResult<Vec<CustomerEvent>>>)> = vec![
            ("activate", Box::new(|c| c.activate("admin"))),
            ("verify", Box::new(|c| c.verify("admin"))),
            ("premium", Box::new(|c| c.upgrade_to_premium("admin"))),
            ("suspend", Box::new(|c| c.suspend("chargeback", "admin"))),
            ("activate", Box::new(|c| c.activate("admin"))),
            ("deactivate", Box::new(|c| c.deactivate(None, "admin"))),
            ("block", Box::new(|c| c.block("fraud", "admin"))),
            ("delete", Box::new(|c| c.delete("admin"))),
        ];

        for (label, step) in steps {
            let before = customer.version();
            let previous = customer.status();
            let events = step(&mut customer).unwrap_or_else(|e| panic!("{label} failed: {e}"));

            assert_eq!(customer.version(), before + 1, "{label}");
            assert_eq!(events.len(), 1, "{label}");
            match &events[0] {
                CustomerEvent::StatusChanged(e) => {
                    assert_eq!(e.previous_status, previous, "{label}");
                    assert_eq!(e.new_status, customer.status(), "{label}");
                }
                other => panic!("{label} raised {other:?}"),
            }
        }

        assert_eq!(customer.status(), CustomerStatus::Deleted);
        assert!(customer.is_deleted());
        assert_eq!(customer.metadata().deleted_by(), Some("admin"));
    }

    #[test]
    fn test_pending_verify_then_premium() {
        let (mut customer, _) = adult_customer();

        customer.verify("kyc").unwrap();
        assert_eq!(customer.status(), CustomerStatus::Verified);

        customer.upgrade_to_premium("sales").unwrap();
        assert_eq!(customer.status(), CustomerStatus::Premium);
        assert_eq!(customer.version(), 3);
        assert_eq!(customer.audit().modified_by(), Some("sales"));
        assert_eq!(customer.audit().created_by(), "registrar");
    }

    #[test]
    fn test_premium_requires_verification() {
        let mut customer = active_customer();

        let err = customer.upgrade_to_premium("sales").unwrap_err();
        match err {
            DomainError::RuleViolation(violation) => {
                assert!(violation.message().contains("verified"));
                assert_eq!(violation.broken_rules(), &["CustomerMustBeVerified"]);
            }
            other => panic!("expected rule violation, got {other:?}"),
        }
        assert_eq!(customer.status(), CustomerStatus::Active);
        assert_eq!(customer.version(), 2);
    }

    #[test]
    fn test_deleted_customer_rejects_every_mutation() {
        let mut customer = active_customer();
        customer.delete("admin").unwrap();
        let version = customer.version();

        let attempts = [
            customer.clone().activate("admin"),
            customer.clone().deactivate(None, "admin"),
            customer.clone().verify("admin"),
            customer.clone().upgrade_to_premium("admin"),
            customer.clone().suspend("x", "admin"),
            customer.clone().block("x", "admin"),
            customer.clone().delete("admin"),
            customer.clone().update_contact_info(customer.email().clone(), None, None, "admin"),
            customer.clone().change_address(None, "admin"),
            customer.clone().update_profile("A", "B", None, None, "admin"),
        ];

        for result in attempts {
            match result.unwrap_err() {
                DomainError::RuleViolation(v) => {
                    assert!(v.broken_rules().contains(&"CustomerMustNotBeDeleted"));
                }
                other => panic!("expected rule violation, got {other:?}"),
            }
        }
        assert_eq!(customer.version(), version);
    }

    #[test]
    fn test_repeated_transitions_are_invalid_operations() {
        let mut customer = active_customer();
        assert!(matches!(customer.activate("admin"), Err(DomainError::InvalidOperation(_))));

        customer.verify("admin").unwrap();
        assert!(matches!(customer.verify("admin"), Err(DomainError::InvalidOperation(_))));

        customer.block("fraud", "admin").unwrap();
        assert!(matches!(customer.block("again", "admin"), Err(DomainError::InvalidOperation(_))));
        // Blocked customers cannot be re-activated
        assert!(matches!(customer.activate("admin"), Err(DomainError::RuleViolation(_))));
    }

    #[test]
    fn test_suspend_requires_active_and_keeps_reason() {
        let (mut pending, _) = adult_customer();
        assert!(matches!(pending.suspend("x", "admin"), Err(DomainError::RuleViolation(_))));

        let mut customer = active_customer();
        customer.suspend("chargeback", "risk").unwrap();
        assert_eq!(customer.status(), CustomerStatus::Suspended);
        assert_eq!(customer.status_reason(), Some("chargeback"));
    }

    #[test]
    fn test_contact_address_and_profile_updates() {
        let mut customer = active_customer();
        let new_email = Email::new("new@acme.ir").unwrap();

        customer.update_contact_info(new_email.clone(), None, None, "self").unwrap();
        assert_eq!(customer.email(), &new_email);
        assert!(!customer.has_valid_contact_info());

        let address = Address::new("Valiasr", "Tehran", "Tehran", "1966733311", "Iran").unwrap();
        customer.change_address(Some(address.clone()), "self").unwrap();
        assert_eq!(customer.address(), Some(&address));

        customer
            .update_profile("Sara", "Ahmadi", NaiveDate::from_ymd_opt(1990, 1, 1), None, "self")
            .unwrap();
        assert_eq!(customer.full_name(), "Sara Ahmadi");
        assert_eq!(customer.version(), 5);

        assert!(matches!(
            customer.update_profile(" ", "Ahmadi", None, None, "self"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(customer.activate(" "), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_age_calculation() {
        let customer = active_customer();
        // Born 2000-05-20
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2020, 5, 19).unwrap()), Some(19));
        assert_eq!(customer.age_on(NaiveDate::from_ymd_opt(2020, 5, 20).unwrap()), Some(20));
        assert!(customer.is_adult());

        let mut unknown = registration();
        unknown.date_of_birth = None;
        let (customer, _) = Customer::register(unknown).unwrap();
        assert_eq!(customer.age(), None);
        assert!(!customer.is_adult());
    }

    #[test]
    fn test_queryable_fields() {
        let customer = active_customer();
        assert_eq!(customer.field("status"), Some(FieldValue::Text("Active".into())));
        assert_eq!(customer.field("email_domain"), Some(FieldValue::Text("acme.ir".into())));
        assert_eq!(customer.field("city"), Some(FieldValue::Null));
        assert_eq!(customer.field("version"), Some(FieldValue::Int(2)));
        assert_eq!(customer.field("unknown"), None);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let customer = active_customer();
        let json = serde_json::to_string(&customer).unwrap();
        let restored: Customer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, customer);
    }
}
