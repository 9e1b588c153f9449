use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::value_objects::Email;
use crate::seedwork::{AsyncBusinessRule, BusinessRule, DomainResult, Repository};
use super::aggregate::Customer;
use super::specifications::CustomerSpecifications;

// ============================================================================
// Customer Business Rules
// ============================================================================
//
// Each rule borrows the customer it inspects and only reads facts the
// aggregate exposes. Rules about optional data (mobile number, address...)
// are satisfied when the data is absent; factories decide whether to apply
// them at all.
//
// ============================================================================

pub struct CustomerMustBeActiveRule<'a> {
    customer: &'a Customer,
}

impl<'a> CustomerMustBeActiveRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for CustomerMustBeActiveRule<'_> {
    fn is_broken(&self) -> bool {
        !self.customer.is_active()
    }

    fn message(&self) -> String {
        format!("Customer must be active (current status: {})", self.customer.status())
    }

    fn name(&self) -> &'static str {
        "CustomerMustBeActive"
    }
}

pub struct CustomerMustNotBeDeletedRule<'a> {
    customer: &'a Customer,
}

impl<'a> CustomerMustNotBeDeletedRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for CustomerMustNotBeDeletedRule<'_> {
    fn is_broken(&self) -> bool {
        self.customer.is_removed()
    }

    fn message(&self) -> String {
        "Customer has been deleted".to_string()
    }

    fn name(&self) -> &'static str {
        "CustomerMustNotBeDeleted"
    }
}

pub struct CustomerMustNotBeBlockedRule<'a> {
    customer: &'a Customer,
}

impl<'a> CustomerMustNotBeBlockedRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for CustomerMustNotBeBlockedRule<'_> {
    fn is_broken(&self) -> bool {
        self.customer.status() == super::CustomerStatus::Blocked
    }

    fn message(&self) -> String {
        "Customer is blocked".to_string()
    }

    fn name(&self) -> &'static str {
        "CustomerMustNotBeBlocked"
    }
}

pub struct CustomerMustBeVerifiedRule<'a> {
    customer: &'a Customer,
}

impl<'a> CustomerMustBeVerifiedRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for CustomerMustBeVerifiedRule<'_> {
    fn is_broken(&self) -> bool {
        !self.customer.status().is_verified()
    }

    fn message(&self) -> String {
        "Customer must be verified first".to_string()
    }

    fn name(&self) -> &'static str {
        "CustomerMustBeVerified"
    }
}

pub struct CustomerMustHaveValidContactInfoRule<'a> {
    customer: &'a Customer,
}

impl<'a> CustomerMustHaveValidContactInfoRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for CustomerMustHaveValidContactInfoRule<'_> {
    fn is_broken(&self) -> bool {
        !self.customer.has_valid_contact_info()
    }

    fn message(&self) -> String {
        "Customer must have an email and at least one phone or mobile number".to_string()
    }

    fn name(&self) -> &'static str {
        "CustomerMustHaveValidContactInfo"
    }
}

/// Broken when the customer is younger than 18 on `today`, or the date of
/// birth is unknown
pub struct CustomerMustBeAdultRule<'a> {
    customer: &'a Customer,
    today: NaiveDate,
}

impl<'a> CustomerMustBeAdultRule<'a> {
    pub fn new(customer: &'a Customer, today: NaiveDate) -> Self {
        Self { customer, today }
    }
}

impl BusinessRule for CustomerMustBeAdultRule<'_> {
    fn is_broken(&self) -> bool {
        !self.customer.is_adult_on(self.today)
    }

    fn message(&self) -> String {
        match self.customer.age_on(self.today) {
            Some(age) => format!("Customer must be at least 18 years old (age: {age})"),
            None => "Customer date of birth is required to confirm adulthood".to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "CustomerMustBeAdult"
    }
}

pub struct MobileNumberMustBeMobileRule<'a> {
    customer: &'a Customer,
}

impl<'a> MobileNumberMustBeMobileRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for MobileNumberMustBeMobileRule<'_> {
    fn is_broken(&self) -> bool {
        self.customer
            .mobile_number()
            .is_some_and(|mobile| !mobile.is_mobile())
    }

    fn message(&self) -> String {
        "Mobile number must be a mobile line (09xx)".to_string()
    }

    fn name(&self) -> &'static str {
        "MobileNumberMustBeMobile"
    }
}

pub struct EmailMustNotBeDisposableRule<'a> {
    email: &'a Email,
}

impl<'a> EmailMustNotBeDisposableRule<'a> {
    pub fn new(email: &'a Email) -> Self {
        Self { email }
    }
}

impl BusinessRule for EmailMustNotBeDisposableRule<'_> {
    fn is_broken(&self) -> bool {
        self.email.is_disposable_email()
    }

    fn message(&self) -> String {
        format!("Disposable email domains are not allowed ({})", self.email.domain())
    }

    fn name(&self) -> &'static str {
        "EmailMustNotBeDisposable"
    }
}

pub struct EmailMustBeBusinessRule<'a> {
    email: &'a Email,
}

impl<'a> EmailMustBeBusinessRule<'a> {
    pub fn new(email: &'a Email) -> Self {
        Self { email }
    }
}

impl BusinessRule for EmailMustBeBusinessRule<'_> {
    fn is_broken(&self) -> bool {
        !self.email.is_business_email()
    }

    fn message(&self) -> String {
        format!("A business email is required ({} is a personal provider)", self.email.domain())
    }

    fn name(&self) -> &'static str {
        "EmailMustBeBusiness"
    }
}

pub struct PhoneMustBeTehranNumberRule<'a> {
    customer: &'a Customer,
}

impl<'a> PhoneMustBeTehranNumberRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for PhoneMustBeTehranNumberRule<'_> {
    fn is_broken(&self) -> bool {
        self.customer
            .phone_number()
            .is_some_and(|phone| !phone.is_tehran_number())
    }

    fn message(&self) -> String {
        "Phone number must be a Tehran landline (021)".to_string()
    }

    fn name(&self) -> &'static str {
        "PhoneMustBeTehranNumber"
    }
}

pub struct AddressMustBeInTehranRule<'a> {
    customer: &'a Customer,
}

impl<'a> AddressMustBeInTehranRule<'a> {
    pub fn new(customer: &'a Customer) -> Self {
        Self { customer }
    }
}

impl BusinessRule for AddressMustBeInTehranRule<'_> {
    fn is_broken(&self) -> bool {
        self.customer
            .address()
            .is_some_and(|address| !address.is_in_tehran())
    }

    fn message(&self) -> String {
        "Service is only available for addresses in Tehran".to_string()
    }

    fn name(&self) -> &'static str {
        "AddressMustBeInTehran"
    }
}

// ============================================================================
// Async Rules
// ============================================================================

/// No other live customer may use the same email
pub struct CustomerEmailMustBeUniqueRule {
    repository: Arc<dyn Repository<Customer>>,
    email: Email,
    /// The customer being edited, if any
    exclude: Option<Uuid>,
}

impl CustomerEmailMustBeUniqueRule {
    pub fn new(repository: Arc<dyn Repository<Customer>>, email: Email) -> Self {
        Self {
            repository,
            email,
            exclude: None,
        }
    }

    pub fn excluding(mut self, customer_id: Uuid) -> Self {
        self.exclude = Some(customer_id);
        self
    }
}

#[async_trait]
impl AsyncBusinessRule for CustomerEmailMustBeUniqueRule {
    async fn is_broken(&self) -> DomainResult<bool> {
        let mut spec = CustomerSpecifications::by_email(&self.email).and(CustomerSpecifications::not_deleted());
        if let Some(id) = self.exclude {
            spec = spec.and(CustomerSpecifications::excluding_id(id));
        }
        self.repository.exists(&spec).await
    }

    fn message(&self) -> String {
        format!("Email {} is already registered", self.email)
    }

    fn name(&self) -> &'static str {
        "CustomerEmailMustBeUnique"
    }
}
