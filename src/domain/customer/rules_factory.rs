use chrono::{NaiveDate, Utc};

use crate::seedwork::{BusinessRule, CompositeBusinessRule};
use super::aggregate::Customer;
use super::rules::*;

// ============================================================================
// Customer Business Rules Factory
// ============================================================================
//
// Named rule sets per business operation. Every set starts from the
// lifecycle baseline (active + not deleted) and adds the operation's own
// checks. Optional data only contributes rules when it is present.
//
// ============================================================================

/// Operations that have a named rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerOperation {
    PlaceOrder,
    UpgradeToPremium,
    SendSms,
    SendEmail,
    BusinessAccount,
    LocalService,
}

impl CustomerOperation {
    fn summary(self) -> &'static str {
        match self {
            CustomerOperation::PlaceOrder => "Customer cannot place orders",
            CustomerOperation::UpgradeToPremium => "Customer cannot be upgraded to premium",
            CustomerOperation::SendSms => "Customer cannot receive SMS notifications",
            CustomerOperation::SendEmail => "Customer cannot receive email notifications",
            CustomerOperation::BusinessAccount => "Customer cannot open a business account",
            CustomerOperation::LocalService => "Customer cannot use local services",
        }
    }
}

pub struct CustomerBusinessRulesFactory {
    today: NaiveDate,
}

impl Default for CustomerBusinessRulesFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerBusinessRulesFactory {
    pub fn new() -> Self {
        Self::as_of(Utc::now().date_naive())
    }

    /// Age checks are evaluated against `today`
    pub fn as_of(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn baseline_lifecycle_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        vec![
            Box::new(CustomerMustBeActiveRule::new(customer)),
            Box::new(CustomerMustNotBeDeletedRule::new(customer)),
        ]
    }

    pub fn order_placement_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        let mut rules = self.baseline_lifecycle_rules(customer);
        rules.push(Box::new(CustomerMustHaveValidContactInfoRule::new(customer)));
        self.push_adult_rule(customer, &mut rules);
        rules
    }

    pub fn premium_upgrade_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        let mut rules = self.baseline_lifecycle_rules(customer);
        rules.push(Box::new(CustomerMustBeVerifiedRule::new(customer)));
        self.push_adult_rule(customer, &mut rules);
        rules
    }

    pub fn sms_notification_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        let mut rules = self.baseline_lifecycle_rules(customer);
        if customer.mobile_number().is_some() {
            rules.push(Box::new(MobileNumberMustBeMobileRule::new(customer)));
        }
        rules
    }

    pub fn email_notification_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        let mut rules = self.baseline_lifecycle_rules(customer);
        rules.push(Box::new(EmailMustNotBeDisposableRule::new(customer.email())));
        rules
    }

    pub fn business_account_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        let mut rules = self.baseline_lifecycle_rules(customer);
        rules.push(Box::new(EmailMustBeBusinessRule::new(customer.email())));
        rules
    }

    pub fn local_service_rules<'a>(&self, customer: &'a Customer) -> Vec<Box<dyn BusinessRule + 'a>> {
        let mut rules = self.baseline_lifecycle_rules(customer);
        if customer.phone_number().is_some() {
            rules.push(Box::new(PhoneMustBeTehranNumberRule::new(customer)));
        }
        if customer.address().is_some() {
            rules.push(Box::new(AddressMustBeInTehranRule::new(customer)));
        }
        rules
    }

    pub fn rules_for<'a>(&self, customer: &'a Customer, operation: CustomerOperation) -> Vec<Box<dyn BusinessRule + 'a>> {
        match operation {
            CustomerOperation::PlaceOrder => self.order_placement_rules(customer),
            CustomerOperation::UpgradeToPremium => self.premium_upgrade_rules(customer),
            CustomerOperation::SendSms => self.sms_notification_rules(customer),
            CustomerOperation::SendEmail => self.email_notification_rules(customer),
            CustomerOperation::BusinessAccount => self.business_account_rules(customer),
            CustomerOperation::LocalService => self.local_service_rules(customer),
        }
    }

    /// The operation's rule set as one composite rule
    pub fn composite_for<'a>(&self, customer: &'a Customer, operation: CustomerOperation) -> CompositeBusinessRule<'a> {
        CompositeBusinessRule::with_summary(operation.summary(), self.rules_for(customer, operation))
    }

    fn push_adult_rule<'a>(&self, customer: &'a Customer, rules: &mut Vec<Box<dyn BusinessRule + 'a>>) {
        if customer.date_of_birth().is_some() {
            rules.push(Box::new(CustomerMustBeAdultRule::new(customer, self.today)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::test_support::{active_customer, adult_customer, registration};
    use crate::domain::value_objects::{Address, Email, PhoneNumber};
    use crate::seedwork::BusinessRuleValidator;

    fn names(rules: &[Box<dyn BusinessRule + '_>]) -> Vec<&'static str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_every_set_starts_from_baseline() {
        let customer = active_customer();
        let factory = CustomerBusinessRulesFactory::new();

        for operation in [
            CustomerOperation::PlaceOrder,
            CustomerOperation::UpgradeToPremium,
            CustomerOperation::SendSms,
            CustomerOperation::SendEmail,
            CustomerOperation::BusinessAccount,
            CustomerOperation::LocalService,
        ] {
            let rules = factory.rules_for(&customer, operation);
            assert_eq!(
                &names(&rules)[..2],
                &["CustomerMustBeActive", "CustomerMustNotBeDeleted"],
                "{operation:?}"
            );
        }
    }

    #[test]
    fn test_order_placement_on_inactive_customer() {
        let mut customer = active_customer();
        customer.deactivate(Some("vacation".into()), "admin").unwrap();

        let factory = CustomerBusinessRulesFactory::new();
        let composite = factory.composite_for(&customer, CustomerOperation::PlaceOrder);

        assert!(composite.is_broken());
        assert_eq!(composite.broken_rules_count(), 1);
        assert_eq!(composite.broken_rules()[0].name(), "CustomerMustBeActive");
        assert!(composite.message().starts_with("Customer cannot place orders"));
    }

    #[test]
    fn test_adult_rule_only_when_birth_date_known() {
        let factory = CustomerBusinessRulesFactory::as_of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let customer = active_customer();
        assert!(names(&factory.order_placement_rules(&customer)).contains(&"CustomerMustBeAdult"));

        let mut input = registration();
        input.date_of_birth = None;
        let (mut unknown, _) = Customer::register(input).unwrap();
        unknown.activate("admin").unwrap();
        let rules = factory.order_placement_rules(&unknown);
        assert!(!names(&rules).contains(&"CustomerMustBeAdult"));
        assert!(BusinessRuleValidator::validate(&rules).is_ok());
    }

    #[test]
    fn test_minor_cannot_place_orders() {
        // Born 2000-05-20, still 17 on this date
        let factory = CustomerBusinessRulesFactory::as_of(NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        let customer = active_customer();

        let err = BusinessRuleValidator::validate(factory.order_placement_rules(&customer)).unwrap_err();
        assert_eq!(err.broken_rules(), &["CustomerMustBeAdult"]);
    }

    #[test]
    fn test_premium_rules_on_pending_unverified_customer() {
        let (customer, _) = adult_customer();
        let factory = CustomerBusinessRulesFactory::new();

        let composite = factory.composite_for(&customer, CustomerOperation::UpgradeToPremium);
        let broken: Vec<_> = composite.broken_rules().iter().map(|r| r.name()).collect();
        assert_eq!(broken, vec!["CustomerMustBeActive", "CustomerMustBeVerified"]);
    }

    #[test]
    fn test_notification_rules() {
        let mut customer = active_customer();
        let factory = CustomerBusinessRulesFactory::new();
        assert!(names(&factory.sms_notification_rules(&customer)).contains(&"MobileNumberMustBeMobile"));

        customer
            .update_contact_info(
                Email::new("burner@mailinator.com").unwrap(),
                Some(PhoneNumber::new("02188776655").unwrap()),
                None,
                "admin",
            )
            .unwrap();

        // No mobile, no mobile rule
        let sms = factory.sms_notification_rules(&customer);
        assert_eq!(sms.len(), 2);

        let email = factory.composite_for(&customer, CustomerOperation::SendEmail);
        assert!(email.is_broken());
        assert_eq!(email.broken_rules()[0].name(), "EmailMustNotBeDisposable");
    }

    #[test]
    fn test_business_account_requires_business_email() {
        let mut customer = active_customer();
        let factory = CustomerBusinessRulesFactory::new();
        assert!(!factory.composite_for(&customer, CustomerOperation::BusinessAccount).is_broken());

        customer
            .update_contact_info(Email::new("someone@gmail.com").unwrap(), None, None, "admin")
            .unwrap();
        let composite = factory.composite_for(&customer, CustomerOperation::BusinessAccount);
        assert_eq!(composite.broken_rules()[0].name(), "EmailMustBeBusiness");
    }

    #[test]
    fn test_local_service_rules_depend_on_present_data() {
        let mut customer = active_customer();
        let factory = CustomerBusinessRulesFactory::new();

        // Fixture phone is a Tehran landline
        assert!(!factory.composite_for(&customer, CustomerOperation::LocalService).is_broken());

        customer
            .change_address(
                Some(Address::new("Chaharbagh", "Isfahan", "Isfahan", "8145678901", "Iran").unwrap()),
                "admin",
            )
            .unwrap();
        let composite = factory.composite_for(&customer, CustomerOperation::LocalService);
        assert_eq!(composite.total_rules(), 4);
        assert_eq!(composite.broken_rules()[0].name(), "AddressMustBeInTehran");
    }
}
