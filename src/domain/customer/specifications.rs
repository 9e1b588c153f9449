use chrono::{DateTime, Months, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::value_objects::Email;
use crate::seedwork::{Criteria, Specification};
use super::aggregate::Customer;
use super::value_objects::CustomerStatus;

// ============================================================================
// Customer Specifications - Reusable Queries
// ============================================================================
//
// Field names match `Queryable for Customer`.
//
// ============================================================================

pub struct CustomerSpecifications;

impl CustomerSpecifications {
    pub fn by_email(email: &Email) -> Specification<Customer> {
        Specification::new(Criteria::eq("email", email.as_str()))
    }

    pub fn not_deleted() -> Specification<Customer> {
        Specification::new(Criteria::eq("is_deleted", false))
    }

    pub fn excluding_id(id: Uuid) -> Specification<Customer> {
        Specification::new(Criteria::ne("id", id))
    }

    /// Live customers in any active status, newest first
    pub fn active() -> Specification<Customer> {
        Specification::new(Criteria::eq("is_active", true).and(Criteria::eq("is_deleted", false)))
            .order_by_descending("created_at")
    }

    pub fn by_status(status: CustomerStatus) -> Specification<Customer> {
        Specification::new(Criteria::eq("status", status.as_str()))
    }

    pub fn with_any_status(statuses: &[CustomerStatus]) -> Specification<Customer> {
        Specification::new(Criteria::one_of("status", statuses.iter().map(|s| s.as_str())))
    }

    pub fn in_city(city: &str) -> Specification<Customer> {
        Specification::new(Criteria::eq("city", city.trim()))
    }

    /// Registered in `[from, to)`
    pub fn registered_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Specification<Customer> {
        Specification::new(Criteria::gte("created_at", from).and(Criteria::lt("created_at", to)))
            .order_by("created_at")
    }

    /// Case-insensitive match on the full name
    pub fn name_contains(fragment: &str) -> Specification<Customer> {
        Specification::new(Criteria::contains("full_name", fragment.trim())).order_by("last_name")
    }

    /// Born at least 18 years before `today`; unknown birth dates never match
    pub fn adults_as_of(today: NaiveDate) -> Specification<Customer> {
        let cutoff = today.checked_sub_months(Months::new(18 * 12)).unwrap_or(NaiveDate::MIN);
        Specification::new(Criteria::lte("date_of_birth", cutoff))
    }

    pub fn without_address() -> Specification<Customer> {
        Specification::new(Criteria::is_null("city"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::test_support::{active_customer, adult_customer, registration};
    use crate::domain::value_objects::Address;
    use crate::seedwork::Entity;

    #[test]
    fn test_by_email_and_not_deleted() {
        let customer = active_customer();
        let spec = CustomerSpecifications::by_email(customer.email()).and(CustomerSpecifications::not_deleted());
        assert!(spec.is_satisfied_by(&customer));

        let mut deleted = customer.clone();
        deleted.delete("admin").unwrap();
        assert!(!spec.is_satisfied_by(&deleted));

        let other = Email::new("other@acme.ir").unwrap();
        assert!(!CustomerSpecifications::by_email(&other).is_satisfied_by(&customer));
    }

    #[test]
    fn test_excluding_id() {
        let customer = active_customer();
        let (other, _) = adult_customer();

        let spec = CustomerSpecifications::excluding_id(customer.id());
        assert!(!spec.is_satisfied_by(&customer));
        assert!(spec.is_satisfied_by(&other));
    }

    #[test]
    fn test_active_filters_and_orders() {
        let (pending, _) = adult_customer();
        let first = active_customer();
        let second = active_customer();
        let mut suspended = active_customer();
        suspended.suspend("review", "risk").unwrap();

        let result = CustomerSpecifications::active().apply(vec![
            first.clone(),
            pending,
            second.clone(),
            suspended,
        ]);

        let ids: Vec<_> = result.iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&first.id()));
        assert!(ids.contains(&second.id()));
    }

    #[test]
    fn test_status_filters() {
        let (pending, _) = adult_customer();
        let active = active_customer();

        assert!(CustomerSpecifications::by_status(CustomerStatus::Pending).is_satisfied_by(&pending));
        assert!(!CustomerSpecifications::by_status(CustomerStatus::Pending).is_satisfied_by(&active));

        let either = CustomerSpecifications::with_any_status(&[CustomerStatus::Pending, CustomerStatus::Active]);
        assert!(either.is_satisfied_by(&pending));
        assert!(either.is_satisfied_by(&active));
    }

    #[test]
    fn test_city_and_missing_address() {
        let mut customer = active_customer();
        assert!(CustomerSpecifications::without_address().is_satisfied_by(&customer));
        assert!(!CustomerSpecifications::in_city("Tehran").is_satisfied_by(&customer));

        customer
            .change_address(
                Some(Address::new("Valiasr", "Tehran", "Tehran", "1966733311", "Iran").unwrap()),
                "admin",
            )
            .unwrap();
        assert!(CustomerSpecifications::in_city("Tehran").is_satisfied_by(&customer));
        assert!(!CustomerSpecifications::without_address().is_satisfied_by(&customer));
    }

    #[test]
    fn test_registered_between() {
        let customer = active_customer();
        let created = customer.metadata().created_at();

        let window = CustomerSpecifications::registered_between(
            created - chrono::Duration::minutes(1),
            created + chrono::Duration::minutes(1),
        );
        assert!(window.is_satisfied_by(&customer));

        let before = CustomerSpecifications::registered_between(created - chrono::Duration::days(2), created);
        assert!(!before.is_satisfied_by(&customer));
    }

    #[test]
    fn test_name_contains_is_case_insensitive() {
        let customer = active_customer();
        assert!(CustomerSpecifications::name_contains("REZA").is_satisfied_by(&customer));
        assert!(!CustomerSpecifications::name_contains("sara").is_satisfied_by(&customer));
    }

    #[test]
    fn test_adults_as_of() {
        // Born 2000-05-20
        let customer = active_customer();
        let spec_before = CustomerSpecifications::adults_as_of(NaiveDate::from_ymd_opt(2018, 5, 19).unwrap());
        let spec_on = CustomerSpecifications::adults_as_of(NaiveDate::from_ymd_opt(2018, 5, 20).unwrap());
        assert!(!spec_before.is_satisfied_by(&customer));
        assert!(spec_on.is_satisfied_by(&customer));

        let mut unknown = registration();
        unknown.date_of_birth = None;
        let (no_birth_date, _) = Customer::register(unknown).unwrap();
        assert!(!spec_on.is_satisfied_by(&no_birth_date));
    }

    #[test]
    fn test_specifications_render_as_where_clause() {
        let spec = CustomerSpecifications::by_status(CustomerStatus::Blocked).and(CustomerSpecifications::not_deleted());
        let rendered = spec.to_expression().to_string();
        assert!(rendered.contains("status = 'Blocked'"));
        assert!(rendered.contains("is_deleted = false"));
    }
}
