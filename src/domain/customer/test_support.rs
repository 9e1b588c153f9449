use chrono::NaiveDate;

use crate::domain::value_objects::{Email, NationalCode, PhoneNumber};
use super::{Customer, CustomerEvent, RegisterCustomer};

/// Registration input for an adult customer born 2000-05-20
pub(crate) fn registration() -> RegisterCustomer {
    RegisterCustomer {
        first_name: "Reza".to_string(),
        last_name: "Karimi".to_string(),
        email: Email::new("reza.karimi@acme.ir").unwrap(),
        phone_number: Some(PhoneNumber::new("021-88776655").unwrap()),
        mobile_number: Some(PhoneNumber::new("+98 912 123 4567").unwrap()),
        national_code: Some(NationalCode::new("0012345679").unwrap()),
        date_of_birth: NaiveDate::from_ymd_opt(2000, 5, 20),
        registered_by: "registrar".to_string(),
    }
}

/// Freshly registered, still Pending
pub(crate) fn adult_customer() -> (Customer, Vec<CustomerEvent>) {
    Customer::register(registration()).unwrap()
}

/// Registered and activated (version 2)
pub(crate) fn active_customer() -> Customer {
    let (mut customer, _) = adult_customer();
    customer.activate("admin").unwrap();
    customer
}
