use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::seedwork::{Criteria, Specification};
use super::aggregate::MfaMethod;
use super::value_objects::MfaType;

pub struct MfaMethodSpecifications;

impl MfaMethodSpecifications {
    /// Live methods of one user, oldest first
    pub fn for_user(user_id: Uuid) -> Specification<MfaMethod> {
        Specification::new(Criteria::eq("user_id", user_id).and(Criteria::eq("is_deleted", false)))
            .order_by("created_at")
    }

    pub fn enabled() -> Specification<MfaMethod> {
        Specification::new(Criteria::eq("is_enabled", true))
    }

    pub fn of_type(mfa_type: MfaType) -> Specification<MfaMethod> {
        Specification::new(Criteria::eq("mfa_type", mfa_type.as_str()))
    }

    /// Methods still inside their lockout window at `now`
    pub fn locked_at(now: DateTime<Utc>) -> Specification<MfaMethod> {
        Specification::new(Criteria::gt("locked_until", now))
    }
}
