use super::rule::{BusinessRule, BusinessRuleViolation};

/// Collect-all-errors enforcement over a set of rules.
///
/// Every rule is evaluated (no short circuit) so callers get the complete
/// list of violations, e.g. for user-facing form validation.
pub struct BusinessRuleValidator;

impl BusinessRuleValidator {
    /// Fail with one aggregated violation when any rule is broken
    pub fn validate<I>(rules: I) -> Result<(), BusinessRuleViolation>
    where
        I: IntoIterator,
        I::Item: BusinessRule,
    {
        let mut messages = Vec::new();
        let mut names = Vec::new();

        for rule in rules {
            if rule.is_broken() {
                messages.push(rule.message());
                names.push(rule.name());
            }
        }

        if messages.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            broken_rules = ?names,
            "Business rule validation failed"
        );

        Err(BusinessRuleViolation::with_rules(messages.join("; "), names))
    }

    /// Non-failing variant for conditional logic
    pub fn are_valid<I>(rules: I) -> bool
    where
        I: IntoIterator,
        I::Item: BusinessRule,
    {
        rules.into_iter().all(|rule| !rule.is_broken())
    }

    pub fn broken_messages<I>(rules: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: BusinessRule,
    {
        rules
            .into_iter()
            .filter(|rule| rule.is_broken())
            .map(|rule| rule.message())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seedwork::rules::InlineRule;
    use std::cell::Cell;

    #[test]
    fn test_validate_passes_when_nothing_broken() {
        let a = InlineRule::new("A", "a", || false);
        let b = InlineRule::new("B", "b", || false);

        assert!(BusinessRuleValidator::validate([&a as &dyn BusinessRule, &b]).is_ok());
        assert!(BusinessRuleValidator::are_valid([&a as &dyn BusinessRule, &b]));
    }

    #[test]
    fn test_validate_aggregates_all_broken_messages() {
        let rules: Vec<Box<dyn BusinessRule>> = vec![
            Box::new(InlineRule::new("Email", "Email is disposable", || true)),
            Box::new(InlineRule::new("Active", "Customer must be active", || false)),
            Box::new(InlineRule::new("Adult", "Customer must be an adult", || true)),
        ];

        let err = BusinessRuleValidator::validate(&rules).unwrap_err();
        assert_eq!(err.message(), "Email is disposable; Customer must be an adult");
        assert_eq!(err.broken_rules(), &["Email", "Adult"]);
        assert!(!BusinessRuleValidator::are_valid(&rules));
        assert_eq!(BusinessRuleValidator::broken_messages(&rules).len(), 2);
    }

    #[test]
    fn test_validate_evaluates_every_rule() {
        let evaluated = Cell::new(0);
        let counter = &evaluated;
        let counting = move |broken: bool| {
            InlineRule::new("Counting", "broken", move || {
                counter.set(counter.get() + 1);
                broken
            })
        };

        let rules = [counting(true), counting(true), counting(false)];
        let _ = BusinessRuleValidator::validate(&rules);

        assert_eq!(evaluated.get(), 3);
    }
}
