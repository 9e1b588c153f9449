use async_trait::async_trait;

use crate::seedwork::core::errors::DomainResult;

// ============================================================================
// Business Rule Primitives
// ============================================================================
//
// Evaluation (`is_broken`) is pure and never fails.
// Enforcement (`validate`) turns a broken rule into a BusinessRuleViolation.
//
// ============================================================================

/// A named, evaluable predicate encoding one domain constraint
pub trait BusinessRule {
    /// `true` when the rule is violated
    fn is_broken(&self) -> bool;

    /// Human-readable explanation shown when the rule is broken
    fn message(&self) -> String;

    /// Stable identifier, used for metrics labels and error details
    fn name(&self) -> &'static str;
}

impl<R: BusinessRule + ?Sized> BusinessRule for &R {
    fn is_broken(&self) -> bool {
        (**self).is_broken()
    }

    fn message(&self) -> String {
        (**self).message()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<R: BusinessRule + ?Sized> BusinessRule for Box<R> {
    fn is_broken(&self) -> bool {
        (**self).is_broken()
    }

    fn message(&self) -> String {
        (**self).message()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Rule violation raised by enforcement wrappers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct BusinessRuleViolation {
    message: String,
    broken_rules: Vec<&'static str>,
}

impl BusinessRuleViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            broken_rules: Vec::new(),
        }
    }

    pub fn with_rules(message: impl Into<String>, broken_rules: Vec<&'static str>) -> Self {
        Self {
            message: message.into(),
            broken_rules,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Names of the rules that were broken
    pub fn broken_rules(&self) -> &[&'static str] {
        &self.broken_rules
    }
}

/// Behaviour every rule gets for free
pub trait BusinessRuleExt: BusinessRule {
    fn is_satisfied(&self) -> bool {
        !self.is_broken()
    }

    fn validate(&self) -> Result<(), BusinessRuleViolation> {
        if self.is_broken() {
            return Err(BusinessRuleViolation::with_rules(self.message(), vec![self.name()]));
        }
        Ok(())
    }
}

impl<R: BusinessRule + ?Sized> BusinessRuleExt for R {}

/// Rules that need I/O to be evaluated (uniqueness checks, remote lookups)
#[async_trait]
pub trait AsyncBusinessRule: Send + Sync {
    async fn is_broken(&self) -> DomainResult<bool>;

    fn message(&self) -> String;

    fn name(&self) -> &'static str;

    async fn validate_async(&self) -> DomainResult<()> {
        if self.is_broken().await? {
            return Err(BusinessRuleViolation::with_rules(self.message(), vec![self.name()]).into());
        }
        Ok(())
    }
}

/// Ad-hoc rule built from a closure, handy for one-off gating checks
pub struct InlineRule<F> {
    name: &'static str,
    message: String,
    broken: F,
}

impl<F: Fn() -> bool> InlineRule<F> {
    pub fn new(name: &'static str, message: impl Into<String>, broken: F) -> Self {
        Self {
            name,
            message: message.into(),
            broken,
        }
    }
}

impl<F: Fn() -> bool> BusinessRule for InlineRule<F> {
    fn is_broken(&self) -> bool {
        (self.broken)()
    }

    fn message(&self) -> String {
        self.message.clone()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MinimumBalanceRule {
        balance: i64,
    }

    impl BusinessRule for MinimumBalanceRule {
        fn is_broken(&self) -> bool {
            self.balance < 0
        }

        fn message(&self) -> String {
            format!("Balance cannot be negative (was {})", self.balance)
        }

        fn name(&self) -> &'static str {
            "MinimumBalance"
        }
    }

    #[test]
    fn test_satisfied_rule_validates() {
        let rule = MinimumBalanceRule { balance: 10 };
        assert!(rule.is_satisfied());
        assert!(rule.validate().is_ok());
    }

    #[test]
    fn test_broken_rule_fails_with_message_and_name() {
        let rule = MinimumBalanceRule { balance: -5 };
        assert!(!rule.is_satisfied());

        let err = rule.validate().unwrap_err();
        assert_eq!(err.message(), "Balance cannot be negative (was -5)");
        assert_eq!(err.broken_rules(), &["MinimumBalance"]);
    }

    #[test]
    fn test_boxed_and_borrowed_rules_delegate() {
        let boxed: Box<dyn BusinessRule> = Box::new(MinimumBalanceRule { balance: -1 });
        let borrowed = &boxed;

        assert!(boxed.is_broken());
        assert!(borrowed.is_broken());
        assert_eq!(borrowed.name(), "MinimumBalance");
    }

    #[test]
    fn test_inline_rule() {
        let flag = true;
        let rule = InlineRule::new("FeatureFlag", "Feature is disabled", || !flag);
        assert!(rule.is_satisfied());
    }

    struct AlwaysTakenRule;

    #[async_trait]
    impl AsyncBusinessRule for AlwaysTakenRule {
        async fn is_broken(&self) -> DomainResult<bool> {
            Ok(true)
        }

        fn message(&self) -> String {
            "Username is already taken".to_string()
        }

        fn name(&self) -> &'static str {
            "UsernameMustBeUnique"
        }
    }

    #[tokio::test]
    async fn test_async_rule_validate() {
        let err = AlwaysTakenRule.validate_async().await.unwrap_err();
        assert_eq!(err.to_string(), "Username is already taken");
    }
}
