// ============================================================================
// Business Rule Engine
// ============================================================================
//
// - rule: the BusinessRule contract, enforcement extension, async rules
// - composite: report every broken child at once
// - validator: aggregate enforcement over arbitrary rule sets
//
// ============================================================================

pub mod composite;
pub mod rule;
pub mod validator;

pub use composite::CompositeBusinessRule;
pub use rule::{AsyncBusinessRule, BusinessRule, BusinessRuleExt, BusinessRuleViolation, InlineRule};
pub use validator::BusinessRuleValidator;
