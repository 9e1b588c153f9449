use super::rule::BusinessRule;

const DEFAULT_SUMMARY: &str = "One or more business rules were violated";

/// Groups rules so every violation is reported at once instead of failing on
/// the first. A composite is itself a rule and can be nested.
pub struct CompositeBusinessRule<'a> {
    summary: String,
    rules: Vec<Box<dyn BusinessRule + 'a>>,
}

impl<'a> CompositeBusinessRule<'a> {
    pub fn new(rules: Vec<Box<dyn BusinessRule + 'a>>) -> Self {
        Self::with_summary(DEFAULT_SUMMARY, rules)
    }

    pub fn with_summary(summary: impl Into<String>, rules: Vec<Box<dyn BusinessRule + 'a>>) -> Self {
        Self {
            summary: summary.into(),
            rules,
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn total_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn broken_rules(&self) -> Vec<&(dyn BusinessRule + 'a)> {
        self.rules
            .iter()
            .filter(|rule| rule.is_broken())
            .map(|rule| rule.as_ref())
            .collect()
    }

    pub fn broken_rules_count(&self) -> usize {
        self.rules.iter().filter(|rule| rule.is_broken()).count()
    }

    pub fn rules(&self) -> &[Box<dyn BusinessRule + 'a>] {
        &self.rules
    }
}

impl BusinessRule for CompositeBusinessRule<'_> {
    fn is_broken(&self) -> bool {
        self.rules.iter().any(|rule| rule.is_broken())
    }

    fn message(&self) -> String {
        let broken: Vec<String> = self.broken_rules().iter().map(|rule| rule.message()).collect();
        if broken.is_empty() {
            return String::new();
        }
        format!("{}: {}", self.summary, broken.join("; "))
    }

    fn name(&self) -> &'static str {
        "CompositeBusinessRule"
    }
}
