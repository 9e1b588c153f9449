use std::sync::Arc;
use uuid::Uuid;

use crate::domain::value_objects::Email;
use crate::messaging::DomainEventDispatcher;
use crate::metrics::Metrics;
use crate::seedwork::{
    AsyncBusinessRule, BusinessRuleValidator, CommandExecutor, CommandOutcome, DomainError, DomainResult, Page,
    Repository, Specification,
};
use crate::utils::RetryConfig;
use super::aggregate::Customer;
use super::commands::{CustomerCommand, RegisterCustomer};
use super::events::CustomerEvent;
use super::rules::CustomerEmailMustBeUniqueRule;
use super::rules_factory::{CustomerBusinessRulesFactory, CustomerOperation};

// ============================================================================
// Customer Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Unit of Work → Dispatch
//
// Registration and contact updates check email uniqueness first; everything else goes through
// the executor's load → execute → commit cycle with conflict retries.
//
// ============================================================================

pub struct CustomerCommandHandler {
    executor: CommandExecutor<Customer>,
}

impl CustomerCommandHandler {
    pub fn new(
        repository: Arc<dyn Repository<Customer>>,
        dispatcher: Arc<dyn DomainEventDispatcher<CustomerEvent>>,
    ) -> Self {
        Self {
            executor: CommandExecutor::new(repository, dispatcher),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.executor = self.executor.with_metrics(metrics);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.executor = self.executor.with_retry(retry);
        self
    }

    /// Register a new customer; the email must not belong to a live customer
    pub async fn register(&self, input: RegisterCustomer, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        self.ensure_email_available(&input.email, None).await?;

        let (customer, events) = Customer::register(input)?;
        let outcome = self.executor.create(customer, events, correlation_id).await?;

        tracing::info!(
            customer_id = %outcome.aggregate_id,
            correlation_id = %correlation_id,
            "Customer registered"
        );

        Ok(outcome)
    }

    /// Run a command against an existing customer
    pub async fn handle(
        &self,
        customer_id: Uuid,
        command: CustomerCommand,
        correlation_id: Uuid,
    ) -> DomainResult<CommandOutcome> {
        if let CustomerCommand::UpdateContactInfo { email, .. } = &command {
            self.ensure_email_available(email, Some(customer_id)).await?;
        }
        self.executor.execute(customer_id, &command, correlation_id).await
    }

    /// The email must not belong to another live customer
    async fn ensure_email_available(&self, email: &Email, owner: Option<Uuid>) -> DomainResult<()> {
        let mut unique = CustomerEmailMustBeUniqueRule::new(self.executor.repository().clone(), email.clone());
        if let Some(customer_id) = owner {
            unique = unique.excluding(customer_id);
        }
        if let Err(e) = unique.validate_async().await {
            self.executor.record_failure(&e);
            return Err(e);
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn load(&self, customer_id: Uuid) -> DomainResult<Customer> {
        self.executor.load(customer_id).await
    }

    pub async fn search(&self, spec: &Specification<Customer>) -> DomainResult<Page<Customer>> {
        self.executor.repository().find_paged(spec).await
    }

    /// Check whether the customer may perform `operation` right now
    pub async fn check_operation(&self, customer_id: Uuid, operation: CustomerOperation) -> DomainResult<()> {
        let customer = self.load(customer_id).await?;
        let factory = CustomerBusinessRulesFactory::new();
        let result = BusinessRuleValidator::validate(factory.rules_for(&customer, operation)).map_err(DomainError::from);
        if let Err(e) = &result {
            self.executor.record_failure(e);
        }
        result
    }
}
