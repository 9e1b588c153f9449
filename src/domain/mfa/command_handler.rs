use std::sync::Arc;
use uuid::Uuid;

use crate::messaging::DomainEventDispatcher;
use crate::metrics::Metrics;
use crate::seedwork::{CommandExecutor, CommandOutcome, DomainResult, Repository};
use crate::utils::RetryConfig;
use super::aggregate::MfaMethod;
use super::commands::{CreateMfaMethod, MfaCommand};
use super::events::MfaEvent;
use super::specifications::MfaMethodSpecifications;

// ============================================================================
// MFA Command Handler
// ============================================================================
//
// Setup operations that produce secrets return them to the caller once;
// only the stored aggregate keeps them afterwards.
//
// ============================================================================

pub struct MfaCommandHandler {
    executor: CommandExecutor<MfaMethod>,
}

impl MfaCommandHandler {
    pub fn new(
        repository: Arc<dyn Repository<MfaMethod>>,
        dispatcher: Arc<dyn DomainEventDispatcher<MfaEvent>>,
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

    pub async fn create(&self, input: CreateMfaMethod, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        let (method, events) = MfaMethod::create(input)?;
        self.executor.create(method, events, correlation_id).await
    }

    pub async fn handle(&self, mfa_method_id: Uuid, command: MfaCommand, correlation_id: Uuid) -> DomainResult<CommandOutcome> {
        self.executor.execute(mfa_method_id, &command, correlation_id).await
    }

    /// Generate, store and return a new TOTP secret
    pub async fn generate_totp_secret(&self, mfa_method_id: Uuid, correlation_id: Uuid) -> DomainResult<String> {
        let mut method = self.executor.load(mfa_method_id).await?;
        let (secret, events) = method.generate_totp_secret()?;
        self.executor.commit_changes(method, events, correlation_id).await?;
        Ok(secret)
    }

    /// Replace the backup-code pool and return the fresh codes
    pub async fn generate_backup_codes(
        &self,
        mfa_method_id: Uuid,
        count: usize,
        correlation_id: Uuid,
    ) -> DomainResult<Vec<String>> {
        let mut method = self.executor.load(mfa_method_id).await?;
        let (codes, events) = method.generate_backup_codes(count)?;
        self.executor.commit_changes(method, events, correlation_id).await?;
        Ok(codes)
    }

    pub async fn load(&self, mfa_method_id: Uuid) -> DomainResult<MfaMethod> {
        self.executor.load(mfa_method_id).await
    }

    pub async fn methods_for_user(&self, user_id: Uuid) -> DomainResult<Vec<MfaMethod>> {
        self.executor
            .repository()
            .find(&MfaMethodSpecifications::for_user(user_id))
            .await
    }
}
