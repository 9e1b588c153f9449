// Private module declaration
mod server;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec,
    IntGauge, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Business rule violations (which rules reject commands)
// - Aggregate commits (throughput, latency, optimistic-concurrency conflicts)
// - Domain event dispatch outcomes
// - Retry attempts and outcomes
// - Circuit breaker state transitions
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Business Rule Metrics
    pub rule_violations_total: IntCounterVec,

    // Persistence Metrics
    pub aggregate_commits_total: IntCounterVec,
    pub commit_duration: HistogramVec,
    pub concurrency_conflicts_total: IntCounterVec,

    // Domain Event Metrics
    pub events_dispatched_total: IntCounterVec,
    pub events_failed_total: IntCounterVec,
    pub events_failed: IntCounter,

    // Retry Metrics
    pub retry_attempts_total: IntCounterVec,
    pub retry_success: IntCounterVec,
    pub retry_failure: IntCounterVec,

    // Circuit Breaker Metrics
    pub circuit_breaker_state: IntGauge,
    pub circuit_breaker_transitions: IntCounterVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // Business Rule Metrics
        let rule_violations_total = IntCounterVec::new(
            Opts::new("business_rule_violations_total", "Total broken business rules by rule name"),
            &["rule"],
        )?;
        registry.register(Box::new(rule_violations_total.clone()))?;

        // Persistence Metrics
        let aggregate_commits_total = IntCounterVec::new(
            Opts::new("aggregate_commits_total", "Total aggregate changes persisted"),
            &["aggregate_type", "kind"],
        )?;
        registry.register(Box::new(aggregate_commits_total.clone()))?;

        let commit_duration = HistogramVec::new(
            HistogramOpts::new("aggregate_commit_duration_seconds", "Aggregate save duration")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["aggregate_type"],
        )?;
        registry.register(Box::new(commit_duration.clone()))?;

        let concurrency_conflicts_total = IntCounterVec::new(
            Opts::new("concurrency_conflicts_total", "Optimistic concurrency conflicts on save"),
            &["aggregate_type"],
        )?;
        registry.register(Box::new(concurrency_conflicts_total.clone()))?;

        // Domain Event Metrics
        let events_dispatched_total = IntCounterVec::new(
            Opts::new("domain_events_dispatched_total", "Domain events delivered to the dispatcher"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_dispatched_total.clone()))?;

        let events_failed_total = IntCounterVec::new(
            Opts::new("domain_events_failed_by_type_total", "Domain events whose dispatch failed"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_failed_total.clone()))?;

        let events_failed = IntCounter::new(
            "domain_events_failed_total",
            "Total domain events whose dispatch failed",
        )?;
        registry.register(Box::new(events_failed.clone()))?;

        // Retry Metrics
        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Total retry attempts"),
            &["operation", "attempt"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        let retry_success = IntCounterVec::new(
            Opts::new("retry_success_total", "Total successful retries"),
            &["operation"],
        )?;
        registry.register(Box::new(retry_success.clone()))?;

        let retry_failure = IntCounterVec::new(
            Opts::new("retry_failure_total", "Total failed retries after all attempts"),
            &["operation"],
        )?;
        registry.register(Box::new(retry_failure.clone()))?;

        // Circuit Breaker Metrics
        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        let circuit_breaker_transitions = IntCounterVec::new(
            Opts::new("circuit_breaker_transitions_total", "Circuit breaker state transitions"),
            &["from_state", "to_state"],
        )?;
        registry.register(Box::new(circuit_breaker_transitions.clone()))?;

        Ok(Self {
            registry,
            rule_violations_total,
            aggregate_commits_total,
            commit_duration,
            concurrency_conflicts_total,
            events_dispatched_total,
            events_failed_total,
            events_failed,
            retry_attempts_total,
            retry_success,
            retry_failure,
            circuit_breaker_state,
            circuit_breaker_transitions,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record the rules that rejected a command
    pub fn record_rule_violations(&self, rules: &[&str]) {
        for rule in rules {
            self.rule_violations_total.with_label_values(&[*rule]).inc();
        }
    }

    /// Helper to record a persisted aggregate change
    pub fn record_commit(&self, aggregate_type: &str, kind: &str, duration_secs: f64) {
        self.aggregate_commits_total.with_label_values(&[aggregate_type, kind]).inc();
        self.commit_duration.with_label_values(&[aggregate_type]).observe(duration_secs);
    }

    pub fn record_concurrency_conflict(&self, aggregate_type: &str) {
        self.concurrency_conflicts_total.with_label_values(&[aggregate_type]).inc();
    }

    /// Helper to record domain event dispatch
    pub fn record_event_dispatch(&self, event_type: &str, success: bool) {
        if success {
            self.events_dispatched_total.with_label_values(&[event_type]).inc();
        } else {
            self.events_failed.inc();
            self.events_failed_total.with_label_values(&[event_type]).inc();
        }
    }

    /// Helper to record retry attempt
    pub fn record_retry_attempt(&self, operation: &str, attempt: u32) {
        self.retry_attempts_total.with_label_values(&[operation, &attempt.to_string()]).inc();
    }

    /// Helper to record retry outcome
    pub fn record_retry_outcome(&self, operation: &str, success: bool) {
        if success {
            self.retry_success.with_label_values(&[operation]).inc();
        } else {
            self.retry_failure.with_label_values(&[operation]).inc();
        }
    }

    /// Helper to update circuit breaker state
    pub fn update_circuit_breaker_state(&self, state: u8) {
        self.circuit_breaker_state.set(state as i64);
    }

    /// Helper to record circuit breaker transition
    pub fn record_circuit_breaker_transition(&self, from_state: &str, to_state: &str) {
        self.circuit_breaker_transitions.with_label_values(&[from_state, to_state]).inc();
    }
}
