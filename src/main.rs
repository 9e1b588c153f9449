use anyhow::Context;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use account_domain::config::AppConfig;
use account_domain::domain::customer::{
    Customer, CustomerCommand, CustomerCommandHandler, CustomerEvent, CustomerOperation, CustomerSpecifications,
    RegisterCustomer,
};
use account_domain::domain::mfa::{CreateMfaMethod, MfaCommand, MfaCommandHandler, MfaEvent, MfaMethod, MfaType};
use account_domain::domain::value_objects::{Address, Email, NationalCode, PhoneNumber};
use account_domain::messaging::{
    DomainEventDispatcher, InProcessDispatcher, LoggingEventHandler, RedpandaClient, RedpandaEventPublisher,
};
use account_domain::metrics::{self, Metrics};
use account_domain::seedwork::{ensure_snapshot_schema, DomainEvent, ScyllaRepository};
use account_domain::utils::RetryConfig;

/// Broker publisher when Redpanda is reachable, log-only dispatch otherwise
fn event_dispatcher<E: DomainEvent>(
    redpanda: Option<&Arc<RedpandaClient>>,
    topic: &str,
) -> Arc<dyn DomainEventDispatcher<E>> {
    match redpanda {
        Some(client) => Arc::new(RedpandaEventPublisher::new(client.clone(), topic)),
        None => Arc::new(InProcessDispatcher::new().with_handler(Arc::new(LoggingEventHandler))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,account_domain=debug"))
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("🚀 Starting account domain demo");
    tracing::debug!(?config, "Configuration loaded");

    // === 1. Create ScyllaDB Session ===
    tracing::info!(nodes = ?config.scylla_nodes, "Connecting to ScyllaDB...");
    let session: Session = SessionBuilder::new()
        .known_nodes(&config.scylla_nodes)
        .build()
        .await
        .context("Failed to connect to ScyllaDB")?;

    session
        .query_unpaged(
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                 {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                config.scylla_keyspace
            ),
            &[],
        )
        .await?;
    session.use_keyspace(&config.scylla_keyspace, false).await?;
    ensure_snapshot_schema(&session).await?;

    let session = Arc::new(session);

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    // actix-web runs on its own single-threaded runtime
    std::thread::spawn(move || {
        let system = actix_web::rt::System::new();
        if let Err(e) = system.block_on(metrics::start_metrics_server(metrics_registry, metrics_port)) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 3. Event dispatch: Redpanda (with circuit breaker) or logging ===
    let redpanda = match RedpandaClient::new(&config.redpanda_brokers) {
        Ok(client) => Some(Arc::new(client.with_metrics(metrics.clone()))),
        Err(e) => {
            tracing::warn!(error = %e, "Redpanda unavailable, events will only be logged");
            None
        }
    };

    let customer_events: Arc<dyn DomainEventDispatcher<CustomerEvent>> =
        event_dispatcher(redpanda.as_ref(), &config.customer_events_topic);
    let mfa_events: Arc<dyn DomainEventDispatcher<MfaEvent>> =
        event_dispatcher(redpanda.as_ref(), &config.mfa_events_topic);

    let retry = RetryConfig::for_conflicts(config.command_max_attempts);

    let customers = CustomerCommandHandler::new(
        Arc::new(ScyllaRepository::<Customer>::new(session.clone()).with_lookup("email")),
        customer_events,
    )
    .with_metrics(metrics.clone())
    .with_retry(retry.clone());

    let mfa = MfaCommandHandler::new(
        Arc::new(ScyllaRepository::<MfaMethod>::new(session.clone()).with_lookup("user_id")),
        mfa_events,
    )
    .with_metrics(metrics.clone())
    .with_retry(retry);

    // === 4. Customer lifecycle ===
    tracing::info!("📝 Demonstrating customer lifecycle");
    let correlation_id = Uuid::now_v7();

    let registered = customers
        .register(
            RegisterCustomer {
                first_name: "Sara".to_string(),
                last_name: "Ahmadi".to_string(),
                email: Email::new(format!("sara.{}@acme.ir", Uuid::now_v7().simple()))?,
                phone_number: Some(PhoneNumber::new("021-88776655")?),
                mobile_number: Some(PhoneNumber::new("+98 912 345 6789")?),
                national_code: Some(NationalCode::new("0012345679")?),
                date_of_birth: chrono::NaiveDate::from_ymd_opt(1992, 3, 14),
                registered_by: "demo".to_string(),
            },
            correlation_id,
        )
        .await?;
    let customer_id = registered.aggregate_id;
    tracing::info!("✅ Customer registered: {}", customer_id);

    if let Err(e) = customers.check_operation(customer_id, CustomerOperation::PlaceOrder).await {
        tracing::info!(error = %e, "Pending customers cannot place orders yet");
    }

    customers
        .handle(customer_id, CustomerCommand::Verify { performed_by: "kyc".to_string() }, correlation_id)
        .await?;
    customers
        .handle(
            customer_id,
            CustomerCommand::ChangeAddress {
                address: Some(Address::new("Valiasr St. 12", "Tehran", "Tehran", "1966733311", "Iran")?),
                performed_by: "demo".to_string(),
            },
            correlation_id,
        )
        .await?;
    let premium = customers
        .handle(
            customer_id,
            CustomerCommand::UpgradeToPremium { performed_by: "sales".to_string() },
            correlation_id,
        )
        .await?;
    tracing::info!("✅ Customer upgraded to premium at version {}", premium.version);

    customers.check_operation(customer_id, CustomerOperation::LocalService).await?;

    let tehran = customers.search(&CustomerSpecifications::in_city("Tehran").paged(0, 10)).await?;
    tracing::info!(total = tehran.total_count, "Customers in Tehran");

    // === 5. MFA lifecycle ===
    tracing::info!("🔐 Demonstrating MFA lifecycle");
    let method_id = mfa
        .create(
            CreateMfaMethod {
                user_id: customer_id,
                mfa_type: MfaType::BackupCodes,
                created_by: "demo".to_string(),
            },
            correlation_id,
        )
        .await?
        .aggregate_id;

    let codes = mfa.generate_backup_codes(method_id, 10, correlation_id).await?;
    mfa.handle(method_id, MfaCommand::Enable { at: chrono::Utc::now() }, correlation_id)
        .await?;

    if let Some(code) = codes.first() {
        let used = mfa
            .handle(
                method_id,
                MfaCommand::UseBackupCode { code: code.clone(), at: chrono::Utc::now() },
                correlation_id,
            )
            .await?;
        tracing::info!(accepted = used.events > 0, "Backup code checked");
    }

    let method = mfa.load(method_id).await?;
    tracing::info!(remaining = method.remaining_backup_codes(), "✅ MFA method ready");

    // Let the producer flush before exit
    tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;
    tracing::info!("🎉 Demo complete!");

    Ok(())
}
