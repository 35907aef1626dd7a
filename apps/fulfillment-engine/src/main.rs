//! Fulfillment Engine Binary
//!
//! Starts the order fulfillment HTTP service and the auto-cancel scheduler.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fulfillment-engine
//! ```
//!
//! # Environment Variables
//!
//! - `FULFILLMENT_CONFIG`: Path to the YAML config (default: `config.yaml`;
//!   a missing file means built-in defaults)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use fulfillment_engine::application::services::{FulfillmentScheduler, OrderLocks};
use fulfillment_engine::application::use_cases::{
    CreateOrderUseCase, QueryOrdersUseCase, TransitionOrderUseCase, UpdateOrderUseCase,
};
use fulfillment_engine::config::{Config, load_config_or_default};
use fulfillment_engine::infrastructure::http::{AppState, create_router};
use fulfillment_engine::infrastructure::notification::TracingNotifier;
use fulfillment_engine::infrastructure::payment::SimulatedPaymentGateway;
use fulfillment_engine::infrastructure::persistence::InMemoryOrderRepository;
use fulfillment_engine::telemetry::init_tracing;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Time the scheduler gets to finish its current tick after shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Concrete type alias for the transition use case.
type ConcreteTransitionOrderUseCase =
    TransitionOrderUseCase<SimulatedPaymentGateway, TracingNotifier, InMemoryOrderRepository>;

/// Application use cases wired together for dependency injection.
struct UseCases {
    create_order: Arc<CreateOrderUseCase<InMemoryOrderRepository, TracingNotifier>>,
    transition_order: Arc<ConcreteTransitionOrderUseCase>,
    update_order: Arc<UpdateOrderUseCase<InMemoryOrderRepository>>,
    query_orders: Arc<QueryOrdersUseCase<InMemoryOrderRepository>>,
    order_repo: Arc<InMemoryOrderRepository>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config_or_default(None).context("loading configuration")?;
    init_tracing(&config.observability.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        policy_version = config.policy.version,
        "Starting fulfillment engine"
    );

    let use_cases = create_use_cases(&config);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let scheduler_handle = start_scheduler(&config, &use_cases, &shutdown_tx);
    let http_handle = start_http_server(&config, &use_cases, shutdown_tx.clone()).await?;

    if let Err(e) = http_handle.await {
        tracing::error!(error = %e, "HTTP server task failed");
    }
    tracing::info!("HTTP server stopped");

    if let Some(handle) = scheduler_handle {
        // The server may have stopped on its own; make sure the scheduler hears it.
        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
            Ok(Ok(())) => tracing::info!("Scheduler stopped"),
            Ok(Err(e)) => tracing::error!(error = %e, "Scheduler task failed"),
            Err(_) => tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "Scheduler did not stop in time"
            ),
        }
    }

    Ok(())
}

/// Wire adapters into use cases.
fn create_use_cases(config: &Config) -> UseCases {
    let order_repo = Arc::new(InMemoryOrderRepository::new());
    let notifier = Arc::new(TracingNotifier::new());
    let locks = Arc::new(OrderLocks::new());
    let payment = Arc::new(
        SimulatedPaymentGateway::new()
            .with_failure_rate(config.payment.simulated_failure_rate)
            .with_latency(config.payment.simulated_latency()),
    );

    tracing::info!(
        failure_rate = config.payment.simulated_failure_rate,
        latency_ms = config.payment.simulated_latency_ms,
        "Using simulated payment gateway"
    );

    let create_order = Arc::new(CreateOrderUseCase::new(
        Arc::clone(&order_repo),
        Arc::clone(&notifier),
    ));
    let transition_order = Arc::new(
        TransitionOrderUseCase::new(
            payment,
            notifier,
            Arc::clone(&order_repo),
            Arc::clone(&locks),
        )
        .with_max_conflict_retries(config.payment.max_conflict_retries),
    );
    let update_order = Arc::new(UpdateOrderUseCase::new(Arc::clone(&order_repo), locks));
    let query_orders = Arc::new(QueryOrdersUseCase::new(Arc::clone(&order_repo)));

    UseCases {
        create_order,
        transition_order,
        update_order,
        query_orders,
        order_repo,
    }
}

/// Spawn the auto-cancel scheduler unless disabled.
fn start_scheduler(
    config: &Config,
    use_cases: &UseCases,
    shutdown_tx: &broadcast::Sender<()>,
) -> Option<JoinHandle<()>> {
    if !config.scheduler.enabled {
        tracing::info!("Fulfillment scheduler disabled");
        return None;
    }

    let scheduler = FulfillmentScheduler::new(
        Arc::clone(&use_cases.transition_order),
        Arc::clone(&use_cases.order_repo),
        config.policy.clone(),
        config.payment.refund_timeout(),
    );
    let shutdown_rx = shutdown_tx.subscribe();

    Some(tokio::spawn(async move {
        scheduler.run(shutdown_rx).await;
    }))
}

/// Start the HTTP server with graceful shutdown support.
async fn start_http_server(
    config: &Config,
    use_cases: &UseCases,
    shutdown_tx: broadcast::Sender<()>,
) -> anyhow::Result<JoinHandle<()>> {
    let http_state = AppState {
        create_order: Arc::clone(&use_cases.create_order),
        transition_order: Arc::clone(&use_cases.transition_order),
        update_order: Arc::clone(&use_cases.update_order),
        query_orders: Arc::clone(&use_cases.query_orders),
        policy: Arc::new(config.policy.clone()),
        refund_timeout: config.payment.refund_timeout(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    let app = create_router(http_state);

    let http_addr: SocketAddr = config
        .server
        .socket_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.socket_address()))?;

    tracing::info!(%http_addr, "HTTP server starting");
    tracing::info!("Endpoints:");
    tracing::info!("  GET   /health");
    tracing::info!("  POST  /api/v1/orders");
    tracing::info!("  GET   /api/v1/orders");
    tracing::info!("  GET   /api/v1/orders/{{id}}");
    tracing::info!("  POST  /api/v1/orders/{{id}}/transitions");
    tracing::info!("  PATCH /api/v1/orders/{{id}}/notes");
    tracing::info!("  PUT   /api/v1/orders/{{id}}/shipping_address");
    tracing::info!("  PUT   /api/v1/orders/{{id}}/items");

    let listener = TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding {http_addr}"))?;
    let http_server =
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_tx));

    let handle = tokio::spawn(async move {
        if let Err(e) = http_server.await {
            tracing::error!("HTTP server error: {e}");
        }
    });

    Ok(handle)
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
///
/// # Panics
///
/// Panics if signal handlers cannot be installed; the process could not
/// respond to termination otherwise.
#[allow(clippy::expect_used)]
async fn shutdown_signal(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    let _ = shutdown_tx.send(());
    tracing::info!("Graceful shutdown started");
}
