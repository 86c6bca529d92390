//! Order service entry point.

use api::config::{Config, LogFormat};
use fulfillment::{HttpInventoryClient, KafkaEventPublisher};
use order_store::PostgresOrderStore;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Connects to Postgres, retrying while the database comes up.
async fn connect_with_retry(config: &Config) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                tracing::info!(attempt, "connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < config.db_connect_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = config.db_connect_attempts,
                    "database not ready, retrying"
                );
                attempt += 1;
                tokio::time::sleep(config.db_retry_interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::from_env();

    // 1. Initialize tracing
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Connect to the order store and apply migrations
    let pool = connect_with_retry(&config).await?;
    let store = PostgresOrderStore::new(pool);
    store.run_migrations().await?;

    // 4. Build the inventory client and event publisher
    let inventory = HttpInventoryClient::new(&config.inventory_url, config.inventory_timeout)?;
    let publisher = KafkaEventPublisher::new(&config.kafka_brokers, &config.events_topic)?;
    tracing::info!(
        inventory_url = %config.inventory_url,
        brokers = %config.kafka_brokers,
        topic = %config.events_topic,
        "collaborators configured"
    );

    // 5. Build the application
    let state = api::create_state(store, inventory, publisher);
    let in_flight = state.fulfillment.in_flight().clone();
    let app = api::create_app(state, metrics_handle);

    // 6. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting order service");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 7. Let background stock updates and events finish
    let pending = in_flight.count();
    if pending > 0 {
        tracing::info!(pending, "waiting for order side effects");
        if tokio::time::timeout(config.shutdown_grace, in_flight.drained())
            .await
            .is_err()
        {
            tracing::warn!(
                abandoned = in_flight.count(),
                "shutdown grace elapsed; abandoning order side effects"
            );
        }
    }

    tracing::info!("server shut down gracefully");
    Ok(())
}
