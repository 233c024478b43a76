//! Clinic booking HTTP server.

use clinic_booking::{
    booking::BookingCoordinator,
    config::Config,
    notifier::{ChannelNotifier, LogNotificationHandler, NotificationConsumer},
    projections::{BookingQueries, InMemoryProfileDirectory},
    server::{build_router, AppState},
    stores::{InMemoryAppointmentStore, InMemorySlotStore},
};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    // Initialize tracing from the configured log level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.server.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("clinic_booking=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Clinic Booking HTTP Server");
    info!(
        host = %config.server.host,
        port = config.server.port,
        log_level = %config.server.log_level,
        shutdown_timeout = config.server.shutdown_timeout,
        notifier_queue_depth = config.notifier.queue_depth,
        "Configuration loaded"
    );

    // Stores (write side)
    let slots = Arc::new(InMemorySlotStore::new());
    let appointments = Arc::new(InMemoryAppointmentStore::new());
    info!("Stores initialized");

    // Notification pipeline
    let (notifier, events_rx) = ChannelNotifier::new(config.notifier.queue_depth);
    let consumer =
        NotificationConsumer::new(events_rx, vec![Arc::new(LogNotificationHandler)]);
    tokio::spawn(consumer.run());
    info!("Notification consumer started");

    // Booking coordinator
    let coordinator = Arc::new(BookingCoordinator::new(
        slots.clone(),
        appointments.clone(),
        Arc::new(notifier),
    ));

    // Read side
    let directory = Arc::new(InMemoryProfileDirectory::new());
    let queries = Arc::new(BookingQueries::new(slots, appointments, directory));

    let state = AppState::new(coordinator, queries);
    let router = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Listening");

    // The signal future tells both axum (stop accepting) and main (start the
    // shutdown clock).
    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, router).with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        })
        .into_future(),
    );

    tokio::select! {
        joined = &mut server => joined??,
        _ = signal_rx => {
            let drain = Duration::from_secs(config.server.shutdown_timeout);
            match tokio::time::timeout(drain, server).await {
                Ok(joined) => joined??,
                Err(_) => tracing::warn!(
                    seconds = config.server.shutdown_timeout,
                    "In-flight requests did not drain within the shutdown timeout"
                ),
            }
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C / SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
