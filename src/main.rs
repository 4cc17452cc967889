use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transfer_booking_backend::{
    collaborators::{
        notify::{LogNotifier, LogWorkOrderSink, WebhookNotifier},
        Notifier,
    },
    config::Config,
    db::{self, SeaOrmDriverDirectory, SeaOrmLedger, SeaOrmReservationStore},
    middleware::rate_limit::log_request,
    routes,
    services::{Collaborators, ReservationService},
    utils::reservation_code::ReservationCodeGenerator,
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transfer_booking_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    // Driver notifications go to the SMS gateway webhook when one is configured
    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => {
            tracing::info!("Driver notifications via webhook {}", url);
            Arc::new(WebhookNotifier::new(url.clone()))
        }
        None => {
            tracing::warn!("NOTIFY_WEBHOOK_URL not set, driver notifications are only logged");
            Arc::new(LogNotifier)
        }
    };

    let reservations = ReservationService::new(
        Collaborators {
            store: Arc::new(SeaOrmReservationStore::new(db.clone())),
            drivers: Arc::new(SeaOrmDriverDirectory::new(db.clone())),
            ledger: Arc::new(SeaOrmLedger::new(db.clone())),
            notifier,
            work_orders: Arc::new(LogWorkOrderSink),
        },
        ReservationCodeGenerator::new(config.reservation_code_prefix.clone()),
        config.collaborator_timeout(),
    );

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        reservations: Arc::new(reservations),
    };

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
