// SPDX-License-Identifier: MIT

//! Calendar-Bridge API Server
//!
//! Connects user accounts to Google Calendar: OAuth authorization-code
//! flow, per-user token storage with silent refresh, and event
//! create/list operations on the primary calendar.

use calendar_bridge::{
    config::Config,
    db::FirestoreDb,
    services::{CalendarService, GoogleAuthService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Calendar-Bridge API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize services
    let auth_service = GoogleAuthService::new(&config, db.clone());
    let calendar_service = CalendarService::new(auth_service.clone());
    tracing::info!(
        client_id = %config.google_client_id,
        "Google OAuth client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        auth_service,
        calendar_service,
    });

    // Build router
    let app = calendar_bridge::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("calendar_bridge=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
