// SPDX-License-Identifier: MIT

use calendar_bridge::config::Config;
use calendar_bridge::db::FirestoreDb;
use calendar_bridge::routes::create_router;
use calendar_bridge::services::{CalendarService, GoogleAuthService};
use calendar_bridge::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let auth_service = GoogleAuthService::new(&config, db.clone());
    let calendar_service = CalendarService::new(auth_service.clone());

    let state = Arc::new(AppState {
        config,
        db,
        auth_service,
        calendar_service,
    });

    (create_router(state.clone()), state)
}
