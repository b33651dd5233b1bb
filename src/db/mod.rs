//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// One-time OAuth states (keyed by the state token)
    pub const AUTH_STATES: &str = "auth_states";
}
