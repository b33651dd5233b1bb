//! Pending OAuth state model.

use serde::{Deserialize, Serialize};

/// One-time state record binding an OAuth redirect round-trip to a user
/// identity (document ID = state).
///
/// Created when an authorization URL is issued, deleted when the callback
/// consumes it. States older than the TTL are rejected at consumption time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAuthState {
    /// Opaque random state token
    pub state: String,
    /// Email the flow was started for
    pub email: String,
    /// Display name the flow was started for
    pub name: String,
    /// When the state was issued (ISO 8601)
    pub created_at: String,
}

/// How long an issued state stays valid.
pub const AUTH_STATE_TTL_MINUTES: i64 = 10;

impl PendingAuthState {
    /// Whether this state has outlived its TTL at the given instant.
    ///
    /// An unparsable `created_at` counts as expired so a corrupt record
    /// can never be replayed.
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        match chrono::DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(created) => {
                now - created.with_timezone(&chrono::Utc)
                    > chrono::Duration::minutes(AUTH_STATE_TTL_MINUTES)
            }
            Err(_) => true,
        }
    }
}
