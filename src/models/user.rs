//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// User profile stored in Firestore (document ID = email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Email address used as the account key
    pub email: String,
    /// Display name
    pub name: String,
    /// Email of the linked Google account (may differ from `email`)
    pub google_email: Option<String>,
    /// OAuth token bundle, present once the user has authenticated
    pub tokens: Option<TokenBundle>,
    /// When the user last completed the OAuth flow (ISO 8601)
    pub authenticated_at: Option<String>,
}

/// OAuth token bundle stored with a user.
///
/// If `refresh_token` is None, the bundle becomes permanently unusable
/// once the access token expires; Google only returns a refresh token on
/// consent-prompted grants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: Option<String>,
    /// Token endpoint the bundle was issued by
    pub token_uri: String,
    /// When the access token expires (ISO 8601)
    pub expires_at: String,
}

impl TokenBundle {
    /// Merge a silent-refresh result into the bundle.
    ///
    /// Only the access token and its expiry change; the refresh token and
    /// token URI are carried through untouched.
    pub fn apply_refresh(
        &mut self,
        access_token: String,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at.to_rfc3339();
    }
}
