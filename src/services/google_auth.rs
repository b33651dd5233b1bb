// SPDX-License-Identifier: MIT

//! Google OAuth client and per-user token lifecycle.
//!
//! Handles:
//! - Consent URL construction (offline access, incremental scopes)
//! - Authorization-code exchange and profile lookup
//! - Token storage keyed by user email
//! - Silent refresh when the access token has expired

use crate::config::Config;
use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{PendingAuthState, TokenBundle, User};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Margin before token expiration when we proactively refresh.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Low-level Google OAuth client.
#[derive(Clone)]
pub struct GoogleAuthClient {
    http: reqwest::Client,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleAuthClient {
    /// Create a new OAuth client from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_endpoints(
            config,
            GOOGLE_TOKEN_URL.to_string(),
            GOOGLE_USERINFO_URL.to_string(),
        )
    }

    /// Create a client pointing at alternate token/userinfo endpoints.
    ///
    /// Used by tests to drive the exchange and refresh paths against a
    /// local mock server.
    pub fn with_endpoints(config: &Config, token_url: String, userinfo_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url,
            userinfo_url,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
        }
    }

    /// Build the consent URL for the given state token.
    ///
    /// Requests offline access (so a refresh token is issued) and
    /// incremental scope grants.
    pub fn authorization_url(&self, state: &str) -> Result<String, AppError> {
        if self.client_id.is_empty() {
            return Err(AppError::Configuration("GOOGLE_CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(AppError::Configuration("GOOGLE_CLIENT_SECRET"));
        }

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}\
             &access_type=offline&prompt=consent&include_granted_scopes=true&state={}",
            GOOGLE_AUTH_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(CALENDAR_SCOPE),
            urlencoding::encode(state)
        ))
    }

    /// Exchange a one-time authorization code for a token bundle.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::GoogleApi(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Failed to parse token response: {}", e)))
    }

    /// Fetch the authenticated Google account's profile.
    pub async fn fetch_userinfo(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!(
                "Userinfo failed: HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Failed to parse userinfo: {}", e)))
    }

    /// Refresh an expired access token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token refresh failed");
            return Err(AppError::GoogleApi(format!(
                "Token refresh failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Failed to parse refresh response: {}", e)))
    }
}

/// Token exchange response from the Google token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    /// Only present on consent-prompted grants
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

/// Refresh response (no new refresh token is issued).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Profile of the Google account that granted access.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Credentials ready for Calendar API calls.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Credentials {
    /// Whether the access token is expired (or about to expire) at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= self.expires_at
    }
}

/// Generate an opaque, URL-safe state token (32 random bytes).
pub fn generate_state() -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

// ─────────────────────────────────────────────────────────────────────────────
// GoogleAuthService - High-level auth manager
// ─────────────────────────────────────────────────────────────────────────────

/// High-level auth manager that owns the OAuth client and token storage.
#[derive(Clone)]
pub struct GoogleAuthService {
    client: GoogleAuthClient,
    db: FirestoreDb,
}

/// Result of completing the OAuth flow.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    /// Email the flow was started for (user record key)
    pub email: String,
    /// Email of the linked Google account
    pub google_email: Option<String>,
}

impl GoogleAuthService {
    pub fn new(config: &Config, db: FirestoreDb) -> Self {
        Self::with_client(GoogleAuthClient::new(config), db)
    }

    /// Build the service around an already-constructed OAuth client
    /// (tests inject one pointing at a mock server).
    pub fn with_client(client: GoogleAuthClient, db: FirestoreDb) -> Self {
        Self { client, db }
    }

    /// Start the OAuth flow for a user.
    ///
    /// Generates a fresh state token, persists the pending state with the
    /// user's identity, and returns the consent URL plus the state. The
    /// state is stored before returning so the redirect can never arrive
    /// at the callback ahead of the record.
    pub async fn begin_authorization(
        &self,
        email: &str,
        name: &str,
    ) -> Result<(String, String), AppError> {
        let state = generate_state()?;
        let authorization_url = self.client.authorization_url(&state)?;

        let pending = PendingAuthState {
            state: state.clone(),
            email: email.to_string(),
            name: name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        self.db.insert_auth_state(&pending).await?;

        tracing::info!(email, "OAuth flow started");
        Ok((authorization_url, state))
    }

    /// Complete the OAuth flow: consume the pending state, exchange the
    /// code, and persist the token bundle on the user record.
    ///
    /// The pending state is looked up first (unknown state means no user
    /// mutation at all) and deleted only after the user upsert succeeds,
    /// so a persist failure leaves the state intact for a retry.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<AuthOutcome, AppError> {
        let pending = self
            .db
            .get_auth_state(state)
            .await?
            .ok_or(AppError::InvalidState)?;

        let now = Utc::now();
        if pending.is_expired(now) {
            tracing::warn!(email = %pending.email, "Rejecting expired auth state");
            self.db.delete_auth_state(state).await?;
            return Err(AppError::InvalidState);
        }

        let token_response = self.client.exchange_code(code).await?;
        let userinfo = self
            .client
            .fetch_userinfo(&token_response.access_token)
            .await?;

        if token_response.refresh_token.is_none() {
            // Without a refresh token the bundle dies with the access token.
            tracing::warn!(email = %pending.email, "No refresh token in exchange response");
        }

        let expires_at = now + Duration::seconds(token_response.expires_in);
        let user = User {
            email: pending.email.clone(),
            name: pending.name.clone(),
            google_email: userinfo.email.clone(),
            tokens: Some(TokenBundle {
                access_token: token_response.access_token,
                refresh_token: token_response.refresh_token,
                token_uri: GOOGLE_TOKEN_URL.to_string(),
                expires_at: expires_at.to_rfc3339(),
            }),
            authenticated_at: Some(now.to_rfc3339()),
        };
        self.db.upsert_user(&user).await?;

        self.db.delete_auth_state(state).await?;

        tracing::info!(
            email = %pending.email,
            google_email = ?userinfo.email,
            "OAuth flow completed, tokens stored"
        );

        Ok(AuthOutcome {
            email: pending.email,
            google_email: userinfo.email,
        })
    }

    /// Load credentials for a user, refreshing the access token if it has
    /// expired and a refresh token is available.
    ///
    /// Returns `None` if the user has never authenticated. Expired
    /// credentials without a refresh token are returned as-is; the first
    /// downstream call will fail and the caller must treat that as
    /// re-auth-required.
    ///
    /// Concurrent refreshes for the same user are not synchronized; both
    /// derive from the same refresh token, so last write wins.
    pub async fn get_valid_credentials(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, AppError> {
        let Some(user) = self.db.get_user(email).await? else {
            return Ok(None);
        };
        let Some(tokens) = user.tokens.clone() else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&tokens.expires_at)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to parse expiry: {}", e)))?
            .with_timezone(&Utc);

        let credentials = Credentials {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at,
        };

        let now = Utc::now();
        if !credentials.is_expired(now) {
            return Ok(Some(credentials));
        }

        let Some(refresh_token) = credentials.refresh_token.clone() else {
            tracing::warn!(email, "Access token expired with no refresh token");
            return Ok(Some(credentials));
        };

        tracing::info!(email, "Access token expired, refreshing");
        let refreshed = self.client.refresh_access_token(&refresh_token).await?;
        let new_expires_at = now + Duration::seconds(refreshed.expires_in);

        // Persist only the new access token and expiry; the refresh token
        // and the rest of the record stay untouched.
        let mut updated = user;
        if let Some(bundle) = updated.tokens.as_mut() {
            bundle.apply_refresh(refreshed.access_token.clone(), new_expires_at);
        }
        self.db.upsert_user(&updated).await?;

        Ok(Some(Credentials {
            access_token: refreshed.access_token,
            refresh_token: Some(refresh_token),
            expires_at: new_expires_at,
        }))
    }

    /// Whether the user has a stored token bundle, and for which Google
    /// account.
    pub async fn auth_status(&self, email: &str) -> Result<(bool, Option<String>), AppError> {
        let user = self.db.get_user(email).await?;
        match user {
            Some(u) if u.tokens.is_some() => Ok((true, u.google_email)),
            _ => Ok((false, None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GoogleAuthClient {
        GoogleAuthClient::new(&Config::test_default())
    }

    #[test]
    fn test_generate_state_unique() {
        let states: Vec<String> = (0..100).map(|_| generate_state().unwrap()).collect();
        let mut deduped = states.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), states.len());
    }

    #[test]
    fn test_generate_state_url_safe() {
        let state = generate_state().unwrap();
        assert!(!state.contains('+'), "State should not contain '+'");
        assert!(!state.contains('/'), "State should not contain '/'");
        assert!(!state.contains('='), "State should not contain '=' padding");
        // 32 bytes -> 43 base64 characters without padding
        assert_eq!(state.len(), 43);
    }

    #[test]
    fn test_authorization_url_contents() {
        let url = test_client().authorization_url("state123").unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("include_granted_scopes=true"));
        assert!(url.contains("state=state123"));
        // Scope and redirect URI must be percent-encoded
        assert!(url.contains(&urlencoding::encode(CALENDAR_SCOPE).into_owned()));
        assert!(!url.contains("scope=https://www.googleapis.com"));
    }

    #[test]
    fn test_authorization_url_encodes_state() {
        // Generated states are URL-safe base64 and pass through
        // unchanged; anything else must be percent-encoded.
        let url = test_client().authorization_url("a b/c").unwrap();
        assert!(url.ends_with("state=a%20b%2Fc"));

        let safe = generate_state().unwrap();
        let url = test_client().authorization_url(&safe).unwrap();
        assert!(url.ends_with(&format!("state={}", safe)));
    }

    #[test]
    fn test_authorization_url_missing_client_id() {
        let mut config = Config::test_default();
        config.google_client_id = String::new();

        let err = GoogleAuthClient::new(&config)
            .authorization_url("state123")
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration("GOOGLE_CLIENT_ID")));
    }

    #[test]
    fn test_authorization_url_missing_client_secret() {
        let mut config = Config::test_default();
        config.google_client_secret = String::new();

        let err = GoogleAuthClient::new(&config)
            .authorization_url("state123")
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Configuration("GOOGLE_CLIENT_SECRET")
        ));
    }

    #[test]
    fn test_credentials_expiry() {
        let now = Utc::now();
        let valid = Credentials {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: now + Duration::hours(1),
        };
        assert!(!valid.is_expired(now));

        let expired = Credentials {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: now - Duration::hours(1),
        };
        assert!(expired.is_expired(now));

        // Inside the refresh margin counts as expired
        let expiring = Credentials {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS - 10),
        };
        assert!(expiring.is_expired(now));
    }
}
