// SPDX-License-Identifier: MIT

//! Google Calendar API client for the user's primary calendar.

use crate::error::AppError;
use crate::models::{EventSpec, GoogleEvent};
use crate::services::google_auth::GoogleAuthService;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

/// Default page size for upcoming-event listings.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Low-level Calendar v3 REST client.
#[derive(Clone)]
pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl CalendarClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }

    /// Insert an event into the primary calendar.
    pub async fn insert_event(
        &self,
        access_token: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, AppError> {
        let url = format!("{}/calendars/primary/events", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// List upcoming events from the primary calendar.
    ///
    /// Recurring events are expanded to single occurrences and results are
    /// ordered by start time ascending. Only the first page is returned;
    /// no pagination cursor is followed.
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: &str,
        max_results: u32,
    ) -> Result<Vec<GoogleEvent>, AppError> {
        let url = format!("{}/calendars/primary/events", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min),
                ("maxResults", &max_results.to_string()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        let list: EventListResponse = self.check_response_json(response).await?;
        Ok(list.items)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("JSON parse error: {}", e)))
    }
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Event list response envelope.
#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

// ─────────────────────────────────────────────────────────────────────────────
// CalendarService - High-level calendar operations
// ─────────────────────────────────────────────────────────────────────────────

/// High-level calendar operations against the authenticated user's primary
/// calendar.
///
/// Credentials are fetched (and silently refreshed) on demand through the
/// auth service. Neither operation triggers re-authorization itself.
#[derive(Clone)]
pub struct CalendarService {
    client: CalendarClient,
    auth: GoogleAuthService,
}

impl CalendarService {
    pub fn new(auth: GoogleAuthService) -> Self {
        Self {
            client: CalendarClient::new(),
            auth,
        }
    }

    /// Create one event on the user's primary calendar.
    ///
    /// Not idempotent: repeated calls create duplicate events.
    pub async fn create_event(
        &self,
        email: &str,
        spec: &EventSpec,
    ) -> Result<GoogleEvent, AppError> {
        let credentials = self
            .auth
            .get_valid_credentials(email)
            .await?
            .ok_or_else(|| AppError::NotAuthenticated(email.to_string()))?;

        let event = GoogleEvent::from_spec(spec);
        let created = self
            .client
            .insert_event(&credentials.access_token, &event)
            .await?;

        tracing::info!(email, event_id = ?created.id, "Calendar event created");
        Ok(created)
    }

    /// List upcoming events (start time >= now), ascending by start time,
    /// capped at `max_results`.
    pub async fn list_upcoming_events(
        &self,
        email: &str,
        max_results: u32,
    ) -> Result<Vec<GoogleEvent>, AppError> {
        let credentials = self
            .auth
            .get_valid_credentials(email)
            .await?
            .ok_or_else(|| AppError::NotAuthenticated(email.to_string()))?;

        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.client
            .list_events(&credentials.access_token, &time_min, max_results)
            .await
    }
}
