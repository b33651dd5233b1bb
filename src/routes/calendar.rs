// SPDX-License-Identifier: MIT

//! Google Calendar integration routes: OAuth flow and event operations.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{EventSpec, GoogleEvent};
use crate::services::calendar::DEFAULT_MAX_RESULTS;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calendar/auth/start", post(start_auth))
        .route("/calendar/auth/callback", get(auth_callback))
        .route("/calendar/auth/status", get(auth_status))
        .route("/calendar/events", post(create_event).get(list_events))
}

// ─── OAuth Flow ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StartAuthRequest {
    email: String,
    name: String,
}

#[derive(Serialize)]
pub struct StartAuthResponse {
    pub authorization_url: String,
    pub state: String,
}

/// Start the Google OAuth flow for a user.
async fn start_auth(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartAuthRequest>,
) -> Result<Json<StartAuthResponse>> {
    if body.email.trim().is_empty() {
        return Err(AppError::BadRequest("email must not be empty".to_string()));
    }
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }

    let (authorization_url, oauth_state) = state
        .auth_service
        .begin_authorization(&body.email, &body.name)
        .await?;

    Ok(Json(StartAuthResponse {
        authorization_url,
        state: oauth_state,
    }))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    /// Set by Google when the user denies consent
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct CallbackResponse {
    pub success: bool,
    pub email: String,
    pub google_email: Option<String>,
}

/// Handle the Google OAuth callback: exchange the code and store tokens.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<CallbackResponse>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Google");
        return Err(AppError::GoogleApi(format!("OAuth error: {}", error)));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::BadRequest("missing code parameter".to_string()))?;
    let oauth_state = params
        .state
        .ok_or_else(|| AppError::BadRequest("missing state parameter".to_string()))?;

    let outcome = state
        .auth_service
        .complete_authorization(&code, &oauth_state)
        .await?;

    Ok(Json(CallbackResponse {
        success: true,
        email: outcome.email,
        google_email: outcome.google_email,
    }))
}

#[derive(Deserialize)]
pub struct StatusParams {
    email: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_email: Option<String>,
}

/// Report whether a user has linked Google Calendar.
async fn auth_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StatusParams>,
) -> Result<Json<StatusResponse>> {
    let (authenticated, google_email) = state.auth_service.auth_status(&params.email).await?;
    Ok(Json(StatusResponse {
        authenticated,
        google_email,
    }))
}

// ─── Events ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateEventRequest {
    email: String,
    title: String,
    description: Option<String>,
    /// ISO 8601 instant
    start: String,
    /// ISO 8601 instant
    end: String,
    #[serde(default)]
    attendees: Vec<String>,
}

#[derive(Serialize)]
pub struct CreateEventResponse {
    pub success: bool,
    pub event: GoogleEvent,
    pub message: String,
}

/// Create an event on the user's primary calendar.
async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>> {
    if body.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }

    let start = parse_instant(&body.start, "start")?;
    let end = parse_instant(&body.end, "end")?;
    if end < start {
        return Err(AppError::BadRequest(
            "end must not be before start".to_string(),
        ));
    }

    let spec = EventSpec {
        title: body.title,
        description: body.description,
        start,
        end,
        attendees: body.attendees,
    };

    let event = state.calendar_service.create_event(&body.email, &spec).await?;

    Ok(Json(CreateEventResponse {
        success: true,
        event,
        message: "Event created successfully".to_string(),
    }))
}

#[derive(Deserialize)]
pub struct ListEventsParams {
    email: String,
    max_results: Option<u32>,
}

#[derive(Serialize)]
pub struct ListEventsResponse {
    pub success: bool,
    pub events: Vec<GoogleEvent>,
}

/// List upcoming events from the user's primary calendar.
async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListEventsParams>,
) -> Result<Json<ListEventsResponse>> {
    let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);

    let events = state
        .calendar_service
        .list_upcoming_events(&params.email, max_results)
        .await?;

    Ok(Json(ListEventsResponse {
        success: true,
        events,
    }))
}

/// Parse an ISO 8601 instant from a request field.
fn parse_instant(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::BadRequest(format!("invalid {} instant: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instant_valid() {
        let parsed = parse_instant("2024-01-01T10:00:00Z", "start").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_instant_with_offset() {
        let parsed = parse_instant("2024-01-01T12:00:00+02:00", "start").unwrap();
        assert_eq!(
            parsed,
            parse_instant("2024-01-01T10:00:00Z", "start").unwrap()
        );
    }

    #[test]
    fn test_parse_instant_invalid() {
        let err = parse_instant("next tuesday", "start").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
