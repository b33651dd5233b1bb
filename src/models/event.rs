//! Event shapes: the normalized input we accept and the Calendar v3 wire
//! format we send and receive.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Normalized event input, as accepted by the API.
#[derive(Debug, Clone)]
pub struct EventSpec {
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Attendee email addresses
    pub attendees: Vec<String>,
}

/// Google Calendar v3 event resource.
///
/// Used both as the insert request body and for events returned by the
/// API, so unknown fields are simply dropped and absent fields are not
/// serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attendees: Vec<EventAttendee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<EventReminders>,
    #[serde(rename = "htmlLink", skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Start/end instant of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a date instead of a dateTime
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAttendee {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

/// Minutes before start for the fixed email reminder (24 hours).
const EMAIL_REMINDER_MINUTES: u32 = 24 * 60;
/// Minutes before start for the fixed popup reminder.
const POPUP_REMINDER_MINUTES: u32 = 30;

impl GoogleEvent {
    /// Map a normalized spec into the provider shape.
    ///
    /// The time zone label is fixed to UTC on both ends and two fixed
    /// reminder overrides are attached (email 24h prior, popup 30min
    /// prior). Neither is configurable.
    pub fn from_spec(spec: &EventSpec) -> Self {
        Self {
            id: None,
            summary: Some(spec.title.clone()),
            description: Some(spec.description.clone().unwrap_or_default()),
            start: EventDateTime::utc(spec.start),
            end: EventDateTime::utc(spec.end),
            attendees: spec
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: email.clone(),
                })
                .collect(),
            reminders: Some(EventReminders {
                use_default: false,
                overrides: vec![
                    ReminderOverride {
                        method: "email".to_string(),
                        minutes: EMAIL_REMINDER_MINUTES,
                    },
                    ReminderOverride {
                        method: "popup".to_string(),
                        minutes: POPUP_REMINDER_MINUTES,
                    },
                ],
            }),
            html_link: None,
            status: None,
        }
    }
}

impl EventDateTime {
    fn utc(instant: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339_opts(SecondsFormat::Secs, true)),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_spec() -> EventSpec {
        EventSpec {
            title: "Sync".to_string(),
            description: None,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
            attendees: vec![],
        }
    }

    #[test]
    fn test_from_spec_fixed_reminders() {
        let event = GoogleEvent::from_spec(&sample_spec());
        let reminders = event.reminders.expect("reminders set");

        assert!(!reminders.use_default);
        assert_eq!(reminders.overrides.len(), 2);
        assert_eq!(reminders.overrides[0].method, "email");
        assert_eq!(reminders.overrides[0].minutes, 1440);
        assert_eq!(reminders.overrides[1].method, "popup");
        assert_eq!(reminders.overrides[1].minutes, 30);
    }

    #[test]
    fn test_from_spec_utc_time_zone_on_both_ends() {
        let event = GoogleEvent::from_spec(&sample_spec());

        assert_eq!(event.start.time_zone.as_deref(), Some("UTC"));
        assert_eq!(event.end.time_zone.as_deref(), Some("UTC"));
        assert_eq!(
            event.start.date_time.as_deref(),
            Some("2024-01-01T10:00:00Z")
        );
        assert_eq!(event.end.date_time.as_deref(), Some("2024-01-01T11:00:00Z"));
    }

    #[test]
    fn test_from_spec_attendees() {
        let mut spec = sample_spec();
        spec.attendees = vec!["b@x.com".to_string(), "c@x.com".to_string()];

        let event = GoogleEvent::from_spec(&spec);
        assert_eq!(event.attendees.len(), 2);
        assert_eq!(event.attendees[0].email, "b@x.com");
    }

    #[test]
    fn test_wire_format_field_names() {
        let event = GoogleEvent::from_spec(&sample_spec());
        let json = serde_json::to_value(&event).unwrap();

        // Calendar v3 field names, not Rust ones
        assert!(json["start"]["dateTime"].is_string());
        assert_eq!(json["start"]["timeZone"], "UTC");
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 1440);
        // Empty attendee list is omitted entirely
        assert!(json.get("attendees").is_none());
    }

    #[test]
    fn test_deserialize_provider_response() {
        let body = serde_json::json!({
            "id": "evt123",
            "status": "confirmed",
            "htmlLink": "https://www.google.com/calendar/event?eid=abc",
            "summary": "Sync",
            "start": {"dateTime": "2024-01-01T10:00:00Z", "timeZone": "UTC"},
            "end": {"dateTime": "2024-01-01T11:00:00Z", "timeZone": "UTC"},
            "unknownField": 42,
        });

        let event: GoogleEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.id.as_deref(), Some("evt123"));
        assert_eq!(event.html_link.as_deref().unwrap(), "https://www.google.com/calendar/event?eid=abc");
        assert!(event.attendees.is_empty());
    }
}
