//! Google Calendar client — turns extracted events into calendar inserts.

use std::sync::Arc;

use chrono::{DateTime, Duration};
use serde::{Deserialize, Serialize};

use crate::auth::GoogleAuth;
use crate::error::CalendarError;
use crate::llm::CalendarEvent;

/// Event length when the message gives only a start time.
const DEFAULT_EVENT_HOURS: i64 = 1;

/// Calendar API insert body.
#[derive(Debug, Serialize, PartialEq)]
struct EventResource {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    start: EventTime,
    end: EventTime,
    attendees: Vec<Attendee>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    date_time: String,
    time_zone: String,
}

#[derive(Debug, Serialize, PartialEq)]
struct Attendee {
    email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    html_link: Option<String>,
}

/// Thin client over the Calendar REST API, sharing the process-wide reqwest
/// client and OAuth capability.
pub struct CalendarClient {
    http: reqwest::Client,
    auth: Arc<GoogleAuth>,
    calendar_id: String,
}

impl CalendarClient {
    const BASE_URL: &'static str = "https://www.googleapis.com/calendar/v3";

    pub fn new(http: reqwest::Client, auth: Arc<GoogleAuth>, calendar_id: String) -> Self {
        Self {
            http,
            auth,
            calendar_id,
        }
    }

    /// Insert an extracted event; returns its htmlLink when the API sends one.
    pub async fn insert_event(&self, event: &CalendarEvent) -> Result<Option<String>, CalendarError> {
        let resource = build_event_resource(event)?;
        let token = self.auth.access_token().await?;
        let url = format!("{}/calendars/{}/events", Self::BASE_URL, self.calendar_id);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&resource)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let inserted: InsertedEvent = response.json().await?;
        Ok(inserted.html_link)
    }
}

/// Build the insert body: start parsed from the extracted timestamp, end
/// defaulted to one hour later, attendees as address objects.
fn build_event_resource(event: &CalendarEvent) -> Result<EventResource, CalendarError> {
    let start = DateTime::parse_from_rfc3339(&event.date_time).map_err(|e| {
        CalendarError::InvalidEventTime {
            value: event.date_time.clone(),
            reason: e.to_string(),
        }
    })?;
    let end = start + Duration::hours(DEFAULT_EVENT_HOURS);

    Ok(EventResource {
        summary: event.title.clone(),
        location: event.location.clone(),
        description: event.summary.clone(),
        start: EventTime {
            date_time: start.to_rfc3339(),
            time_zone: event.timezone.clone(),
        },
        end: EventTime {
            date_time: end.to_rfc3339(),
            time_zone: event.timezone.clone(),
        },
        attendees: event
            .attendees
            .iter()
            .map(|address| Attendee {
                email: address.clone(),
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> CalendarEvent {
        CalendarEvent {
            title: "Quarterly review".to_string(),
            date_time: "2026-09-01T14:00:00+02:00".to_string(),
            timezone: "Europe/Bucharest".to_string(),
            location: Some("Meet link".to_string()),
            summary: Some("Numbers and plans.".to_string()),
            attendees: vec!["alice@example.com".to_string(), "bob@example.com".to_string()],
        }
    }

    #[test]
    fn end_defaults_to_one_hour_after_start() {
        let resource = build_event_resource(&sample_event()).unwrap();
        assert_eq!(resource.start.date_time, "2026-09-01T14:00:00+02:00");
        assert_eq!(resource.end.date_time, "2026-09-01T15:00:00+02:00");
        assert_eq!(resource.start.time_zone, "Europe/Bucharest");
    }

    #[test]
    fn zulu_timestamps_parse() {
        let mut event = sample_event();
        event.date_time = "2026-09-01T12:00:00Z".to_string();
        let resource = build_event_resource(&event).unwrap();
        assert_eq!(resource.end.date_time, "2026-09-01T13:00:00+00:00");
    }

    #[test]
    fn ambiguous_start_time_is_rejected() {
        let mut event = sample_event();
        event.date_time = "next Tuesday at lunch".to_string();
        let err = build_event_resource(&event).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidEventTime { .. }));
    }

    #[test]
    fn attendees_become_address_objects() {
        let resource = build_event_resource(&sample_event()).unwrap();
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["attendees"][0]["email"], "alice@example.com");
        assert_eq!(json["start"]["dateTime"], "2026-09-01T14:00:00+02:00");
        assert_eq!(json["start"]["timeZone"], "Europe/Bucharest");
    }

    #[test]
    fn absent_optionals_are_omitted_from_the_body() {
        let mut event = sample_event();
        event.location = None;
        event.summary = None;
        let json = serde_json::to_value(build_event_resource(&event).unwrap()).unwrap();
        assert!(json.get("location").is_none());
        assert!(json.get("description").is_none());
    }
}
