//! Extraction output types — the JSON contract the model must satisfy.

use serde::{Deserialize, Serialize};

/// A calendar event extracted from an email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Concise summary or subject for the meeting.
    pub title: String,
    /// ISO 8601 when the model can pin it down, plain English otherwise.
    pub date_time: String,
    /// Time zone the event happens in.
    pub timezone: String,
    /// Physical address or conference link, when mentioned.
    #[serde(default)]
    pub location: Option<String>,
    /// One or two sentences on what the event is about.
    #[serde(default)]
    pub summary: Option<String>,
    /// People expected to attend (names or email addresses).
    #[serde(default)]
    pub attendees: Vec<String>,
}

/// All distinct events found in one message. Empty when none were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedCalendarInfo {
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}
