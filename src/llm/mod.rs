//! LLM integration — structured calendar-event extraction.
//!
//! Uses the rig-core crate for the Gemini transport; the `EventExtractor`
//! trait keeps the host loop testable without network access.

mod extractor;
mod types;

pub use extractor::{EventExtractor, create_extractor};
pub use types::{CalendarEvent, ExtractedCalendarInfo};
