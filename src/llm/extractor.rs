//! Gemini-backed event extractor.

use std::sync::Arc;

use async_trait::async_trait;
use rig::agent::Agent;
use rig::client::CompletionClient;
use rig::completion::{CompletionModel, Prompt};
use secrecy::ExposeSecret;

use crate::config::LlmConfig;
use crate::error::LlmError;

use super::types::ExtractedCalendarInfo;

/// Planner instructions. The model must answer with bare JSON matching
/// `ExtractedCalendarInfo`; `parse_reply` tolerates fenced replies anyway.
const SYSTEM_INSTRUCTIONS: &str = r#"You are an intelligent event and schedule planner. You extract structured event data from emails and return ONLY valid JSON — no prose, no code fences — with this shape:

{"events": [{"title": "...", "date_time": "...", "timezone": "...", "location": "...", "summary": "...", "attendees": ["..."]}]}

Field rules:
- "title": a concise summary or subject for the meeting.
- "date_time": the full date and time of the event. Analyze the whole message carefully; dates and times can overlap (meeting date vs. the event or trip date) — extract the meeting time, when people will actually meet to talk. "11 in the morning" means 11:00AM, "4 in the afternoon" means 4:00PM; 24-hour times like 19:00 mean 07:00PM. Use ISO 8601 (YYYY-MM-DDTHH:mm:ssZ) when possible, plain English when the date is ambiguous.
- "timezone": the time zone the event or meeting happens in, if mentioned; default to GMT+2 otherwise.
- "location": the physical address or video conference link (Zoom/Meet URL, Discord, Microsoft Teams), or null.
- "summary": a concise one-or-two sentence summary of what the event is about, or null.
- "attendees": the people mentioned who are expected to attend, as names or email addresses.

If information is missing, use null or an empty list. Return {"events": []} when no event is found. Convert dates to ISO 8601 format when possible."#;

/// Extracts structured calendar information from normalized message text.
#[async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(&self, body: &str) -> Result<ExtractedCalendarInfo, LlmError>;
}

/// rig-core agent carrying the planner preamble.
struct GeminiExtractor<M: CompletionModel> {
    agent: Agent<M>,
}

#[async_trait]
impl<M: CompletionModel + Send + Sync + 'static> EventExtractor for GeminiExtractor<M> {
    async fn extract(&self, body: &str) -> Result<ExtractedCalendarInfo, LlmError> {
        let reply =
            self.agent
                .prompt(body)
                .await
                .map_err(|e| LlmError::RequestFailed {
                    provider: "gemini".to_string(),
                    reason: e.to_string(),
                })?;
        parse_reply(&reply)
    }
}

/// Create the Gemini extractor from configuration.
pub fn create_extractor(config: &LlmConfig) -> Result<Arc<dyn EventExtractor>, LlmError> {
    use rig::providers::gemini;

    let client: rig::client::Client<gemini::client::GeminiExt> =
        gemini::Client::new(config.api_key.expose_secret()).map_err(|e| {
            LlmError::RequestFailed {
                provider: "gemini".to_string(),
                reason: format!("Failed to create Gemini client: {}", e),
            }
        })?;

    let agent = client
        .agent(&config.model)
        .preamble(SYSTEM_INSTRUCTIONS)
        .build();

    tracing::info!("Using Gemini (model: {})", config.model);
    Ok(Arc::new(GeminiExtractor { agent }))
}

/// Parse a model reply into extraction output, tolerating fenced code blocks.
fn parse_reply(reply: &str) -> Result<ExtractedCalendarInfo, LlmError> {
    let json = strip_code_fence(reply);
    serde_json::from_str(json).map_err(|e| LlmError::InvalidResponse {
        provider: "gemini".to_string(),
        reason: format!(
            "{e}; reply started with: {}",
            json.chars().take(120).collect::<String>()
        ),
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
