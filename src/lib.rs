//! Mail Assist — watches a Gmail inbox, normalizes new mail, and schedules
//! the calendar events an LLM extracts from it.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod error;
pub mod gmail;
pub mod llm;
pub mod poller;
