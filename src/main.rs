use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use mail_assist::auth::GoogleAuth;
use mail_assist::calendar::CalendarClient;
use mail_assist::config::AppConfig;
use mail_assist::gmail::{GmailClient, NormalizedMessage};
use mail_assist::llm::{EventExtractor, create_extractor};
use mail_assist::poller::Poller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Missing configuration is fatal: refuse to start the loop.
    let config = AppConfig::from_env()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()?;

    let auth = Arc::new(GoogleAuth::new(http.clone(), config.google.clone()));
    let gmail = GmailClient::new(http.clone(), Arc::clone(&auth), config.query.clone());
    let extractor = create_extractor(&config.llm)?;
    let calendar = CalendarClient::new(http, auth, config.calendar_id.clone());

    let poller = Poller::new(gmail, Duration::from_secs(config.poll_interval_secs));
    let (mut messages, poll_handle, shutdown) = poller.spawn();

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutdown signal received");
        let _ = shutdown.send(true);
    });

    while let Some(message) = messages.next().await {
        // Downstream failures must never crash the polling loop.
        if let Err(e) = handle_message(extractor.as_ref(), &calendar, &message).await {
            tracing::error!(id = %message.id, "failed to process message: {e}");
        }
    }

    poll_handle.await?;
    Ok(())
}

/// Run one emitted message through extraction and calendar creation.
async fn handle_message(
    extractor: &dyn EventExtractor,
    calendar: &CalendarClient,
    message: &NormalizedMessage,
) -> mail_assist::error::Result<()> {
    tracing::info!(
        id = %message.id,
        subject = %message.subject,
        sender = %message.sender,
        "processing new message"
    );

    let extracted = extractor.extract(&message.full_body).await?;
    if extracted.events.is_empty() {
        tracing::info!(id = %message.id, "no events found in message");
        return Ok(());
    }

    for event in &extracted.events {
        match calendar.insert_event(event).await {
            Ok(link) => tracing::info!(
                title = %event.title,
                link = link.as_deref().unwrap_or("-"),
                "calendar event created"
            ),
            Err(e) => tracing::error!(title = %event.title, "calendar insert failed: {e}"),
        }
    }

    Ok(())
}
