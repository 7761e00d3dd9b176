//! Change detector — polls the mailbox and emits only unseen messages.
//!
//! Each cycle fetches the single latest message and compares its id against
//! the last one seen. Emissions go through a channel bounded at one, so the
//! loop suspends until the consumer takes each message before sleeping and
//! checking again: at most one fetch in flight, at most one unconsumed
//! emission, exactly one writer of the state.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::gmail::{MailSource, MessageId, NormalizedMessage};

/// Last-processed-message identity. Owned by the poller; starts absent, is
/// updated only when a new message is detected, and is never reset mid-run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollerState {
    last_seen: Option<MessageId>,
}

impl PollerState {
    pub fn new(last_seen: Option<MessageId>) -> Self {
        Self { last_seen }
    }

    /// Record an observed latest-message id. Returns true when it differs
    /// from the last seen id (the message is new), updating the state.
    pub fn observe(&mut self, id: &MessageId) -> bool {
        if self.last_seen.as_ref() == Some(id) {
            return false;
        }
        self.last_seen = Some(id.clone());
        true
    }

    pub fn last_seen(&self) -> Option<&MessageId> {
        self.last_seen.as_ref()
    }
}

/// Poller over a mailbox source.
pub struct Poller<S> {
    source: S,
    state: PollerState,
    interval: Duration,
}

impl<S: MailSource + 'static> Poller<S> {
    pub fn new(source: S, interval: Duration) -> Self {
        Self::with_state(source, interval, PollerState::default())
    }

    /// Resume from caller-supplied state. With default state the current
    /// latest message counts as unseen on the first successful check.
    pub fn with_state(source: S, interval: Duration, state: PollerState) -> Self {
        Self {
            source,
            state,
            interval,
        }
    }

    pub fn state(&self) -> &PollerState {
        &self.state
    }

    /// Run one check cycle: fetch the latest message, compare against the
    /// last seen id, and return the message only when it is new.
    pub async fn check_once(&mut self) -> Option<NormalizedMessage> {
        let Some(message) = self.source.latest().await else {
            info!("mailbox empty or fetch error; nothing to process");
            return None;
        };

        if !self.state.observe(&message.id) {
            debug!(id = %message.id, "no new mail since last check");
            return None;
        }

        info!(id = %message.id, subject = %message.subject, "new message detected");
        Some(message)
    }

    /// Spawn the polling loop on a background task.
    ///
    /// The inter-cycle delay runs from the end of one cycle's processing to
    /// the start of the next fetch, so slow fetches and slow consumers push
    /// the next check back. Send on the returned watch channel (or drop it)
    /// to stop; the signal interrupts both the sleep and an in-flight fetch.
    pub fn spawn(
        mut self,
    ) -> (
        ReceiverStream<NormalizedMessage>,
        JoinHandle<()>,
        watch::Sender<bool>,
    ) {
        let (tx, rx) = mpsc::channel(1);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                "mailbox polling started"
            );

            loop {
                let checked = tokio::select! {
                    message = self.check_once() => message,
                    _ = shutdown_rx.changed() => {
                        info!("poller shutting down");
                        return;
                    }
                };

                if let Some(message) = checked {
                    // Lock-step handoff: suspend until the consumer accepts.
                    if tx.send(message).await.is_err() {
                        info!("consumer dropped; poller stopping");
                        return;
                    }
                }

                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = shutdown_rx.changed() => {
                        info!("poller shutting down");
                        return;
                    }
                }
            }
        });

        (ReceiverStream::new(rx), handle, shutdown_tx)
    }
}
