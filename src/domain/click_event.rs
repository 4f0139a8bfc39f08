//! Click event model and the non-blocking dispatcher used on the redirect path.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::domain::entities::NewClick;

/// An in-memory click event queued for the background worker.
///
/// Created by the resolver after a successful resolution and handed to
/// [`ClickDispatcher::dispatch`]. The HTTP response never waits for it to be
/// persisted.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: Uuid,
    pub short_code: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(link_id: Uuid, short_code: impl Into<String>, requester: &RequestMeta) -> Self {
        Self {
            link_id,
            short_code: short_code.into(),
            ip: requester.ip.clone(),
            user_agent: requester.user_agent.clone(),
            referer: requester.referer.clone(),
            occurred_at: Utc::now(),
        }
    }

    pub fn to_new_click(&self) -> NewClick {
        NewClick {
            link_id: self.link_id,
            clicked_at: self.occurred_at,
            ip: self.ip.clone(),
            user_agent: self.user_agent.clone(),
            referer: self.referer.clone(),
        }
    }
}

/// Client metadata captured from the redirect request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Sending half of the click queue.
///
/// Cheap to clone; every clone feeds the same worker. The worker stops once all
/// dispatchers are dropped and the queue has drained.
#[derive(Debug, Clone)]
pub struct ClickDispatcher {
    tx: mpsc::Sender<ClickEvent>,
}

/// Outcome of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Queued,
    DroppedFull,
    DroppedClosed,
}

impl ClickDispatcher {
    /// Creates a dispatcher and the receiver the worker consumes.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueues a click without waiting.
    ///
    /// A full or closed queue drops the event; the drop is logged and counted
    /// so under-counting is observable.
    pub fn dispatch(&self, event: ClickEvent) -> DispatchOutcome {
        match self.tx.try_send(event) {
            Ok(()) => DispatchOutcome::Queued,
            Err(mpsc::error::TrySendError::Full(ev)) => {
                warn!(
                    link_id = %ev.link_id,
                    code = %ev.short_code,
                    "Click queue full, dropping event"
                );
                metrics::counter!("clicks_dropped_total", "reason" => "full").increment(1);
                DispatchOutcome::DroppedFull
            }
            Err(mpsc::error::TrySendError::Closed(ev)) => {
                error!(
                    link_id = %ev.link_id,
                    code = %ev.short_code,
                    "Click queue closed, dropping event"
                );
                metrics::counter!("clicks_dropped_total", "reason" => "closed").increment(1);
                DispatchOutcome::DroppedClosed
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Remaining free slots in the queue.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> RequestMeta {
        RequestMeta {
            ip: Some("192.168.1.1".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referer: Some("https://google.com".to_string()),
        }
    }

    #[test]
    fn test_click_event_carries_request_meta() {
        let id = Uuid::new_v4();
        let event = ClickEvent::new(id, "abc1234", &meta());

        assert_eq!(event.link_id, id);
        assert_eq!(event.short_code, "abc1234");
        assert_eq!(event.ip.as_deref(), Some("192.168.1.1"));
        assert_eq!(event.user_agent.as_deref(), Some("Mozilla/5.0"));

        let click = event.to_new_click();
        assert_eq!(click.link_id, id);
        assert_eq!(click.clicked_at, event.occurred_at);
        assert_eq!(click.referer.as_deref(), Some("https://google.com"));
    }

    #[tokio::test]
    async fn test_dispatch_queues_event() {
        let (dispatcher, mut rx) = ClickDispatcher::channel(4);
        let outcome = dispatcher.dispatch(ClickEvent::new(Uuid::new_v4(), "q", &meta()));

        assert_eq!(outcome, DispatchOutcome::Queued);
        assert_eq!(rx.recv().await.unwrap().short_code, "q");
    }

    #[tokio::test]
    async fn test_dispatch_drops_when_full() {
        let (dispatcher, _rx) = ClickDispatcher::channel(1);

        let first = dispatcher.dispatch(ClickEvent::new(Uuid::new_v4(), "a", &meta()));
        let second = dispatcher.dispatch(ClickEvent::new(Uuid::new_v4(), "b", &meta()));

        assert_eq!(first, DispatchOutcome::Queued);
        assert_eq!(second, DispatchOutcome::DroppedFull);
        assert_eq!(dispatcher.capacity(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_drops_when_closed() {
        let (dispatcher, rx) = ClickDispatcher::channel(4);
        drop(rx);

        assert!(dispatcher.is_closed());
        let outcome = dispatcher.dispatch(ClickEvent::new(Uuid::new_v4(), "c", &meta()));
        assert_eq!(outcome, DispatchOutcome::DroppedClosed);
    }
}
