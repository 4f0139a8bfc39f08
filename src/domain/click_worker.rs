//! Background worker that persists queued click events.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// Retries after the first failed insert.
const MAX_RETRIES: usize = 3;

/// Spawns the click worker on the runtime and returns its handle.
///
/// The worker exits after every [`crate::domain::click_event::ClickDispatcher`]
/// is dropped and all queued events have been written (or given up on).
pub fn spawn_click_worker(
    rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn ClickRepository>,
    concurrency: usize,
) -> JoinHandle<()> {
    tokio::spawn(run_click_worker(rx, repository, concurrency))
}

/// Consumes click events until the channel closes.
///
/// At most `concurrency` inserts are in flight at once. Each insert opens its
/// own transaction through [`ClickRepository::record_click`] and is retried with
/// exponential backoff; failures are logged and counted, never propagated.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn ClickRepository>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    info!(concurrency, "Click worker started");

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            persist_click(repository.as_ref(), event).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

/// Writes one click with bounded retries. Validation failures are not retried.
async fn persist_click(repository: &dyn ClickRepository, event: ClickEvent) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(std::time::Duration::from_millis(500))
        .map(jitter)
        .take(MAX_RETRIES);

    let new_click = event.to_new_click();
    let result = RetryIf::spawn(
        strategy,
        || repository.record_click(new_click.clone()),
        |e: &AppError| !matches!(e, AppError::Validation { .. }),
    )
    .await;

    match result {
        Ok(click) => {
            debug!(link_id = %click.link_id, code = %event.short_code, "Click recorded");
            metrics::counter!("clicks_recorded_total").increment(1);
        }
        Err(e) => {
            warn!(
                link_id = %event.link_id,
                code = %event.short_code,
                error = %e,
                "Failed to record click"
            );
            metrics::counter!("clicks_failed_total").increment(1);
        }
    }
}
