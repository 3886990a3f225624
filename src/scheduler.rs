// src/scheduler.rs
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::harvest::Harvester;
use crate::queue::NotificationQueue;

/// Long-running producer loop: run one harvest cycle, enqueue its payloads,
/// sleep the fixed interval, repeat forever.
///
/// Each cycle runs as its own spawned task awaited here, keeping the heavy
/// network/inference work off this task and isolating panics. Any failure in
/// one iteration is logged and treated as a no-op cycle; the loop never
/// terminates. A slow cycle delays the next sleep's start, it never skips or
/// queues extra cycles.
pub async fn run_scheduler(
    harvester: Arc<Harvester>,
    queue: NotificationQueue,
    interval: Duration,
) {
    loop {
        tracing::info!("starting harvest cycle");
        counter!("harvest_runs_total").increment(1);

        let h = Arc::clone(&harvester);
        match tokio::spawn(async move { h.run_cycle().await }).await {
            Ok(Ok(payloads)) => {
                if !payloads.is_empty() {
                    tracing::info!(count = payloads.len(), "enqueueing notifications");
                }
                for payload in payloads {
                    counter!("notifications_enqueued_total").increment(1);
                    queue.enqueue(payload);
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "harvest cycle failed, skipping this round");
            }
            Err(e) => {
                tracing::error!(error = %e, "harvest cycle panicked, skipping this round");
            }
        }

        tracing::info!(sleep_secs = interval.as_secs(), "cycle finished, sleeping");
        tokio::time::sleep(interval).await;
    }
}
