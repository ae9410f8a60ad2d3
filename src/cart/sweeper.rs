//! Periodic expiry of idle carts
//!
//! The store never evicts on its own; `ExpirySweeper` owns the cadence and
//! must be shut down explicitly before the store is drained.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{sync::oneshot, task::JoinHandle, time::MissedTickBehavior};

use super::store::CartStore;

pub struct ExpirySweeper {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ExpirySweeper {
    /// Starts sweeping `store` every `every`, dropping carts idle for at
    /// least `max_age`. Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<CartStore>, every: Duration, max_age: Duration) -> Self {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let (stop, mut stopped) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {
                        let removed = store.sweep_expired(Utc::now(), max_age);
                        if removed > 0 {
                            tracing::info!(removed, remaining = store.len(), "expired carts swept");
                        }
                    }
                }
            }
            tracing::debug!("expiry sweeper stopped");
        });

        tracing::info!(
            interval_secs = every.as_secs(),
            max_age_secs = max_age.num_seconds(),
            "expiry sweeper started"
        );
        Self { stop, task }
    }

    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "expiry sweeper task failed");
        }
    }
}
