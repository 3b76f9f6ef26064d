//! Background sweep of expired authorization state.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use clipfeed_auth::oauth::service::AuthorizationService;

/// Spawns the periodic cleanup task.
///
/// Expired codes and stale revocation tombstones are already rejected on
/// read; this sweep only reclaims storage. Failures are logged and the next
/// tick retries.
pub fn spawn_cleanup_task(
    service: Arc<AuthorizationService>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so startup stays quick.
        interval.tick().await;

        loop {
            interval.tick().await;
            match service.cleanup_expired().await {
                Ok((codes, tombstones)) if codes > 0 || tombstones > 0 => {
                    info!(codes, tombstones, "cleanup sweep removed expired records");
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "cleanup sweep failed");
                }
            }
        }
    })
}
