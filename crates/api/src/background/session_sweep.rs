//! Periodic removal of expired sessions.
//!
//! Expired sessions are already rejected by the authenticator; the sweep only
//! keeps the store from growing without bound. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sentinel_db::store::{SessionStore, StoreError};
use tokio_util::sync::CancellationToken;

/// Run one pass, deleting sessions whose `expires_at` has been reached.
pub async fn sweep_once(sessions: &dyn SessionStore) -> Result<u64, StoreError> {
    sessions.purge_expired(Utc::now()).await
}

/// Run the sweep loop every `period` until `cancel` is triggered.
pub async fn run(sessions: Arc<dyn SessionStore>, period: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = period.as_secs(), "Session sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep_once(sessions.as_ref()).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Session sweep: purged expired sessions");
                        } else {
                            tracing::debug!("Session sweep: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: purge failed");
                    }
                }
            }
        }
    }
}
