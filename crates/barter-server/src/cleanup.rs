use std::time::Duration;

use barter_api::AppState;
use chrono::Utc;
use tracing::{info, warn};

/// Background task that drops sessions past their `expires_at`.
pub async fn run_cleanup_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match state.db(|db| db.purge_expired_sessions(Utc::now())).await {
            Ok(count) => {
                if count > 0 {
                    info!("Cleanup: purged {} expired sessions", count);
                }
            }
            Err(e) => {
                warn!("Cleanup error: {}", e);
            }
        }
    }
}
