//! Background sweep of idle sessions.
//!
//! Lookups already ignore expired sessions; the sweep only reclaims memory
//! for browsers that never come back.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Start the sweep loop.
pub async fn sweep_daemon(state: Arc<crate::AppState>) {
    let interval = state.config.session_sweep_interval.max(Duration::from_secs(1));
    info!("Session sweeper started (interval: {}s)", interval.as_secs());

    loop {
        tokio::time::sleep(interval).await;
        let removed = state.sessions.purge_expired();
        if removed > 0 {
            info!("Swept {removed} idle sessions");
        } else {
            debug!("Session sweep: nothing to remove ({} live)", state.sessions.len());
        }
    }
}
