use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Periodically drops idle booking sessions, releases their holds, and
/// purges expired holds.
pub fn spawn_sweeper(state: AppState, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            sweep_once(&state).await;
        }
    })
}

pub async fn sweep_once(state: &AppState) {
    let now = Utc::now();

    let idle = state.sessions.sweep(now).await;
    for flow in &idle {
        if let Err(e) = state.store.release_holds(flow.id).await {
            tracing::warn!(session_id = %flow.id, error = %e, "Failed to release holds of idle session");
        }
    }

    match state.store.purge_expired_holds(now).await {
        Ok(purged) if purged > 0 || !idle.is_empty() => {
            tracing::info!(sessions = idle.len(), holds = purged, "Swept idle bookings");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to purge expired holds"),
    }
}
