//! Snapshot reconciliation: the recurring poll and on-demand refreshes.
//!
//! Both triggers run the same `refresh_once`; neither coordinates with the
//! other. Overlapping refreshes each overwrite the whole snapshot and the
//! later response wins — accepted given the short interval and the
//! full-replacement rendering.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::state::DashboardState;

/// Spawn the reconciliation loop: one refresh immediately, then one per tick
/// or whenever `refresh` is notified. Cancelling the token stops the loop on
/// teardown; in-flight requests are left to settle on their own.
pub fn spawn(
    api: Arc<ApiClient>,
    state: Arc<Mutex<DashboardState>>,
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("poll loop stopped");
                    return;
                }
                _ = ticker.tick() => {}
                _ = refresh.notified() => {}
            }
            refresh_once(&api, &state).await;
        }
    })
}

/// Fetch the status snapshot and swap it in wholesale. A failed poll keeps
/// the previous cards on screen and is only logged; the next tick retries.
pub async fn refresh_once(api: &ApiClient, state: &Arc<Mutex<DashboardState>>) {
    match api.fetch_status().await {
        Ok(snapshot) => {
            let mut s = state.lock().unwrap();
            s.apply_snapshot(snapshot);
            s.connected = true;
            s.last_updated = Some(chrono::Local::now().format("%H:%M:%S").to_string());
        }
        Err(err) => {
            warn!(%err, "status poll failed");
            state.lock().unwrap().connected = false;
        }
    }
}
