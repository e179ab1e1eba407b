//! One-shot dataset catalog load.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::state::{Catalog, DashboardState};

/// Fetch the dataset list exactly once, at startup. Failures land in the
/// selector as an error placeholder and in the log, never in the notice
/// board (the operator has not acted yet). Not retried.
pub async fn load(api: &ApiClient, state: &Arc<Mutex<DashboardState>>) {
    let catalog = match api.list_datasets().await {
        Ok(names) if names.is_empty() => {
            info!("no datasets available");
            Catalog::Empty
        }
        Ok(names) => {
            info!(count = names.len(), "datasets loaded");
            Catalog::Ready(names)
        }
        Err(err) => {
            warn!(%err, "dataset load failed");
            Catalog::Failed
        }
    };
    state.lock().unwrap().datasets = catalog;
}
