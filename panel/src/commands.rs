//! The two mutating commands: launch a bot, stop a bot.
//!
//! Both follow the same shape: validate, mark the control busy, issue the
//! request, release the control on every exit path, branch on outcome.
//! Outcomes reach the operator through the notice board; a success also
//! nudges the poller for an immediate out-of-band refresh.

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, StartBotRequest};
use crate::notice::NoticeKind;
use crate::state::DashboardState;

pub struct CommandContext {
    pub api: Arc<ApiClient>,
    pub state: Arc<Mutex<DashboardState>>,
    pub refresh: Arc<Notify>,
}

/// Holds the launch control busy for the lifetime of one create request.
/// Dropping the guard releases the control, so no outcome branch (or panic
/// unwind) can leave it stuck disabled. The flag is raised by the caller
/// under the same lock that validated the input, so the control is busy
/// before `launch` returns, not when the request task gets scheduled.
struct LaunchGuard {
    state: Arc<Mutex<DashboardState>>,
}

impl Drop for LaunchGuard {
    fn drop(&mut self) {
        self.state.lock().unwrap().launch_busy = false;
    }
}

/// Default trading symbol: the dataset name up to the first dot.
pub fn derive_symbol(dataset: &str) -> &str {
    dataset.split('.').next().unwrap_or(dataset)
}

/// Client-side preconditions, checked before any network call.
pub fn validate_launch(
    bot_id: &str,
    dataset: Option<&str>,
) -> Result<StartBotRequest, &'static str> {
    let bot_id = bot_id.trim();
    if bot_id.is_empty() {
        return Err("Enter a bot id.");
    }
    let dataset = match dataset {
        Some(d) if !d.is_empty() => d,
        _ => return Err("Select a dataset."),
    };
    Ok(StartBotRequest {
        bot_id: bot_id.to_string(),
        data_file: dataset.to_string(),
        symbol: derive_symbol(dataset).to_string(),
    })
}

/// Launch a bot from the current input field and dataset selection.
/// Validation failures surface immediately and send nothing over the wire.
pub fn launch(ctx: &CommandContext) {
    // Validate and mark busy in one critical section: a second Enter press
    // must see the control disabled before the request task ever runs.
    let (request, busy) = {
        let mut s = ctx.state.lock().unwrap();
        if s.launch_busy {
            return;
        }
        let request = match validate_launch(&s.bot_id_input, s.selected_dataset()) {
            Ok(req) => req,
            Err(msg) => {
                s.notices.show(msg, NoticeKind::Error);
                return;
            }
        };
        s.launch_busy = true;
        (request, LaunchGuard { state: ctx.state.clone() })
    };

    let api = ctx.api.clone();
    let state = ctx.state.clone();
    let refresh = ctx.refresh.clone();

    tokio::spawn(async move {
        let _busy = busy;
        info!(bot_id = %request.bot_id, data_file = %request.data_file, "starting bot");

        match api.start_bot(&request).await {
            Ok(message) => {
                let mut s = state.lock().unwrap();
                s.notices.show(message, NoticeKind::Success);
                s.bot_id_input.clear();
                drop(s);
                refresh.notify_one();
            }
            Err(ApiError::Rejected { status, message }) => {
                warn!(status, %message, "start rejected");
                state
                    .lock()
                    .unwrap()
                    .notices
                    .show(format!("Start failed: {message}"), NoticeKind::Error);
            }
            Err(ApiError::Transport(err)) => {
                warn!(%err, "start request failed");
                state
                    .lock()
                    .unwrap()
                    .notices
                    .show(format!("Network error: {err}"), NoticeKind::Error);
            }
        }
    });
}

/// Open the stop-confirmation modal for the selected card, if any.
pub fn request_stop(ctx: &CommandContext) {
    let mut s = ctx.state.lock().unwrap();
    if let Some(bot_id) = s.selected_bot_id().map(str::to_string) {
        s.confirm_stop = Some(bot_id);
    }
}

/// Operator declined: close the modal, touch nothing else.
pub fn decline_stop(ctx: &CommandContext) {
    ctx.state.lock().unwrap().confirm_stop = None;
}

/// Operator confirmed: issue the stop request for the bot named in the modal.
pub fn confirm_stop(ctx: &CommandContext) {
    let bot_id = match ctx.state.lock().unwrap().confirm_stop.take() {
        Some(id) => id,
        None => return,
    };

    let api = ctx.api.clone();
    let state = ctx.state.clone();
    let refresh = ctx.refresh.clone();

    tokio::spawn(async move {
        info!(%bot_id, "stopping bot");
        match api.stop_bot(&bot_id).await {
            Ok(message) => {
                state.lock().unwrap().notices.show(message, NoticeKind::Success);
                refresh.notify_one();
            }
            Err(ApiError::Rejected { status, message }) => {
                warn!(status, %message, "stop rejected");
                state
                    .lock()
                    .unwrap()
                    .notices
                    .show(format!("Stop failed: {message}"), NoticeKind::Error);
            }
            Err(ApiError::Transport(err)) => {
                warn!(%err, "stop request failed");
                state
                    .lock()
                    .unwrap()
                    .notices
                    .show(format!("Network error: {err}"), NoticeKind::Error);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{BotStatus, Catalog};
    use std::time::Duration;

    fn state() -> Arc<Mutex<DashboardState>> {
        Arc::new(Mutex::new(DashboardState::new(Duration::from_secs(5))))
    }

    fn running_bot(id: &str) -> (String, BotStatus) {
        (
            id.to_string(),
            BotStatus {
                bot_running: true,
                portfolio_value: None,
                last_close: None,
                recent_logs: vec![],
                cash: None,
                position_size: None,
            },
        )
    }

    #[test]
    fn symbol_is_dataset_name_before_first_dot() {
        assert_eq!(derive_symbol("AAPL.csv"), "AAPL");
        assert_eq!(derive_symbol("eurusd.1h.csv"), "eurusd");
        assert_eq!(derive_symbol("nodot"), "nodot");
    }

    #[test]
    fn empty_bot_id_fails_validation_before_any_request() {
        assert_eq!(validate_launch("", Some("AAPL.csv")).unwrap_err(), "Enter a bot id.");
        assert_eq!(validate_launch("   ", Some("AAPL.csv")).unwrap_err(), "Enter a bot id.");
    }

    #[test]
    fn missing_dataset_fails_validation() {
        assert_eq!(validate_launch("alpha", None).unwrap_err(), "Select a dataset.");
        assert_eq!(validate_launch("alpha", Some("")).unwrap_err(), "Select a dataset.");
    }

    #[test]
    fn valid_launch_builds_trimmed_request() {
        let req = validate_launch("  alpha ", Some("AAPL.csv")).unwrap();
        assert_eq!(req.bot_id, "alpha");
        assert_eq!(req.data_file, "AAPL.csv");
        assert_eq!(req.symbol, "AAPL");
    }

    fn engage(state: &Arc<Mutex<DashboardState>>) -> LaunchGuard {
        state.lock().unwrap().launch_busy = true;
        LaunchGuard { state: state.clone() }
    }

    #[test]
    fn launch_guard_releases_on_every_path() {
        let state = state();

        {
            let _busy = engage(&state);
            assert!(state.lock().unwrap().launch_busy);
        }
        assert!(!state.lock().unwrap().launch_busy);

        // Release must also happen when the holding task unwinds
        let state2 = state.clone();
        let result = std::panic::catch_unwind(move || {
            let _busy = engage(&state2);
            panic!("transport blew up");
        });
        assert!(result.is_err());
        assert!(!state.lock().unwrap().launch_busy);
    }

    #[tokio::test]
    async fn launch_marks_control_busy_before_returning() {
        let state = state();
        {
            let mut s = state.lock().unwrap();
            s.datasets = Catalog::Ready(vec!["AAPL.csv".into()]);
            s.bot_id_input = "alpha".into();
        }
        let ctx = ctx(state.clone());

        launch(&ctx);

        // The control is disabled synchronously; a second Enter press in the
        // same instant must not issue a duplicate start request.
        assert!(state.lock().unwrap().launch_busy);
        launch(&ctx);
        assert!(state.lock().unwrap().launch_busy);
    }

    fn ctx(state: Arc<Mutex<DashboardState>>) -> CommandContext {
        CommandContext {
            api: Arc::new(ApiClient::new("http://127.0.0.1:1", 1)),
            state,
            refresh: Arc::new(Notify::new()),
        }
    }

    #[test]
    fn declining_stop_leaves_state_untouched() {
        let state = state();
        {
            let mut s = state.lock().unwrap();
            s.apply_snapshot(vec![running_bot("alpha"), running_bot("beta")]);
            s.confirm_stop = Some("alpha".to_string());
        }
        let ctx = ctx(state.clone());

        decline_stop(&ctx);

        let s = state.lock().unwrap();
        assert!(s.confirm_stop.is_none());
        assert_eq!(s.bots.len(), 2);
        assert!(s.notices.current().is_none());
    }

    #[test]
    fn request_stop_targets_selected_card() {
        let state = state();
        {
            let mut s = state.lock().unwrap();
            s.apply_snapshot(vec![running_bot("alpha"), running_bot("beta")]);
            s.selected_card = 1;
        }
        let ctx = ctx(state.clone());

        request_stop(&ctx);
        assert_eq!(state.lock().unwrap().confirm_stop.as_deref(), Some("beta"));
    }

    #[test]
    fn request_stop_without_cards_is_a_no_op() {
        let state = state();
        let ctx = ctx(state.clone());
        request_stop(&ctx);
        assert!(state.lock().unwrap().confirm_stop.is_none());
    }
}
