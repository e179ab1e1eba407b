//! Shared panel state, owned by bootstrap behind an `Arc<Mutex<..>>`.
//!
//! Every poll replaces the whole snapshot; nothing here is merged
//! incrementally. Rendering reads this state and nothing else.

use serde::Deserialize;

use crate::notice::NoticeBoard;

/// One bot as reported by the status endpoint. Optional metrics stay `None`
/// until the engine has produced them; unknown response fields (`pid`,
/// `file_status`, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BotStatus {
    pub bot_running: bool,
    pub portfolio_value: Option<f64>,
    pub last_close: Option<f64>,
    #[serde(default)]
    pub recent_logs: Vec<String>,
    pub cash: Option<f64>,
    pub position_size: Option<f64>,
}

/// All known bots, in server response order. The client never sorts.
pub type Snapshot = Vec<(String, BotStatus)>;

/// Result of the one-shot dataset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Catalog {
    Loading,
    Ready(Vec<String>),
    Empty,
    Failed,
}

impl Catalog {
    pub fn names(&self) -> &[String] {
        match self {
            Catalog::Ready(names) => names,
            _ => &[],
        }
    }
}

pub struct DashboardState {
    pub bots: Snapshot,
    pub datasets: Catalog,
    pub dataset_index: usize,
    pub bot_id_input: String,
    /// True while a create request is in flight; drawn as a disabled,
    /// relabeled launch control. Cleared by `LaunchGuard` on every path.
    pub launch_busy: bool,
    pub selected_card: usize,
    /// Bot id awaiting stop confirmation, if the modal is open.
    pub confirm_stop: Option<String>,
    pub notices: NoticeBoard,
    pub connected: bool,
    pub last_updated: Option<String>,
}

impl DashboardState {
    pub fn new(notice_ttl: std::time::Duration) -> Self {
        Self {
            bots: Vec::new(),
            datasets: Catalog::Loading,
            dataset_index: 0,
            bot_id_input: String::new(),
            launch_busy: false,
            selected_card: 0,
            confirm_stop: None,
            notices: NoticeBoard::new(notice_ttl),
            connected: false,
            last_updated: None,
        }
    }

    /// Replace the entire snapshot with a fresh one. Whichever refresh lands
    /// last wins; there is deliberately no sequence check (see README notes
    /// on the overlapping-refresh race).
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.bots = snapshot;
        if self.selected_card >= self.bots.len() {
            self.selected_card = self.bots.len().saturating_sub(1);
        }
    }

    pub fn selected_bot_id(&self) -> Option<&str> {
        self.bots.get(self.selected_card).map(|(id, _)| id.as_str())
    }

    pub fn selected_dataset(&self) -> Option<&str> {
        self.datasets.names().get(self.dataset_index).map(|s| s.as_str())
    }

    pub fn select_next_card(&mut self) {
        if !self.bots.is_empty() {
            self.selected_card = (self.selected_card + 1) % self.bots.len();
        }
    }

    pub fn select_prev_card(&mut self) {
        if !self.bots.is_empty() {
            self.selected_card =
                self.selected_card.checked_sub(1).unwrap_or(self.bots.len() - 1);
        }
    }

    pub fn select_next_dataset(&mut self) {
        let n = self.datasets.names().len();
        if n > 0 {
            self.dataset_index = (self.dataset_index + 1) % n;
        }
    }

    pub fn select_prev_dataset(&mut self) {
        let n = self.datasets.names().len();
        if n > 0 {
            self.dataset_index = self.dataset_index.checked_sub(1).unwrap_or(n - 1);
        }
    }
}
