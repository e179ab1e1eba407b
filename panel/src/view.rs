//! Typed view-model for the bot-card region.
//!
//! `build_cards` is a pure function of the current snapshot; the terminal
//! renderer consumes its output and adds nothing of its own. Keeping the
//! shaping here makes every rendered field testable without a terminal.

use crate::state::{BotStatus, Snapshot};

pub const RUNNING_LABEL: &str = "RUNNING";
pub const STOPPED_LABEL: &str = "STOPPED";
pub const METRIC_PLACEHOLDER: &str = "--";

/// Everything one card shows, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct BotCard {
    pub bot_id: String,
    pub running: bool,
    pub status_label: &'static str,
    pub portfolio: String,
    pub last_price: String,
    pub cash: String,
    pub position: String,
    /// Most-recent-first. The wire order is oldest-first; this is the exact
    /// reversal. Empty means "no logs yet" (renderer draws a placeholder).
    pub logs: Vec<String>,
}

/// Rebuild the full card list from a snapshot, in snapshot order.
pub fn build_cards(bots: &Snapshot) -> Vec<BotCard> {
    bots.iter().map(|(id, status)| build_card(id, status)).collect()
}

fn build_card(bot_id: &str, status: &BotStatus) -> BotCard {
    BotCard {
        bot_id: bot_id.to_string(),
        running: status.bot_running,
        status_label: if status.bot_running { RUNNING_LABEL } else { STOPPED_LABEL },
        portfolio: fmt_metric(status.portfolio_value, 2),
        last_price: fmt_metric(status.last_close, 4),
        cash: fmt_metric(status.cash, 2),
        position: fmt_metric(status.position_size, 0),
        logs: status.recent_logs.iter().rev().cloned().collect(),
    }
}

fn fmt_metric(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => METRIC_PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(running: bool) -> BotStatus {
        BotStatus {
            bot_running: running,
            portfolio_value: None,
            last_close: None,
            recent_logs: vec![],
            cash: None,
            position_size: None,
        }
    }

    #[test]
    fn rendering_is_idempotent() {
        let snapshot: Snapshot = vec![
            (
                "alpha".into(),
                BotStatus {
                    bot_running: true,
                    portfolio_value: Some(10234.5),
                    last_close: Some(1.08765),
                    recent_logs: vec!["buy".into(), "sell".into()],
                    cash: Some(500.0),
                    position_size: Some(3.0),
                },
            ),
            ("beta".into(), status(false)),
        ];

        assert_eq!(build_cards(&snapshot), build_cards(&snapshot));
    }

    #[test]
    fn empty_snapshot_yields_no_cards() {
        let snapshot: Snapshot = vec![];
        assert!(build_cards(&snapshot).is_empty());
    }

    #[test]
    fn status_label_follows_bot_running_only() {
        for running in [true, false] {
            let cards = build_cards(&vec![("b".into(), status(running))]);
            let expected = if running { RUNNING_LABEL } else { STOPPED_LABEL };
            assert_eq!(cards[0].status_label, expected);
            assert_eq!(cards[0].running, running);
        }
    }

    #[test]
    fn logs_render_most_recent_first() {
        let mut s = status(true);
        s.recent_logs = vec!["a".into(), "b".into(), "c".into()];
        let cards = build_cards(&vec![("b".into(), s)]);
        assert_eq!(cards[0].logs, vec!["c", "b", "a"]);
    }

    #[test]
    fn no_logs_stays_empty_for_placeholder() {
        let cards = build_cards(&vec![("b".into(), status(true))]);
        assert!(cards[0].logs.is_empty());
    }

    #[test]
    fn missing_metrics_render_dashes() {
        let cards = build_cards(&vec![("b".into(), status(true))]);
        assert_eq!(cards[0].portfolio, "--");
        assert_eq!(cards[0].last_price, "--");
        assert_eq!(cards[0].cash, "--");
        assert_eq!(cards[0].position, "--");
    }

    #[test]
    fn metrics_format_to_fixed_decimals() {
        let mut s = status(true);
        s.portfolio_value = Some(10234.5);
        s.last_close = Some(1.08765);
        let cards = build_cards(&vec![("b".into(), s)]);
        assert_eq!(cards[0].portfolio, "10234.50");
        assert_eq!(cards[0].last_price, "1.0877");
    }

    #[test]
    fn cards_preserve_snapshot_order() {
        let snapshot: Snapshot = vec![
            ("zeta".into(), status(true)),
            ("alpha".into(), status(false)),
        ];
        let cards = build_cards(&snapshot);
        assert_eq!(cards[0].bot_id, "zeta");
        assert_eq!(cards[1].bot_id, "alpha");
    }
}
