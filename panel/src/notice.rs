//! Transient operator notices: one shared slot, auto-expiring.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    deadline: Instant,
}

/// Single-slot notice display. A new `show` overwrites whatever is pending
/// and restarts the expiry window; there is no queue. Cannot fail.
pub struct NoticeBoard {
    ttl: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, current: None }
    }

    pub fn show(&mut self, text: impl Into<String>, kind: NoticeKind) {
        self.show_at(text, kind, Instant::now());
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current_at(Instant::now())
    }

    fn show_at(&mut self, text: impl Into<String>, kind: NoticeKind, now: Instant) {
        self.current = Some(Notice {
            text: text.into(),
            kind,
            deadline: now + self.ttl,
        });
    }

    fn current_at(&self, now: Instant) -> Option<&Notice> {
        self.current.as_ref().filter(|n| now < n.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_expires_after_ttl() {
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        let t0 = Instant::now();
        board.show_at("saved", NoticeKind::Success, t0);

        assert!(board.current_at(t0 + Duration::from_secs(4)).is_some());
        assert!(board.current_at(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn later_show_overwrites_and_resets_window() {
        let mut board = NoticeBoard::new(Duration::from_secs(5));
        let t0 = Instant::now();
        board.show_at("first", NoticeKind::Info, t0);
        board.show_at("second", NoticeKind::Error, t0 + Duration::from_secs(4));

        // Past the first notice's deadline, the second is still visible
        let seen = board.current_at(t0 + Duration::from_secs(8)).unwrap();
        assert_eq!(seen.text, "second");
        assert_eq!(seen.kind, NoticeKind::Error);
    }

    #[test]
    fn empty_board_shows_nothing() {
        let board = NoticeBoard::new(Duration::from_secs(5));
        assert!(board.current().is_none());
    }
}
