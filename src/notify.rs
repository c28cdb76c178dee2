use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub description: Option<String>,
    pub raised_at: Instant,
}

/// Fire-and-forget user-facing messages.
pub trait Notifier {
    fn notify(&mut self, kind: NoticeKind, message: &str, description: Option<&str>);

    fn success(&mut self, message: &str, description: Option<&str>) {
        self.notify(NoticeKind::Success, message, description);
    }

    fn error(&mut self, message: &str, description: Option<&str>) {
        self.notify(NoticeKind::Error, message, description);
    }
}

/// Bounded queue of recent notices, drained by the toast overlay.
#[derive(Debug)]
pub struct NoticeLog {
    notices: VecDeque<Notice>,
    capacity: usize,
}

impl NoticeLog {
    pub const DEFAULT_CAPACITY: usize = 6;
    pub const DISPLAY_FOR: Duration = Duration::from_secs(4);

    pub fn new(capacity: usize) -> Self {
        Self {
            notices: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Drops notices older than [`Self::DISPLAY_FOR`].
    pub fn expire(&mut self, now: Instant) {
        self.notices
            .retain(|notice| now.saturating_duration_since(notice.raised_at) < Self::DISPLAY_FOR);
    }

    pub fn dismiss(&mut self, index: usize) {
        self.notices.remove(index);
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl Notifier for NoticeLog {
    fn notify(&mut self, kind: NoticeKind, message: &str, description: Option<&str>) {
        let detail = description.unwrap_or_default();
        match kind {
            NoticeKind::Success => info!(text = message, detail, "notice"),
            NoticeKind::Error => warn!(text = message, detail, "notice"),
        }

        while self.notices.len() >= self.capacity {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            kind,
            message: message.to_owned(),
            description: description.map(str::to_owned),
            raised_at: Instant::now(),
        });
    }
}
