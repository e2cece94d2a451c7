//! Transient operator notices
//!
//! Short-lived messages surfaced on the dashboard after mutations and feed
//! events ("Item added: Samosa", "Payment update failed"). Notices expire
//! after a configurable time-to-live and are purged lazily whenever the
//! list is read.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    posted_at: Instant,
}

#[derive(Debug)]
pub struct NoticeCenter {
    ttl: Duration,
    notices: Mutex<Vec<Notice>>,
}

impl NoticeCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message.into());
    }

    fn push(&self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(notice = %message),
            NoticeLevel::Error => tracing::warn!(notice = %message),
        }
        let mut notices = self.notices.lock().unwrap();
        notices.push(Notice {
            id: Uuid::new_v4(),
            level,
            message,
            posted_at: Instant::now(),
        });
    }

    /// Current unexpired notices, oldest first
    pub fn active(&self) -> Vec<Notice> {
        let now = Instant::now();
        let mut notices = self.notices.lock().unwrap();
        notices.retain(|n| now.duration_since(n.posted_at) < self.ttl);
        notices.clone()
    }

    pub fn dismiss(&self, id: Uuid) {
        self.notices.lock().unwrap().retain(|n| n.id != id);
    }
}
