//! Transient notifications ("toasts").
//!
//! Toasts expire on their own after the configured lifetime or can be dismissed early.

use crate::commands::{CmdMessage, MessageLevel};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: MessageLevel,
    pub created_at: Instant,
}

#[derive(Debug)]
pub struct Notifications {
    toasts: Vec<Toast>,
    next_id: u64,
    lifetime: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_LIFETIME)
    }
}

impl Notifications {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            toasts: Vec::new(),
            next_id: 1,
            lifetime,
        }
    }

    pub fn push(&mut self, level: MessageLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push(Toast {
            id,
            message: message.into(),
            level,
            created_at: Instant::now(),
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(MessageLevel::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(MessageLevel::Error, message)
    }

    pub fn extend(&mut self, messages: &[CmdMessage]) {
        for message in messages {
            self.push(message.level, message.content.clone());
        }
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drops expired toasts and returns the rest, oldest first.
    pub fn active(&mut self) -> &[Toast] {
        let lifetime = self.lifetime;
        self.toasts.retain(|t| t.created_at.elapsed() < lifetime);
        &self.toasts
    }

    /// Removes and returns every live toast.
    pub fn drain(&mut self) -> Vec<Toast> {
        self.active();
        std::mem::take(&mut self.toasts)
    }
}
