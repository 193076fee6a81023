//! Dismissible notifications shown on top of the UI.
//!
//! The queue is shared behind a mutex so the deck store can report
//! access-denied failures into it from wherever it is called.

use crate::database::store::{ErrorReporter, StoreError};
use log::error;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub created_at: Instant,
}

#[derive(Default)]
struct Queue {
    next_id: u64,
    items: Vec<Notification>,
}

#[derive(Clone, Default)]
pub struct Notifications {
    queue: Arc<Mutex<Queue>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an info toast. `None` means the queue is unusable and the
    /// notification went to the log instead.
    pub fn info(&self, title: &str, message: impl Into<String>) -> Option<u64> {
        self.push(NotificationLevel::Info, title, message.into())
    }

    pub fn error(&self, title: &str, message: impl Into<String>) -> Option<u64> {
        self.push(NotificationLevel::Error, title, message.into())
    }

    fn push(&self, level: NotificationLevel, title: &str, message: String) -> Option<u64> {
        let Ok(mut queue) = self.queue.lock() else {
            error!("Notification queue is poisoned, dropping {:?} '{}': {}", level, title, message);
            return None;
        };
        queue.next_id += 1;
        let id = queue.next_id;
        queue.items.push(Notification {
            id,
            level,
            title: title.to_string(),
            message,
            created_at: Instant::now(),
        });
        Some(id)
    }

    pub fn dismiss(&self, id: u64) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.items.retain(|n| n.id != id);
        }
    }

    /// Drops info notifications older than `ttl`. Errors stay until dismissed.
    pub fn expire(&self, ttl: Duration) {
        if let Ok(mut queue) = self.queue.lock() {
            queue
                .items
                .retain(|n| n.level == NotificationLevel::Error || n.created_at.elapsed() < ttl);
        }
    }

    /// Oldest first
    pub fn snapshot(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .map(|queue| queue.items.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().map_or(true, |queue| queue.items.is_empty())
    }
}

impl ErrorReporter for Notifications {
    fn report(&self, error: &StoreError) {
        self.error("Permission Denied", error.to_string());
    }
}
