//! Notification center.
//!
//! The toast surface of the application: a list of user-facing messages with a
//! severity, an optional technical detail and an optional action label. Info and
//! success entries dismiss themselves after a fixed time-to-live; errors and
//! warnings stay until removed.

use crate::commands::MessageLevel;
use crate::timer::{TimerId, TimerQueue};
use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub message: String,
    pub level: MessageLevel,
    pub timestamp: DateTime<Utc>,
    pub details: Option<String>,
    pub action: Option<String>,
    pub dismissible: bool,
}

/// Anything that can report a message to the user.
pub trait NotificationSink {
    /// Report a message and return the id of the created notification.
    fn notify(
        &self,
        message: &str,
        level: MessageLevel,
        details: Option<&str>,
        action: Option<&str>,
    ) -> String;
}

type Listener = Box<dyn FnMut(&[Notification])>;

pub struct NotificationCenter {
    me: Weak<NotificationCenter>,
    timers: Rc<TimerQueue>,
    ttl: Duration,
    entries: RefCell<Vec<Notification>>,
    expiry: RefCell<HashMap<String, TimerId>>,
    listeners: RefCell<Vec<Listener>>,
    emitting: Cell<bool>,
    dirty: Cell<bool>,
}

impl NotificationCenter {
    pub fn new(timers: Rc<TimerQueue>, ttl: Duration) -> Rc<Self> {
        Rc::new_cyclic(|me| Self {
            me: me.clone(),
            timers,
            ttl,
            entries: RefCell::new(Vec::new()),
            expiry: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
            emitting: Cell::new(false),
            dirty: Cell::new(false),
        })
    }

    pub fn add(
        &self,
        message: impl Into<String>,
        level: MessageLevel,
        details: Option<String>,
        action: Option<String>,
    ) -> String {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            level,
            timestamp: Utc::now(),
            details,
            action,
            dismissible: true,
        };
        let id = notification.id.clone();
        tracing::debug!(%id, ?level, message = %notification.message, "notification added");
        self.entries.borrow_mut().push(notification);

        if matches!(level, MessageLevel::Info | MessageLevel::Success) {
            let me = self.me.clone();
            let dismiss_id = id.clone();
            let timer = self.timers.schedule(self.ttl, move || {
                if let Some(center) = me.upgrade() {
                    center.remove(&dismiss_id);
                }
            });
            self.expiry.borrow_mut().insert(id.clone(), timer);
        }

        self.emit();
        id
    }

    pub fn error(&self, message: impl Into<String>, details: Option<String>) -> String {
        self.add(message, MessageLevel::Error, details, None)
    }

    pub fn warning(&self, message: impl Into<String>, details: Option<String>) -> String {
        self.add(message, MessageLevel::Warning, details, None)
    }

    pub fn info(&self, message: impl Into<String>, details: Option<String>) -> String {
        self.add(message, MessageLevel::Info, details, None)
    }

    pub fn success(&self, message: impl Into<String>, details: Option<String>) -> String {
        self.add(
            message,
            MessageLevel::Success,
            details,
            Some("Success".to_string()),
        )
    }

    /// Remove a notification. Returns `false` if it was already gone.
    pub fn remove(&self, id: &str) -> bool {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let before = entries.len();
            entries.retain(|n| n.id != id);
            entries.len() != before
        };
        let expiry = self.expiry.borrow_mut().remove(id);
        if let Some(timer) = expiry {
            self.timers.cancel(timer);
        }
        if removed {
            self.emit();
        }
        removed
    }

    pub fn clear_all(&self) {
        self.entries.borrow_mut().clear();
        let expired: Vec<TimerId> = self.expiry.borrow_mut().drain().map(|(_, t)| t).collect();
        for timer in expired {
            self.timers.cancel(timer);
        }
        self.emit();
    }

    pub fn list(&self) -> Vec<Notification> {
        self.entries.borrow().clone()
    }

    pub fn has_any(&self) -> bool {
        !self.entries.borrow().is_empty()
    }

    pub fn subscribe(&self, listener: impl FnMut(&[Notification]) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    /// Deliver the current list to every listener. Listeners may call back into
    /// the center; a change made while emitting triggers one more round with the
    /// newer list once the current round finishes.
    fn emit(&self) {
        if self.emitting.replace(true) {
            self.dirty.set(true);
            return;
        }
        loop {
            self.dirty.set(false);
            let snapshot = self.list();
            let mut listeners = std::mem::take(&mut *self.listeners.borrow_mut());
            for listener in listeners.iter_mut() {
                listener(&snapshot);
            }
            {
                let mut slot = self.listeners.borrow_mut();
                let added = std::mem::replace(&mut *slot, listeners);
                slot.extend(added);
            }
            if !self.dirty.get() {
                break;
            }
        }
        self.emitting.set(false);
    }
}

impl NotificationSink for NotificationCenter {
    fn notify(
        &self,
        message: &str,
        level: MessageLevel,
        details: Option<&str>,
        action: Option<&str>,
    ) -> String {
        self.add(
            message,
            level,
            details.map(str::to_string),
            action.map(str::to_string),
        )
    }
}
