//! Process-wide kill switch (spec.md §4.7 / §9): loaded at startup, re-read
//! on change notification, passed by reference into handlers rather than
//! kept as an ambient global so tests can substitute it freely.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct KillSwitch {
    active: AtomicBool,
}

impl KillSwitch {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Applies a change notification (e.g. a config reload).
    pub fn set(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }
}

impl PartialEq for KillSwitch {
    fn eq(&self, other: &Self) -> bool {
        self.is_active() == other.is_active()
    }
}
impl Eq for KillSwitch {}
