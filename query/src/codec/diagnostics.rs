//! Warn-once diagnostics for row decoding
//!
//! Best-effort deduplication of coercion warnings per field. The set lives in
//! an object owned by the caller rather than in process-wide state; a race
//! between threads can at worst emit one extra warning.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

#[derive(Debug)]
pub struct Diagnostics {
    enabled: bool,
    warned: Mutex<FxHashSet<String>>,
    issues: AtomicUsize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Log the first issue per field
    pub fn new() -> Self {
        Self {
            enabled: true,
            warned: Mutex::new(FxHashSet::default()),
            issues: AtomicUsize::new(0),
        }
    }

    /// Count issues without logging
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Record an issue for `field`. Returns true when this call logged.
    pub fn warn_once(&self, field: &str, message: impl fmt::Display) -> bool {
        self.issues.fetch_add(1, Ordering::Relaxed);
        if !self.enabled {
            return false;
        }
        let first = {
            let mut warned = self.warned.lock();
            if warned.contains(field) {
                false
            } else {
                warned.insert(field.to_string())
            }
        };
        if first {
            tracing::warn!(field, "{} (further warnings for this field suppressed)", message);
        }
        first
    }

    /// Total issues recorded, logged or not
    pub fn issue_count(&self) -> usize {
        self.issues.load(Ordering::Relaxed)
    }

    /// Fields that have logged a warning, sorted
    pub fn warned_fields(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.warned.lock().iter().cloned().collect();
        fields.sort();
        fields
    }
}
