//! Event registry records.
//!
//! # Invariants
//! - Windows are half-open `[start_ms, end_ms)` in Unix epoch milliseconds.
//! - `end_ms > start_ms` is assumed, not re-validated here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a work event.
pub type EventId = Uuid;

/// Work event with its scheduled time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub start_ms: i64,
    pub end_ms: i64,
}

impl Event {
    pub fn new(id: EventId, start_ms: i64, end_ms: i64) -> Self {
        Self {
            id,
            start_ms,
            end_ms,
        }
    }

    /// Returns whether both windows share at least one instant.
    ///
    /// Back-to-back events (`a.end_ms == b.start_ms`) do not overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }
}
