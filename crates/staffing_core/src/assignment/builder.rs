//! Canonical assignment set builder.
//!
//! # Responsibility
//! - Hold the staff already assigned to an event and the candidates picked in
//!   the current editing session in one origin-tagged map.
//! - Produce the full target `AssignmentSet` for submission.
//!
//! # Invariants
//! - A staff id appears at most once, tagged `Existing` or `New`.
//! - `remove_candidate` never touches `Existing` entries and
//!   `remove_from_canonical` never touches `New` entries.
//! - `build_submission` is idempotent and strips the origin tag.
//! - Role eligibility is never re-validated here.

use crate::model::assignment::{Assignment, AssignmentSet};
use crate::model::employee::StaffId;
use crate::model::event::EventId;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Where a draft entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Returned by the assignment service when the editor loaded.
    Existing,
    /// Selected during the current editing session.
    New,
}

/// One staff member in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftEntry {
    pub is_manager: bool,
    pub origin: Origin,
}

/// Rejected builder mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// Staff is already part of the canonical set.
    AlreadyAssigned(StaffId),
    /// Staff is already in the candidate pool.
    AlreadySelected(StaffId),
    /// Staff is in neither pool.
    NotSelected(StaffId),
}

impl Display for BuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyAssigned(id) => write!(f, "staff {id} is already assigned to this event"),
            Self::AlreadySelected(id) => write!(f, "staff {id} is already selected"),
            Self::NotSelected(id) => write!(f, "staff {id} is not part of this assignment"),
        }
    }
}

impl Error for BuilderError {}

/// Draft of one event's staffing during an editing session.
#[derive(Debug, Clone)]
pub struct AssignmentDraft {
    event_id: EventId,
    entries: BTreeMap<StaffId, DraftEntry>,
}

impl AssignmentDraft {
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            entries: BTreeMap::new(),
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Seeds the canonical set and drops every candidate and toggle.
    pub fn initialize(&mut self, current: &AssignmentSet) {
        self.entries.clear();
        for assignment in current.iter() {
            self.entries.insert(
                assignment.staff_id,
                DraftEntry {
                    is_manager: assignment.is_manager,
                    origin: Origin::Existing,
                },
            );
        }
    }

    /// Adds one candidate with `is_manager = false`.
    pub fn add_candidate(&mut self, staff_id: StaffId) -> Result<(), BuilderError> {
        match self.entries.get(&staff_id).map(|entry| entry.origin) {
            Some(Origin::Existing) => Err(BuilderError::AlreadyAssigned(staff_id)),
            Some(Origin::New) => Err(BuilderError::AlreadySelected(staff_id)),
            None => {
                self.entries.insert(
                    staff_id,
                    DraftEntry {
                        is_manager: false,
                        origin: Origin::New,
                    },
                );
                Ok(())
            }
        }
    }

    /// Drops one candidate; existing assignments are left alone.
    pub fn remove_candidate(&mut self, staff_id: StaffId) -> Result<(), BuilderError> {
        self.remove_with_origin(staff_id, Origin::New)
    }

    /// Drops one already-assigned staff member so the next save omits them.
    pub fn remove_from_canonical(&mut self, staff_id: StaffId) -> Result<(), BuilderError> {
        self.remove_with_origin(staff_id, Origin::Existing)
    }

    /// Sets the manager flag on whichever pool holds `staff_id`.
    pub fn toggle_manager(&mut self, staff_id: StaffId, value: bool) -> Result<(), BuilderError> {
        let entry = self
            .entries
            .get_mut(&staff_id)
            .ok_or(BuilderError::NotSelected(staff_id))?;
        entry.is_manager = value;
        Ok(())
    }

    /// Returns the full target state for submission.
    pub fn build_submission(&self) -> AssignmentSet {
        AssignmentSet::from_assignments(
            self.event_id,
            self.entries
                .iter()
                .map(|(staff_id, entry)| Assignment::new(*staff_id, entry.is_manager)),
        )
    }

    pub fn get(&self, staff_id: StaffId) -> Option<DraftEntry> {
        self.entries.get(&staff_id).copied()
    }

    pub fn contains(&self, staff_id: StaffId) -> bool {
        self.entries.contains_key(&staff_id)
    }

    /// Already-assigned staff in ascending id order.
    pub fn existing(&self) -> Vec<Assignment> {
        self.with_origin(Origin::Existing)
    }

    /// Session candidates in ascending id order.
    pub fn candidates(&self) -> Vec<Assignment> {
        self.with_origin(Origin::New)
    }

    /// Returns whether the draft differs from `loaded`.
    pub fn is_dirty(&self, loaded: &AssignmentSet) -> bool {
        self.build_submission() != *loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_with_origin(&mut self, staff_id: StaffId, origin: Origin) -> Result<(), BuilderError> {
        match self.entries.get(&staff_id) {
            Some(entry) if entry.origin == origin => {
                self.entries.remove(&staff_id);
                Ok(())
            }
            _ => Err(BuilderError::NotSelected(staff_id)),
        }
    }

    fn with_origin(&self, origin: Origin) -> Vec<Assignment> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.origin == origin)
            .map(|(staff_id, entry)| Assignment::new(*staff_id, entry.is_manager))
            .collect()
    }
}
