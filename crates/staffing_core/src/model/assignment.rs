//! Assignment value types.
//!
//! # Responsibility
//! - Define `Assignment` and the full-state `AssignmentSet` submitted on save.
//! - Define `AssignedStaff`, the read model returned by the assignment service.
//!
//! # Invariants
//! - `AssignmentSet` is keyed by staff id; duplicates collapse on insert.
//! - Collapsing duplicates ORs their manager flags; a `true` is never lost.
//! - Iteration order is ascending staff id, so equal sets compare and
//!   serialize identically.

use crate::model::employee::{Employee, RoleTag, StaffId};
use crate::model::event::EventId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One staff member scoped to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub staff_id: StaffId,
    #[serde(rename = "storeManager")]
    pub is_manager: bool,
}

impl Assignment {
    pub fn new(staff_id: StaffId, is_manager: bool) -> Self {
        Self {
            staff_id,
            is_manager,
        }
    }

    pub fn manager(staff_id: StaffId) -> Self {
        Self::new(staff_id, true)
    }

    pub fn staff(staff_id: StaffId) -> Self {
        Self::new(staff_id, false)
    }
}

/// Complete target state of one event's staffing.
///
/// Saving always transmits the whole set; removing someone means leaving
/// them out of the next set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSet {
    event_id: EventId,
    assignments: BTreeMap<StaffId, bool>,
}

impl AssignmentSet {
    /// Creates an empty set for one event.
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            assignments: BTreeMap::new(),
        }
    }

    /// Builds a set from raw assignments, OR-merging duplicates.
    pub fn from_assignments<I>(event_id: EventId, assignments: I) -> Self
    where
        I: IntoIterator<Item = Assignment>,
    {
        let mut set = Self::new(event_id);
        for assignment in assignments {
            set.insert_merged(assignment);
        }
        set
    }

    /// Builds a set from the rows returned by `fetch_current`.
    pub fn from_rows(event_id: EventId, rows: &[AssignedStaff]) -> Self {
        Self::from_assignments(event_id, rows.iter().map(AssignedStaff::assignment))
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Inserts one assignment; on an existing staff id the manager flags are
    /// combined with OR.
    fn insert_merged(&mut self, assignment: Assignment) {
        let flag = self.assignments.entry(assignment.staff_id).or_insert(false);
        *flag |= assignment.is_manager;
    }

    /// Removes one staff member; returns whether it was present.
    pub fn remove(&mut self, staff_id: StaffId) -> bool {
        self.assignments.remove(&staff_id).is_some()
    }

    pub fn contains(&self, staff_id: StaffId) -> bool {
        self.assignments.contains_key(&staff_id)
    }

    /// Returns the manager flag of one staff member, if present.
    pub fn is_manager(&self, staff_id: StaffId) -> Option<bool> {
        self.assignments.get(&staff_id).copied()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn has_manager(&self) -> bool {
        self.assignments.values().any(|is_manager| *is_manager)
    }

    pub fn manager_count(&self) -> usize {
        self.assignments.values().filter(|is_manager| **is_manager).count()
    }

    pub fn staff_ids(&self) -> BTreeSet<StaffId> {
        self.assignments.keys().copied().collect()
    }

    /// Iterates assignments in ascending staff id order.
    pub fn iter(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.assignments
            .iter()
            .map(|(staff_id, is_manager)| Assignment::new(*staff_id, *is_manager))
    }

    pub fn to_vec(&self) -> Vec<Assignment> {
        self.iter().collect()
    }
}

/// Current assignment row as served by `GET /events/{eventId}/staffs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedStaff {
    pub staff_id: StaffId,
    pub full_name: String,
    pub email: String,
    pub store_manager: bool,
    #[serde(default)]
    pub roles: BTreeSet<RoleTag>,
}

impl AssignedStaff {
    pub fn from_employee(employee: &Employee, store_manager: bool) -> Self {
        Self {
            staff_id: employee.id,
            full_name: employee.full_name.clone(),
            email: employee.email.clone(),
            store_manager,
            roles: employee.roles.clone(),
        }
    }

    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.staff_id, self.store_manager)
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignment, AssignmentSet};
    use uuid::Uuid;

    #[test]
    fn duplicate_inserts_or_merge_manager_flag() {
        let event_id = Uuid::new_v4();
        let staff = Uuid::new_v4();

        let set = AssignmentSet::from_assignments(
            event_id,
            [Assignment::manager(staff), Assignment::staff(staff)],
        );

        assert_eq!(set.len(), 1);
        assert_eq!(set.is_manager(staff), Some(true));
    }

    #[test]
    fn later_staff_row_never_downgrades_manager() {
        let event_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut set = AssignmentSet::from_assignments(event_id, [Assignment::manager(a)]);
        set.insert_merged(Assignment::staff(a));
        set.insert_merged(Assignment::staff(b));

        assert_eq!(set.len(), 2);
        assert_eq!(set.is_manager(a), Some(true));
        assert_eq!(set.is_manager(b), Some(false));
        assert_eq!(set.manager_count(), 1);
    }

    #[test]
    fn remove_reports_presence() {
        let event_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let mut set = AssignmentSet::from_assignments(event_id, [Assignment::manager(a)]);

        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert!(set.is_empty());
        assert!(!set.has_manager());
    }
}
