//! Event staffing persistence.
//!
//! # Responsibility
//! - Read the current staff rows of one event.
//! - Find overlapping assignments of the same staff on other events.
//! - Replace the whole staff set of one event atomically.
//!
//! # Invariants
//! - `replace_event_staff` deletes and re-inserts inside one transaction; an
//!   error leaves the previous rows in place.
//! - Overlap uses half-open windows: back-to-back events never conflict.

use crate::model::assignment::{AssignedStaff, AssignmentSet};
use crate::model::employee::StaffId;
use crate::model::event::{Event, EventId};
use crate::repo::employee_repo::load_roles;
use crate::repo::event_repo::parse_event;
use crate::repo::{bool_to_int, parse_flag, parse_uuid, RepoResult};
use rusqlite::{params, Connection};

/// Existing assignment that collides with a proposed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConflict {
    pub staff_id: StaffId,
    pub full_name: String,
    pub other_event: Event,
}

pub trait AssignmentRepository {
    fn list_event_staff(&self, event_id: EventId) -> RepoResult<Vec<AssignedStaff>>;
    fn find_conflicts(&self, event: &Event, staff_ids: &[StaffId]) -> RepoResult<Vec<ScheduleConflict>>;
    fn replace_event_staff(&self, set: &AssignmentSet) -> RepoResult<()>;
}

pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssignmentRepository for SqliteAssignmentRepository<'_> {
    fn list_event_staff(&self, event_id: EventId) -> RepoResult<Vec<AssignedStaff>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.uuid, e.full_name, e.email, es.store_manager
             FROM event_staff es
             JOIN employees e ON e.uuid = es.staff_uuid
             WHERE es.event_uuid = ?1
             ORDER BY e.full_name COLLATE NOCASE ASC, e.uuid ASC;",
        )?;
        let mut rows = stmt.query([event_id.to_string()])?;

        let mut staff = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            staff.push(AssignedStaff {
                staff_id: parse_uuid(&uuid, "event_staff.staff_uuid")?,
                full_name: row.get(1)?,
                email: row.get(2)?,
                store_manager: parse_flag(row.get(3)?, "event_staff.store_manager")?,
                roles: load_roles(self.conn, &uuid)?,
            });
        }
        Ok(staff)
    }

    fn find_conflicts(&self, event: &Event, staff_ids: &[StaffId]) -> RepoResult<Vec<ScheduleConflict>> {
        let mut stmt = self.conn.prepare(
            "SELECT emp.full_name, other.uuid, other.start_ms, other.end_ms
             FROM event_staff es
             JOIN events other ON other.uuid = es.event_uuid
             JOIN employees emp ON emp.uuid = es.staff_uuid
             WHERE es.staff_uuid = ?1
               AND other.uuid <> ?2
               AND other.start_ms < ?4
               AND ?3 < other.end_ms
             ORDER BY other.start_ms ASC, other.uuid ASC;",
        )?;

        let mut conflicts = Vec::new();
        for staff_id in staff_ids {
            let mut rows = stmt.query(params![
                staff_id.to_string(),
                event.id.to_string(),
                event.start_ms,
                event.end_ms,
            ])?;
            while let Some(row) = rows.next()? {
                conflicts.push(ScheduleConflict {
                    staff_id: *staff_id,
                    full_name: row.get(0)?,
                    other_event: parse_event((row.get(1)?, row.get(2)?, row.get(3)?))?,
                });
            }
        }
        Ok(conflicts)
    }

    fn replace_event_staff(&self, set: &AssignmentSet) -> RepoResult<()> {
        let event_uuid = set.event_id().to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM event_staff WHERE event_uuid = ?1;", [&event_uuid])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO event_staff (event_uuid, staff_uuid, store_manager)
                 VALUES (?1, ?2, ?3);",
            )?;
            for assignment in set.iter() {
                insert.execute(params![
                    event_uuid,
                    assignment.staff_id.to_string(),
                    bool_to_int(assignment.is_manager),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
