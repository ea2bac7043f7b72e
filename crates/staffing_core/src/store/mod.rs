//! SQLite-backed authoritative staffing store.
//!
//! # Responsibility
//! - Implement `AssignmentService` and `EmployeeDirectory` over the local
//!   database for offline runs and integration tests.
//! - Enforce non-empty submissions and the no-double-booking rule the same
//!   way the remote backend does, answering with `ErrorBody` failures.
//!
//! # Invariants
//! - Every check and write of one call runs under the same connection lock.
//! - A rejected `create`/`replace` leaves stored rows untouched.
//! - Rejections carry both a human-readable message and a `kind` tag.
//! - The store-manager rule is not checked here; editors validate it before
//!   sending.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::assignment::{AssignedStaff, AssignmentSet};
use crate::model::employee::Employee;
use crate::model::event::{Event, EventId};
use crate::repo::assignment_repo::{AssignmentRepository, ScheduleConflict, SqliteAssignmentRepository};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::event_repo::{EventRepository, SqliteEventRepository};
use crate::repo::RepoError;
use crate::service::wire::{ErrorBody, ErrorKindTag, Page, PageRequest};
use crate::service::{AssignmentService, EmployeeDirectory, ServiceError, ServiceResult};
use async_trait::async_trait;
use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const STATUS_BAD_REQUEST: u16 = 400;
const STATUS_NOT_FOUND: u16 = 404;
const STATUS_CONFLICT: u16 = 409;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Create,
    Replace,
}

impl WriteMode {
    fn event_name(self) -> &'static str {
        match self {
            Self::Create => "assignment_create",
            Self::Replace => "assignment_replace",
        }
    }
}

/// Local staffing store over one SQLite connection.
pub struct LocalStaffingStore {
    conn: Mutex<Connection>,
}

impl LocalStaffingStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a fresh in-memory database.
    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Inserts or updates one event window.
    pub fn upsert_event(&self, event: &Event) -> ServiceResult<()> {
        let conn = self.lock()?;
        SqliteEventRepository::new(&conn)
            .upsert_event(event)
            .map_err(store_error)
    }

    /// Inserts or updates one employee with its full role set.
    pub fn upsert_employee(&self, employee: &Employee) -> ServiceResult<()> {
        let conn = self.lock()?;
        SqliteEmployeeRepository::new(&conn)
            .upsert_employee(employee)
            .map_err(store_error)
    }

    pub fn event(&self, event_id: EventId) -> ServiceResult<Option<Event>> {
        let conn = self.lock()?;
        SqliteEventRepository::new(&conn)
            .get_event(event_id)
            .map_err(store_error)
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ServiceError::Store("staffing store lock poisoned".to_string()))
    }

    fn write(&self, mode: WriteMode, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        if set.event_id() != event_id {
            return Err(ServiceError::rejected(
                STATUS_BAD_REQUEST,
                ErrorBody::new(format!(
                    "eventId mismatch: path {event_id}, body {}",
                    set.event_id()
                ))
                .with_kind(ErrorKindTag::Other),
            ));
        }
        if set.is_empty() {
            return Err(ServiceError::rejected(
                STATUS_BAD_REQUEST,
                ErrorBody::new("Staff assignment list must not be empty")
                    .with_kind(ErrorKindTag::EmptyList),
            ));
        }

        let conn = self.lock()?;
        let events = SqliteEventRepository::new(&conn);
        let employees = SqliteEmployeeRepository::new(&conn);
        let assignments = SqliteAssignmentRepository::new(&conn);

        let event = events
            .get_event(event_id)
            .map_err(store_error)?
            .ok_or_else(|| not_found("event", event_id))?;

        if mode == WriteMode::Create
            && !assignments
                .list_event_staff(event_id)
                .map_err(store_error)?
                .is_empty()
        {
            return Err(ServiceError::rejected(
                STATUS_CONFLICT,
                ErrorBody::new(format!(
                    "Staff assignments already exist for event {event_id}; replace them instead"
                ))
                .with_kind(ErrorKindTag::Other),
            ));
        }

        for staff_id in set.staff_ids() {
            if employees.get_employee(staff_id).map_err(store_error)?.is_none() {
                return Err(not_found("employee", staff_id));
            }
        }
        let staff_ids: Vec<_> = set.staff_ids().into_iter().collect();
        let conflicts = assignments
            .find_conflicts(&event, &staff_ids)
            .map_err(store_error)?;
        if !conflicts.is_empty() {
            warn!(
                "event={} module=store status=conflict event_id={event_id} conflict_count={}",
                mode.event_name(),
                conflicts.len()
            );
            return Err(ServiceError::rejected(STATUS_CONFLICT, conflict_body(&conflicts)));
        }

        assignments.replace_event_staff(set).map_err(store_error)?;
        info!(
            "event={} module=store status=ok event_id={event_id} staff_count={} manager_count={}",
            mode.event_name(),
            set.len(),
            set.manager_count()
        );
        Ok(())
    }
}

#[async_trait]
impl AssignmentService for LocalStaffingStore {
    async fn create(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        self.write(WriteMode::Create, event_id, set)
    }

    async fn replace(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        self.write(WriteMode::Replace, event_id, set)
    }

    async fn fetch_current(&self, event_id: EventId) -> ServiceResult<Vec<AssignedStaff>> {
        let conn = self.lock()?;
        if SqliteEventRepository::new(&conn)
            .get_event(event_id)
            .map_err(store_error)?
            .is_none()
        {
            return Err(not_found("event", event_id));
        }
        SqliteAssignmentRepository::new(&conn)
            .list_event_staff(event_id)
            .map_err(store_error)
    }
}

#[async_trait]
impl EmployeeDirectory for LocalStaffingStore {
    async fn list_page(&self, request: &PageRequest) -> ServiceResult<Page<Employee>> {
        if request.size == 0 {
            return Err(ServiceError::rejected(
                STATUS_BAD_REQUEST,
                ErrorBody::new("page size must be positive").with_kind(ErrorKindTag::Other),
            ));
        }
        let conn = self.lock()?;
        let (content, total_elements) = SqliteEmployeeRepository::new(&conn)
            .list_employees(request)
            .map_err(|err| match err {
                RepoError::InvalidQuery(message) => ServiceError::rejected(
                    STATUS_BAD_REQUEST,
                    ErrorBody::new(message).with_kind(ErrorKindTag::Other),
                ),
                other => store_error(other),
            })?;
        let total_pages =
            u32::try_from(total_elements.div_ceil(u64::from(request.size))).unwrap_or(u32::MAX);
        Ok(Page {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            last: request.page.saturating_add(1) >= total_pages,
        })
    }
}

fn conflict_body(conflicts: &[ScheduleConflict]) -> ErrorBody {
    let errors = conflicts
        .iter()
        .map(|conflict| {
            format!(
                "Employee {} has another event at an overlapping time (event {})",
                conflict.full_name, conflict.other_event.id
            )
        })
        .collect::<Vec<_>>();
    let message = match conflicts {
        [single] => format!(
            "Time conflict: employee {} has another event at an overlapping time",
            single.full_name
        ),
        _ => format!(
            "Time conflict: {} assignments overlap with other events",
            conflicts.len()
        ),
    };
    ErrorBody::new(message)
        .with_errors(errors)
        .with_kind(ErrorKindTag::TimeConflict)
}

fn not_found(entity: &'static str, id: uuid::Uuid) -> ServiceError {
    ServiceError::rejected(
        STATUS_NOT_FOUND,
        ErrorBody::new(RepoError::NotFound { entity, id }.to_string()).with_kind(ErrorKindTag::Other),
    )
}

fn store_error(err: RepoError) -> ServiceError {
    ServiceError::Store(err.to_string())
}
