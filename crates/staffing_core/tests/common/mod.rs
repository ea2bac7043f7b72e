#![allow(dead_code)]

use async_trait::async_trait;
use staffing_core::{
    AssignedStaff, AssignmentService, AssignmentSet, Employee, EmployeeDirectory, ErrorBody, Event,
    EventId, LocalStaffingStore, Page, PageRequest, ServiceError, ServiceResult, SortDir, StaffId,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const HOUR_MS: i64 = 3_600_000;
/// 2026-03-02T00:00:00Z
pub const DAY_START_MS: i64 = 1_772_409_600_000;

pub fn at(hour: i64) -> i64 {
    DAY_START_MS + hour * HOUR_MS
}

pub fn first_page() -> PageRequest {
    PageRequest::first(2, "fullName", SortDir::Asc)
}

/// Seeded local store with a handful of employees.
pub struct Fixture {
    pub store: Arc<LocalStaffingStore>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            store: Arc::new(LocalStaffingStore::in_memory().unwrap()),
        }
    }

    pub fn employee(&self, name: &str, roles: &[&str]) -> StaffId {
        let id = Uuid::new_v4();
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        let employee = Employee::new(id, name, email).with_roles(roles.iter().copied());
        self.store.upsert_employee(&employee).unwrap();
        id
    }

    pub fn event(&self, start_hour: i64, end_hour: i64) -> EventId {
        let id = Uuid::new_v4();
        self.store
            .upsert_event(&Event::new(id, at(start_hour), at(end_hour)))
            .unwrap();
        id
    }
}

/// Assignment service wrapper that counts calls and injects failures.
pub struct InstrumentedService {
    pub inner: Arc<LocalStaffingStore>,
    pub writes: AtomicUsize,
    pub fetches: AtomicUsize,
    pub fail_fetch: AtomicBool,
    pub fail_fetch_after_write: AtomicBool,
    pub reject_with: Mutex<Option<ErrorBody>>,
}

impl InstrumentedService {
    pub fn new(inner: Arc<LocalStaffingStore>) -> Self {
        Self {
            inner,
            writes: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_fetch_after_write: AtomicBool::new(false),
            reject_with: Mutex::new(None),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reject_next_writes(&self, body: ErrorBody) {
        *self.reject_with.lock().unwrap() = Some(body);
    }

    fn before_write(&self) -> ServiceResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        match self.reject_with.lock().unwrap().clone() {
            Some(body) => Err(ServiceError::rejected(409, body)),
            None => Ok(()),
        }
    }

    fn after_write(&self) {
        if self.fail_fetch_after_write.load(Ordering::SeqCst) {
            self.fail_fetch.store(true, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl AssignmentService for InstrumentedService {
    async fn create(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        self.before_write()?;
        self.inner.create(event_id, set).await?;
        self.after_write();
        Ok(())
    }

    async fn replace(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        self.before_write()?;
        self.inner.replace(event_id, set).await?;
        self.after_write();
        Ok(())
    }

    async fn fetch_current(&self, event_id: EventId) -> ServiceResult<Vec<AssignedStaff>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ServiceError::Network("connection reset".to_string()));
        }
        self.inner.fetch_current(event_id).await
    }
}

/// Directory that is always unreachable.
pub struct UnreachableDirectory;

#[async_trait]
impl EmployeeDirectory for UnreachableDirectory {
    async fn list_page(&self, _request: &PageRequest) -> ServiceResult<Page<Employee>> {
        Err(ServiceError::Network("timed out".to_string()))
    }
}
