//! Assignment service and employee directory contracts.
//!
//! # Responsibility
//! - Define the async contracts the editor talks to.
//! - Keep transport (REST, local SQLite) out of editor logic.
//!
//! # Invariants
//! - `create`/`replace` always receive the complete target set.
//! - Conflict detection happens inside `create`/`replace`; failures carry a
//!   human-readable `ErrorBody`.
//!
//! # See also
//! - `crate::store` for the SQLite-backed implementation.

pub mod http;
pub mod wire;

use crate::model::assignment::{AssignedStaff, AssignmentSet};
use crate::model::employee::Employee;
use crate::model::event::EventId;
use async_trait::async_trait;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use wire::{ErrorBody, Page, PageRequest};

/// Upper bound on directory pages walked by `list_all`.
const MAX_DIRECTORY_PAGES: u32 = 1_000;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by an assignment service or directory call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Transport failure or timeout; no response was received.
    Network(String),
    /// The service answered with a non-success status.
    Rejected { status: u16, body: ErrorBody },
    /// A response arrived but could not be decoded.
    Decode(String),
    /// Local storage failure.
    Store(String),
    /// The call was refused locally before anything was sent.
    InvalidRequest(String),
}

impl ServiceError {
    pub fn rejected(status: u16, body: ErrorBody) -> Self {
        Self::Rejected { status, body }
    }

    /// Returns the server error envelope when there is one.
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Rejected { .. } => "rejected",
            Self::Decode(_) => "decode",
            Self::Store(_) => "store",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Rejected { body, .. } => write!(f, "{body}"),
            Self::Decode(message) => write!(f, "invalid service response: {message}"),
            Self::Store(message) => write!(f, "storage error: {message}"),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
        }
    }
}

impl Error for ServiceError {}

/// Authoritative store of event staffing.
#[async_trait]
pub trait AssignmentService: Send + Sync {
    /// Persists the first assignment set of an event (POST semantics).
    async fn create(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()>;

    /// Replaces the whole assignment set of an event (PUT semantics).
    async fn replace(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()>;

    /// Returns the current assignment rows of an event.
    async fn fetch_current(&self, event_id: EventId) -> ServiceResult<Vec<AssignedStaff>>;
}

/// Read-only paged employee directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn list_page(&self, request: &PageRequest) -> ServiceResult<Page<Employee>>;

    /// Walks pages from `first` until the directory reports the last one.
    async fn list_all(&self, first: &PageRequest) -> ServiceResult<Vec<Employee>> {
        let mut request = first.clone();
        let mut employees = Vec::new();

        for _ in 0..MAX_DIRECTORY_PAGES {
            let page = self.list_page(&request).await?;
            let exhausted = page.last || page.content.is_empty();
            debug!(
                "event=directory_page module=service status=ok page={} items={}",
                request.page,
                page.content.len()
            );
            employees.extend(page.content);
            if exhausted {
                return Ok(employees);
            }
            request = request.next();
        }

        warn!(
            "event=directory_page module=service status=truncated max_pages={MAX_DIRECTORY_PAGES}"
        );
        Ok(employees)
    }
}

#[async_trait]
impl<T: AssignmentService + ?Sized> AssignmentService for Arc<T> {
    async fn create(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        (**self).create(event_id, set).await
    }

    async fn replace(&self, event_id: EventId, set: &AssignmentSet) -> ServiceResult<()> {
        (**self).replace(event_id, set).await
    }

    async fn fetch_current(&self, event_id: EventId) -> ServiceResult<Vec<AssignedStaff>> {
        (**self).fetch_current(event_id).await
    }
}

#[async_trait]
impl<T: EmployeeDirectory + ?Sized> EmployeeDirectory for Arc<T> {
    async fn list_page(&self, request: &PageRequest) -> ServiceResult<Page<Employee>> {
        (**self).list_page(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::wire::{Page, PageRequest, SortDir};
    use super::{EmployeeDirectory, ServiceResult};
    use crate::model::employee::Employee;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct PagedDirectory {
        employees: Vec<Employee>,
    }

    #[async_trait]
    impl EmployeeDirectory for PagedDirectory {
        async fn list_page(&self, request: &PageRequest) -> ServiceResult<Page<Employee>> {
            let size = request.size as usize;
            let start = request.page as usize * size;
            let content: Vec<Employee> =
                self.employees.iter().skip(start).take(size).cloned().collect();
            let total_pages = self.employees.len().div_ceil(size) as u32;
            Ok(Page {
                content,
                page: request.page,
                size: request.size,
                total_elements: self.employees.len() as u64,
                total_pages,
                last: request.page + 1 >= total_pages,
            })
        }
    }

    #[tokio::test]
    async fn list_all_walks_every_page() {
        let employees: Vec<Employee> = (0..7)
            .map(|index| {
                Employee::new(Uuid::new_v4(), format!("staff {index}"), "x@example.com")
            })
            .collect();
        let directory = PagedDirectory {
            employees: employees.clone(),
        };

        let listed = directory
            .list_all(&PageRequest::first(3, "fullName", SortDir::Asc))
            .await
            .unwrap();

        assert_eq!(listed, employees);
    }
}
