//! Core logic for staff-to-event assignment.
//! This crate owns the assignment invariants: no double-booking across
//! overlapping events, and at least one store manager per staffed event.

pub mod assignment;
pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use assignment::builder::{AssignmentDraft, BuilderError, DraftEntry, Origin};
pub use assignment::classifier::{classify, Classification, ClassificationSource, ConflictKind};
pub use assignment::validator::{validate, ValidationError};
pub use config::{ConfigError, StaffingConfig};
pub use editor::{
    AssignmentEditor, EditorError, EditorNotice, EditorState, LoadReport, NoticeKind, SaveMode,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::assignment::{AssignedStaff, Assignment, AssignmentSet};
pub use model::employee::{Employee, RoleTag, StaffId};
pub use model::event::{Event, EventId};
pub use service::http::HttpStaffingClient;
pub use service::wire::{ErrorBody, ErrorKindTag, Page, PageRequest, SortDir};
pub use service::{AssignmentService, EmployeeDirectory, ServiceError, ServiceResult};
pub use store::LocalStaffingStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
