//! Domain model for staff-to-event assignment.
//!
//! # Responsibility
//! - Define the records read from the employee directory and event registry.
//! - Define the `AssignmentSet` value type submitted with full-replace
//!   semantics.
//!
//! # Invariants
//! - Employees and events are owned by external collaborators and are never
//!   mutated here.
//! - An `AssignmentSet` holds at most one assignment per staff id.

pub mod assignment;
pub mod employee;
pub mod event;
