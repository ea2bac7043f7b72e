//! Pre-submit validation of assignment sets.
//!
//! # Invariants
//! - Validation is pure and never performs I/O.
//! - A set that passes validation is non-empty and has at least one manager.

use crate::model::assignment::AssignmentSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Local rejection of a submission. Never reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The submission has no staff at all.
    EmptySet,
    /// The submission has staff but none is marked store manager.
    NoManager,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySet => write!(f, "select at least one staff member for the event"),
            Self::NoManager => write!(f, "at least one assigned staff member must be store manager"),
        }
    }
}

impl Error for ValidationError {}

/// Checks both client-side invariants on a full submission.
pub fn validate(set: &AssignmentSet) -> Result<(), ValidationError> {
    if set.is_empty() {
        return Err(ValidationError::EmptySet);
    }
    if !set.has_manager() {
        return Err(ValidationError::NoManager);
    }
    Ok(())
}
