//! JSON wire contract of the assignment service and employee directory.
//!
//! # Responsibility
//! - Define request/response bodies exchanged over REST.
//! - Keep camelCase field naming local to this module.
//!
//! # Invariants
//! - `staffAssignments` always carries the full target set.
//! - Error bodies may omit `errors` and `kind`; both default to empty.

use crate::model::assignment::{Assignment, AssignmentSet};
use crate::model::event::EventId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Body of `POST /events/staffs` and `PUT /events/{eventId}/staffs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub event_id: EventId,
    pub staff_assignments: Vec<Assignment>,
}

impl AssignmentRequest {
    pub fn from_set(set: &AssignmentSet) -> Self {
        Self {
            event_id: set.event_id(),
            staff_assignments: set.to_vec(),
        }
    }

    pub fn into_set(self) -> AssignmentSet {
        AssignmentSet::from_assignments(self.event_id, self.staff_assignments)
    }
}

/// Structured failure tag. Servers that predate it send only `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKindTag {
    EmptyList,
    TimeConflict,
    #[serde(other)]
    Other,
}

/// Error envelope returned on non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKindTag>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: Vec::new(),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ErrorKindTag) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = errors;
        self
    }
}

impl Display for ErrorBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} ({})", self.message, self.errors.join("; "))
        }
    }
}

/// Sort direction for directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Query of `GET /employees?page&size&sortBy&sortDir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_dir: SortDir,
}

impl PageRequest {
    pub fn first(size: u32, sort_by: impl Into<String>, sort_dir: SortDir) -> Self {
        Self {
            page: 0,
            size,
            sort_by: sort_by.into(),
            sort_dir,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }

    /// Query pairs in the order the directory expects them.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortDir", self.sort_dir.as_str().to_string()),
        ]
    }
}

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub last: bool,
}
