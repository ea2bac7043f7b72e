//! Assignment failure classifier.
//!
//! # Responsibility
//! - Map a failed `create`/`replace` call to `EmptyList`, `TimeConflict` or
//!   `Unknown`.
//!
//! # Invariants
//! - A structured `kind` tag, when present, decides the result on its own.
//! - Without a tag, phrase matching runs over `message` and every `errors`
//!   entry; empty-list phrases are checked before overlap phrases.
//! - `Unknown` keeps the server text verbatim.
//! - Classification never mutates state.

use crate::service::wire::{ErrorBody, ErrorKindTag};
use crate::service::ServiceError;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

static EMPTY_LIST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(must not be empty|cannot be empty|can't be empty|may not be empty|empty (staff |assignment )?list|at least one (staff( member)?|employee) (is required|must be (selected|assigned|provided)\b))",
    )
    .expect("valid empty-list regex")
});

// Wording observed from the backend across its message revisions.
static TIME_CONFLICT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(has another event|another event (at|during) (the same|this) time|time conflict|schedule conflict|scheduling conflict|conflicting (schedule|event)|overlapp?ing|overlaps? with|double[- ]booked|already (assigned|scheduled) (to|for|at) (another|an overlapping))",
    )
    .expect("valid time-conflict regex")
});

/// Outcome category of a failed save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    EmptyList,
    TimeConflict,
    Unknown,
}

/// How the kind was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// Mapped from the structured `kind` tag.
    Tag,
    /// Matched against message text.
    Phrase,
    /// Nothing matched, or the failure had no server body.
    Fallthrough,
}

/// Classified failure ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ConflictKind,
    pub source: ClassificationSource,
    /// Server text for rejected calls, error display text otherwise.
    pub message: String,
}

/// Classifies any service failure.
pub fn classify(error: &ServiceError) -> Classification {
    match error.body() {
        Some(body) => classify_body(body),
        None => Classification {
            kind: ConflictKind::Unknown,
            source: ClassificationSource::Fallthrough,
            message: error.to_string(),
        },
    }
}

/// Classifies one server error envelope.
pub fn classify_body(body: &ErrorBody) -> Classification {
    if let Some(tag) = body.kind {
        return Classification {
            kind: match tag {
                ErrorKindTag::EmptyList => ConflictKind::EmptyList,
                ErrorKindTag::TimeConflict => ConflictKind::TimeConflict,
                ErrorKindTag::Other => ConflictKind::Unknown,
            },
            source: ClassificationSource::Tag,
            message: body.to_string(),
        };
    }

    let kind = classify_text(body);
    match kind {
        ConflictKind::Unknown => Classification {
            kind,
            source: ClassificationSource::Fallthrough,
            message: body.to_string(),
        },
        _ => {
            warn!(
                "event=classify_failure module=assignment status=phrase_match kind={kind:?}"
            );
            Classification {
                kind,
                source: ClassificationSource::Phrase,
                message: body.to_string(),
            }
        }
    }
}

fn classify_text(body: &ErrorBody) -> ConflictKind {
    let texts = || std::iter::once(body.message.as_str()).chain(body.errors.iter().map(String::as_str));

    if texts().any(|text| EMPTY_LIST_RE.is_match(text)) {
        return ConflictKind::EmptyList;
    }
    if texts().any(|text| TIME_CONFLICT_RE.is_match(text)) {
        return ConflictKind::TimeConflict;
    }
    ConflictKind::Unknown
}
