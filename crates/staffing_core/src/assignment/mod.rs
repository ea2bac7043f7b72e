//! Client-side assignment logic.
//!
//! # Responsibility
//! - Merge existing and newly selected staff into one canonical set.
//! - Reject invalid submissions before any network round-trip.
//! - Interpret assignment service failures into error kinds.

pub mod builder;
pub mod classifier;
pub mod validator;
