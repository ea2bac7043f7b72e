//! Employee directory records.
//!
//! # Responsibility
//! - Mirror the read-only employee shape served by the directory.
//! - Expose manager-eligibility as a display hint.
//!
//! # Invariants
//! - Role tags are stored upper-case and trimmed.
//! - Manager eligibility is advisory; assignment code never enforces it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an employee.
pub type StaffId = Uuid;

const MANAGER_ELIGIBLE_ROLES: &[&str] = &["STORE_MANAGER", "MANAGER", "ADMIN"];

/// Opaque role tag attached to an employee by the directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoleTag(String);

impl RoleTag {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this role usually qualifies someone as store manager.
    pub fn grants_manager_eligibility(&self) -> bool {
        MANAGER_ELIGIBLE_ROLES.contains(&self.0.as_str())
    }
}

impl From<String> for RoleTag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<RoleTag> for String {
    fn from(value: RoleTag) -> Self {
        value.0
    }
}

impl Display for RoleTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Employee record as served by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: StaffId,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub roles: BTreeSet<RoleTag>,
}

impl Employee {
    pub fn new(id: StaffId, full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            email: email.into(),
            roles: BTreeSet::new(),
        }
    }

    /// Builder-style helper for attaching roles.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.roles.extend(roles.into_iter().map(RoleTag::new));
        self
    }

    /// Returns whether any role hints at store-manager eligibility.
    pub fn is_manager_eligible(&self) -> bool {
        self.roles.iter().any(RoleTag::grants_manager_eligibility)
    }
}
