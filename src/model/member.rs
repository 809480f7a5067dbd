//! Member rows: people who can manage tasks.

use serde::{Deserialize, Serialize};

pub type MemberId = String;

/// A person in the organization.
///
/// `department_name` is denormalized: it matches `Department::name`,
/// not an id, and may name a department that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub department_name: Option<String>,
    pub position_name: Option<String>,
    pub active: bool,
}
