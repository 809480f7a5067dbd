//! Department rows: a flat, self-referential organization table.

use serde::{Deserialize, Serialize};

pub type DepartmentId = i64;

/// One row of the organization table.
///
/// `depth == 0` marks a top-level department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub parent_id: Option<DepartmentId>,
    pub depth: i32,
    pub active: bool,
}
