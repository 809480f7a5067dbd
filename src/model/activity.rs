//! Activity journal: one entry per task per month.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::{MemberId, Period, TaskId};

pub type ActivityId = i64;

/// A task's journal entry for one period.
///
/// At most one entry exists per (task, period); recording again
/// updates it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActivity {
    pub id: ActivityId,
    pub task_id: TaskId,

    /// Who last recorded this entry.
    pub member_id: MemberId,
    pub period: Period,

    /// Free-text narrative for the period.
    pub content: Option<String>,

    /// Reading for the period. Only quantitative tasks carry one.
    pub actual_value: Option<BigDecimal>,
}

impl TaskActivity {
    /// Whether the narrative has any non-whitespace text.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}
