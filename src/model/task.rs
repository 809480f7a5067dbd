//! Task types: tracked performance objectives and their managers.

use bigdecimal::BigDecimal;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{Member, MemberId};

pub type TaskId = i64;

/// A tracked performance objective.
///
/// `actual_value` and `achievement` are a cache written when activity is
/// recorded. Read paths recompute both from the activity journal, so the
/// cache may lag behind what a listing shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    /// Category tag, e.g. `"OI"` or `"focus"`.
    pub task_type: String,
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,

    /// Free-form classification, e.g. financial or non-financial.
    pub performance_type: Option<String>,
    pub evaluation: Evaluation,
    pub metric: Option<Metric>,

    /// Zero for qualitative tasks.
    pub target_value: BigDecimal,
    /// Cached aggregate, zero for qualitative tasks.
    pub actual_value: BigDecimal,
    /// Cached achievement percentage, zero for qualitative tasks.
    pub achievement: BigDecimal,

    pub status: TaskStatus,
    pub active: bool,
    pub visible: bool,

    /// Manager links in assignment order, with member rows pre-joined.
    pub managers: Vec<TaskManager>,
}

impl Task {
    #[must_use]
    pub fn is_quantitative(&self) -> bool {
        self.evaluation == Evaluation::Quantitative
    }
}

/// Link between a task and one of its managers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskManager {
    pub member_id: MemberId,

    /// `None` when the member row could not be resolved.
    pub member: Option<Member>,
}

/// How a task is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Evaluation {
    /// Measured against a numeric target.
    Quantitative,

    /// Judged on narrative alone. Target and actual values stay zero.
    Qualitative,
}

impl Evaluation {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quantitative => "quantitative",
            Self::Qualitative => "qualitative",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quantitative" => Some(Self::Quantitative),
            "qualitative" => Some(Self::Qualitative),
            _ => None,
        }
    }
}

/// Unit of a quantitative task, which also decides how periods combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Incremental: each period adds to the total.
    Count,

    /// Incremental: each period adds to the total.
    Amount,

    /// Cumulative state: only the latest reading counts.
    Percent,
}

impl Metric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Amount => "amount",
            Self::Percent => "percent",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "count" => Some(Self::Count),
            "amount" => Some(Self::Amount),
            "percent" => Some(Self::Percent),
            _ => None,
        }
    }
}

/// Where a task stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    InProgress,
    Completed,
    Delayed,
    Halted,
}

impl TaskStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
            Self::Halted => "halted",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            // Legacy rows store the Korean label.
            "inProgress" | "진행중" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "delayed" => Some(Self::Delayed),
            "halted" => Some(Self::Halted),
            _ => None,
        }
    }

    /// Closed tasks no longer collect monthly input.
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::InProgress
    }
}

/// Fields for creating a task. New tasks start in progress with a zero cache.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub task_type: String,
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub performance_type: Option<String>,
    pub evaluation: Evaluation,
    pub metric: Option<Metric>,

    /// Ignored for qualitative tasks.
    pub target_value: Option<BigDecimal>,
    pub visible: bool,
    pub manager_ids: Vec<MemberId>,
}

/// Replacement fields for an existing task.
///
/// The descriptive fields are written as given. The optional ones keep the
/// stored value when `None`; `manager_ids` also keeps the current managers
/// when empty.
#[derive(Debug, Clone)]
pub struct TaskUpdate {
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub performance_type: Option<String>,
    pub evaluation: Evaluation,
    pub metric: Option<Metric>,
    pub target_value: Option<BigDecimal>,
    pub actual_value: Option<BigDecimal>,
    pub status: Option<TaskStatus>,
    pub visible: Option<bool>,
    pub manager_ids: Option<Vec<MemberId>>,
}

impl TaskUpdate {
    /// An update that rewrites `task` as it stands, for callers that
    /// override a few fields.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            category1: task.category1.clone(),
            category2: task.category2.clone(),
            name: task.name.clone(),
            description: task.description.clone(),
            start_date: task.start_date,
            end_date: task.end_date,
            performance_type: task.performance_type.clone(),
            evaluation: task.evaluation,
            metric: task.metric,
            target_value: None,
            actual_value: None,
            status: None,
            visible: None,
            manager_ids: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Delayed,
            TaskStatus::Halted,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TaskStatus::parse("archived"), None);
        assert_eq!(TaskStatus::parse("진행중"), Some(TaskStatus::InProgress));
    }

    #[test]
    fn only_in_progress_is_open() {
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Completed.is_open());
        assert!(!TaskStatus::Delayed.is_open());
        assert!(!TaskStatus::Halted.is_open());
    }

    #[test]
    fn unknown_metric_is_rejected() {
        assert_eq!(Metric::parse("percent"), Some(Metric::Percent));
        assert_eq!(Metric::parse("ratio"), None);
    }
}
