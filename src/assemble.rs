//! Response assembly: one denormalized view per task.
//!
//! Assembly is a pure transformation over rows that were already fetched.
//! Missing auxiliary data never fails a response; it shows up as `None`.

use bigdecimal::BigDecimal;
use jiff::civil::Date;
use serde::Serialize;

use crate::achievement::{self, Basis};
use crate::model::{
    Evaluation, MemberId, Metric, Task, TaskActivity, TaskId, TaskManager, TaskStatus,
};
use crate::org::DepartmentIndex;
use crate::prefetch::Prefetched;

/// A manager as shown alongside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerInfo {
    pub id: MemberId,
    pub name: Option<String>,
    pub position: Option<String>,
    pub department_name: Option<String>,
    pub top_level_department_name: Option<String>,
}

/// Everything a listing, detail, or notification screen shows for a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: TaskId,
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
    pub status: TaskStatus,
    pub visible: bool,
    pub managers: Vec<ManagerInfo>,
    pub target_value: BigDecimal,
    pub actual_value: BigDecimal,

    /// Two-decimal percentage.
    pub achievement: BigDecimal,

    /// Whole percentage.
    pub achievement_percent: i64,
    pub achievement_basis: Basis,
    pub is_input_complete: bool,
}

/// Whether a task has its input for the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Complete,
    Incomplete,
}

impl InputState {
    /// Closed tasks are always complete. An open task is complete only when
    /// its current-period entry exists and has non-blank text.
    #[must_use]
    pub fn of(status: TaskStatus, current: Option<&TaskActivity>) -> Self {
        if !status.is_open() {
            return Self::Complete;
        }
        match current {
            Some(activity) if activity.has_content() => Self::Complete,
            _ => Self::Incomplete,
        }
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

/// Assemble one task.
///
/// `history` is the task's whole journal, most recent period first.
#[must_use]
pub fn assemble(
    task: &Task,
    current: Option<&TaskActivity>,
    history: &[TaskActivity],
    departments: &DepartmentIndex,
) -> TaskResponse {
    let achievement = achievement::aggregate(task, history);
    let managers = task
        .managers
        .iter()
        .map(|m| manager_info(task.id, m, departments))
        .collect();

    TaskResponse {
        id: task.id,
        task_type: task.task_type.clone(),
        category1: task.category1.clone(),
        category2: task.category2.clone(),
        name: task.name.clone(),
        description: task.description.clone(),
        start_date: task.start_date,
        end_date: task.end_date,
        performance_type: task.performance_type.clone(),
        evaluation: task.evaluation,
        metric: task.metric,
        status: task.status,
        visible: task.visible,
        managers,
        target_value: task.target_value.clone(),
        actual_value: achievement.actual_value,
        achievement: achievement.rate,
        achievement_percent: achievement.percent,
        achievement_basis: achievement.basis,
        is_input_complete: InputState::of(task.status, current).is_complete(),
    }
}

/// Assemble every task in a working set, in the order given.
#[must_use]
pub fn assemble_all(tasks: &[Task], prefetched: &Prefetched) -> Vec<TaskResponse> {
    tasks
        .iter()
        .map(|task| {
            assemble(
                task,
                prefetched.current_for(task.id),
                prefetched.history_for(task.id),
                &prefetched.departments,
            )
        })
        .collect()
}

fn manager_info(task_id: TaskId, manager: &TaskManager, departments: &DepartmentIndex) -> ManagerInfo {
    let Some(member) = &manager.member else {
        log::debug!("task {task_id}: manager {} has no member row", manager.member_id);
        return ManagerInfo {
            id: manager.member_id.clone(),
            name: None,
            position: None,
            department_name: None,
            top_level_department_name: None,
        };
    };

    let top_level = member
        .department_name
        .as_deref()
        .and_then(|name| departments.top_level_ancestor_of(name))
        .map(String::from);

    ManagerInfo {
        id: manager.member_id.clone(),
        name: Some(member.name.clone()),
        position: member.position_name.clone(),
        department_name: member.department_name.clone(),
        top_level_department_name: top_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use crate::model::{Department, Member, Period};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn departments() -> DepartmentIndex {
        DepartmentIndex::new(vec![
            Department {
                id: 1,
                name: "Sales".into(),
                parent_id: None,
                depth: 0,
                active: true,
            },
            Department {
                id: 2,
                name: "Sales/East".into(),
                parent_id: Some(1),
                depth: 1,
                active: true,
            },
        ])
    }

    fn member(id: &str, department: Option<&str>) -> Member {
        Member {
            id: id.into(),
            name: format!("Member {id}"),
            department_name: department.map(String::from),
            position_name: Some("Lead".into()),
            active: true,
        }
    }

    fn sample_task(id: TaskId, status: TaskStatus, managers: Vec<TaskManager>) -> Task {
        Task {
            id,
            task_type: "OI".into(),
            category1: Some("Growth".into()),
            category2: None,
            name: format!("Task {id}"),
            description: None,
            start_date: None,
            end_date: None,
            performance_type: None,
            evaluation: Evaluation::Quantitative,
            metric: Some(Metric::Count),
            target_value: dec("3"),
            actual_value: dec("0"),
            achievement: dec("0"),
            status,
            active: true,
            visible: true,
            managers,
        }
    }

    fn entry(task_id: TaskId, content: Option<&str>, value: Option<&str>) -> TaskActivity {
        TaskActivity {
            id: 1,
            task_id,
            member_id: "m1".into(),
            period: Period::new(2025, 3).unwrap(),
            content: content.map(String::from),
            actual_value: value.map(dec),
        }
    }

    #[test]
    fn closed_task_is_complete_without_entry() {
        for status in [TaskStatus::Completed, TaskStatus::Delayed, TaskStatus::Halted] {
            assert_eq!(InputState::of(status, None), InputState::Complete);
        }
    }

    #[test]
    fn open_task_without_entry_is_incomplete() {
        assert_eq!(InputState::of(TaskStatus::InProgress, None), InputState::Incomplete);
    }

    #[test]
    fn whitespace_only_entry_is_incomplete() {
        let blank = entry(1, Some("   "), None);
        assert_eq!(
            InputState::of(TaskStatus::InProgress, Some(&blank)),
            InputState::Incomplete
        );

        let empty = entry(1, None, Some("5"));
        assert_eq!(
            InputState::of(TaskStatus::InProgress, Some(&empty)),
            InputState::Incomplete
        );
    }

    #[test]
    fn written_entry_is_complete() {
        let written = entry(1, Some("Closed two deals"), None);
        assert_eq!(
            InputState::of(TaskStatus::InProgress, Some(&written)),
            InputState::Complete
        );
    }

    #[test]
    fn resolves_manager_top_level_department() {
        let task = sample_task(
            1,
            TaskStatus::InProgress,
            vec![TaskManager {
                member_id: "kim".into(),
                member: Some(member("kim", Some("Sales/East"))),
            }],
        );

        let response = assemble(&task, None, &[], &departments());

        let manager = &response.managers[0];
        assert_eq!(manager.name.as_deref(), Some("Member kim"));
        assert_eq!(manager.position.as_deref(), Some("Lead"));
        assert_eq!(manager.department_name.as_deref(), Some("Sales/East"));
        assert_eq!(manager.top_level_department_name.as_deref(), Some("Sales"));
    }

    #[test]
    fn unresolved_member_keeps_manager_with_empty_fields() {
        let task = sample_task(
            1,
            TaskStatus::InProgress,
            vec![
                TaskManager {
                    member_id: "gone".into(),
                    member: None,
                },
                TaskManager {
                    member_id: "lee".into(),
                    member: Some(member("lee", Some("Disbanded"))),
                },
            ],
        );

        let response = assemble(&task, None, &[], &departments());

        assert_eq!(response.managers.len(), 2);
        assert_eq!(response.managers[0].id, "gone");
        assert_eq!(response.managers[0].name, None);
        assert_eq!(response.managers[0].department_name, None);
        assert_eq!(response.managers[1].department_name.as_deref(), Some("Disbanded"));
        assert_eq!(response.managers[1].top_level_department_name, None);
    }

    #[test]
    fn carries_aggregated_achievement() {
        let task = sample_task(1, TaskStatus::InProgress, vec![]);
        let current = entry(1, Some("Signed one partner"), Some("1"));
        let history = vec![current.clone()];

        let response = assemble(&task, Some(&current), &history, &departments());

        assert_eq!(response.actual_value, dec("1"));
        assert_eq!(response.achievement, dec("33.33"));
        assert_eq!(response.achievement_percent, 33);
        assert_eq!(response.achievement_basis, Basis::Journal);
        assert!(response.is_input_complete);
    }

    #[test]
    fn assembles_working_set_in_order() {
        let manager = TaskManager {
            member_id: "kim".into(),
            member: Some(member("kim", Some("Sales/East"))),
        };
        let tasks = vec![
            sample_task(3, TaskStatus::InProgress, vec![manager.clone()]),
            sample_task(2, TaskStatus::Completed, vec![]),
            sample_task(1, TaskStatus::InProgress, vec![]),
        ];
        let mut prefetched = Prefetched {
            departments: departments(),
            ..Default::default()
        };
        prefetched
            .current
            .insert(1, entry(1, Some("Shipped"), Some("2")));
        prefetched
            .history
            .insert(1, vec![entry(1, Some("Shipped"), Some("2"))]);

        let responses = assemble_all(&tasks, &prefetched);

        let ids: Vec<_> = responses.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(!responses[0].is_input_complete);
        assert!(responses[1].is_input_complete);
        assert!(responses[2].is_input_complete);
        assert_eq!(responses[2].achievement, dec("66.67"));
        assert_eq!(
            responses[0].managers[0].top_level_department_name.as_deref(),
            Some("Sales")
        );
    }

    #[test]
    fn serializes_camel_case() {
        let task = sample_task(1, TaskStatus::InProgress, vec![]);
        let response = assemble(&task, None, &[], &departments());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["isInputComplete"], false);
        assert_eq!(json["status"], "inProgress");
        assert_eq!(json["taskType"], "OI");
    }
}
