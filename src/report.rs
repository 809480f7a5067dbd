//! Reporting operations: listings, details, and the activity journal.
//!
//! Each operation loads its working set from [`Storage`], batches the
//! auxiliary lookups through [`prefetch`], and assembles responses.

use std::slice;

use bigdecimal::{BigDecimal, RoundingMode};
use serde::Serialize;

use crate::achievement::{achievement_rate, journal_actual};
use crate::assemble::{TaskResponse, assemble, assemble_all};
use crate::model::{
    ActivityId, Department, DepartmentId, Member, MemberId, Period, Task, TaskActivity, TaskId,
    TaskStatus, TaskUpdate,
};
use crate::org::{DepartmentForest, DepartmentIndex, DepartmentNode};
use crate::prefetch::prefetch;
use crate::storage::{Result, Storage, StorageError, TaskFilter};

/// How many earlier periods [`previous_activities`] shows by default.
pub const DEFAULT_PREVIOUS_LIMIT: usize = 3;

/// Who is listing, and which tasks they asked for.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub task_type: Option<String>,

    /// The member asking. Admins and anonymous queries see every task;
    /// anyone else sees only the tasks they manage.
    pub viewer: Option<MemberId>,
}

/// Lists active tasks visible to the query's viewer, newest first.
///
/// # Errors
///
/// Returns an error if a store read fails.
pub fn list_tasks(
    storage: &Storage,
    query: &TaskQuery,
    admin_role: &str,
    period: Period,
) -> Result<Vec<TaskResponse>> {
    let manager_id = match &query.viewer {
        Some(viewer) if storage.role_of(viewer)?.as_deref() != Some(admin_role) => {
            Some(viewer.clone())
        }
        _ => None,
    };
    let tasks = storage.load_tasks(&TaskFilter {
        task_type: query.task_type.clone(),
        manager_id,
    })?;
    let prefetched = prefetch(storage, &tasks, period)?;
    Ok(assemble_all(&tasks, &prefetched))
}

/// One task, assembled for `period`.
///
/// # Errors
///
/// Returns [`StorageError::TaskNotFound`] if no active task has `id`.
pub fn task_detail(storage: &Storage, id: TaskId, period: Period) -> Result<TaskResponse> {
    let task = storage.load_task(id)?;
    let prefetched = prefetch(storage, slice::from_ref(&task), period)?;
    Ok(assemble(
        &task,
        prefetched.current_for(id),
        prefetched.history_for(id),
        &prefetched.departments,
    ))
}

/// In-progress tasks still missing their input for `period`.
///
/// # Errors
///
/// Returns an error if a store read fails.
pub fn pending_input(
    storage: &Storage,
    task_type: Option<&str>,
    period: Period,
) -> Result<Vec<TaskResponse>> {
    let tasks: Vec<Task> = storage
        .load_tasks(&TaskFilter {
            task_type: task_type.map(String::from),
            manager_id: None,
        })?
        .into_iter()
        .filter(|t| t.status.is_open())
        .collect();
    let prefetched = prefetch(storage, &tasks, period)?;
    let mut responses = assemble_all(&tasks, &prefetched);
    responses.retain(|r| !r.is_input_complete);
    Ok(responses)
}

/// Applies `update` to a task and returns it assembled for `period`.
///
/// Managers are replaced only when `update.manager_ids` is a non-empty list
/// that differs from the current set.
///
/// # Errors
///
/// Returns [`StorageError::TaskNotFound`] if no active task has `id`.
pub fn update_task(
    storage: &Storage,
    id: TaskId,
    update: &TaskUpdate,
    period: Period,
) -> Result<TaskResponse> {
    storage.update_task(id, update)?;
    if let Some(manager_ids) = &update.manager_ids
        && !manager_ids.is_empty()
    {
        storage.replace_managers(id, manager_ids)?;
    }
    task_detail(storage, id, period)
}

/// One monthly journal submission.
#[derive(Debug, Clone, Default)]
pub struct ActivityInput {
    /// Defaults to the current period.
    pub period: Option<Period>,
    pub content: Option<String>,

    /// Dropped for qualitative tasks.
    pub actual_value: Option<BigDecimal>,

    /// Applied only when recording the current period.
    pub status: Option<TaskStatus>,
}

/// A task's journal entry for one period, with the values shown beside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    /// `None` when nothing was recorded for the period.
    pub activity_id: Option<ActivityId>,
    pub task_id: TaskId,
    pub task_name: String,
    pub member_id: Option<MemberId>,
    pub period: Period,
    pub content: Option<String>,
    pub target_value: BigDecimal,
    pub actual_value: BigDecimal,
    pub achievement: BigDecimal,
}

/// Records `member_id`'s entry for a task and returns the resulting view.
///
/// Recording for the current period also applies the status change and
/// refreshes the task's cached actual value and achievement from the
/// whole journal. Entries for other periods touch only the journal.
///
/// # Errors
///
/// Returns [`StorageError::TaskNotFound`] if no active task has `task_id`.
pub fn record_activity(
    storage: &Storage,
    task_id: TaskId,
    member_id: &str,
    input: &ActivityInput,
    now: Period,
) -> Result<ActivityView> {
    let task = storage.load_task(task_id)?;
    let period = input.period.unwrap_or(now);
    let value = if task.is_quantitative() {
        input.actual_value.as_ref()
    } else {
        if input.actual_value.is_some() {
            log::debug!("task {task_id} is qualitative; ignoring actual value");
        }
        None
    };

    let activity =
        storage.upsert_activity(task_id, member_id, period, input.content.as_deref(), value)?;

    if period == now {
        let status = input.status.unwrap_or(task.status);
        let cache = if task.is_quantitative() {
            let history = storage.load_activity_history(slice::from_ref(&task_id))?;
            journal_actual(task.metric, &history).map(|actual| {
                let rate = achievement_rate(&actual, &task.target_value);
                (actual, rate)
            })
        } else {
            None
        };
        storage.write_back_achievement(
            task_id,
            status,
            cache.as_ref().map(|(actual, rate)| (actual, rate)),
        )?;
    } else if input.status.is_some() {
        log::debug!("task {task_id}: status change ignored for past period {period}");
    }

    Ok(view_of(&task, period, Some(&activity)))
}

/// The task's entry for `period`, or an empty view when none exists.
///
/// # Errors
///
/// Returns [`StorageError::TaskNotFound`] if no active task has `task_id`.
pub fn activity_view(storage: &Storage, task_id: TaskId, period: Period) -> Result<ActivityView> {
    let task = storage.load_task(task_id)?;
    let activity = storage.load_activity(task_id, period)?;
    Ok(view_of(&task, period, activity.as_ref()))
}

/// Up to `limit` entries recorded before `period`, most recent first.
///
/// # Errors
///
/// Returns [`StorageError::TaskNotFound`] if no active task has `task_id`.
pub fn previous_activities(
    storage: &Storage,
    task_id: TaskId,
    period: Period,
    limit: usize,
) -> Result<Vec<ActivityView>> {
    let task = storage.load_task(task_id)?;
    Ok(storage
        .activities_before(task_id, period, limit)?
        .iter()
        .map(|a| view_of(&task, a.period, Some(a)))
        .collect())
}

/// One point on a task's monthly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyActual {
    pub year: i16,
    pub month: i8,
    pub actual_value: BigDecimal,
}

/// The task's recorded readings in `year`, January first.
///
/// # Errors
///
/// Returns [`StorageError::TaskNotFound`] if no active task has `task_id`.
pub fn monthly_actuals(storage: &Storage, task_id: TaskId, year: i16) -> Result<Vec<MonthlyActual>> {
    storage.load_task(task_id)?;
    Ok(storage
        .activities_in_year(task_id, year)?
        .into_iter()
        .filter_map(|a| {
            a.actual_value.map(|actual_value| MonthlyActual {
                year: a.period.year(),
                month: a.period.month(),
                actual_value,
            })
        })
        .collect())
}

/// The whole department hierarchy.
///
/// # Errors
///
/// Returns an error if the department table can't be read.
pub fn department_forest(storage: &Storage) -> Result<Vec<DepartmentNode>> {
    Ok(DepartmentForest::build(storage.load_departments()?).roots())
}

/// One department with its descendants.
///
/// # Errors
///
/// Returns [`StorageError::DepartmentNotFound`] if `id` is not in the
/// table or hangs off an orphaned branch.
pub fn department_subtree(storage: &Storage, id: DepartmentId) -> Result<DepartmentNode> {
    DepartmentForest::build(storage.load_departments()?)
        .subtree(id)
        .ok_or(StorageError::DepartmentNotFound(id))
}

/// Active departments in table order.
///
/// # Errors
///
/// Returns an error if the department table can't be read.
pub fn active_departments(storage: &Storage) -> Result<Vec<Department>> {
    let index = DepartmentIndex::new(storage.load_departments()?);
    Ok(index.active().cloned().collect())
}

/// Active members of one department, by name.
///
/// Members are matched on the department's name, so members of its
/// sub-departments are not included.
///
/// # Errors
///
/// Returns [`StorageError::DepartmentNotFound`] if `id` is not in the table.
pub fn department_members(storage: &Storage, id: DepartmentId) -> Result<Vec<Member>> {
    let index = DepartmentIndex::new(storage.load_departments()?);
    let department = index.get(id).ok_or(StorageError::DepartmentNotFound(id))?;
    storage.load_members(&department.name)
}

/// Adds or replaces a department, deriving its depth from the parent.
///
/// # Errors
///
/// Returns [`StorageError::DepartmentNotFound`] if `parent_id` is not in
/// the table.
pub fn add_department(
    storage: &Storage,
    id: DepartmentId,
    name: &str,
    parent_id: Option<DepartmentId>,
    active: bool,
) -> Result<Department> {
    let depth = match parent_id {
        Some(parent_id) => {
            let index = DepartmentIndex::new(storage.load_departments()?);
            let parent = index
                .get(parent_id)
                .ok_or(StorageError::DepartmentNotFound(parent_id))?;
            parent.depth + 1
        }
        None => 0,
    };
    let department = Department {
        id,
        name: name.to_string(),
        parent_id,
        depth,
        active,
    };
    storage.insert_department(&department)?;
    Ok(department)
}

/// The period's own reading and its rate against the target.
/// Without a reading the task's cached values stand in.
fn view_of(task: &Task, period: Period, activity: Option<&TaskActivity>) -> ActivityView {
    let reading = activity
        .and_then(|a| a.actual_value.as_ref())
        .filter(|_| task.is_quantitative());
    let (actual_value, achievement) = match reading {
        Some(actual) => (actual.clone(), achievement_rate(actual, &task.target_value)),
        None => (
            task.actual_value.clone(),
            task.achievement.with_scale_round(2, RoundingMode::HalfUp),
        ),
    };

    ActivityView {
        activity_id: activity.map(|a| a.id),
        task_id: task.id,
        task_name: task.name.clone(),
        member_id: activity.map(|a| a.member_id.clone()),
        period,
        content: activity.and_then(|a| a.content.clone()),
        target_value: task.target_value.clone(),
        actual_value,
        achievement,
    }
}
