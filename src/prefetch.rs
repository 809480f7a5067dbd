//! Batched lookups for a working set of tasks.
//!
//! Listing N tasks needs each task's current-period activity, its full
//! activity history, and the department table. All three are fetched in
//! bulk, keyed by the whole set of task ids, so the number of store calls
//! is fixed no matter how many tasks are listed. Manager and member rows
//! arrive already joined onto each task and are not fetched again.

use std::collections::HashMap;

use crate::model::{Department, Period, Task, TaskActivity, TaskId};
use crate::org::DepartmentIndex;

/// The bulk reads the coordinator needs from persistence.
pub trait RowStore {
    type Error;

    /// The whole department table.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails.
    fn departments(&self) -> Result<Vec<Department>, Self::Error>;

    /// Activity rows for any of `task_ids` in exactly `period`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails.
    fn activities_in_period(
        &self,
        task_ids: &[TaskId],
        period: Period,
    ) -> Result<Vec<TaskActivity>, Self::Error>;

    /// Every activity row for any of `task_ids`.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails.
    fn activity_history(&self, task_ids: &[TaskId]) -> Result<Vec<TaskActivity>, Self::Error>;
}

/// Auxiliary rows for one working set, keyed for constant-time assembly.
#[derive(Debug, Default)]
pub struct Prefetched {
    /// Current-period entry per task, when one exists.
    pub current: HashMap<TaskId, TaskActivity>,

    /// Full journal per task, most recent period first.
    pub history: HashMap<TaskId, Vec<TaskActivity>>,

    /// The department table, loaded once.
    pub departments: DepartmentIndex,
}

impl Prefetched {
    #[must_use]
    pub fn current_for(&self, task_id: TaskId) -> Option<&TaskActivity> {
        self.current.get(&task_id)
    }

    /// Empty when the task has no journal.
    #[must_use]
    pub fn history_for(&self, task_id: TaskId) -> &[TaskActivity] {
        self.history
            .get(&task_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Fetch everything needed to assemble `tasks` for `period`.
///
/// Issues exactly three store calls for a non-empty working set and none
/// for an empty one.
///
/// # Errors
///
/// Returns the first store error; nothing is partially returned.
pub fn prefetch<S>(store: &S, tasks: &[Task], period: Period) -> Result<Prefetched, S::Error>
where
    S: RowStore + ?Sized,
{
    if tasks.is_empty() {
        return Ok(Prefetched::default());
    }

    let mut task_ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
    task_ids.sort_unstable();
    task_ids.dedup();

    let mut current = HashMap::with_capacity(task_ids.len());
    for activity in store.activities_in_period(&task_ids, period)? {
        if current.contains_key(&activity.task_id) {
            log::warn!(
                "task {} has more than one entry for {period}; keeping the first",
                activity.task_id
            );
            continue;
        }
        current.insert(activity.task_id, activity);
    }

    let mut history: HashMap<TaskId, Vec<TaskActivity>> = HashMap::with_capacity(task_ids.len());
    for activity in store.activity_history(&task_ids)? {
        history.entry(activity.task_id).or_default().push(activity);
    }
    for rows in history.values_mut() {
        rows.sort_by(|a, b| b.period.cmp(&a.period));
    }

    let departments = DepartmentIndex::new(store.departments()?);

    log::debug!(
        "prefetched {} task(s): {} current entries, {} journals, {} departments",
        task_ids.len(),
        current.len(),
        history.len(),
        departments.len()
    );

    Ok(Prefetched {
        current,
        history,
        departments,
    })
}
