//! Task storage: tasks with their managers pre-joined.
//!
//! A listing loads task rows in one query and every manager link for those
//! tasks, joined to member rows, in a second. Two queries regardless of how
//! many tasks match.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use bigdecimal::BigDecimal;
use rusqlite::types::Value;

use crate::achievement::achievement_rate;
use crate::model::{
    Evaluation, Member, MemberId, Metric, NewTask, Task, TaskId, TaskManager, TaskStatus,
    TaskUpdate,
};

use super::{Result, Storage, StorageError, id_array, parse_decimal};

/// Which active tasks to load. Empty filter loads them all.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub task_type: Option<String>,

    /// Only tasks this member manages.
    pub manager_id: Option<MemberId>,
}

const TASK_COLUMNS: &str = "t.id, t.task_type, t.category1, t.category2, t.name, t.description, \
     t.start_date, t.end_date, t.performance_type, t.evaluation, t.metric, \
     t.target_value, t.actual_value, t.achievement, t.status, t.active, t.visible";

impl Storage {
    /// Creates a task with its manager links. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. Nothing is stored in that case.
    pub fn insert_task(&self, task: &NewTask) -> Result<TaskId> {
        let target = match task.evaluation {
            Evaluation::Quantitative => task.target_value.clone().unwrap_or_default(),
            Evaluation::Qualitative => BigDecimal::from(0),
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (task_type, category1, category2, name, description,
                start_date, end_date, performance_type, evaluation, metric,
                target_value, visible)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                &task.task_type,
                &task.category1,
                &task.category2,
                &task.name,
                &task.description,
                task.start_date.map(|d| d.to_string()),
                task.end_date.map(|d| d.to_string()),
                &task.performance_type,
                task.evaluation.as_str(),
                task.metric.map(Metric::as_str),
                target.to_string(),
                task.visible,
            ],
        )?;
        let id = tx.last_insert_rowid();
        for member_id in &task.manager_ids {
            tx.execute(
                "INSERT INTO task_managers (task_id, member_id) VALUES (?1, ?2)",
                rusqlite::params![id, member_id],
            )?;
        }
        tx.commit()?;
        Ok(id)
    }

    /// Loads active tasks matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a row is corrupt.
    pub fn load_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.active = 1");
        let mut params: Vec<Value> = Vec::new();
        if let Some(task_type) = &filter.task_type {
            params.push(Value::Text(task_type.clone()));
            let _ = write!(sql, " AND t.task_type = ?{}", params.len());
        }
        if let Some(manager_id) = &filter.manager_id {
            params.push(Value::Text(manager_id.clone()));
            let _ = write!(
                sql,
                " AND EXISTS (SELECT 1 FROM task_managers tm
                    WHERE tm.task_id = t.id AND tm.member_id = ?{})",
                params.len()
            );
        }
        sql.push_str(" ORDER BY t.id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), read_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        self.attach_managers(rows)
    }

    /// Loads one active task with its managers.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TaskNotFound`] if no active task has `id`.
    pub fn load_task(&self, id: TaskId) -> Result<Task> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1 AND t.active = 1");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([id], read_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if rows.is_empty() {
            return Err(StorageError::TaskNotFound(id));
        }
        let mut tasks = self.attach_managers(rows)?;
        tasks.pop().ok_or(StorageError::TaskNotFound(id))
    }

    /// Replaces a task's managers when the new set differs from the current one.
    ///
    /// The replacement is whole: every link is removed and the new ones are
    /// inserted in the given order. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TaskNotFound`] if no active task has `task_id`.
    pub fn replace_managers(&self, task_id: TaskId, member_ids: &[MemberId]) -> Result<bool> {
        let task = self.load_task(task_id)?;
        let existing: HashSet<&str> = task.managers.iter().map(|m| m.member_id.as_str()).collect();
        let requested: HashSet<&str> = member_ids.iter().map(String::as_str).collect();
        if existing == requested {
            return Ok(false);
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM task_managers WHERE task_id = ?1", [task_id])?;
        for member_id in member_ids {
            tx.execute(
                "INSERT INTO task_managers (task_id, member_id) VALUES (?1, ?2)",
                rusqlite::params![task_id, member_id],
            )?;
        }
        tx.commit()?;
        log::debug!("task {task_id}: managers replaced ({} -> {})", existing.len(), member_ids.len());
        Ok(true)
    }

    /// Rewrites a task's fields. Manager links are left alone; see
    /// [`Storage::replace_managers`].
    ///
    /// Quantitative tasks keep their stored target and actual unless the
    /// update gives new ones, and the cached achievement is recomputed from
    /// the pair. Qualitative tasks have target, actual, and achievement
    /// reset to zero.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TaskNotFound`] if no active task has `id`.
    pub fn update_task(&self, id: TaskId, update: &TaskUpdate) -> Result<()> {
        let current = self.load_task(id)?;
        let (target, actual, achievement) = match update.evaluation {
            Evaluation::Quantitative => {
                let target = update.target_value.clone().unwrap_or(current.target_value);
                let actual = update.actual_value.clone().unwrap_or(current.actual_value);
                let achievement = achievement_rate(&actual, &target);
                (target, actual, achievement)
            }
            Evaluation::Qualitative => {
                let zero = BigDecimal::from(0);
                (zero.clone(), zero.clone(), zero)
            }
        };

        let rows = self.conn.execute(
            "UPDATE tasks
             SET category1 = ?1, category2 = ?2, name = ?3, description = ?4,
                 start_date = ?5, end_date = ?6, performance_type = ?7,
                 evaluation = ?8, metric = ?9, target_value = ?10,
                 actual_value = ?11, achievement = ?12, status = ?13, visible = ?14
             WHERE id = ?15 AND active = 1",
            rusqlite::params![
                &update.category1,
                &update.category2,
                &update.name,
                &update.description,
                update.start_date.map(|d| d.to_string()),
                update.end_date.map(|d| d.to_string()),
                &update.performance_type,
                update.evaluation.as_str(),
                update.metric.map(Metric::as_str),
                target.to_string(),
                actual.to_string(),
                achievement.to_string(),
                update.status.unwrap_or(current.status).as_str(),
                update.visible.unwrap_or(current.visible),
                id,
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::TaskNotFound(id));
        }
        log::debug!("task {id}: updated, achievement {achievement}");
        Ok(())
    }

    /// Marks a task inactive. Inactive tasks disappear from every read.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TaskNotFound`] if no active task has `id`.
    pub fn delete_task(&self, id: TaskId) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE tasks SET active = 0 WHERE id = ?1 AND active = 1",
            [id],
        )?;
        if rows == 0 {
            return Err(StorageError::TaskNotFound(id));
        }
        Ok(())
    }

    /// Writes a task's status and, when given, its cached actual value
    /// and achievement.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::TaskNotFound`] if no active task has `id`.
    pub fn write_back_achievement(
        &self,
        id: TaskId,
        status: TaskStatus,
        cache: Option<(&BigDecimal, &BigDecimal)>,
    ) -> Result<()> {
        let (actual, achievement) = match cache {
            Some((actual, achievement)) => (Some(actual.to_string()), Some(achievement.to_string())),
            None => (None, None),
        };
        let rows = self.conn.execute(
            "UPDATE tasks
             SET status = ?1,
                 actual_value = COALESCE(?2, actual_value),
                 achievement = COALESCE(?3, achievement)
             WHERE id = ?4 AND active = 1",
            rusqlite::params![status.as_str(), actual, achievement, id],
        )?;
        if rows == 0 {
            return Err(StorageError::TaskNotFound(id));
        }
        Ok(())
    }

    /// Loads manager links for every row in one query and builds the tasks.
    fn attach_managers(&self, rows: Vec<TaskRow>) -> Result<Vec<Task>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<TaskId> = rows.iter().map(|r| r.id).collect();
        let mut stmt = self.conn.prepare(
            "SELECT tm.task_id, tm.member_id,
                    m.id, m.name, m.department_name, m.position_name, m.active
             FROM task_managers tm
             LEFT JOIN members m ON m.id = tm.member_id
             WHERE tm.task_id IN (SELECT value FROM json_each(?1))
             ORDER BY tm.task_id, tm.id",
        )?;
        let links = stmt.query_map([id_array(&ids)?], |row| {
            let task_id: TaskId = row.get(0)?;
            let member_id: MemberId = row.get(1)?;
            let member = match row.get::<_, Option<String>>(2)? {
                Some(id) => Some(Member {
                    id,
                    name: row.get(3)?,
                    department_name: row.get(4)?,
                    position_name: row.get(5)?,
                    active: row.get(6)?,
                }),
                None => None,
            };
            Ok((task_id, TaskManager { member_id, member }))
        })?;

        let mut by_task: HashMap<TaskId, Vec<TaskManager>> = HashMap::new();
        for link in links {
            let (task_id, manager) = link?;
            by_task.entry(task_id).or_default().push(manager);
        }

        rows.into_iter()
            .map(|row| {
                let managers = by_task.remove(&row.id).unwrap_or_default();
                row.into_task(managers)
            })
            .collect()
    }
}

/// Raw column values for one task, before parsing.
struct TaskRow {
    id: TaskId,
    task_type: String,
    category1: Option<String>,
    category2: Option<String>,
    name: String,
    description: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    performance_type: Option<String>,
    evaluation: String,
    metric: Option<String>,
    target_value: String,
    actual_value: String,
    achievement: String,
    status: String,
    active: bool,
    visible: bool,
}

fn read_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        task_type: row.get(1)?,
        category1: row.get(2)?,
        category2: row.get(3)?,
        name: row.get(4)?,
        description: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        performance_type: row.get(8)?,
        evaluation: row.get(9)?,
        metric: row.get(10)?,
        target_value: row.get(11)?,
        actual_value: row.get(12)?,
        achievement: row.get(13)?,
        status: row.get(14)?,
        active: row.get(15)?,
        visible: row.get(16)?,
    })
}

impl TaskRow {
    fn into_task(self, managers: Vec<TaskManager>) -> Result<Task> {
        let evaluation = Evaluation::parse(&self.evaluation).ok_or_else(|| {
            StorageError::Corrupt(format!("task {}: unknown evaluation '{}'", self.id, self.evaluation))
        })?;
        let metric = match self.metric.as_deref() {
            None | Some("") => None,
            Some(s) => Some(Metric::parse(s).ok_or_else(|| {
                StorageError::Corrupt(format!("task {}: unknown metric '{s}'", self.id))
            })?),
        };
        let status = TaskStatus::parse(&self.status).ok_or_else(|| {
            StorageError::Corrupt(format!("task {}: unknown status '{}'", self.id, self.status))
        })?;

        Ok(Task {
            id: self.id,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
            target_value: parse_decimal("target_value", &self.target_value)?,
            actual_value: parse_decimal("actual_value", &self.actual_value)?,
            achievement: parse_decimal("achievement", &self.achievement)?,
            task_type: self.task_type,
            category1: self.category1,
            category2: self.category2,
            name: self.name,
            description: self.description,
            performance_type: self.performance_type,
            evaluation,
            metric,
            status,
            active: self.active,
            visible: self.visible,
            managers,
        })
    }
}

fn parse_date(column: &str, value: Option<&str>) -> Result<Option<jiff::civil::Date>> {
    value
        .map(|s| {
            s.parse::<jiff::civil::Date>()
                .map_err(|e| StorageError::Corrupt(format!("invalid {column} '{s}': {e}")))
        })
        .transpose()
}
