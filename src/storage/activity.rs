//! The activity journal: one entry per task per period.

use bigdecimal::BigDecimal;
use rusqlite::OptionalExtension;
use rusqlite::types::Value;

use crate::model::{MemberId, Period, TaskActivity, TaskId};

use super::{Result, Storage, StorageError, id_array, parse_decimal, parse_period};

const ACTIVITY_COLUMNS: &str = "id, task_id, member_id, year, month, content, actual_value";

impl Storage {
    /// Records a task's entry for `period`, updating it in place if one exists.
    ///
    /// A `None` value leaves a previously recorded reading untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails, including when `task_id` names
    /// no task.
    pub fn upsert_activity(
        &self,
        task_id: TaskId,
        member_id: &str,
        period: Period,
        content: Option<&str>,
        actual_value: Option<&BigDecimal>,
    ) -> Result<TaskActivity> {
        self.conn.execute(
            "INSERT INTO task_activities (task_id, member_id, year, month, content, actual_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (task_id, year, month) DO UPDATE SET
                 member_id = excluded.member_id,
                 content = excluded.content,
                 actual_value = COALESCE(excluded.actual_value, task_activities.actual_value)",
            rusqlite::params![
                task_id,
                member_id,
                period.year(),
                period.month(),
                content,
                actual_value.map(ToString::to_string),
            ],
        )?;

        self.load_activity(task_id, period)?.ok_or_else(|| {
            StorageError::Corrupt(format!("task {task_id}: entry for {period} vanished"))
        })
    }

    /// The task's entry for exactly `period`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub fn load_activity(&self, task_id: TaskId, period: Period) -> Result<Option<TaskActivity>> {
        let raw = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ACTIVITY_COLUMNS} FROM task_activities
                     WHERE task_id = ?1 AND year = ?2 AND month = ?3"
                ),
                rusqlite::params![task_id, period.year(), period.month()],
                read_activity_row,
            )
            .optional()?;
        raw.map(ActivityRow::into_activity).transpose()
    }

    /// Entries for any of `task_ids` in exactly `period`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn load_activities_in_period(
        &self,
        task_ids: &[TaskId],
        period: Period,
    ) -> Result<Vec<TaskActivity>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM task_activities
             WHERE year = ?1 AND month = ?2
               AND task_id IN (SELECT value FROM json_each(?3))
             ORDER BY id"
        );
        self.query_activities(
            &sql,
            vec![
                Value::Integer(i64::from(period.year())),
                Value::Integer(i64::from(period.month())),
                Value::Text(id_array(task_ids)?),
            ],
        )
    }

    /// Every entry for any of `task_ids`, most recent period first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn load_activity_history(&self, task_ids: &[TaskId]) -> Result<Vec<TaskActivity>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM task_activities
             WHERE task_id IN (SELECT value FROM json_each(?1))
             ORDER BY task_id, year DESC, month DESC"
        );
        self.query_activities(&sql, vec![Value::Text(id_array(task_ids)?)])
    }

    /// The task's entries strictly before `period`, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn activities_before(
        &self,
        task_id: TaskId,
        period: Period,
        limit: usize,
    ) -> Result<Vec<TaskActivity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM task_activities
             WHERE task_id = ?1 AND (year < ?2 OR (year = ?2 AND month < ?3))
             ORDER BY year DESC, month DESC
             LIMIT ?4"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_activities(
            &sql,
            vec![
                Value::Integer(task_id),
                Value::Integer(i64::from(period.year())),
                Value::Integer(i64::from(period.month())),
                Value::Integer(limit),
            ],
        )
    }

    /// The task's entries in `year` that carry a reading, January first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub fn activities_in_year(&self, task_id: TaskId, year: i16) -> Result<Vec<TaskActivity>> {
        let sql = format!(
            "SELECT {ACTIVITY_COLUMNS} FROM task_activities
             WHERE task_id = ?1 AND year = ?2 AND actual_value IS NOT NULL
             ORDER BY month"
        );
        self.query_activities(
            &sql,
            vec![Value::Integer(task_id), Value::Integer(i64::from(year))],
        )
    }

    fn query_activities(&self, sql: &str, params: Vec<Value>) -> Result<Vec<TaskActivity>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), read_activity_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ActivityRow::into_activity).collect()
    }
}

struct ActivityRow {
    id: i64,
    task_id: TaskId,
    member_id: MemberId,
    year: i16,
    month: i8,
    content: Option<String>,
    actual_value: Option<String>,
}

fn read_activity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
    Ok(ActivityRow {
        id: row.get(0)?,
        task_id: row.get(1)?,
        member_id: row.get(2)?,
        year: row.get(3)?,
        month: row.get(4)?,
        content: row.get(5)?,
        actual_value: row.get(6)?,
    })
}

impl ActivityRow {
    fn into_activity(self) -> Result<TaskActivity> {
        Ok(TaskActivity {
            id: self.id,
            task_id: self.task_id,
            member_id: self.member_id,
            period: parse_period(self.year, self.month)?,
            content: self.content,
            actual_value: self
                .actual_value
                .as_deref()
                .map(|v| parse_decimal("actual_value", v))
                .transpose()?,
        })
    }
}
