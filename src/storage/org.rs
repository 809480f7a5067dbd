//! Organization storage: departments, members, and roles.

use rusqlite::OptionalExtension;

use crate::model::{Department, Member};

use super::{Result, Storage};

impl Storage {
    /// Loads the whole department table in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_departments(&self) -> Result<Vec<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, parent_id, depth, active FROM departments ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
                parent_id: row.get(2)?,
                depth: row.get(3)?,
                active: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Inserts or replaces a department row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_department(&self, department: &Department) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO departments (id, name, parent_id, depth, active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                department.id,
                &department.name,
                department.parent_id,
                department.depth,
                department.active,
            ],
        )?;
        Ok(())
    }

    /// Inserts or replaces a member row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn insert_member(&self, member: &Member) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO members (id, name, department_name, position_name, active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                &member.id,
                &member.name,
                &member.department_name,
                &member.position_name,
                member.active,
            ],
        )?;
        Ok(())
    }

    /// Active members whose department is `department_name`, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_members(&self, department_name: &str) -> Result<Vec<Member>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, department_name, position_name, active
             FROM members
             WHERE department_name = ?1 AND active = 1
             ORDER BY name, id",
        )?;
        let rows = stmt.query_map([department_name], |row| {
            Ok(Member {
                id: row.get(0)?,
                name: row.get(1)?,
                department_name: row.get(2)?,
                position_name: row.get(3)?,
                active: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<_>>()?)
    }

    /// Sets a member's role, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn assign_role(&self, member_id: &str, role: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO roles (member_id, role) VALUES (?1, ?2)",
            rusqlite::params![member_id, role],
        )?;
        Ok(())
    }

    /// The member's role, if one was assigned.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn role_of(&self, member_id: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT role FROM roles WHERE member_id = ?1",
                [member_id],
                |row| row.get(0),
            )
            .optional()?)
    }
}
