//! Core data model for taskboard.
//!
//! These types mirror the rows a store serves:
//! departments, members, tasks with their manager links,
//! and the monthly activity journal recorded against each task.

mod activity;
mod department;
mod member;
mod period;
mod task;

pub use activity::{ActivityId, TaskActivity};
pub use department::{Department, DepartmentId};
pub use member::{Member, MemberId};
pub use period::Period;
pub use task::{Evaluation, Metric, NewTask, Task, TaskId, TaskManager, TaskStatus, TaskUpdate};
