//! Reminder drafts: one per manager with tasks still awaiting input.
//!
//! Only the message content is built here. Sending it is someone else's job.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::assemble::TaskResponse;
use crate::model::MemberId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDraft {
    pub member_id: MemberId,
    pub member_name: Option<String>,
    pub task_type: String,

    /// Name of the first task listed for this manager.
    pub first_task_name: String,
    pub task_count: usize,
}

impl NotificationDraft {
    /// `"Expand partner network"` or `"Expand partner network and 2 more"`.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.task_count {
            0 | 1 => self.first_task_name.clone(),
            n => format!("{} and {} more", self.first_task_name, n - 1),
        }
    }
}

/// Groups `tasks` by manager, in the order each manager first appears.
///
/// A manager listed twice on the same task counts it once.
#[must_use]
pub fn drafts(tasks: &[TaskResponse]) -> Vec<NotificationDraft> {
    let mut drafts: Vec<NotificationDraft> = Vec::new();
    let mut by_member: HashMap<&str, usize> = HashMap::new();

    for task in tasks {
        let mut seen = HashSet::new();
        for manager in &task.managers {
            if !seen.insert(manager.id.as_str()) {
                continue;
            }
            match by_member.get(manager.id.as_str()) {
                Some(&i) => drafts[i].task_count += 1,
                None => {
                    by_member.insert(manager.id.as_str(), drafts.len());
                    drafts.push(NotificationDraft {
                        member_id: manager.id.clone(),
                        member_name: manager.name.clone(),
                        task_type: task.task_type.clone(),
                        first_task_name: task.name.clone(),
                        task_count: 1,
                    });
                }
            }
        }
    }

    drafts
}
