//! Output formatting for CLI display.

use std::fmt::Write;

use taskboard::assemble::{ManagerInfo, TaskResponse};
use taskboard::model::{Department, Member, TaskStatus};
use taskboard::notify::NotificationDraft;
use taskboard::org::DepartmentNode;
use taskboard::report::{ActivityView, MonthlyActual};

fn format_status(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::InProgress => "in progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Delayed => "delayed",
        TaskStatus::Halted => "halted",
    }
}

/// Departments as an indented tree, two spaces per level.
pub(super) fn format_forest(roots: &[DepartmentNode]) -> String {
    let mut out = String::new();
    for root in roots {
        write_node(&mut out, root, 0);
    }
    out.truncate(out.trim_end().len());
    out
}

fn write_node(out: &mut String, node: &DepartmentNode, level: usize) {
    let inactive = if node.active { "" } else { " (inactive)" };
    let _ = writeln!(out, "{}{} [{}]{inactive}", "  ".repeat(level), node.name, node.id);
    for child in &node.children {
        write_node(out, child, level + 1);
    }
}

pub(super) fn format_department(department: &Department) -> String {
    format!("{:>4}  {}", department.id, department.name)
}

/// Id, name, and position, plus the department when it's set.
pub(super) fn format_member(member: &Member) -> String {
    let mut out = format!("{:<12}{}", member.id, member.name);
    if let Some(position) = &member.position_name {
        let _ = write!(out, ", {position}");
    }
    if let Some(department) = &member.department_name {
        let _ = write!(out, " ({department})");
    }
    if !member.active {
        out.push_str(" (inactive)");
    }
    out
}

/// One line per task: id, type, name, achievement, status, input state.
pub(super) fn format_task_line(task: &TaskResponse) -> String {
    let input = if task.is_input_complete { "" } else { "  (input pending)" };
    format!(
        "#{} [{}] {}  {}%  {}{input}",
        task.id,
        task.task_type,
        task.name,
        task.achievement,
        format_status(task.status),
    )
}

pub(super) fn format_task_detail(task: &TaskResponse) -> String {
    let mut out = format_task_line(task);
    if let Some(description) = &task.description {
        let _ = write!(out, "\n  {description}");
    }
    if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
        let _ = write!(out, "\n  period: {start} to {end}");
    }
    let _ = write!(out, "\n  evaluation: {}", task.evaluation.as_str());
    if let Some(metric) = task.metric {
        let _ = write!(out, " ({})", metric.as_str());
    }
    let _ = write!(
        out,
        "\n  actual: {} / target: {} ({}%)",
        task.actual_value, task.target_value, task.achievement_percent
    );
    for manager in &task.managers {
        let _ = write!(out, "\n  manager: {}", format_manager(manager));
    }
    out
}

fn format_manager(manager: &ManagerInfo) -> String {
    let name = manager.name.as_deref().unwrap_or(&manager.id);
    match (&manager.department_name, &manager.top_level_department_name) {
        (Some(dept), Some(top)) if dept != top => format!("{name} ({dept}, {top})"),
        (Some(dept), _) => format!("{name} ({dept})"),
        (None, _) => name.to_string(),
    }
}

pub(super) fn format_activity(view: &ActivityView) -> String {
    let mut out = format!("#{} {} [{}]", view.task_id, view.task_name, view.period);
    match &view.content {
        Some(content) => {
            let by = view.member_id.as_deref().unwrap_or("unknown");
            let _ = write!(out, "\n  {content}\n  by {by}");
        }
        None => out.push_str("\n  (no entry)"),
    }
    let _ = write!(
        out,
        "\n  actual: {} / target: {} ({}%)",
        view.actual_value, view.target_value, view.achievement
    );
    out
}

pub(super) fn format_monthly(points: &[MonthlyActual]) -> String {
    points
        .iter()
        .map(|p| format!("{:04}-{:02}  {}", p.year, p.month, p.actual_value))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn format_draft(draft: &NotificationDraft) -> String {
    let name = draft.member_name.as_deref().unwrap_or(&draft.member_id);
    format!("{name} [{}]: {}", draft.task_type, draft.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bigdecimal::BigDecimal;

    use taskboard::achievement::Basis;
    use taskboard::model::{Evaluation, Metric, Period};

    fn node(id: i64, name: &str, active: bool, children: Vec<DepartmentNode>) -> DepartmentNode {
        DepartmentNode {
            id,
            name: name.into(),
            parent_id: None,
            depth: 0,
            active,
            children,
        }
    }

    fn sample_response() -> TaskResponse {
        TaskResponse {
            id: 12,
            task_type: "OI".into(),
            category1: None,
            category2: None,
            name: "Expand partner network".into(),
            description: None,
            start_date: None,
            end_date: None,
            performance_type: None,
            evaluation: Evaluation::Quantitative,
            metric: Some(Metric::Count),
            status: TaskStatus::InProgress,
            visible: true,
            managers: vec![ManagerInfo {
                id: "kim".into(),
                name: Some("Kim".into()),
                position: None,
                department_name: Some("Sales/East".into()),
                top_level_department_name: Some("Sales".into()),
            }],
            target_value: BigDecimal::from(3),
            actual_value: BigDecimal::from(1),
            achievement: "33.33".parse().unwrap(),
            achievement_percent: 33,
            achievement_basis: Basis::Journal,
            is_input_complete: false,
        }
    }

    #[test]
    fn format_forest_indents_children() {
        let forest = vec![
            node(1, "Sales", true, vec![node(2, "Sales/East", false, vec![])]),
            node(3, "Engineering", true, vec![]),
        ];

        assert_eq!(
            format_forest(&forest),
            "Sales [1]\n  Sales/East [2] (inactive)\nEngineering [3]"
        );
    }

    #[test]
    fn format_member_line() {
        let mut member = Member {
            id: "kim".into(),
            name: "Kim Minji".into(),
            department_name: Some("Sales/East".into()),
            position_name: Some("Lead".into()),
            active: true,
        };
        assert_eq!(format_member(&member), "kim         Kim Minji, Lead (Sales/East)");

        member.position_name = None;
        member.department_name = None;
        member.active = false;
        assert_eq!(format_member(&member), "kim         Kim Minji (inactive)");
    }

    #[test]
    fn format_task_line_marks_pending_input() {
        let mut task = sample_response();
        assert_eq!(
            format_task_line(&task),
            "#12 [OI] Expand partner network  33.33%  in progress  (input pending)"
        );

        task.is_input_complete = true;
        task.status = TaskStatus::Completed;
        assert_eq!(
            format_task_line(&task),
            "#12 [OI] Expand partner network  33.33%  completed"
        );
    }

    #[test]
    fn format_task_detail_lists_managers() {
        let detail = format_task_detail(&sample_response());

        assert!(detail.contains("evaluation: quantitative (count)"));
        assert!(detail.contains("actual: 1 / target: 3 (33%)"));
        assert!(detail.contains("manager: Kim (Sales/East, Sales)"));
    }

    #[test]
    fn format_manager_without_member_row_uses_id() {
        let manager = ManagerInfo {
            id: "ghost".into(),
            name: None,
            position: None,
            department_name: None,
            top_level_department_name: None,
        };
        assert_eq!(format_manager(&manager), "ghost");
    }

    #[test]
    fn format_empty_activity_view() {
        let view = ActivityView {
            activity_id: None,
            task_id: 12,
            task_name: "Expand partner network".into(),
            member_id: None,
            period: Period::new(2025, 3).unwrap(),
            content: None,
            target_value: BigDecimal::from(3),
            actual_value: BigDecimal::from(0),
            achievement: BigDecimal::from(0),
        };

        assert_eq!(
            format_activity(&view),
            "#12 Expand partner network [2025-03]\n  (no entry)\n  actual: 0 / target: 3 (0%)"
        );
    }

    #[test]
    fn format_monthly_points() {
        let points = vec![
            MonthlyActual {
                year: 2025,
                month: 1,
                actual_value: BigDecimal::from(4),
            },
            MonthlyActual {
                year: 2025,
                month: 2,
                actual_value: "2.5".parse().unwrap(),
            },
        ];

        assert_eq!(format_monthly(&points), "2025-01  4\n2025-02  2.5");
    }

    #[test]
    fn format_draft_summary() {
        let draft = NotificationDraft {
            member_id: "kim".into(),
            member_name: None,
            task_type: "OI".into(),
            first_task_name: "Close Q1 books".into(),
            task_count: 3,
        };

        assert_eq!(format_draft(&draft), "kim [OI]: Close Q1 books and 2 more");
    }
}
