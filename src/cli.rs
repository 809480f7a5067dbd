//! CLI interface for taskboard.
//!
//! Each subcommand is non-interactive: arguments in, a report out.
//! Output is human-readable text unless `--json` is given, in which case
//! the same data is printed as pretty JSON.
//!
//! Commands split into five groups:
//!
//! - `taskboard dept tree|list|show|members|add`: the department hierarchy.
//! - `taskboard member add`: people who can manage tasks.
//! - `taskboard role assign`: who counts as an admin.
//! - `taskboard task list|show|pending|notify|create|edit|delete`: tasks.
//! - `taskboard activity record|show|previous|monthly`: the monthly journal.

mod format;

use std::path::PathBuf;

use bigdecimal::BigDecimal;
use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::civil::Date;
use serde::Serialize;

use taskboard::model::{
    DepartmentId, Evaluation, Member, Metric, NewTask, Period, TaskId, TaskStatus, TaskUpdate,
};
use taskboard::notify;
use taskboard::report::{self, ActivityInput, DEFAULT_PREVIOUS_LIMIT, TaskQuery};
use taskboard::storage::Storage;

use crate::config::Config;

use format::{
    format_activity, format_department, format_draft, format_forest, format_member,
    format_monthly, format_task_detail, format_task_line,
};

/// Taskboard: track objectives and their monthly progress.
#[derive(Debug, Parser)]
#[command(name = "taskboard", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// `SQLite` database to use instead of the configured one.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Setup:
  taskboard dept add 1 Sales
  taskboard dept add 2 Sales/East --parent 1
  taskboard member add kim 'Kim Minji' --dept Sales/East
  taskboard role assign kim admin
  taskboard task create --type OI --name 'Expand partner network' \
      --metric count --target 12 --manager kim

Workflow: monthly input
  1. taskboard task pending --type OI
     → tasks still waiting for this month's input
  2. taskboard activity record 12 --as kim --text 'Signed two partners' --value 2
  3. taskboard task show 12
  4. taskboard task notify --type OI

Past periods:
  taskboard activity show 12 --year 2025 --month 3
  taskboard activity previous 12 --limit 6
  taskboard activity monthly 12 --year 2025";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse and extend the department hierarchy.
    Dept {
        #[command(subcommand)]
        command: DeptCommand,
    },

    /// Manage members.
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },

    /// Manage member roles.
    Role {
        #[command(subcommand)]
        command: RoleCommand,
    },

    /// Report on and maintain tasks.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Read and write the monthly activity journal.
    Activity {
        #[command(subcommand)]
        command: ActivityCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeptCommand {
    /// Every department, nested under its parent.
    Tree,

    /// Active departments as a flat list.
    List,

    /// One department with its descendants.
    Show {
        /// Department id.
        id: DepartmentId,
    },

    /// Active members of one department.
    Members {
        /// Department id.
        id: DepartmentId,
    },

    /// Add a department, or replace the one with the same id.
    Add {
        /// Department id.
        id: DepartmentId,

        /// Department name. Members refer to it by this name.
        name: String,

        /// Parent department id. Omit for a top-level department.
        #[arg(long)]
        parent: Option<DepartmentId>,

        /// Add the department as inactive.
        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// Add a member, or replace the one with the same id.
    Add {
        /// Member id.
        id: String,

        /// Display name.
        name: String,

        /// Department name.
        #[arg(long)]
        dept: Option<String>,

        /// Position title.
        #[arg(long)]
        position: Option<String>,

        /// Add the member as inactive.
        #[arg(long)]
        inactive: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Give a member a role, replacing any previous one.
    Assign {
        /// Member id.
        member: String,

        /// Role name. The configured admin role sees every task.
        role: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// List active tasks, newest first.
    List {
        /// Only tasks of this type (e.g. "OI").
        #[arg(long = "type")]
        task_type: Option<String>,

        /// List as this member. Non-admins see only the tasks they manage.
        #[arg(long = "as")]
        viewer: Option<String>,
    },

    /// Show one task.
    Show {
        /// Task id.
        id: TaskId,
    },

    /// In-progress tasks missing this month's input.
    Pending {
        /// Only tasks of this type.
        #[arg(long = "type")]
        task_type: Option<String>,
    },

    /// Reminder drafts for managers with pending tasks.
    ///
    /// Drafts are printed, not sent.
    Notify {
        /// Only tasks of this type.
        #[arg(long = "type")]
        task_type: Option<String>,
    },

    /// Create a task. Prints the new task.
    Create(CreateArgs),

    /// Change a task's fields. Fields not given keep their current value.
    ///
    /// Switching a task to qualitative resets its target, actual value,
    /// and achievement to zero.
    Edit(EditArgs),

    /// Delete a task. Its journal is kept but no longer shown.
    Delete {
        /// Task id.
        id: TaskId,
    },
}

/// Descriptive task fields shared by `create` and `edit`.
#[derive(Debug, Args)]
pub struct TaskDetails {
    #[arg(long)]
    category1: Option<String>,

    #[arg(long)]
    category2: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// First day of the task, e.g. 2025-01-01.
    #[arg(long)]
    start: Option<Date>,

    /// Last day of the task.
    #[arg(long)]
    end: Option<Date>,

    /// Free-form classification, e.g. "financial".
    #[arg(long)]
    performance_type: Option<String>,

    /// How readings combine across periods.
    #[arg(long, value_enum)]
    metric: Option<MetricArg>,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Task type (e.g. "OI").
    #[arg(long = "type")]
    task_type: String,

    /// Task name.
    #[arg(long)]
    name: String,

    #[command(flatten)]
    details: TaskDetails,

    #[arg(long, value_enum, default_value_t = EvaluationArg::Quantitative)]
    evaluation: EvaluationArg,

    /// Target value. Ignored for qualitative tasks.
    #[arg(long)]
    target: Option<BigDecimal>,

    /// Hide the task from listings.
    #[arg(long)]
    hidden: bool,

    /// Managing member id. Can be specified multiple times.
    #[arg(long = "manager")]
    managers: Vec<String>,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Task id.
    id: TaskId,

    /// New task name.
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    details: TaskDetails,

    #[arg(long, value_enum)]
    evaluation: Option<EvaluationArg>,

    /// New target value.
    #[arg(long)]
    target: Option<BigDecimal>,

    /// New cached actual value.
    #[arg(long)]
    actual: Option<BigDecimal>,

    #[arg(long, value_enum)]
    status: Option<StatusArg>,

    /// Whether the task shows in listings.
    #[arg(long)]
    visible: Option<bool>,

    /// Replacement managers. Can be specified multiple times; omit to keep
    /// the current ones.
    #[arg(long = "manager")]
    managers: Vec<String>,
}

impl EditArgs {
    /// Overlays the given flags on `update`.
    fn apply(self, mut update: TaskUpdate) -> TaskUpdate {
        let TaskDetails {
            category1,
            category2,
            description,
            start,
            end,
            performance_type,
            metric,
        } = self.details;
        if let Some(name) = self.name {
            update.name = name;
        }
        update.category1 = category1.or(update.category1);
        update.category2 = category2.or(update.category2);
        update.description = description.or(update.description);
        update.start_date = start.or(update.start_date);
        update.end_date = end.or(update.end_date);
        update.performance_type = performance_type.or(update.performance_type);
        if let Some(metric) = metric {
            update.metric = Some(metric.to_domain());
        }
        if let Some(evaluation) = self.evaluation {
            update.evaluation = evaluation.to_domain();
        }
        update.target_value = self.target;
        update.actual_value = self.actual;
        update.status = self.status.as_ref().map(StatusArg::to_domain);
        update.visible = self.visible;
        update.manager_ids = (!self.managers.is_empty()).then_some(self.managers);
        update
    }
}

#[derive(Debug, Subcommand)]
pub enum ActivityCommand {
    /// Record a task's entry for a period, replacing any earlier one.
    ///
    /// Recording the current period also updates the task's status
    /// and its cached achievement.
    Record {
        /// Task id.
        task: TaskId,

        /// Member recording the entry.
        #[arg(long = "as")]
        member: String,

        /// What happened this period.
        #[arg(long)]
        text: String,

        /// Actual value for the period. Ignored for qualitative tasks.
        #[arg(long)]
        value: Option<BigDecimal>,

        #[command(flatten)]
        period: PeriodArgs,

        /// New task status. Only applied for the current period.
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Show a task's entry for a period.
    Show {
        /// Task id.
        task: TaskId,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Entries recorded before a period, most recent first.
    Previous {
        /// Task id.
        task: TaskId,

        #[command(flatten)]
        period: PeriodArgs,

        /// How many entries to show.
        #[arg(long, default_value_t = DEFAULT_PREVIOUS_LIMIT)]
        limit: usize,
    },

    /// Monthly actual values for one year.
    Monthly {
        /// Task id.
        task: TaskId,

        /// Year to chart (defaults to the current year).
        #[arg(long)]
        year: Option<i16>,
    },
}

/// A reporting period. Both or neither; neither means the current month.
#[derive(Debug, Args)]
pub struct PeriodArgs {
    #[arg(long, requires = "month")]
    year: Option<i16>,

    #[arg(long, requires = "year", value_parser = clap::value_parser!(i8).range(1..=12))]
    month: Option<i8>,
}

impl PeriodArgs {
    fn resolve(&self, now: Period) -> Result<Period, String> {
        match (self.year, self.month) {
            (Some(year), Some(month)) => {
                Period::new(year, month).ok_or_else(|| format!("invalid month: {month}"))
            }
            _ => Ok(now),
        }
    }
}

/// CLI-facing task status, mapped to the domain `TaskStatus`.
#[derive(Debug, Clone, ValueEnum)]
pub enum StatusArg {
    InProgress,
    Completed,
    Delayed,
    Halted,
}

impl StatusArg {
    fn to_domain(&self) -> TaskStatus {
        match self {
            Self::InProgress => TaskStatus::InProgress,
            Self::Completed => TaskStatus::Completed,
            Self::Delayed => TaskStatus::Delayed,
            Self::Halted => TaskStatus::Halted,
        }
    }
}

/// CLI-facing evaluation, mapped to the domain `Evaluation`.
#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum EvaluationArg {
    /// Measured against a numeric target.
    Quantitative,
    /// Judged on narrative alone.
    Qualitative,
}

impl EvaluationArg {
    fn to_domain(&self) -> Evaluation {
        match self {
            Self::Quantitative => Evaluation::Quantitative,
            Self::Qualitative => Evaluation::Qualitative,
        }
    }
}

/// CLI-facing metric, mapped to the domain `Metric`.
#[derive(Debug, Clone, ValueEnum)]
pub enum MetricArg {
    /// Each period adds to the total.
    Count,
    /// Each period adds to the total.
    Amount,
    /// Only the latest reading counts.
    Percent,
}

impl MetricArg {
    fn to_domain(&self) -> Metric {
        match self {
            Self::Count => Metric::Count,
            Self::Amount => Metric::Amount,
            Self::Percent => Metric::Percent,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    let path = cli
        .db
        .clone()
        .or_else(|| config.database.clone())
        .or_else(Storage::default_path)
        .ok_or("could not determine home directory")?;
    let storage = Storage::open(&path)
        .map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    log::debug!("using database at {}", path.display());

    let out = Output { json: cli.json };
    let now = Period::current();

    match cli.command {
        Command::Dept { command } => cmd_dept(&storage, out, &command),
        Command::Member { command } => cmd_member(&storage, out, command),
        Command::Role { command } => cmd_role(&storage, &command),
        Command::Task { command } => cmd_task(config, &storage, out, command, now),
        Command::Activity { command } => cmd_activity(&storage, out, command, now),
    }
}

/// Where a report goes: JSON or text on stdout.
#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize + ?Sized>(self, value: &T, text: impl FnOnce(&T) -> String) -> Result<(), String> {
        if self.json {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| format!("failed to serialize output: {e}"))?;
            println!("{json}");
        } else {
            let text = text(value);
            if !text.is_empty() {
                println!("{text}");
            }
        }
        Ok(())
    }
}

fn cmd_dept(storage: &Storage, out: Output, command: &DeptCommand) -> Result<(), String> {
    match command {
        DeptCommand::Tree => {
            let forest = report::department_forest(storage)
                .map_err(|e| format!("failed to load departments: {e}"))?;
            out.emit(forest.as_slice(), format_forest)
        }
        DeptCommand::List => {
            let departments = report::active_departments(storage)
                .map_err(|e| format!("failed to load departments: {e}"))?;
            out.emit(&departments, |ds| {
                ds.iter().map(format_department).collect::<Vec<_>>().join("\n")
            })
        }
        DeptCommand::Show { id } => {
            let node = report::department_subtree(storage, *id).map_err(|e| e.to_string())?;
            out.emit(&node, |n| format_forest(std::slice::from_ref(n)))
        }
        DeptCommand::Members { id } => {
            let members = report::department_members(storage, *id).map_err(|e| e.to_string())?;
            if members.is_empty() && !out.json {
                eprintln!("No active members in department {id}.");
                return Ok(());
            }
            out.emit(&members, |ms| {
                ms.iter().map(format_member).collect::<Vec<_>>().join("\n")
            })
        }
        DeptCommand::Add {
            id,
            name,
            parent,
            inactive,
        } => {
            let department = report::add_department(storage, *id, name, *parent, !*inactive)
                .map_err(|e| format!("failed to add department: {e}"))?;
            eprintln!("Added department {id}");
            out.emit(&department, format_department)
        }
    }
}

fn cmd_member(storage: &Storage, out: Output, command: MemberCommand) -> Result<(), String> {
    match command {
        MemberCommand::Add {
            id,
            name,
            dept,
            position,
            inactive,
        } => {
            let member = Member {
                id,
                name,
                department_name: dept,
                position_name: position,
                active: !inactive,
            };
            storage
                .insert_member(&member)
                .map_err(|e| format!("failed to add member: {e}"))?;
            eprintln!("Added member {}", member.id);
            out.emit(&member, format_member)
        }
    }
}

fn cmd_role(storage: &Storage, command: &RoleCommand) -> Result<(), String> {
    match command {
        RoleCommand::Assign { member, role } => {
            storage
                .assign_role(member, role)
                .map_err(|e| format!("failed to assign role: {e}"))?;
            eprintln!("{member} is now {role}");
            Ok(())
        }
    }
}

fn cmd_task(
    config: &Config,
    storage: &Storage,
    out: Output,
    command: TaskCommand,
    now: Period,
) -> Result<(), String> {
    match command {
        TaskCommand::List { task_type, viewer } => {
            let query = TaskQuery { task_type, viewer };
            let tasks = report::list_tasks(storage, &query, &config.admin_role, now)
                .map_err(|e| format!("failed to list tasks: {e}"))?;
            if tasks.is_empty() && !out.json {
                eprintln!("No tasks.");
                return Ok(());
            }
            out.emit(&tasks, |ts| {
                ts.iter().map(format_task_line).collect::<Vec<_>>().join("\n")
            })
        }
        TaskCommand::Show { id } => {
            let task = report::task_detail(storage, id, now).map_err(|e| e.to_string())?;
            out.emit(&task, format_task_detail)
        }
        TaskCommand::Pending { task_type } => {
            let tasks = report::pending_input(storage, task_type.as_deref(), now)
                .map_err(|e| format!("failed to load pending tasks: {e}"))?;
            if tasks.is_empty() && !out.json {
                eprintln!("All input for {now} is in.");
                return Ok(());
            }
            out.emit(&tasks, |ts| {
                ts.iter().map(format_task_line).collect::<Vec<_>>().join("\n")
            })
        }
        TaskCommand::Notify { task_type } => {
            let tasks = report::pending_input(storage, task_type.as_deref(), now)
                .map_err(|e| format!("failed to load pending tasks: {e}"))?;
            let drafts = notify::drafts(&tasks);
            if drafts.is_empty() && !out.json {
                eprintln!("Nobody to notify for {now}.");
                return Ok(());
            }
            out.emit(&drafts, |ds| {
                ds.iter().map(format_draft).collect::<Vec<_>>().join("\n")
            })
        }
        TaskCommand::Create(args) => cmd_task_create(storage, out, args, now),
        TaskCommand::Edit(args) => cmd_task_edit(storage, out, args, now),
        TaskCommand::Delete { id } => {
            storage
                .delete_task(id)
                .map_err(|e| format!("failed to delete task: {e}"))?;
            eprintln!("Deleted task {id}");
            Ok(())
        }
    }
}

fn cmd_task_create(storage: &Storage, out: Output, args: CreateArgs, now: Period) -> Result<(), String> {
    let CreateArgs {
        task_type,
        name,
        details,
        evaluation,
        target,
        hidden,
        managers,
    } = args;
    let new = NewTask {
        task_type,
        category1: details.category1,
        category2: details.category2,
        name,
        description: details.description,
        start_date: details.start,
        end_date: details.end,
        performance_type: details.performance_type,
        evaluation: evaluation.to_domain(),
        metric: details.metric.as_ref().map(MetricArg::to_domain),
        target_value: target,
        visible: !hidden,
        manager_ids: managers,
    };
    let id = storage
        .insert_task(&new)
        .map_err(|e| format!("failed to create task: {e}"))?;
    eprintln!("Created task {id}");
    let task = report::task_detail(storage, id, now).map_err(|e| e.to_string())?;
    out.emit(&task, format_task_detail)
}

fn cmd_task_edit(storage: &Storage, out: Output, args: EditArgs, now: Period) -> Result<(), String> {
    let id = args.id;
    let current = storage.load_task(id).map_err(|e| e.to_string())?;
    let update = args.apply(TaskUpdate::from_task(&current));
    let task = report::update_task(storage, id, &update, now)
        .map_err(|e| format!("failed to update task: {e}"))?;
    eprintln!("Updated task {id}");
    out.emit(&task, format_task_detail)
}

fn cmd_activity(
    storage: &Storage,
    out: Output,
    command: ActivityCommand,
    now: Period,
) -> Result<(), String> {
    match command {
        ActivityCommand::Record {
            task,
            member,
            text,
            value,
            period,
            status,
        } => {
            let input = ActivityInput {
                period: Some(period.resolve(now)?),
                content: Some(text),
                actual_value: value,
                status: status.as_ref().map(StatusArg::to_domain),
            };
            let view = report::record_activity(storage, task, &member, &input, now)
                .map_err(|e| format!("failed to record activity: {e}"))?;
            eprintln!("Recorded task {task} for {}", view.period);
            out.emit(&view, format_activity)
        }
        ActivityCommand::Show { task, period } => {
            let view = report::activity_view(storage, task, period.resolve(now)?)
                .map_err(|e| e.to_string())?;
            out.emit(&view, format_activity)
        }
        ActivityCommand::Previous {
            task,
            period,
            limit,
        } => {
            let views = report::previous_activities(storage, task, period.resolve(now)?, limit)
                .map_err(|e| e.to_string())?;
            out.emit(&views, |vs| {
                vs.iter().map(format_activity).collect::<Vec<_>>().join("\n\n")
            })
        }
        ActivityCommand::Monthly { task, year } => {
            let points = report::monthly_actuals(storage, task, year.unwrap_or(now.year()))
                .map_err(|e| e.to_string())?;
            out.emit(points.as_slice(), format_monthly)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("taskboard").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn period_args_default_to_now() {
        let now = Period::new(2025, 3).unwrap();
        let args = PeriodArgs {
            year: None,
            month: None,
        };
        assert_eq!(args.resolve(now).unwrap(), now);
    }

    #[test]
    fn period_args_pick_explicit_period() {
        let now = Period::new(2025, 3).unwrap();
        let args = PeriodArgs {
            year: Some(2024),
            month: Some(11),
        };
        assert_eq!(args.resolve(now).unwrap(), Period::new(2024, 11).unwrap());
    }

    #[test]
    fn parses_record_command() {
        let cli = parse(&[
            "--json", "activity", "record", "12", "--as", "kim", "--text", "Signed", "--value",
            "2.5", "--status", "delayed",
        ]);

        assert!(cli.json);
        let Command::Activity {
            command:
                ActivityCommand::Record {
                    task,
                    member,
                    value,
                    status,
                    ..
                },
        } = cli.command
        else {
            panic!("expected activity record");
        };
        assert_eq!(task, 12);
        assert_eq!(member, "kim");
        assert_eq!(value, Some("2.5".parse::<BigDecimal>().unwrap()));
        assert_eq!(status.as_ref().map(StatusArg::to_domain), Some(TaskStatus::Delayed));
    }

    #[test]
    fn month_requires_year() {
        let result = Cli::try_parse_from(["taskboard", "activity", "show", "12", "--month", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let result = Cli::try_parse_from([
            "taskboard", "activity", "show", "12", "--year", "2025", "--month", "13",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn previous_limit_defaults() {
        let cli = parse(&["activity", "previous", "7"]);
        let Command::Activity {
            command: ActivityCommand::Previous { limit, .. },
        } = cli.command
        else {
            panic!("expected activity previous");
        };
        assert_eq!(limit, DEFAULT_PREVIOUS_LIMIT);
    }

    #[test]
    fn global_db_flag_after_subcommand() {
        let cli = parse(&["task", "list", "--type", "OI", "--db", "/tmp/tb.sqlite"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/tb.sqlite")));
    }

    #[test]
    fn parses_task_create() {
        let cli = parse(&[
            "task", "create", "--type", "OI", "--name", "Expand partners", "--metric", "count",
            "--target", "12", "--start", "2025-01-01", "--manager", "kim", "--manager", "lee",
        ]);

        let Command::Task {
            command: TaskCommand::Create(args),
        } = cli.command
        else {
            panic!("expected task create");
        };
        assert_eq!(args.task_type, "OI");
        assert_eq!(args.evaluation, EvaluationArg::Quantitative);
        assert_eq!(args.target, Some(BigDecimal::from(12)));
        assert_eq!(args.details.start, Some(jiff::civil::date(2025, 1, 1)));
        assert_eq!(args.details.metric.as_ref().map(MetricArg::to_domain), Some(Metric::Count));
        assert_eq!(args.managers, vec!["kim", "lee"]);
        assert!(!args.hidden);
    }

    #[test]
    fn task_create_requires_name() {
        let result = Cli::try_parse_from(["taskboard", "task", "create", "--type", "OI"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let result = Cli::try_parse_from([
            "taskboard", "task", "create", "--type", "OI", "--name", "x", "--metric", "ratio",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn task_edit_overlays_given_flags() {
        let cli = parse(&[
            "task", "edit", "7", "--name", "Renamed", "--evaluation", "qualitative", "--visible",
            "false", "--status", "halted",
        ]);
        let Command::Task {
            command: TaskCommand::Edit(args),
        } = cli.command
        else {
            panic!("expected task edit");
        };
        assert_eq!(args.id, 7);

        let current = TaskUpdate {
            category1: Some("Growth".into()),
            category2: None,
            name: "Original".into(),
            description: Some("Keep me".into()),
            start_date: None,
            end_date: None,
            performance_type: None,
            evaluation: Evaluation::Quantitative,
            metric: Some(Metric::Count),
            target_value: None,
            actual_value: None,
            status: None,
            visible: None,
            manager_ids: None,
        };
        let update = args.apply(current);

        assert_eq!(update.name, "Renamed");
        assert_eq!(update.category1.as_deref(), Some("Growth"));
        assert_eq!(update.description.as_deref(), Some("Keep me"));
        assert_eq!(update.evaluation, Evaluation::Qualitative);
        assert_eq!(update.metric, Some(Metric::Count));
        assert_eq!(update.status, Some(TaskStatus::Halted));
        assert_eq!(update.visible, Some(false));
        assert_eq!(update.manager_ids, None);
    }

    #[test]
    fn task_edit_collects_managers() {
        let cli = parse(&["task", "edit", "7", "--manager", "park", "--actual", "3"]);
        let Command::Task {
            command: TaskCommand::Edit(args),
        } = cli.command
        else {
            panic!("expected task edit");
        };
        assert_eq!(args.actual, Some(BigDecimal::from(3)));
        assert_eq!(args.managers, vec!["park"]);
    }

    #[test]
    fn parses_task_delete() {
        let cli = parse(&["task", "delete", "9"]);
        assert!(matches!(
            cli.command,
            Command::Task {
                command: TaskCommand::Delete { id: 9 }
            }
        ));
    }

    #[test]
    fn parses_dept_add_with_parent() {
        let cli = parse(&["dept", "add", "4", "Sales/West", "--parent", "1", "--inactive"]);
        let Command::Dept {
            command:
                DeptCommand::Add {
                    id,
                    name,
                    parent,
                    inactive,
                },
        } = cli.command
        else {
            panic!("expected dept add");
        };
        assert_eq!(id, 4);
        assert_eq!(name, "Sales/West");
        assert_eq!(parent, Some(1));
        assert!(inactive);
    }

    #[test]
    fn parses_dept_members() {
        let cli = parse(&["dept", "members", "2"]);
        assert!(matches!(
            cli.command,
            Command::Dept {
                command: DeptCommand::Members { id: 2 }
            }
        ));
    }

    #[test]
    fn parses_member_add() {
        let cli = parse(&["member", "add", "kim", "Kim Minji", "--dept", "Sales/East"]);
        let Command::Member {
            command:
                MemberCommand::Add {
                    id,
                    name,
                    dept,
                    position,
                    inactive,
                },
        } = cli.command
        else {
            panic!("expected member add");
        };
        assert_eq!(id, "kim");
        assert_eq!(name, "Kim Minji");
        assert_eq!(dept.as_deref(), Some("Sales/East"));
        assert_eq!(position, None);
        assert!(!inactive);
    }

    #[test]
    fn parses_role_assign() {
        let cli = parse(&["role", "assign", "kim", "admin"]);
        let Command::Role {
            command: RoleCommand::Assign { member, role },
        } = cli.command
        else {
            panic!("expected role assign");
        };
        assert_eq!(member, "kim");
        assert_eq!(role, "admin");
    }
}
