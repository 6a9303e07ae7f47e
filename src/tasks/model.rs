//! Task data model: the record, its enums, and the add-task input.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Format used for the Deadline column.
pub const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// How urgent the work is. Parsed case-insensitively everywhere: query
/// strings, JSON bodies and the task file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown priority: {s}"))
    }
}

impl TryFrom<String> for Priority {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Lifecycle status. Parsed like [`Priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A single tracked task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub assigned_to: String,
    pub kpi: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Stored text of the Deadline column. Operations always write
    /// [`DEADLINE_FORMAT`]; a hand-edited file may hold anything.
    pub deadline: String,
    pub note: String,
}

impl Task {
    /// Parsed deadline, `None` if the stored text is not a date.
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        super::urgency::parse_deadline(&self.deadline)
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// "ID - Title - AssignedTo", the label pickers show for a row.
    pub fn label(&self) -> String {
        format!("{} - {} - {}", self.id, self.title, self.assigned_to)
    }
}

/// Fields supplied when adding a task. The ID is assigned by the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub assigned_to: String,
    #[serde(default)]
    pub kpi: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub note: String,
}

impl NewTask {
    /// Start a task with the given title for `assigned_to`, due `deadline`.
    /// Defaults: Medium priority, To Do, empty KPI and note.
    pub fn new(title: impl Into<String>, assigned_to: impl Into<String>, deadline: NaiveDate) -> Self {
        Self {
            title: title.into(),
            assigned_to: assigned_to.into(),
            kpi: String::new(),
            priority: Priority::Medium,
            status: TaskStatus::ToDo,
            deadline,
            note: String::new(),
        }
    }

    pub fn with_kpi(mut self, kpi: impl Into<String>) -> Self {
        self.kpi = kpi.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Materialise into a stored task with the given ID.
    pub fn into_task(self, id: u64) -> Task {
        Task {
            id,
            title: self.title,
            assigned_to: self.assigned_to,
            kpi: self.kpi,
            priority: self.priority,
            status: self.status,
            deadline: format_deadline(self.deadline),
            note: self.note,
        }
    }
}

pub fn format_deadline(date: NaiveDate) -> String {
    date.format(DEADLINE_FORMAT).to_string()
}
