//! CSV-backed record store.
//!
//! The backing file holds one header row followed by one row per task:
//!
//! ```text
//! TaskID,Title,AssignedTo,KPI,Priority,Status,Deadline,Note
//! 1,Quarterly report,Lan Anh,3 drafts,High,In Progress,2024-05-01,
//! ```
//!
//! Every write rewrites the whole file. There is no locking and no atomic
//! rename: a writer in another process that persists between our load and
//! our persist loses its changes, and a crash mid-write can leave a
//! truncated file.

use std::collections::HashSet;
use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use super::model::{Priority, Task, TaskStatus};
use super::table::TaskTable;
use crate::error::StoreError;

/// Column names, in file order.
pub const COLUMNS: [&str; 8] = [
    "TaskID",
    "Title",
    "AssignedTo",
    "KPI",
    "Priority",
    "Status",
    "Deadline",
    "Note",
];

/// One CSV row, keyed by the file's column names.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    #[serde(rename = "TaskID")]
    task_id: u64,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "AssignedTo")]
    assigned_to: String,
    #[serde(rename = "KPI")]
    kpi: String,
    #[serde(rename = "Priority")]
    priority: Priority,
    #[serde(rename = "Status")]
    status: TaskStatus,
    #[serde(rename = "Deadline")]
    deadline: String,
    #[serde(rename = "Note")]
    note: String,
}

impl From<TaskRecord> for Task {
    fn from(r: TaskRecord) -> Self {
        Task {
            id: r.task_id,
            title: r.title,
            assigned_to: r.assigned_to,
            kpi: r.kpi,
            priority: r.priority,
            status: r.status,
            deadline: r.deadline,
            note: r.note,
        }
    }
}

impl From<&Task> for TaskRecord {
    fn from(t: &Task) -> Self {
        TaskRecord {
            task_id: t.id,
            title: t.title.clone(),
            assigned_to: t.assigned_to.clone(),
            kpi: t.kpi.clone(),
            priority: t.priority,
            status: t.status,
            deadline: t.deadline.clone(),
            note: t.note.clone(),
        }
    }
}

/// Owner of the backing file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table. A missing file is created with the header row and
    /// yields an empty table.
    pub async fn load(&self) -> Result<TaskTable, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let table = decode(&bytes).map_err(|reason| self.unavailable(reason))?;
                debug!(path = %self.path.display(), rows = table.len(), "Task file loaded");
                Ok(table)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let table = TaskTable::new();
                self.persist(&table).await?;
                info!(path = %self.path.display(), "Created empty task file");
                Ok(table)
            }
            Err(e) => Err(self.unavailable(e)),
        }
    }

    /// Load a table whose file must already exist. Never creates it.
    pub async fn load_existing(&self) -> Result<TaskTable, StoreError> {
        let bytes = fs::read(&self.path).await.map_err(|e| self.unavailable(e))?;
        decode(&bytes).map_err(|reason| self.unavailable(reason))
    }

    /// Overwrite the backing file with the whole table.
    pub async fn persist(&self, table: &TaskTable) -> Result<(), StoreError> {
        let bytes = encode(table).map_err(|e| self.unavailable(e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.unavailable(e))?;
        }
        fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.unavailable(e))?;

        debug!(path = %self.path.display(), rows = table.len(), "Task file written");
        Ok(())
    }

    fn unavailable(&self, reason: impl Display) -> StoreError {
        StoreError::Unavailable {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

fn decode(bytes: &[u8]) -> Result<TaskTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| format!("unreadable header: {e}"))?;
    if !headers.iter().eq(COLUMNS) {
        return Err(format!(
            "incompatible columns: expected [{}], found [{}]",
            COLUMNS.join(","),
            headers.iter().collect::<Vec<_>>().join(",")
        ));
    }

    let mut seen = HashSet::new();
    let mut tasks = Vec::new();
    for (index, row) in reader.deserialize::<TaskRecord>().enumerate() {
        // Header is line 1.
        let record = row.map_err(|e| format!("line {}: {e}", index + 2))?;
        if !seen.insert(record.task_id) {
            return Err(format!("duplicate TaskID {}", record.task_id));
        }
        tasks.push(Task::from(record));
    }

    Ok(TaskTable::from_tasks(tasks))
}

fn encode(table: &TaskTable) -> Result<Vec<u8>, csv::Error> {
    // The header is written by hand so an empty table still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for task in table {
        writer.serialize(TaskRecord::from(task))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::tasks::model::NewTask;

    const HEADER: &str = "TaskID,Title,AssignedTo,KPI,Priority,Status,Deadline,Note\n";

    fn store_in(dir: &tempfile::TempDir) -> TaskStore {
        TaskStore::new(dir.path().join("task.csv"))
    }

    #[tokio::test]
    async fn load_creates_missing_file_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let table = store.load().await.unwrap();
        assert!(table.is_empty());

        let written = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(written, HEADER);
    }

    #[tokio::test]
    async fn load_existing_rejects_missing_file_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let err = store.load_existing().await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn load_existing_reads_present_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), format!("{HEADER}4,Plan,Hoa,,Low,Done,2024-02-02,\n")).unwrap();

        let table = store.load_existing().await.unwrap();
        assert_eq!(table.get(4).map(|t| t.status), Some(TaskStatus::Done));
    }

    #[tokio::test]
    async fn load_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("data/nested/task.csv"));

        store.load().await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn load_parses_rows_and_keeps_raw_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let content = format!(
            "{HEADER}1,Report,Lan Anh,3 drafts,High,In Progress,2024-05-01,\"call, then write\"\n\
             2,Cleanup,Minh,,Low,To Do,sometime,\n"
        );
        std::fs::write(store.path(), content).unwrap();

        let table = store.load().await.unwrap();
        assert_eq!(table.len(), 2);

        let first = table.get(1).unwrap();
        assert_eq!(first.status, TaskStatus::InProgress);
        assert_eq!(first.note, "call, then write");
        assert_eq!(first.deadline_date(), NaiveDate::from_ymd_opt(2024, 5, 1));

        let second = table.get(2).unwrap();
        assert_eq!(second.deadline, "sometime");
        assert!(second.deadline_date().is_none());
        assert!(second.kpi.is_empty());
    }

    #[tokio::test]
    async fn load_rejects_incompatible_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "TaskID,Title,Owner\n1,x,y\n").unwrap();

        let err = store.load().await.unwrap_err();
        match err {
            StoreError::Unavailable { reason, .. } => assert!(reason.contains("incompatible columns")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_rejects_reordered_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            "Title,TaskID,AssignedTo,KPI,Priority,Status,Deadline,Note\n",
        )
        .unwrap();

        assert!(matches!(store.load().await, Err(StoreError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn load_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "").unwrap();

        assert!(matches!(store.load().await, Err(StoreError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn load_rejects_unknown_enum_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            format!("{HEADER}1,Report,Lan,,Urgent,To Do,2024-05-01,\n"),
        )
        .unwrap();

        match store.load().await.unwrap_err() {
            StoreError::Unavailable { reason, .. } => assert!(reason.starts_with("line 2")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            format!(
                "{HEADER}1,A,Lan,,High,To Do,2024-05-01,\n1,B,Minh,,Low,Done,2024-05-02,\n"
            ),
        )
        .unwrap();

        match store.load().await.unwrap_err() {
            StoreError::Unavailable { reason, .. } => assert!(reason.contains("duplicate TaskID 1")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_reports_unreadable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be.
        let store = TaskStore::new(dir.path());

        assert!(matches!(store.load().await, Err(StoreError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn persist_then_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let due = NaiveDate::from_ymd_opt(2024, 7, 9).unwrap();
        let table = TaskTable::from_tasks(vec![
            NewTask::new("Plan \"Q3\"", "Hoa", due)
                .with_note("line one\nline two")
                .into_task(1),
            NewTask::new("Review", "Tuan Anh", due)
                .with_status(TaskStatus::Done)
                .into_task(3),
        ]);

        store.persist(&table).await.unwrap();
        let first_bytes = std::fs::read(store.path()).unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, table);

        store.persist(&loaded).await.unwrap();
        assert_eq!(std::fs::read(store.path()).unwrap(), first_bytes);
        assert_eq!(store.load().await.unwrap(), table);
    }
}
