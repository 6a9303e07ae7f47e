//! Mutation operations: add a task, and edit status, priority, or KPI and
//! deadline of an existing one.
//!
//! Each operation builds the next table, persists all of it, and only then
//! replaces the caller's table. On error the caller's table still matches
//! the file.

use chrono::NaiveDate;
use tracing::info;

use super::model::{NewTask, Priority, Task, TaskStatus, format_deadline};
use super::store::TaskStore;
use super::table::TaskTable;
use crate::error::StoreError;

impl TaskStore {
    /// Append a task with the next free ID and persist. Returns the stored task.
    pub async fn add_task(&self, table: &mut TaskTable, new: NewTask) -> Result<Task, StoreError> {
        let id = table.next_id().ok_or_else(|| StoreError::Unavailable {
            path: self.path().display().to_string(),
            reason: "TaskID space exhausted".to_string(),
        })?;
        let task = new.into_task(id);

        let mut next = table.clone();
        next.push(task.clone());
        self.commit(table, next).await?;

        info!(
            task_id = task.id,
            title = %task.title,
            assigned_to = %task.assigned_to,
            "Task added"
        );
        Ok(task)
    }

    pub async fn update_status(
        &self,
        table: &mut TaskTable,
        id: u64,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        let task = self.edit(table, id, |t| t.status = status).await?;
        info!(task_id = id, status = %status, "Task status updated");
        Ok(task)
    }

    pub async fn update_priority(
        &self,
        table: &mut TaskTable,
        id: u64,
        priority: Priority,
    ) -> Result<Task, StoreError> {
        let task = self.edit(table, id, |t| t.priority = priority).await?;
        info!(task_id = id, priority = %priority, "Task priority updated");
        Ok(task)
    }

    pub async fn update_kpi_deadline(
        &self,
        table: &mut TaskTable,
        id: u64,
        kpi: impl Into<String>,
        deadline: NaiveDate,
    ) -> Result<Task, StoreError> {
        let kpi = kpi.into();
        let task = self
            .edit(table, id, |t| {
                t.kpi = kpi;
                t.deadline = format_deadline(deadline);
            })
            .await?;
        info!(task_id = id, kpi = %task.kpi, deadline = %task.deadline, "Task KPI and deadline updated");
        Ok(task)
    }

    async fn edit(
        &self,
        table: &mut TaskTable,
        id: u64,
        apply: impl FnOnce(&mut Task),
    ) -> Result<Task, StoreError> {
        let mut next = table.clone();
        let task = next.get_mut(id).ok_or(StoreError::TaskNotFound { id })?;
        apply(task);
        let updated = task.clone();

        self.commit(table, next).await?;
        Ok(updated)
    }

    async fn commit(&self, table: &mut TaskTable, next: TaskTable) -> Result<(), StoreError> {
        self.persist(&next).await?;
        *table = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seeded(dir: &tempfile::TempDir) -> (TaskStore, TaskTable) {
        let store = TaskStore::new(dir.path().join("task.csv"));
        let mut table = store.load().await.unwrap();
        store
            .add_task(&mut table, NewTask::new("Report", "Lan Anh", date(2024, 5, 1)))
            .await
            .unwrap();
        store
            .add_task(
                &mut table,
                NewTask::new("Deploy", "Minh", date(2024, 5, 3)).with_priority(Priority::High),
            )
            .await
            .unwrap();
        (store, table)
    }

    #[tokio::test]
    async fn add_task_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task.csv"));
        let mut table = store.load().await.unwrap();

        let new = NewTask::new("Onboarding deck", "Thu Trang", date(2024, 9, 30))
            .with_kpi("20 slides")
            .with_priority(Priority::Low)
            .with_status(TaskStatus::InProgress)
            .with_note("ask design for template");
        let added = store.add_task(&mut table, new).await.unwrap();
        assert_eq!(added.id, 1);

        let reloaded = store.load().await.unwrap();
        let last = reloaded.tasks().last().unwrap();
        assert_eq!(last, &added);
        assert_eq!(last.deadline, "2024-09-30");
        assert_eq!(last.kpi, "20 slides");
        assert_eq!(last.note, "ask design for template");
        assert_eq!(reloaded, table);
    }

    #[tokio::test]
    async fn add_task_accepts_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task.csv"));
        let mut table = store.load().await.unwrap();

        let added = store
            .add_task(&mut table, NewTask::new("", "", date(2024, 1, 1)))
            .await
            .unwrap();
        assert_eq!(store.load().await.unwrap().get(added.id), Some(&added));
    }

    #[tokio::test]
    async fn add_task_continues_after_highest_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task.csv"));
        let due = date(2024, 1, 1);
        let mut table = TaskTable::from_tasks(vec![
            NewTask::new("a", "x", due).into_task(1),
            NewTask::new("b", "x", due).into_task(3),
            NewTask::new("c", "x", due).into_task(5),
        ]);

        let added = store.add_task(&mut table, NewTask::new("d", "y", due)).await.unwrap();
        assert_eq!(added.id, 6);
    }

    #[tokio::test]
    async fn add_task_fails_when_ids_are_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("task.csv"));
        let due = date(2024, 1, 1);
        let mut table = TaskTable::from_tasks(vec![NewTask::new("a", "x", due).into_task(u64::MAX)]);
        store.persist(&table).await.unwrap();
        let before = table.clone();
        let file_before = std::fs::read(store.path()).unwrap();

        let err = store
            .add_task(&mut table, NewTask::new("b", "y", due))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { ref reason, .. } if reason == "TaskID space exhausted"));
        assert_eq!(table, before);
        assert_eq!(std::fs::read(store.path()).unwrap(), file_before);
    }

    #[tokio::test]
    async fn update_status_changes_only_target_row() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut table) = seeded(&dir).await;
        let before = table.clone();

        let updated = store
            .update_status(&mut table, 2, TaskStatus::Done)
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);

        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded.get(1), before.get(1));
        let mut expected = before.get(2).unwrap().clone();
        expected.status = TaskStatus::Done;
        assert_eq!(reloaded.get(2), Some(&expected));
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found_and_leaves_table() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut table) = seeded(&dir).await;
        let before = table.clone();
        let file_before = std::fs::read(store.path()).unwrap();

        let err = store
            .update_status(&mut table, 99, TaskStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound { id: 99 }));

        let err = store
            .update_priority(&mut table, 99, Priority::Low)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound { id: 99 }));

        let err = store
            .update_kpi_deadline(&mut table, 99, "n/a", date(2025, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TaskNotFound { id: 99 }));

        assert_eq!(table, before);
        assert_eq!(std::fs::read(store.path()).unwrap(), file_before);
    }

    #[tokio::test]
    async fn update_priority_persists() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut table) = seeded(&dir).await;

        store
            .update_priority(&mut table, 1, Priority::High)
            .await
            .unwrap();
        assert_eq!(store.load().await.unwrap().get(1).unwrap().priority, Priority::High);
    }

    #[tokio::test]
    async fn update_kpi_deadline_sets_both_fields() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut table) = seeded(&dir).await;

        store
            .update_kpi_deadline(&mut table, 1, "2 drafts", date(2024, 12, 24))
            .await
            .unwrap();

        let task = store.load().await.unwrap().get(1).unwrap().clone();
        assert_eq!(task.kpi, "2 drafts");
        assert_eq!(task.deadline, "2024-12-24");
        assert_eq!(task.title, "Report");
    }

    #[tokio::test]
    async fn failed_persist_leaves_caller_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // The path is a directory, so every write fails.
        let store = TaskStore::new(dir.path());
        let mut table = TaskTable::new();

        let err = store
            .add_task(&mut table, NewTask::new("x", "y", date(2024, 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
        assert!(table.is_empty());
    }
}
