//! Batch reminder scan.
//!
//! Stateless: nothing records which reminders went out, so running the scan
//! twice over the same table notifies everyone twice.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use super::message::{Reminder, compose};
use super::notifier::Notifier;
use crate::config::ReminderConfig;
use crate::error::{NotifyError, ReminderError};
use crate::tasks::TaskTable;

/// A reminder that was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReminder {
    pub task_id: u64,
    pub recipient: String,
}

/// A task the scan could not remind about.
#[derive(Debug)]
pub struct ReminderFailure {
    pub task_id: u64,
    pub title: String,
    pub error: ReminderError,
}

/// Outcome of one scan.
#[derive(Debug, Default)]
pub struct ReminderReport {
    pub examined: usize,
    pub skipped_done: usize,
    pub not_due: usize,
    pub sent: Vec<SentReminder>,
    pub failures: Vec<ReminderFailure>,
}

impl ReminderReport {
    /// Tasks handed to the transport, successfully or not.
    pub fn attempted(&self) -> usize {
        self.sent.len()
            + self
                .failures
                .iter()
                .filter(|f| matches!(f.error, ReminderError::Transport(_)))
                .count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct ReminderDispatcher {
    notifier: Arc<dyn Notifier>,
    config: ReminderConfig,
}

impl ReminderDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, config: ReminderConfig) -> Self {
        Self { notifier, config }
    }

    /// Remind the owner of every unfinished task due within the warning
    /// window, overdue ones included. Per-task problems are recorded in the
    /// report and never stop the scan.
    pub async fn scan(&self, table: &TaskTable, today: NaiveDate) -> ReminderReport {
        let mut report = ReminderReport::default();

        for task in table {
            report.examined += 1;

            if task.is_done() {
                report.skipped_done += 1;
                continue;
            }

            let Some(deadline) = task.deadline_date() else {
                warn!(
                    task_id = task.id,
                    title = %task.title,
                    deadline = %task.deadline,
                    "Skipping task with invalid deadline"
                );
                report.failures.push(ReminderFailure {
                    task_id: task.id,
                    title: task.title.clone(),
                    error: ReminderError::InvalidDate {
                        value: task.deadline.clone(),
                    },
                });
                continue;
            };

            let days_left = (deadline - today).num_days();
            if days_left > self.config.warning_days {
                report.not_due += 1;
                continue;
            }

            let reminder = compose(task, days_left, &self.config.company_domain);
            match self.deliver(task.id, &reminder).await {
                Ok(()) => {
                    info!(
                        task_id = task.id,
                        recipient = %reminder.recipient,
                        days_left,
                        "Reminder sent"
                    );
                    report.sent.push(SentReminder {
                        task_id: task.id,
                        recipient: reminder.recipient,
                    });
                }
                Err(e) => {
                    error!(
                        task_id = task.id,
                        title = %task.title,
                        recipient = %reminder.recipient,
                        error = %e,
                        "Failed to send reminder"
                    );
                    report.failures.push(ReminderFailure {
                        task_id: task.id,
                        title: task.title.clone(),
                        error: e.into(),
                    });
                }
            }
        }

        info!(
            notifier = self.notifier.name(),
            examined = report.examined,
            sent = report.sent.len(),
            failed = report.failures.len(),
            "Reminder scan finished"
        );
        report
    }

    /// Send once, and once more if the first failure looks transient.
    async fn deliver(&self, task_id: u64, reminder: &Reminder) -> Result<(), NotifyError> {
        match self.notifier.send(reminder).await {
            Err(e) if e.is_transient() => {
                warn!(task_id, error = %e, "Transient send failure, retrying once");
                self.notifier.send(reminder).await
            }
            other => other,
        }
    }
}
