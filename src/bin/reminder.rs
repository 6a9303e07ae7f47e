//! One reminder scan over the task file, then exit.
//!
//! Meant to be run by cron or a systemd timer. Exits non-zero if any task
//! could not be reminded.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use task_tracker::config::{ReminderConfig, SmtpConfig, StoreConfig};
use task_tracker::reminder::{LogNotifier, Notifier, ReminderDispatcher, SmtpNotifier};
use task_tracker::tasks::TaskStore;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Install rustls crypto provider before any TLS usage
    let _ = rustls::crypto::ring::default_provider().install_default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let store_config = StoreConfig::from_env();
    let reminder_config = ReminderConfig::from_env()?;

    let notifier: Arc<dyn Notifier> = if reminder_config.dry_run {
        tracing::info!("Dry run: reminders will be logged, not sent");
        Arc::new(LogNotifier)
    } else {
        let smtp = SmtpConfig::from_env()?;
        tracing::info!(host = %smtp.host, port = smtp.port, "Sending reminders via SMTP");
        Arc::new(SmtpNotifier::new(&smtp)?)
    };

    let store = TaskStore::new(store_config.path);
    // A missing file means a misconfigured path, not an empty table.
    let table = store.load_existing().await?;

    let dispatcher = ReminderDispatcher::new(notifier, reminder_config);
    let report = dispatcher.scan(&table, Local::now().date_naive()).await;

    for failure in &report.failures {
        eprintln!("✗ task {} ({}): {}", failure.task_id, failure.title, failure.error);
    }
    for sent in &report.sent {
        eprintln!("📧 task {} → {}", sent.task_id, sent.recipient);
    }

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
