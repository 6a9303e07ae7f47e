//! Deadline reminders: message composition, transports, and the batch scan.

pub mod dispatcher;
pub mod message;
pub mod notifier;

pub use dispatcher::{ReminderDispatcher, ReminderFailure, ReminderReport, SentReminder};
pub use message::{Reminder, compose, recipient_for};
pub use notifier::{LogNotifier, Notifier, SmtpNotifier};
