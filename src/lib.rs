//! Task Tracker: CSV-backed task records, a JSON dashboard API, and
//! deadline reminders by email.

pub mod api;
pub mod config;
pub mod error;
pub mod reminder;
pub mod tasks;
