//! Recipient derivation and reminder text.

use crate::tasks::Task;

/// A composed reminder, ready for a [`Notifier`](super::Notifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// `lowercase(remove_whitespace(assigned_to)) + "@" + domain`.
pub fn recipient_for(assigned_to: &str, domain: &str) -> String {
    let local: String = assigned_to
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{local}@{domain}")
}

/// Build the reminder for `task`, which is `days_left` days from its deadline.
pub fn compose(task: &Task, days_left: i64, domain: &str) -> Reminder {
    let subject = if days_left < 0 {
        format!("[OVERDUE] Task overdue: {}", task.title)
    } else {
        format!("[REMINDER] Task due soon: {}", task.title)
    };

    let body = format!(
        "Hello {who},\n\
         \n\
         You have a task: {title}\n\
         - Status: {status}\n\
         - Deadline: {deadline}\n\
         - Priority: {priority}\n\
         - Note: {note}\n\
         \n\
         Please update or finish the task on time.\n\
         \n\
         Regards,\n\
         Task Tracker\n",
        who = task.assigned_to,
        title = task.title,
        status = task.status,
        deadline = task.deadline,
        priority = task.priority,
        note = task.note,
    );

    Reminder {
        recipient: recipient_for(&task.assigned_to, domain),
        subject,
        body,
    }
}
