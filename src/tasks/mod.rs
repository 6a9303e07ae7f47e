//! Task records: model, CSV store, mutations, urgency and views.

pub mod model;
pub mod ops;
pub mod store;
pub mod table;
pub mod urgency;
pub mod views;

pub use model::{NewTask, Priority, Task, TaskStatus};
pub use store::TaskStore;
pub use table::TaskTable;
pub use urgency::{Urgency, classify};
pub use views::TaskFilter;
