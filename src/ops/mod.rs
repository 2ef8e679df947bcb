pub mod check;
pub mod forest;
pub mod gesture;
pub mod query;
pub mod reorder;
pub mod task_ops;
