pub mod completed;
pub mod config;
pub mod journal;
pub mod moves;
pub mod task;

pub use completed::*;
pub use config::*;
pub use journal::*;
pub use moves::*;
pub use task::*;
