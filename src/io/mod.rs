pub mod config_io;
pub mod journal_io;
pub mod lock;
pub mod recovery;
pub mod store;
