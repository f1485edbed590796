pub mod config;
pub mod names;
pub mod predicate;

pub use config::config_command;
pub use names::{lookup_table_command, names_command};
pub use predicate::predicate_command;
