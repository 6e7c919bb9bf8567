pub mod config;
pub mod pms;
pub mod run;

pub use config::config_command;
pub use pms::pms_command;
pub use run::run_command;
