pub mod command_logs;
pub mod config_files;

pub use command_logs::*;
pub use config_files::*;
