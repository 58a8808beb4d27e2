pub mod rollback_commands;
pub mod scan_commands;

pub use rollback_commands::*;
pub use scan_commands::*;
