// Domain value objects
pub mod command;
pub mod risk_level;
pub mod verb_tables;

pub use command::*;
pub use risk_level::*;
pub use verb_tables::*;
