// Domain entities
pub mod command_log;
pub mod detection;
pub mod model;
pub mod reversal;

pub use command_log::*;
pub use detection::*;
pub use model::*;
pub use reversal::*;
