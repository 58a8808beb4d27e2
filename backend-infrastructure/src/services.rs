pub mod alert_service;
pub mod audit_log;
pub mod command_queue;

pub use alert_service::*;
pub use audit_log::*;
pub use command_queue::*;
