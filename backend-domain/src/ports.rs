// Collaborator Port Traits (Interfaces)
// Define what the callers of the domain services need from infrastructure

pub mod repositories;
pub mod services;

pub use repositories::*;
pub use services::*;
