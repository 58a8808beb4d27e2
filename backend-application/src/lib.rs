// Backend Application Layer

pub mod cache;
pub mod commands;
pub mod error;
pub mod metrics;
pub mod state;

#[cfg(test)]
mod test_support;

pub use cache::TtlCache;
pub use commands::*;
pub use error::AppError;
pub use metrics::{Metrics, MetricsSnapshot};
pub use state::AppState;
