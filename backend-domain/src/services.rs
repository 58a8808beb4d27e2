// Pure domain services
pub mod detection_rules;
pub mod raid_detector;
pub mod rollback_planner;

pub use detection_rules::*;
pub use raid_detector::*;
pub use rollback_planner::*;
