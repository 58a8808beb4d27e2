// Detection entity
// A single raid finding produced by one detection rule

use serde::{Deserialize, Serialize};

use crate::value_objects::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum DetectionKind {
    HighFrequency,
    MassAction,
    Unauthorized,
}

impl DetectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionKind::HighFrequency => "HIGH_FREQUENCY",
            DetectionKind::MassAction => "MASS_ACTION",
            DetectionKind::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl std::fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged on the wire as `{"type": "HIGH_FREQUENCY", "userId": ..., ...}`.
/// New heuristics add a variant carrying their own evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
#[non_exhaustive]
pub enum Detection {
    HighFrequency {
        user_id: String,
        command_count: usize,
        window_seconds: i64,
        first_timestamp: i64,
        last_timestamp: i64,
    },
    MassAction {
        user_id: String,
        command: String,
        timestamp: i64,
    },
    Unauthorized {
        user_id: String,
        command: String,
        timestamp: i64,
        occurrences: usize,
    },
}

impl Detection {
    pub fn kind(&self) -> DetectionKind {
        match self {
            Detection::HighFrequency { .. } => DetectionKind::HighFrequency,
            Detection::MassAction { .. } => DetectionKind::MassAction,
            Detection::Unauthorized { .. } => DetectionKind::Unauthorized,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Detection::HighFrequency { user_id, .. }
            | Detection::MassAction { user_id, .. }
            | Detection::Unauthorized { user_id, .. } => user_id,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            Detection::HighFrequency { .. } | Detection::MassAction { .. } => RiskLevel::High,
            Detection::Unauthorized { .. } => RiskLevel::Medium,
        }
    }

    /// Stable identity of the finding: type, actor and the evidence that makes
    /// it distinct. Two scans over overlapping windows yield the same key.
    pub fn fingerprint(&self) -> String {
        match self {
            Detection::HighFrequency { user_id, .. } | Detection::Unauthorized { user_id, .. } => {
                format!("{}|{}", self.kind(), user_id)
            }
            Detection::MassAction {
                user_id, command, ..
            } => format!("{}|{}|{}", self.kind(), user_id, command.to_lowercase()),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Detection::HighFrequency {
                user_id,
                command_count,
                window_seconds,
                ..
            } => format!(
                "{} issued {} sensitive commands within {}s",
                user_id, command_count, window_seconds
            ),
            Detection::MassAction {
                user_id, command, ..
            } => format!("{} ran mass command '{}'", user_id, command),
            Detection::Unauthorized {
                user_id,
                command,
                occurrences,
                ..
            } => format!(
                "{} is not authorized for '{}' ({} sensitive command(s))",
                user_id, command, occurrences
            ),
        }
    }
}
