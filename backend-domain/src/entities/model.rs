use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorThresholds {
    pub high_frequency_threshold: usize,
    pub high_frequency_window_seconds: i64,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            high_frequency_threshold: 6,
            high_frequency_window_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AlertSettings {
    pub webhook_url: Option<String>,
    pub webhook_template: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub servers: Vec<String>,
    pub authorized_user_ids: Vec<String>,
    pub scan_window_seconds: i64,
    pub poll_interval_seconds: u64,
    pub alert_cooldown_seconds: i64,
    pub auto_rollback: bool,
    pub rollback_priority: u8,
    pub rollback_lookback_seconds: i64,
    pub alert: AlertSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            servers: vec!["default".to_string()],
            authorized_user_ids: Vec::new(),
            scan_window_seconds: 60,
            poll_interval_seconds: 10,
            alert_cooldown_seconds: 300,
            auto_rollback: false,
            rollback_priority: 1,
            rollback_lookback_seconds: 600,
            alert: AlertSettings::default(),
        }
    }
}

/// A command handed to the dispatch queue. Delivery to the game server is the
/// queue's concern; only the command text and its priority are decided here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedCommand {
    pub server_id: String,
    pub command: String,
    pub priority: u8,
    pub reason: String,
    pub original_log_id: String,
    pub queued_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RaidDetected,
    RollbackQueued,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub server_id: String,
    pub action: AuditAction,
    pub actor: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        server_id: impl Into<String>,
        action: AuditAction,
        actor: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            server_id: server_id.into(),
            action,
            actor: actor.into(),
            details,
            created_at: Utc::now(),
        }
    }
}
