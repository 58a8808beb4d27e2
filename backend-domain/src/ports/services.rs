use async_trait::async_trait;

use crate::entities::{AlertSettings, AuditEntry, Detection, QueuedCommand};

#[async_trait]
pub trait AlertService: Send + Sync {
    fn spawn_alerts(&self, settings: AlertSettings, server_id: String, detections: Vec<Detection>);
    async fn check_alert_target(&self, settings: &AlertSettings) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CommandQueue: Send + Sync {
    async fn enqueue(&self, commands: &[QueuedCommand]) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> anyhow::Result<()>;
}
