use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use backend_domain::ports::AuditLog;
use backend_domain::AuditEntry;

use crate::utils::append_json_lines;

pub struct JsonlAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AuditLog for JsonlAuditLog {
    async fn record(&self, entry: AuditEntry) -> anyhow::Result<()> {
        info!(
            server_id = %entry.server_id,
            action = ?entry.action,
            actor = %entry.actor,
            "audit"
        );
        let _guard = self.write_lock.lock().await;
        append_json_lines(&self.path, std::slice::from_ref(&entry)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::AuditAction;

    #[tokio::test]
    async fn record_writes_one_line_per_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("audit.jsonl");
        let log = JsonlAuditLog::new(&path);
        log.record(AuditEntry::new(
            "main",
            AuditAction::RaidDetected,
            "raid-monitor",
            serde_json::json!({"type": "MASS_ACTION"}),
        ))
        .await
        .expect("record");
        log.record(AuditEntry::new(
            "main",
            AuditAction::RollbackQueued,
            "mod-1",
            serde_json::json!({"count": 2}),
        ))
        .await
        .expect("record");

        let content = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).expect("json"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["action"], "RAID_DETECTED");
        assert_eq!(lines[1]["actor"], "mod-1");
        assert_eq!(lines[1]["details"]["count"], 2);
    }
}
