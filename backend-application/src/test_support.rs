// In-memory port fakes for use case tests

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use backend_domain::ports::{AlertService, AuditLog, CommandLogSource, CommandQueue};
use backend_domain::services::{RaidDetector, RollbackPlanner};
use backend_domain::{
    AlertSettings, AuditEntry, CommandLogEntry, Detection, QueuedCommand, RuntimeConfig,
};
use tokio::sync::Mutex;

use crate::{AppState, Metrics, TtlCache};

pub fn entry(id: &str, player: &str, command: &str, ts: i64) -> CommandLogEntry {
    CommandLogEntry::new(id, player, command, ts)
}

pub struct MemoryLogSource {
    server_id: String,
    logs: Vec<CommandLogEntry>,
    fail: bool,
}

#[async_trait]
impl CommandLogSource for MemoryLogSource {
    async fn fetch_logs(
        &self,
        server_id: &str,
        since: i64,
        until: i64,
    ) -> anyhow::Result<Vec<CommandLogEntry>> {
        if self.fail {
            anyhow::bail!("log store unavailable");
        }
        if server_id != self.server_id {
            return Ok(Vec::new());
        }
        Ok(self
            .logs
            .iter()
            .filter(|entry| entry.prc_timestamp >= since && entry.prc_timestamp <= until)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    batches: StdMutex<Vec<(String, Vec<Detection>)>>,
}

impl RecordingAlerts {
    pub fn batches(&self) -> Vec<(String, Vec<Detection>)> {
        self.batches.lock().expect("alerts lock").clone()
    }
}

#[async_trait]
impl AlertService for RecordingAlerts {
    fn spawn_alerts(&self, _settings: AlertSettings, server_id: String, detections: Vec<Detection>) {
        self.batches
            .lock()
            .expect("alerts lock")
            .push((server_id, detections));
    }

    async fn check_alert_target(&self, _settings: &AlertSettings) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryQueue {
    commands: StdMutex<Vec<QueuedCommand>>,
}

impl MemoryQueue {
    pub fn commands(&self) -> Vec<QueuedCommand> {
        self.commands.lock().expect("queue lock").clone()
    }
}

#[async_trait]
impl CommandQueue for MemoryQueue {
    async fn enqueue(&self, commands: &[QueuedCommand]) -> anyhow::Result<()> {
        self.commands
            .lock()
            .expect("queue lock")
            .extend_from_slice(commands);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAudit {
    entries: StdMutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().expect("audit lock").clone()
    }
}

#[async_trait]
impl AuditLog for MemoryAudit {
    async fn record(&self, entry: AuditEntry) -> anyhow::Result<()> {
        self.entries.lock().expect("audit lock").push(entry);
        Ok(())
    }
}

pub struct Harness {
    pub state: AppState,
    pub alerts: Arc<RecordingAlerts>,
    pub queue: Arc<MemoryQueue>,
    pub audit: Arc<MemoryAudit>,
}

impl Harness {
    pub fn with_logs(server_id: &str, logs: Vec<CommandLogEntry>) -> Self {
        Self::build(MemoryLogSource {
            server_id: server_id.to_string(),
            logs,
            fail: false,
        })
    }

    pub fn failing_source() -> Self {
        Self::build(MemoryLogSource {
            server_id: String::new(),
            logs: Vec::new(),
            fail: true,
        })
    }

    fn build(source: MemoryLogSource) -> Self {
        let alerts = Arc::new(RecordingAlerts::default());
        let queue = Arc::new(MemoryQueue::default());
        let audit = Arc::new(MemoryAudit::default());
        let state = AppState {
            config: RuntimeConfig::default(),
            log_source: Arc::new(source),
            alert_service: alerts.clone(),
            command_queue: queue.clone(),
            audit_log: audit.clone(),
            detector: Arc::new(RaidDetector::default()),
            planner: Arc::new(RollbackPlanner::default()),
            alert_cooldowns: Arc::new(Mutex::new(TtlCache::new())),
            rollback_ledger: Arc::new(Mutex::new(TtlCache::new())),
            metrics: Arc::new(Metrics::default()),
        };
        Self {
            state,
            alerts,
            queue,
            audit,
        }
    }
}
