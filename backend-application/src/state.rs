use std::sync::Arc;

use backend_domain::ports::{AlertService, AuditLog, CommandLogSource, CommandQueue};
use backend_domain::services::{RaidDetector, RollbackPlanner};
use backend_domain::RuntimeConfig;
use tokio::sync::Mutex;

use crate::{Metrics, TtlCache};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub log_source: Arc<dyn CommandLogSource>,
    pub alert_service: Arc<dyn AlertService>,
    pub command_queue: Arc<dyn CommandQueue>,
    pub audit_log: Arc<dyn AuditLog>,
    pub detector: Arc<RaidDetector>,
    pub planner: Arc<RollbackPlanner>,
    /// `server_id|fingerprint` -> unix seconds the alert first fired.
    pub alert_cooldowns: Arc<Mutex<TtlCache<String, i64>>>,
    /// `server_id|log key` -> unix seconds the entry was last rolled back.
    pub rollback_ledger: Arc<Mutex<TtlCache<String, i64>>>,
    pub metrics: Arc<Metrics>,
}
