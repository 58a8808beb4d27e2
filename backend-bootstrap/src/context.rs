use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::info;

use backend_application::{AppState, Metrics, TtlCache};
use backend_domain::{
    DetectorConfig, RaidDetector, RollbackPlanner, VerbRuleRepository, VerbRules,
};
use backend_infrastructure::{
    AppConfig, ConfigFileRepository, JsonlAuditLog, JsonlCommandLogSource, JsonlCommandQueue,
    WebhookAlertService,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let rules = ConfigFileRepository::new()
            .load_verb_rules(&config.verb_rules_path)
            .await?;
        Ok(Self::from_parts(&config, &rules))
    }

    pub fn from_parts(config: &AppConfig, rules: &VerbRules) -> Self {
        let detector = RaidDetector::new(DetectorConfig {
            sensitive_verbs: rules.sensitive_verbs(),
            mass_targets: rules.mass_targets(),
            thresholds: config.to_detector_thresholds(),
        });
        let planner = RollbackPlanner::new(rules.inversion_table());
        info!(
            servers = config.servers.len(),
            sensitive_verbs = ?detector.sensitive_verbs().to_sorted_vec(),
            rules = ?detector.rule_names(),
            "raid detector ready"
        );

        let state = AppState {
            config: config.to_runtime_config(),
            log_source: Arc::new(JsonlCommandLogSource::new(&config.logs_dir)),
            alert_service: Arc::new(WebhookAlertService::new()),
            command_queue: Arc::new(JsonlCommandQueue::new(&config.queue_path)),
            audit_log: Arc::new(JsonlAuditLog::new(&config.audit_log_path)),
            detector: Arc::new(detector),
            planner: Arc::new(planner),
            alert_cooldowns: Arc::new(Mutex::new(TtlCache::new())),
            rollback_ledger: Arc::new(Mutex::new(TtlCache::new())),
            metrics: Arc::new(Metrics::default()),
        };

        Self { state }
    }
}
