use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{AlertSettings, DetectorThresholds, RuntimeConfig};

use crate::config::validate_webhook_url;

pub const CONFIG_ENV: &str = "RAIDGUARD_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub servers: Vec<String>,
    pub authorized_user_ids: Vec<String>,
    pub logs_dir: String,
    pub verb_rules_path: String,
    pub queue_path: String,
    pub audit_log_path: String,
    pub high_frequency_threshold: usize,
    pub high_frequency_window_seconds: i64,
    pub scan_window_seconds: i64,
    pub poll_interval_seconds: u64,
    pub alert_cooldown_seconds: i64,
    pub auto_rollback: bool,
    pub rollback_priority: u8,
    pub rollback_lookback_seconds: i64,
    pub alert_webhook_url: Option<String>,
    pub alert_webhook_template: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let thresholds = DetectorThresholds::default();
        Self {
            servers: vec!["default".to_string()],
            authorized_user_ids: Vec::new(),
            logs_dir: "./logs".to_string(),
            verb_rules_path: "./verb_rules.yaml".to_string(),
            queue_path: "./queue/commands.jsonl".to_string(),
            audit_log_path: "./audit/audit.jsonl".to_string(),
            high_frequency_threshold: thresholds.high_frequency_threshold,
            high_frequency_window_seconds: thresholds.high_frequency_window_seconds,
            scan_window_seconds: 60,
            poll_interval_seconds: 10,
            alert_cooldown_seconds: 300,
            auto_rollback: false,
            rollback_priority: 1,
            rollback_lookback_seconds: 600,
            alert_webhook_url: None,
            alert_webhook_template: None,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::from_toml(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        self.servers = normalize_id_list(
            std::mem::take(&mut self.servers)
                .into_iter()
                .map(|server| server.to_lowercase())
                .collect(),
        );
        self.authorized_user_ids =
            normalize_id_list(std::mem::take(&mut self.authorized_user_ids));
        if let Some(url) = &self.alert_webhook_url {
            if url.trim().is_empty() {
                self.alert_webhook_url = None;
            }
        }
        if let Some(template) = &self.alert_webhook_template {
            if template.trim().is_empty() {
                self.alert_webhook_template = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.logs_dir = resolve_path(base, &self.logs_dir);
        self.verb_rules_path = resolve_path(base, &self.verb_rules_path);
        self.queue_path = resolve_path(base, &self.queue_path);
        self.audit_log_path = resolve_path(base, &self.audit_log_path);
    }

    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(anyhow!("at least one server must be configured"));
        }
        if self.high_frequency_threshold == 0 {
            return Err(anyhow!("high_frequency_threshold must be greater than 0"));
        }
        if self.high_frequency_window_seconds < 0 {
            return Err(anyhow!("high_frequency_window_seconds must not be negative"));
        }
        if self.scan_window_seconds <= 0 || self.rollback_lookback_seconds <= 0 {
            return Err(anyhow!(
                "scan_window_seconds and rollback_lookback_seconds must be greater than 0"
            ));
        }
        if self.poll_interval_seconds == 0 {
            return Err(anyhow!("poll_interval_seconds must be greater than 0"));
        }
        if self.alert_cooldown_seconds < 0 {
            return Err(anyhow!("alert_cooldown_seconds must not be negative"));
        }
        if self.logs_dir.trim().is_empty() {
            return Err(anyhow!("logs_dir must not be empty"));
        }
        if let Some(url) = &self.alert_webhook_url {
            validate_webhook_url(url)?;
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            servers: self.servers.clone(),
            authorized_user_ids: self.authorized_user_ids.clone(),
            scan_window_seconds: self.scan_window_seconds,
            poll_interval_seconds: self.poll_interval_seconds,
            alert_cooldown_seconds: self.alert_cooldown_seconds,
            auto_rollback: self.auto_rollback,
            rollback_priority: self.rollback_priority,
            rollback_lookback_seconds: self.rollback_lookback_seconds,
            alert: AlertSettings {
                webhook_url: self.alert_webhook_url.clone(),
                webhook_template: self.alert_webhook_template.clone(),
                request_timeout_seconds: self.request_timeout_seconds,
            },
        }
    }

    pub fn to_detector_thresholds(&self) -> DetectorThresholds {
        DetectorThresholds {
            high_frequency_threshold: self.high_frequency_threshold,
            high_frequency_window_seconds: self.high_frequency_window_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("RAIDGUARD_SERVERS") {
            self.servers = parse_env_id_list(&value);
        }
        if let Ok(value) = env::var("RAIDGUARD_AUTHORIZED_USER_IDS") {
            self.authorized_user_ids = parse_env_id_list(&value);
        }
        if let Ok(value) = env::var("RAIDGUARD_LOGS_DIR") {
            self.logs_dir = value;
        }
        if let Ok(value) = env::var("RAIDGUARD_VERB_RULES_PATH") {
            self.verb_rules_path = value;
        }
        if let Ok(value) = env::var("RAIDGUARD_QUEUE_PATH") {
            self.queue_path = value;
        }
        if let Ok(value) = env::var("RAIDGUARD_AUDIT_LOG_PATH") {
            self.audit_log_path = value;
        }
        if let Ok(value) = env::var("RAIDGUARD_HIGH_FREQUENCY_THRESHOLD") {
            self.high_frequency_threshold = value.parse().unwrap_or(self.high_frequency_threshold);
        }
        if let Ok(value) = env::var("RAIDGUARD_HIGH_FREQUENCY_WINDOW_SECONDS") {
            self.high_frequency_window_seconds =
                value.parse().unwrap_or(self.high_frequency_window_seconds);
        }
        if let Ok(value) = env::var("RAIDGUARD_SCAN_WINDOW_SECONDS") {
            self.scan_window_seconds = value.parse().unwrap_or(self.scan_window_seconds);
        }
        if let Ok(value) = env::var("RAIDGUARD_POLL_INTERVAL_SECONDS") {
            self.poll_interval_seconds = value.parse().unwrap_or(self.poll_interval_seconds);
        }
        if let Ok(value) = env::var("RAIDGUARD_ALERT_COOLDOWN_SECONDS") {
            self.alert_cooldown_seconds = value.parse().unwrap_or(self.alert_cooldown_seconds);
        }
        if let Ok(value) = env::var("RAIDGUARD_AUTO_ROLLBACK") {
            self.auto_rollback = value.parse().unwrap_or(self.auto_rollback);
        }
        if let Ok(value) = env::var("RAIDGUARD_ROLLBACK_PRIORITY") {
            self.rollback_priority = value.parse().unwrap_or(self.rollback_priority);
        }
        if let Ok(value) = env::var("RAIDGUARD_ROLLBACK_LOOKBACK_SECONDS") {
            self.rollback_lookback_seconds =
                value.parse().unwrap_or(self.rollback_lookback_seconds);
        }
        if let Ok(value) = env::var("RAIDGUARD_ALERT_WEBHOOK_URL") {
            self.alert_webhook_url = Some(value);
        }
        if let Ok(value) = env::var("RAIDGUARD_ALERT_WEBHOOK_TEMPLATE") {
            self.alert_webhook_template = Some(value);
        }
        if let Ok(value) = env::var("RAIDGUARD_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn parse_env_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_id_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
