use tracing::debug;

use crate::entities::{CommandLogEntry, Detection, DetectorThresholds};
use crate::services::detection_rules::{
    DetectionRule, HighFrequencyRule, MassActionRule, ScanBatch, UnauthorizedRule,
};
use crate::value_objects::{MassTargets, SensitiveVerbs};

#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    pub sensitive_verbs: SensitiveVerbs,
    pub mass_targets: MassTargets,
    pub thresholds: DetectorThresholds,
}

/// Scans a batch of command logs for raid patterns.
///
/// Holds only configuration; every call to [`RaidDetector::scan`] is a pure
/// function of its arguments, so one detector can be shared across tasks.
#[derive(Debug)]
pub struct RaidDetector {
    sensitive_verbs: SensitiveVerbs,
    rules: Vec<Box<dyn DetectionRule>>,
}

impl RaidDetector {
    pub fn new(config: DetectorConfig) -> Self {
        let rules: Vec<Box<dyn DetectionRule>> = vec![
            Box::new(HighFrequencyRule::new(
                config.thresholds.high_frequency_threshold,
                config.thresholds.high_frequency_window_seconds,
            )),
            Box::new(MassActionRule::new(config.mass_targets)),
            Box::new(UnauthorizedRule),
        ];
        Self {
            sensitive_verbs: config.sensitive_verbs,
            rules,
        }
    }

    pub fn with_rule(mut self, rule: impl DetectionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn sensitive_verbs(&self) -> &SensitiveVerbs {
        &self.sensitive_verbs
    }

    /// An empty `authorized_user_ids` slice means no actor is trusted.
    pub fn scan(&self, logs: &[CommandLogEntry], authorized_user_ids: &[String]) -> Vec<Detection> {
        if logs.is_empty() {
            return Vec::new();
        }
        let batch = ScanBatch::new(logs, &self.sensitive_verbs, authorized_user_ids);
        let mut detections = Vec::new();
        for rule in &self.rules {
            let found = rule.evaluate(&batch);
            if !found.is_empty() {
                debug!(rule = rule.name(), count = found.len(), "rule matched");
            }
            detections.extend(found);
        }
        debug!(
            logs = logs.len(),
            skipped = batch.skipped(),
            detections = detections.len(),
            "raid scan finished"
        );
        detections
    }
}

impl Default for RaidDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
