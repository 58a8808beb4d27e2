use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info, warn};

use backend_domain::{AuditAction, AuditEntry, CommandLogEntry, Detection, QueuedCommand};

use crate::commands::rollback_commands::{not_yet_rolled_back, queue_reversals};
use crate::{AppError, AppState};

const AUTO_ROLLBACK_ACTOR: &str = "raid-monitor";

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub server_id: String,
    pub scanned_at: i64,
    pub logs_scanned: usize,
    pub detections: Vec<Detection>,
    /// Detections not seen within the alert cooldown; only these are alerted.
    pub fresh: Vec<Detection>,
    pub queued: Vec<QueuedCommand>,
}

/// One polling tick for one server: fetch the recent window, scan it, alert on
/// new findings, and optionally roll back the offenders.
///
/// Alerts honor the cooldown; auto rollback does not. Every detected actor's
/// commands are reversed, except entries already rolled back earlier.
pub async fn run_raid_scan(
    state: &AppState,
    server_id: &str,
    now: i64,
) -> Result<ScanReport, AppError> {
    let server_id = server_id.trim().to_lowercase();
    if server_id.is_empty() {
        return Err(AppError::BadRequest("server_id must not be empty".to_string()));
    }

    let since = now.saturating_sub(state.config.scan_window_seconds);
    let logs = match state.log_source.fetch_logs(&server_id, since, now).await {
        Ok(logs) => logs,
        Err(err) => {
            state.metrics.record_scan_error();
            error!("failed to fetch command logs for {}: {}", server_id, err);
            return Err(AppError::Internal(err));
        }
    };

    let detections = state
        .detector
        .scan(&logs, &state.config.authorized_user_ids);
    let fresh = filter_fresh(state, &server_id, &detections, now).await;
    state
        .metrics
        .record_scan(logs.len(), detections.len(), detections.len() - fresh.len());

    if !fresh.is_empty() {
        warn!(
            server_id = %server_id,
            detections = detections.len(),
            fresh = fresh.len(),
            "raid activity detected"
        );
        for detection in &fresh {
            let details = serde_json::to_value(detection).map_err(anyhow::Error::from)?;
            let entry = AuditEntry::new(
                server_id.as_str(),
                AuditAction::RaidDetected,
                detection.user_id(),
                details,
            );
            if let Err(err) = state.audit_log.record(entry).await {
                warn!("failed to write raid audit entry: {}", err);
            }
        }
        state.alert_service.spawn_alerts(
            state.config.alert.clone(),
            server_id.clone(),
            fresh.clone(),
        );
    }

    let queued = if state.config.auto_rollback && !detections.is_empty() {
        let offenders: HashSet<&str> = detections.iter().map(|d| d.user_id()).collect();
        let offender_logs: Vec<CommandLogEntry> = logs
            .iter()
            .filter(|entry| offenders.contains(entry.player_id.as_str()))
            .cloned()
            .collect();
        let mut pending = not_yet_rolled_back(state, &server_id, offender_logs, now).await;
        pending.sort_by_key(|entry| entry.prc_timestamp);
        if pending.is_empty() {
            Vec::new()
        } else {
            let (_, queued) = queue_reversals(
                state,
                &server_id,
                &pending,
                state.config.rollback_priority,
                AUTO_ROLLBACK_ACTOR,
                now,
            )
            .await?;
            if !queued.is_empty() {
                info!(
                    server_id = %server_id,
                    offenders = offenders.len(),
                    queued = queued.len(),
                    "auto rollback queued"
                );
            }
            queued
        }
    } else {
        Vec::new()
    };

    Ok(ScanReport {
        server_id,
        scanned_at: now,
        logs_scanned: logs.len(),
        detections,
        fresh,
        queued,
    })
}

async fn filter_fresh(
    state: &AppState,
    server_id: &str,
    detections: &[Detection],
    now: i64,
) -> Vec<Detection> {
    let ttl = state.config.alert_cooldown_seconds;
    let mut cooldowns = state.alert_cooldowns.lock().await;
    cooldowns.purge_expired(now);
    detections
        .iter()
        .filter(|detection| {
            let key = format!("{}|{}", server_id, detection.fingerprint());
            if cooldowns.contains_live(&key, now) {
                return false;
            }
            cooldowns.insert(key, now, ttl, now);
            true
        })
        .cloned()
        .collect()
}
