use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use backend_domain::{AuditAction, AuditEntry, CommandLogEntry, QueuedCommand, ReversalAction};

use crate::{AppError, AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct RollbackRequest {
    pub server_id: String,
    pub player_id: String,
    #[serde(default)]
    pub lookback_seconds: Option<i64>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub requested_by: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollbackOutcome {
    pub server_id: String,
    pub player_id: String,
    pub logs_considered: usize,
    pub reversals: Vec<ReversalAction>,
    pub queued: Vec<QueuedCommand>,
}

/// Undo everything `player_id` did on `server_id` during the lookback window.
pub async fn rollback_player_actions(
    state: &AppState,
    request: RollbackRequest,
    now: i64,
) -> Result<RollbackOutcome, AppError> {
    let server_id = normalize_required_text(&request.server_id, "server_id")?.to_lowercase();
    let player_id = normalize_required_text(&request.player_id, "player_id")?;
    let lookback = request
        .lookback_seconds
        .unwrap_or(state.config.rollback_lookback_seconds);
    if lookback <= 0 {
        return Err(AppError::BadRequest(
            "lookback_seconds must be greater than 0".to_string(),
        ));
    }
    let priority = request.priority.unwrap_or(state.config.rollback_priority);
    let requested_by = request
        .requested_by
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("operator")
        .to_string();

    state.metrics.record_rollback_request();
    let logs = state
        .log_source
        .fetch_logs(&server_id, now.saturating_sub(lookback), now)
        .await
        .map_err(|err| {
            error!("failed to fetch command logs for {}: {}", server_id, err);
            AppError::Internal(err)
        })?;

    let mut player_logs: Vec<CommandLogEntry> = logs
        .into_iter()
        .filter(|entry| entry.player_id.trim() == player_id)
        .collect();
    player_logs.sort_by_key(|entry| entry.prc_timestamp);

    let (reversals, queued) =
        queue_reversals(state, &server_id, &player_logs, priority, &requested_by, now).await?;
    info!(
        server_id = %server_id,
        player_id = %player_id,
        logs = player_logs.len(),
        reversals = reversals.len(),
        "rollback planned"
    );

    Ok(RollbackOutcome {
        server_id,
        player_id,
        logs_considered: player_logs.len(),
        reversals,
        queued,
    })
}

/// Plans reversals for `entries` (already filtered and ordered) and hands them
/// to the command queue. Nothing is queued or audited when nothing is invertible.
/// On success every entry is written to the rollback ledger.
pub(crate) async fn queue_reversals(
    state: &AppState,
    server_id: &str,
    entries: &[CommandLogEntry],
    priority: u8,
    requested_by: &str,
    now: i64,
) -> Result<(Vec<ReversalAction>, Vec<QueuedCommand>), AppError> {
    let reversals = state.planner.calculate_reversals(entries);
    if reversals.is_empty() {
        state.metrics.record_reversals(0, 0);
        record_rolled_back(state, server_id, entries, now).await;
        return Ok((reversals, Vec::new()));
    }

    let queued: Vec<QueuedCommand> = reversals
        .iter()
        .map(|reversal| QueuedCommand {
            server_id: server_id.to_string(),
            command: reversal.command.clone(),
            priority,
            reason: reversal.reason.clone(),
            original_log_id: reversal.original_log_id.clone(),
            queued_at: now,
        })
        .collect();
    state
        .command_queue
        .enqueue(&queued)
        .await
        .map_err(|err| {
            error!("failed to enqueue reversals for {}: {}", server_id, err);
            AppError::Internal(err)
        })?;
    state.metrics.record_reversals(reversals.len(), queued.len());
    record_rolled_back(state, server_id, entries, now).await;

    let entry = AuditEntry::new(
        server_id,
        AuditAction::RollbackQueued,
        requested_by,
        json!({
            "priority": priority,
            "commands": queued.iter().map(|item| item.command.as_str()).collect::<Vec<_>>(),
            "original_log_ids": reversals
                .iter()
                .map(|item| item.original_log_id.as_str())
                .collect::<Vec<_>>(),
        }),
    );
    if let Err(err) = state.audit_log.record(entry).await {
        warn!("failed to write rollback audit entry: {}", err);
    }

    Ok((reversals, queued))
}

/// Drops entries whose reversal was already queued within the ledger TTL.
pub(crate) async fn not_yet_rolled_back(
    state: &AppState,
    server_id: &str,
    entries: Vec<CommandLogEntry>,
    now: i64,
) -> Vec<CommandLogEntry> {
    let mut ledger = state.rollback_ledger.lock().await;
    ledger.purge_expired(now);
    entries
        .into_iter()
        .filter(|entry| !ledger.contains_live(&ledger_key(server_id, entry), now))
        .collect()
}

async fn record_rolled_back(
    state: &AppState,
    server_id: &str,
    entries: &[CommandLogEntry],
    now: i64,
) {
    // longest window in which the entry can be fetched again
    let ttl = state
        .config
        .scan_window_seconds
        .max(state.config.rollback_lookback_seconds);
    let mut ledger = state.rollback_ledger.lock().await;
    for entry in entries {
        ledger.insert(ledger_key(server_id, entry), now, ttl, now);
    }
}

// Rows without an id fall back to their content.
fn ledger_key(server_id: &str, entry: &CommandLogEntry) -> String {
    if entry.id.trim().is_empty() {
        format!(
            "{}|{}|{}|{}",
            server_id, entry.player_id, entry.prc_timestamp, entry.command
        )
    } else {
        format!("{}|{}", server_id, entry.id)
    }
}

fn normalize_required_text(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{entry, Harness};

    const NOW: i64 = 1_700_000_000;

    fn request(player: &str) -> RollbackRequest {
        RollbackRequest {
            server_id: "main".to_string(),
            player_id: player.to_string(),
            lookback_seconds: Some(300),
            priority: None,
            requested_by: Some("mod-1".to_string()),
        }
    }

    #[tokio::test]
    async fn rollback_reverses_only_the_requested_player_in_time_order() {
        let harness = Harness::with_logs(
            "main",
            vec![
                entry("3", "griefer", ":unban p2", NOW - 10),
                entry("1", "griefer", ":ban p1", NOW - 100),
                entry("2", "helper", ":ban p9", NOW - 50),
                entry("4", "griefer", ":fly", NOW - 5),
                entry("0", "griefer", ":ban old", NOW - 1_000),
            ],
        );
        let outcome = rollback_player_actions(&harness.state, request("griefer"), NOW)
            .await
            .expect("rollback");

        assert_eq!(outcome.logs_considered, 3);
        let commands: Vec<&str> = outcome.queued.iter().map(|c| c.command.as_str()).collect();
        assert_eq!(commands, vec![":unban p1", ":ban p2"]);
        assert!(outcome.queued.iter().all(|c| c.priority == 1 && c.server_id == "main"));
        assert_eq!(harness.queue.commands().len(), 2);

        let audits = harness.audit.entries();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].action, AuditAction::RollbackQueued);
        assert_eq!(audits[0].actor, "mod-1");
        assert_eq!(harness.state.metrics.snapshot().commands_queued, 2);
    }

    #[tokio::test]
    async fn rollback_with_nothing_invertible_queues_nothing() {
        let harness = Harness::with_logs("main", vec![entry("1", "griefer", ":god me", NOW)]);
        let outcome = rollback_player_actions(&harness.state, request("griefer"), NOW)
            .await
            .expect("rollback");
        assert!(outcome.reversals.is_empty());
        assert!(harness.queue.commands().is_empty());
        assert!(harness.audit.entries().is_empty());
    }

    #[tokio::test]
    async fn rollback_uses_requested_priority() {
        let harness = Harness::with_logs("main", vec![entry("1", "griefer", ":ban p1", NOW)]);
        let mut req = request("griefer");
        req.priority = Some(9);
        let outcome = rollback_player_actions(&harness.state, req, NOW)
            .await
            .expect("rollback");
        assert_eq!(outcome.queued[0].priority, 9);
    }

    #[tokio::test]
    async fn rollback_normalizes_server_id_case() {
        let harness = Harness::with_logs("main", vec![entry("1", "griefer", ":ban p1", NOW - 1)]);
        let mut req = request("griefer");
        req.server_id = " Main ".to_string();
        let outcome = rollback_player_actions(&harness.state, req, NOW)
            .await
            .expect("rollback");
        assert_eq!(outcome.server_id, "main");
        assert_eq!(outcome.queued.len(), 1);
        assert_eq!(outcome.queued[0].server_id, "main");
    }

    #[tokio::test]
    async fn rollback_rejects_blank_ids_and_bad_lookback() {
        let harness = Harness::with_logs("main", Vec::new());
        let err = rollback_player_actions(&harness.state, request("  "), NOW)
            .await
            .expect_err("blank player");
        match err {
            AppError::BadRequest(message) => assert!(message.contains("player_id")),
            _ => panic!("unexpected error type"),
        }

        let mut req = request("griefer");
        req.lookback_seconds = Some(0);
        let err = rollback_player_actions(&harness.state, req, NOW)
            .await
            .expect_err("zero lookback");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn rollback_surfaces_log_source_failures() {
        let harness = Harness::failing_source();
        let err = rollback_player_actions(&harness.state, request("griefer"), NOW)
            .await
            .expect_err("source failure");
        assert!(matches!(err, AppError::Internal(_)));
    }
}
