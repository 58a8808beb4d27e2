use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use backend_application::{run_raid_scan, AppState, ScanReport};
use backend_infrastructure::current_unix_seconds;

/// Scans every configured server once. A failing server is logged and skipped.
pub async fn scan_all_servers(state: &AppState, now: i64) -> Vec<ScanReport> {
    let mut reports = Vec::with_capacity(state.config.servers.len());
    for server_id in &state.config.servers {
        match run_raid_scan(state, server_id, now).await {
            Ok(report) => reports.push(report),
            Err(err) => error!("scan of {} failed: {}", server_id, err),
        }
    }
    reports
}

/// Polls all servers until ctrl-c or SIGTERM.
pub async fn run_watch(state: AppState) -> Result<()> {
    let period = Duration::from_secs(state.config.poll_interval_seconds.max(1));
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(
        "watching {} server(s) every {}s",
        state.config.servers.len(),
        period.as_secs()
    );

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                let reports = scan_all_servers(&state, current_unix_seconds()).await;
                for report in reports.iter().filter(|report| !report.fresh.is_empty()) {
                    warn!(
                        "{} new detection(s) on {}",
                        report.fresh.len(),
                        report.server_id
                    );
                }
            }
        }
    }

    let snapshot = state.metrics.snapshot();
    info!(
        scans = snapshot.scans,
        scan_errors = snapshot.scan_errors,
        detections = snapshot.detections,
        commands_queued = snapshot.commands_queued,
        "raid monitor stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("sigterm handler unavailable: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::VerbRules;
    use backend_infrastructure::AppConfig;

    use crate::context::AppContext;

    fn write_logs(dir: &std::path::Path, server: &str, lines: &[&str]) {
        std::fs::create_dir_all(dir).expect("mkdir");
        std::fs::write(dir.join(format!("{}.jsonl", server)), lines.join("\n")).expect("write");
    }

    #[tokio::test]
    async fn scan_all_servers_runs_the_full_pipeline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let logs_dir = dir.path().join("logs");
        write_logs(
            &logs_dir,
            "main",
            &[
                r#"{"id":"1","playerId":"7","command":":ban all","prcTimestamp":990}"#,
                r#"{"id":"2","playerId":"8","command":":kick 12","prcTimestamp":995}"#,
            ],
        );
        let config = AppConfig {
            servers: vec!["main".to_string(), "empty".to_string()],
            authorized_user_ids: vec!["7".to_string()],
            logs_dir: logs_dir.to_string_lossy().to_string(),
            queue_path: dir.path().join("queue.jsonl").to_string_lossy().to_string(),
            audit_log_path: dir.path().join("audit.jsonl").to_string_lossy().to_string(),
            ..AppConfig::default()
        };
        let context = AppContext::from_parts(&config, &VerbRules::default());

        let reports = scan_all_servers(&context.state, 1_000).await;
        assert_eq!(reports.len(), 2);
        let main = &reports[0];
        assert_eq!(main.logs_scanned, 2);
        let kinds: Vec<&str> = main.detections.iter().map(|d| d.kind().as_str()).collect();
        assert_eq!(kinds, vec!["MASS_ACTION", "UNAUTHORIZED"]);
        assert!(reports[1].detections.is_empty());

        let audit = std::fs::read_to_string(dir.path().join("audit.jsonl")).expect("audit");
        assert_eq!(audit.lines().count(), 2);
        assert!(!dir.path().join("queue.jsonl").exists());
    }

    #[tokio::test]
    async fn auto_rollback_writes_inverse_commands_to_the_queue() {
        let dir = tempfile::tempdir().expect("tempdir");
        let logs_dir = dir.path().join("logs");
        write_logs(
            &logs_dir,
            "main",
            &[r#"{"id":"9","playerId":"66","command":":ban 12","prcTimestamp":990}"#],
        );
        let config = AppConfig {
            servers: vec!["main".to_string()],
            logs_dir: logs_dir.to_string_lossy().to_string(),
            queue_path: dir.path().join("queue.jsonl").to_string_lossy().to_string(),
            audit_log_path: dir.path().join("audit.jsonl").to_string_lossy().to_string(),
            auto_rollback: true,
            ..AppConfig::default()
        };
        let context = AppContext::from_parts(&config, &VerbRules::default());

        let reports = scan_all_servers(&context.state, 1_000).await;
        assert_eq!(reports[0].queued.len(), 1);
        let queue = std::fs::read_to_string(dir.path().join("queue.jsonl")).expect("queue");
        assert!(queue.contains("\"command\":\":unban 12\""));
    }
}
