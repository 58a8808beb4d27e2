use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use backend_domain::{CommandLogEntry, CommandLogSource};

/// Reads `<logs_dir>/<server_id>.jsonl`, one command log entry per line.
pub struct JsonlCommandLogSource {
    logs_dir: PathBuf,
}

impl JsonlCommandLogSource {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    pub fn path_for(&self, server_id: &str) -> PathBuf {
        self.logs_dir.join(format!("{}.jsonl", sanitize_server_id(server_id)))
    }
}

#[async_trait]
impl CommandLogSource for JsonlCommandLogSource {
    async fn fetch_logs(
        &self,
        server_id: &str,
        since: i64,
        until: i64,
    ) -> anyhow::Result<Vec<CommandLogEntry>> {
        let path = self.path_for(server_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).await?;
        Ok(parse_command_log_lines(&content, &path)
            .into_iter()
            .filter(|entry| entry.prc_timestamp >= since && entry.prc_timestamp <= until)
            .collect())
    }
}

fn parse_command_log_lines(content: &str, path: &Path) -> Vec<CommandLogEntry> {
    let mut entries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<CommandLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(
                "skipping malformed command log line {} in {}: {}",
                index + 1,
                path.display(),
                err
            ),
        }
    }
    entries
}

// Keeps server ids from escaping the logs directory.
fn sanitize_server_id(server_id: &str) -> String {
    server_id
        .trim()
        .to_lowercase()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
