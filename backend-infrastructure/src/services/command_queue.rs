use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use backend_domain::ports::CommandQueue;
use backend_domain::QueuedCommand;

use crate::utils::append_json_lines;

/// Appends queued commands to a JSONL file picked up by the dispatcher.
pub struct JsonlCommandQueue {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlCommandQueue {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl CommandQueue for JsonlCommandQueue {
    async fn enqueue(&self, commands: &[QueuedCommand]) -> anyhow::Result<()> {
        if commands.is_empty() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        append_json_lines(&self.path, commands).await?;
        info!("queued {} command(s) to {}", commands.len(), self.path.display());
        Ok(())
    }
}
