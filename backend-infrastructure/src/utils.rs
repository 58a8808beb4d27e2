use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

pub fn current_unix_seconds() -> i64 {
    Utc::now().timestamp()
}

pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Appends one JSON document per line, creating the file and its parent dir on demand.
pub async fn append_json_lines<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let mut buffer = Vec::new();
    for item in items {
        serde_json::to_writer(&mut buffer, item)?;
        buffer.push(b'\n');
    }
    ensure_parent_dir(path).await?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&buffer).await?;
    file.flush().await?;
    Ok(())
}
