// Command log entities
// One row per command issued on a game server, as reported by the server

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLogEntry {
    #[serde(default)]
    pub id: String,
    pub player_id: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub prc_timestamp: i64,
}

impl CommandLogEntry {
    pub fn new(
        id: impl Into<String>,
        player_id: impl Into<String>,
        command: impl Into<String>,
        prc_timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            player_id: player_id.into(),
            command: command.into(),
            prc_timestamp,
        }
    }
}

/// Narrow log shape accepted by the rollback planner: the caller has already
/// filtered by time and actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackLogEntry {
    pub id: String,
    #[serde(default)]
    pub command: String,
}

impl RollbackLogEntry {
    pub fn new(id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
        }
    }
}

pub trait LoggedCommand {
    fn log_id(&self) -> &str;
    fn command_text(&self) -> &str;
}

impl LoggedCommand for CommandLogEntry {
    fn log_id(&self) -> &str {
        &self.id
    }

    fn command_text(&self) -> &str {
        &self.command
    }
}

impl LoggedCommand for RollbackLogEntry {
    fn log_id(&self) -> &str {
        &self.id
    }

    fn command_text(&self) -> &str {
        &self.command
    }
}

impl<T: LoggedCommand + ?Sized> LoggedCommand for &T {
    fn log_id(&self) -> &str {
        (**self).log_id()
    }

    fn command_text(&self) -> &str {
        (**self).command_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_log_entry_uses_camel_case_wire_names() {
        let entry: CommandLogEntry = serde_json::from_str(
            r#"{"id":"7","playerId":"123","command":":ban all","prcTimestamp":1700000000}"#,
        )
        .expect("decode");
        assert_eq!(entry, CommandLogEntry::new("7", "123", ":ban all", 1_700_000_000));
    }

    #[test]
    fn missing_command_decodes_as_empty() {
        let entry: RollbackLogEntry = serde_json::from_str(r#"{"id":"1"}"#).expect("decode");
        assert!(entry.command.is_empty());
        let entry: CommandLogEntry = serde_json::from_str(r#"{"playerId":"9"}"#).expect("decode");
        assert!(entry.command.is_empty());
        assert_eq!(entry.prc_timestamp, 0);
    }
}
