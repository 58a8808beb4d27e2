use async_trait::async_trait;

use crate::entities::CommandLogEntry;
use crate::value_objects::VerbRules;

#[async_trait]
pub trait CommandLogSource: Send + Sync {
    /// Entries for `server_id` with `since <= prc_timestamp <= until`.
    async fn fetch_logs(
        &self,
        server_id: &str,
        since: i64,
        until: i64,
    ) -> anyhow::Result<Vec<CommandLogEntry>>;
}

#[async_trait]
pub trait VerbRuleRepository: Send + Sync {
    async fn load_verb_rules(&self, path: &str) -> anyhow::Result<VerbRules>;
}
