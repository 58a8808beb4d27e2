// Reversal entity
// A counter-command that undoes one logged moderation command

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReversalAction {
    pub original_log_id: String,
    pub command: String,
    pub reason: String,
}
