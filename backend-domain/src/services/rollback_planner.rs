use crate::entities::{LoggedCommand, ReversalAction};
use crate::value_objects::{InversionTable, ParsedCommand};

const REASON_PREFIX: &str = "Rollback of ";

/// Computes the counter-commands that undo previously issued moderation commands.
#[derive(Debug, Clone, Default)]
pub struct RollbackPlanner {
    inversions: InversionTable,
}

impl RollbackPlanner {
    pub fn new(inversions: InversionTable) -> Self {
        Self { inversions }
    }

    pub fn inversions(&self) -> &InversionTable {
        &self.inversions
    }

    /// One reversal per invertible entry, in input order. Entries that are
    /// empty, unparseable, not invertible, or have no target are skipped.
    pub fn calculate_reversals<L: LoggedCommand>(&self, logs: &[L]) -> Vec<ReversalAction> {
        logs.iter().filter_map(|log| self.reverse(log)).collect()
    }

    pub fn reverse<L: LoggedCommand>(&self, log: &L) -> Option<ReversalAction> {
        let original = log.command_text();
        let parsed = ParsedCommand::parse(original)?;
        let inverse = self.inversions.inverse_of(parsed.verb())?;
        let target = parsed.target()?;
        Some(ReversalAction {
            original_log_id: log.log_id().to_string(),
            command: format!("{} {}", inverse, target),
            reason: format!("{}{}", REASON_PREFIX, original),
        })
    }
}
