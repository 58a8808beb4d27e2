use std::collections::{BTreeMap, HashSet};

use crate::entities::{CommandLogEntry, Detection};
use crate::value_objects::{MassTargets, ParsedCommand, SensitiveVerbs};

/// One independent heuristic evaluated over a whole scan batch.
pub trait DetectionRule: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;
    fn evaluate(&self, batch: &ScanBatch<'_>) -> Vec<Detection>;
}

#[derive(Debug, Clone)]
pub struct ParsedEntry<'a> {
    pub entry: &'a CommandLogEntry,
    pub command: ParsedCommand<'a>,
    pub sensitive: bool,
}

impl<'a> ParsedEntry<'a> {
    pub fn player_id(&self) -> &'a str {
        &self.entry.player_id
    }

    pub fn timestamp(&self) -> i64 {
        self.entry.prc_timestamp
    }
}

/// A log batch tokenized once, ordered by timestamp (ties keep input order).
/// Entries whose command does not parse are dropped here, so no rule sees them.
#[derive(Debug)]
pub struct ScanBatch<'a> {
    entries: Vec<ParsedEntry<'a>>,
    authorized: HashSet<&'a str>,
    skipped: usize,
}

impl<'a> ScanBatch<'a> {
    pub fn new(
        logs: &'a [CommandLogEntry],
        sensitive_verbs: &SensitiveVerbs,
        authorized_user_ids: &'a [String],
    ) -> Self {
        let mut entries: Vec<ParsedEntry<'a>> = logs
            .iter()
            .filter_map(|entry| {
                let command = ParsedCommand::parse(&entry.command)?;
                let sensitive = sensitive_verbs.is_sensitive(&command);
                Some(ParsedEntry {
                    entry,
                    command,
                    sensitive,
                })
            })
            .collect();
        entries.sort_by_key(|parsed| parsed.timestamp());
        let skipped = logs.len() - entries.len();
        let authorized = authorized_user_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .collect();
        Self {
            entries,
            authorized,
            skipped,
        }
    }

    pub fn entries(&self) -> &[ParsedEntry<'a>] {
        &self.entries
    }

    pub fn sensitive_entries(&self) -> impl Iterator<Item = &ParsedEntry<'a>> {
        self.entries.iter().filter(|parsed| parsed.sensitive)
    }

    /// An empty allow-list authorizes nobody.
    pub fn is_authorized(&self, player_id: &str) -> bool {
        self.authorized.contains(player_id.trim())
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Too many sensitive commands from one actor inside a short window.
#[derive(Debug, Clone)]
pub struct HighFrequencyRule {
    threshold: usize,
    window_seconds: i64,
}

impl HighFrequencyRule {
    pub fn new(threshold: usize, window_seconds: i64) -> Self {
        Self {
            threshold: threshold.max(1),
            window_seconds: window_seconds.max(0),
        }
    }
}

impl DetectionRule for HighFrequencyRule {
    fn name(&self) -> &'static str {
        "high_frequency"
    }

    fn evaluate(&self, batch: &ScanBatch<'_>) -> Vec<Detection> {
        let mut by_actor: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
        for parsed in batch.sensitive_entries() {
            by_actor
                .entry(parsed.player_id())
                .or_default()
                .push(parsed.timestamp());
        }

        let mut detections = Vec::new();
        for (actor, timestamps) in by_actor {
            let Some(burst) = densest_window(&timestamps, self.window_seconds) else {
                continue;
            };
            if burst.count >= self.threshold {
                detections.push(Detection::HighFrequency {
                    user_id: actor.to_string(),
                    command_count: burst.count,
                    window_seconds: self.window_seconds,
                    first_timestamp: burst.first,
                    last_timestamp: burst.last,
                });
            }
        }
        detections
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Burst {
    count: usize,
    first: i64,
    last: i64,
}

// timestamps must be sorted ascending; the window span is inclusive.
fn densest_window(timestamps: &[i64], window_seconds: i64) -> Option<Burst> {
    let mut best: Option<Burst> = None;
    let mut start = 0;
    for end in 0..timestamps.len() {
        while i128::from(timestamps[end]) - i128::from(timestamps[start])
            > i128::from(window_seconds)
        {
            start += 1;
        }
        let count = end - start + 1;
        if best.map(|burst| count > burst.count).unwrap_or(true) {
            best = Some(Burst {
                count,
                first: timestamps[start],
                last: timestamps[end],
            });
        }
    }
    best
}

/// Commands aimed at the whole server population, e.g. ":ban all".
#[derive(Debug, Clone)]
pub struct MassActionRule {
    targets: MassTargets,
}

impl MassActionRule {
    pub fn new(targets: MassTargets) -> Self {
        Self { targets }
    }
}

impl DetectionRule for MassActionRule {
    fn name(&self) -> &'static str {
        "mass_action"
    }

    fn evaluate(&self, batch: &ScanBatch<'_>) -> Vec<Detection> {
        let mut seen: BTreeMap<(&str, String), &ParsedEntry<'_>> = BTreeMap::new();
        for parsed in batch.entries() {
            if !self.targets.matches(&parsed.command) {
                continue;
            }
            seen.entry((parsed.player_id(), parsed.command.normalized()))
                .or_insert(parsed);
        }
        seen.into_values()
            .map(|parsed| Detection::MassAction {
                user_id: parsed.player_id().to_string(),
                command: parsed.command.raw().trim().to_string(),
                timestamp: parsed.timestamp(),
            })
            .collect()
    }
}

/// Sensitive commands from actors outside the allow-list. One finding per actor.
#[derive(Debug, Clone, Default)]
pub struct UnauthorizedRule;

impl DetectionRule for UnauthorizedRule {
    fn name(&self) -> &'static str {
        "unauthorized"
    }

    fn evaluate(&self, batch: &ScanBatch<'_>) -> Vec<Detection> {
        let mut offenders: BTreeMap<&str, (&ParsedEntry<'_>, usize)> = BTreeMap::new();
        for parsed in batch.sensitive_entries() {
            if batch.is_authorized(parsed.player_id()) {
                continue;
            }
            offenders
                .entry(parsed.player_id())
                .and_modify(|(_, occurrences)| *occurrences += 1)
                .or_insert((parsed, 1));
        }
        offenders
            .into_iter()
            .map(|(actor, (first, occurrences))| Detection::Unauthorized {
                user_id: actor.to_string(),
                command: first.command.raw().trim().to_string(),
                timestamp: first.timestamp(),
                occurrences,
            })
            .collect()
    }
}
