// Verb tables
// Moderation verbs are data, never branches

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::command::{normalize_verb, ParsedCommand};

pub const DEFAULT_SENSITIVE_VERBS: &[&str] = &[
    ":ban", ":unban", ":pban", ":tban", ":kick", ":admin", ":unadmin", ":mod", ":unmod",
];

pub const DEFAULT_INVERSIONS: &[(&str, &str)] = &[
    (":ban", ":unban"),
    (":unban", ":ban"),
    (":unadmin", ":admin"),
    (":unmod", ":mod"),
];

pub const DEFAULT_MASS_TARGETS: &[&str] = &["all"];

/// Verbs whose use can change another player's access or standing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveVerbs {
    verbs: HashSet<String>,
}

impl SensitiveVerbs {
    pub fn empty() -> Self {
        Self {
            verbs: HashSet::new(),
        }
    }

    pub fn insert(&mut self, verb: &str) -> bool {
        match normalize_verb(verb) {
            Some(verb) => self.verbs.insert(verb),
            None => false,
        }
    }

    pub fn contains(&self, verb: &str) -> bool {
        normalize_verb(verb)
            .map(|verb| self.verbs.contains(&verb))
            .unwrap_or(false)
    }

    pub fn is_sensitive(&self, command: &ParsedCommand<'_>) -> bool {
        self.verbs.contains(command.verb())
    }

    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut out: Vec<String> = self.verbs.iter().cloned().collect();
        out.sort();
        out
    }
}

impl Default for SensitiveVerbs {
    fn default() -> Self {
        DEFAULT_SENSITIVE_VERBS.iter().copied().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SensitiveVerbs {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::empty();
        set.extend(iter);
        set
    }
}

impl<S: AsRef<str>> Extend<S> for SensitiveVerbs {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for verb in iter {
            self.insert(verb.as_ref());
        }
    }
}

/// Maps a verb to the verb that undoes it. One direction per entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InversionTable {
    inverses: HashMap<String, String>,
}

impl InversionTable {
    pub fn empty() -> Self {
        Self {
            inverses: HashMap::new(),
        }
    }

    pub fn insert(&mut self, verb: &str, inverse: &str) -> bool {
        match (normalize_verb(verb), normalize_verb(inverse)) {
            (Some(verb), Some(inverse)) => {
                self.inverses.insert(verb, inverse);
                true
            }
            _ => false,
        }
    }

    pub fn inverse_of(&self, verb: &str) -> Option<&str> {
        self.inverses.get(verb).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inverses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverses.is_empty()
    }
}

impl Default for InversionTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (verb, inverse) in DEFAULT_INVERSIONS {
            table.insert(verb, inverse);
        }
        table
    }
}

/// Target keywords that address the whole server at once, e.g. ":ban all".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MassTargets {
    keywords: HashSet<String>,
}

impl MassTargets {
    pub fn new<S: AsRef<str>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, command: &ParsedCommand<'_>) -> bool {
        command
            .args()
            .iter()
            .any(|arg| self.keywords.contains(&arg.to_lowercase()))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for MassTargets {
    fn default() -> Self {
        Self::new(DEFAULT_MASS_TARGETS.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InversionPair {
    pub verb: String,
    pub inverse: String,
}

/// On-disk form of the verb tables. Empty sections fall back to the built-in tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerbRules {
    pub sensitive_verbs: Vec<String>,
    pub inversions: Vec<InversionPair>,
    pub mass_targets: Vec<String>,
}

impl VerbRules {
    pub fn sensitive_verbs(&self) -> SensitiveVerbs {
        if self.sensitive_verbs.is_empty() {
            SensitiveVerbs::default()
        } else {
            self.sensitive_verbs.iter().collect()
        }
    }

    pub fn inversion_table(&self) -> InversionTable {
        if self.inversions.is_empty() {
            return InversionTable::default();
        }
        let mut table = InversionTable::empty();
        for pair in &self.inversions {
            table.insert(&pair.verb, &pair.inverse);
        }
        table
    }

    pub fn mass_targets(&self) -> MassTargets {
        if self.mass_targets.is_empty() {
            MassTargets::default()
        } else {
            MassTargets::new(&self.mass_targets)
        }
    }
}
