// Command value object
// Tokenizes raw in-game moderation commands such as ":ban user1"

pub const COMMAND_SIGIL: char = ':';

/// A command split into a lower-cased verb and its verbatim arguments.
///
/// Borrowing parse: the arguments point into the original command text so a
/// batch can be tokenized once without copying every log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    raw: &'a str,
    verb: String,
    args: Vec<&'a str>,
}

impl<'a> ParsedCommand<'a> {
    /// Returns `None` for empty text, text without the leading sigil, or a bare sigil.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let trimmed = raw.trim();
        if !trimmed.starts_with(COMMAND_SIGIL) {
            return None;
        }
        let mut tokens = trimmed.split_whitespace();
        let verb = tokens.next()?.to_lowercase();
        if verb.chars().count() < 2 {
            return None;
        }
        Some(Self {
            raw,
            verb,
            args: tokens.collect(),
        })
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn args(&self) -> &[&'a str] {
        &self.args
    }

    pub fn target(&self) -> Option<&'a str> {
        self.args.first().copied()
    }

    /// Lower-cased, single-spaced form used as deduplication evidence.
    pub fn normalized(&self) -> String {
        let mut out = self.verb.clone();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_lowercase());
        }
        out
    }
}

/// Lower-cases a configured verb and prepends the sigil when it was omitted.
pub fn normalize_verb(value: &str) -> Option<String> {
    let trimmed = value.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
        return None;
    }
    let verb = if trimmed.starts_with(COMMAND_SIGIL) {
        trimmed
    } else {
        format!("{}{}", COMMAND_SIGIL, trimmed)
    };
    if verb.chars().count() < 2 {
        return None;
    }
    Some(verb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lowercases_verb_and_keeps_argument_case() {
        let parsed = ParsedCommand::parse("  :BAN User1 spamming ").expect("parse");
        assert_eq!(parsed.verb(), ":ban");
        assert_eq!(parsed.args(), &["User1", "spamming"]);
        assert_eq!(parsed.target(), Some("User1"));
        assert_eq!(parsed.normalized(), ":ban user1 spamming");
    }

    #[test]
    fn parse_rejects_malformed_commands() {
        assert!(ParsedCommand::parse("").is_none());
        assert!(ParsedCommand::parse("   ").is_none());
        assert!(ParsedCommand::parse("ban user1").is_none());
        assert!(ParsedCommand::parse(":").is_none());
        assert!(ParsedCommand::parse(": user1").is_none());
    }

    #[test]
    fn parse_without_arguments_has_no_target() {
        let parsed = ParsedCommand::parse(":fly").expect("parse");
        assert_eq!(parsed.verb(), ":fly");
        assert!(parsed.target().is_none());
    }

    #[test]
    fn normalize_verb_adds_missing_sigil() {
        assert_eq!(normalize_verb("Ban").as_deref(), Some(":ban"));
        assert_eq!(normalize_verb(" :KICK ").as_deref(), Some(":kick"));
        assert_eq!(normalize_verb(""), None);
        assert_eq!(normalize_verb(":"), None);
        assert_eq!(normalize_verb("ban all"), None);
    }
}
