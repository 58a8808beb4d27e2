use anyhow::{anyhow, Result};

use backend_domain::{normalize_verb, VerbRules, COMMAND_SIGIL};

pub fn validate_verb(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if !trimmed.starts_with(COMMAND_SIGIL) || normalize_verb(trimmed).is_none() {
        return Err(anyhow!(
            "invalid verb '{}': must start with '{}' and be a single word",
            value,
            COMMAND_SIGIL
        ));
    }
    Ok(())
}

pub fn validate_verb_rules(rules: &VerbRules) -> Result<()> {
    for verb in &rules.sensitive_verbs {
        validate_verb(verb)?;
    }
    for pair in &rules.inversions {
        validate_verb(&pair.verb)?;
        validate_verb(&pair.inverse)?;
    }
    for keyword in &rules.mass_targets {
        if keyword.trim().is_empty() {
            return Err(anyhow!("mass target keywords must not be empty"));
        }
    }
    Ok(())
}

pub fn validate_webhook_url(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("alert_webhook_url must be an http(s) url"))
    }
}
