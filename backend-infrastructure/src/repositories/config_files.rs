use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::warn;

use backend_domain::{VerbRuleRepository, VerbRules};

use crate::config::validate_verb_rules;

pub struct ConfigFileRepository;

impl ConfigFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConfigFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VerbRuleRepository for ConfigFileRepository {
    async fn load_verb_rules(&self, path: &str) -> anyhow::Result<VerbRules> {
        if path.trim().is_empty() || !Path::new(path).exists() {
            warn!("verb rules file not found, using built-in verb tables");
            return Ok(VerbRules::default());
        }
        let content = fs::read_to_string(path).await?;
        let rules: VerbRules = serde_yaml::from_str(&content)?;
        validate_verb_rules(&rules)?;
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::ParsedCommand;

    #[tokio::test]
    async fn loads_verb_rules_from_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("verb_rules.yaml");
        std::fs::write(
            &path,
            "sensitive_verbs: [\":ban\", \":kill\"]\ninversions:\n  - verb: \":jail\"\n    inverse: \":unjail\"\n",
        )
        .expect("write");

        let rules = ConfigFileRepository::new()
            .load_verb_rules(path.to_str().expect("utf8 path"))
            .await
            .expect("load");
        assert!(rules.sensitive_verbs().contains(":kill"));
        assert!(!rules.sensitive_verbs().contains(":kick"));
        assert_eq!(rules.inversion_table().inverse_of(":jail"), Some(":unjail"));
        let mass = ParsedCommand::parse(":ban ALL").expect("parse");
        assert!(rules.mass_targets().matches(&mass));
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let rules = ConfigFileRepository::new()
            .load_verb_rules("/definitely/not/here.yaml")
            .await
            .expect("load");
        assert_eq!(rules, VerbRules::default());
    }

    #[tokio::test]
    async fn rejects_verbs_without_sigil() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("verb_rules.yaml");
        std::fs::write(&path, "sensitive_verbs: [\":ban\", \"kick\"]\n").expect("write");
        let err = ConfigFileRepository::new()
            .load_verb_rules(path.to_str().expect("utf8 path"))
            .await
            .expect_err("invalid verb");
        assert!(err.to_string().contains("'kick'"));
    }
}
