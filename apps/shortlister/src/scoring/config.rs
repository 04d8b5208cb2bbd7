//! ScoringConfig: the typed, validated form of the YAML scoring document.
//!
//! Every section except `weights` has a documented default. `weights` is required:
//! a config without it fails at load time rather than silently ranking on zeros.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scoring config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scoring config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MustHaves {
    #[serde(default)]
    pub min_years_total: f64,
    #[serde(default)]
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keywords {
    #[serde(default)]
    pub critical: BTreeMap<String, u32>,
    #[serde(default)]
    pub desired: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemanticConfig {
    #[serde(default = "default_topk")]
    pub topk: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            topk: default_topk(),
        }
    }
}

fn default_topk() -> usize {
    8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RubricQuestion {
    pub name: String,
    pub question: String,
}

/// Additive adjustments. `job_hop_malus` is normally negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BonusMalusConfig {
    #[serde(default)]
    pub leadership_bonus: f64,
    #[serde(default)]
    pub publication_bonus: f64,
    #[serde(default)]
    pub job_hop_malus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignalWeights {
    pub keywords: f64,
    pub semantic: f64,
    pub rubric: f64,
    pub bonus_malus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default = "default_embedding_model")]
    pub embeddings: String,
    #[serde(default = "default_llm_model")]
    pub llm: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embeddings: default_embedding_model(),
            llm: default_llm_model(),
        }
    }
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_llm_model() -> String {
    "llama3:8b".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    #[serde(default)]
    pub must_haves: MustHaves,
    #[serde(default)]
    pub keywords: Keywords,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub rubric: Vec<RubricQuestion>,
    #[serde(default)]
    pub bonus_malus: BonusMalusConfig,
    pub weights: SignalWeights,
    #[serde(default)]
    pub models: ModelConfig,
}

impl ScoringConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("must_haves.min_years_total", self.must_haves.min_years_total)?;
        non_negative("weights.keywords", self.weights.keywords)?;
        non_negative("weights.semantic", self.weights.semantic)?;
        non_negative("weights.rubric", self.weights.rubric)?;
        non_negative("weights.bonus_malus", self.weights.bonus_malus)?;

        finite("bonus_malus.leadership_bonus", self.bonus_malus.leadership_bonus)?;
        finite("bonus_malus.publication_bonus", self.bonus_malus.publication_bonus)?;
        finite("bonus_malus.job_hop_malus", self.bonus_malus.job_hop_malus)?;

        if self.semantic.topk == 0 {
            return Err(invalid("semantic.topk", "must be at least 1"));
        }

        for (i, skill) in self.must_haves.required_skills.iter().enumerate() {
            if skill.trim().is_empty() {
                return Err(invalid(
                    &format!("must_haves.required_skills[{i}]"),
                    "must not be empty",
                ));
            }
        }

        for (section, map) in [
            ("keywords.critical", &self.keywords.critical),
            ("keywords.desired", &self.keywords.desired),
        ] {
            if map.keys().any(|k| k.trim().is_empty()) {
                return Err(invalid(section, "keywords must not be empty"));
            }
        }

        for (i, item) in self.rubric.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(invalid(&format!("rubric[{i}].name"), "must not be empty"));
            }
            if item.question.trim().is_empty() {
                return Err(invalid(
                    &format!("rubric[{i}].question"),
                    "must not be empty",
                ));
            }
        }

        if self.models.embeddings.trim().is_empty() {
            return Err(invalid("models.embeddings", "must not be empty"));
        }
        if self.models.llm.trim().is_empty() {
            return Err(invalid("models.llm", "must not be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

fn finite(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite number"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(invalid(field, &format!("must be >= 0, got {value}")));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SAMPLE_YAML: &str = r#"
must_haves:
  min_years_total: 3
  required_skills: ["python", "sql"]
keywords:
  critical: { python: 3, pytorch: 3 }
  desired: { docker: 1, airflow: 1 }
semantic:
  topk: 6
rubric:
  - name: ml_depth
    question: "Has the candidate shipped ML models to production?"
  - name: communication
    question: "Does the CV show clear written communication?"
bonus_malus:
  leadership_bonus: 0.1
  publication_bonus: 0.05
  job_hop_malus: -0.1
weights:
  keywords: 0.3
  semantic: 0.3
  rubric: 0.3
  bonus_malus: 0.1
models:
  embeddings: nomic-embed-text
  llm: "llama3:8b"
"#;

    /// A minimal valid config for tests that only care about one section.
    pub(crate) fn test_config() -> ScoringConfig {
        ScoringConfig {
            must_haves: MustHaves::default(),
            keywords: Keywords::default(),
            semantic: SemanticConfig::default(),
            rubric: vec![],
            bonus_malus: BonusMalusConfig::default(),
            weights: SignalWeights {
                keywords: 0.25,
                semantic: 0.25,
                rubric: 0.25,
                bonus_malus: 0.25,
            },
            models: ModelConfig::default(),
        }
    }

    #[test]
    fn test_sample_config_parses() {
        let config = ScoringConfig::from_yaml_str(SAMPLE_YAML).unwrap();
        assert_eq!(config.must_haves.required_skills, vec!["python", "sql"]);
        assert_eq!(config.keywords.critical["python"], 3);
        assert_eq!(config.semantic.topk, 6);
        assert_eq!(config.rubric.len(), 2);
        assert_eq!(config.rubric[0].name, "ml_depth");
        assert!((config.bonus_malus.job_hop_malus + 0.1).abs() < 1e-12);
        assert_eq!(config.models.llm, "llama3:8b");
    }

    #[test]
    fn test_defaults_fill_optional_sections() {
        let yaml = "weights: {keywords: 1, semantic: 1, rubric: 1, bonus_malus: 1}";
        let config = ScoringConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.semantic.topk, 8);
        assert_eq!(config.must_haves.min_years_total, 0.0);
        assert!(config.keywords.critical.is_empty());
        assert!(config.rubric.is_empty());
        assert_eq!(config.models.embeddings, "nomic-embed-text");
    }

    #[test]
    fn test_missing_weights_fails_fast() {
        let yaml = "semantic: {topk: 4}";
        assert!(matches!(
            ScoringConfig::from_yaml_str(yaml),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let yaml = "weights: {keywords: 1, semantic: 1, rubric: 1, bonus_malus: 1, vibes: 2}";
        assert!(ScoringConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_negative_keyword_weight_rejected_by_type() {
        let yaml = "keywords: {critical: {rust: -1}}\nweights: {keywords: 1, semantic: 1, rubric: 1, bonus_malus: 1}";
        assert!(ScoringConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_negative_signal_weight_rejected() {
        let mut config = test_config();
        config.weights.semantic = -0.5;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "weights.semantic"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_topk_rejected() {
        let mut config = test_config();
        config.semantic.topk = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_malus_allowed() {
        let mut config = test_config();
        config.bonus_malus.job_hop_malus = -0.2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_rubric_question_rejected() {
        let mut config = test_config();
        config.rubric.push(RubricQuestion {
            name: "depth".to_string(),
            question: "  ".to_string(),
        });
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "rubric[0].question"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScoringConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
