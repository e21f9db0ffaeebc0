//! Data-driven safety rule set.
//!
//! Rules are configuration, not code: operators tune the rule file without
//! touching gate logic. Each rule maps a keyword pattern to a severity and
//! a categorical reason; the category is what callers may expose, never the
//! rule text itself.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity attached to a rule match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Crisis content: always escalates to human review, overriding any
    /// other match.
    Crisis,
    /// Unsafe content: rejected, eligible for regeneration or resubmission.
    Unsafe,
}

/// Categorical reason reported to callers.
///
/// Deliberately coarse so that rejection responses never leak the matching
/// rule's pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionCategory {
    SelfHarm,
    Violence,
    Abuse,
    MedicalAdvice,
    Other,
}

impl RejectionCategory {
    /// Returns the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            RejectionCategory::SelfHarm => "self-harm",
            RejectionCategory::Violence => "violence",
            RejectionCategory::Abuse => "abuse",
            RejectionCategory::MedicalAdvice => "medical-advice",
            RejectionCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single safety rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRule {
    /// Stable identifier, e.g. "crisis.self_harm".
    pub id: String,
    pub severity: RuleSeverity,
    pub category: RejectionCategory,
    /// Case-insensitive phrases; any hit counts as a match.
    pub keywords: Vec<String>,
}

impl SafetyRule {
    /// True when the content matches any of this rule's keywords.
    pub fn matches(&self, content: &str) -> bool {
        let haystack = content.to_lowercase();
        self.keywords
            .iter()
            .any(|keyword| haystack.contains(&keyword.to_lowercase()))
    }
}

/// Errors raised while constructing or loading a rule set.
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("rule set must contain at least one rule")]
    Empty,

    #[error("rule '{0}' has an empty id")]
    EmptyRuleId(String),

    #[error("duplicate rule id '{0}'")]
    DuplicateRuleId(String),

    #[error("rule '{0}' has no keywords")]
    NoKeywords(String),

    #[error("rule '{rule_id}' has an empty keyword")]
    EmptyKeyword { rule_id: String },

    #[error("failed to parse rule file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("failed to read rule file: {0}")]
    Io(#[from] std::io::Error),
}

/// Validated, ordered collection of safety rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SafetyRule>", into = "Vec<SafetyRule>")]
pub struct RuleSet {
    rules: Vec<SafetyRule>,
}

impl RuleSet {
    /// Builds a rule set, validating every rule.
    pub fn new(rules: Vec<SafetyRule>) -> Result<Self, RuleSetError> {
        if rules.is_empty() {
            return Err(RuleSetError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            if rule.id.trim().is_empty() {
                return Err(RuleSetError::EmptyRuleId(rule.id.clone()));
            }
            if !seen.insert(rule.id.clone()) {
                return Err(RuleSetError::DuplicateRuleId(rule.id.clone()));
            }
            if rule.keywords.is_empty() {
                return Err(RuleSetError::NoKeywords(rule.id.clone()));
            }
            if rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(RuleSetError::EmptyKeyword {
                    rule_id: rule.id.clone(),
                });
            }
        }

        Ok(Self { rules })
    }

    /// Loads a rule set from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self, RuleSetError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parses a rule set from a YAML document (a sequence of rules).
    pub fn from_yaml(raw: &str) -> Result<Self, RuleSetError> {
        let rules: Vec<SafetyRule> = serde_yaml::from_str(raw)?;
        Self::new(rules)
    }

    /// Returns the built-in rule set shipped with the crate.
    pub fn builtin() -> Self {
        BUILTIN_RULES.clone()
    }

    /// All rules matching the content, in declaration order.
    pub fn matching<'a>(&'a self, content: &'a str) -> impl Iterator<Item = &'a SafetyRule> {
        self.rules.iter().filter(move |rule| rule.matches(content))
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when the set holds no rules (never true for a constructed set).
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<Vec<SafetyRule>> for RuleSet {
    type Error = RuleSetError;

    fn try_from(rules: Vec<SafetyRule>) -> Result<Self, Self::Error> {
        Self::new(rules)
    }
}

impl From<RuleSet> for Vec<SafetyRule> {
    fn from(set: RuleSet) -> Self {
        set.rules
    }
}

static BUILTIN_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(vec![
        SafetyRule {
            id: "crisis.self_harm".to_string(),
            severity: RuleSeverity::Crisis,
            category: RejectionCategory::SelfHarm,
            keywords: vec![
                "suicide".to_string(),
                "kill myself".to_string(),
                "end my life".to_string(),
                "self-harm".to_string(),
                "hurt myself".to_string(),
                "no reason to live".to_string(),
            ],
        },
        SafetyRule {
            id: "unsafe.violence".to_string(),
            severity: RuleSeverity::Unsafe,
            category: RejectionCategory::Violence,
            keywords: vec![
                "gore".to_string(),
                "graphic violence".to_string(),
                "mutilat".to_string(),
            ],
        },
        SafetyRule {
            id: "unsafe.abuse".to_string(),
            severity: RuleSeverity::Unsafe,
            category: RejectionCategory::Abuse,
            keywords: vec!["worthless and deserve".to_string(), "you deserve pain".to_string()],
        },
        SafetyRule {
            id: "unsafe.medical_advice".to_string(),
            severity: RuleSeverity::Unsafe,
            category: RejectionCategory::MedicalAdvice,
            keywords: vec![
                "stop taking your medication".to_string(),
                "skip your medication".to_string(),
            ],
        },
    ])
    .expect("builtin rule set is valid")
});
