//! Loan purpose classification.
//!
//! The purpose column is free text in the language of the source dataset
//! (Russian). Classification is an ordered list of rules, each pairing a
//! category with keyword fragments; the first rule with a fragment contained in
//! the text wins, and text matching nothing is `no category`.
//!
//! Matching is a plain case-sensitive substring test on the raw text, so the
//! fragments are word stems that survive inflection:
//!
//! | category                 | fragments          | stem of                    |
//! | ------------------------ | ------------------ | -------------------------- |
//! | car operations           | `авто`             | автомобиль (car)           |
//! | real estate transactions | `жиль`, `недвиж`   | жильё (housing), недвижимость (property) |
//! | conducting a wedding     | `свадь`            | свадьба (wedding)          |
//! | getting an education     | `образ`            | образование (education)    |
//!
//! A dataset in another language needs a translated table, loaded with
//! [`KeywordTable::from_json_file`].

use std::fs::File;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::domain::PurposeCategory;
use crate::error::PipelineError;

static DEFAULT_TABLE: LazyLock<KeywordTable> = LazyLock::new(KeywordTable::russian);

/// One classification rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: PurposeCategory,
    pub fragments: Vec<String>,
}

/// Ordered classification rules, evaluated top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl KeywordTable {
    /// Validate and wrap a rule list.
    ///
    /// `no category` is the implicit fall-through and may not be listed, and an
    /// empty fragment would match every text.
    pub fn new(rules: Vec<KeywordRule>) -> Result<Self, PipelineError> {
        if rules.is_empty() {
            return Err(PipelineError::KeywordTable("no rules".to_string()));
        }
        for rule in &rules {
            if rule.category == PurposeCategory::NoCategory {
                return Err(PipelineError::KeywordTable(
                    "`no category` is the fall-through and cannot have fragments".to_string(),
                ));
            }
            if rule.fragments.is_empty() || rule.fragments.iter().any(String::is_empty) {
                return Err(PipelineError::KeywordTable(format!(
                    "rule for '{}' needs at least one non-empty fragment",
                    rule.category
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Rules for the Russian-language source dataset.
    pub fn russian() -> Self {
        let rule = |category, fragments: &[&str]| KeywordRule {
            category,
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        };
        Self {
            rules: vec![
                rule(PurposeCategory::CarOperations, &["авто"]),
                rule(PurposeCategory::RealEstate, &["жиль", "недвиж"]),
                rule(PurposeCategory::Wedding, &["свадь"]),
                rule(PurposeCategory::Education, &["образ"]),
            ],
        }
    }

    /// Load a rule list from a JSON array of `{category, fragments}` objects.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
        let rules: Vec<KeywordRule> = serde_json::from_reader(file)?;
        Self::new(rules)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let rules: Vec<KeywordRule> = serde_json::from_str(json)?;
        Self::new(rules)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// First matching rule's category, or `no category`.
    pub fn classify(&self, purpose: &str) -> PurposeCategory {
        self.rules
            .iter()
            .find(|rule| rule.fragments.iter().any(|f| purpose.contains(f.as_str())))
            .map(|rule| rule.category)
            .unwrap_or(PurposeCategory::NoCategory)
    }
}

/// Classify with the built-in Russian table.
pub fn categorize_purpose(purpose: &str) -> PurposeCategory {
    DEFAULT_TABLE.classify(purpose)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_purposes_classify() {
        assert_eq!(categorize_purpose("приобретение автомобиля"), PurposeCategory::CarOperations);
        assert_eq!(categorize_purpose("на покупку своего автомобиля"), PurposeCategory::CarOperations);
        assert_eq!(categorize_purpose("покупка жилья"), PurposeCategory::RealEstate);
        assert_eq!(categorize_purpose("операции с коммерческой недвижимостью"), PurposeCategory::RealEstate);
        assert_eq!(categorize_purpose("сыграть свадьбу"), PurposeCategory::Wedding);
        assert_eq!(categorize_purpose("на проведение свадьбы"), PurposeCategory::Wedding);
        assert_eq!(categorize_purpose("получение высшего образования"), PurposeCategory::Education);
        assert_eq!(categorize_purpose("заняться образованием"), PurposeCategory::Education);
    }

    #[test]
    fn unmatched_text_has_no_category() {
        assert_eq!(categorize_purpose("ремонт"), PurposeCategory::NoCategory);
        assert_eq!(categorize_purpose(""), PurposeCategory::NoCategory);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(categorize_purpose("АВТОМОБИЛЬ"), PurposeCategory::NoCategory);
    }

    #[test]
    fn first_rule_wins() {
        // Both the car and the housing stems are present.
        assert_eq!(
            categorize_purpose("автомобиль или жильё"),
            PurposeCategory::CarOperations
        );
    }

    #[test]
    fn json_table_replaces_default() {
        let table = KeywordTable::from_json_str(
            r#"[
                {"category": "car operations", "fragments": ["car"]},
                {"category": "conducting a wedding", "fragments": ["wedding"]}
            ]"#,
        )
        .unwrap();
        assert_eq!(table.classify("buying a car"), PurposeCategory::CarOperations);
        assert_eq!(table.classify("wedding party"), PurposeCategory::Wedding);
        assert_eq!(table.classify("покупка жилья"), PurposeCategory::NoCategory);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(KeywordTable::from_json_str("[]").is_err());
        assert!(
            KeywordTable::from_json_str(r#"[{"category": "no category", "fragments": ["x"]}]"#).is_err()
        );
        assert!(KeywordTable::from_json_str(r#"[{"category": "car operations", "fragments": [""]}]"#).is_err());
        assert!(KeywordTable::from_json_str(r#"[{"category": "boats", "fragments": ["x"]}]"#).is_err());
    }
}
