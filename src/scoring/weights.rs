use crate::error::ConfigurationError;
use crate::rubric::validation::weight_in_range;
use crate::rubric::RubricModel;
use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, HashMap};

/// Per-section weights used for one scoring run.
///
/// Starts from the rubric's own section weights. Overrides replace single
/// entries; the set is never required to sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionWeights {
    weights: HashMap<String, f64>,
}

impl SectionWeights {
    pub fn from_rubric(rubric: &RubricModel) -> Self {
        let weights = rubric
            .sections()
            .iter()
            .map(|s| (s.name.clone(), s.weight))
            .collect();
        Self { weights }
    }

    pub fn get(&self, section: &str) -> Option<f64> {
        self.weights.get(section).copied()
    }

    /// Replace one section's weight. The section must exist and the weight
    /// must lie in [0, 100].
    pub fn set(&mut self, section: &str, weight: f64) -> Result<(), ConfigurationError> {
        let slot = self
            .weights
            .get_mut(section)
            .ok_or_else(|| ConfigurationError::UnknownSection(section.to_string()))?;
        if !weight_in_range(weight) {
            return Err(ConfigurationError::WeightOutOfRange {
                location: format!("section '{}'", section),
                value: weight,
            });
        }
        *slot = weight;
        Ok(())
    }

    /// Nudge a weight by `delta`, clamped to [0, 100]. Returns the new weight.
    pub fn adjust(&mut self, section: &str, delta: f64) -> Result<f64, ConfigurationError> {
        let slot = self
            .weights
            .get_mut(section)
            .ok_or_else(|| ConfigurationError::UnknownSection(section.to_string()))?;
        *slot = (*slot + delta).clamp(0.0, 100.0);
        Ok(*slot)
    }

    /// Apply a batch of overrides, reporting every bad entry at once.
    /// Nothing is applied unless all entries are valid.
    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<(), Vec<ConfigurationError>>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut updated = self.clone();
        let errors: Vec<_> = overrides
            .into_iter()
            .filter_map(|(section, weight)| updated.set(section, weight).err())
            .collect();

        if errors.is_empty() {
            *self = updated;
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Body for the model update endpoint: section name -> weight.
    pub fn payload(&self) -> BTreeMap<String, f64> {
        self.weights
            .iter()
            .map(|(name, weight)| (name.clone(), *weight))
            .collect()
    }
}

/// Parse a `"Section=40"` override. The last `=` splits, so section names may
/// contain one.
pub fn parse_weight_override(s: &str) -> Result<(String, f64)> {
    let Some((section, value)) = s.rsplit_once('=') else {
        bail!("Weight override must look like SECTION=WEIGHT: {}", s);
    };
    let section = section.trim();
    if section.is_empty() {
        bail!("Weight override is missing a section name: {}", s);
    }
    let weight: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid weight in override '{}'", s))?;
    Ok((section.to_string(), weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rubric() -> RubricModel {
        RubricModel::from_json(
            r#"{"sections": [
                {"section_name": "Governance", "section_weightage": 40, "groups": [
                    {"group_weightage": 100, "questions": [{"question_id": 1, "question_weightage": 100}]}]},
                {"section_name": "Transparency", "section_weightage": 60, "groups": [
                    {"group_weightage": 100, "questions": [{"question_id": 2, "question_weightage": 100}]}]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_come_from_rubric() {
        let weights = SectionWeights::from_rubric(&rubric());
        assert_eq!(weights.get("Governance"), Some(40.0));
        assert_eq!(weights.get("Transparency"), Some(60.0));
        assert_eq!(weights.get("Environment"), None);
    }

    #[test]
    fn test_set_validates() {
        let mut weights = SectionWeights::from_rubric(&rubric());
        weights.set("Governance", 100.0).unwrap();
        assert_eq!(weights.get("Governance"), Some(100.0));

        assert_eq!(
            weights.set("Environment", 10.0),
            Err(ConfigurationError::UnknownSection("Environment".to_string()))
        );
        assert!(matches!(
            weights.set("Governance", 100.5),
            Err(ConfigurationError::WeightOutOfRange { .. })
        ));
        assert_eq!(weights.get("Governance"), Some(100.0));
    }

    #[test]
    fn test_adjust_clamps() {
        let mut weights = SectionWeights::from_rubric(&rubric());
        assert_eq!(weights.adjust("Governance", 5.0).unwrap(), 45.0);
        assert_eq!(weights.adjust("Governance", 100.0).unwrap(), 100.0);
        assert_eq!(weights.adjust("Transparency", -75.0).unwrap(), 0.0);
        assert!(weights.adjust("Nope", 1.0).is_err());
    }

    #[test]
    fn test_apply_overrides_is_all_or_nothing() {
        let mut weights = SectionWeights::from_rubric(&rubric());
        let errors = weights
            .apply_overrides([("Governance", 10.0), ("Nope", 5.0), ("Transparency", -1.0)])
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(weights.get("Governance"), Some(40.0));

        weights
            .apply_overrides([("Governance", 10.0), ("Transparency", 20.0)])
            .unwrap();
        assert_eq!(weights.get("Governance"), Some(10.0));
        assert_eq!(weights.get("Transparency"), Some(20.0));
    }

    #[test]
    fn test_payload_is_sorted_by_name() {
        let weights = SectionWeights::from_rubric(&rubric());
        let json = serde_json::to_string(&weights.payload()).unwrap();
        assert_eq!(json, r#"{"Governance":40.0,"Transparency":60.0}"#);
    }

    #[test]
    fn test_parse_weight_override() {
        assert_eq!(
            parse_weight_override("Governance=40").unwrap(),
            ("Governance".to_string(), 40.0)
        );
        assert_eq!(
            parse_weight_override(" Data Privacy = 12.5 ").unwrap(),
            ("Data Privacy".to_string(), 12.5)
        );
        assert_eq!(
            parse_weight_override("A=B=3").unwrap(),
            ("A=B".to_string(), 3.0)
        );
        assert!(parse_weight_override("Governance").is_err());
        assert!(parse_weight_override("=40").is_err());
        assert!(parse_weight_override("Governance=lots").is_err());
    }
}
