use super::types::RubricDocument;
use crate::error::ConfigurationError;
use std::collections::HashSet;

pub(crate) fn weight_in_range(value: f64) -> bool {
    (0.0..=100.0).contains(&value)
}

/// Human-readable location of a group, used in errors and logs.
pub(crate) fn group_label(section: &str, index: usize, name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{} / {}", section, name),
        None => format!("{} / group {}", section, index + 1),
    }
}

/// Validate a rubric document before it is turned into a `RubricModel`.
/// Returns all problems at once (not just the first).
pub fn validate_rubric(doc: &RubricDocument) -> Result<(), Vec<ConfigurationError>> {
    let mut errors = Vec::new();

    if doc.sections.is_empty() {
        errors.push(ConfigurationError::NoSections);
    }

    let mut section_names = HashSet::new();
    let mut question_ids = HashSet::new();

    for section in &doc.sections {
        let name = &section.section_name;

        if !section_names.insert(name.as_str()) {
            errors.push(ConfigurationError::DuplicateSection(name.clone()));
        }

        if !weight_in_range(section.section_weightage) {
            errors.push(ConfigurationError::WeightOutOfRange {
                location: format!("section '{}'", name),
                value: section.section_weightage,
            });
        }

        if section.groups.is_empty() {
            errors.push(ConfigurationError::EmptySection {
                section: name.clone(),
            });
        }

        for (i, group) in section.groups.iter().enumerate() {
            let label = group_label(name, i, group.group_name.as_deref());

            if !weight_in_range(group.group_weightage) {
                errors.push(ConfigurationError::WeightOutOfRange {
                    location: format!("group '{}'", label),
                    value: group.group_weightage,
                });
            }

            if group.questions.is_empty() {
                errors.push(ConfigurationError::EmptyGroup {
                    group: label.clone(),
                });
            }

            for question in &group.questions {
                if !question_ids.insert(&question.question_id) {
                    errors.push(ConfigurationError::DuplicateQuestion(
                        question.question_id.to_string(),
                    ));
                }
                if !weight_in_range(question.question_weightage) {
                    errors.push(ConfigurationError::WeightOutOfRange {
                        location: format!("question '{}'", question.question_id),
                        value: question.question_weightage,
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
