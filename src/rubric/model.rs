use super::types::{Id, RubricDocument};
use super::validation::{group_label, validate_rubric};
use crate::error::EngineError;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: Id,
    pub weight: f64, // percent of its group
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub label: String, // "Section / name" or "Section / group N"
    pub weight: f64,   // percent of its section
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub weight: f64, // rubric default; sessions may override
    pub groups: Vec<Group>,
}

/// A validated rubric. Only constructed through [`RubricModel::from_document`],
/// so every section has groups, every group has questions, section names and
/// question ids are unique and all weights are within [0, 100].
#[derive(Debug, Clone, PartialEq)]
pub struct RubricModel {
    pub model_name: Option<String>,
    sections: Vec<Section>,
    section_index: HashMap<String, usize>,
    question_ids: HashSet<Id>,
}

impl RubricModel {
    pub fn from_document(doc: RubricDocument) -> Result<Self, EngineError> {
        validate_rubric(&doc).map_err(EngineError::InvalidRubric)?;

        let mut section_index = HashMap::new();
        let mut question_ids = HashSet::new();
        let mut sections = Vec::with_capacity(doc.sections.len());

        for (i, section) in doc.sections.into_iter().enumerate() {
            section_index.insert(section.section_name.clone(), i);

            let groups = section
                .groups
                .into_iter()
                .enumerate()
                .map(|(g, group)| {
                    let questions = group
                        .questions
                        .into_iter()
                        .map(|q| {
                            question_ids.insert(q.question_id.clone());
                            Question {
                                id: q.question_id,
                                weight: q.question_weightage,
                            }
                        })
                        .collect();
                    Group {
                        label: group_label(&section.section_name, g, group.group_name.as_deref()),
                        weight: group.group_weightage,
                        questions,
                    }
                })
                .collect();

            sections.push(Section {
                name: section.section_name,
                weight: section.section_weightage,
                groups,
            });
        }

        Ok(Self {
            model_name: doc.model_name,
            sections,
            section_index,
            question_ids,
        })
    }

    /// Parse and validate the JSON body of `apis/model/questions/{model}`.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let doc: RubricDocument = serde_json::from_str(json).map_err(|source| EngineError::Parse {
            what: "rubric",
            source,
        })?;
        Self::from_document(doc)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.section_index.get(name).map(|&i| &self.sections[i])
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn has_question(&self, id: &Id) -> bool {
        self.question_ids.contains(id)
    }

    pub fn question_count(&self) -> usize {
        self.question_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUBRIC: &str = r#"{
        "model_name": "EthicsGrade 6.2",
        "sections": [
            {"section_name": "Governance", "section_weightage": 40, "groups": [
                {"group_name": "Board", "group_weightage": 60, "questions": [
                    {"question_id": 1, "question_weightage": 50},
                    {"question_id": 2, "question_weightage": 50}]},
                {"group_weightage": 40, "questions": [
                    {"question_id": 3, "question_weightage": 100}]}]},
            {"section_name": "Transparency", "section_weightage": 60, "groups": [
                {"group_weightage": 100, "questions": [
                    {"question_id": "t-1", "question_weightage": 100}]}]}
        ]
    }"#;

    #[test]
    fn test_from_json_builds_lookup_tables() {
        let rubric = RubricModel::from_json(RUBRIC).unwrap();
        assert_eq!(rubric.model_name.as_deref(), Some("EthicsGrade 6.2"));
        assert_eq!(
            rubric.section_names().collect::<Vec<_>>(),
            vec!["Governance", "Transparency"]
        );
        assert_eq!(rubric.section("Transparency").unwrap().weight, 60.0);
        assert!(rubric.section("Environment").is_none());
        assert!(rubric.has_question(&Id::from(2)));
        assert!(rubric.has_question(&Id::from("t-1")));
        assert!(!rubric.has_question(&Id::from(99)));
        assert_eq!(rubric.question_count(), 4);
    }

    #[test]
    fn test_group_labels() {
        let rubric = RubricModel::from_json(RUBRIC).unwrap();
        let groups = &rubric.section("Governance").unwrap().groups;
        assert_eq!(groups[0].label, "Governance / Board");
        assert_eq!(groups[1].label, "Governance / group 2");
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = RubricModel::from_json("{\"sections\": 3}").unwrap_err();
        assert!(matches!(err, EngineError::Parse { what: "rubric", .. }));
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        let err = RubricModel::from_json(r#"{"sections": []}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRubric(_)));
    }
}
