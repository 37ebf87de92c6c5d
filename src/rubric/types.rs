use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used by the data source for questions and companies.
///
/// The API sends either integers or strings; both are kept as their decimal
/// text so `7` and `"7"` refer to the same question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(from = "RawId", into = "String")]
pub struct Id(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl From<RawId> for Id {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Int(n) => Id(n.to_string()),
            RawId::Text(s) => Id(s),
        }
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id(n.to_string())
    }
}

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rubric as delivered by `apis/model/questions/{model}`.
///
/// Example JSON:
/// ```json
/// { "sections": [
///     { "section_name": "Governance", "section_weightage": 40,
///       "groups": [
///         { "group_weightage": 100,
///           "questions": [ { "question_id": 12, "question_weightage": 50 } ] } ] } ] }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RubricDocument {
    #[serde(default)]
    pub model_name: Option<String>,

    pub sections: Vec<SectionDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SectionDocument {
    pub section_name: String,
    pub section_weightage: f64,
    pub groups: Vec<GroupDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GroupDocument {
    #[serde(default)]
    pub group_name: Option<String>,
    pub group_weightage: f64,
    pub questions: Vec<QuestionDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct QuestionDocument {
    pub question_id: Id,
    pub question_weightage: f64,
}

/// One entry of `apis/model/models`. Only the name matters to scoring; the rest
/// is carried through for display.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelInfo {
    pub model_name: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_accepts_int_and_string() {
        let ids: Vec<Id> = serde_json::from_str(r#"[7, "7", "q-9"]"#).unwrap();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "q-9");
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = Id::from(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""42""#);
    }

    #[test]
    fn test_parse_rubric_document() {
        let json = r#"{
            "sections": [{
                "section_name": "Governance",
                "section_weightage": 40,
                "groups": [{
                    "group_weightage": 100,
                    "questions": [
                        {"question_id": 1, "question_weightage": 50},
                        {"question_id": "2", "question_weightage": 50.5}
                    ]
                }]
            }]
        }"#;
        let doc: RubricDocument = serde_json::from_str(json).unwrap();
        assert!(doc.model_name.is_none());
        assert_eq!(doc.sections[0].section_weightage, 40.0);
        let questions = &doc.sections[0].groups[0].questions;
        assert_eq!(questions[0].question_id, Id::from("1"));
        assert_eq!(questions[1].question_weightage, 50.5);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"{"sections": [{"section_name": "Governance", "groups": []}]}"#;
        assert!(serde_json::from_str::<RubricDocument>(json).is_err());
    }

    #[test]
    fn test_model_info_keeps_extra_fields() {
        let json = r#"{"model_name": "EthicsGrade 6.2", "id": 3}"#;
        let info: ModelInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.model_name, "EthicsGrade 6.2");
        assert_eq!(info.extra.get("id"), Some(&serde_json::json!(3)));
    }
}
