use crate::error::EngineError;
use crate::rubric::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One company as delivered by `apis/model/answers`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CompanyDocument {
    pub id: Id,
    pub name: String,
    pub industry: String,
    pub answers: Vec<AnswerDocument>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AnswerDocument {
    pub question: Id,
    pub answer_result: Option<String>, // "YES" | "NO" | null
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerResult {
    Yes,
    No,
    Absent,
}

impl AnswerResult {
    /// Only an exact `"YES"` counts. Unrecognized strings score like `NO`.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("YES") => AnswerResult::Yes,
            Some(_) => AnswerResult::No,
            None => AnswerResult::Absent,
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, AnswerResult::Yes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub id: Id,
    pub name: String,
    pub industry: String,
    pub answers: HashMap<Id, AnswerResult>,
}

impl CompanyRecord {
    pub fn answer(&self, question: &Id) -> Option<AnswerResult> {
        self.answers.get(question).copied()
    }
}

impl From<CompanyDocument> for CompanyRecord {
    fn from(doc: CompanyDocument) -> Self {
        // A repeated question keeps its last answer.
        let answers = doc
            .answers
            .into_iter()
            .map(|a| {
                let result = AnswerResult::from_wire(a.answer_result.as_deref());
                (a.question, result)
            })
            .collect();
        Self {
            id: doc.id,
            name: doc.name,
            industry: doc.industry,
            answers,
        }
    }
}

/// Every company's answers, in the order the data source listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    companies: Vec<CompanyRecord>,
}

impl AnswerSet {
    pub fn new(companies: Vec<CompanyRecord>) -> Self {
        Self { companies }
    }

    pub fn from_documents(docs: Vec<CompanyDocument>) -> Self {
        Self::new(docs.into_iter().map(CompanyRecord::from).collect())
    }

    /// Parse the JSON body of `apis/model/answers`. Any company missing `id`,
    /// `name`, `industry` or `answers` rejects the whole set.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let docs: Vec<CompanyDocument> =
            serde_json::from_str(json).map_err(|source| EngineError::Parse {
                what: "answer set",
                source,
            })?;
        Ok(Self::from_documents(docs))
    }

    pub fn companies(&self) -> &[CompanyRecord] {
        &self.companies
    }

    pub fn len(&self) -> usize {
        self.companies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWERS: &str = r#"[
        {"id": 1, "name": "Acme", "industry": "Retail", "answers": [
            {"question": 1, "answer_result": "YES"},
            {"question": 2, "answer_result": "NO"},
            {"question": 3, "answer_result": null},
            {"question": 4}
        ]},
        {"id": "c-2", "name": "Globex", "industry": "Energy", "answers": []}
    ]"#;

    #[test]
    fn test_from_json_keeps_order() {
        let set = AnswerSet::from_json(ANSWERS).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.companies()[0].name, "Acme");
        assert_eq!(set.companies()[1].id, Id::from("c-2"));
    }

    #[test]
    fn test_answer_results() {
        let set = AnswerSet::from_json(ANSWERS).unwrap();
        let acme = &set.companies()[0];
        assert_eq!(acme.answer(&Id::from(1)), Some(AnswerResult::Yes));
        assert_eq!(acme.answer(&Id::from(2)), Some(AnswerResult::No));
        assert_eq!(acme.answer(&Id::from(3)), Some(AnswerResult::Absent));
        assert_eq!(acme.answer(&Id::from(4)), Some(AnswerResult::Absent));
        assert_eq!(acme.answer(&Id::from(5)), None);
    }

    #[test]
    fn test_only_exact_yes_counts() {
        assert!(AnswerResult::from_wire(Some("YES")).is_yes());
        assert!(!AnswerResult::from_wire(Some("yes")).is_yes());
        assert!(!AnswerResult::from_wire(Some("NO")).is_yes());
        assert!(!AnswerResult::from_wire(None).is_yes());
    }

    #[test]
    fn test_repeated_question_keeps_last_answer() {
        let json = r#"[{"id": 1, "name": "Acme", "industry": "Retail", "answers": [
            {"question": 1, "answer_result": "NO"},
            {"question": 1, "answer_result": "YES"}
        ]}]"#;
        let set = AnswerSet::from_json(json).unwrap();
        assert_eq!(
            set.companies()[0].answer(&Id::from(1)),
            Some(AnswerResult::Yes)
        );
    }

    #[test]
    fn test_incomplete_company_is_rejected() {
        let json = r#"[{"id": 1, "name": "Acme", "answers": []}]"#;
        let err = AnswerSet::from_json(json).unwrap_err();
        assert!(matches!(err, EngineError::Parse { what: "answer set", .. }));
    }
}
