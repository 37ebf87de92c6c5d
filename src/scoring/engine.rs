use super::normalize::{normalize_total, round4};
use super::rating::Rating;
use super::weights::SectionWeights;
use crate::answers::{AnswerSet, CompanyRecord};
use crate::error::ConfigurationError;
use crate::rubric::{Group, RubricModel, Section};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// What to do when two company records share a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Keep the first row's position, take the last record's scores. Logged.
    #[default]
    Overwrite,
    /// Fail the run with `ConfigurationError::DuplicateCompanyName`.
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyScore {
    pub name: String,
    pub industry: String,
    pub sections: HashMap<String, f64>, // section name -> raw section score
    pub raw_total: f64,
    pub total: f64, // normalized
    pub rating: Rating,
}

/// Conditions that don't stop a run but are worth surfacing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringDiagnostics {
    /// Answers naming a question the rubric doesn't contain.
    pub unknown_question_refs: usize,
    /// (company, question) pairs with no answer at all. Scored as NO.
    pub unanswered: usize,
    /// Display names shared by more than one company record.
    pub name_collisions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreRun {
    pub section_names: Vec<String>,
    pub companies: Vec<CompanyScore>,
    pub diagnostics: ScoringDiagnostics,
}

/// Sum of `weight / 100` over the questions answered YES.
pub fn questions_score(group: &Group, company: &CompanyRecord) -> f64 {
    group
        .questions
        .iter()
        .filter(|q| company.answer(&q.id).is_some_and(|a| a.is_yes()))
        .map(|q| q.weight / 100.0)
        .sum()
}

/// Weighted score of one group, rounded once to 4 decimals.
pub fn group_score(
    group: &Group,
    company: &CompanyRecord,
    section_weight: f64,
) -> Result<f64, ConfigurationError> {
    let question_count = group.questions.len();
    if question_count == 0 {
        return Err(ConfigurationError::EmptyGroup {
            group: group.label.clone(),
        });
    }

    let total = questions_score(group, company);
    Ok(round4(
        (total * 100.0) * (section_weight / 100.0) / question_count as f64
            * (group.weight / 100.0),
    ))
}

/// Sum of the section's (already rounded) group scores.
pub fn section_score(
    section: &Section,
    company: &CompanyRecord,
    section_weight: f64,
) -> Result<f64, ConfigurationError> {
    section
        .groups
        .iter()
        .map(|group| group_score(group, company, section_weight))
        .sum()
}

fn score_company(
    rubric: &RubricModel,
    weights: &SectionWeights,
    company: &CompanyRecord,
) -> Result<CompanyScore, ConfigurationError> {
    let mut sections = HashMap::with_capacity(rubric.sections().len());
    let mut raw_total = 0.0;

    for section in rubric.sections() {
        let weight = weights
            .get(&section.name)
            .ok_or_else(|| ConfigurationError::UnknownSection(section.name.clone()))?;
        let score = section_score(section, company, weight)?;
        raw_total += score;
        sections.insert(section.name.clone(), score);
    }

    let total = normalize_total(raw_total);
    Ok(CompanyScore {
        name: company.name.clone(),
        industry: company.industry.clone(),
        sections,
        raw_total,
        total,
        rating: Rating::classify(total),
    })
}

fn count_unanswered(rubric: &RubricModel, company: &CompanyRecord) -> usize {
    rubric
        .sections()
        .iter()
        .flat_map(|s| &s.groups)
        .flat_map(|g| &g.questions)
        .filter(|q| company.answer(&q.id).is_none())
        .count()
}

/// Score every company against every section of the rubric.
///
/// One full pass; nothing is cached between runs, so the same inputs always
/// give the same output.
pub fn score_companies(
    rubric: &RubricModel,
    weights: &SectionWeights,
    answers: &AnswerSet,
    policy: CollisionPolicy,
) -> Result<ScoreRun, ConfigurationError> {
    let mut companies: Vec<CompanyScore> = Vec::with_capacity(answers.len());
    let mut by_name: HashMap<String, usize> = HashMap::with_capacity(answers.len());
    let mut first_id: HashMap<String, String> = HashMap::new();
    let mut diagnostics = ScoringDiagnostics::default();

    for company in answers.companies() {
        let unknown: Vec<_> = company
            .answers
            .keys()
            .filter(|id| !rubric.has_question(id))
            .collect();
        if !unknown.is_empty() {
            debug!(company = %company.name, ids = ?unknown, "answers reference unknown questions");
            diagnostics.unknown_question_refs += unknown.len();
        }

        let unanswered = count_unanswered(rubric, company);
        if unanswered > 0 {
            trace!(company = %company.name, unanswered, "questions without answers scored as NO");
        }
        diagnostics.unanswered += unanswered;

        let score = score_company(rubric, weights, company)?;

        match by_name.get(&company.name) {
            Some(&index) => {
                let first = first_id.get(&company.name).cloned().unwrap_or_default();
                if policy == CollisionPolicy::Reject {
                    return Err(ConfigurationError::DuplicateCompanyName {
                        name: company.name.clone(),
                        first,
                        second: company.id.to_string(),
                    });
                }
                warn!(
                    name = %company.name,
                    first = %first,
                    second = %company.id,
                    "company name collision; later record overwrites earlier scores"
                );
                if !diagnostics.name_collisions.contains(&company.name) {
                    diagnostics.name_collisions.push(company.name.clone());
                }
                companies[index] = score;
            }
            None => {
                by_name.insert(company.name.clone(), companies.len());
                first_id.insert(company.name.clone(), company.id.to_string());
                companies.push(score);
            }
        }
    }

    if diagnostics.unknown_question_refs > 0 {
        warn!(
            count = diagnostics.unknown_question_refs,
            "ignored answers for questions not in the rubric"
        );
    }
    debug!(
        companies = companies.len(),
        sections = rubric.sections().len(),
        unanswered = diagnostics.unanswered,
        "scoring run complete"
    );

    Ok(ScoreRun {
        section_names: rubric.section_names().map(str::to_string).collect(),
        companies,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerResult;
    use crate::rubric::{Id, Question};

    fn company(name: &str, yes: &[i64], no: &[i64]) -> CompanyRecord {
        let mut answers = HashMap::new();
        for id in yes {
            answers.insert(Id::from(*id), AnswerResult::Yes);
        }
        for id in no {
            answers.insert(Id::from(*id), AnswerResult::No);
        }
        CompanyRecord {
            id: Id::from(name),
            name: name.to_string(),
            industry: "Retail".to_string(),
            answers,
        }
    }

    fn group(weight: f64, questions: &[(i64, f64)]) -> Group {
        Group {
            label: "Test / group 1".to_string(),
            weight,
            questions: questions
                .iter()
                .map(|(id, w)| Question {
                    id: Id::from(*id),
                    weight: *w,
                })
                .collect(),
        }
    }

    const TWO_SECTIONS: &str = r#"{"sections": [
        {"section_name": "Governance", "section_weightage": 40, "groups": [
            {"group_weightage": 60, "questions": [
                {"question_id": 1, "question_weightage": 50},
                {"question_id": 2, "question_weightage": 50}]},
            {"group_weightage": 40, "questions": [
                {"question_id": 3, "question_weightage": 100}]}]},
        {"section_name": "Transparency", "section_weightage": 60, "groups": [
            {"group_weightage": 100, "questions": [
                {"question_id": 4, "question_weightage": 30},
                {"question_id": 5, "question_weightage": 70}]}]}
    ]}"#;

    #[test]
    fn test_questions_score_counts_only_yes() {
        let g = group(100.0, &[(1, 40.0), (2, 60.0), (3, 25.0)]);
        let c = company("Acme", &[1, 3], &[2]);
        assert!((questions_score(&g, &c) - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_all_yes_single_question_full_weights() {
        let g = group(100.0, &[(1, 100.0)]);
        let c = company("Acme", &[1], &[]);
        assert_eq!(questions_score(&g, &c), 1.0);
        assert_eq!(group_score(&g, &c, 100.0).unwrap(), 100.0);
    }

    #[test]
    fn test_no_yes_answers_scores_zero() {
        let g = group(100.0, &[(1, 50.0), (2, 50.0)]);
        let c = company("Acme", &[], &[1]);
        assert_eq!(group_score(&g, &c, 100.0).unwrap(), 0.0);
    }

    #[test]
    fn test_group_formula() {
        // (0.5 * 100) * (40/100) / 2 * (60/100) = 6
        let g = group(60.0, &[(1, 50.0), (2, 50.0)]);
        let c = company("Acme", &[1], &[2]);
        assert_eq!(group_score(&g, &c, 40.0).unwrap(), 6.0);
    }

    #[test]
    fn test_group_score_rounds_once_to_four_places() {
        // (1.0 * 100) * (100/100) / 3 * (100/100) = 33.3333...
        let g = group(100.0, &[(1, 100.0), (2, 0.0), (3, 0.0)]);
        let c = company("Acme", &[1], &[]);
        assert_eq!(group_score(&g, &c, 100.0).unwrap(), 33.3333);
    }

    #[test]
    fn test_group_score_below_half_rounds_down() {
        // (0.15 * 100) * (10/100) / 4 * (15/100) = 0.056249999999999994
        let g = group(15.0, &[(1, 15.0), (2, 10.0), (3, 10.0), (4, 10.0)]);
        let c = company("Acme", &[1], &[2, 3, 4]);
        assert_eq!(group_score(&g, &c, 10.0).unwrap(), 0.0562);
    }

    #[test]
    fn test_empty_group_is_a_configuration_error() {
        let g = group(100.0, &[]);
        let c = company("Acme", &[], &[]);
        assert_eq!(
            group_score(&g, &c, 100.0),
            Err(ConfigurationError::EmptyGroup {
                group: "Test / group 1".to_string()
            })
        );
    }

    #[test]
    fn test_governance_end_to_end() {
        let rubric = RubricModel::from_json(
            r#"{"sections": [{"section_name": "Governance", "section_weightage": 100, "groups": [
                {"group_weightage": 100, "questions": [
                    {"question_id": 1, "question_weightage": 50},
                    {"question_id": 2, "question_weightage": 50}]}]}]}"#,
        )
        .unwrap();
        let weights = SectionWeights::from_rubric(&rubric);
        let answers = AnswerSet::new(vec![company("Acme", &[1, 2], &[])]);

        let run = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        let acme = &run.companies[0];
        assert_eq!(acme.sections["Governance"], 50.0);
        assert_eq!(acme.raw_total, 50.0);
        assert_eq!(acme.total, 50.0);
        assert_eq!(acme.rating, Rating::NotRated);
    }

    #[test]
    fn test_every_company_gets_every_section() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let weights = SectionWeights::from_rubric(&rubric);
        let answers = AnswerSet::new(vec![
            company("Acme", &[1, 2, 3, 4, 5], &[]),
            company("Globex", &[], &[]),
        ]);

        let run = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        assert_eq!(run.section_names, vec!["Governance", "Transparency"]);
        for score in &run.companies {
            assert_eq!(score.sections.len(), 2);
        }

        let acme = &run.companies[0];
        // Governance: 1.0*100*0.4/2*0.6 + 1.0*100*0.4/1*0.4 = 12 + 16
        assert_eq!(acme.sections["Governance"], 28.0);
        // Transparency: 1.0*100*0.6/2*1.0 = 30
        assert_eq!(acme.sections["Transparency"], 30.0);
        assert_eq!(acme.raw_total, 58.0);
        assert_eq!(acme.total, 58.0);
        assert_eq!(acme.rating, Rating::D);

        let globex = &run.companies[1];
        assert_eq!(globex.total, 0.0);
        assert_eq!(globex.rating, Rating::NotRated);
        assert_eq!(run.diagnostics.unanswered, 5);
    }

    #[test]
    fn test_section_weight_change_does_not_leak() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let answers = AnswerSet::new(vec![company("Acme", &[1, 3, 5], &[2, 4])]);
        let mut weights = SectionWeights::from_rubric(&rubric);

        let before = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        weights.set("Governance", 90.0).unwrap();
        let after = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();

        assert_eq!(
            before.companies[0].sections["Transparency"],
            after.companies[0].sections["Transparency"]
        );
        assert_ne!(
            before.companies[0].sections["Governance"],
            after.companies[0].sections["Governance"]
        );
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let weights = SectionWeights::from_rubric(&rubric);
        let answers = AnswerSet::new(vec![
            company("Acme", &[1, 3, 5], &[2, 4]),
            company("Globex", &[2, 4], &[]),
        ]);

        let first = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        for _ in 0..5 {
            let again =
                score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
            assert_eq!(first, again);
            for (a, b) in first.companies.iter().zip(&again.companies) {
                assert_eq!(a.total.to_bits(), b.total.to_bits());
            }
        }
    }

    #[test]
    fn test_raw_total_above_ninety_is_compressed() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let mut weights = SectionWeights::from_rubric(&rubric);
        weights.set("Governance", 100.0).unwrap();
        weights.set("Transparency", 100.0).unwrap();
        let answers = AnswerSet::new(vec![company("Acme", &[1, 2, 3, 4, 5], &[])]);

        let run = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        let acme = &run.companies[0];
        // Governance 30 + 40, Transparency 50
        assert_eq!(acme.raw_total, 120.0);
        assert_eq!(acme.total, normalize_total(120.0));
        assert_eq!(acme.rating, Rating::APlus);
    }

    #[test]
    fn test_unknown_question_refs_are_counted() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let weights = SectionWeights::from_rubric(&rubric);
        let answers = AnswerSet::new(vec![company("Acme", &[1, 77, 78], &[])]);

        let run = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        assert_eq!(run.diagnostics.unknown_question_refs, 2);
        assert_eq!(run.companies.len(), 1);
    }

    #[test]
    fn test_name_collision_overwrites_in_place() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let weights = SectionWeights::from_rubric(&rubric);
        let mut second = company("Acme", &[4, 5], &[]);
        second.id = Id::from(2);
        let answers = AnswerSet::new(vec![
            company("Acme", &[], &[]),
            company("Globex", &[], &[]),
            second,
        ]);

        let run = score_companies(&rubric, &weights, &answers, CollisionPolicy::Overwrite).unwrap();
        assert_eq!(run.companies.len(), 2);
        assert_eq!(run.companies[0].name, "Acme");
        assert_eq!(run.companies[0].sections["Transparency"], 30.0);
        assert_eq!(run.diagnostics.name_collisions, vec!["Acme".to_string()]);
    }

    #[test]
    fn test_name_collision_rejected_in_strict_mode() {
        let rubric = RubricModel::from_json(TWO_SECTIONS).unwrap();
        let weights = SectionWeights::from_rubric(&rubric);
        let mut second = company("Acme", &[], &[]);
        second.id = Id::from(2);
        let answers = AnswerSet::new(vec![company("Acme", &[], &[]), second]);

        let err = score_companies(&rubric, &weights, &answers, CollisionPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicateCompanyName {
                name: "Acme".to_string(),
                first: "Acme".to_string(),
                second: "2".to_string(),
            }
        );
    }
}
