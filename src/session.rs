use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tracing::debug;

use crate::answers::AnswerSet;
use crate::error::ConfigurationError;
use crate::fetch::Snapshot;
use crate::rubric::RubricModel;
use crate::scoring::{score_companies, CollisionPolicy, ScoreRun, SectionWeights};
use crate::table::ScoreTable;

/// One user's working state: a rubric, the answers it scores and the weights
/// currently applied. Every recompute is a full pass over this state.
#[derive(Debug, Clone)]
pub struct Session {
    model_name: String,
    rubric: RubricModel,
    answers: AnswerSet,
    weights: SectionWeights,
    policy: CollisionPolicy,
    read_only: bool,
}

impl Session {
    pub fn new(
        model_name: impl Into<String>,
        rubric: RubricModel,
        answers: AnswerSet,
        policy: CollisionPolicy,
        read_only: bool,
    ) -> Self {
        let weights = SectionWeights::from_rubric(&rubric);
        Self {
            model_name: model_name.into(),
            rubric,
            answers,
            weights,
            policy,
            read_only,
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, policy: CollisionPolicy, read_only: bool) -> Self {
        Self::new(
            snapshot.model_name,
            snapshot.rubric,
            snapshot.answers,
            policy,
            read_only,
        )
    }

    /// Swap in freshly fetched data. Weight overrides carry over for sections
    /// that still exist.
    pub fn replace_data(&mut self, snapshot: Snapshot) {
        let previous = self.weights.payload();
        self.rubric = snapshot.rubric;
        self.answers = snapshot.answers;
        self.weights = SectionWeights::from_rubric(&self.rubric);
        for (section, weight) in previous {
            if let Err(e) = self.weights.set(&section, weight) {
                debug!(error = %e, "dropped weight override after refresh");
            }
        }
    }

    /// Load a different model. Weights start from the new rubric's own and
    /// the read-only flag follows the new model.
    pub fn switch_model(&mut self, snapshot: Snapshot, read_only: bool) {
        debug!(from = %self.model_name, to = %snapshot.model_name, "switching model");
        self.model_name = snapshot.model_name;
        self.rubric = snapshot.rubric;
        self.answers = snapshot.answers;
        self.weights = SectionWeights::from_rubric(&self.rubric);
        self.read_only = read_only;
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn rubric(&self) -> &RubricModel {
        &self.rubric
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn weights(&self) -> &SectionWeights {
        &self.weights
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// True when any weight differs from the rubric's own.
    pub fn is_modified(&self) -> bool {
        self.weights != SectionWeights::from_rubric(&self.rubric)
    }

    pub fn recompute(&self) -> Result<ScoreRun, ConfigurationError> {
        score_companies(&self.rubric, &self.weights, &self.answers, self.policy)
    }

    pub fn table(&self) -> Result<ScoreTable, ConfigurationError> {
        self.recompute().map(|run| ScoreTable::from_run(&run))
    }

    pub fn set_weight(&mut self, section: &str, weight: f64) -> Result<(), ConfigurationError> {
        self.weights.set(section, weight)
    }

    pub fn adjust_weight(&mut self, section: &str, delta: f64) -> Result<f64, ConfigurationError> {
        self.weights.adjust(section, delta)
    }

    pub fn apply_overrides<'a, I>(&mut self, overrides: I) -> Result<(), Vec<ConfigurationError>>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        self.weights.apply_overrides(overrides)
    }

    pub fn reset_weights(&mut self) {
        self.weights = SectionWeights::from_rubric(&self.rubric);
    }

    /// Body for saving the current weights to this session's model.
    pub fn save_payload(&self) -> Result<BTreeMap<String, f64>> {
        if self.read_only {
            bail!(
                "Model '{}' is read-only; weights can only be saved to a custom model",
                self.model_name
            );
        }
        Ok(self.weights.payload())
    }
}
