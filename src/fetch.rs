use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::answers::AnswerSet;
use crate::rubric::{ModelInfo, RubricModel};
use crate::source::Client;

/// Everything one scoring session needs from the data service, fetched at a
/// single point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub model_name: String,
    pub models: Vec<ModelInfo>,
    pub rubric: RubricModel,
    pub answers: AnswerSet,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// Names of every model the service offers, in service order.
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.model_name.clone()).collect()
    }
}

/// Fetch the model list, the model's rubric and the answer set concurrently.
///
/// Called from main.rs for the initial load and from the dashboard for
/// refresh. Any failed request fails the whole snapshot; the engine never
/// runs on partial data.
pub async fn load_snapshot(client: &Client, model: &str) -> Result<Snapshot> {
    let (models, rubric, answers) = tokio::try_join!(
        client.list_models(),
        client.fetch_rubric(model),
        client.fetch_answers(),
    )?;

    if !models.iter().any(|m| m.model_name == model) {
        warn!(model, "model is not in the service's model list");
    }

    info!(
        model,
        sections = rubric.sections().len(),
        companies = answers.len(),
        "loaded snapshot"
    );

    Ok(Snapshot {
        model_name: model.to_string(),
        models,
        rubric,
        answers,
        fetched_at: Utc::now(),
    })
}
