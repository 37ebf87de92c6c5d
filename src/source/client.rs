use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, info, warn};

use super::SourceError;
use crate::answers::AnswerSet;
use crate::config::Config;
use crate::error::EngineError;
use crate::rubric::{ModelInfo, RubricModel};

const USER_AGENT: &str = concat!("ethics-grade/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the ethics data service.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    read_only_model: String,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SourceError::BaseUrl(config.base_url.clone()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url,
            read_only_model: config.default_model.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Join path segments onto the base URL. Each segment is percent-encoded
    /// on its own, so a model name containing `/` or spaces stays one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_once(&self, url: &Url) -> Result<String, SourceError> {
        let network = |source| SourceError::Network {
            url: url.to_string(),
            source,
        };

        let response = self.http.get(url.clone()).send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response.text().await.map_err(network)
    }

    /// GET a body, retrying transport failures and server errors.
    async fn get_text(&self, segments: &[&str]) -> Result<String, SourceError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET");

        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        RetryIf::spawn(
            retry_strategy,
            || self.get_once(&url),
            |e: &SourceError| {
                let retry = e.is_retryable();
                if retry {
                    warn!(error = %e, "request failed, retrying");
                }
                retry
            },
        )
        .await
    }

    /// `GET apis/model/models`
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let body = self.get_text(&["apis", "model", "models"]).await?;
        let models: Vec<ModelInfo> =
            serde_json::from_str(&body).map_err(|source| EngineError::Parse {
                what: "model list",
                source,
            })?;
        debug!(count = models.len(), "fetched model list");
        Ok(models)
    }

    /// `GET apis/model/questions/{model}`
    pub async fn fetch_rubric(&self, model: &str) -> Result<RubricModel> {
        let body = self.get_text(&["apis", "model", "questions", model]).await?;
        let rubric = RubricModel::from_json(&body)
            .with_context(|| format!("Model '{}' has an unusable rubric", model))?;
        debug!(
            model,
            sections = rubric.sections().len(),
            questions = rubric.question_count(),
            "fetched rubric"
        );
        Ok(rubric)
    }

    /// `GET apis/model/answers`
    pub async fn fetch_answers(&self) -> Result<AnswerSet> {
        let body = self.get_text(&["apis", "model", "answers"]).await?;
        let answers = AnswerSet::from_json(&body)?;
        debug!(companies = answers.len(), "fetched answers");
        Ok(answers)
    }

    pub fn is_read_only(&self, model: &str) -> bool {
        model == self.read_only_model
    }

    /// `POST apis/model/update/{model}` with a section name -> weight body.
    /// Only 200 and 201 count as saved. Never retried.
    pub async fn save_weights(&self, model: &str, weights: &BTreeMap<String, f64>) -> Result<()> {
        if self.is_read_only(model) {
            return Err(SourceError::ReadOnlyModel(model.to_string()).into());
        }

        let url = self.endpoint(&["apis", "model", "update", model])?;
        debug!(url = %url, "POST");

        let response = self
            .http
            .post(url.clone())
            .json(weights)
            .send()
            .await
            .map_err(|source| SourceError::Network {
                url: url.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!(model, sections = weights.len(), "saved weights");
                Ok(())
            }
            status => Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into()),
        }
    }
}
