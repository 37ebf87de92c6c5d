use serde::{Deserialize, Serialize};

use crate::scoring::CollisionPolicy;

pub const DEFAULT_BASE_URL: &str = "http://ethicdemo-dev.us-west-2.elasticbeanstalk.com";
pub const DEFAULT_MODEL: &str = "EthicsGrade 6.2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: String,
    /// The reference model. Read-only: weights are never saved to it.
    pub default_model: String,
    pub request_timeout_secs: u64,
    /// Fail a scoring run when two companies share a name instead of
    /// overwriting the earlier row.
    pub strict_company_names: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            strict_company_names: false,
        }
    }
}

impl Config {
    pub fn collision_policy(&self) -> CollisionPolicy {
        if self.strict_company_names {
            CollisionPolicy::Reject
        } else {
            CollisionPolicy::Overwrite
        }
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    let base_url = config.base_url.trim();
    if base_url.is_empty() {
        errors.push("base_url: must not be empty".to_string());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(format!(
            "base_url: '{}' must start with http:// or https://",
            config.base_url
        ));
    }

    if config.default_model.trim().is_empty() {
        errors.push("default_model: must not be empty".to_string());
    }

    if config.request_timeout_secs == 0 {
        errors.push("request_timeout_secs: must be greater than zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
