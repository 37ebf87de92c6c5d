mod client;

pub use client::Client;

use thiserror::Error;

/// Failures talking to the ethics data service. Anything here maps to the
/// network exit code.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}", describe_status(.status, .url))]
    Status { status: u16, url: String },

    #[error("Invalid base URL '{0}'")]
    BaseUrl(String),

    #[error("Model '{0}' is the read-only default model; save to a custom model instead")]
    ReadOnlyModel(String),
}

impl SourceError {
    /// Transport failures and server errors are worth another attempt;
    /// client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Network { .. } => true,
            SourceError::Status { status, .. } => *status >= 500 || *status == 429,
            SourceError::BaseUrl(_) | SourceError::ReadOnlyModel(_) => false,
        }
    }
}

fn describe_status(status: &u16, url: &str) -> String {
    match *status {
        404 => format!("Not found: {}. Check the model name and base_url.", url),
        401 | 403 => format!("Access denied by the data service ({}) for {}", status, url),
        429 => format!("Data service rate limit hit ({}). Wait and try again.", url),
        500..=599 => format!("Data service error {} for {}", status, url),
        _ => format!("Unexpected HTTP status {} for {}", status, url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        let status = |status| SourceError::Status {
            status,
            url: "http://x".to_string(),
        };
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!SourceError::ReadOnlyModel("m".to_string()).is_retryable());
    }

    #[test]
    fn test_status_messages() {
        let err = SourceError::Status {
            status: 404,
            url: "http://x/apis/model/questions/Nope".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Not found: http://x/apis/model/questions/Nope. Check the model name and base_url."
        );
    }
}
