use thiserror::Error;

/// A problem with the rubric, the weights, or the company records that makes a
/// scoring run meaningless. Never recovered from inside the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("rubric has no sections")]
    NoSections,

    #[error("section '{section}' has no groups")]
    EmptySection { section: String },

    #[error("group '{group}' has no questions")]
    EmptyGroup { group: String },

    #[error("duplicate section name '{0}'")]
    DuplicateSection(String),

    #[error("question '{0}' appears more than once in the rubric")]
    DuplicateQuestion(String),

    #[error("{location}: weight {value} is outside [0, 100]")]
    WeightOutOfRange { location: String, value: f64 },

    #[error("unknown section '{0}'")]
    UnknownSection(String),

    #[error("company name '{name}' is used by records {first} and {second}")]
    DuplicateCompanyName {
        name: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid rubric: {}", join_errors(.0))]
    InvalidRubric(Vec<ConfigurationError>),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn join_errors(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
