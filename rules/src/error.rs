use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("invalid percentage value '{0}'")]
    InvalidPercentage(String),

    #[error("invalid duration '{0}': expected <number><ms|s|m|h|d>")]
    InvalidDuration(String),

    #[error("rule configuration location is not set")]
    MissingLocation,

    #[error("failed to read rule configuration {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch rule configuration {location}: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse rule configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid security entry #{index}: {reason}")]
    InvalidSecurity { index: usize, reason: String },

    #[error("security {0} is configured more than once")]
    DuplicateSecurity(String),
}
