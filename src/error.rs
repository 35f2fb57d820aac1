use std::time::Duration;

use thiserror::Error;

use crate::domain::id::EntityId;
use crate::domain::observation::Source;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// A raw round payload could not be turned into an observation.
///
/// These never escape the ingestion path: [`Normalizer::recover`] decides
/// what each variant degrades to.
///
/// [`Normalizer::recover`]: crate::application::normalizer::Normalizer::recover
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("{origin} payload has no entity id")]
    MissingEntityId { origin: Source },

    #[error("{origin} round {entity_id} carries no score")]
    MissingScores { entity_id: EntityId, origin: Source },

    #[error("{origin} round {entity_id} has malformed nested state: {reason}")]
    MalformedState {
        entity_id: EntityId,
        origin: Source,
        reason: String,
    },
}

/// How a failed fetch is reported and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The source answered, but not with a usable 2xx body.
    Response,
    /// The source could not be reached at all.
    Transport,
}

/// Live source fetch failures. Every variant feeds the same backoff counter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("live source returned status {status}")]
    Status { status: u16 },

    #[error("live source body could not be decoded: {0}")]
    Decode(String),

    #[error("live source unreachable: {0}")]
    Transport(String),

    #[error("live source timed out after {}s", after.as_secs())]
    Timeout { after: Duration },
}

impl FetchError {
    /// Classify the failure for logging.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Status { .. } | Self::Decode(_) => FailureKind::Response,
            Self::Transport(_) | Self::Timeout { .. } => FailureKind::Transport,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
            };
        }
        Self::Transport(err.to_string())
    }
}

/// Scoring failures for a single entity.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("probability distribution is invalid: {0}")]
    InvalidDistribution(String),

    #[error("model produced unknown label index {0}")]
    UnknownLabel(usize),

    #[error("round {0} has no scorable outcome")]
    Excluded(EntityId),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("scorer unavailable: no model loaded")]
    ScorerUnavailable,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_and_decode_are_response_failures() {
        assert_eq!(FetchError::Status { status: 503 }.kind(), FailureKind::Response);
        assert_eq!(
            FetchError::Decode("eof".into()).kind(),
            FailureKind::Response
        );
    }

    #[test]
    fn transport_and_timeout_are_transport_failures() {
        assert_eq!(
            FetchError::Transport("dns".into()).kind(),
            FailureKind::Transport
        );
        assert_eq!(
            FetchError::Timeout {
                after: Duration::from_secs(10)
            }
            .kind(),
            FailureKind::Transport
        );
    }

    #[test]
    fn config_error_converts_into_crate_error() {
        let err: Error = ConfigError::MissingField { field: "url" }.into();
        assert!(matches!(err, Error::Config(ConfigError::MissingField { field: "url" })));
        assert_eq!(err.to_string(), "missing required field: url");
    }
}
