//! Error types for query execution

use thiserror::Error;

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Main error type for the query runner
#[derive(Error, Debug)]
pub enum RunnerError {
    /// The endpoint could not be reached or answered with a server-side failure
    #[error("SPARQL endpoint unavailable: {0}")]
    EndpointUnavailable(String),

    /// The query text was rejected by the endpoint or the local parser
    #[error("SPARQL syntax error: {0}")]
    QuerySyntaxError(String),

    /// The response is not a SELECT result with the projected variables
    #[error("Unexpected result shape: {0}")]
    UnexpectedResultShape(String),

    /// Local oxigraph store failure
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Cue sheet could not be read
    #[error("Cue sheet error: {0}")]
    Cue(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RunnerError {
    fn from(err: serde_json::Error) -> Self {
        RunnerError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for RunnerError {
    fn from(err: reqwest::Error) -> Self {
        RunnerError::EndpointUnavailable(err.to_string())
    }
}

impl From<oxigraph::store::StorageError> for RunnerError {
    fn from(err: oxigraph::store::StorageError) -> Self {
        RunnerError::Store(err.to_string())
    }
}

impl From<oxigraph::store::LoaderError> for RunnerError {
    fn from(err: oxigraph::store::LoaderError) -> Self {
        RunnerError::Store(err.to_string())
    }
}

impl From<oxigraph::sparql::QueryEvaluationError> for RunnerError {
    fn from(err: oxigraph::sparql::QueryEvaluationError) -> Self {
        RunnerError::Store(err.to_string())
    }
}

impl RunnerError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RunnerError::EndpointUnavailable(_) => "EndpointUnavailable",
            RunnerError::QuerySyntaxError(_) => "QuerySyntaxError",
            RunnerError::UnexpectedResultShape(_) => "UnexpectedResultShape",
            RunnerError::Store(_) => "Store",
            RunnerError::Config(_) => "Config",
            RunnerError::Cue(_) => "Cue",
            RunnerError::Io(_) => "Io",
            RunnerError::Serialization(_) => "Serialization",
        }
    }
}
