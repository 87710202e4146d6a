use thiserror::Error;

/// Failures from the external draws API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("draw request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("draw service returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed draws payload: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Failures from the poll registry and the vote state machine.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll `{0}` already exists")]
    DuplicateKey(String),
    #[error("no poll with id `{0}`")]
    UnknownPoll(String),
    #[error("user has already voted in poll `{0}`")]
    DuplicateVote(String),
    #[error("poll `{0}` is closed")]
    PollClosed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}
