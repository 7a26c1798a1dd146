use thiserror::Error;

/// Failures along the live generation path.
///
/// Everything except [`AgentError::Fetch`] is absorbed at the agent boundary and
/// turned into mock content; `Fetch` belongs to the page collaborator and is the
/// one kind the HTTP layer may report to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("generation service error: {0}")]
    Service(String),
    #[error("could not parse model output: {0}")]
    Parse(String),
    #[error("could not fetch page: {0}")]
    Fetch(String),
}

impl AgentError {
    /// Short machine-friendly name of the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Network(_) => "network",
            AgentError::Auth(_) => "auth",
            AgentError::RateLimited(_) => "rate_limited",
            AgentError::Service(_) => "service",
            AgentError::Parse(_) => "parse",
            AgentError::Fetch(_) => "fetch",
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AgentError::Service(err.to_string())
        } else {
            AgentError::Network(err.to_string())
        }
    }
}
