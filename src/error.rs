#[derive(Debug, thiserror::Error)]
pub enum CanaryError {
    #[error("Test run is already in progress")]
    RunAlreadyInProgress,

    #[error("Rollout is already in progress")]
    RolloutAlreadyInProgress,

    #[error("Invalid validation criteria: {0}")]
    InvalidCriteria(String),

    #[error("Flag service error: {0}")]
    FlagService(String),

    #[error("Health probe error: {0}")]
    HealthProbe(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CanaryError>;
