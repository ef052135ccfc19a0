use thiserror::Error;

pub type PressflowResult<T> = Result<T, PressflowError>;

#[derive(Error, Debug)]
pub enum PressflowError {
    #[error("Validation error")]
    Validation(Vec<String>),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid campaign transition: {event} is not allowed from {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Campaign is immutable in state {0}")]
    ImmutableCampaignState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Delivery provider error: {0}")]
    UpstreamDelivery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PressflowError {
    /// Single-message validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        PressflowError::Validation(vec![msg.into()])
    }
}
