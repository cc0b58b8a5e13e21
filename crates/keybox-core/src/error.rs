use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Credential errors
    #[error("Invalid tag id: {0}")]
    InvalidTagId(String),

    #[error("Invalid event type: {0}")]
    InvalidEventType(String),

    // Identity errors
    #[error("Invalid device id: {0}")]
    InvalidDeviceId(String),

    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    // Engine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;
