use thiserror::Error;

use keybox_hardware::HardwareError;
use keybox_network::NetworkError;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] keybox_core::Error),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KioskError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error means the tag reader is gone for good.
    pub fn is_reader_disconnected(&self) -> bool {
        matches!(self, KioskError::Hardware(e) if e.is_disconnected())
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;
