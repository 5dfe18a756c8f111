use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Failed to capture frame: {0}")]
    Capture(String),

    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read device setting {name}: {reason}")]
    DeviceRead { name: &'static str, reason: String },

    #[error("Failed to write device settings: {0}")]
    DeviceWrite(String),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ControlError>;
