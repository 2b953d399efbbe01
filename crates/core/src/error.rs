use thiserror::Error;

pub type BanditResult<T> = Result<T, BanditError>;

#[derive(Error, Debug)]
pub enum BanditError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for BanditError {
    fn from(err: config::ConfigError) -> Self {
        BanditError::Config(err.to_string())
    }
}

impl BanditError {
    /// True for errors caused by the experiment parameters themselves, as
    /// opposed to failures loading or writing them.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, BanditError::InvalidConfiguration(_))
    }
}
