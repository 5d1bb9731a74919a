use thiserror::Error;

pub mod config;
pub mod token;

pub use config::*;
pub use token::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("browser storage unavailable")]
    StorageUnavailable,

    #[error("settings storage error: {0}")]
    Io(String),

    #[error("invalid access token: {0}")]
    InvalidToken(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
