use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("Metadata error: {0}")]
    Generic(String),
    #[error(transparent)]
    Expected(#[from] MetaExpectedError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("TOML decode error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum MetaExpectedError {
    #[error("{0}")]
    Generic(String),
    #[error("Configuration file not found ({path})")]
    ConfigNotFound { path: PathBuf },
    #[error("Invalid value for {key} in configuration file: {message}")]
    InvalidConfigValue { key: String, message: String },
    #[error("Invalid playlist: {message}")]
    InvalidPlaylist { message: String },
}

pub type Result<T> = std::result::Result<T, MetaError>;
