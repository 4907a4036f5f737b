use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("unable to decode json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unable to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("no container element to bind the map view to")]
    MissingContainer,
    #[error("the map view has not been created yet")]
    NoView,
    #[error("the map view has already been created")]
    ViewExists,
    #[error("classification error: {0}")]
    Classification(&'static str),
}
