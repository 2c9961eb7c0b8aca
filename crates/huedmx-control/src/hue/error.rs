use crate::error::ErrorClass;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HueError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Light {0} is not known to the bridge")]
    LightNotFound(String),
    #[error("No data from event stream for {0:?}")]
    StreamTimeout(Duration),
    #[error("Event stream closed by bridge")]
    StreamClosed,
}

impl HueError {
    pub fn class(&self) -> ErrorClass {
        match self {
            HueError::Network(e) if e.is_decode() => ErrorClass::MalformedInput,
            HueError::Serde(_) | HueError::LightNotFound(_) => ErrorClass::MalformedInput,
            HueError::Network(_)
            | HueError::ApiError(_)
            | HueError::StreamTimeout(_)
            | HueError::StreamClosed => ErrorClass::TransientConnectivity,
        }
    }
}
