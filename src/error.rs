use thiserror::Error;

use crate::api::ApiError;
use crate::coordinator::CoordinatorError;
use crate::event_bus::EventError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),
    #[error("Event error: {0}")]
    Event(#[from] EventError),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IntegrationResult<T> = Result<T, Error>;

impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
