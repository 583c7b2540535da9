//! Error taxonomy shared by every function.

use std::error::Error as StdError;
use std::fmt::Debug;

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service error codes that mean "the thing you asked for is not there".
const NOT_FOUND_CODES: &[&str] = &["ResourceNotFoundException", "NoSuchKey", "NotFound"];

#[derive(Debug, Error)]
pub enum Error {
    /// A required event field or setting was absent. Never retried.
    #[error("{0}")]
    MissingParameter(String),

    #[error("{0}")]
    NotFound(String),

    /// The function was deployed without a setting it cannot run without.
    #[error("{0}")]
    Config(String),

    /// A managed service rejected the call.
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    /// Wraps an SDK failure, keeping the service's own code and message.
    pub fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + StdError + 'static,
        R: Debug,
    {
        let code = err.code().map(str::to_owned);
        let message = err
            .message()
            .map(str::to_owned)
            .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

        Error::Service {
            operation,
            code,
            message,
        }
    }

    /// True for service answers that mean the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Service {
                code: Some(code), ..
            } => NOT_FOUND_CODES.contains(&code.as_str()),
            _ => false,
        }
    }

    /// The message a caller should see, without the operation prefix for service errors.
    pub fn message(&self) -> String {
        match self {
            Error::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingParameter(_) => 400,
            Error::NotFound(_) => 404,
            Error::Config(_) | Error::Service { .. } | Error::Unexpected(_) => 500,
        }
    }
}
