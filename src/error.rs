//! Error taxonomy shared by every dispatch component.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    /// A required configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The cache backend or an HTTP endpoint could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The credential exchange failed or was rejected.
    #[error("remote authentication failed: {0}")]
    RemoteAuth(String),

    /// No remote identifier matches the requested channel name.
    #[error("channel '{channel}' not found")]
    NotFound { channel: String },

    #[error("unsupported send method for {provider}: {method}")]
    UnsupportedMethod { provider: String, method: String },

    /// A remote call answered with a non-200 status or a non-zero application code.
    #[error("remote API error: {0}")]
    RemoteApi(String),
}

pub type Result<T> = std::result::Result<T, DispatchError>;

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DispatchError::RemoteApi(format!("undecodable response body: {err}"))
        } else {
            DispatchError::Connection(err.to_string())
        }
    }
}

impl From<redis::RedisError> for DispatchError {
    fn from(err: redis::RedisError) -> Self {
        DispatchError::Connection(format!("cache backend: {err}"))
    }
}
