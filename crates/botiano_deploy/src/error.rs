use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("Invalid argument: {0}")]
    InvalidArg(String),

    #[error("Authentication failed for {user}@{host}")]
    AuthFailed { user: String, host: String },

    #[error("Gave up after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: Box<DeployError>,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeployError>;
