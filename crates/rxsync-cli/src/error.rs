use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] rxsync_core::Error),
    #[error(transparent)]
    Remote(#[from] rxsync_core::remote::RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    OperationFailed(String),
    #[error("Prescription ID cannot be empty")]
    EmptyId,
    #[error("Bearer token cannot be empty")]
    EmptyToken,
    #[error("No bearer token stored. Run `rxsync token set <value>` first.")]
    NotAuthenticated,
    #[error("No API base URL configured. Set RXSYNC_API_URL or pass --api-url.")]
    ApiNotConfigured,
    #[error("Refusing to clear the local store without --yes")]
    ConfirmationRequired,
}
