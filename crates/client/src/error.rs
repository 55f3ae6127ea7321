//! Crate-level convenience error.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::payment::PaymentError;
use crate::storage::StorageError;

/// Crate-level convenience error.
///
/// Not a "god error": it is a thin wrapper over the module-level errors, for
/// callers that drive several subsystems and want a single `?` target.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}
