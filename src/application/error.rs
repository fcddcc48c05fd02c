use thiserror::Error;

use crate::domain::DocumentHash;
use crate::infrastructure::contract::ContractError;

#[derive(Error, Debug)]
pub enum NotaryError {
    /// The contract holds no record for this hash. Expected outcome, not a fault.
    #[error("No signatures specified for document {0}")]
    NotFound(DocumentHash),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TransportFailure,
}

impl NotaryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NotaryError::NotFound(_) => ErrorKind::NotFound,
            NotaryError::Contract(_) => ErrorKind::TransportFailure,
        }
    }
}
