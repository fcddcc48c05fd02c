use tracing::debug;

use super::error::{ErrorKind, NotaryError};
use super::operation::{Entrypoint, PendingOperation};
use crate::domain::{Address, Document, NotarizedDocument, Storage};
use crate::infrastructure::contract::{ContractError, ContractHandle};
use crate::infrastructure::micheline;

/// Client for the notary contract.
///
/// Reads go to the contract on every call; nothing is cached. The operation
/// builders never touch the network.
pub struct NotaryClient<C> {
    contract: C,
}

impl<C: ContractHandle> NotaryClient<C> {
    pub fn new(contract: C) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    pub fn address(&self) -> &Address {
        self.contract.address()
    }

    /// Fetch the current storage of the contract
    pub async fn fetch_storage(&self) -> Result<Storage, ContractError> {
        self.contract.storage().await
    }

    /// Look up the signatures recorded for `document`
    pub async fn get_document(
        &self,
        document: &Document,
    ) -> Result<NotarizedDocument, NotaryError> {
        debug!(hash = %document.hash, "Looking up document");

        match self.contract.signatures(&document.hash).await? {
            Some(signatures) => Ok(NotarizedDocument::new(document.hash.clone(), signatures)),
            None => Err(NotaryError::NotFound(document.hash.clone())),
        }
    }

    /// Whether the contract has a record for `document`.
    ///
    /// Only a missing record yields `false`; failures to reach or decode the
    /// storage are returned as errors.
    pub async fn is_notarized(&self, document: &Document) -> Result<bool, NotaryError> {
        match self.get_document(document).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Build the `notarizeDocument(hash, signees)` call
    pub fn notarize(&self, document: &Document) -> PendingOperation {
        PendingOperation::new(
            self.address().clone(),
            Entrypoint::NotarizeDocument,
            micheline::notarize_parameters(
                &document.hash,
                &document.signees,
                self.contract.key_encoding(),
            ),
        )
    }

    /// Build the `signDocument(hash)` call
    pub fn sign(&self, document: &NotarizedDocument) -> PendingOperation {
        PendingOperation::new(
            self.address().clone(),
            Entrypoint::SignDocument,
            micheline::sign_parameters(document.hash(), self.contract.key_encoding()),
        )
    }
}
