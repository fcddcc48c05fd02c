use serde::Serialize;

use super::types::{DocumentHash, Signatures};

/// A document the contract has a record for, with the signatures collected so far.
///
/// Only produced from an existing storage entry, see [`crate::Storage::notarized`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotarizedDocument {
    hash: DocumentHash,
    signatures: Signatures,
}

impl NotarizedDocument {
    pub(crate) fn new(hash: DocumentHash, signatures: Signatures) -> Self {
        Self { hash, signatures }
    }

    pub fn hash(&self) -> &DocumentHash {
        &self.hash
    }

    pub fn signatures(&self) -> &Signatures {
        &self.signatures
    }
}
