use serde::{Deserialize, Serialize};

use super::types::{DocumentHash, Signees};

/// A document to notarize: its content hash and the addresses expected to sign it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub hash: DocumentHash,
    pub signees: Signees,
}

impl Document {
    pub fn new(hash: impl Into<DocumentHash>, signees: Signees) -> Self {
        Self {
            hash: hash.into(),
            signees,
        }
    }

    /// Build a document whose hash is the SHA-256 of `content`
    pub fn from_content(content: &[u8], signees: Signees) -> Self {
        Self {
            hash: DocumentHash::digest(content),
            signees,
        }
    }

    /// Lookup key only, for queries that don't care about signees
    pub fn with_hash(hash: impl Into<DocumentHash>) -> Self {
        Self::new(hash, Vec::new())
    }
}
