use async_trait::async_trait;
use hyper::StatusCode;
use thiserror::Error;

use super::micheline::KeyEncoding;
use crate::domain::{Address, DocumentHash, Signatures, Storage};

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] hyper::Error),

    #[error("Invalid RPC request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("RPC node returned HTTP {status}: {body}")]
    Rpc { status: StatusCode, body: String },

    #[error("Unknown contract: {0}")]
    UnknownContract(Address),

    #[error("Storage decode error: {0}")]
    Decode(String),

    #[error("Invalid JSON from RPC node: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing configuration: {0}")]
    Config(String),
}

/// A deployed notary contract this process can read from and build operations against
#[async_trait]
pub trait ContractHandle: Send + Sync {
    fn address(&self) -> &Address;

    /// How the contract types document hashes
    fn key_encoding(&self) -> KeyEncoding {
        KeyEncoding::default()
    }

    /// Read and decode the full contract storage
    async fn storage(&self) -> Result<Storage, ContractError>;

    /// Signatures recorded under `hash`, or `None` if the contract has no entry.
    ///
    /// Reads the full storage by default; handles whose storage can't be
    /// snapshotted look the key up directly.
    async fn signatures(
        &self,
        hash: &DocumentHash,
    ) -> Result<Option<Signatures>, ContractError> {
        let storage = self.storage().await?;
        Ok(storage.get(&self.key_encoding().normalize(hash)).cloned())
    }
}

/// Resolves contract addresses into handles
#[async_trait]
pub trait Toolkit: Send + Sync {
    type Contract: ContractHandle;

    async fn at(&self, address: &Address) -> Result<Self::Contract, ContractError>;
}
