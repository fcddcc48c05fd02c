use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::contract::{ContractError, ContractHandle, Toolkit};
use crate::domain::{Address, DocumentHash, Signature, Signatures, Signee, Storage};

/// Contract handle backed by an in-process storage snapshot
#[derive(Debug, Clone)]
pub struct MemoryContract {
    address: Address,
    storage: Arc<RwLock<Storage>>,
}

impl MemoryContract {
    pub fn new(address: impl Into<Address>, storage: Storage) -> Self {
        Self {
            address: address.into(),
            storage: Arc::new(RwLock::new(storage)),
        }
    }

    pub fn replace_storage(&self, storage: Storage) {
        *self.storage.write().unwrap_or_else(|e| e.into_inner()) = storage;
    }

    /// Record `signature` under `hash`, creating the entry if needed
    pub fn record_signature(&self, hash: &DocumentHash, signer: Signee, signature: Signature) {
        let mut storage = self.storage.write().unwrap_or_else(|e| e.into_inner());
        match storage.get_mut(hash) {
            Some(signatures) => signatures.insert(signer, signature),
            None => storage.insert(
                hash.clone(),
                std::iter::once((signer, signature)).collect::<Signatures>(),
            ),
        }
    }
}

#[async_trait]
impl ContractHandle for MemoryContract {
    fn address(&self) -> &Address {
        &self.address
    }

    async fn storage(&self) -> Result<Storage, ContractError> {
        Ok(self
            .storage
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}

/// Toolkit resolving only the contracts registered with it
#[derive(Debug, Clone, Default)]
pub struct MemoryToolkit {
    contracts: HashMap<Address, MemoryContract>,
}

impl MemoryToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contract(mut self, contract: MemoryContract) -> Self {
        self.contracts.insert(contract.address.clone(), contract);
        self
    }
}

#[async_trait]
impl Toolkit for MemoryToolkit {
    type Contract = MemoryContract;

    async fn at(&self, address: &Address) -> Result<MemoryContract, ContractError> {
        self.contracts
            .get(address)
            .cloned()
            .ok_or_else(|| ContractError::UnknownContract(address.clone()))
    }
}
