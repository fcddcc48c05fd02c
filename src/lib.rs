pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{
    Entrypoint, ErrorKind, NotaryClient, NotaryClientFactory, NotaryError, PendingOperation,
};
pub use domain::{
    Address, Document, DocumentHash, NotarizedDocument, Signature, Signatures, Signee, Signees,
    Storage,
};
pub use infrastructure::contract::{ContractError, ContractHandle, Toolkit};
pub use infrastructure::memory::{MemoryContract, MemoryToolkit};
pub use infrastructure::micheline::KeyEncoding;
pub use infrastructure::rpc::{RpcConfig, RpcContract, RpcToolkit};
