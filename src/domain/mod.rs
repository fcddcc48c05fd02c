mod document;
mod notarized;
mod types;

pub use document::Document;
pub use notarized::NotarizedDocument;
pub use types::{Address, DocumentHash, Signature, Signatures, Signee, Signees, Storage};
