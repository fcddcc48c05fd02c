use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use super::NotarizedDocument;

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_newtype!(
    /// Account or contract address on the ledger (`tz1…`, `KT1…`)
    Address
);

string_newtype!(
    /// Identifier of a document's content, computed by the caller
    DocumentHash
);

string_newtype!(
    /// One collected signature, as recorded by the contract
    Signature
);

impl DocumentHash {
    /// Lowercase hex SHA-256 of `content`
    pub fn digest(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(format!("{:x}", hasher.finalize()))
    }
}

pub type Signee = Address;
pub type Signees = Vec<Signee>;

/// Signatures collected for one document, in the order the ledger reports them.
///
/// Serialized as a `{signer: signature}` object written in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signatures(Vec<(Signee, Signature)>);

impl Signatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signer: &Signee) -> Option<&Signature> {
        self.0
            .iter()
            .find(|(address, _)| address == signer)
            .map(|(_, signature)| signature)
    }

    pub fn contains(&self, signer: &Signee) -> bool {
        self.get(signer).is_some()
    }

    /// Record `signature` for `signer`, replacing any earlier one in place
    pub fn insert(&mut self, signer: Signee, signature: Signature) {
        match self.0.iter_mut().find(|(address, _)| *address == signer) {
            Some(entry) => entry.1 = signature,
            None => self.0.push((signer, signature)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Signee, &Signature)> {
        self.0.iter().map(|(signer, signature)| (signer, signature))
    }

    pub fn signers(&self) -> impl Iterator<Item = &Signee> {
        self.0.iter().map(|(signer, _)| signer)
    }
}

impl FromIterator<(Signee, Signature)> for Signatures {
    fn from_iter<I: IntoIterator<Item = (Signee, Signature)>>(iter: I) -> Self {
        let mut signatures = Signatures::new();
        for (signer, signature) in iter {
            signatures.insert(signer, signature);
        }
        signatures
    }
}

impl Serialize for Signatures {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (signer, signature) in self.iter() {
            map.serialize_entry(signer, signature)?;
        }
        map.end()
    }
}

struct SignaturesVisitor;

impl<'de> Visitor<'de> for SignaturesVisitor {
    type Value = Signatures;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of signer addresses to signatures")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Signatures, A::Error> {
        // A repeated signer replaces the earlier entry, as `insert` does
        let mut signatures = Signatures::new();
        while let Some((signer, signature)) = access.next_entry::<Signee, Signature>()? {
            signatures.insert(signer, signature);
        }
        Ok(signatures)
    }
}

impl<'de> Deserialize<'de> for Signatures {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SignaturesVisitor)
    }
}

/// Snapshot of the contract storage at the moment it was read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage(BTreeMap<DocumentHash, Signatures>);

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, hash: &DocumentHash) -> Option<&Signatures> {
        self.0.get(hash)
    }

    pub fn contains(&self, hash: &DocumentHash) -> bool {
        self.0.contains_key(hash)
    }

    pub fn insert(&mut self, hash: DocumentHash, signatures: Signatures) {
        self.0.insert(hash, signatures);
    }

    /// Mutable access to a recorded entry
    pub fn get_mut(&mut self, hash: &DocumentHash) -> Option<&mut Signatures> {
        self.0.get_mut(hash)
    }

    /// The notarized view of `hash`, if the snapshot has an entry for it
    pub fn notarized(&self, hash: &DocumentHash) -> Option<NotarizedDocument> {
        self.get(hash)
            .map(|signatures| NotarizedDocument::new(hash.clone(), signatures.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DocumentHash, &Signatures)> {
        self.0.iter()
    }
}

impl FromIterator<(DocumentHash, Signatures)> for Storage {
    fn from_iter<I: IntoIterator<Item = (DocumentHash, Signatures)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
