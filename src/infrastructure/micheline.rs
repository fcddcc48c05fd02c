//! Micheline JSON encoding for the notary contract's parameters and storage.
//!
//! Storage layout: `map(document_hash, map(address, signature))` or the same
//! as a `big_map`, where a signature slot may also be an `option` that stays
//! `None` until signed. Document hashes are typed `string` or `bytes` by the
//! contract; see [`KeyEncoding`].

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde_json::{json, Value};

use super::contract::ContractError;
use crate::domain::{Address, DocumentHash, Signature, Signatures, Signee, Storage};

/// Base58 prefix yielding `expr…` script expression hashes
const SCRIPT_EXPR_PREFIX: [u8; 4] = [13, 44, 64, 27];
/// Tag byte in front of every `PACK`ed value
const PACK_TAG: u8 = 0x05;
const PACK_STRING: u8 = 0x01;
const PACK_BYTES: u8 = 0x0a;

/// How the contract types its document hash keys.
///
/// With `Bytes`, a hash is hex, optionally `0x`-prefixed; it is compared and
/// stored as bare lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyEncoding {
    #[default]
    String,
    Bytes,
}

impl KeyEncoding {
    /// Read the encoding from a Michelson key type node (`{"prim":"bytes"}`)
    pub fn from_type(node: &Value) -> Option<Self> {
        match prim(node) {
            Some("string") => Some(KeyEncoding::String),
            Some("bytes") => Some(KeyEncoding::Bytes),
            _ => None,
        }
    }

    /// The canonical form of `hash` under this encoding
    pub fn normalize(&self, hash: &DocumentHash) -> DocumentHash {
        match self {
            KeyEncoding::String => hash.clone(),
            KeyEncoding::Bytes => {
                let raw = hash.as_str();
                let digits = raw
                    .strip_prefix("0x")
                    .or_else(|| raw.strip_prefix("0X"))
                    .unwrap_or(raw);
                DocumentHash::new(digits.to_lowercase())
            }
        }
    }

    /// Micheline literal for `hash`
    pub fn literal(&self, hash: &DocumentHash) -> Value {
        match self {
            KeyEncoding::String => string(hash.as_str()),
            KeyEncoding::Bytes => json!({ "bytes": self.normalize(hash).as_str() }),
        }
    }

    /// Binary `PACK` serialization of `hash`, as the node hashes big_map keys
    pub fn pack(&self, hash: &DocumentHash) -> Result<Vec<u8>, ContractError> {
        let (tag, payload) = match self {
            KeyEncoding::String => (PACK_STRING, hash.as_str().as_bytes().to_vec()),
            KeyEncoding::Bytes => {
                let normalized = self.normalize(hash);
                let raw = hex::decode(normalized.as_str()).map_err(|e| {
                    ContractError::Decode(format!("document hash {} is not hex: {}", hash, e))
                })?;
                (PACK_BYTES, raw)
            }
        };

        let mut packed = Vec::with_capacity(payload.len() + 6);
        packed.push(PACK_TAG);
        packed.push(tag);
        packed.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        packed.extend_from_slice(&payload);
        Ok(packed)
    }

    /// `expr…` hash under which a big_map stores the entry for `hash`
    pub fn script_expr_hash(&self, hash: &DocumentHash) -> Result<String, ContractError> {
        let digest = Blake2b::<U32>::digest(self.pack(hash)?);

        let mut payload = SCRIPT_EXPR_PREFIX.to_vec();
        payload.extend_from_slice(&digest);
        Ok(bs58::encode(payload).with_check().into_string())
    }

    fn decode_key(&self, node: &Value) -> Result<DocumentHash, ContractError> {
        let field = match self {
            KeyEncoding::String => "string",
            KeyEncoding::Bytes => "bytes",
        };
        let literal = node
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(&format!("a {} document hash", field), node))?;

        match self {
            KeyEncoding::String => Ok(DocumentHash::new(literal)),
            KeyEncoding::Bytes => {
                hex::decode(literal).map_err(|e| {
                    ContractError::Decode(format!("invalid bytes literal {}: {}", literal, e))
                })?;
                Ok(DocumentHash::new(literal.to_lowercase()))
            }
        }
    }
}

fn string(value: &str) -> Value {
    json!({ "string": value })
}

/// Build the `notarizeDocument` argument, `Pair(hash, { signee; ... })`.
///
/// # Arguments
/// * `hash` - Document hash, emitted as a `string` or `bytes` literal per `encoding`
/// * `signees` - Addresses expected to sign, in order
/// * `encoding` - How the contract types its document hashes
pub fn notarize_parameters(
    hash: &DocumentHash,
    signees: &[Signee],
    encoding: KeyEncoding,
) -> Value {
    let signees: Vec<Value> = signees.iter().map(|s| string(s.as_str())).collect();
    json!({
        "prim": "Pair",
        "args": [encoding.literal(hash), signees]
    })
}

/// Build the `signDocument` argument, the bare hash literal
pub fn sign_parameters(hash: &DocumentHash, encoding: KeyEncoding) -> Value {
    encoding.literal(hash)
}

fn malformed(expected: &str, found: &Value) -> ContractError {
    ContractError::Decode(format!("expected {}, found {}", expected, found))
}

fn prim(node: &Value) -> Option<&str> {
    node.get("prim").and_then(Value::as_str)
}

fn args(node: &Value) -> &[Value] {
    node.get("args")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// A `string` or `bytes` literal; bytes stay hex-encoded
fn scalar(node: &Value) -> Result<String, ContractError> {
    node.get("string")
        .or_else(|| node.get("bytes"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed("a string or bytes literal", node))
}

fn elt(node: &Value) -> Result<(&Value, &Value), ContractError> {
    match (prim(node), args(node)) {
        (Some("Elt"), [key, value]) => Ok((key, value)),
        _ => Err(malformed("an Elt node", node)),
    }
}

fn sequence(node: &Value) -> Result<&Vec<Value>, ContractError> {
    node.as_array()
        .ok_or_else(|| malformed("a sequence of Elt nodes", node))
}

fn signature_slot(node: &Value) -> Result<Option<Signature>, ContractError> {
    match (prim(node), args(node)) {
        (Some("None"), _) => Ok(None),
        (Some("Some"), [inner]) => scalar(inner).map(|s| Some(Signature::new(s))),
        (Some(_), _) => Err(malformed("a signature", node)),
        (None, _) => scalar(node).map(|s| Some(Signature::new(s))),
    }
}

/// Key encoding declared by a contract script's storage type, if it is a
/// `map` or `big_map` keyed by `string` or `bytes`
pub fn key_encoding_of_script(script: &Value) -> Option<KeyEncoding> {
    let storage_type = script
        .get("code")
        .and_then(Value::as_array)?
        .iter()
        .find(|section| prim(section) == Some("storage"))
        .and_then(|section| args(section).first())?;

    match (prim(storage_type), args(storage_type)) {
        (Some("map") | Some("big_map"), [key, _]) => KeyEncoding::from_type(key),
        _ => None,
    }
}

/// Id of the big_map the storage points to, when the node returns a pointer
/// instead of the entries
pub fn big_map_id(node: &Value) -> Option<&str> {
    node.get("int").and_then(Value::as_str)
}

/// Decode one document's signature map, skipping slots not yet signed
pub fn decode_signatures(node: &Value) -> Result<Signatures, ContractError> {
    let mut signatures = Signatures::new();
    for entry in sequence(node)? {
        let (key, value) = elt(entry)?;
        if let Some(signature) = signature_slot(value)? {
            signatures.insert(Address::new(scalar(key)?), signature);
        }
    }
    Ok(signatures)
}

/// Decode the full storage returned by the contract `storage` RPC.
///
/// # Arguments
/// * `node` - Micheline JSON of the storage, a sequence of `Elt` nodes
/// * `encoding` - Expected literal type of the document hash keys
///
/// A big_map pointer (`{"int": id}`) has no entries to decode and is a
/// `ContractError::Decode`; read such contracts one key at a time.
pub fn decode_storage(node: &Value, encoding: KeyEncoding) -> Result<Storage, ContractError> {
    if let Some(id) = big_map_id(node) {
        return Err(ContractError::Decode(format!(
            "storage is a lazily loaded big_map ({}) and has no full snapshot",
            id
        )));
    }

    sequence(node)?
        .iter()
        .map(|entry| -> Result<_, ContractError> {
            let (key, value) = elt(entry)?;
            Ok((encoding.decode_key(key)?, decode_signatures(value)?))
        })
        .collect()
}
