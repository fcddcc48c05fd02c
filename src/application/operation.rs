use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

use crate::domain::Address;

/// Contract entry points this SDK can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Entrypoint {
    #[serde(rename = "notarizeDocument")]
    NotarizeDocument,
    #[serde(rename = "signDocument")]
    SignDocument,
}

impl Entrypoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entrypoint::NotarizeDocument => "notarizeDocument",
            Entrypoint::SignDocument => "signDocument",
        }
    }
}

impl fmt::Display for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unsubmitted contract call. Signing and injection belong to the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingOperation {
    pub destination: Address,
    pub entrypoint: Entrypoint,
    /// Micheline-encoded argument
    pub parameters: Value,
    /// Transferred amount in mutez
    pub amount: u64,
}

impl PendingOperation {
    pub fn new(destination: Address, entrypoint: Entrypoint, parameters: Value) -> Self {
        Self {
            destination,
            entrypoint,
            parameters,
            amount: 0,
        }
    }

    /// Transaction content as a Tezos wallet expects it, minus source, fee,
    /// counter and limits
    pub fn to_transaction(&self) -> Value {
        json!({
            "kind": "transaction",
            "destination": self.destination.as_str(),
            "amount": self.amount.to_string(),
            "parameters": {
                "entrypoint": self.entrypoint.as_str(),
                "value": self.parameters,
            }
        })
    }
}
