use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::{Body, Client, Method, Request, StatusCode};
use serde_json::Value;
use std::env;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::contract::{ContractError, ContractHandle, Toolkit};
use super::micheline::{self, KeyEncoding};
use crate::domain::{Address, DocumentHash, Signatures, Storage};

const DEFAULT_CHAIN: &str = "main";
const DEFAULT_BLOCK: &str = "head";

/// Where and against which block the Tezos node RPC is queried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    /// Base URL of the node (e.g., "http://127.0.0.1:8732")
    pub rpc_url: String,
    pub chain: String,
    pub block: String,
}

impl RpcConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let rpc_url: String = rpc_url.into();
        Self {
            rpc_url: rpc_url.trim_end_matches('/').to_string(),
            chain: DEFAULT_CHAIN.to_string(),
            block: DEFAULT_BLOCK.to_string(),
        }
    }

    /// Read `TEZOS_RPC_URL` (required), `TEZOS_CHAIN` and `TEZOS_BLOCK`
    pub fn from_env() -> Result<Self, ContractError> {
        let rpc_url = env::var("TEZOS_RPC_URL")
            .map_err(|_| ContractError::Config("TEZOS_RPC_URL is not set".to_string()))?;

        let mut config = Self::new(rpc_url);
        if let Ok(chain) = env::var("TEZOS_CHAIN") {
            config.chain = chain;
        }
        if let Ok(block) = env::var("TEZOS_BLOCK") {
            config.block = block;
        }
        Ok(config)
    }

    fn block_url(&self) -> String {
        format!(
            "{}/chains/{}/blocks/{}/context",
            self.rpc_url, self.chain, self.block
        )
    }

    fn contract_url(&self, address: &Address, resource: &str) -> String {
        format!("{}/contracts/{}/{}", self.block_url(), address, resource)
    }

    fn big_map_url(&self, id: &str, expr_hash: &str) -> String {
        format!("{}/big_maps/{}/{}", self.block_url(), id, expr_hash)
    }
}

/// Send a GET request to the Tezos node and collect the whole response
///
/// Non-success statuses are returned as-is; callers decide which ones are
/// meaningful (e.g., 404 for an unknown contract or big_map key).
///
/// # Arguments
/// * `client` - Hyper HTTP client
/// * `url` - Full RPC URL, including the chain and block path
async fn get(
    client: &Client<HttpConnector>,
    url: &str,
) -> Result<(StatusCode, Bytes), ContractError> {
    debug!(%url, "RPC request");

    let request = Request::builder()
        .method(Method::GET)
        .uri(url)
        .header("accept", "application/json")
        .body(Body::empty())?;

    let response = client.request(request).await?;
    let status = response.status();
    let body = hyper::body::to_bytes(response.into_body()).await?;

    Ok((status, body))
}

/// GET `url` and parse the body as JSON, failing on any non-success status
async fn get_json(client: &Client<HttpConnector>, url: &str) -> Result<Value, ContractError> {
    let (status, body) = get(client, url).await?;
    if !status.is_success() {
        return Err(rpc_failure(status, &body));
    }
    Ok(serde_json::from_slice(&body)?)
}

fn rpc_failure(status: StatusCode, body: &Bytes) -> ContractError {
    let body = String::from_utf8_lossy(body).into_owned();
    warn!(%status, %body, "RPC node returned an error");
    ContractError::Rpc { status, body }
}

/// Resolves notary contracts through a Tezos node's RPC interface
#[derive(Clone)]
pub struct RpcToolkit {
    client: Client<HttpConnector>,
    config: Arc<RpcConfig>,
}

impl RpcToolkit {
    /// Create a toolkit talking to the node described by `config`
    ///
    /// No request is made until a contract is resolved with [`Toolkit::at`].
    ///
    /// # Arguments
    /// * `config` - Node URL plus the chain and block to query
    pub fn new(config: RpcConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    pub fn from_env() -> Result<Self, ContractError> {
        Ok(Self::new(RpcConfig::from_env()?))
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }
}

#[async_trait]
impl Toolkit for RpcToolkit {
    type Contract = RpcContract;

    async fn at(&self, address: &Address) -> Result<RpcContract, ContractError> {
        let url = self.config.contract_url(address, "script");
        let (status, body) = get(&self.client, &url).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ContractError::UnknownContract(address.clone()));
        }
        if !status.is_success() {
            return Err(rpc_failure(status, &body));
        }

        let script: Value = serde_json::from_slice(&body)?;
        let key_encoding = micheline::key_encoding_of_script(&script).unwrap_or_else(|| {
            warn!(%address, "Unrecognized storage type, assuming string document hashes");
            KeyEncoding::String
        });

        info!(%address, ?key_encoding, "Resolved notary contract");
        Ok(RpcContract {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            address: address.clone(),
            key_encoding,
        })
    }
}

/// Handle on a notary contract whose existence was confirmed by the node
#[derive(Clone)]
pub struct RpcContract {
    client: Client<HttpConnector>,
    config: Arc<RpcConfig>,
    address: Address,
    key_encoding: KeyEncoding,
}

impl RpcContract {
    async fn raw_storage(&self) -> Result<Value, ContractError> {
        let url = self.config.contract_url(&self.address, "storage");
        get_json(&self.client, &url).await
    }

    /// Look `hash` up in big_map `id` without loading the rest of it
    async fn big_map_signatures(
        &self,
        id: &str,
        hash: &DocumentHash,
    ) -> Result<Option<Signatures>, ContractError> {
        let expr_hash = self.key_encoding.script_expr_hash(hash)?;
        let url = self.config.big_map_url(id, &expr_hash);
        let (status, body) = get(&self.client, &url).await?;

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(rpc_failure(status, &body));
        }

        let raw: Value = serde_json::from_slice(&body)?;
        micheline::decode_signatures(&raw).map(Some)
    }
}

#[async_trait]
impl ContractHandle for RpcContract {
    fn address(&self) -> &Address {
        &self.address
    }

    fn key_encoding(&self) -> KeyEncoding {
        self.key_encoding
    }

    async fn storage(&self) -> Result<Storage, ContractError> {
        let raw = self.raw_storage().await?;
        let storage = micheline::decode_storage(&raw, self.key_encoding)?;
        debug!(address = %self.address, documents = storage.len(), "Fetched storage");
        Ok(storage)
    }

    async fn signatures(
        &self,
        hash: &DocumentHash,
    ) -> Result<Option<Signatures>, ContractError> {
        let raw = self.raw_storage().await?;

        if let Some(id) = micheline::big_map_id(&raw) {
            return self.big_map_signatures(id, hash).await;
        }

        let storage = micheline::decode_storage(&raw, self.key_encoding)?;
        Ok(storage.get(&self.key_encoding.normalize(hash)).cloned())
    }
}
