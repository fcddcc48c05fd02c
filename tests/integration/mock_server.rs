use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

struct MockContract {
    script: Value,
    storage: Value,
}

#[derive(Default)]
struct NodeState {
    contracts: HashMap<String, MockContract>,
    /// big_map id -> script expression hash -> value
    big_maps: HashMap<String, HashMap<String, Value>>,
    requests: Vec<String>,
    failing: bool,
}

/// Script whose storage is `<container>(<key_type>, map(address, option signature))`
fn script(container: &str, key_type: &str) -> Value {
    json!({
        "code": [
            { "prim": "parameter", "args": [{ "prim": "unit" }] },
            { "prim": "storage", "args": [{ "prim": container, "args": [
                { "prim": key_type },
                { "prim": "map", "args": [
                    { "prim": "address" },
                    { "prim": "option", "args": [{ "prim": "signature" }] }
                ]}
            ]}]},
            { "prim": "code", "args": [[]] }
        ]
    })
}

/// Minimal Tezos node answering the contract `script` / `storage` and
/// big_map lookup RPCs
#[derive(Clone, Default)]
pub struct MockTezosNode {
    state: Arc<Mutex<NodeState>>,
}

impl MockTezosNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self) -> String {
        let state = self.state.clone();

        let make_svc = make_service_fn(move |_conn| {
            let state = state.clone();

            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle_request(req, state.clone())))
            }
        });

        // Bind to random port
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let server = Server::bind(&addr).serve(make_svc);
        let actual_addr = server.local_addr();

        tokio::spawn(async move {
            if let Err(e) = server.await {
                eprintln!("Mock node error: {}", e);
            }
        });

        format!("http://{}", actual_addr)
    }

    /// Originate a contract with `map(string, ...)` storage
    pub fn originate(&self, address: &str, storage: Value) {
        self.originate_with(address, "string", storage);
    }

    /// Originate a contract with a `map` keyed by `key_type`
    pub fn originate_with(&self, address: &str, key_type: &str, storage: Value) {
        self.state.lock().unwrap().contracts.insert(
            address.to_string(),
            MockContract {
                script: script("map", key_type),
                storage,
            },
        );
    }

    /// Originate a contract whose storage is big_map `id`, keyed by `key_type`
    pub fn originate_big_map(&self, address: &str, id: &str, key_type: &str) {
        let mut state = self.state.lock().unwrap();
        state.contracts.insert(
            address.to_string(),
            MockContract {
                script: script("big_map", key_type),
                storage: json!({ "int": id }),
            },
        );
        state.big_maps.entry(id.to_string()).or_default();
    }

    pub fn put_big_map_entry(&self, id: &str, expr_hash: &str, value: Value) {
        self.state
            .lock()
            .unwrap()
            .big_maps
            .entry(id.to_string())
            .or_default()
            .insert(expr_hash.to_string(), value);
    }

    pub fn storage(&self, address: &str) -> Value {
        self.state.lock().unwrap().contracts[address].storage.clone()
    }

    pub fn set_storage(&self, address: &str, storage: Value) {
        if let Some(contract) = self.state.lock().unwrap().contracts.get_mut(address) {
            contract.storage = storage;
        }
    }

    /// Answer every request with HTTP 500 from now on
    pub fn fail_requests(&self) {
        self.state.lock().unwrap().failing = true;
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn respond(status: StatusCode, body: String) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}

fn found(value: Option<&Value>) -> Response<Body> {
    match value {
        Some(value) => respond(StatusCode::OK, value.to_string()),
        None => respond(StatusCode::NOT_FOUND, "[]".to_string()),
    }
}

async fn handle_request(
    req: Request<Body>,
    state: Arc<Mutex<NodeState>>,
) -> Result<Response<Body>, Infallible> {
    let path = req.uri().path().to_string();
    let mut state = state.lock().unwrap();
    state.requests.push(path.clone());

    if state.failing {
        return Ok(respond(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!([{ "kind": "temporary", "id": "failure" }]).to_string(),
        ));
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let response = match segments.as_slice() {
        ["chains", "main", "blocks", "head", "context", "contracts", address, resource] => {
            let contract = state.contracts.get(*address);
            match *resource {
                "script" => found(contract.map(|c| &c.script)),
                "storage" => found(contract.map(|c| &c.storage)),
                _ => found(None),
            }
        }
        ["chains", "main", "blocks", "head", "context", "big_maps", id, expr_hash] => found(
            state
                .big_maps
                .get(*id)
                .and_then(|entries| entries.get(*expr_hash)),
        ),
        _ => respond(StatusCode::NOT_FOUND, "Not Found".to_string()),
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_node_starts() {
        let node = MockTezosNode::new();
        let url = node.start().await;

        assert!(url.starts_with("http://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_mock_node_serves_storage() {
        let node = MockTezosNode::new();
        node.originate("KT1Notary", json!([]));
        let url = node.start().await;

        let client = hyper::Client::new();
        let uri = format!(
            "{}/chains/main/blocks/head/context/contracts/KT1Notary/storage",
            url
        );
        let response = client.get(uri.parse().unwrap()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(node.requests().len(), 1);
    }
}
