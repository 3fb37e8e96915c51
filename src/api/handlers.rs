use actix_web::{web, HttpResponse};
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ApiError, AppState};
use crate::blockchain::{Block, Transaction};

/// Response for the chain endpoint, also what peers read during consensus
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChainResponse {
    /// The blocks in the chain
    pub chain: Vec<Block>,

    /// The length of the chain
    pub length: usize,
}

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub message: String,

    /// The index of the block that will include this transaction
    pub index: u64,
}

/// Response for the mine endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

/// Request for the register nodes endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterNodesRequest {
    /// Node addresses, e.g. `http://192.168.0.5:5000`
    pub nodes: Option<Vec<String>>,
}

/// Response for the register nodes endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RegisterNodesResponse {
    pub message: String,

    /// Every registered node in `host[:port]` form
    pub total_nodes: Vec<String>,
}

/// Response for the resolve endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    pub message: String,

    /// Whether our chain was replaced
    pub replaced: bool,

    /// The chain after resolution
    pub chain: Vec<Block>,
}

/// Mine a new block
///
/// Runs the proof of work, rewards this node and forges a block from the pending transactions
#[utoipa::path(
    get,
    path = "/mine",
    responses(
        (status = 200, description = "Block forged", body = MineResponse),
        (status = 409, description = "Mining was cancelled or the chain changed meanwhile")
    )
)]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let blockchain = state.blockchain.clone();
    let miner = state.node_identifier.clone();

    let block = web::block(move || blockchain.mine(&miner))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))??;

    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New Block Forged".to_string(),
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

/// Create a new transaction
///
/// Queues a transaction for the next mined block
#[utoipa::path(
    post,
    path = "/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction queued", body = TransactionResponse),
        (status = 400, description = "Missing values")
    )
)]
pub async fn new_transaction(
    state: web::Data<AppState>,
    transaction_req: web::Json<TransactionRequest>,
) -> Result<HttpResponse, ApiError> {
    let TransactionRequest {
        sender,
        recipient,
        amount,
    } = transaction_req.into_inner();

    let (sender, recipient, amount) = match (sender, recipient, amount) {
        (Some(sender), Some(recipient), Some(amount)) => (sender, recipient, amount),
        _ => return Err(ApiError::Validation("Missing values".to_string())),
    };

    let index = state.blockchain.new_transaction(&sender, &recipient, amount);

    Ok(HttpResponse::Created().json(TransactionResponse {
        message: format!("Transaction will be added to Block {}", index),
        index,
    }))
}

/// Get all pending transactions
#[utoipa::path(
    get,
    path = "/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.blockchain.get_pending_transactions())
}

/// Get the full blockchain
#[utoipa::path(
    get,
    path = "/chain",
    responses(
        (status = 200, description = "Blockchain retrieved successfully", body = ChainResponse)
    )
)]
pub async fn get_chain(state: web::Data<AppState>) -> HttpResponse {
    let chain = state.blockchain.get_chain();

    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        chain,
    })
}

/// Register peer nodes
#[utoipa::path(
    post,
    path = "/nodes/register",
    request_body = RegisterNodesRequest,
    responses(
        (status = 201, description = "Nodes registered", body = RegisterNodesResponse),
        (status = 400, description = "Missing or invalid node list")
    )
)]
pub async fn register_nodes(
    state: web::Data<AppState>,
    register_req: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, ApiError> {
    let nodes = register_req
        .into_inner()
        .nodes
        .ok_or_else(|| ApiError::Validation("Please supply a valid list of nodes".to_string()))?;

    let total_nodes = state.blockchain.register_nodes(&nodes)?;

    Ok(HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added".to_string(),
        total_nodes,
    }))
}

/// Resolve conflicts with registered nodes
///
/// Replaces our chain with the longest valid chain in the network
#[utoipa::path(
    get,
    path = "/nodes/resolve",
    responses(
        (status = 200, description = "Consensus finished", body = ResolveResponse)
    )
)]
pub async fn resolve_conflicts(state: web::Data<AppState>) -> HttpResponse {
    let replaced = state.blockchain.resolve_conflicts(state.peers.as_ref()).await;
    let message = if replaced {
        "Our chain was replaced"
    } else {
        "Our chain is authoritative"
    };
    info!("{}", message);

    HttpResponse::Ok().json(ResolveResponse {
        message: message.to_string(),
        replaced,
        chain: state.blockchain.get_chain(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use async_trait::async_trait;

    use super::*;
    use crate::api::configure_routes;
    use crate::blockchain::{Blockchain, NetworkError, PeerChain, PeerClient};

    /// Every peer answers with the same chain
    struct FixedPeer(Vec<Block>);

    #[async_trait]
    impl PeerClient for FixedPeer {
        async fn fetch_chain(&self, _address: &str) -> Result<PeerChain, NetworkError> {
            Ok(PeerChain::new(self.0.clone()))
        }
    }

    fn state_with_peer(chain: Vec<Block>) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            Arc::new(Blockchain::new()),
            Arc::new(FixedPeer(chain)),
            "test-node".to_string(),
        ))
    }

    fn state() -> web::Data<AppState> {
        state_with_peer(Vec::new())
    }

    #[actix_web::test]
    async fn test_get_chain() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/chain").to_request();
        let resp: ChainResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.length, 1);
        assert_eq!(resp.chain[0].index, 1);
    }

    #[actix_web::test]
    async fn test_new_transaction() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transactions/new")
            .set_json(serde_json::json!({ "sender": "alice", "recipient": "bob", "amount": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: TransactionResponse = test::read_body_json(resp).await;
        assert_eq!(body.index, 2);
        assert_eq!(body.message, "Transaction will be added to Block 2");
        assert_eq!(state.blockchain.get_pending_transactions().len(), 1);
    }

    #[actix_web::test]
    async fn test_new_transaction_missing_values() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/transaction/new")
            .set_json(serde_json::json!({ "sender": "alice", "amount": 5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.blockchain.get_pending_transactions().is_empty());
    }

    #[actix_web::test]
    async fn test_mine_block() {
        let state = state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/mine").to_request();
        let resp: MineResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.message, "New Block Forged");
        assert_eq!(resp.index, 2);
        assert_eq!(resp.transactions, vec![Transaction::new_reward("test-node")]);
        assert_eq!(state.blockchain.len(), 2);
    }

    #[actix_web::test]
    async fn test_register_nodes() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::post()
            .uri("/nodes/register")
            .set_json(serde_json::json!({ "nodes": ["http://host:1234/x", "http://host:1234/x"] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: RegisterNodesResponse = test::read_body_json(resp).await;
        assert_eq!(body.total_nodes, vec!["host:1234".to_string()]);
    }

    #[actix_web::test]
    async fn test_register_nodes_without_list() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        for body in [serde_json::json!({}), serde_json::json!({ "nodes": null })] {
            let req = test::TestRequest::post().uri("/nodes/register").set_json(body).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_resolve_replaces_chain() {
        let remote = Blockchain::new();
        remote.mine("remote").unwrap();
        let remote_chain = remote.get_chain();

        let state = state_with_peer(remote_chain.clone());
        state.blockchain.register_node("http://peer:5000").unwrap();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/nodes/resolve").to_request();
        let resp: ResolveResponse = test::call_and_read_body_json(&app, req).await;

        assert!(resp.replaced);
        assert_eq!(resp.message, "Our chain was replaced");
        assert_eq!(resp.chain, remote_chain);
    }

    #[actix_web::test]
    async fn test_resolve_keeps_authoritative_chain() {
        let app = test::init_service(App::new().app_data(state()).configure(configure_routes)).await;

        let req = test::TestRequest::get().uri("/nodes/resolve").to_request();
        let resp: ResolveResponse = test::call_and_read_body_json(&app, req).await;

        assert!(!resp.replaced);
        assert_eq!(resp.message, "Our chain is authoritative");
        assert_eq!(resp.chain.len(), 1);
    }
}
