use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use proof_chain_node::api::{self, AppState};
use proof_chain_node::blockchain::{self, Blockchain, HttpPeerClient};
use proof_chain_node::config::NodeConfig;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::mine_block,
        api::handlers::new_transaction,
        api::handlers::get_pending_transactions,
        api::handlers::get_chain,
        api::handlers::register_nodes,
        api::handlers::resolve_conflicts
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            api::handlers::ChainResponse,
            api::handlers::TransactionRequest,
            api::handlers::TransactionResponse,
            api::handlers::MineResponse,
            api::handlers::RegisterNodesRequest,
            api::handlers::RegisterNodesResponse,
            api::handlers::ResolveResponse
        )
    ),
    tags(
        (name = "blockchain", description = "Blockchain node endpoints")
    ),
    info(
        title = "Blockchain Node API",
        version = "0.1.0",
        description = "Mining, transactions, chain inspection and consensus for a single node",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    info!("Node identifier: {}", config.node_identifier);

    let blockchain = Arc::new(Blockchain::new());
    let peers = Arc::new(HttpPeerClient::new(config.request_timeout).context("Failed to build peer client")?);
    let state = web::Data::new(AppState::new(blockchain.clone(), peers, config.node_identifier.clone()));

    info!("Starting HTTP server at http://{}:{}", config.host, config.port);

    let result = HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(api::configure_routes)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await;

    // Abort any proof search still running on the blocking pool
    blockchain.shutdown();
    info!("Node stopped");

    result.context("HTTP server failed")
}
