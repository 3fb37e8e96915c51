use actix_web::web;

use super::handlers;

/// Configures the API routes
///
/// Routes live at the root so that peers can fetch `http://{node}/chain`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/mine", web::get().to(handlers::mine_block))
        .route("/transactions/new", web::post().to(handlers::new_transaction))
        .route("/transaction/new", web::post().to(handlers::new_transaction))
        .route("/transactions/pending", web::get().to(handlers::get_pending_transactions))
        .route("/chain", web::get().to(handlers::get_chain))
        .route("/nodes/register", web::post().to(handlers::register_nodes))
        .route("/nodes/resolve", web::get().to(handlers::resolve_conflicts));
}
