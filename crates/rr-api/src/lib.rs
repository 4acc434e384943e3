//! # rr-api
//!
//! The web routing and orchestration layer for Rusty-Reader.

pub mod error;
pub mod handlers;
pub mod middleware;

pub use handlers::AppState;

use actix_web::web;

/// Mount point of `handlers::image_delivery`.
pub const DELIVERY_PATH: &str = "/ImageDelivery";

/// Configures the routes of the reader.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        // Generic table of any entity (e.g., /tables/host)
        .route("/tables/{entity}", web::get().to(handlers::entity_table))
        .route("/HostTable", web::get().to(handlers::host_table))
        .route("/BoardTable", web::get().to(handlers::board_table))
        .route("/ImageTable", web::get().to(handlers::image_table))
        .route("/CreateHost", web::get().to(handlers::create_host_form))
        .route("/CreateHost", web::post().to(handlers::create_host))
        .route("/CreateBoard", web::get().to(handlers::create_board_form))
        .route("/CreateBoard", web::post().to(handlers::create_board))
        .route("/ImageView", web::get().to(handlers::image_view))
        .route("/ImageView", web::post().to(handlers::ingest_images))
        .route(
            &format!("{DELIVERY_PATH}/{{file}}"),
            web::get().to(handlers::image_delivery),
        );
}
