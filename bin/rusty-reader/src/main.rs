//! # Rusty-Reader Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use rr_api::{configure_routes, middleware, AppState};
use rr_config::Settings;
use rr_core::{ImageIngestor, LogicRegistry, MediaStore};
use std::sync::Arc;
use std::time::Duration;

// Feature-gated imports: one implementation per port
#[cfg(feature = "db-sqlite")]
use rr_db_sqlite::SqliteStore;

#[cfg(feature = "storage-local")]
use rr_storage_local::LocalMediaStore;

#[cfg(feature = "feed-reddit")]
use rr_feed_reddit::RedditFeed;

#[cfg(not(all(feature = "db-sqlite", feature = "storage-local", feature = "feed-reddit")))]
compile_error!("rusty-reader needs a database, a media store and a feed: enable db-sqlite, storage-local and feed-reddit");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    rr_config::load_dotenv();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let settings = Settings::load()?;

    // 1. Initialize Database Implementation
    let db = SqliteStore::new(&settings.database.url).await?;
    let registry = LogicRegistry::new(
        Arc::new(db.hosts()),
        Arc::new(db.boards()),
        Arc::new(db.images()),
    );

    // 2. Initialize Storage Implementation
    let store: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        settings.media.root.clone(),
        settings.media.url_prefix.clone(),
    ));

    // 3. Initialize Feed Implementation
    let feed = RedditFeed::new(
        &settings.feed.base_url,
        &settings.feed.user_agent,
        Duration::from_secs(settings.feed.timeout_secs),
    )?;
    let ingestor = ImageIngestor::new(
        Arc::new(feed),
        store.clone(),
        registry.boards().clone(),
        registry.images().clone(),
        settings.feed.ingest_options(),
    );

    let state = web::Data::new(AppState {
        registry,
        store,
        ingestor: Arc::new(ingestor),
    });

    let (host, port) = settings.bind_address();
    log::info!("Rusty-Reader starting on http://{host}:{port}");
    if settings.media.url_prefix != rr_api::DELIVERY_PATH {
        log::info!(
            "images are linked under {} and must be served from there",
            settings.media.url_prefix
        );
    }

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::security_headers())
            .wrap(middleware::standard_middleware())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await?;
    Ok(())
}
