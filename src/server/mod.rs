pub mod handlers;
pub mod types;

use crate::{
    Result,
    acquire::{ImageAcquirer, UploadStore},
    catalog::{CatalogStorage, ProductLookup},
    config::Config,
    inference::GradioClient,
    tryon::TryOnOrchestrator,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/tryon", post(handlers::tryon))
        .route("/api/tryon/:product_id", post(handlers::tryon_product))
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/products/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let catalog = Arc::new(CatalogStorage::new(&config.catalog.database_path).await?);
    let uploads = UploadStore::new(&config.server.upload_dir).await?;

    let lookup: Arc<dyn ProductLookup> = catalog.clone();
    let acquirer = ImageAcquirer::new(&config.fetch, lookup)?;
    let inference = Arc::new(GradioClient::new(config.inference.clone())?);
    info!("Using try-on model '{}'", config.inference.model);

    let app_state = AppState {
        orchestrator: Arc::new(TryOnOrchestrator::new(acquirer, inference)),
        catalog,
        uploads,
    };
    let app = router(app_state, config.server.max_upload_bytes);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
