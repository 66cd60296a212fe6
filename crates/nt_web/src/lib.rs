use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod coordinator;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::{Service, ServiceConfig};
pub use error::ApiError;
pub use state::AppState;

fn scraper_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/search", get(handlers::search))
        .route("/explore", get(handlers::explore))
        .route("/scrape", get(handlers::scrape))
}

fn sources_routes() -> Router<Arc<AppState>> {
    Router::new().route("/sources", get(handlers::sources_get).post(handlers::sources_post))
}

fn coordinator_routes() -> Router<Arc<AppState>> {
    Router::new().route("/coordinate", get(handlers::coordinate))
}

pub async fn create_app(state: AppState, service: Service) -> Router {
    let cors = CorsLayer::permissive();

    let routes = match service {
        Service::Scraper => scraper_routes(),
        Service::Sources => sources_routes(),
        Service::Coordinator => coordinator_routes(),
        Service::All => scraper_routes().merge(sources_routes()).merge(coordinator_routes()),
    };

    routes
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, service: Service, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_app(state, service).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{} service listening on {}", service, listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{ApiError, AppState, Service, ServiceConfig};
    pub use nt_core::{Article, Error, Result};
}
