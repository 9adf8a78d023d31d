mod config;
mod db;
mod errors;
mod layout;
mod parser;
mod routes;
mod sheets;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::layout::{LayoutPlanner, PageGeometry};
use crate::parser::SectionParser;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting medsheet v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (creates the sheets table if missing)
    let db = create_pool(&config.database_url).await?;

    let parser = Arc::new(SectionParser::default());
    info!("Section parser ready ({} patterns)", parser.patterns().len());

    let geometry = PageGeometry::a4();
    let planner = Arc::new(LayoutPlanner::new(geometry.clone())?);
    info!(
        "Page geometry: {}x{} mm, usable {} mm",
        geometry.page_width_mm,
        geometry.page_height_mm,
        geometry.full_page_space()
    );

    if config.hospital.is_configured() {
        info!(hospital = ?config.hospital.name, "Hospital identity configured");
    }

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        parser,
        planner,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
