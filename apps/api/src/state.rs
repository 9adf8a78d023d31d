use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::layout::LayoutPlanner;
use crate::parser::SectionParser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Section parser with the default Spanish keyword table.
    pub parser: Arc<SectionParser>,
    /// A4 planner. Stateless; each request brings its own measurement oracle.
    pub planner: Arc<LayoutPlanner>,
}
