use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Stateless between calls; one instance serves every request.
    pub analyzer: Arc<Analyzer>,
    pub config: Config,
}
