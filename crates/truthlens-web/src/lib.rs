//! truthlens-web — JSON HTTP API for TruthLens
//! Provides:
//!   - Ensemble scoring of analysis records with custom weights
//!   - Methodology simulation on the built-in sample record
//!   - Article analysis and the recommended-news feed

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AppState, SharedState};

/// Serve the API on `bind` until the process is stopped.
pub async fn serve(bind: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "TruthLens API listening");
    axum::serve(listener, build_router(state)).await
}
