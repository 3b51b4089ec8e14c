//! Diagnosia — adaptive symptom-based diagnostic suggestions.
//!
//! Reported symptoms and risk factors are matched against a declarative
//! medical knowledge base; follow-up questions collected from the top
//! candidates refine the confidence scores in a second pass before the
//! final ranked result is resolved and personalized. Account storage,
//! diagnosis history and PDF report artifacts live alongside the engine;
//! any web or UI layer sits on top of this crate.

pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod history;
pub mod knowledge;
pub mod models;
pub mod report;
pub mod vocabulary;

use tracing_subscriber::EnvFilter;

/// Initialize structured logging. Hosts call this once at startup;
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Diagnosia starting v{}", config::APP_VERSION);
}
