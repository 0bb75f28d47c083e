//! Nearbook Availability Resolution Engine
//!
//! Answers "which libraries near the requester currently have this book
//! available to borrow?" by filtering a library catalog by great-circle
//! distance and probing the external book-availability API concurrently,
//! one probe per nearby library, with credential fallback.
//!
//! The engine is a library-style component: the embedding application owns
//! transport, input validation and response formatting, and hands the engine
//! a catalog snapshot plus configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult, ProbeError, ResolutionError};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber from the logging configuration.
///
/// `RUST_LOG` takes precedence over the configured level when set. Safe to
/// call more than once; later calls are no-ops.
pub fn init_tracing(config: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("nearbook={}", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        let _ = registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init();
    } else {
        let _ = registry.with(tracing_subscriber::fmt::layer()).try_init();
    }
}
