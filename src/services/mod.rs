//! Engine services

pub mod availability;
pub mod book_api;
pub mod geo;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::AppResult,
    repository::CatalogProvider,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub availability: availability::AvailabilityService,
}

impl Services {
    /// Create all services with the given catalog provider.
    pub fn new(config: &AppConfig, catalog: Arc<dyn CatalogProvider>) -> AppResult<Self> {
        let api = Arc::new(book_api::BookApiClient::new(&config.availability)?);
        Ok(Self {
            availability: availability::AvailabilityService::new(
                catalog,
                api,
                &config.availability,
            )?,
        })
    }
}
