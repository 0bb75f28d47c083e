//! Catalog access seam.
//!
//! The engine never ingests the catalog itself; the host materializes the
//! current set of library records (from whatever store it uses) and the
//! engine reads it through this trait.

use async_trait::async_trait;

use crate::{error::AppResult, models::LibraryRecord};

/// Read-only source of the current library catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Current snapshot of all known libraries.
    async fn snapshot(&self) -> AppResult<Vec<LibraryRecord>>;
}

/// A catalog snapshot already materialized in memory, typically loaded once
/// at startup by the host application.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    records: Vec<LibraryRecord>,
}

impl InMemoryCatalog {
    pub fn new(records: Vec<LibraryRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn snapshot(&self) -> AppResult<Vec<LibraryRecord>> {
        Ok(self.records.clone())
    }
}
