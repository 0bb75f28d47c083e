//! Availability resolution: per-library probing with credential fallback,
//! and the fan-out/fan-in coordinator that turns a catalog snapshot plus a
//! requester position into the list of libraries that can lend the book.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{
    config::AvailabilityConfig,
    error::{AppError, AppResult, ProbeError, ResolutionError},
    models::{Credential, GeoPoint, LibraryRecord},
    repository::CatalogProvider,
    services::book_api::{AvailabilityApi, AvailabilityReply},
    services::geo,
};

/// Determine whether one library can lend one book, falling back through
/// the credential pool in order.
///
/// The first definitive yes/no ends the probe; remaining credentials are
/// never attempted. A credential rejection (bad key, quota) advances to the
/// next key. Transport and parse failures end the probe immediately — a
/// garbled reply is not evidence the book is unavailable.
pub async fn probe(
    api: &dyn AvailabilityApi,
    credentials: &[Credential],
    library_code: &str,
    isbn: &str,
) -> Result<bool, ProbeError> {
    for (attempt, auth_key) in credentials.iter().enumerate() {
        match api.book_exists(auth_key, library_code, isbn).await? {
            AvailabilityReply::Definitive(available) => {
                tracing::debug!(
                    library = library_code,
                    isbn,
                    available,
                    attempt,
                    "availability probe answered"
                );
                return Ok(available);
            }
            AvailabilityReply::CredentialRejected { message } => {
                tracing::warn!(
                    library = library_code,
                    attempt,
                    %message,
                    "credential rejected, falling back to next key"
                );
            }
        }
    }

    Err(ProbeError::AllCredentialsExhausted {
        library_code: library_code.to_string(),
        attempted: credentials.len(),
    })
}

/// Resolution coordinator.
///
/// Owns the read-only collaborators (catalog snapshot source, availability
/// API client, credential pool); holds no per-request state, so one instance
/// serves concurrent resolutions.
#[derive(Clone)]
pub struct AvailabilityService {
    catalog: Arc<dyn CatalogProvider>,
    api: Arc<dyn AvailabilityApi>,
    auth_keys: Arc<Vec<Credential>>,
    default_radius_km: f64,
    max_concurrent_probes: Option<usize>,
}

impl AvailabilityService {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        api: Arc<dyn AvailabilityApi>,
        config: &AvailabilityConfig,
    ) -> AppResult<Self> {
        if config.auth_keys.is_empty() {
            return Err(AppError::Validation(
                "at least one availability API auth key must be configured".to_string(),
            ));
        }

        Ok(Self {
            catalog,
            api,
            auth_keys: Arc::new(config.auth_keys.iter().map(Credential::new).collect()),
            default_radius_km: config.default_radius_km,
            max_concurrent_probes: config.max_concurrent_probes,
        })
    }

    /// Resolve with the configured default search radius.
    pub async fn resolve_nearby(
        &self,
        requester: GeoPoint,
        isbn: &str,
    ) -> Result<Vec<LibraryRecord>, ResolutionError> {
        self.resolve(requester, isbn, self.default_radius_km).await
    }

    /// Libraries within `radius_km` of `requester` that can lend `isbn`.
    ///
    /// Dispatches one probe worker per candidate library. Aggregation is
    /// all-or-nothing: any probe failure fails the whole resolution, because
    /// a partial list cannot distinguish "confirmed unavailable" from
    /// "status unknown". An empty result is a successful answer ("no nearby
    /// library has it") and is distinct from failure.
    ///
    /// Every dispatched worker is awaited before returning; once a failure
    /// is recorded, later outcomes are drained and discarded rather than
    /// left blocking.
    pub async fn resolve(
        &self,
        requester: GeoPoint,
        isbn: &str,
        radius_km: f64,
    ) -> Result<Vec<LibraryRecord>, ResolutionError> {
        tracing::info!(isbn, radius_km, "availability resolution started");

        let catalog = self
            .catalog
            .snapshot()
            .await
            .map_err(|e| ResolutionError::Catalog(e.to_string()))?;

        let candidates = geo::nearby_candidates(&requester, &catalog, radius_km);
        tracing::debug!(
            catalog = catalog.len(),
            candidates = candidates.len(),
            "catalog filtered by distance"
        );

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let limiter = self
            .max_concurrent_probes
            .map(|n| Arc::new(Semaphore::new(n)));

        let mut probes = JoinSet::new();
        for candidate in candidates {
            let api = Arc::clone(&self.api);
            let auth_keys = Arc::clone(&self.auth_keys);
            let limiter = limiter.clone();
            let isbn = isbn.to_string();

            probes.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = match limiter {
                    Some(s) => s.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = probe(api.as_ref(), &auth_keys, &candidate.record.code, &isbn).await;
                (candidate.record, outcome)
            });
        }

        let mut available = Vec::new();
        let mut first_error: Option<ResolutionError> = None;

        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((record, Ok(true))) => {
                    tracing::debug!(library = %record.code, "available to borrow");
                    available.push(record);
                }
                Ok((record, Ok(false))) => {
                    tracing::debug!(library = %record.code, "not available");
                }
                Ok((record, Err(err))) => {
                    tracing::warn!(library = %record.code, error = %err, "probe failed");
                    if first_error.is_none() {
                        first_error = Some(ResolutionError::Probe(err));
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(ResolutionError::Task(join_err));
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                tracing::info!(found = available.len(), "availability resolution complete");
                Ok(available)
            }
        }
    }
}
