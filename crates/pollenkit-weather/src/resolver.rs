//! Coordinate to administrative code resolution.

use std::sync::Arc;

use async_trait::async_trait;
use pollenkit_services::{Commune, GeoApiClient, ServiceError};

use crate::error::SourceError;

/// Reverse geocoding collaborator: communes at a coordinate, best match first.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    async fn communes(&self, longitude: f64, latitude: f64) -> Result<Vec<Commune>, ServiceError>;
}

#[async_trait]
impl GeocodingService for GeoApiClient {
    async fn communes(&self, longitude: f64, latitude: f64) -> Result<Vec<Commune>, ServiceError> {
        GeoApiClient::communes(self, longitude, latitude).await
    }
}

/// Turns a coordinate into the INSEE code of the commune containing it.
///
/// Holds no state beyond the collaborator; every call asks it again.
#[derive(Clone)]
pub struct LocationResolver {
    geocoding: Arc<dyn GeocodingService>,
}

impl LocationResolver {
    pub fn new(geocoding: Arc<dyn GeocodingService>) -> Self {
        Self { geocoding }
    }

    /// Resolve a coordinate with a single geocoding request.
    ///
    /// The first candidate wins. No candidate, or a first candidate without
    /// a code, is reported as `SourceError::InvalidLocation`. Coordinates are
    /// passed through unchecked.
    pub async fn resolve(&self, longitude: f64, latitude: f64) -> Result<String, SourceError> {
        tracing::debug!("Resolving commune at ({}, {})", latitude, longitude);

        let candidates = self.geocoding.communes(longitude, latitude).await?;
        let best = candidates
            .into_iter()
            .next()
            .filter(|commune| !commune.code.trim().is_empty())
            .ok_or(SourceError::InvalidLocation {
                longitude,
                latitude,
            })?;

        tracing::info!(
            "Resolved ({}, {}) to commune {} ({})",
            latitude,
            longitude,
            best.code,
            best.name.as_deref().unwrap_or("unnamed")
        );
        Ok(best.code)
    }
}
