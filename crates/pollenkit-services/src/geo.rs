//! Coordinates to French commune lookup.
//! Uses geo.api.gouv.fr (Etalab) - free, no API key required.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use url::Url;

use crate::error::ServiceError;
use crate::http::{build_client, check_response, decode_json, parse_base_url, ClientOptions};
use crate::retry::{with_retry, RetryConfig};

pub const GEO_API_URL: &str = "https://geo.api.gouv.fr/";
const SERVICE_NAME: &str = "geo.api.gouv.fr";
const COMMUNE_FIELDS: &str = "code,nom,codesPostaux";

/// A commune candidate returned for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commune {
    /// INSEE commune code (e.g. "75056" for Paris)
    pub code: String,
    #[serde(rename = "nom", default)]
    pub name: Option<String>,
    #[serde(rename = "codesPostaux", default)]
    pub postal_codes: Vec<String>,
}

/// Client for the communes endpoint of geo.api.gouv.fr
#[derive(Debug, Clone)]
pub struct GeoApiClient {
    base_url: Url,
    client: Arc<Client>,
    retry: RetryConfig,
}

impl GeoApiClient {
    /// Create a client against the public endpoint.
    pub fn new(options: &ClientOptions) -> Result<Self, ServiceError> {
        Self::with_base_url(GEO_API_URL, options)
    }

    /// Create a client against a custom base URL (mirrors, tests).
    pub fn with_base_url(base_url: &str, options: &ClientOptions) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            client: Arc::new(build_client(options)?),
            retry: options.retry.clone(),
        })
    }

    /// Communes containing the coordinate, best match first.
    ///
    /// An empty list means the coordinate is outside the covered territory.
    #[instrument(skip(self), level = "info")]
    pub async fn communes(
        &self,
        longitude: f64,
        latitude: f64,
    ) -> Result<Vec<Commune>, ServiceError> {
        let url = self.base_url.join("communes")?;
        let query = [
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("fields", COMMUNE_FIELDS.to_string()),
            ("format", "json".to_string()),
        ];

        let response = with_retry(&self.retry, SERVICE_NAME, || {
            self.client.get(url.clone()).query(&query).send()
        })
        .await?;
        let response = check_response(SERVICE_NAME, response).await?;
        let communes: Vec<Commune> = decode_json(SERVICE_NAME, response).await?;

        if communes.is_empty() {
            tracing::debug!("No commune at ({}, {})", latitude, longitude);
        } else {
            tracing::debug!(
                "Found {} commune(s) at ({}, {}): {:?}",
                communes.len(),
                latitude,
                longitude,
                communes.iter().map(|c| c.code.as_str()).collect::<Vec<_>>()
            );
        }

        Ok(communes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commune_deserialization() {
        let json = r#"{
            "code": "75056",
            "nom": "Paris",
            "codesPostaux": ["75001", "75002"]
        }"#;
        let commune: Commune = serde_json::from_str(json).unwrap();
        assert_eq!(commune.code, "75056");
        assert_eq!(commune.name.as_deref(), Some("Paris"));
        assert_eq!(commune.postal_codes.len(), 2);
    }

    #[test]
    fn test_commune_code_only() {
        let commune: Commune = serde_json::from_str(r#"{"code": "13055"}"#).unwrap();
        assert_eq!(commune.code, "13055");
        assert!(commune.name.is_none());
        assert!(commune.postal_codes.is_empty());
    }

    #[test]
    fn test_client_creation() {
        assert!(GeoApiClient::new(&ClientOptions::default()).is_ok());
        assert!(GeoApiClient::with_base_url("nope", &ClientOptions::default()).is_err());
    }
}
