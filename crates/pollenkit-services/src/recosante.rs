//! Recosanté API client and raw payload types.
//!
//! Only the RAEP block (pollen exposure risk, published weekly by the RNSA)
//! is modelled; other indicators in the payload are ignored.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use url::Url;

use crate::error::ServiceError;
use crate::http::{build_client, check_response, decode_json, parse_base_url, ClientOptions};
use crate::retry::{with_retry, RetryConfig};

pub const RECOSANTE_API_URL: &str = "https://api.recosante.beta.gouv.fr/";
const SERVICE_NAME: &str = "Recosanté";

/// Top-level response of `GET /v1/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecosanteResponse {
    #[serde(default)]
    pub raep: Option<Raep>,
}

/// Pollen exposure risk block
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Raep {
    #[serde(default)]
    pub indice: Option<RaepIndice>,
    #[serde(default)]
    pub validity: Option<RaepValidity>,
}

/// Overall risk, with per-taxon details when requested
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaepIndice {
    #[serde(default)]
    pub value: Option<u8>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub details: Option<Vec<RaepDetail>>,
}

/// One taxon of the bulletin. Entries missing a field are kept so that the
/// rest of the bulletin survives; conversion skips them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaepDetail {
    /// Taxon name as published, in French (e.g. "bouleau", "graminées")
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub indice: RaepDetailIndice,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RaepDetailIndice {
    #[serde(default)]
    pub value: Option<u8>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Bulletin validity window. Kept as published; interpretation happens at
/// conversion time where the location's time zone is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaepValidity {
    pub start: String,
    pub end: String,
}

/// Client for the Recosanté public API
#[derive(Debug, Clone)]
pub struct RecosanteClient {
    base_url: Url,
    client: Arc<Client>,
    retry: RetryConfig,
}

impl RecosanteClient {
    /// Create a client against the public endpoint.
    pub fn new(options: &ClientOptions) -> Result<Self, ServiceError> {
        Self::with_base_url(RECOSANTE_API_URL, options)
    }

    /// Create a client against a custom base URL (mirrors, tests).
    pub fn with_base_url(base_url: &str, options: &ClientOptions) -> Result<Self, ServiceError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            client: Arc::new(build_client(options)?),
            retry: options.retry.clone(),
        })
    }

    /// Fetch indicators for an INSEE commune code.
    ///
    /// `include_details` asks for the RAEP block (pollen risk per taxon).
    #[instrument(skip(self), level = "info")]
    pub async fn indicators(
        &self,
        insee_code: &str,
        include_details: bool,
    ) -> Result<RecosanteResponse, ServiceError> {
        let url = self.base_url.join("v1/")?;
        let query = [
            ("insee", insee_code.to_string()),
            ("show_raep", include_details.to_string()),
        ];

        let response = with_retry(&self.retry, SERVICE_NAME, || {
            self.client.get(url.clone()).query(&query).send()
        })
        .await?;
        let response = check_response(SERVICE_NAME, response).await?;
        let result: RecosanteResponse = decode_json(SERVICE_NAME, response).await?;

        match &result.raep {
            Some(raep) => tracing::debug!(
                "RAEP for {}: {} detail(s), validity {:?}",
                insee_code,
                raep.indice
                    .as_ref()
                    .and_then(|i| i.details.as_ref())
                    .map_or(0, Vec::len),
                raep.validity
            ),
            None => tracing::debug!("No RAEP block for {}", insee_code),
        }

        Ok(result)
    }
}
