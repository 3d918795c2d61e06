//! Recosanté pollen source.
//!
//! Data requests go through four steps: feature check, lookup of the commune
//! code cached on the location, pollen fetch, conversion. The code itself is
//! produced separately (`request_location_parameters`) and stored by the host;
//! a data request never geocodes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pollenkit_core::{AppError, ConfigError, ReqwestErrorExt, SourcesConfig};
use pollenkit_services::{
    ClientOptions, GeoApiClient, RecosanteClient, RecosanteResponse, RetryConfig, ServiceError,
};
use serde::{Deserialize, Serialize};

use crate::convert::convert_pollen;
use crate::error::SourceError;
use crate::location::Location;
use crate::resolver::{GeocodingService, LocationResolver};
use crate::types::{SourceFeature, WeatherWrapper};

pub const RECOSANTE_SOURCE_ID: &str = "recosante";
pub const RECOSANTE_SOURCE_NAME: &str = "Recosanté";
pub const RECOSANTE_HOMEPAGE_URL: &str = "https://recosante.beta.gouv.fr/";
pub const RECOSANTE_PRIVACY_POLICY_URL: &str = "https://recosante.beta.gouv.fr/donnees-personnelles/";
pub const RECOSANTE_POLLEN_ATTRIBUTION: &str =
    "Recosanté, Réseau National de Surveillance Aérobiologique (RNSA)";

const SUPPORTED_FEATURES: &[SourceFeature] = &[SourceFeature::Pollen];
const SUPPORTED_COUNTRY: &str = "FR";

/// Pollen data collaborator, keyed by INSEE commune code.
#[async_trait]
pub trait PollenDataService: Send + Sync {
    async fn pollen(
        &self,
        insee_code: &str,
        include_details: bool,
    ) -> Result<RecosanteResponse, ServiceError>;
}

#[async_trait]
impl PollenDataService for RecosanteClient {
    async fn pollen(
        &self,
        insee_code: &str,
        include_details: bool,
    ) -> Result<RecosanteResponse, ServiceError> {
        self.indicators(insee_code, include_details).await
    }
}

/// Capabilities and data access shared by every source a host can register.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn privacy_policy_url(&self) -> Option<&'static str>;
    fn supported_features(&self) -> &'static [SourceFeature];

    /// Whether `feature` can be served for this particular location.
    fn is_feature_supported_for_location(&self, feature: SourceFeature, location: &Location)
        -> bool;

    /// Credit line to show next to data of this feature, if any.
    fn attribution(&self, feature: SourceFeature) -> Option<&'static str>;

    /// Whether the host must (re)produce this source's location parameters
    /// before requesting data.
    fn needs_location_parameters_refresh(
        &self,
        location: &Location,
        coordinates_changed: bool,
        features: &[SourceFeature],
    ) -> bool;

    async fn request_data(
        &self,
        location: &Location,
        features: &[SourceFeature],
    ) -> Result<WeatherWrapper, SourceError>;
}

/// What Recosanté needs cached on a location: the INSEE commune code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecosanteParameters {
    pub code: String,
}

impl RecosanteParameters {
    /// Stored parameters of `location`, if present and usable.
    pub fn from_location(location: &Location) -> Option<Self> {
        location
            .parameters_for::<Self>(RECOSANTE_SOURCE_ID)
            .filter(|params| !params.code.trim().is_empty())
    }
}

#[derive(Clone)]
pub struct RecosanteSource {
    resolver: LocationResolver,
    pollen: Arc<dyn PollenDataService>,
}

impl fmt::Debug for RecosanteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecosanteSource")
            .field("id", &RECOSANTE_SOURCE_ID)
            .finish_non_exhaustive()
    }
}

impl RecosanteSource {
    pub fn new(geocoding: Arc<dyn GeocodingService>, pollen: Arc<dyn PollenDataService>) -> Self {
        Self {
            resolver: LocationResolver::new(geocoding),
            pollen,
        }
    }

    /// Build the production HTTP collaborators from configuration.
    pub fn from_config(config: &SourcesConfig) -> Result<Self, AppError> {
        let options = ClientOptions {
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
            retry: RetryConfig::new(
                config.retry.max_retries,
                config.retry.initial_delay_ms,
                config.retry.max_delay_ms,
            ),
        };

        let geocoding = GeoApiClient::with_base_url(&config.geo_api_url, &options)
            .map_err(|e| client_setup_error("sources.geo_api_url", e))?;
        let pollen = RecosanteClient::with_base_url(&config.recosante_api_url, &options)
            .map_err(|e| client_setup_error("sources.recosante_api_url", e))?;

        tracing::debug!(
            "Recosanté source configured (geo: {}, data: {})",
            config.geo_api_url,
            config.recosante_api_url
        );
        Ok(Self::new(Arc::new(geocoding), Arc::new(pollen)))
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Resolve the location's coordinate to the parameters this source needs.
    ///
    /// The caller stores the result, e.g. with
    /// `location.set_parameters(RECOSANTE_SOURCE_ID, &params)`.
    pub async fn request_location_parameters(
        &self,
        location: &Location,
    ) -> Result<RecosanteParameters, SourceError> {
        let code = self
            .resolver
            .resolve(location.longitude, location.latitude)
            .await?;
        Ok(RecosanteParameters { code })
    }

    fn check_features(
        &self,
        location: &Location,
        features: &[SourceFeature],
    ) -> Result<(), SourceError> {
        for &feature in features {
            if !SUPPORTED_FEATURES.contains(&feature) {
                return Err(SourceError::UnsupportedFeature(feature));
            }
            if !self.is_feature_supported_for_location(feature, location) {
                return Err(SourceError::FeatureUnsupportedForLocation {
                    feature,
                    country_code: location.country_code.clone(),
                });
            }
        }
        Ok(())
    }
}

fn client_setup_error(field: &str, err: ServiceError) -> AppError {
    match err {
        ServiceError::Network(e) => AppError::Network(e.into_network_error()),
        other => AppError::Config(ConfigError::Invalid(format!("{field}: {other}"))),
    }
}

#[async_trait]
impl WeatherSource for RecosanteSource {
    fn id(&self) -> &'static str {
        RECOSANTE_SOURCE_ID
    }

    fn name(&self) -> &'static str {
        RECOSANTE_SOURCE_NAME
    }

    fn privacy_policy_url(&self) -> Option<&'static str> {
        Some(RECOSANTE_PRIVACY_POLICY_URL)
    }

    fn supported_features(&self) -> &'static [SourceFeature] {
        SUPPORTED_FEATURES
    }

    fn is_feature_supported_for_location(
        &self,
        feature: SourceFeature,
        location: &Location,
    ) -> bool {
        feature == SourceFeature::Pollen && location.is_in_country(SUPPORTED_COUNTRY)
    }

    fn attribution(&self, feature: SourceFeature) -> Option<&'static str> {
        match feature {
            SourceFeature::Pollen => Some(RECOSANTE_POLLEN_ATTRIBUTION),
            SourceFeature::CurrentWeather
            | SourceFeature::AirQuality
            | SourceFeature::Minutely
            | SourceFeature::Alerts
            | SourceFeature::Normals => None,
        }
    }

    fn needs_location_parameters_refresh(
        &self,
        location: &Location,
        coordinates_changed: bool,
        _features: &[SourceFeature],
    ) -> bool {
        coordinates_changed || RecosanteParameters::from_location(location).is_none()
    }

    async fn request_data(
        &self,
        location: &Location,
        features: &[SourceFeature],
    ) -> Result<WeatherWrapper, SourceError> {
        self.check_features(location, features)?;

        if !features.contains(&SourceFeature::Pollen) {
            tracing::debug!("No feature requested, nothing to fetch");
            return Ok(WeatherWrapper::default());
        }

        let params = RecosanteParameters::from_location(location).ok_or(
            SourceError::MissingLocationParameter {
                source_id: RECOSANTE_SOURCE_ID,
            },
        )?;
        tracing::debug!("Using cached commune code {}", params.code);

        let response = self.pollen.pollen(&params.code, true).await?;
        let pollen = convert_pollen(&response, location.timezone);

        tracing::info!(
            "Fetched pollen for commune {}: {} day(s)",
            params.code,
            pollen.daily.len()
        );
        Ok(WeatherWrapper {
            pollen: Some(pollen),
        })
    }
}
