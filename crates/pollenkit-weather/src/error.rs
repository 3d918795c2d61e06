//! Errors reported by pollen sources.

use pollenkit_core::{AppError, ReqwestErrorExt};
use pollenkit_services::ServiceError;
use thiserror::Error;

use crate::types::SourceFeature;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The geocoding service knows no administrative area at this coordinate.
    #[error("No administrative area found at ({latitude}, {longitude})")]
    InvalidLocation { longitude: f64, latitude: f64 },

    #[error("Feature '{0}' is not provided by this source")]
    UnsupportedFeature(SourceFeature),

    #[error("Feature '{feature}' is not available in country '{country}'", country = .country_code.as_deref().unwrap_or("unknown"))]
    FeatureUnsupportedForLocation {
        feature: SourceFeature,
        country_code: Option<String>,
    },

    /// The host has not stored (or lost) the parameters this source derives
    /// for the location.
    #[error("Location parameters for '{source_id}' are missing")]
    MissingLocationParameter { source_id: &'static str },

    #[error(transparent)]
    Upstream(#[from] ServiceError),
}

impl SourceError {
    /// The request can never succeed for this source and location, so there
    /// is no point in asking again.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            SourceError::UnsupportedFeature(_) | SourceError::FeatureUnsupportedForLocation { .. }
        )
    }

    /// The host should produce fresh location parameters before retrying.
    pub fn needs_location_refresh(&self) -> bool {
        matches!(self, SourceError::MissingLocationParameter { .. })
    }

    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> String {
        match self {
            SourceError::InvalidLocation { .. } => {
                "Pollen data is not available for this place.".to_string()
            }
            SourceError::UnsupportedFeature(_) => {
                "This source does not provide the requested data.".to_string()
            }
            SourceError::FeatureUnsupportedForLocation { .. } => {
                "Pollen data from this source is only available in France.".to_string()
            }
            SourceError::MissingLocationParameter { .. } => {
                "This location needs to be refreshed before pollen data can be loaded.".to_string()
            }
            SourceError::Upstream(e) => e.user_message(),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Upstream(ServiceError::Network(e)) => {
                AppError::Network(e.into_network_error())
            }
            other => AppError::Source(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SourceError::UnsupportedFeature(SourceFeature::Alerts).is_unsupported());
        assert!(SourceError::FeatureUnsupportedForLocation {
            feature: SourceFeature::Pollen,
            country_code: Some("BE".into()),
        }
        .is_unsupported());

        let missing = SourceError::MissingLocationParameter {
            source_id: "recosante",
        };
        assert!(missing.needs_location_refresh());
        assert!(!missing.is_unsupported());

        let invalid = SourceError::InvalidLocation {
            longitude: 0.0,
            latitude: 0.0,
        };
        assert!(!invalid.is_unsupported());
        assert!(!invalid.needs_location_refresh());
    }

    #[test]
    fn test_display() {
        let err = SourceError::FeatureUnsupportedForLocation {
            feature: SourceFeature::Pollen,
            country_code: None,
        };
        assert_eq!(
            err.to_string(),
            "Feature 'pollen' is not available in country 'unknown'"
        );

        let err = SourceError::InvalidLocation {
            longitude: 2.5,
            latitude: 48.5,
        };
        assert_eq!(err.to_string(), "No administrative area found at (48.5, 2.5)");
    }

    #[test]
    fn test_upstream_is_transparent() {
        let upstream = ServiceError::Api {
            service: "Recosanté",
            status: 503,
            message: "down".into(),
        };
        let expected = upstream.to_string();
        let err = SourceError::from(upstream);

        assert_eq!(err.to_string(), expected);
        assert!(matches!(
            err,
            SourceError::Upstream(ServiceError::Api { status: 503, .. })
        ));
    }

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = vec![
            SourceError::InvalidLocation {
                longitude: 0.0,
                latitude: 0.0,
            },
            SourceError::UnsupportedFeature(SourceFeature::Normals),
            SourceError::FeatureUnsupportedForLocation {
                feature: SourceFeature::Pollen,
                country_code: Some("DE".into()),
            },
            SourceError::MissingLocationParameter {
                source_id: "recosante",
            },
        ];

        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = SourceError::MissingLocationParameter {
            source_id: "recosante",
        }
        .into();
        assert!(matches!(app, AppError::Source(ref msg) if msg.contains("recosante")));
        assert_eq!(
            app.user_message(),
            "Pollen data is unavailable right now. Please try again."
        );
    }
}
